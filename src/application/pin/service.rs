//! Secondary PIN gate in front of the restricted admin panel
//!
//! The PIN is independent of the account secret. It is set once, then only
//! verified. A successful setup or verify marks the *current visit* of the
//! calling session; `enter` starts a new visit and clears that mark.
//!
//! Failed verifications are not counted and never lock the panel.

use std::sync::Arc;

use tracing::{info, warn};

use crate::application::session::SessionService;
use crate::domain::{AccessError, AccessResult, PinRepositoryInterface};
use crate::infrastructure::crypto::password::{hash_secret, verify_secret};
use crate::shared::{Clock, SharedClock};

pub const PIN_MIN_LENGTH: usize = 4;

/// `{isSet}` as reported to callers; the hash never leaves this module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinStatus {
    pub is_set: bool,
}

pub struct PinGate {
    pins: Arc<dyn PinRepositoryInterface>,
    sessions: Arc<SessionService>,
    clock: SharedClock,
    hash_cost: u32,
}

impl PinGate {
    pub fn new(
        pins: Arc<dyn PinRepositoryInterface>,
        sessions: Arc<SessionService>,
        clock: SharedClock,
        hash_cost: u32,
    ) -> Self {
        Self {
            pins,
            sessions,
            clock,
            hash_cost,
        }
    }

    pub async fn status(&self) -> AccessResult<PinStatus> {
        let record = self.pins.get_or_init(self.clock.now()).await?;
        Ok(PinStatus {
            is_set: record.is_set,
        })
    }

    /// Start a new panel visit for `session_id`.
    pub async fn enter(&self, session_id: &str) -> AccessResult<PinStatus> {
        self.sessions.begin_panel_visit(session_id)?;
        self.status().await
    }

    pub async fn setup(&self, session_id: &str, pin: &str, confirm_pin: &str) -> AccessResult<()> {
        if self.status().await?.is_set {
            return Err(AccessError::Conflict("PIN is already set".into()));
        }
        if pin != confirm_pin {
            return Err(AccessError::Validation("PIN confirmation does not match".into()));
        }
        if pin.chars().count() < PIN_MIN_LENGTH {
            return Err(AccessError::Validation(format!(
                "PIN must be at least {} characters",
                PIN_MIN_LENGTH
            )));
        }

        let hash =
            hash_secret(pin, self.hash_cost).map_err(|e| AccessError::Crypto(e.to_string()))?;
        if !self.pins.set_if_unset(&hash, self.clock.now()).await? {
            return Err(AccessError::Conflict("PIN is already set".into()));
        }

        info!(%session_id, "Admin panel PIN set");
        self.sessions.mark_panel_verified(session_id)
    }

    pub async fn verify(&self, session_id: &str, pin: &str) -> AccessResult<()> {
        let record = self.pins.get_or_init(self.clock.now()).await?;
        let hash = match (record.is_set, record.pin_hash) {
            (true, Some(hash)) => hash,
            _ => return Err(AccessError::Conflict("PIN has not been set up".into())),
        };

        let matches = verify_secret(pin, &hash).map_err(|e| AccessError::Crypto(e.to_string()))?;
        if !matches {
            warn!(%session_id, "Admin panel PIN rejected");
            return Err(AccessError::Validation("Incorrect PIN".into()));
        }
        self.sessions.mark_panel_verified(session_id)
    }

    /// Gate for the panel itself.
    pub fn require_verified(&self, session_id: &str) -> AccessResult<()> {
        if self.sessions.is_panel_verified(session_id) {
            Ok(())
        } else {
            Err(AccessError::ProtectedResource(
                "Admin panel PIN has not been verified for this visit".into(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::Fixture;
    use crate::domain::UserRole;

    async fn signed_in_session(fx: &Fixture) -> String {
        fx.staff("admin@x.com", "secret1", UserRole::Admin).await;
        let auth = fx.access.login("admin@x.com", "secret1").await.unwrap();
        auth.session.session_id
    }

    #[tokio::test]
    async fn setup_then_verify_only() {
        let fx = Fixture::new().await;
        let sid = signed_in_session(&fx).await;

        assert!(!fx.pin_gate.status().await.unwrap().is_set);
        fx.pin_gate.setup(&sid, "1234", "1234").await.unwrap();
        assert!(fx.pin_gate.status().await.unwrap().is_set);

        fx.pin_gate.verify(&sid, "1234").await.unwrap();
        assert!(matches!(
            fx.pin_gate.verify(&sid, "9999").await,
            Err(AccessError::Validation(_))
        ));
        assert!(fx.pin_gate.status().await.unwrap().is_set);

        assert!(matches!(
            fx.pin_gate.setup(&sid, "5678", "5678").await,
            Err(AccessError::Conflict(_))
        ));
        fx.pin_gate.verify(&sid, "1234").await.unwrap();
    }

    #[tokio::test]
    async fn setup_rejects_mismatch_and_short_pins() {
        let fx = Fixture::new().await;
        let sid = signed_in_session(&fx).await;

        assert!(matches!(
            fx.pin_gate.setup(&sid, "1234", "1235").await,
            Err(AccessError::Validation(_))
        ));
        assert!(matches!(
            fx.pin_gate.setup(&sid, "123", "123").await,
            Err(AccessError::Validation(_))
        ));
        assert!(!fx.pin_gate.status().await.unwrap().is_set);
        assert!(fx.pin_gate.require_verified(&sid).is_err());
    }

    #[tokio::test]
    async fn verify_before_setup_conflicts() {
        let fx = Fixture::new().await;
        let sid = signed_in_session(&fx).await;

        assert!(matches!(
            fx.pin_gate.verify(&sid, "1234").await,
            Err(AccessError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn each_visit_requires_the_pin_again() {
        let fx = Fixture::new().await;
        let sid = signed_in_session(&fx).await;

        let status = fx.pin_gate.enter(&sid).await.unwrap();
        assert!(!status.is_set);
        fx.pin_gate.setup(&sid, "1234", "1234").await.unwrap();
        fx.pin_gate.require_verified(&sid).unwrap();

        fx.pin_gate.enter(&sid).await.unwrap();
        assert!(matches!(
            fx.pin_gate.require_verified(&sid),
            Err(AccessError::ProtectedResource(_))
        ));

        fx.pin_gate.verify(&sid, "1234").await.unwrap();
        fx.pin_gate.require_verified(&sid).unwrap();
    }

    #[tokio::test]
    async fn failed_verify_keeps_prior_verification() {
        let fx = Fixture::new().await;
        let sid = signed_in_session(&fx).await;
        fx.pin_gate.setup(&sid, "1234", "1234").await.unwrap();

        for _ in 0..5 {
            assert!(fx.pin_gate.verify(&sid, "0000").await.is_err());
        }
        fx.pin_gate.require_verified(&sid).unwrap();
        fx.pin_gate.verify(&sid, "1234").await.unwrap();
    }

    #[tokio::test]
    async fn verification_is_per_session() {
        let fx = Fixture::new().await;
        let sid = signed_in_session(&fx).await;
        let other = fx.access.login("admin@x.com", "secret1").await.unwrap();
        fx.pin_gate.setup(&sid, "1234", "1234").await.unwrap();

        assert!(fx
            .pin_gate
            .require_verified(&other.session.session_id)
            .is_err());
    }

    #[tokio::test]
    async fn entering_requires_a_live_session() {
        let fx = Fixture::new().await;
        assert_eq!(
            fx.pin_gate.enter("no-such-session").await.unwrap_err(),
            AccessError::SessionRevoked
        );
    }
}
