//! Session issuance and verification
//!
//! A token resolves to a session id and a subject. Authority is re-derived
//! from the stored account on every `verify`, so deactivation takes effect
//! on the very next request.

use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, info, warn};

use super::registry::{SessionEntry, SessionRegistry};
use crate::application::access::check_account_status;
use crate::domain::{AccessError, AccessResult, User, UserRepositoryInterface};
use crate::infrastructure::crypto::jwt::{create_token, verify_token, JwtConfig, SessionClaims};
use crate::shared::{Clock, SharedClock};

/// Token handed to the caller after a successful sign-in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedSession {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub session_id: String,
}

/// Outcome of a successful `verify`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedSession {
    pub session_id: String,
    pub user: User,
}

pub struct SessionService {
    users: Arc<dyn UserRepositoryInterface>,
    registry: SessionRegistry,
    jwt_config: JwtConfig,
    clock: SharedClock,
}

impl SessionService {
    pub fn new(
        users: Arc<dyn UserRepositoryInterface>,
        jwt_config: JwtConfig,
        clock: SharedClock,
    ) -> Self {
        Self {
            users,
            registry: SessionRegistry::new(),
            jwt_config,
            clock,
        }
    }

    /// Bind a fresh token to `user`. Only the subject id is embedded.
    pub fn issue(&self, user: &User) -> AccessResult<IssuedSession> {
        let now = self.clock.now();
        let session_id = uuid::Uuid::new_v4().to_string();
        let claims = SessionClaims::new(&user.id, &session_id, now, &self.jwt_config);

        let token = create_token(&claims, &self.jwt_config)
            .map_err(|e| AccessError::Crypto(format!("Failed to create token: {}", e)))?;

        self.registry.prune_expired(now);
        self.registry.insert(
            &session_id,
            SessionEntry {
                user_id: user.id.clone(),
                issued_at: now,
                expires_at: now + Duration::hours(self.jwt_config.expiration_hours),
                panel_verified: false,
            },
        );
        debug!(user_id = %user.id, %session_id, "Session issued");

        Ok(IssuedSession {
            token,
            token_type: "Bearer".into(),
            expires_in: self.jwt_config.expiration_hours * 3600,
            session_id,
        })
    }

    /// Resolve `token` to its account and re-run the account-status checks
    /// against the current stored record. Any failure is `SessionRevoked`.
    pub async fn verify(&self, token: &str) -> AccessResult<VerifiedSession> {
        let claims =
            verify_token(token, &self.jwt_config).map_err(|_| AccessError::SessionRevoked)?;
        let session_id = claims.jti.clone();

        if claims.is_expired_at(self.clock.now()) {
            self.registry.remove(&session_id);
            return Err(AccessError::SessionRevoked);
        }

        match self.registry.get(&session_id) {
            Some(entry) if entry.user_id == claims.sub => {}
            _ => return Err(AccessError::SessionRevoked),
        }

        let Some(user) = self.users.get_user_by_id(&claims.sub).await? else {
            self.registry.remove(&session_id);
            info!(user_id = %claims.sub, "Session revoked: account no longer exists");
            return Err(AccessError::SessionRevoked);
        };

        if let Err(reason) = check_account_status(&user) {
            self.registry.remove(&session_id);
            info!(user_id = %user.id, reason = reason.kind(), "Session revoked: account status changed");
            return Err(AccessError::SessionRevoked);
        }

        Ok(VerifiedSession { session_id, user })
    }

    /// Best-effort server-side invalidation. Returns whether a live session
    /// was removed; an unreadable or unknown token is not an error.
    pub fn logout(&self, token: &str) -> bool {
        match verify_token(token, &self.jwt_config) {
            Ok(claims) => {
                let removed = self.registry.remove(&claims.jti);
                if removed {
                    info!(user_id = %claims.sub, session_id = %claims.jti, "Session closed");
                }
                removed
            }
            Err(e) => {
                warn!(error = %e, "Logout with unreadable token");
                false
            }
        }
    }

    /// Drop every live session of `user_id`.
    pub fn revoke_user(&self, user_id: &str) -> usize {
        self.registry.remove_for_user(user_id)
    }

    // ── Admin-panel visit state ─────────────────────────────────

    /// Start a new panel visit: any earlier verification is forgotten.
    pub fn begin_panel_visit(&self, session_id: &str) -> AccessResult<()> {
        if self.registry.set_panel_verified(session_id, false) {
            Ok(())
        } else {
            Err(AccessError::SessionRevoked)
        }
    }

    pub fn mark_panel_verified(&self, session_id: &str) -> AccessResult<()> {
        if self.registry.set_panel_verified(session_id, true) {
            Ok(())
        } else {
            Err(AccessError::SessionRevoked)
        }
    }

    pub fn is_panel_verified(&self, session_id: &str) -> bool {
        self.registry
            .get(session_id)
            .map(|entry| entry.panel_verified)
            .unwrap_or(false)
    }

    pub fn live_sessions(&self) -> usize {
        self.registry.count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{at, Fixture};
    use crate::domain::{LoginTimeRestriction, UserRole};

    #[tokio::test]
    async fn issued_token_verifies_to_current_record() {
        let fx = Fixture::new().await;
        let user = fx.staff("ops@x.com", "secret1", UserRole::Manager).await;

        let issued = fx.sessions.issue(&user).unwrap();
        assert_eq!(issued.token_type, "Bearer");

        let verified = fx.sessions.verify(&issued.token).await.unwrap();
        assert_eq!(verified.user.id, user.id);
        assert_eq!(verified.session_id, issued.session_id);
    }

    #[tokio::test]
    async fn deactivation_revokes_a_standing_session_immediately() {
        let fx = Fixture::new().await;
        let user = fx.staff("c@x.com", "secret1", UserRole::Collector).await;
        let issued = fx.sessions.issue(&user).unwrap();
        assert!(fx.sessions.verify(&issued.token).await.is_ok());

        fx.deactivate_directly(&user.id).await;

        assert_eq!(
            fx.sessions.verify(&issued.token).await.unwrap_err(),
            AccessError::SessionRevoked
        );
        // reactivation does not resurrect the dropped session
        fx.activate_directly(&user.id).await;
        assert!(fx.sessions.verify(&issued.token).await.is_err());
    }

    #[tokio::test]
    async fn login_hours_do_not_apply_to_standing_sessions() {
        let fx = Fixture::new().await;
        let user = fx.staff("admin@x.com", "secret1", UserRole::Admin).await;
        fx.clock.set(at(10, 0));
        let issued = fx.sessions.issue(&user).unwrap();

        fx.set_window(LoginTimeRestriction {
            enabled: true,
            start_minute_of_day: 9 * 60,
            end_minute_of_day: 18 * 60,
        })
        .await;
        fx.clock.set(at(23, 0));

        assert!(fx.sessions.verify(&issued.token).await.is_ok());
    }

    #[tokio::test]
    async fn expired_tokens_are_refused() {
        let fx = Fixture::new().await;
        let user = fx.staff("ops@x.com", "secret1", UserRole::Manager).await;
        fx.clock.set(at(10, 0));
        let issued = fx.sessions.issue(&user).unwrap();

        fx.clock.set(at(10, 0) + Duration::hours(25));
        assert_eq!(
            fx.sessions.verify(&issued.token).await.unwrap_err(),
            AccessError::SessionRevoked
        );
    }

    #[tokio::test]
    async fn logout_invalidates_server_side() {
        let fx = Fixture::new().await;
        let user = fx.staff("ops@x.com", "secret1", UserRole::Manager).await;
        let issued = fx.sessions.issue(&user).unwrap();

        assert!(fx.sessions.logout(&issued.token));
        assert!(!fx.sessions.logout(&issued.token));
        assert!(!fx.sessions.logout("garbage"));
        assert!(fx.sessions.verify(&issued.token).await.is_err());
    }

    #[tokio::test]
    async fn deleted_account_revokes_session() {
        let fx = Fixture::new().await;
        let user = fx.staff("ops@x.com", "secret1", UserRole::Manager).await;
        let issued = fx.sessions.issue(&user).unwrap();

        fx.users.delete_user(&user.id, None).await.unwrap();
        assert!(fx.sessions.verify(&issued.token).await.is_err());
        assert_eq!(fx.sessions.live_sessions(), 0);
    }

    #[tokio::test]
    async fn panel_visit_flag_resets_on_new_entry() {
        let fx = Fixture::new().await;
        let user = fx.staff("admin@x.com", "secret1", UserRole::Admin).await;
        let issued = fx.sessions.issue(&user).unwrap();

        assert!(!fx.sessions.is_panel_verified(&issued.session_id));
        fx.sessions.mark_panel_verified(&issued.session_id).unwrap();
        assert!(fx.sessions.is_panel_verified(&issued.session_id));

        fx.sessions.begin_panel_visit(&issued.session_id).unwrap();
        assert!(!fx.sessions.is_panel_verified(&issued.session_id));
        assert!(fx.sessions.begin_panel_visit("no-such-session").is_err());
    }
}
