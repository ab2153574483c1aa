//! Sign-in decision logic
//!
//! Checks run in a fixed order and the first failure wins:
//! credentials, role, approval, activation, login hours. Member records are
//! the one exception: they are refused with `RoleForbidden` whatever secret
//! was presented.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::time_window::TimeWindowPolicy;
use crate::domain::{
    normalize_identifier, AccessError, AccessResult, User, UserRepositoryInterface, UserRole,
};
use crate::infrastructure::crypto::password::{hash_secret, verify_secret};

/// Whether a role may hold a session at all.
pub fn role_may_sign_in(role: UserRole) -> bool {
    match role {
        UserRole::Admin | UserRole::Manager | UserRole::Collector | UserRole::Supervisor => true,
        UserRole::Member => false,
    }
}

/// Account-status checks shared by sign-in and session verification.
///
/// The login-hours gate is deliberately not part of this: a standing
/// session only answers to account status.
pub fn check_account_status(user: &User) -> AccessResult<()> {
    if !role_may_sign_in(user.role) {
        return Err(AccessError::RoleForbidden);
    }
    if !user.is_approved {
        return Err(AccessError::PendingApproval);
    }
    if !user.is_active {
        return Err(AccessError::AccountInactive);
    }
    Ok(())
}

pub struct AccessPolicyEngine {
    users: Arc<dyn UserRepositoryInterface>,
    time_window: Arc<TimeWindowPolicy>,
    /// Compared against when the identifier is unknown, so a miss costs
    /// the same bcrypt work as a wrong secret.
    dummy_hash: String,
}

impl AccessPolicyEngine {
    pub fn new(
        users: Arc<dyn UserRepositoryInterface>,
        time_window: Arc<TimeWindowPolicy>,
        hash_cost: u32,
    ) -> AccessResult<Self> {
        let dummy_hash = hash_secret("staff-access-dummy-secret", hash_cost)
            .map_err(|e| AccessError::Crypto(e.to_string()))?;
        Ok(Self {
            users,
            time_window,
            dummy_hash,
        })
    }

    /// Decide whether `identifier`/`secret` may sign in at `now`.
    pub async fn authenticate(
        &self,
        identifier: &str,
        secret: &str,
        now: DateTime<Utc>,
    ) -> AccessResult<User> {
        let identifier = normalize_identifier(identifier);
        let user = self.users.get_user_by_identifier(&identifier).await?;

        let Some(user) = user else {
            let _ = verify_secret(secret, &self.dummy_hash);
            debug!("Sign-in for unknown identifier");
            return Err(AccessError::InvalidCredentials);
        };

        let matches = match verify_secret(secret, &user.password_hash) {
            Ok(matches) => matches,
            Err(e) => {
                warn!(user_id = %user.id, error = %e, "Stored secret hash is unreadable");
                false
            }
        };
        if !role_may_sign_in(user.role) {
            return Err(AccessError::RoleForbidden);
        }
        if !matches {
            return Err(AccessError::InvalidCredentials);
        }

        check_account_status(&user)?;
        self.time_window.permits_login(&user.identifier, now).await?;

        Ok(user)
    }

    /// Login-hours gate on its own, for an account that does not exist yet.
    pub async fn permits_login(&self, identifier: &str, now: DateTime<Utc>) -> AccessResult<()> {
        self.time_window
            .permits_login(&normalize_identifier(identifier), now)
            .await
    }
}
