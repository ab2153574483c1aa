//! Sign-in, registration and session entry points
//!
//! `AccessService` is constructed once per process and holds every
//! dependency explicitly; nothing here reads ambient global state.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use validator::ValidateEmail;

use crate::application::access::AccessPolicyEngine;
use crate::application::session::{IssuedSession, SessionService, VerifiedSession};
use crate::domain::{
    normalize_identifier, AccessError, AccessResult, CreateUserDto, User,
    UserRepositoryInterface, UserRole,
};
use crate::infrastructure::crypto::password::{hash_secret, DEFAULT_COST};
use crate::shared::{Clock, SharedClock};

#[derive(Debug, Clone)]
pub struct IdentityConfig {
    /// bcrypt cost for account secrets
    pub hash_cost: u32,
    pub password_min_length: usize,
    /// When false, self-registration is approved on the spot
    pub require_registration_approval: bool,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            hash_cost: DEFAULT_COST,
            password_min_length: 6,
            require_registration_approval: true,
        }
    }
}

/// Successful sign-in
#[derive(Debug, Clone)]
pub struct AuthResult {
    pub session: IssuedSession,
    pub user: User,
}

#[derive(Debug, Clone)]
pub enum RegistrationOutcome {
    /// Account stored, waiting for an administrator. No token issued.
    PendingApproval(User),
    SignedIn(AuthResult),
}

pub struct AccessService {
    users: Arc<dyn UserRepositoryInterface>,
    policy: AccessPolicyEngine,
    sessions: Arc<SessionService>,
    clock: SharedClock,
    config: IdentityConfig,
}

impl AccessService {
    pub fn new(
        users: Arc<dyn UserRepositoryInterface>,
        policy: AccessPolicyEngine,
        sessions: Arc<SessionService>,
        clock: SharedClock,
        config: IdentityConfig,
    ) -> Self {
        Self {
            users,
            policy,
            sessions,
            clock,
            config,
        }
    }

    pub fn sessions(&self) -> &Arc<SessionService> {
        &self.sessions
    }

    // ── Authentication ──────────────────────────────────────────

    pub async fn login(&self, identifier: &str, secret: &str) -> AccessResult<AuthResult> {
        let now = self.clock.now();
        let user = match self.policy.authenticate(identifier, secret, now).await {
            Ok(user) => user,
            Err(e) => {
                warn!(reason = e.kind(), "Sign-in denied");
                return Err(e);
            }
        };

        self.start_session(user, now).await
    }

    async fn start_session(&self, user: User, now: DateTime<Utc>) -> AccessResult<AuthResult> {
        if let Err(e) = self.users.record_login(&user.id, now).await {
            warn!(user_id = %user.id, error = %e, "Failed to record last login");
        }

        let session = self.sessions.issue(&user)?;
        info!(user_id = %user.id, role = %user.role, "Signed in");
        Ok(AuthResult { session, user })
    }

    /// Resolve a token to its account (see `SessionService::verify`).
    pub async fn check(&self, token: &str) -> AccessResult<VerifiedSession> {
        self.sessions.verify(token).await
    }

    pub fn logout(&self, token: &str) -> bool {
        self.sessions.logout(token)
    }

    // ── Registration ────────────────────────────────────────────

    /// Self-registration. The role is always Admin and the account starts
    /// unapproved unless approval is switched off in configuration.
    ///
    /// Without approval the caller is signed in straight away, so the
    /// login-hours gate runs before anything is stored.
    pub async fn register(
        &self,
        name: &str,
        identifier: &str,
        secret: &str,
    ) -> AccessResult<RegistrationOutcome> {
        let now = self.clock.now();
        let approved = !self.config.require_registration_approval;
        if approved {
            if let Err(e) = self.policy.permits_login(identifier, now).await {
                warn!(reason = e.kind(), "Registration refused");
                return Err(e);
            }
        }

        let user = self
            .create_account(name, identifier, secret, UserRole::Admin, approved, now)
            .await?;
        info!(user_id = %user.id, approved, "Account registered");

        if !approved {
            return Ok(RegistrationOutcome::PendingApproval(user));
        }
        let auth = self.start_session(user, now).await?;
        Ok(RegistrationOutcome::SignedIn(auth))
    }

    /// Administrator-created staff or member account, approved and active.
    pub async fn create_account_as(
        &self,
        actor: &User,
        name: &str,
        identifier: &str,
        secret: &str,
        role: UserRole,
    ) -> AccessResult<User> {
        if actor.role != UserRole::Admin {
            return Err(AccessError::RoleForbidden);
        }
        if role == UserRole::Admin {
            return Err(AccessError::Validation(
                "Administrator accounts can only be created through registration".into(),
            ));
        }

        let user = self
            .create_account(name, identifier, secret, role, true, self.clock.now())
            .await?;
        info!(user_id = %user.id, role = %role, actor_id = %actor.id, "Account created");
        Ok(user)
    }

    /// Seed an approved administrator when the store is empty.
    pub async fn ensure_bootstrap_admin(
        &self,
        name: &str,
        identifier: &str,
        secret: &str,
    ) -> AccessResult<Option<User>> {
        if self.users.count_users().await? > 0 {
            return Ok(None);
        }
        let user = self
            .create_account(name, identifier, secret, UserRole::Admin, true, self.clock.now())
            .await?;
        info!(user_id = %user.id, identifier = %user.identifier, "Bootstrap administrator created");
        Ok(Some(user))
    }

    async fn create_account(
        &self,
        name: &str,
        identifier: &str,
        secret: &str,
        role: UserRole,
        is_approved: bool,
        now: DateTime<Utc>,
    ) -> AccessResult<User> {
        let name = name.trim();
        if name.is_empty() || name.chars().count() > 100 {
            return Err(AccessError::Validation("Name must be 1-100 characters".into()));
        }
        let identifier = normalize_identifier(identifier);
        if !is_valid_identifier(&identifier) {
            return Err(AccessError::Validation(
                "Identifier must be an email address or phone number".into(),
            ));
        }
        if secret.chars().count() < self.config.password_min_length {
            return Err(AccessError::Validation(format!(
                "Password must be at least {} characters",
                self.config.password_min_length
            )));
        }

        if self.users.get_user_by_identifier(&identifier).await?.is_some() {
            return Err(AccessError::Conflict(
                "An account with this identifier already exists".into(),
            ));
        }

        let password_hash = hash_secret(secret, self.config.hash_cost)
            .map_err(|e| AccessError::Crypto(format!("Failed to hash password: {}", e)))?;

        self.users
            .create_user(
                CreateUserDto {
                    identifier,
                    name: name.to_string(),
                    password_hash,
                    role,
                    is_approved,
                    is_active: true,
                },
                now,
            )
            .await
    }
}

/// Email address, or a phone number of 7-15 digits with optional leading `+`.
pub fn is_valid_identifier(identifier: &str) -> bool {
    if identifier.contains('@') {
        return identifier.validate_email();
    }
    let digits = identifier.strip_prefix('+').unwrap_or(identifier);
    (7..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit())
}
