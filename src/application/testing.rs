//! Wiring shared by the service tests: every service over one in-memory
//! database and a pinned clock.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use sea_orm::DatabaseConnection;

use crate::application::access::{AccessPolicyEngine, LoginExemption, TimeWindowPolicy};
use crate::application::approval::ApprovalWorkflow;
use crate::application::events::{create_event_bus, SharedEventBus};
use crate::application::identity::{AccessService, IdentityConfig};
use crate::application::pin::PinGate;
use crate::application::session::SessionService;
use crate::domain::{
    CreateUserDto, LoginTimeRestriction, SettingsRepositoryInterface, StateChange, User,
    UserRepositoryInterface, UserRole,
};
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::infrastructure::crypto::password::{hash_secret, MIN_COST};
use crate::infrastructure::database::repositories::{
    PinRepository, SettingsRepository, UserRepository,
};
use crate::infrastructure::database::testing::memory_db;
use crate::shared::{Clock, FixedClock};

pub const EXEMPT_IDENTITY: &str = "owner@x.com";

/// 2024-03-04 at `hour:minute` UTC.
pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 4, hour, minute, 0).unwrap()
}

pub struct Fixture {
    pub db: DatabaseConnection,
    pub users: Arc<dyn UserRepositoryInterface>,
    pub settings: Arc<dyn SettingsRepositoryInterface>,
    pub clock: Arc<FixedClock>,
    pub events: SharedEventBus,
    pub time_window: Arc<TimeWindowPolicy>,
    pub policy: AccessPolicyEngine,
    pub sessions: Arc<SessionService>,
    pub access: Arc<AccessService>,
    pub workflow: Arc<ApprovalWorkflow>,
    pub pin_gate: Arc<PinGate>,
}

impl Fixture {
    pub async fn new() -> Self {
        Self::with_config(Self::identity_config()).await
    }

    pub fn identity_config() -> IdentityConfig {
        IdentityConfig {
            hash_cost: MIN_COST,
            ..IdentityConfig::default()
        }
    }

    pub fn jwt_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret".into(),
            expiration_hours: 24,
            issuer: "staff-access".into(),
        }
    }

    pub async fn with_config(config: IdentityConfig) -> Self {
        let db = memory_db().await;
        let users: Arc<dyn UserRepositoryInterface> = Arc::new(UserRepository::new(db.clone()));
        let settings: Arc<dyn SettingsRepositoryInterface> =
            Arc::new(SettingsRepository::new(db.clone()));
        let pins = Arc::new(PinRepository::new(db.clone()));
        let clock = Arc::new(FixedClock::new(at(10, 0)));
        let events = create_event_bus();

        let utc = FixedOffset::east_opt(0).unwrap();
        let time_window = Arc::new(TimeWindowPolicy::new(
            settings.clone(),
            LoginExemption::new(Some(EXEMPT_IDENTITY)),
            utc,
        ));
        let engine = || {
            AccessPolicyEngine::new(users.clone(), time_window.clone(), config.hash_cost).unwrap()
        };

        let sessions = Arc::new(SessionService::new(
            users.clone(),
            Self::jwt_config(),
            clock.clone(),
        ));
        let access = Arc::new(AccessService::new(
            users.clone(),
            engine(),
            sessions.clone(),
            clock.clone(),
            config.clone(),
        ));
        let workflow = Arc::new(ApprovalWorkflow::new(
            users.clone(),
            sessions.clone(),
            events.clone(),
            clock.clone(),
        ));
        let pin_gate = Arc::new(PinGate::new(
            pins,
            sessions.clone(),
            clock.clone(),
            config.hash_cost,
        ));
        let policy = engine();

        Self {
            db,
            policy,
            users,
            settings,
            clock,
            events,
            time_window,
            sessions,
            access,
            workflow,
            pin_gate,
        }
    }

    async fn insert(&self, identifier: &str, secret: &str, role: UserRole, approved: bool) -> User {
        self.users
            .create_user(
                CreateUserDto {
                    identifier: identifier.to_string(),
                    name: identifier.split('@').next().unwrap_or(identifier).to_string(),
                    password_hash: hash_secret(secret, MIN_COST).unwrap(),
                    role,
                    is_approved: approved,
                    is_active: true,
                },
                self.clock.now(),
            )
            .await
            .unwrap()
    }

    /// Approved, active account.
    pub async fn staff(&self, identifier: &str, secret: &str, role: UserRole) -> User {
        self.insert(identifier, secret, role, true).await
    }

    /// Active account still awaiting approval.
    pub async fn pending(&self, identifier: &str, secret: &str, role: UserRole) -> User {
        self.insert(identifier, secret, role, false).await
    }

    pub async fn deactivate_directly(&self, id: &str) {
        assert!(self
            .users
            .apply_state_change(id, StateChange::Deactivate, self.clock_now())
            .await
            .unwrap());
    }

    pub async fn activate_directly(&self, id: &str) {
        assert!(self
            .users
            .apply_state_change(id, StateChange::Activate, self.clock_now())
            .await
            .unwrap());
    }

    pub async fn set_window(&self, restriction: LoginTimeRestriction) {
        self.settings
            .save_login_time_restriction(restriction, self.clock_now())
            .await
            .unwrap();
    }

    fn clock_now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}
