use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{LoginTimeRestriction, SystemSettings};
use crate::shared::AccessResult;

#[async_trait]
pub trait SettingsRepositoryInterface: Send + Sync {
    /// Read the singleton, creating it with defaults stamped `at` on first access.
    async fn get_or_init(&self, at: DateTime<Utc>) -> AccessResult<SystemSettings>;

    async fn save_login_time_restriction(
        &self,
        restriction: LoginTimeRestriction,
        at: DateTime<Utc>,
    ) -> AccessResult<SystemSettings>;
}
