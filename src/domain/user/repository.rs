use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{CreateUserDto, User};
use crate::shared::AccessResult;

/// Account-status transitions applied as a single conditional write.
///
/// Each variant carries its own precondition; the repository only writes
/// when the stored row still satisfies it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateChange {
    /// `is_approved: false -> true`
    Approve,
    /// `is_active: false -> true`, approved rows only
    Activate,
    /// `is_active: true -> false`, approved rows only
    Deactivate,
}

#[async_trait]
pub trait UserRepositoryInterface: Send + Sync {
    /// Insert a new account with `created_at`/`updated_at` set to `at`.
    async fn create_user(&self, dto: CreateUserDto, at: DateTime<Utc>) -> AccessResult<User>;

    async fn get_user_by_id(&self, id: &str) -> AccessResult<Option<User>>;
    async fn get_user_by_identifier(&self, identifier: &str) -> AccessResult<Option<User>>;
    async fn list_users(&self) -> AccessResult<Vec<User>>;
    async fn list_pending_users(&self) -> AccessResult<Vec<User>>;
    async fn count_users(&self) -> AccessResult<u64>;

    async fn record_login(&self, id: &str, at: DateTime<Utc>) -> AccessResult<()>;

    /// Apply `change` iff its precondition holds. `Ok(false)` means no row
    /// matched (missing, or already in the target state).
    async fn apply_state_change(
        &self,
        id: &str,
        change: StateChange,
        at: DateTime<Utc>,
    ) -> AccessResult<bool>;

    /// Delete the row, optionally only while `is_approved` equals the given
    /// value. `Ok(false)` means no row matched.
    async fn delete_user(&self, id: &str, only_if_approved: Option<bool>) -> AccessResult<bool>;
}
