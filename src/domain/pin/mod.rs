//! Admin-panel PIN singleton

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::shared::AccessResult;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PinRecord {
    pub pin_hash: Option<String>,
    pub is_set: bool,
}

#[async_trait]
pub trait PinRepositoryInterface: Send + Sync {
    /// Read the singleton, creating an unset record stamped `at` on first access.
    async fn get_or_init(&self, at: DateTime<Utc>) -> AccessResult<PinRecord>;

    /// Store `pin_hash` only while no PIN is set. `Ok(false)` means a PIN
    /// was already present and nothing was written.
    async fn set_if_unset(&self, pin_hash: &str, at: DateTime<Utc>) -> AccessResult<bool>;
}
