//! Database repository implementations
//!
//! Per-aggregate SeaORM repositories.

pub mod pin_repository;
pub mod settings_repository;
pub mod user_repository;

pub use pin_repository::PinRepository;
pub use settings_repository::SettingsRepository;
pub use user_repository::UserRepository;

use crate::shared::{AccessError, InfraError};

pub(crate) fn db_err(e: sea_orm::DbErr) -> AccessError {
    InfraError::Database(e).into()
}
