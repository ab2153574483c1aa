//! System settings singleton

pub mod model;
pub mod repository;

pub use model::{LoginTimeRestriction, SystemSettings, MINUTES_PER_DAY};
pub use repository::SettingsRepositoryInterface;
