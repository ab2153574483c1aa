//! Domain layer: account, settings and PIN records plus the repository
//! seams the application services depend on.

pub mod pin;
pub mod settings;
pub mod user;

pub use pin::{PinRecord, PinRepositoryInterface};
pub use settings::{
    LoginTimeRestriction, SettingsRepositoryInterface, SystemSettings, MINUTES_PER_DAY,
};
pub use user::model::normalize_identifier;
pub use user::{CreateUserDto, StateChange, User, UserRepositoryInterface, UserRole};

pub use crate::shared::{AccessError, AccessResult};
