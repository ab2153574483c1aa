//! Database entities module

pub mod admin_pin;
pub mod system_settings;
pub mod user;

pub use admin_pin::Entity as AdminPin;
pub use system_settings::Entity as SystemSettings;
pub use user::Entity as User;
