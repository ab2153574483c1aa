pub mod admin_panel;
pub mod auth;
pub mod health;
pub mod settings;
pub mod users;
