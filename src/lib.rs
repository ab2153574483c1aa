//! # Staff Access Service
//!
//! Access control for a staff back office: role-gated sign-in, an account
//! approval workflow, a global login-hours restriction with one exempt
//! identity, and a PIN gate in front of the restricted admin panel.
//!
//! ## Architecture
//!
//! - **domain**: accounts, settings and PIN records plus repository traits
//! - **application**: access policy, sessions, approval workflow, PIN gate
//! - **infrastructure**: SeaORM persistence, bcrypt and JWT
//! - **interfaces**: REST API with Swagger documentation
//! - **server**: runtime wiring and graceful shutdown

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use application::events::{create_event_bus, Event, EventBus, SharedEventBus};
pub use config::{default_config_path, AppConfig};
pub use infrastructure::{init_database, DatabaseConfig};
pub use interfaces::http::create_api_router;
