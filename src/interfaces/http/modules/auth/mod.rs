//! Authentication module: login, register, session check, logout

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
