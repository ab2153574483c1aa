//! Settings module: the global login-hours restriction

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
