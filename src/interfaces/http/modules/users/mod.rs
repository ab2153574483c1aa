//! User management module: approval queue and account lifecycle

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
