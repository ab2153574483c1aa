//! User aggregate
//!
//! Contains the User entity, DTOs, and repository interface.

pub mod model;
pub mod repository;

mod dto_create;

// Re-export model types
pub use model::{User, UserRole};

// Re-export DTOs
pub use dto_create::CreateUserDto;

// Re-export repository trait
pub use repository::{StateChange, UserRepositoryInterface};
