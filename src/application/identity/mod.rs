//! Identity module: sign-in, registration and account creation

pub mod service;

pub use service::{
    is_valid_identifier, AccessService, AuthResult, IdentityConfig, RegistrationOutcome,
};
