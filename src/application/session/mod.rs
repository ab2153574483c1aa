//! Session issuance, verification and the caller-side cache

pub mod client;
pub mod registry;
pub mod service;

pub use client::{CachedIdentity, SessionGateway};
pub use registry::{SessionEntry, SessionRegistry};
pub use service::{IssuedSession, SessionService, VerifiedSession};
