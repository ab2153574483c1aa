//! Admin-panel PIN gate

pub mod service;

pub use service::{PinGate, PinStatus, PIN_MIN_LENGTH};
