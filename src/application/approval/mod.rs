//! Approval workflow: pending → approved/rejected, active ⇄ inactive

pub mod service;

pub use service::{can_modify, ApprovalWorkflow};
