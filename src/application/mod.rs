//! Application layer: the services that make access decisions and own
//! every account state transition.

pub mod access;
pub mod approval;
pub mod events;
pub mod identity;
pub mod pin;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use access::{AccessPolicyEngine, LoginExemption, TimeWindowPolicy};
pub use approval::ApprovalWorkflow;
pub use events::{create_event_bus, Event, EventBus, EventSubscriber, SharedEventBus};
pub use identity::{AccessService, AuthResult, IdentityConfig, RegistrationOutcome};
pub use pin::{PinGate, PinStatus};
pub use session::{CachedIdentity, SessionGateway, SessionService};
