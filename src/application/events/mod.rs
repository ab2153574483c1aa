//! Account lifecycle notifications

pub mod event_bus;
pub mod types;

pub use event_bus::{create_event_bus, EventBus, EventSubscriber, SharedEventBus};
pub use types::{AccountEvent, Event, EventMessage};
