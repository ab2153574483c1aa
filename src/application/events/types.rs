//! Account lifecycle events
//!
//! Published by the approval workflow for whoever delivers notifications
//! (mail, SMS, UI push). Delivery is not part of the workflow's contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Event {
    AccountApproved(AccountEvent),
    AccountRejected(AccountEvent),
    AccountActivated(AccountEvent),
    AccountDeactivated(AccountEvent),
    AccountDeleted(AccountEvent),
}

impl Event {
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::AccountApproved(_) => "account_approved",
            Event::AccountRejected(_) => "account_rejected",
            Event::AccountActivated(_) => "account_activated",
            Event::AccountDeactivated(_) => "account_deactivated",
            Event::AccountDeleted(_) => "account_deleted",
        }
    }

    pub fn account(&self) -> &AccountEvent {
        match self {
            Event::AccountApproved(e)
            | Event::AccountRejected(e)
            | Event::AccountActivated(e)
            | Event::AccountDeactivated(e)
            | Event::AccountDeleted(e) => e,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountEvent {
    pub user_id: String,
    pub identifier: String,
    pub name: String,
    /// Administrator who performed the transition
    pub actor_id: String,
}

/// Event with delivery metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub event: Event,
}

impl EventMessage {
    pub fn new(event: Event, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp,
            event,
        }
    }
}
