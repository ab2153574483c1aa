//! Live-session table
//!
//! A token only works while its session id is present here. Logout and
//! revocation remove the entry; the per-visit admin-panel flag lives on it.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEntry {
    pub user_id: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Admin-panel PIN verified during the current panel visit
    pub panel_verified: bool,
}

#[derive(Default)]
pub struct SessionRegistry {
    sessions: DashMap<String, SessionEntry>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    pub fn insert(&self, session_id: &str, entry: SessionEntry) {
        self.sessions.insert(session_id.to_string(), entry);
    }

    pub fn get(&self, session_id: &str) -> Option<SessionEntry> {
        self.sessions.get(session_id).map(|e| e.clone())
    }

    pub fn remove(&self, session_id: &str) -> bool {
        self.sessions.remove(session_id).is_some()
    }

    /// Drop every session belonging to `user_id`; returns how many went.
    pub fn remove_for_user(&self, user_id: &str) -> usize {
        let mut removed = 0;
        self.sessions.retain(|_, entry| {
            let keep = entry.user_id != user_id;
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }

    /// Set the panel flag; `false` when the session is gone.
    pub fn set_panel_verified(&self, session_id: &str, verified: bool) -> bool {
        match self.sessions.get_mut(session_id) {
            Some(mut entry) => {
                entry.panel_verified = verified;
                true
            }
            None => false,
        }
    }

    pub fn prune_expired(&self, now: DateTime<Utc>) -> usize {
        let mut pruned = 0;
        self.sessions.retain(|_, entry| {
            let keep = entry.expires_at >= now;
            if !keep {
                pruned += 1;
            }
            keep
        });
        if pruned > 0 {
            debug!(pruned, "Expired sessions pruned");
        }
        pruned
    }

    pub fn count(&self) -> usize {
        self.sessions.len()
    }
}
