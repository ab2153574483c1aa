//! Account approval and activation workflow
//!
//! Owns every account-status transition:
//!
//! ```text
//! Pending ──approve──▶ Approved+Active ◀──activate/deactivate──▶ Approved+Inactive
//!    │                        │                                         │
//!    └──reject──▶ Deleted ◀───┴────────────────delete───────────────────┘
//! ```
//!
//! Writes are conditional on the state read at the start of the call, so two
//! administrators racing on the same account cannot both succeed.

use std::sync::Arc;

use tracing::info;

use crate::application::events::{AccountEvent, Event, SharedEventBus};
use crate::application::session::SessionService;
use crate::domain::{AccessError, AccessResult, StateChange, User, UserRepositoryInterface, UserRole};
use crate::shared::{Clock, SharedClock};

/// Whether `actor` may change or remove `target`.
///
/// Nobody modifies their own account here, and Admin accounts are a
/// protected tier no administrator can deactivate, delete or reject.
pub fn can_modify(actor: &User, target: &User) -> AccessResult<()> {
    refuse_self(actor, &target.id)?;
    match target.role {
        UserRole::Admin => Err(AccessError::ProtectedResource(
            "Administrator accounts cannot be modified".into(),
        )),
        UserRole::Manager | UserRole::Collector | UserRole::Supervisor | UserRole::Member => Ok(()),
    }
}

/// Checked before the caller's role, so self-modification is refused the
/// same way for every role.
fn refuse_self(actor: &User, user_id: &str) -> AccessResult<()> {
    if actor.id == user_id {
        Err(AccessError::ProtectedResource(
            "You cannot modify your own account".into(),
        ))
    } else {
        Ok(())
    }
}

fn require_admin(actor: &User) -> AccessResult<()> {
    match actor.role {
        UserRole::Admin => Ok(()),
        UserRole::Manager | UserRole::Collector | UserRole::Supervisor | UserRole::Member => {
            Err(AccessError::RoleForbidden)
        }
    }
}

pub struct ApprovalWorkflow {
    users: Arc<dyn UserRepositoryInterface>,
    sessions: Arc<SessionService>,
    events: SharedEventBus,
    clock: SharedClock,
}

impl ApprovalWorkflow {
    pub fn new(
        users: Arc<dyn UserRepositoryInterface>,
        sessions: Arc<SessionService>,
        events: SharedEventBus,
        clock: SharedClock,
    ) -> Self {
        Self {
            users,
            sessions,
            events,
            clock,
        }
    }

    // ── Queries ─────────────────────────────────────────────────

    pub async fn list_pending(&self, actor: &User) -> AccessResult<Vec<User>> {
        require_admin(actor)?;
        self.users.list_pending_users().await
    }

    pub async fn list_all(&self, actor: &User) -> AccessResult<Vec<User>> {
        require_admin(actor)?;
        self.users.list_users().await
    }

    // ── Transitions ─────────────────────────────────────────────

    /// Pending → approved. Approving an approved account is a conflict.
    pub async fn approve(&self, actor: &User, user_id: &str) -> AccessResult<User> {
        require_admin(actor)?;
        let target = self.load(user_id).await?;
        if target.is_approved {
            return Err(AccessError::Conflict("Account is already approved".into()));
        }

        self.transition(user_id, StateChange::Approve, "Account is already approved")
            .await?;
        let updated = self.load(user_id).await?;

        info!(user_id, actor_id = %actor.id, "Account approved");
        let event = Event::AccountApproved(account_event(&updated, actor));
        self.events.publish(event, self.clock.now());
        Ok(updated)
    }

    /// Permanently remove an account, whatever its approval state.
    pub async fn reject(&self, actor: &User, user_id: &str) -> AccessResult<()> {
        refuse_self(actor, user_id)?;
        require_admin(actor)?;
        let target = self.load(user_id).await?;
        can_modify(actor, &target)?;

        if !self.users.delete_user(user_id, None).await? {
            return Err(AccessError::user_not_found(user_id));
        }
        self.sessions.revoke_user(user_id);

        info!(user_id, actor_id = %actor.id, "Account rejected");
        let event = Event::AccountRejected(account_event(&target, actor));
        self.events.publish(event, self.clock.now());
        Ok(())
    }

    pub async fn activate(&self, actor: &User, user_id: &str) -> AccessResult<User> {
        self.set_active(actor, user_id, true).await
    }

    pub async fn deactivate(&self, actor: &User, user_id: &str) -> AccessResult<User> {
        self.set_active(actor, user_id, false).await
    }

    /// Permanently remove an approved account. Pending accounts go through `reject`.
    pub async fn delete(&self, actor: &User, user_id: &str) -> AccessResult<()> {
        refuse_self(actor, user_id)?;
        require_admin(actor)?;
        let target = self.load(user_id).await?;
        can_modify(actor, &target)?;
        if !target.is_approved {
            return Err(AccessError::Conflict(
                "Account is pending approval; reject it instead".into(),
            ));
        }

        if !self.users.delete_user(user_id, Some(true)).await? {
            return Err(self.lost_race(user_id, "Account changed concurrently").await);
        }
        self.sessions.revoke_user(user_id);

        info!(user_id, actor_id = %actor.id, "Account deleted");
        let event = Event::AccountDeleted(account_event(&target, actor));
        self.events.publish(event, self.clock.now());
        Ok(())
    }

    async fn set_active(&self, actor: &User, user_id: &str, active: bool) -> AccessResult<User> {
        refuse_self(actor, user_id)?;
        require_admin(actor)?;
        let target = self.load(user_id).await?;
        can_modify(actor, &target)?;
        if !target.is_approved {
            return Err(AccessError::Conflict("Account is pending approval".into()));
        }

        let (change, already) = if active {
            (StateChange::Activate, "Account is already active")
        } else {
            (StateChange::Deactivate, "Account is already inactive")
        };
        if target.is_active == active {
            return Err(AccessError::Conflict(already.into()));
        }

        self.transition(user_id, change, already).await?;
        if !active {
            self.sessions.revoke_user(user_id);
        }
        let updated = self.load(user_id).await?;

        info!(user_id, actor_id = %actor.id, active, "Account activation changed");
        let payload = account_event(&updated, actor);
        let event = if active {
            Event::AccountActivated(payload)
        } else {
            Event::AccountDeactivated(payload)
        };
        self.events.publish(event, self.clock.now());
        Ok(updated)
    }

    async fn load(&self, user_id: &str) -> AccessResult<User> {
        self.users
            .get_user_by_id(user_id)
            .await?
            .ok_or_else(|| AccessError::user_not_found(user_id))
    }

    async fn transition(
        &self,
        user_id: &str,
        change: StateChange,
        conflict: &str,
    ) -> AccessResult<()> {
        let now = self.clock.now();
        if self.users.apply_state_change(user_id, change, now).await? {
            Ok(())
        } else {
            Err(self.lost_race(user_id, conflict).await)
        }
    }

    /// A conditional write matched nothing: the row vanished or another
    /// caller got there first.
    async fn lost_race(&self, user_id: &str, conflict: &str) -> AccessError {
        match self.users.get_user_by_id(user_id).await {
            Ok(Some(_)) => AccessError::Conflict(conflict.to_string()),
            Ok(None) => AccessError::user_not_found(user_id),
            Err(e) => e,
        }
    }
}

fn account_event(target: &User, actor: &User) -> AccountEvent {
    AccountEvent {
        user_id: target.id.clone(),
        identifier: target.identifier.clone(),
        name: target.name.clone(),
        actor_id: actor.id.clone(),
    }
}
