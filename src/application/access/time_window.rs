//! Global login-hours restriction
//!
//! The restriction applies to every sign-in except the single exempt
//! identity, which is also the only identity allowed to change it. The
//! exemption is configured out-of-band and never derived from role.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Timelike, Utc};
use tracing::{info, warn};

use crate::domain::{
    normalize_identifier, AccessError, AccessResult, LoginTimeRestriction,
    SettingsRepositoryInterface, SystemSettings, User,
};

/// The identity immune to the login-hours gate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginExemption {
    identifier: Option<String>,
}

impl LoginExemption {
    pub fn new(identifier: Option<&str>) -> Self {
        let identifier = identifier
            .map(normalize_identifier)
            .filter(|s| !s.is_empty());
        Self { identifier }
    }

    pub fn covers(&self, identifier: &str) -> bool {
        match &self.identifier {
            Some(exempt) => *exempt == normalize_identifier(identifier),
            None => false,
        }
    }

    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }
}

/// Minute of the local day (`hour * 60 + minute`) at `now`.
pub fn minute_of_day(now: DateTime<Utc>, offset: FixedOffset) -> u16 {
    let local = now.with_timezone(&offset);
    (local.hour() * 60 + local.minute()) as u16
}

/// Window membership for a minute of the day.
///
/// `start <= end`: half-open `[start, end)`. `start > end`: the window wraps
/// past midnight and covers `[start, 1440) ∪ [0, end)`.
pub fn window_allows(restriction: &LoginTimeRestriction, minute: u16) -> bool {
    let (start, end) = (
        restriction.start_minute_of_day,
        restriction.end_minute_of_day,
    );
    if start <= end {
        start <= minute && minute < end
    } else {
        minute >= start || minute < end
    }
}

pub struct TimeWindowPolicy {
    settings: Arc<dyn SettingsRepositoryInterface>,
    exemption: LoginExemption,
    utc_offset: FixedOffset,
}

impl TimeWindowPolicy {
    pub fn new(
        settings: Arc<dyn SettingsRepositoryInterface>,
        exemption: LoginExemption,
        utc_offset: FixedOffset,
    ) -> Self {
        Self {
            settings,
            exemption,
            utc_offset,
        }
    }

    pub fn is_exempt(&self, identifier: &str) -> bool {
        self.exemption.covers(identifier)
    }

    /// Current settings; readable by any authenticated session.
    pub async fn get(&self, now: DateTime<Utc>) -> AccessResult<SystemSettings> {
        self.settings.get_or_init(now).await
    }

    /// Replace the restriction. Only the exempt identity may do this.
    pub async fn update(
        &self,
        actor: &User,
        restriction: LoginTimeRestriction,
        now: DateTime<Utc>,
    ) -> AccessResult<SystemSettings> {
        if !self.is_exempt(&actor.identifier) {
            warn!(user_id = %actor.id, "Login-hours update refused for non-exempt identity");
            return Err(AccessError::ProtectedResource(
                "Only the designated account may change login hours".into(),
            ));
        }
        restriction.validate()?;

        let saved = self
            .settings
            .save_login_time_restriction(restriction, now)
            .await?;
        info!(
            user_id = %actor.id,
            enabled = restriction.enabled,
            start = restriction.start_minute_of_day,
            end = restriction.end_minute_of_day,
            "Login-hours restriction updated"
        );
        Ok(saved)
    }

    /// Sign-in gate: `OutsideAllowedHours` when the restriction is enabled,
    /// the identifier is not exempt, and `now` falls outside the window.
    pub async fn permits_login(&self, identifier: &str, now: DateTime<Utc>) -> AccessResult<()> {
        let settings = self.settings.get_or_init(now).await?;
        let restriction = settings.login_time_restriction;
        if !restriction.enabled || self.is_exempt(identifier) {
            return Ok(());
        }

        let minute = minute_of_day(now, self.utc_offset);
        if window_allows(&restriction, minute) {
            Ok(())
        } else {
            Err(AccessError::OutsideAllowedHours)
        }
    }
}
