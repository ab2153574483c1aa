use chrono::{DateTime, Utc};

use crate::shared::{AccessError, AccessResult};

pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// Global login-hours restriction.
///
/// Minutes are counted from local midnight; `start > end` describes a
/// window that wraps past midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginTimeRestriction {
    pub enabled: bool,
    pub start_minute_of_day: u16,
    pub end_minute_of_day: u16,
}

impl Default for LoginTimeRestriction {
    fn default() -> Self {
        Self {
            enabled: false,
            start_minute_of_day: 9 * 60,
            end_minute_of_day: 18 * 60,
        }
    }
}

impl LoginTimeRestriction {
    pub fn validate(&self) -> AccessResult<()> {
        if self.start_minute_of_day >= MINUTES_PER_DAY || self.end_minute_of_day >= MINUTES_PER_DAY
        {
            return Err(AccessError::Validation(format!(
                "Window bounds must be within 0..{} minutes",
                MINUTES_PER_DAY
            )));
        }
        if self.enabled && self.start_minute_of_day == self.end_minute_of_day {
            return Err(AccessError::Validation(
                "Window start and end must differ while the restriction is enabled".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemSettings {
    pub login_time_restriction: LoginTimeRestriction,
    pub updated_at: DateTime<Utc>,
}
