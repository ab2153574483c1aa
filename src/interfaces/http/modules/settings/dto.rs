//! System settings DTOs
//!
//! Window bounds travel as `"HH:MM"` wall-clock strings and are stored as
//! minutes from midnight.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::{AccessError, AccessResult, LoginTimeRestriction, SystemSettings};

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct LoginTimeRestrictionDto {
    pub enabled: bool,
    /// Start of the allowed window, `HH:MM`
    #[serde(rename = "startTime")]
    #[validate(length(equal = 5, message = "startTime must be HH:MM"))]
    pub start_time: String,
    /// End of the allowed window, `HH:MM`; earlier than start wraps midnight
    #[serde(rename = "endTime")]
    #[validate(length(equal = 5, message = "endTime must be HH:MM"))]
    pub end_time: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SettingsResponse {
    #[serde(rename = "loginTimeRestriction")]
    pub login_time_restriction: LoginTimeRestrictionDto,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateSettingsRequest {
    #[serde(rename = "loginTimeRestriction")]
    #[validate(nested)]
    pub login_time_restriction: LoginTimeRestrictionDto,
}

pub fn format_minute(minute: u16) -> String {
    format!("{:02}:{:02}", minute / 60, minute % 60)
}

pub fn parse_minute(value: &str) -> AccessResult<u16> {
    let invalid = || AccessError::Validation(format!("'{}' is not a valid HH:MM time", value));
    let (hours, minutes) = value.split_once(':').ok_or_else(invalid)?;
    if hours.len() != 2 || minutes.len() != 2 {
        return Err(invalid());
    }
    let hours: u16 = hours.parse().map_err(|_| invalid())?;
    let minutes: u16 = minutes.parse().map_err(|_| invalid())?;
    if hours > 23 || minutes > 59 {
        return Err(invalid());
    }
    Ok(hours * 60 + minutes)
}

impl From<LoginTimeRestriction> for LoginTimeRestrictionDto {
    fn from(r: LoginTimeRestriction) -> Self {
        Self {
            enabled: r.enabled,
            start_time: format_minute(r.start_minute_of_day),
            end_time: format_minute(r.end_minute_of_day),
        }
    }
}

impl TryFrom<LoginTimeRestrictionDto> for LoginTimeRestriction {
    type Error = AccessError;

    fn try_from(dto: LoginTimeRestrictionDto) -> AccessResult<Self> {
        Ok(Self {
            enabled: dto.enabled,
            start_minute_of_day: parse_minute(&dto.start_time)?,
            end_minute_of_day: parse_minute(&dto.end_time)?,
        })
    }
}

impl From<SystemSettings> for SettingsResponse {
    fn from(s: SystemSettings) -> Self {
        Self {
            login_time_restriction: s.login_time_restriction.into(),
            updated_at: s.updated_at,
        }
    }
}
