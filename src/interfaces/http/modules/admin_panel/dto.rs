//! Admin panel DTOs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::pin::PinStatus;

#[derive(Debug, Serialize, ToSchema)]
pub struct PinStatusResponse {
    #[serde(rename = "isSet")]
    pub is_set: bool,
}

impl From<PinStatus> for PinStatusResponse {
    fn from(status: PinStatus) -> Self {
        Self {
            is_set: status.is_set,
        }
    }
}

/// Format rules (length, confirmation) are enforced by the PIN gate.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SetupPinRequest {
    pub pin: String,
    #[serde(rename = "confirmPin")]
    pub confirm_pin: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyPinRequest {
    pub pin: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PanelAccessResponse {
    pub granted: bool,
    pub live_sessions: usize,
}
