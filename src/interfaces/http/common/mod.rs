//! Response envelope and error mapping shared by every handler

pub mod validated_json;

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use crate::domain::AccessError;

pub use validated_json::ValidatedJson;

/// Standard API response envelope
///
/// Success: `{"success": true, "data": {...}}`.
/// Failure: `{"success": false, "error": "...", "code": "pending_approval"}`,
/// plus `"requiresApproval": true` when sign-in waits on an administrator.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Machine-readable error kind
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(rename = "requiresApproval", skip_serializing_if = "Option::is_none")]
    pub requires_approval: Option<bool>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            code: None,
            requires_approval: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            code: None,
            requires_approval: None,
        }
    }

    pub fn from_error(err: &AccessError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(err.to_string()),
            code: Some(err.kind().to_string()),
            requires_approval: matches!(err, AccessError::PendingApproval).then_some(true),
        }
    }
}

/// Empty payload for acknowledgements
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EmptyData {}

pub type ApiError = (StatusCode, Json<ApiResponse<()>>);

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

pub fn status_for(err: &AccessError) -> StatusCode {
    match err {
        AccessError::InvalidCredentials | AccessError::SessionRevoked => StatusCode::UNAUTHORIZED,
        AccessError::RoleForbidden
        | AccessError::PendingApproval
        | AccessError::AccountInactive
        | AccessError::OutsideAllowedHours
        | AccessError::ProtectedResource(_) => StatusCode::FORBIDDEN,
        AccessError::Validation(_) => StatusCode::BAD_REQUEST,
        AccessError::Conflict(_) => StatusCode::CONFLICT,
        AccessError::NotFound { .. } => StatusCode::NOT_FOUND,
        AccessError::Storage(_) | AccessError::Crypto(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Convert a service error into its HTTP response.
pub fn api_error(err: AccessError) -> ApiError {
    let status = status_for(&err);
    if status.is_server_error() {
        error!(kind = err.kind(), error = %err, "Request failed");
    }
    (status, Json(ApiResponse::from_error(&err)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_approval_sets_the_flag() {
        let body = serde_json::to_value(ApiResponse::<()>::from_error(
            &AccessError::PendingApproval,
        ))
        .unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "pending_approval");
        assert_eq!(body["requiresApproval"], true);

        let body = serde_json::to_value(ApiResponse::<()>::from_error(
            &AccessError::InvalidCredentials,
        ))
        .unwrap();
        assert!(body.get("requiresApproval").is_none());
    }

    #[test]
    fn denials_map_to_auth_statuses() {
        assert_eq!(status_for(&AccessError::InvalidCredentials), StatusCode::UNAUTHORIZED);
        assert_eq!(status_for(&AccessError::SessionRevoked), StatusCode::UNAUTHORIZED);
        assert_eq!(status_for(&AccessError::RoleForbidden), StatusCode::FORBIDDEN);
        assert_eq!(
            status_for(&AccessError::ProtectedResource("self".into())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(status_for(&AccessError::Conflict("x".into())), StatusCode::CONFLICT);
        assert_eq!(status_for(&AccessError::user_not_found("x")), StatusCode::NOT_FOUND);
    }
}
