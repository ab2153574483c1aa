//! Authentication DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::User;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    /// Email address or phone number
    #[validate(length(min = 1, max = 254, message = "identifier is required"))]
    pub identifier: String,
    #[serde(alias = "secret")]
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: UserDto,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100, message = "name must be 1–100 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 254, message = "identifier is required"))]
    pub identifier: String,
    #[serde(alias = "secret")]
    #[validate(length(min = 1, max = 128, message = "password must be 1–128 characters"))]
    pub password: String,
}

/// `{requiresApproval: true}` while the account waits for an administrator,
/// otherwise the signed-in session.
#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterResponse {
    #[serde(rename = "requiresApproval")]
    pub requires_approval: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserDto>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CurrentUserResponse {
    pub user: UserDto,
}

/// Account as exposed over HTTP; never carries the secret hash.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserDto {
    pub id: String,
    pub identifier: String,
    pub name: String,
    pub role: String,
    #[serde(rename = "isApproved")]
    pub is_approved: bool,
    #[serde(rename = "isActive")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            identifier: user.identifier,
            name: user.name,
            role: user.role.as_str().to_string(),
            is_approved: user.is_approved,
            is_active: user.is_active,
            created_at: user.created_at,
            last_login_at: user.last_login_at,
        }
    }
}
