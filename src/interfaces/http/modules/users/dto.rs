//! User management DTOs

use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

pub use crate::interfaces::http::modules::auth::dto::UserDto;

/// Staff or member account created by an administrator
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 100, message = "name must be 1–100 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 254, message = "identifier is required"))]
    pub identifier: String,
    #[serde(alias = "secret")]
    #[validate(length(min = 1, max = 128, message = "password must be 1–128 characters"))]
    pub password: String,
    /// manager, collector, supervisor or member
    #[validate(length(min = 1, message = "role is required"))]
    pub role: String,
}
