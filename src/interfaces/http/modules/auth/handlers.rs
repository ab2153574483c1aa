//! Authentication API handlers

use std::sync::Arc;

use axum::{extract::State, http::HeaderMap, http::StatusCode, Extension, Json};

use super::dto::{
    CurrentUserResponse, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, UserDto,
};
use crate::application::identity::{AccessService, AuthResult, RegistrationOutcome};
use crate::interfaces::http::common::{
    api_error, ApiError, ApiResponse, ApiResult, EmptyData, ValidatedJson,
};
use crate::interfaces::http::middleware::{bearer_token, AuthenticatedUser};

/// Auth state
#[derive(Clone)]
pub struct AuthHandlerState {
    pub access: Arc<AccessService>,
}

fn login_response(auth: AuthResult) -> LoginResponse {
    LoginResponse {
        token: auth.session.token,
        token_type: auth.session.token_type,
        expires_in: auth.session.expires_in,
        user: UserDto::from(auth.user),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Invalid credentials"),
        (status = 403, description = "Role forbidden, pending approval, inactive or outside allowed hours")
    )
)]
pub async fn login(
    State(state): State<AuthHandlerState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let auth = state
        .access
        .login(&request.identifier, &request.password)
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::success(login_response(auth))))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = ApiResponse<RegisterResponse>),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Identifier already registered")
    )
)]
pub async fn register(
    State(state): State<AuthHandlerState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RegisterResponse>>), ApiError> {
    let outcome = state
        .access
        .register(&request.name, &request.identifier, &request.password)
        .await
        .map_err(api_error)?;

    let response = match outcome {
        RegistrationOutcome::PendingApproval(_) => RegisterResponse {
            requires_approval: true,
            token: None,
            expires_in: None,
            user: None,
        },
        RegistrationOutcome::SignedIn(auth) => RegisterResponse {
            requires_approval: false,
            token: Some(auth.session.token),
            expires_in: Some(auth.session.expires_in),
            user: Some(UserDto::from(auth.user)),
        },
    };
    Ok((StatusCode::CREATED, Json(ApiResponse::success(response))))
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/check",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Session is valid", body = ApiResponse<CurrentUserResponse>),
        (status = 401, description = "Session revoked or expired")
    )
)]
pub async fn check(
    Extension(auth): Extension<AuthenticatedUser>,
) -> ApiResult<CurrentUserResponse> {
    Ok(Json(ApiResponse::success(CurrentUserResponse {
        user: UserDto::from(auth.user),
    })))
}

/// Always acknowledges, even for unknown or missing tokens.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Logged out", body = ApiResponse<EmptyData>)
    )
)]
pub async fn logout(
    State(state): State<AuthHandlerState>,
    headers: HeaderMap,
) -> Json<ApiResponse<EmptyData>> {
    if let Some(token) = bearer_token(&headers) {
        state.access.logout(token);
    }
    Json(ApiResponse::success(EmptyData {}))
}
