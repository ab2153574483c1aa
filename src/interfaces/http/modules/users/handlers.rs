//! User management API handlers
//!
//! Admin-only endpoints over the approval workflow. Role and self-protection
//! checks live in `ApprovalWorkflow`; handlers only translate.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

use super::dto::{CreateUserRequest, UserDto};
use crate::application::approval::ApprovalWorkflow;
use crate::application::identity::AccessService;
use crate::domain::{AccessError, UserRole};
use crate::interfaces::http::common::{
    api_error, ApiError, ApiResponse, ApiResult, EmptyData, ValidatedJson,
};
use crate::interfaces::http::middleware::AuthenticatedUser;

/// User handler state
#[derive(Clone)]
pub struct UserHandlerState {
    pub access: Arc<AccessService>,
    pub workflow: Arc<ApprovalWorkflow>,
}

fn user_list(users: Vec<crate::domain::User>) -> Vec<UserDto> {
    users.into_iter().map(UserDto::from).collect()
}

#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All accounts", body = ApiResponse<Vec<UserDto>>),
        (status = 403, description = "Caller is not an administrator")
    )
)]
pub async fn list_users(
    State(state): State<UserHandlerState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> ApiResult<Vec<UserDto>> {
    let users = state.workflow.list_all(&auth.user).await.map_err(api_error)?;
    Ok(Json(ApiResponse::success(user_list(users))))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/pending",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Accounts awaiting approval", body = ApiResponse<Vec<UserDto>>),
        (status = 403, description = "Caller is not an administrator")
    )
)]
pub async fn list_pending(
    State(state): State<UserHandlerState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> ApiResult<Vec<UserDto>> {
    let users = state
        .workflow
        .list_pending(&auth.user)
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::success(user_list(users))))
}

#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "Account created", body = ApiResponse<UserDto>),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Identifier already registered")
    )
)]
pub async fn create_user(
    State(state): State<UserHandlerState>,
    Extension(auth): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserDto>>), ApiError> {
    let role: UserRole = request
        .role
        .parse()
        .map_err(|e: String| api_error(AccessError::Validation(e)))?;

    let user = state
        .access
        .create_account_as(
            &auth.user,
            &request.name,
            &request.identifier,
            &request.password,
            role,
        )
        .await
        .map_err(api_error)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(UserDto::from(user)))))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/approve",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "Account approved", body = ApiResponse<UserDto>),
        (status = 404, description = "Not found"),
        (status = 409, description = "Already approved")
    )
)]
pub async fn approve_user(
    State(state): State<UserHandlerState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<UserDto> {
    let user = state
        .workflow
        .approve(&auth.user, &id)
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::success(UserDto::from(user))))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/reject",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "Account removed", body = ApiResponse<EmptyData>),
        (status = 403, description = "Protected account"),
        (status = 404, description = "Not found")
    )
)]
pub async fn reject_user(
    State(state): State<UserHandlerState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<EmptyData> {
    state
        .workflow
        .reject(&auth.user, &id)
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::success(EmptyData {})))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/activate",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "Account activated", body = ApiResponse<UserDto>),
        (status = 403, description = "Protected account"),
        (status = 409, description = "Already active or still pending")
    )
)]
pub async fn activate_user(
    State(state): State<UserHandlerState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<UserDto> {
    let user = state
        .workflow
        .activate(&auth.user, &id)
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::success(UserDto::from(user))))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/deactivate",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "Account deactivated", body = ApiResponse<UserDto>),
        (status = 403, description = "Protected account"),
        (status = 409, description = "Already inactive or still pending")
    )
)]
pub async fn deactivate_user(
    State(state): State<UserHandlerState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<UserDto> {
    let user = state
        .workflow
        .deactivate(&auth.user, &id)
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::success(UserDto::from(user))))
}

#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "Account deleted", body = ApiResponse<EmptyData>),
        (status = 403, description = "Protected account"),
        (status = 409, description = "Account is still pending")
    )
)]
pub async fn delete_user(
    State(state): State<UserHandlerState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<EmptyData> {
    state
        .workflow
        .delete(&auth.user, &id)
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::success(EmptyData {})))
}
