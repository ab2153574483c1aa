//! System settings API handlers

use std::sync::Arc;

use axum::{extract::State, Extension, Json};

use super::dto::{SettingsResponse, UpdateSettingsRequest};
use crate::application::access::TimeWindowPolicy;
use crate::domain::LoginTimeRestriction;
use crate::interfaces::http::common::{api_error, ApiResponse, ApiResult, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;
use crate::shared::{Clock, SharedClock};

#[derive(Clone)]
pub struct SettingsHandlerState {
    pub time_window: Arc<TimeWindowPolicy>,
    pub clock: SharedClock,
}

#[utoipa::path(
    get,
    path = "/api/v1/settings",
    tag = "Settings",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current settings", body = ApiResponse<SettingsResponse>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_settings(
    State(state): State<SettingsHandlerState>,
) -> ApiResult<SettingsResponse> {
    let settings = state
        .time_window
        .get(state.clock.now())
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::success(settings.into())))
}

#[utoipa::path(
    put,
    path = "/api/v1/settings",
    tag = "Settings",
    security(("bearer_auth" = [])),
    request_body = UpdateSettingsRequest,
    responses(
        (status = 200, description = "Settings updated", body = ApiResponse<SettingsResponse>),
        (status = 400, description = "Malformed window"),
        (status = 403, description = "Caller is not the designated account")
    )
)]
pub async fn update_settings(
    State(state): State<SettingsHandlerState>,
    Extension(auth): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<UpdateSettingsRequest>,
) -> ApiResult<SettingsResponse> {
    let restriction =
        LoginTimeRestriction::try_from(request.login_time_restriction).map_err(api_error)?;
    let saved = state
        .time_window
        .update(&auth.user, restriction, state.clock.now())
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::success(saved.into())))
}
