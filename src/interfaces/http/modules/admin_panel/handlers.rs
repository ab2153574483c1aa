//! Admin panel API handlers
//!
//! Any signed-in caller may reach the PIN endpoints; `access` additionally
//! needs the current visit to be PIN-verified.

use std::sync::Arc;

use axum::{extract::State, Extension, Json};

use super::dto::{PanelAccessResponse, PinStatusResponse, SetupPinRequest, VerifyPinRequest};
use crate::application::pin::PinGate;
use crate::application::session::SessionService;
use crate::interfaces::http::common::{api_error, ApiResponse, ApiResult, EmptyData};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[derive(Clone)]
pub struct AdminPanelState {
    pub pin_gate: Arc<PinGate>,
    pub sessions: Arc<SessionService>,
}

#[utoipa::path(
    post,
    path = "/api/v1/admin-panel/enter",
    tag = "Admin Panel",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "New visit started; PIN must be entered again", body = ApiResponse<PinStatusResponse>)
    )
)]
pub async fn enter_panel(
    State(state): State<AdminPanelState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> ApiResult<PinStatusResponse> {
    let status = state
        .pin_gate
        .enter(&auth.session_id)
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::success(status.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin-panel/pin",
    tag = "Admin Panel",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Whether a PIN has been set", body = ApiResponse<PinStatusResponse>)
    )
)]
pub async fn pin_status(State(state): State<AdminPanelState>) -> ApiResult<PinStatusResponse> {
    let status = state.pin_gate.status().await.map_err(api_error)?;
    Ok(Json(ApiResponse::success(status.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin-panel/pin/setup",
    tag = "Admin Panel",
    security(("bearer_auth" = [])),
    request_body = SetupPinRequest,
    responses(
        (status = 200, description = "PIN stored; visit verified", body = ApiResponse<EmptyData>),
        (status = 400, description = "Mismatch or too short"),
        (status = 409, description = "PIN already set")
    )
)]
pub async fn setup_pin(
    State(state): State<AdminPanelState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(request): Json<SetupPinRequest>,
) -> ApiResult<EmptyData> {
    state
        .pin_gate
        .setup(&auth.session_id, &request.pin, &request.confirm_pin)
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::success(EmptyData {})))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin-panel/pin/verify",
    tag = "Admin Panel",
    security(("bearer_auth" = [])),
    request_body = VerifyPinRequest,
    responses(
        (status = 200, description = "Visit verified", body = ApiResponse<EmptyData>),
        (status = 400, description = "Incorrect PIN"),
        (status = 409, description = "PIN not set up yet")
    )
)]
pub async fn verify_pin(
    State(state): State<AdminPanelState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(request): Json<VerifyPinRequest>,
) -> ApiResult<EmptyData> {
    state
        .pin_gate
        .verify(&auth.session_id, &request.pin)
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::success(EmptyData {})))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin-panel/access",
    tag = "Admin Panel",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Panel unlocked for this visit", body = ApiResponse<PanelAccessResponse>),
        (status = 403, description = "PIN not verified for this visit")
    )
)]
pub async fn panel_access(
    State(state): State<AdminPanelState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> ApiResult<PanelAccessResponse> {
    state
        .pin_gate
        .require_verified(&auth.session_id)
        .map_err(api_error)?;
    Ok(Json(ApiResponse::success(PanelAccessResponse {
        granted: true,
        live_sessions: state.sessions.live_sessions(),
    })))
}
