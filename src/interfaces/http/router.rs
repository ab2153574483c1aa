//! API Router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::FromRef,
    middleware,
    routing::{delete, get, post},
    Router,
};
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::application::access::TimeWindowPolicy;
use crate::application::approval::ApprovalWorkflow;
use crate::application::identity::AccessService;
use crate::application::pin::PinGate;
use crate::interfaces::http::common::{ApiResponse, EmptyData};
use crate::interfaces::http::middleware::{auth_middleware, AuthState};
use crate::shared::SharedClock;

use super::modules::{admin_panel, auth, health, settings, users};

/// Everything the HTTP surface needs. Each handler extracts its own slice
/// through `FromRef`.
#[derive(Clone)]
pub struct ApiState {
    pub access: Arc<AccessService>,
    pub workflow: Arc<ApprovalWorkflow>,
    pub time_window: Arc<TimeWindowPolicy>,
    pub pin_gate: Arc<PinGate>,
    pub clock: SharedClock,
    pub db: DatabaseConnection,
    pub started_at: Arc<Instant>,
}

impl FromRef<ApiState> for AuthState {
    fn from_ref(s: &ApiState) -> Self {
        AuthState {
            access: Arc::clone(&s.access),
        }
    }
}

impl FromRef<ApiState> for auth::AuthHandlerState {
    fn from_ref(s: &ApiState) -> Self {
        auth::AuthHandlerState {
            access: Arc::clone(&s.access),
        }
    }
}

impl FromRef<ApiState> for users::UserHandlerState {
    fn from_ref(s: &ApiState) -> Self {
        users::UserHandlerState {
            access: Arc::clone(&s.access),
            workflow: Arc::clone(&s.workflow),
        }
    }
}

impl FromRef<ApiState> for settings::SettingsHandlerState {
    fn from_ref(s: &ApiState) -> Self {
        settings::SettingsHandlerState {
            time_window: Arc::clone(&s.time_window),
            clock: Arc::clone(&s.clock),
        }
    }
}

impl FromRef<ApiState> for admin_panel::AdminPanelState {
    fn from_ref(s: &ApiState) -> Self {
        admin_panel::AdminPanelState {
            pin_gate: Arc::clone(&s.pin_gate),
            sessions: Arc::clone(s.access.sessions()),
        }
    }
}

impl FromRef<ApiState> for health::HealthState {
    fn from_ref(s: &ApiState) -> Self {
        health::HealthState {
            db: s.db.clone(),
            sessions: Arc::clone(s.access.sessions()),
            started_at: Arc::clone(&s.started_at),
        }
    }
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Session token from /api/v1/auth/login"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::register,
        auth::check,
        auth::logout,
        settings::get_settings,
        settings::update_settings,
        users::list_users,
        users::list_pending,
        users::create_user,
        users::approve_user,
        users::reject_user,
        users::activate_user,
        users::deactivate_user,
        users::delete_user,
        admin_panel::enter_panel,
        admin_panel::pin_status,
        admin_panel::setup_pin,
        admin_panel::verify_pin,
        admin_panel::panel_access,
    ),
    components(schemas(
        EmptyData,
        ApiResponse<EmptyData>,
        health::HealthResponse,
        health::ComponentHealth,
        auth::LoginRequest,
        auth::LoginResponse,
        auth::RegisterRequest,
        auth::RegisterResponse,
        auth::CurrentUserResponse,
        auth::UserDto,
        users::CreateUserRequest,
        settings::LoginTimeRestrictionDto,
        settings::SettingsResponse,
        settings::UpdateSettingsRequest,
        admin_panel::PinStatusResponse,
        admin_panel::SetupPinRequest,
        admin_panel::VerifyPinRequest,
        admin_panel::PanelAccessResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service health check"),
        (name = "Authentication", description = "Sign-in, self-registration, session check and logout"),
        (name = "Users", description = "Approval queue and account lifecycle (administrators only)"),
        (name = "Settings", description = "Global login-hours restriction"),
        (name = "Admin Panel", description = "PIN gate in front of the restricted admin panel"),
    ),
    info(
        title = "Staff Access Service API",
        version = "0.1.0",
        description = "Role-gated sign-in, account approval workflow, login-hours restriction and admin-panel PIN gate"
    )
)]
pub struct ApiDoc;

pub fn create_api_router(state: ApiState) -> Router {
    let auth_layer = || {
        middleware::from_fn_with_state(AuthState::from_ref(&state), auth_middleware)
    };

    // /check needs a live session; logout acknowledges with or without one.
    let auth_routes = Router::new()
        .route("/check", get(auth::check))
        .layer(auth_layer())
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .route("/logout", post(auth::logout));

    let settings_routes = Router::new()
        .route(
            "/",
            get(settings::get_settings).put(settings::update_settings),
        )
        .layer(auth_layer());

    let user_routes = Router::new()
        .route("/", get(users::list_users).post(users::create_user))
        .route("/pending", get(users::list_pending))
        .route("/{id}", delete(users::delete_user))
        .route("/{id}/approve", post(users::approve_user))
        .route("/{id}/reject", post(users::reject_user))
        .route("/{id}/activate", post(users::activate_user))
        .route("/{id}/deactivate", post(users::deactivate_user))
        .layer(auth_layer());

    let admin_panel_routes = Router::new()
        .route("/enter", post(admin_panel::enter_panel))
        .route("/pin", get(admin_panel::pin_status))
        .route("/pin/setup", post(admin_panel::setup_pin))
        .route("/pin/verify", post(admin_panel::verify_pin))
        .route("/access", get(admin_panel::panel_access))
        .layer(auth_layer());

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    Router::new()
        .merge(swagger_routes)
        .route("/health", get(health::health_check))
        .nest("/api/v1/auth", auth_routes)
        .nest("/api/v1/settings", settings_routes)
        .nest("/api/v1/users", user_routes)
        .nest("/api/v1/admin-panel", admin_panel_routes)
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::Fixture;
    use crate::domain::UserRole;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app(fx: &Fixture) -> Router {
        create_api_router(ApiState {
            access: fx.access.clone(),
            workflow: fx.workflow.clone(),
            time_window: fx.time_window.clone(),
            pin_gate: fx.pin_gate.clone(),
            clock: fx.clock.clone(),
            db: fx.db.clone(),
            started_at: Arc::new(Instant::now()),
        })
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn login(app: &Router, identifier: &str, password: &str) -> (StatusCode, Value) {
        send(
            app,
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({"identifier": identifier, "password": password})),
        )
        .await
    }

    async fn token_for(app: &Router, identifier: &str) -> String {
        let (status, body) = login(app, identifier, "secret1").await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["data"]["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let fx = Fixture::new().await;
        let (status, body) = send(&app(&fx), Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["database"]["status"], "ok");
    }

    #[tokio::test]
    async fn register_approve_login_over_http() {
        let fx = Fixture::new().await;
        fx.staff("admin@x.com", "secret1", UserRole::Admin).await;
        let app = app(&fx);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/auth/register",
            None,
            Some(json!({"name": "Karim", "identifier": "karim@x.com", "password": "secret1"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["requiresApproval"], true);
        assert!(body["data"].get("token").is_none());

        let (status, body) = login(&app, "karim@x.com", "secret1").await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], "pending_approval");
        assert_eq!(body["requiresApproval"], true);

        let admin = token_for(&app, "admin@x.com").await;
        let (status, body) =
            send(&app, Method::GET, "/api/v1/users/pending", Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);
        let pending = body["data"].as_array().unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0]["name"], "Karim");
        assert_eq!(pending[0]["isApproved"], false);
        let karim_id = pending[0]["id"].as_str().unwrap().to_string();

        let (status, _) = send(
            &app,
            Method::POST,
            &format!("/api/v1/users/{}/approve", karim_id),
            Some(&admin),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = login(&app, "karim@x.com", "secret1").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["data"]["token"].as_str().is_some());
        assert_eq!(body["data"]["user"]["role"], "admin");
    }

    #[tokio::test]
    async fn protected_routes_need_a_live_token() {
        let fx = Fixture::new().await;
        let app = app(&fx);

        let (status, body) = send(&app, Method::GET, "/api/v1/auth/check", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "session_revoked");

        let (status, _) =
            send(&app, Method::GET, "/api/v1/settings", Some("not-a-token"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn members_cannot_sign_in() {
        let fx = Fixture::new().await;
        fx.staff("member@x.com", "secret1", UserRole::Member).await;

        let (status, body) = login(&app(&fx), "member@x.com", "secret1").await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], "role_forbidden");
    }

    #[tokio::test]
    async fn deactivation_cuts_off_an_open_session() {
        let fx = Fixture::new().await;
        fx.staff("admin@x.com", "secret1", UserRole::Admin).await;
        let collector = fx.staff("c@x.com", "secret1", UserRole::Collector).await;
        let app = app(&fx);
        let admin = token_for(&app, "admin@x.com").await;
        let token = token_for(&app, "c@x.com").await;

        let (status, _) = send(&app, Method::GET, "/api/v1/auth/check", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(
            &app,
            Method::POST,
            &format!("/api/v1/users/{}/deactivate", collector.id),
            Some(&admin),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(&app, Method::GET, "/api/v1/auth/check", Some(&token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn admins_cannot_touch_themselves_or_other_admins() {
        let fx = Fixture::new().await;
        let me = fx.staff("admin@x.com", "secret1", UserRole::Admin).await;
        let other = fx.staff("other@x.com", "secret1", UserRole::Admin).await;
        let app = app(&fx);
        let admin = token_for(&app, "admin@x.com").await;

        for id in [&me.id, &other.id] {
            let (status, body) = send(
                &app,
                Method::POST,
                &format!("/api/v1/users/{}/deactivate", id),
                Some(&admin),
                None,
            )
            .await;
            assert_eq!(status, StatusCode::FORBIDDEN);
            assert_eq!(body["code"], "protected_resource_error");
        }
    }

    #[tokio::test]
    async fn only_the_exempt_identity_changes_login_hours() {
        let fx = Fixture::new().await;
        fx.staff("owner@x.com", "secret1", UserRole::Admin).await;
        fx.staff("admin@x.com", "secret1", UserRole::Admin).await;
        let app = app(&fx);
        let owner = token_for(&app, "owner@x.com").await;
        let admin = token_for(&app, "admin@x.com").await;
        let update = json!({
            "loginTimeRestriction": {"enabled": true, "startTime": "09:00", "endTime": "18:00"}
        });

        let (status, body) = send(
            &app,
            Method::PUT,
            "/api/v1/settings",
            Some(&admin),
            Some(update.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], "protected_resource_error");

        let (status, body) =
            send(&app, Method::PUT, "/api/v1/settings", Some(&owner), Some(update)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["loginTimeRestriction"]["startTime"], "09:00");

        let (status, body) = send(&app, Method::GET, "/api/v1/settings", Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["loginTimeRestriction"]["enabled"], true);
    }

    #[tokio::test]
    async fn malformed_window_is_rejected() {
        let fx = Fixture::new().await;
        fx.staff("owner@x.com", "secret1", UserRole::Admin).await;
        let app = app(&fx);
        let owner = token_for(&app, "owner@x.com").await;

        let (status, body) = send(
            &app,
            Method::PUT,
            "/api/v1/settings",
            Some(&owner),
            Some(json!({
                "loginTimeRestriction": {"enabled": true, "startTime": "25:00", "endTime": "18:00"}
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "validation_error");
    }

    #[tokio::test]
    async fn admin_panel_pin_flow() {
        let fx = Fixture::new().await;
        fx.staff("admin@x.com", "secret1", UserRole::Admin).await;
        let app = app(&fx);
        let token = token_for(&app, "admin@x.com").await;
        let t = Some(token.as_str());

        let (status, body) = send(&app, Method::POST, "/api/v1/admin-panel/enter", t, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["isSet"], false);

        let (status, _) = send(&app, Method::GET, "/api/v1/admin-panel/access", t, None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/v1/admin-panel/pin/setup",
            t,
            Some(json!({"pin": "1234", "confirmPin": "1234"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, Method::GET, "/api/v1/admin-panel/access", t, None).await;
        assert_eq!(status, StatusCode::OK);

        send(&app, Method::POST, "/api/v1/admin-panel/enter", t, None).await;
        let (status, _) = send(&app, Method::GET, "/api/v1/admin-panel/access", t, None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/admin-panel/pin/verify",
            t,
            Some(json!({"pin": "9999"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "validation_error");

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/v1/admin-panel/pin/verify",
            t,
            Some(json!({"pin": "1234"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = send(&app, Method::GET, "/api/v1/admin-panel/pin", t, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["isSet"], true);
        let (status, _) = send(&app, Method::GET, "/api/v1/admin-panel/access", t, None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn logout_always_acknowledges_and_ends_the_session() {
        let fx = Fixture::new().await;
        fx.staff("admin@x.com", "secret1", UserRole::Admin).await;
        let app = app(&fx);
        let token = token_for(&app, "admin@x.com").await;

        let (status, _) =
            send(&app, Method::POST, "/api/v1/auth/logout", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, Method::GET, "/api/v1/auth/check", Some(&token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = send(&app, Method::POST, "/api/v1/auth/logout", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
    }

    #[tokio::test]
    async fn administrators_create_staff_accounts() {
        let fx = Fixture::new().await;
        fx.staff("admin@x.com", "secret1", UserRole::Admin).await;
        let app = app(&fx);
        let admin = token_for(&app, "admin@x.com").await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/users",
            Some(&admin),
            Some(json!({
                "name": "Sup", "identifier": "+998901234567",
                "password": "secret1", "role": "supervisor"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["role"], "supervisor");

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/v1/users",
            Some(&admin),
            Some(json!({
                "name": "X", "identifier": "x@x.com", "password": "secret1", "role": "owner"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = login(&app, "+998901234567", "secret1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["user"]["name"], "Sup");
    }
}
