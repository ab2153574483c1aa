//! Service runtime: wiring, startup and graceful shutdown.
//!
//! `main` loads the configuration and hands it to [`run`]; everything from
//! the database connection to the HTTP listener is assembled here.

use std::sync::Arc;
use std::time::Instant;

use chrono::FixedOffset;
use sea_orm::DatabaseConnection;
use tracing::{error, info, warn};

use crate::application::access::{AccessPolicyEngine, LoginExemption, TimeWindowPolicy};
use crate::application::approval::ApprovalWorkflow;
use crate::application::events::{create_event_bus, EventSubscriber};
use crate::application::identity::AccessService;
use crate::application::pin::PinGate;
use crate::application::session::SessionService;
use crate::config::AppConfig;
use crate::domain::{AccessError, AccessResult, UserRepositoryInterface};
use crate::infrastructure::database::repositories::{
    PinRepository, SettingsRepository, UserRepository,
};
use crate::infrastructure::init_database;
use crate::interfaces::http::{create_api_router, ApiState};
use crate::shared::{shutdown_signal, SharedClock, SystemClock};

pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match config.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}

/// Wire every service over `db` and seed the bootstrap administrator.
pub async fn build_state(
    db: DatabaseConnection,
    config: &AppConfig,
    clock: SharedClock,
) -> AccessResult<ApiState> {
    let users: Arc<dyn UserRepositoryInterface> = Arc::new(UserRepository::new(db.clone()));
    let settings = Arc::new(SettingsRepository::new(db.clone()));
    let pins = Arc::new(PinRepository::new(db.clone()));
    let identity = config.identity_config();

    let utc_offset = FixedOffset::east_opt(config.access.utc_offset_minutes * 60).ok_or_else(
        || AccessError::Validation("access.utc_offset_minutes is out of range".into()),
    )?;
    let exemption = LoginExemption::new(config.access.exempt_identity.as_deref());
    match exemption.identifier() {
        Some(identifier) => info!(%identifier, "Login-hours exemption configured"),
        None => warn!("No exempt identity configured; login hours cannot be changed"),
    }
    let time_window = Arc::new(TimeWindowPolicy::new(settings, exemption, utc_offset));

    let policy = AccessPolicyEngine::new(users.clone(), time_window.clone(), identity.hash_cost)?;
    let sessions = Arc::new(SessionService::new(
        users.clone(),
        config.jwt_config(),
        clock.clone(),
    ));
    let access = Arc::new(AccessService::new(
        users.clone(),
        policy,
        sessions.clone(),
        clock.clone(),
        identity.clone(),
    ));

    let events = create_event_bus();
    tokio::spawn(log_account_events(events.subscribe()));
    let workflow = Arc::new(ApprovalWorkflow::new(
        users,
        sessions.clone(),
        events,
        clock.clone(),
    ));
    let pin_gate = Arc::new(PinGate::new(pins, sessions, clock.clone(), identity.hash_cost));

    let admin = &config.admin;
    if let Some(user) = access
        .ensure_bootstrap_admin(&admin.name, &admin.identifier, &admin.password)
        .await?
    {
        warn!(identifier = %user.identifier, "Bootstrap administrator created; change its password");
    }

    Ok(ApiState {
        access,
        workflow,
        time_window,
        pin_gate,
        clock,
        db,
        started_at: Arc::new(Instant::now()),
    })
}

/// Account notifications go to the log; publishing never waits on this.
async fn log_account_events(mut events: EventSubscriber) {
    while let Some(message) = events.recv().await {
        let account = message.event.account();
        info!(
            event = message.event.event_type(),
            user_id = %account.user_id,
            identifier = %account.identifier,
            actor_id = %account.actor_id,
            "Account notification"
        );
    }
}

/// Run until SIGINT/SIGTERM.
pub async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting staff access service...");

    info!("Database: {}", config.database.url);
    let db = init_database(&config.database).await.map_err(|e| {
        error!("Failed to initialise database: {}", e);
        e
    })?;

    let clock: SharedClock = Arc::new(SystemClock);
    let state = build_state(db.clone(), &config, clock).await?;
    let router = create_api_router(state);

    let addr = config.server.address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("REST API server listening on http://{}", addr);
    info!("Swagger UI available at http://{}/docs/", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            info!("🛑 REST API server received shutdown signal");
        })
        .await?;

    if let Err(e) = db.close().await {
        warn!("Error closing database connection: {}", e);
    } else {
        info!("✅ Database connection closed");
    }
    info!("👋 Staff access service shutdown complete");
    Ok(())
}
