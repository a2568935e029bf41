//! Server setup and initialization
//!
//! Provides the application builder, dependency wiring, and the server
//! runner with graceful shutdown.

use std::sync::Arc;

use axum::Router;
use standup_common::{AppConfig, AppError};
use standup_db::{
    create_pool, run_migrations, DatabaseConfig, PgChannelRepository, PgResponseRepository, PgStandupRepository,
    PgTeamRepository,
};
use standup_service::summarizer::summarizer_from_config;
use standup_service::{Scheduler, SchedulerSettings, ServiceContextBuilder, StandupSettings};
use standup_slack::SlackClient;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::middleware::{apply_middleware, apply_middleware_with_config};
use crate::routes::{create_router, health_routes};
use crate::state::AppState;

/// Build the complete Axum application with all routes and middleware
///
/// Health probes are exempt from rate limiting.
pub fn create_app(state: AppState) -> Router {
    let slack = apply_middleware_with_config(create_router(), &state.config().rate_limit);
    let health = apply_middleware(health_routes());
    health.merge(slack).with_state(state)
}

/// Initialize all dependencies and create AppState
pub async fn create_app_state(config: AppConfig) -> Result<AppState, AppError> {
    info!("Connecting to PostgreSQL...");
    let pool = create_pool(&DatabaseConfig::from(&config.database))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    run_migrations(&pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    info!("PostgreSQL connection established");

    let platform = SlackClient::new(&config.slack.bot_token)
        .map_err(|e| AppError::Config(e.to_string()))?
        .with_base_url(config.slack.api_base_url.clone());
    let summarizer = summarizer_from_config(&config.summarizer).map_err(|e| AppError::Config(e.to_string()))?;
    if config.summarizer.api_key.is_none() {
        warn!("OPENAI_API_KEY not set; summaries will use the fallback format");
    }

    let service_context = ServiceContextBuilder::new()
        .channel_repo(Arc::new(PgChannelRepository::new(pool.clone())))
        .standup_repo(Arc::new(PgStandupRepository::new(pool.clone())))
        .response_repo(Arc::new(PgResponseRepository::new(pool.clone())))
        .team_repo(Arc::new(PgTeamRepository::new(pool.clone())))
        .platform(Arc::new(platform))
        .summarizer(summarizer)
        .settings(StandupSettings::from(&config))
        .build()?;

    Ok(AppState::new(Arc::new(service_context), config, pool))
}

/// Run the HTTP server until `shutdown` is cancelled
pub async fn run_server(app: Router, address: &str, shutdown: CancellationToken) -> Result<(), AppError> {
    let listener = TcpListener::bind(address)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {address}: {e}")))?;

    info!("Server listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| AppError::Internal(e.into()))?;

    Ok(())
}

/// Run the complete server with configuration
///
/// Starts the scheduler when enabled; SIGINT or SIGTERM stops both.
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let address = config.server.address();
    let state = create_app_state(config).await?;
    let shutdown = install_signal_handler();

    let scheduler_tasks = if state.config().scheduler.enabled {
        let settings = SchedulerSettings::from(&state.config().scheduler);
        info!(?settings, "Starting scheduler");
        Scheduler::new(state.service_context_arc(), settings).spawn(shutdown.clone())
    } else {
        info!("Scheduler disabled");
        Vec::new()
    };

    let app = create_app(state);
    let result = run_server(app, &address, shutdown.clone()).await;

    shutdown.cancel();
    for task in scheduler_tasks {
        if let Err(e) = task.await {
            warn!(error = %e, "Scheduler task ended abnormally");
        }
    }
    info!("Server stopped");
    result
}

/// Cancel the returned token on SIGINT or SIGTERM
fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();

    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Failed to listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    sigterm.recv().await;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to install SIGTERM handler");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            () = ctrl_c => info!("Received Ctrl+C, shutting down"),
            () = terminate => info!("Received SIGTERM, shutting down"),
            () = trigger.cancelled() => {}
        }
        trigger.cancel();
        debug!("Shutdown signal handler completed");
    });

    token
}
