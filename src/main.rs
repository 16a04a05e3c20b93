//! Coverage Backend
//!
//! Tracks team availability from chat time-off announcements and ranks
//! coverage candidates for at-risk tasks, with SQLite persistence.

mod api;
mod config;
mod db;
mod engine;
mod errors;
mod ingest;
mod models;

use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use chrono::Utc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use db::Repository;
use engine::Engine;
use ingest::{
    Classifier, HttpClassifier, HttpMessageSource, MessageSource, UnconfiguredClassifier,
    UnconfiguredSource,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub engine: Arc<Engine>,
    pub source: Arc<dyn MessageSource>,
    pub classifier: Arc<dyn Classifier>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Coverage Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool));

    if let Some(seed_path) = &config.seed_path {
        let loaded = db::seed_if_empty(&repo, seed_path).await?;
        if loaded > 0 {
            tracing::info!("Seeded {} members from {:?}", loaded, seed_path);
        }
    }

    let (source, classifier) = build_collaborators(&config)?;
    let engine = Arc::new(Engine::new(repo.clone()));

    spawn_sweeper(engine.clone(), config.sweep_interval);

    // Create application state
    let state = AppState {
        repo,
        engine,
        source,
        classifier,
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Pick HTTP adapters for the feed and classifier, or stand-ins when unset.
fn build_collaborators(
    config: &Config,
) -> Result<(Arc<dyn MessageSource>, Arc<dyn Classifier>), errors::AppError> {
    let source: Arc<dyn MessageSource> = match &config.feed_url {
        Some(url) => Arc::new(HttpMessageSource::new(url.clone(), config.sync_timeout)?),
        None => {
            tracing::warn!("No message feed configured (COVERAGE_FEED_URL). Sync is disabled!");
            Arc::new(UnconfiguredSource)
        }
    };

    let classifier: Arc<dyn Classifier> = match &config.classifier_url {
        Some(url) => Arc::new(HttpClassifier::new(
            url.clone(),
            config.classifier_timeout,
        )?),
        None => {
            tracing::warn!(
                "No classifier configured (COVERAGE_CLASSIFIER_URL). Fetched messages will be skipped"
            );
            Arc::new(UnconfiguredClassifier)
        }
    };

    Ok((source, classifier))
}

/// Run the expiry sweep on a fixed period for the life of the process.
fn spawn_sweeper(engine: Arc<Engine>, period: std::time::Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Err(e) = engine.sweep(Utc::now()).await {
                tracing::error!("Background sweep failed: {}", e);
            }
        }
    });
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API routes
    let api_routes = Router::new()
        // Datastore
        .route("/datastore", get(api::get_datastore))
        .route("/datastore/revision", get(api::get_revision))
        // Members
        .route("/members", get(api::list_members).post(api::create_member))
        .route("/members/{id}", get(api::get_member))
        .route(
            "/members/{id}/override",
            put(api::set_override).delete(api::clear_override),
        )
        .route("/members/{id}/calendar", put(api::set_calendar))
        .route("/calendar", post(api::batch_calendar))
        // Tasks
        .route("/tasks", get(api::list_tasks).post(api::create_task))
        .route("/tasks/{id}", get(api::get_task))
        .route("/tasks/{id}/status", put(api::set_task_status))
        .route("/tasks/{id}/unassign", post(api::unassign_task))
        .route("/tasks/{id}/reassign", post(api::reassign_task))
        .route("/tasks/{id}/suggestions", get(api::get_suggestions))
        .route("/tasks/{id}/scores", put(api::put_skill_scores))
        // Reconciliation
        .route("/sync", post(api::sync_now))
        .route("/announcements", post(api::apply_announcements))
        .route("/sweep", post(api::run_sweep));

    // Health check
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests;
