//! BehavioralDNA Backend Server
//!
//! Enrollment and login detection over HTTP.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   BEHAVIORAL-DNA SERVER                     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  POST /enroll ──► ProfileStore (JSON) ──► AnomalyScorer.train│
//! │  POST /login  ──► AnomalyScorer.predict ──► LoginLog (CSV)  │
//! │  GET  /logs, /profiles, /status, /health                    │
//! │                       │                                     │
//! │                       ▼                                     │
//! │              FileModelStore (model bundle)                  │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod handlers;
mod models;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
};
use behavioral_dna_core::{AnomalyScorer, FileModelStore, ScorerConfig};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use error::{AppError, AppResult};
use models::{LoginLog, ProfileStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "behavioral_dna_server=debug,behavioral_dna_core=info,tower_http=debug".into()
    });
    if config.is_production() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("BehavioralDNA server starting ({})...", config.environment);

    let state = AppState::open(config.clone())?;
    tracing::info!(
        "Profiles: {} ({} users), model: {}",
        state.profiles.path().display(),
        state.profiles.counts().len(),
        state.config.model_path.display()
    );

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub scorer: Arc<AnomalyScorer>,
    pub profiles: Arc<ProfileStore>,
    pub login_log: Arc<LoginLog>,
    /// Serializes enroll + retrain
    pub enroll_gate: Arc<parking_lot::Mutex<()>>,
    pub config: config::Config,
}

impl AppState {
    /// Open profile store and login log, and load the saved model (if any)
    pub fn open(config: config::Config) -> anyhow::Result<Self> {
        let profiles = ProfileStore::open(&config.profiles_file).with_context(|| {
            format!("failed to load profiles from {}", config.profiles_file.display())
        })?;

        let scorer = AnomalyScorer::new(
            ScorerConfig::from_env(),
            FileModelStore::new(&config.model_path),
        );

        Ok(Self {
            scorer: Arc::new(scorer),
            profiles: Arc::new(profiles),
            login_log: Arc::new(LoginLog::new(&config.login_log_file)),
            enroll_gate: Arc::new(parking_lot::Mutex::new(())),
            config,
        })
    }
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::check))
        .route("/status", get(handlers::health::scorer_status))
        .route("/enroll", post(handlers::detect::enroll))
        .route("/login", post(handlers::detect::login))
        .route("/logs", get(handlers::logs::list))
        .route("/profiles", get(handlers::profiles::list))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
