//! Student Dropout Risk API Server
//!
//! HTTP front end for the dropout risk classifier.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   DROPOUT RISK API                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌─────────────────┐  ┌───────────────────┐ │
//! │  │  API      │  │  RiskClassifier │  │  High-risk        │ │
//! │  │  Gateway  │─►│  (shared model, │  │  registry         │ │
//! │  │  (Axum)   │  │   read-only)    │  │  (optional)       │ │
//! │  └─────┬─────┘  └─────────────────┘  └─────────┬─────────┘ │
//! │        └───────────────────────────────────────┘           │
//! │                                 ▼                          │
//! │                          ┌─────────────┐                   │
//! │                          │ PostgreSQL  │                   │
//! │                          └─────────────┘                   │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod db;
mod models;
mod handlers;
mod error;

#[cfg(test)]
mod tests;

use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
};
use dropout_risk_core::{PredictionResult, RiskClassifier};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use std::net::SocketAddr;

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "dropout_risk_api=debug,dropout_risk_core=info,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);
    if config.log_json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Dropout Risk API starting...");
    tracing::info!("Database: {}", config.database_display());

    // Load the fitted model once; a missing model degrades to 503s
    let classifier = match dropout_risk_core::load_model(&config.model_path) {
        Ok(model) => RiskClassifier::new(model),
        Err(e) => {
            tracing::warn!("Model could not be loaded ({}). Predictions will be unavailable.", e);
            RiskClassifier::unavailable()
        }
    };

    // Initialize database pool
    let pool = match &config.database_url {
        Some(url) => {
            let pool = db::create_pool(url, config.database_max_connections)
                .await
                .context("Failed to create database pool")?;

            tracing::info!("Running database migrations...");
            db::run_migrations(&pool)
                .await
                .context("Failed to run migrations")?;
            Some(pool)
        }
        None => {
            tracing::info!("DATABASE_URL not set, high-risk registry disabled");
            None
        }
    };

    // Build application state
    let state = AppState {
        classifier,
        pool,
        config: config.clone(),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub classifier: RiskClassifier,
    pub pool: Option<sqlx::PgPool>,
    pub config: config::Config,
}

impl AppState {
    /// Database pool, or 503 when the registry is disabled
    pub fn db(&self) -> AppResult<&sqlx::PgPool> {
        self.pool.as_ref().ok_or_else(|| {
            AppError::ServiceUnavailable("Student registry is not configured".to_string())
        })
    }

    /// Score one payload on the blocking pool; all request scoring runs off the async workers
    pub async fn score(&self, payload: serde_json::Value) -> AppResult<PredictionResult> {
        let classifier = self.classifier.clone();
        let result = tokio::task::spawn_blocking(move || classifier.predict(&payload)).await??;
        Ok(result)
    }
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    // Prediction routes
    let prediction_routes = Router::new()
        .route("/", get(handlers::health::root))
        .route("/health", get(handlers::health::check))
        .route("/features", get(handlers::health::features))
        .route("/model", get(handlers::health::model_info))
        .route("/predict", post(handlers::predict::predict))
        .route("/predict_batch", post(handlers::predict::predict_batch));

    // Student registry routes (high-risk records, mood tracker)
    let registry_routes = Router::new()
        .route(
            "/api/v1/students/high-risk",
            post(handlers::students::save)
                .get(handlers::students::list)
                .delete(handlers::students::delete_all),
        )
        .route("/api/v1/students/high-risk/:student_id", get(handlers::students::get))
        .route(
            "/api/v1/students/:student_id/moods",
            post(handlers::moods::save).get(handlers::moods::list),
        )
        .route("/api/v1/reports/high-risk-summary", get(handlers::reports::high_risk_summary));

    // Combine all routes
    Router::new()
        .merge(prediction_routes)
        .merge(registry_routes)
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
