//! Landing Backend - blog and contact-form storage over HTTP

pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod routes;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::db::{Database, EntityKind};
use crate::error::StartupError;
use crate::logging::LogConfig;

/// Shared by every handler through axum `State`.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(db: Database, config: AppConfig) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }
}

/// Any origin, method and header, with credentials. Origins, methods and
/// headers are mirrored back since wildcards cannot carry credentials.
pub fn configure_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Create and configure the application router.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::root::index))
        .route("/api/hello", get(routes::root::hello))
        .route("/test", get(routes::diagnostics::test_database))
        .route(
            "/api/blog",
            get(routes::blog::list_posts).post(routes::blog::create_post),
        )
        .route("/api/contact", post(routes::contact::submit_contact))
        .route("/health", get(routes::health::health_ping))
        .route("/health/database", get(routes::health::health_database))
        .with_state(state)
        .layer(logging::middleware::propagate_request_id_layer())
        .layer(middleware::from_fn(logging::middleware::log_request))
        .layer(logging::middleware::request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        // 2 MB request body cap
        .layer(RequestBodyLimitLayer::new(2 * 1024 * 1024))
        .layer(configure_cors())
}

/// Run the server until Ctrl+C or SIGTERM (used by main).
pub async fn run() -> Result<(), StartupError> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env();

    let _log_guards = logging::init(&LogConfig::from_env(config.is_production()))
        .map_err(StartupError::Logging)?;

    EntityKind::verify_collection_mapping()?;

    let addr = config
        .socket_addr()
        .map_err(|e| StartupError::InvalidConfig(format!("HOST/PORT: {e}")))?;

    let db = Database::connect(&config.db).await;
    let state = AppState::new(db.clone(), config);
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| StartupError::Bind { addr, source })?;
    tracing::info!("Starting server on {}", addr);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    db.close().await;
    tracing::info!("Server stopped");
    served.map_err(StartupError::Serve)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
