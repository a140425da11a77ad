//! Main server implementation for the Spazio API

use crate::{
    api,
    config::Config,
    error::{ApiError, Result},
};
use axum::Router;
use spazio_metrics::cache::build_store;
use spazio_metrics::ledger::memory::{
    InMemoryAssessmentLedger, InMemoryRentalLedger, InMemorySpaceDirectory, InMemoryUserDirectory,
};
use spazio_metrics::MetricsFacade;
use std::sync::Arc;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};

/// Main server structure
pub struct Server {
    config: Arc<Config>,
    app: Router,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<Config>,

    /// Metrics facade every handler delegates to
    pub facade: Arc<MetricsFacade>,
}

impl Server {
    /// Create a new server instance over in-memory ledgers.
    pub async fn new(config: Config) -> Result<Self> {
        info!("Initializing Spazio API server");

        let config = Arc::new(config);
        let store = build_store(&config.metrics.cache).await;
        let facade = Arc::new(MetricsFacade::new(
            Arc::new(InMemoryRentalLedger::new()),
            Arc::new(InMemoryAssessmentLedger::new()),
            Arc::new(InMemorySpaceDirectory::new()),
            Arc::new(InMemoryUserDirectory::new()),
            store,
            config.metrics.clone(),
        ));

        let state = AppState {
            config: config.clone(),
            facade,
        };
        let app = Self::build_router(state);

        Ok(Self { config, app })
    }

    /// Build the application router with all routes and middleware
    fn build_router(state: AppState) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        let middleware = ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(state.config.request_timeout()))
            .layer(cors);

        Router::new()
            .nest("/api/v1", api::routes())
            .layer(middleware)
            .with_state(state)
    }

    /// The assembled router, for driving requests without a listener.
    pub fn app(&self) -> Router {
        self.app.clone()
    }

    /// Run the server until shutdown signal
    pub async fn run(self) -> Result<()> {
        let addr = self.config.server.bind_address;

        info!("Starting HTTP server on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ApiError::Internal {
                message: format!("Failed to bind to address {addr}: {e}"),
            })?;

        info!("Spazio API listening on {}", addr);

        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ApiError::Internal {
                message: format!("Server error: {e}"),
            })?;

        Ok(())
    }
}

/// Shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            warn!("Received terminate signal, shutting down");
        },
    }
}
