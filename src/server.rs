use crate::config::Config;
use crate::handlers::{analysis_history, health_check, text_analyzer, AppState, SharedState};
use crate::middleware::logging_middleware;
use crate::store::StoreHandle;
use axum::routing::get;
use axum::{middleware, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the router for `state`, optionally nested under `prefix`.
pub fn create_app(state: SharedState, prefix: Option<&str>) -> Router {
    let routes = Router::new()
        .route("/TextAnalyzer", get(text_analyzer).post(text_analyzer))
        .route("/GetAnalysisHistory", get(analysis_history))
        .route("/health", get(health_check))
        .with_state(state);

    let app = match prefix {
        Some(prefix) => Router::new().nest(prefix, routes),
        None => routes,
    };

    app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .layer(middleware::from_fn(logging_middleware)),
    )
}

pub struct Server {
    app: Router,
    bind_addr: SocketAddr,
}

impl Server {
    pub async fn new(config: &Config) -> Self {
        let store = StoreHandle::new(config.store_settings());

        // Connect eagerly; a failure here is retried on the first request
        if store.is_configured() {
            let _ = store.get().await;
        } else {
            tracing::warn!("TABLE_STORAGE_CONNECTION_STRING not set, history is unavailable");
        }

        let state = Arc::new(AppState::new(store));
        let prefix = config.normalized_prefix();
        let app = create_app(state, prefix.as_deref());

        Self {
            app,
            bind_addr: config.bind_addr,
        }
    }

    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let listener = tokio::net::TcpListener::bind(self.bind_addr).await?;

        tracing::info!("Text analyzer listening on {}", self.bind_addr);

        axum::serve(
            listener,
            self.app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install terminate handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        },
    }
}
