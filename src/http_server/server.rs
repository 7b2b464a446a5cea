//! # HTTP Server
//!
//! Combines the cat and health routers into one axum server.

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use super::cat_routes::cat_routes;
use super::config::ServerConfig;
use super::observability_routes::health_routes;
use crate::observability::{log_event, log_event_with_fields, Event, Logger};
use crate::table::RecordStore;

/// HTTP server over one record store
pub struct HttpServer {
    config: ServerConfig,
    router: Router,
}

impl HttpServer {
    /// Create a server for `store` with the given configuration
    pub fn new(config: ServerConfig, store: Arc<RecordStore>) -> Self {
        let router = Self::build_router(&config, store);
        Self { config, router }
    }

    /// Build the combined router with all endpoints
    fn build_router(config: &ServerConfig, store: Arc<RecordStore>) -> Router {
        Router::new()
            // Health check at root level
            .merge(health_routes())
            // Cat CRUD under /api
            .nest("/api", cat_routes(store))
            .layer(cors_layer(&config.cors_origins))
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Serve until Ctrl-C or SIGTERM, then drain in-flight requests
    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr = self.config.socket_addr();
        let listener = TcpListener::bind(&addr).await?;

        log_event_with_fields(Event::Serving, &[("addr", &addr)]);

        axum::serve(listener, self.router)
            .with_graceful_shutdown(wait_for_signal())
            .await?;

        log_event(Event::ShutdownComplete);
        Ok(())
    }
}

/// Permissive CORS when no origins are configured, an allow-list otherwise.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                Logger::warn("CORS_ORIGIN_IGNORED", &[("origin", origin)]);
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(parsed))
}

async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            Logger::error(
                "SIGNAL_HANDLER_FAILED",
                &[("signal", "SIGINT"), ("error", &e.to_string())],
            );
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                Logger::error(
                    "SIGNAL_HANDLER_FAILED",
                    &[("signal", "SIGTERM"), ("error", &e.to_string())],
                );
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    log_event(Event::ShutdownStart);
}
