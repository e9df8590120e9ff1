//! HTTP server for the inbound request contract
//!
//! This module exposes the fetch service over JSON endpoints so a page
//! scanner running elsewhere can request driver profiles, the roster and
//! annotated HTML.

pub mod api;

use std::net::SocketAddr;
use std::time::Instant;

use axum::Router;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::service::FetchService;

pub use api::{create_router, ApiResponse, ErrorResponse};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Owned fetch service with both caches
    pub service: FetchService,

    /// Server start time
    pub start_time: Instant,
}

/// Server errors
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind to address
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// Server error
    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// JSON API server
pub struct PaddockServer {
    config: ServerConfig,
    state: AppState,
}

impl PaddockServer {
    pub fn new(config: ServerConfig, service: FetchService) -> Self {
        Self {
            config,
            state: AppState {
                service,
                start_time: Instant::now(),
            },
        }
    }

    /// Get the application state
    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// Build the router with all routes
    pub fn build_router(&self) -> Router {
        let mut router = create_router(self.state.clone());

        if self.config.enable_cors {
            router = router.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            );
        }

        if self.config.enable_request_logging {
            router = router.layer(TraceLayer::new_for_http());
        }

        router
    }

    /// Serve until the shutdown future resolves
    pub async fn start_with_shutdown(
        &self,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<(), ServerError> {
        let router = self.build_router();
        let addr = self.config.bind_address;

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;

        tracing::info!(addr = %addr, "Starting paddock server");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal)
            .await
            .map_err(ServerError::Serve)?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}
