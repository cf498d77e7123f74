// ABOUTME: Router assembly and HTTP server lifecycle
// ABOUTME: Trace and CORS middleware, graceful shutdown on ctrl-c
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaTrack

use std::sync::Arc;

use anyhow::Result;
use axum::http::HeaderValue;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::resources::ServerResources;
use crate::routes;

/// The VitaTrack HTTP server
pub struct HttpServer {
    resources: Arc<ServerResources>,
}

impl HttpServer {
    /// Create a new server around the shared resources
    #[must_use]
    pub const fn new(resources: Arc<ServerResources>) -> Self {
        Self { resources }
    }

    /// Build the application router with middleware applied
    #[must_use]
    pub fn build_router(&self) -> Router {
        let cors = if self.resources.config.cors_origin == "*" {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origin = self
                .resources
                .config
                .cors_origin
                .parse::<HeaderValue>()
                .map_or_else(
                    |_| tower_http::cors::AllowOrigin::any(),
                    tower_http::cors::AllowOrigin::exact,
                );
            CorsLayer::new()
                .allow_origin(origin)
                .allow_methods(Any)
                .allow_headers(Any)
        };

        routes::router(&self.resources)
            .layer(TraceLayer::new_for_http())
            .layer(cors)
    }

    /// Bind and serve until ctrl-c
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot bind or the server fails
    pub async fn run(&self, port: u16) -> Result<()> {
        let app = self.build_router();

        let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
        info!("Listening on {}", listener.local_addr()?);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {e}");
    }
    info!("Shutting down");
}
