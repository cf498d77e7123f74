// ABOUTME: Liveness probe route
// ABOUTME: Reports service name and version without touching the database
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaTrack

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

/// Liveness response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// Health check routes handler
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create the health route
    pub fn routes() -> Router {
        Router::new().route("/api/health", get(Self::health))
    }

    async fn health() -> Response {
        let response = HealthResponse {
            status: "ok".to_owned(),
            service: env!("CARGO_PKG_NAME").to_owned(),
            version: env!("CARGO_PKG_VERSION").to_owned(),
        };
        (StatusCode::OK, Json(response)).into_response()
    }
}
