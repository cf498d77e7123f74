// ABOUTME: Expert directory route for browsing available specialists
// ABOUTME: Read-only; optionally filtered by specialist role
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaTrack

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{User, UserRole};
use crate::resources::ServerResources;
use crate::routes::authenticate;

/// Directory entry: the public subset of an expert account
#[derive(Debug, Serialize, Deserialize)]
pub struct ExpertResponse {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub role: UserRole,
}

impl ExpertResponse {
    pub(crate) fn from_user(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.clone(),
            display_name: user.display_name(),
            avatar_url: user.avatar_url.clone(),
            role: user.role,
        }
    }
}

/// Query parameters for the directory listing
#[derive(Debug, Deserialize, Default)]
pub struct ExpertListQuery {
    /// Restrict to one specialist role
    #[serde(default)]
    pub role: Option<UserRole>,
}

/// Expert directory routes handler
pub struct ExpertRoutes;

impl ExpertRoutes {
    /// Create the expert directory route
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/experts", get(Self::list_experts))
            .with_state(resources)
    }

    async fn list_experts(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<ExpertListQuery>,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources).await?;

        if let Some(role) = query.role {
            if !role.is_specialist() {
                return Err(AppError::invalid_input(
                    "role filter must name a specialist role",
                ));
            }
        }

        let experts = resources.database.list_experts(query.role).await?;
        let response: Vec<ExpertResponse> = experts.iter().map(ExpertResponse::from_user).collect();

        Ok((StatusCode::OK, Json(response)).into_response())
    }
}
