// ABOUTME: User authentication route handlers for registration and login
// ABOUTME: Also serves the current-user endpoint with partial updates
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright (c) 2025 VitaTrack

//! Authentication routes
//!
//! Registration and login are the only unauthenticated endpoints in the
//! service. Registration always creates a plain user; specialist accounts
//! are provisioned by the seeding tools.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::{hash_password, verify_password};
use crate::errors::AppError;
use crate::models::{User, UserRole};
use crate::resources::ServerResources;
use crate::routes::authenticate;

/// User registration request
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    /// Password confirmation; must match `password`
    pub confirm: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// User registration response
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub user_id: String,
    pub username: String,
}

/// User login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Account details exposed to the owner
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub role: UserRole,
}

impl UserResponse {
    pub(crate) fn from_user(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            avatar_url: user.avatar_url.clone(),
            role: user.role,
        }
    }
}

/// User login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: String,
    pub user: UserResponse,
}

/// Partial update of the caller's own account
#[derive(Debug, Deserialize)]
pub struct UpdateCurrentUserRequest {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Authentication routes handler
pub struct AuthRoutes;

impl AuthRoutes {
    /// Create all authentication routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/register", post(Self::register))
            .route("/auth/login", post(Self::login))
            .route(
                "/api/users/current-user",
                get(Self::current_user).patch(Self::update_current_user),
            )
            .with_state(resources)
    }

    /// Register a new plain-user account
    async fn register(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<RegisterRequest>,
    ) -> Result<Response, AppError> {
        if request.username.trim().is_empty() {
            return Err(AppError::invalid_input("username must not be empty"));
        }
        if request.password.is_empty() {
            return Err(AppError::invalid_input("password must not be empty"));
        }
        if request.password != request.confirm {
            return Err(AppError::invalid_input("passwords do not match"));
        }

        let mut user = User::new(request.username.trim().to_owned(), hash_password(&request.password)?);
        user.first_name = request.first_name;
        user.last_name = request.last_name;
        user.email = request.email;

        resources.database.create_user(&user).await?;
        info!("Registered user {}", user.username);

        let response = RegisterResponse {
            user_id: user.id.to_string(),
            username: user.username,
        };
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Exchange credentials for a bearer token
    async fn login(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<LoginRequest>,
    ) -> Result<Response, AppError> {
        let user = resources
            .database
            .get_user_by_username(&request.username)
            .await?
            .filter(|u| u.active)
            .ok_or_else(|| AppError::auth_invalid("Invalid username or password"))?;

        if !verify_password(&request.password, &user.password_hash)? {
            return Err(AppError::auth_invalid("Invalid username or password"));
        }

        let (token, expires_at) = resources.auth_manager.generate_token(&user)?;

        let response = LoginResponse {
            token,
            expires_at: expires_at.to_rfc3339(),
            user: UserResponse::from_user(&user),
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// The caller's own account
    async fn current_user(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let user = authenticate(&headers, &resources).await?;
        Ok((StatusCode::OK, Json(UserResponse::from_user(&user))).into_response())
    }

    /// Update names and email on the caller's own account
    async fn update_current_user(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<UpdateCurrentUserRequest>,
    ) -> Result<Response, AppError> {
        let user = authenticate(&headers, &resources).await?;

        resources
            .database
            .update_user_details(
                user.id,
                request.first_name.as_deref(),
                request.last_name.as_deref(),
                request.email.as_deref(),
            )
            .await?;

        let updated = resources
            .database
            .get_user(user.id)
            .await?
            .ok_or_else(|| AppError::internal("User vanished during update"))?;

        Ok((StatusCode::OK, Json(UserResponse::from_user(&updated))).into_response())
    }
}
