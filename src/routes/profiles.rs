// ABOUTME: Health profile route handlers
// ABOUTME: Owner CRUD, my-profile shortcut, and the expert client list
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaTrack

//! Health profile routes.
//!
//! The response DTO is chosen by a capability check: owners see the full
//! profile, a connected specialist sees the client summary. Cross-user
//! requests that fail the policy return `NotFound`.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::ProfileChanges;
use crate::errors::AppError;
use crate::models::{BmiStatus, Goal, HealthProfile, UserRole};
use crate::permissions::can_view_profile;
use crate::resources::ServerResources;
use crate::routes::authenticate;

/// Full profile view for the owner
#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub id: String,
    pub user_id: String,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub age: i64,
    pub goal: Goal,
    pub target_weight_kg: Option<f64>,
    pub expert_id: Option<String>,
    pub bmi: f64,
    pub bmi_status: BmiStatus,
}

impl ProfileResponse {
    fn from_profile(profile: &HealthProfile) -> Self {
        Self {
            id: profile.id.to_string(),
            user_id: profile.user_id.to_string(),
            height_cm: profile.height_cm,
            weight_kg: profile.weight_kg,
            age: profile.age,
            goal: profile.goal,
            target_weight_kg: profile.target_weight_kg,
            expert_id: profile.expert_id.map(|id| id.to_string()),
            bmi: profile.bmi(),
            bmi_status: profile.bmi_status(),
        }
    }
}

/// Reduced client view for the assigned specialist
#[derive(Debug, Serialize, Deserialize)]
pub struct ClientProfileResponse {
    pub id: String,
    pub user_id: String,
    pub username: String,
    pub goal: Goal,
    pub bmi: f64,
    pub bmi_status: BmiStatus,
}

/// Create a profile for the caller
#[derive(Debug, Deserialize)]
pub struct CreateProfileRequest {
    pub height_cm: f64,
    pub weight_kg: f64,
    pub age: i64,
    #[serde(default)]
    pub goal: Goal,
    #[serde(default)]
    pub target_weight_kg: Option<f64>,
    /// Optional specialist connection, by user ID
    #[serde(default)]
    pub expert_id: Option<Uuid>,
}

/// Partial update of a profile
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub height_cm: Option<f64>,
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub age: Option<i64>,
    #[serde(default)]
    pub goal: Option<Goal>,
    #[serde(default)]
    pub target_weight_kg: Option<f64>,
    /// Present-and-null clears the connection; absent leaves it untouched
    #[serde(default, with = "double_option")]
    pub expert_id: Option<Option<Uuid>>,
}

/// Serde helper distinguishing "absent" from "present but null"
mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Option::<T>::deserialize(de).map(Some)
    }
}

/// Health profile routes handler
pub struct ProfileRoutes;

impl ProfileRoutes {
    /// Create all profile routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/health-profiles",
                get(Self::list_profiles).post(Self::create_profile),
            )
            .route("/api/health-profiles/my-profile", get(Self::my_profile))
            .route("/api/health-profiles/my-clients", get(Self::my_clients))
            .route(
                "/api/health-profiles/:profile_id",
                get(Self::get_profile)
                    .put(Self::update_profile)
                    .delete(Self::delete_profile),
            )
            .with_state(resources)
    }

    /// List profiles in the caller's scope: their own, or their clients'
    async fn list_profiles(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let caller = authenticate(&headers, &resources).await?;

        let profiles = if caller.role.is_specialist() {
            resources.database.list_profiles_for_expert(caller.id).await?
        } else {
            resources
                .database
                .get_profile_by_user(caller.id)
                .await?
                .into_iter()
                .collect()
        };

        let response: Vec<ProfileResponse> =
            profiles.iter().map(ProfileResponse::from_profile).collect();
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Create the caller's profile
    async fn create_profile(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<CreateProfileRequest>,
    ) -> Result<Response, AppError> {
        let caller = authenticate(&headers, &resources).await?;

        if request.height_cm <= 0.0 || request.weight_kg <= 0.0 {
            return Err(AppError::invalid_input(
                "height and weight must be positive",
            ));
        }
        if let Some(expert_id) = request.expert_id {
            Self::check_expert(&resources, expert_id).await?;
        }

        let now = Utc::now();
        let profile = HealthProfile {
            id: Uuid::new_v4(),
            user_id: caller.id,
            height_cm: request.height_cm,
            weight_kg: request.weight_kg,
            age: request.age,
            goal: request.goal,
            target_weight_kg: request.target_weight_kg,
            expert_id: request.expert_id,
            active: true,
            created_at: now,
            updated_at: now,
        };

        resources.database.create_profile(&profile).await?;

        Ok((StatusCode::CREATED, Json(ProfileResponse::from_profile(&profile))).into_response())
    }

    /// The caller's own profile ("create a profile first" when absent)
    async fn my_profile(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let caller = authenticate(&headers, &resources).await?;

        let profile = resources
            .database
            .get_profile_by_user(caller.id)
            .await?
            .ok_or_else(|| AppError::not_found("Health profile"))?;

        Ok((StatusCode::OK, Json(ProfileResponse::from_profile(&profile))).into_response())
    }

    /// The connected clients of a specialist caller
    async fn my_clients(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let caller = authenticate(&headers, &resources).await?;
        if !caller.role.is_specialist() {
            return Err(AppError::permission_denied(
                "Only specialists have client lists",
            ));
        }

        let profiles = resources.database.list_profiles_for_expert(caller.id).await?;

        let mut clients = Vec::with_capacity(profiles.len());
        for profile in &profiles {
            let username = resources
                .database
                .get_user(profile.user_id)
                .await?
                .map(|u| u.username)
                .unwrap_or_default();
            clients.push(ClientProfileResponse {
                id: profile.id.to_string(),
                user_id: profile.user_id.to_string(),
                username,
                goal: profile.goal,
                bmi: profile.bmi(),
                bmi_status: profile.bmi_status(),
            });
        }

        Ok((StatusCode::OK, Json(clients)).into_response())
    }

    /// Profile detail; visible to the owner and the assigned specialist
    async fn get_profile(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(profile_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let caller = authenticate(&headers, &resources).await?;

        let profile = resources
            .database
            .get_profile(profile_id)
            .await?
            .filter(|p| can_view_profile(&caller, p))
            .ok_or_else(|| AppError::not_found("Health profile"))?;

        Ok((StatusCode::OK, Json(ProfileResponse::from_profile(&profile))).into_response())
    }

    /// Update a profile; the owner only
    async fn update_profile(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(profile_id): Path<Uuid>,
        Json(request): Json<UpdateProfileRequest>,
    ) -> Result<Response, AppError> {
        let caller = authenticate(&headers, &resources).await?;

        let profile = resources
            .database
            .get_profile(profile_id)
            .await?
            .filter(|p| p.user_id == caller.id)
            .ok_or_else(|| AppError::not_found("Health profile"))?;

        if let Some(height) = request.height_cm {
            if height <= 0.0 {
                return Err(AppError::invalid_input("height must be positive"));
            }
        }
        if let Some(weight) = request.weight_kg {
            if weight <= 0.0 {
                return Err(AppError::invalid_input("weight must be positive"));
            }
        }
        if let Some(Some(expert_id)) = request.expert_id {
            Self::check_expert(&resources, expert_id).await?;
        }

        resources
            .database
            .update_profile(
                profile.id,
                &ProfileChanges {
                    height_cm: request.height_cm,
                    weight_kg: request.weight_kg,
                    age: request.age,
                    goal: request.goal,
                    target_weight_kg: request.target_weight_kg,
                    expert_id: request.expert_id,
                },
            )
            .await?;

        let updated = resources
            .database
            .get_profile(profile.id)
            .await?
            .ok_or_else(|| AppError::internal("Profile vanished during update"))?;

        Ok((StatusCode::OK, Json(ProfileResponse::from_profile(&updated))).into_response())
    }

    /// Delete a profile; the owner only
    async fn delete_profile(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(profile_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let caller = authenticate(&headers, &resources).await?;

        resources
            .database
            .get_profile(profile_id)
            .await?
            .filter(|p| p.user_id == caller.id)
            .ok_or_else(|| AppError::not_found("Health profile"))?;

        resources.database.delete_profile(profile_id).await?;
        Ok((StatusCode::NO_CONTENT, ()).into_response())
    }

    /// Validate that an expert connection targets a real specialist
    async fn check_expert(
        resources: &Arc<ServerResources>,
        expert_id: Uuid,
    ) -> Result<(), AppError> {
        let is_specialist = resources
            .database
            .get_user(expert_id)
            .await?
            .is_some_and(|u| u.active && u.role != UserRole::User);

        if is_specialist {
            Ok(())
        } else {
            Err(AppError::not_found("Expert"))
        }
    }
}
