// ABOUTME: HTTP route modules and the shared authentication helper
// ABOUTME: One router per domain, assembled explicitly at startup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaTrack

//! REST routes. Every handler authenticates from the `Authorization`
//! header (registration and login excepted) and returns
//! `Result<Response, AppError>` so errors surface as the structured JSON
//! envelope.

pub mod auth;
pub mod catalog;
pub mod chat;
pub mod consultations;
pub mod experts;
pub mod health;
pub mod journals;
pub mod nutrition_plans;
pub mod profiles;
pub mod progress;
pub mod reminders;
pub mod tracking;
pub mod workout_plans;

use std::sync::Arc;

use axum::http::HeaderMap;
use axum::Router;

use crate::errors::{AppError, AppResult};
use crate::models::User;
use crate::resources::ServerResources;

/// Resolve the caller from the `Authorization: Bearer` header
pub(crate) async fn authenticate(
    headers: &HeaderMap,
    resources: &Arc<ServerResources>,
) -> AppResult<User> {
    let header = headers
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(AppError::auth_required)?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::auth_invalid("Expected a bearer token"))?;

    let user_id = resources.auth_manager.validate_token(token)?;

    resources
        .database
        .get_user(user_id)
        .await?
        .filter(|user| user.active)
        .ok_or_else(|| AppError::auth_invalid("Unknown or deactivated user"))
}

/// Assemble the full application router. Registration is explicit; nothing
/// registers itself as a side effect of being linked in.
pub fn router(resources: &Arc<ServerResources>) -> Router {
    Router::new()
        .merge(health::HealthRoutes::routes())
        .merge(auth::AuthRoutes::routes(resources.clone()))
        .merge(experts::ExpertRoutes::routes(resources.clone()))
        .merge(profiles::ProfileRoutes::routes(resources.clone()))
        .merge(catalog::CatalogRoutes::routes(resources.clone()))
        .merge(workout_plans::WorkoutPlanRoutes::routes(resources.clone()))
        .merge(nutrition_plans::NutritionPlanRoutes::routes(resources.clone()))
        .merge(tracking::TrackingRoutes::routes(resources.clone()))
        .merge(progress::ProgressRoutes::routes(resources.clone()))
        .merge(consultations::ConsultationRoutes::routes(resources.clone()))
        .merge(reminders::ReminderRoutes::routes(resources.clone()))
        .merge(journals::JournalRoutes::routes(resources.clone()))
        .merge(chat::ChatRoutes::routes(resources.clone()))
}
