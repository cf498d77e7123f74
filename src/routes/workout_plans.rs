// ABOUTME: Workout plan route handlers
// ABOUTME: Plan CRUD, template browsing, cloning, and schedule editing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaTrack

//! Workout plan routes.
//!
//! Templates (active plans authored by a trainer) may be browsed and
//! cloned by anyone but edited by nobody except their author. Editing a
//! visible-but-foreign plan's schedule is refused with `PermissionDenied`;
//! plain reads of inaccessible plans stay `NotFound`.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::WorkoutPlanChanges;
use crate::errors::AppError;
use crate::models::{Goal, User, Weekday, WorkoutPlan, WorkoutScheduleEntry};
use crate::resources::ServerResources;
use crate::routes::authenticate;
use crate::routes::catalog::ExerciseResponse;

/// Plan view
#[derive(Debug, Serialize, Deserialize)]
pub struct WorkoutPlanResponse {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub goal: Goal,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_by: Option<String>,
}

impl WorkoutPlanResponse {
    fn from_plan(plan: &WorkoutPlan) -> Self {
        Self {
            id: plan.id.to_string(),
            user_id: plan.user_id.to_string(),
            name: plan.name.clone(),
            goal: plan.goal,
            description: plan.description.clone(),
            start_date: plan.start_date,
            end_date: plan.end_date,
            created_by: plan.created_by.map(|id| id.to_string()),
        }
    }
}

/// Schedule entry view with the embedded exercise
#[derive(Debug, Serialize, Deserialize)]
pub struct ScheduleEntryResponse {
    pub id: String,
    pub plan_id: String,
    pub weekday: Weekday,
    pub sets: i64,
    pub reps: i64,
    pub notes: Option<String>,
    pub exercise: ExerciseResponse,
}

/// Create a plan owned by the caller
#[derive(Debug, Deserialize)]
pub struct CreateWorkoutPlanRequest {
    pub name: String,
    pub goal: Goal,
    #[serde(default)]
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Partial update of a plan
#[derive(Debug, Deserialize)]
pub struct UpdateWorkoutPlanRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub goal: Option<Goal>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

/// Append an exercise to the plan's weekly schedule.
/// The weekday arrives as a raw integer and is validated here so a bad
/// value surfaces as the standard invalid-input error.
#[derive(Debug, Deserialize)]
pub struct AddExerciseRequest {
    pub exercise_id: Uuid,
    pub weekday: i64,
    #[serde(default = "default_sets")]
    pub sets: i64,
    #[serde(default = "default_reps")]
    pub reps: i64,
    #[serde(default)]
    pub notes: Option<String>,
}

const fn default_sets() -> i64 {
    3
}

const fn default_reps() -> i64 {
    10
}

/// Template browse query
#[derive(Debug, Deserialize, Default)]
pub struct TemplateQuery {
    #[serde(default)]
    pub goal: Option<Goal>,
}

const TEMPLATE_LIMIT: i64 = 3;

/// Workout plan routes handler
pub struct WorkoutPlanRoutes;

impl WorkoutPlanRoutes {
    /// Create all workout plan routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/workout-plans",
                get(Self::list_plans).post(Self::create_plan),
            )
            .route("/api/workout-plans/templates", get(Self::list_templates))
            .route(
                "/api/workout-plans/:plan_id",
                get(Self::get_plan)
                    .put(Self::update_plan)
                    .delete(Self::delete_plan),
            )
            .route(
                "/api/workout-plans/:plan_id/schedules",
                get(Self::list_schedule),
            )
            .route("/api/workout-plans/:plan_id/clone", post(Self::clone_plan))
            .route(
                "/api/workout-plans/:plan_id/add-exercise",
                post(Self::add_exercise),
            )
            .route(
                "/api/workout-plans/:plan_id/schedules/:entry_id",
                delete(Self::remove_exercise),
            )
            .with_state(resources)
    }

    fn is_author_or_owner(caller: &User, plan: &WorkoutPlan) -> bool {
        plan.user_id == caller.id
            || (caller.role.is_specialist() && plan.created_by == Some(caller.id))
    }

    /// Load a plan the caller may see; templates are world-readable
    async fn load_visible_plan(
        resources: &Arc<ServerResources>,
        caller: &User,
        plan_id: Uuid,
    ) -> Result<WorkoutPlan, AppError> {
        let plan = resources
            .database
            .get_workout_plan(plan_id)
            .await?
            .ok_or_else(|| AppError::not_found("Workout plan"))?;

        if Self::is_author_or_owner(caller, &plan) {
            return Ok(plan);
        }

        // Anyone may preview a template before cloning it
        resources
            .database
            .get_workout_template(plan_id)
            .await?
            .ok_or_else(|| AppError::not_found("Workout plan"))
    }

    async fn entry_responses(
        resources: &Arc<ServerResources>,
        entries: &[WorkoutScheduleEntry],
    ) -> Result<Vec<ScheduleEntryResponse>, AppError> {
        let mut responses = Vec::with_capacity(entries.len());
        for entry in entries {
            let exercise = resources
                .database
                .get_exercise(entry.exercise_id)
                .await?
                .ok_or_else(|| AppError::not_found("Exercise"))?;
            responses.push(ScheduleEntryResponse {
                id: entry.id.to_string(),
                plan_id: entry.plan_id.to_string(),
                weekday: entry.weekday,
                sets: entry.sets,
                reps: entry.reps,
                notes: entry.notes.clone(),
                exercise: ExerciseResponse::from_exercise(&exercise),
            });
        }
        Ok(responses)
    }

    /// List plans in the caller's scope: a trainer sees the plans they
    /// authored, everyone else their own
    async fn list_plans(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let caller = authenticate(&headers, &resources).await?;

        let plans = if caller.role == crate::models::UserRole::Trainer {
            resources
                .database
                .list_workout_plans_created_by(caller.id)
                .await?
        } else {
            resources
                .database
                .list_workout_plans_for_owner(caller.id)
                .await?
        };

        let response: Vec<WorkoutPlanResponse> =
            plans.iter().map(WorkoutPlanResponse::from_plan).collect();
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Create a plan owned and authored by the caller
    async fn create_plan(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<CreateWorkoutPlanRequest>,
    ) -> Result<Response, AppError> {
        let caller = authenticate(&headers, &resources).await?;

        if request.name.trim().is_empty() {
            return Err(AppError::invalid_input("name must not be empty"));
        }
        if request.end_date < request.start_date {
            return Err(AppError::invalid_input("end_date precedes start_date"));
        }

        let now = Utc::now();
        let plan = WorkoutPlan {
            id: Uuid::new_v4(),
            user_id: caller.id,
            name: request.name.trim().to_owned(),
            goal: request.goal,
            description: request.description,
            start_date: request.start_date,
            end_date: request.end_date,
            created_by: Some(caller.id),
            active: true,
            created_at: now,
            updated_at: now,
        };

        resources.database.create_workout_plan(&plan).await?;
        Ok((StatusCode::CREATED, Json(WorkoutPlanResponse::from_plan(&plan))).into_response())
    }

    /// Newest trainer templates for a goal (default: maintain)
    async fn list_templates(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<TemplateQuery>,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources).await?;

        let goal = query.goal.unwrap_or_default();
        let templates = resources
            .database
            .list_workout_templates(goal, TEMPLATE_LIMIT)
            .await?;

        let response: Vec<WorkoutPlanResponse> = templates
            .iter()
            .map(WorkoutPlanResponse::from_plan)
            .collect();
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    async fn get_plan(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(plan_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let caller = authenticate(&headers, &resources).await?;
        let plan = Self::load_visible_plan(&resources, &caller, plan_id).await?;
        Ok((StatusCode::OK, Json(WorkoutPlanResponse::from_plan(&plan))).into_response())
    }

    /// Update a plan; owner or authoring specialist only
    async fn update_plan(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(plan_id): Path<Uuid>,
        Json(request): Json<UpdateWorkoutPlanRequest>,
    ) -> Result<Response, AppError> {
        let caller = authenticate(&headers, &resources).await?;

        let plan = resources
            .database
            .get_workout_plan(plan_id)
            .await?
            .filter(|p| Self::is_author_or_owner(&caller, p))
            .ok_or_else(|| AppError::not_found("Workout plan"))?;

        resources
            .database
            .update_workout_plan(
                plan.id,
                &WorkoutPlanChanges {
                    name: request.name,
                    goal: request.goal,
                    description: request.description,
                    start_date: request.start_date,
                    end_date: request.end_date,
                },
            )
            .await?;

        let updated = resources
            .database
            .get_workout_plan(plan.id)
            .await?
            .ok_or_else(|| AppError::internal("Plan vanished during update"))?;

        Ok((StatusCode::OK, Json(WorkoutPlanResponse::from_plan(&updated))).into_response())
    }

    /// Delete a plan; owner or authoring specialist only
    async fn delete_plan(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(plan_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let caller = authenticate(&headers, &resources).await?;

        resources
            .database
            .get_workout_plan(plan_id)
            .await?
            .filter(|p| Self::is_author_or_owner(&caller, p))
            .ok_or_else(|| AppError::not_found("Workout plan"))?;

        resources.database.delete_workout_plan(plan_id).await?;
        Ok((StatusCode::NO_CONTENT, ()).into_response())
    }

    /// The plan's weekly schedule; templates included so they can be
    /// previewed before cloning
    async fn list_schedule(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(plan_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let caller = authenticate(&headers, &resources).await?;
        let plan = Self::load_visible_plan(&resources, &caller, plan_id).await?;

        let entries = resources.database.list_workout_schedule(plan.id).await?;
        let response = Self::entry_responses(&resources, &entries).await?;
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Clone a trainer template for the caller
    async fn clone_plan(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(plan_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let caller = authenticate(&headers, &resources).await?;

        let template = resources
            .database
            .get_workout_template(plan_id)
            .await?
            .ok_or_else(|| AppError::not_found("Workout plan template"))?;

        let clone = resources
            .database
            .clone_workout_plan(&template, caller.id)
            .await?;

        Ok((StatusCode::CREATED, Json(WorkoutPlanResponse::from_plan(&clone))).into_response())
    }

    /// Append an exercise to the caller's own plan. Editing somebody
    /// else's plan (a template included) is refused outright.
    async fn add_exercise(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(plan_id): Path<Uuid>,
        Json(request): Json<AddExerciseRequest>,
    ) -> Result<Response, AppError> {
        let caller = authenticate(&headers, &resources).await?;

        let weekday = Weekday::from_index(request.weekday)?;
        if request.sets <= 0 || request.reps <= 0 {
            return Err(AppError::invalid_input("sets and reps must be positive"));
        }

        let plan = resources
            .database
            .get_workout_plan(plan_id)
            .await?
            .ok_or_else(|| AppError::not_found("Workout plan"))?;

        if plan.user_id != caller.id {
            return Err(AppError::permission_denied(
                "Only the plan owner may edit its schedule",
            ));
        }

        let exercise = resources
            .database
            .get_exercise(request.exercise_id)
            .await?
            .ok_or_else(|| AppError::not_found("Exercise"))?;

        let now = Utc::now();
        let entry = WorkoutScheduleEntry {
            id: Uuid::new_v4(),
            plan_id: plan.id,
            exercise_id: exercise.id,
            weekday,
            sets: request.sets,
            reps: request.reps,
            notes: request.notes,
            created_at: now,
            updated_at: now,
        };
        resources.database.add_workout_entry(&entry).await?;

        let response = ScheduleEntryResponse {
            id: entry.id.to_string(),
            plan_id: entry.plan_id.to_string(),
            weekday: entry.weekday,
            sets: entry.sets,
            reps: entry.reps,
            notes: entry.notes.clone(),
            exercise: ExerciseResponse::from_exercise(&exercise),
        };
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Remove a schedule entry from the caller's own plan
    async fn remove_exercise(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path((_plan_id, entry_id)): Path<(Uuid, Uuid)>,
    ) -> Result<Response, AppError> {
        let caller = authenticate(&headers, &resources).await?;

        let removed = resources
            .database
            .remove_workout_entry(entry_id, caller.id)
            .await?;

        if removed {
            Ok((StatusCode::NO_CONTENT, ()).into_response())
        } else {
            Err(AppError::not_found("Schedule entry"))
        }
    }
}
