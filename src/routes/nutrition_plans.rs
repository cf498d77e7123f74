// ABOUTME: Nutrition plan route handlers
// ABOUTME: Mirrors the workout plan surface with meals and portions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaTrack

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::NutritionPlanChanges;
use crate::errors::AppError;
use crate::models::{Goal, MealScheduleEntry, NutritionPlan, User, Weekday};
use crate::resources::ServerResources;
use crate::routes::authenticate;
use crate::routes::catalog::FoodResponse;

/// Plan view
#[derive(Debug, Serialize, Deserialize)]
pub struct NutritionPlanResponse {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub goal: Goal,
    pub description: Option<String>,
    pub daily_calories: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_by: Option<String>,
}

impl NutritionPlanResponse {
    fn from_plan(plan: &NutritionPlan) -> Self {
        Self {
            id: plan.id.to_string(),
            user_id: plan.user_id.to_string(),
            name: plan.name.clone(),
            goal: plan.goal,
            description: plan.description.clone(),
            daily_calories: plan.daily_calories,
            start_date: plan.start_date,
            end_date: plan.end_date,
            created_by: plan.created_by.map(|id| id.to_string()),
        }
    }
}

/// Meal entry view with the embedded food
#[derive(Debug, Serialize, Deserialize)]
pub struct MealEntryResponse {
    pub id: String,
    pub plan_id: String,
    pub weekday: Weekday,
    pub portion: f64,
    pub notes: Option<String>,
    pub food: FoodResponse,
}

/// Create a plan owned by the caller
#[derive(Debug, Deserialize)]
pub struct CreateNutritionPlanRequest {
    pub name: String,
    pub goal: Goal,
    #[serde(default)]
    pub description: Option<String>,
    pub daily_calories: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Partial update of a plan
#[derive(Debug, Deserialize)]
pub struct UpdateNutritionPlanRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub goal: Option<Goal>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub daily_calories: Option<i64>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

/// Append a food to the plan's weekly schedule
#[derive(Debug, Deserialize)]
pub struct AddMealRequest {
    pub food_id: Uuid,
    pub weekday: i64,
    #[serde(default = "default_portion")]
    pub portion: f64,
    #[serde(default)]
    pub notes: Option<String>,
}

const fn default_portion() -> f64 {
    1.0
}

/// Template browse query
#[derive(Debug, Deserialize, Default)]
pub struct TemplateQuery {
    #[serde(default)]
    pub goal: Option<Goal>,
}

const TEMPLATE_LIMIT: i64 = 3;

/// Nutrition plan routes handler
pub struct NutritionPlanRoutes;

impl NutritionPlanRoutes {
    /// Create all nutrition plan routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/nutrition-plans",
                get(Self::list_plans).post(Self::create_plan),
            )
            .route("/api/nutrition-plans/templates", get(Self::list_templates))
            .route(
                "/api/nutrition-plans/:plan_id",
                get(Self::get_plan)
                    .put(Self::update_plan)
                    .delete(Self::delete_plan),
            )
            .route("/api/nutrition-plans/:plan_id/meals", get(Self::list_meals))
            .route("/api/nutrition-plans/:plan_id/clone", post(Self::clone_plan))
            .route(
                "/api/nutrition-plans/:plan_id/add-meal",
                post(Self::add_meal),
            )
            .route(
                "/api/nutrition-plans/:plan_id/meals/:entry_id",
                delete(Self::remove_meal),
            )
            .with_state(resources)
    }

    fn is_author_or_owner(caller: &User, plan: &NutritionPlan) -> bool {
        plan.user_id == caller.id
            || (caller.role.is_specialist() && plan.created_by == Some(caller.id))
    }

    /// Load a plan the caller may see; templates are world-readable
    async fn load_visible_plan(
        resources: &Arc<ServerResources>,
        caller: &User,
        plan_id: Uuid,
    ) -> Result<NutritionPlan, AppError> {
        let plan = resources
            .database
            .get_nutrition_plan(plan_id)
            .await?
            .ok_or_else(|| AppError::not_found("Nutrition plan"))?;

        if Self::is_author_or_owner(caller, &plan) {
            return Ok(plan);
        }

        resources
            .database
            .get_nutrition_template(plan_id)
            .await?
            .ok_or_else(|| AppError::not_found("Nutrition plan"))
    }

    async fn entry_responses(
        resources: &Arc<ServerResources>,
        entries: &[MealScheduleEntry],
    ) -> Result<Vec<MealEntryResponse>, AppError> {
        let mut responses = Vec::with_capacity(entries.len());
        for entry in entries {
            let food = resources
                .database
                .get_food(entry.food_id)
                .await?
                .ok_or_else(|| AppError::not_found("Food"))?;
            responses.push(MealEntryResponse {
                id: entry.id.to_string(),
                plan_id: entry.plan_id.to_string(),
                weekday: entry.weekday,
                portion: entry.portion,
                notes: entry.notes.clone(),
                food: FoodResponse::from_food(&food),
            });
        }
        Ok(responses)
    }

    /// List plans in the caller's scope: a nutritionist sees the plans
    /// they authored, everyone else their own
    async fn list_plans(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let caller = authenticate(&headers, &resources).await?;

        let plans = if caller.role == crate::models::UserRole::Nutritionist {
            resources
                .database
                .list_nutrition_plans_created_by(caller.id)
                .await?
        } else {
            resources
                .database
                .list_nutrition_plans_for_owner(caller.id)
                .await?
        };

        let response: Vec<NutritionPlanResponse> =
            plans.iter().map(NutritionPlanResponse::from_plan).collect();
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Create a plan owned and authored by the caller
    async fn create_plan(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<CreateNutritionPlanRequest>,
    ) -> Result<Response, AppError> {
        let caller = authenticate(&headers, &resources).await?;

        if request.name.trim().is_empty() {
            return Err(AppError::invalid_input("name must not be empty"));
        }
        if request.daily_calories <= 0 {
            return Err(AppError::invalid_input("daily_calories must be positive"));
        }
        if request.end_date < request.start_date {
            return Err(AppError::invalid_input("end_date precedes start_date"));
        }

        let now = Utc::now();
        let plan = NutritionPlan {
            id: Uuid::new_v4(),
            user_id: caller.id,
            name: request.name.trim().to_owned(),
            goal: request.goal,
            description: request.description,
            daily_calories: request.daily_calories,
            start_date: request.start_date,
            end_date: request.end_date,
            created_by: Some(caller.id),
            active: true,
            created_at: now,
            updated_at: now,
        };

        resources.database.create_nutrition_plan(&plan).await?;
        Ok((StatusCode::CREATED, Json(NutritionPlanResponse::from_plan(&plan))).into_response())
    }

    /// Newest nutritionist templates for a goal (default: maintain)
    async fn list_templates(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<TemplateQuery>,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources).await?;

        let goal = query.goal.unwrap_or_default();
        let templates = resources
            .database
            .list_nutrition_templates(goal, TEMPLATE_LIMIT)
            .await?;

        let response: Vec<NutritionPlanResponse> = templates
            .iter()
            .map(NutritionPlanResponse::from_plan)
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
        Ok((StatusCode::OK, Json(NutritionPlanResponse::from_plan(&plan))).into_response())
    }

    /// Update a plan; owner or authoring specialist only
    async fn update_plan(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(plan_id): Path<Uuid>,
        Json(request): Json<UpdateNutritionPlanRequest>,
    ) -> Result<Response, AppError> {
        let caller = authenticate(&headers, &resources).await?;

        let plan = resources
            .database
            .get_nutrition_plan(plan_id)
            .await?
            .filter(|p| Self::is_author_or_owner(&caller, p))
            .ok_or_else(|| AppError::not_found("Nutrition plan"))?;

        if let Some(calories) = request.daily_calories {
            if calories <= 0 {
                return Err(AppError::invalid_input("daily_calories must be positive"));
            }
        }

        resources
            .database
            .update_nutrition_plan(
                plan.id,
                &NutritionPlanChanges {
                    name: request.name,
                    goal: request.goal,
                    description: request.description,
                    daily_calories: request.daily_calories,
                    start_date: request.start_date,
                    end_date: request.end_date,
                },
            )
            .await?;

        let updated = resources
            .database
            .get_nutrition_plan(plan.id)
            .await?
            .ok_or_else(|| AppError::internal("Plan vanished during update"))?;

        Ok((StatusCode::OK, Json(NutritionPlanResponse::from_plan(&updated))).into_response())
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
            .get_nutrition_plan(plan_id)
            .await?
            .filter(|p| Self::is_author_or_owner(&caller, p))
            .ok_or_else(|| AppError::not_found("Nutrition plan"))?;

        resources.database.delete_nutrition_plan(plan_id).await?;
        Ok((StatusCode::NO_CONTENT, ()).into_response())
    }

    /// The plan's weekly meals; templates included for preview
    async fn list_meals(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(plan_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let caller = authenticate(&headers, &resources).await?;
        let plan = Self::load_visible_plan(&resources, &caller, plan_id).await?;

        let entries = resources.database.list_meal_schedule(plan.id).await?;
        let response = Self::entry_responses(&resources, &entries).await?;
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Clone a nutritionist template for the caller
    async fn clone_plan(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(plan_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let caller = authenticate(&headers, &resources).await?;

        let template = resources
            .database
            .get_nutrition_template(plan_id)
            .await?
            .ok_or_else(|| AppError::not_found("Nutrition plan template"))?;

        let clone = resources
            .database
            .clone_nutrition_plan(&template, caller.id)
            .await?;

        Ok((StatusCode::CREATED, Json(NutritionPlanResponse::from_plan(&clone))).into_response())
    }

    /// Append a meal to the caller's own plan
    async fn add_meal(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(plan_id): Path<Uuid>,
        Json(request): Json<AddMealRequest>,
    ) -> Result<Response, AppError> {
        let caller = authenticate(&headers, &resources).await?;

        let weekday = Weekday::from_index(request.weekday)?;
        if request.portion <= 0.0 {
            return Err(AppError::invalid_input("portion must be positive"));
        }

        let plan = resources
            .database
            .get_nutrition_plan(plan_id)
            .await?
            .ok_or_else(|| AppError::not_found("Nutrition plan"))?;

        if plan.user_id != caller.id {
            return Err(AppError::permission_denied(
                "Only the plan owner may edit its schedule",
            ));
        }

        let food = resources
            .database
            .get_food(request.food_id)
            .await?
            .ok_or_else(|| AppError::not_found("Food"))?;

        let now = Utc::now();
        let entry = MealScheduleEntry {
            id: Uuid::new_v4(),
            plan_id: plan.id,
            food_id: food.id,
            weekday,
            portion: request.portion,
            notes: request.notes,
            created_at: now,
            updated_at: now,
        };
        resources.database.add_meal_entry(&entry).await?;

        let response = MealEntryResponse {
            id: entry.id.to_string(),
            plan_id: entry.plan_id.to_string(),
            weekday: entry.weekday,
            portion: entry.portion,
            notes: entry.notes.clone(),
            food: FoodResponse::from_food(&food),
        };
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Remove a meal entry from the caller's own plan
    async fn remove_meal(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path((_plan_id, entry_id)): Path<(Uuid, Uuid)>,
    ) -> Result<Response, AppError> {
        let caller = authenticate(&headers, &resources).await?;

        let removed = resources
            .database
            .remove_meal_entry(entry_id, caller.id)
            .await?;

        if removed {
            Ok((StatusCode::NO_CONTENT, ()).into_response())
        } else {
            Err(AppError::not_found("Meal entry"))
        }
    }
}
