// ABOUTME: Catalog browsing routes for exercises and foods
// ABOUTME: Read-only listings with filters plus the goal-based recommendations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaTrack

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::{ExerciseFilter, FoodFilter};
use crate::errors::AppError;
use crate::models::{Difficulty, Exercise, ExerciseCategory, Food, MealType};
use crate::recommendations::{recommend_exercises, recommend_foods};
use crate::resources::ServerResources;
use crate::routes::authenticate;

/// Category listing entry
#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
}

impl CategoryResponse {
    fn from_category(category: &ExerciseCategory) -> Self {
        Self {
            id: category.id.to_string(),
            name: category.name.clone(),
            description: category.description.clone(),
        }
    }
}

/// Exercise listing entry
#[derive(Debug, Serialize, Deserialize)]
pub struct ExerciseResponse {
    pub id: String,
    pub name: String,
    pub category: String,
    pub difficulty: Difficulty,
    pub duration_minutes: i64,
    pub calories_burned: i64,
    pub image_url: Option<String>,
}

impl ExerciseResponse {
    pub(crate) fn from_exercise(exercise: &Exercise) -> Self {
        Self {
            id: exercise.id.to_string(),
            name: exercise.name.clone(),
            category: exercise.category_name.clone(),
            difficulty: exercise.difficulty,
            duration_minutes: exercise.duration_minutes,
            calories_burned: exercise.calories_burned,
            image_url: exercise.image_url.clone(),
        }
    }
}

/// Full exercise detail including instructions and media
#[derive(Debug, Serialize, Deserialize)]
pub struct ExerciseDetailResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: CategoryResponse,
    pub difficulty: Difficulty,
    pub duration_minutes: i64,
    pub calories_burned: i64,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub instructions: String,
}

/// Food listing entry
#[derive(Debug, Serialize, Deserialize)]
pub struct FoodResponse {
    pub id: String,
    pub name: String,
    pub meal_type: MealType,
    pub calories: i64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub image_url: Option<String>,
}

impl FoodResponse {
    pub(crate) fn from_food(food: &Food) -> Self {
        Self {
            id: food.id.to_string(),
            name: food.name.clone(),
            meal_type: food.meal_type,
            calories: food.calories,
            protein_g: food.protein_g,
            carbs_g: food.carbs_g,
            fat_g: food.fat_g,
            image_url: food.image_url.clone(),
        }
    }
}

/// Full food detail including the recipe
#[derive(Debug, Serialize, Deserialize)]
pub struct FoodDetailResponse {
    #[serde(flatten)]
    pub summary: FoodResponse,
    pub description: Option<String>,
    pub recipe: Option<String>,
}

/// Exercise browse query parameters
#[derive(Debug, Deserialize, Default)]
pub struct ExerciseListQuery {
    #[serde(default)]
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub search: Option<String>,
}

/// Food browse query parameters
#[derive(Debug, Deserialize, Default)]
pub struct FoodListQuery {
    #[serde(default)]
    pub meal_type: Option<MealType>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub max_calories: Option<i64>,
}

/// Catalog routes handler
pub struct CatalogRoutes;

impl CatalogRoutes {
    /// Create all catalog routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/exercise-categories", get(Self::list_categories))
            .route("/api/exercises", get(Self::list_exercises))
            .route("/api/exercises/recommended", get(Self::recommended_exercises))
            .route("/api/exercises/:exercise_id", get(Self::get_exercise))
            .route("/api/foods", get(Self::list_foods))
            .route("/api/foods/recommended", get(Self::recommended_foods))
            .route("/api/foods/:food_id", get(Self::get_food))
            .with_state(resources)
    }

    async fn list_categories(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources).await?;

        let categories = resources.database.list_exercise_categories().await?;
        let response: Vec<CategoryResponse> = categories
            .iter()
            .map(CategoryResponse::from_category)
            .collect();
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    async fn list_exercises(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<ExerciseListQuery>,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources).await?;

        let filter = ExerciseFilter {
            category_id: query.category_id,
            difficulty: query.difficulty,
            search: query.search,
        };
        let exercises = resources.database.list_exercises(&filter).await?;
        let response: Vec<ExerciseResponse> = exercises
            .iter()
            .map(ExerciseResponse::from_exercise)
            .collect();
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Goal-based exercise picks; requires a health profile
    async fn recommended_exercises(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let caller = authenticate(&headers, &resources).await?;

        let profile = resources
            .database
            .get_profile_by_user(caller.id)
            .await?
            .ok_or_else(|| AppError::not_found("Health profile"))?;

        let exercises = recommend_exercises(&resources.database, &profile).await?;
        let response: Vec<ExerciseResponse> = exercises
            .iter()
            .map(ExerciseResponse::from_exercise)
            .collect();
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    async fn get_exercise(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(exercise_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources).await?;

        let exercise = resources
            .database
            .get_exercise(exercise_id)
            .await?
            .ok_or_else(|| AppError::not_found("Exercise"))?;

        let response = ExerciseDetailResponse {
            id: exercise.id.to_string(),
            name: exercise.name.clone(),
            description: exercise.description.clone(),
            category: CategoryResponse {
                id: exercise.category_id.to_string(),
                name: exercise.category_name.clone(),
                description: None,
            },
            difficulty: exercise.difficulty,
            duration_minutes: exercise.duration_minutes,
            calories_burned: exercise.calories_burned,
            image_url: exercise.image_url.clone(),
            video_url: exercise.video_url.clone(),
            instructions: exercise.instructions,
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    async fn list_foods(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<FoodListQuery>,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources).await?;

        let filter = FoodFilter {
            meal_type: query.meal_type,
            search: query.search,
            max_calories: query.max_calories,
        };
        let foods = resources.database.list_foods(&filter).await?;
        let response: Vec<FoodResponse> = foods.iter().map(FoodResponse::from_food).collect();
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Goal-based food picks; requires a health profile
    async fn recommended_foods(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let caller = authenticate(&headers, &resources).await?;

        let profile = resources
            .database
            .get_profile_by_user(caller.id)
            .await?
            .ok_or_else(|| AppError::not_found("Health profile"))?;

        let foods = recommend_foods(&resources.database, &profile).await?;
        let response: Vec<FoodResponse> = foods.iter().map(FoodResponse::from_food).collect();
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    async fn get_food(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(food_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources).await?;

        let food = resources
            .database
            .get_food(food_id)
            .await?
            .ok_or_else(|| AppError::not_found("Food"))?;

        let response = FoodDetailResponse {
            summary: FoodResponse::from_food(&food),
            description: food.description.clone(),
            recipe: food.recipe,
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }
}
