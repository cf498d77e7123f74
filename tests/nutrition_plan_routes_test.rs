// ABOUTME: Integration tests for nutrition plan routes
// ABOUTME: Template cloning with meals and portion preservation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaTrack

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use axum::http::StatusCode;
use chrono::{Days, Utc};
use common::{create_test_resources, create_test_user, create_user_with_role, seed_food, test_router};
use helpers::axum_test::AxumTestRequest;
use serde_json::json;
use uuid::Uuid;
use vitatrack_server::models::{
    Goal, MealScheduleEntry, NutritionPlan, UserRole, Weekday,
};
use vitatrack_server::routes::nutrition_plans::{MealEntryResponse, NutritionPlanResponse};

#[tokio::test]
async fn test_clone_nutrition_template_with_meals() {
    let resources = create_test_resources().await;
    let router = test_router(&resources);

    let (dietitian, _) =
        create_user_with_role(&resources, "dietitian", UserRole::Nutritionist).await;
    let (client, client_token) = create_test_user(&resources, "client").await;

    let oats = seed_food(&resources, "Oats", 250, 12.0).await;

    let now = Utc::now();
    let today = now.date_naive();
    let template = NutritionPlan {
        id: Uuid::new_v4(),
        user_id: dietitian.id,
        name: "Bulk meals".to_owned(),
        goal: Goal::GainMuscle,
        description: None,
        daily_calories: 2800,
        start_date: today,
        end_date: today.checked_add_days(Days::new(28)).unwrap(),
        created_by: Some(dietitian.id),
        active: true,
        created_at: now,
        updated_at: now,
    };
    resources
        .database
        .create_nutrition_plan(&template)
        .await
        .unwrap();
    resources
        .database
        .add_meal_entry(&MealScheduleEntry {
            id: Uuid::new_v4(),
            plan_id: template.id,
            food_id: oats.id,
            weekday: Weekday::Monday,
            portion: 1.5,
            notes: None,
            created_at: now,
            updated_at: now,
        })
        .await
        .unwrap();

    let response = AxumTestRequest::post(&format!("/api/nutrition-plans/{}/clone", template.id))
        .header("authorization", &client_token)
        .send(router.clone())
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let clone: NutritionPlanResponse = response.json();
    assert_eq!(clone.user_id, client.id.to_string());
    assert_eq!(clone.daily_calories, 2800);

    let meals = AxumTestRequest::get(&format!("/api/nutrition-plans/{}/meals", clone.id))
        .header("authorization", &client_token)
        .send(router)
        .await;
    let entries: Vec<MealEntryResponse> = meals.json();
    assert_eq!(entries.len(), 1);
    assert!((entries[0].portion - 1.5).abs() < f64::EPSILON);
    assert_eq!(entries[0].food.name, "Oats");
}

#[tokio::test]
async fn test_add_meal_requires_ownership_and_valid_portion() {
    let resources = create_test_resources().await;
    let router = test_router(&resources);

    let (_, owner_token) = create_test_user(&resources, "owner").await;
    let food = seed_food(&resources, "Soup", 230, 10.0).await;

    let created = AxumTestRequest::post("/api/nutrition-plans")
        .header("authorization", &owner_token)
        .json(&json!({
            "name": "My meals",
            "goal": "maintain",
            "daily_calories": 2200,
            "start_date": "2025-02-01",
            "end_date": "2025-03-01"
        }))
        .send(router.clone())
        .await;
    assert_eq!(created.status_code(), StatusCode::CREATED);
    let plan: NutritionPlanResponse = created.json();

    let bad_portion = AxumTestRequest::post(&format!("/api/nutrition-plans/{}/add-meal", plan.id))
        .header("authorization", &owner_token)
        .json(&json!({"food_id": food.id, "weekday": 1, "portion": 0.0}))
        .send(router.clone())
        .await;
    assert_eq!(bad_portion.status_code(), StatusCode::BAD_REQUEST);

    let ok = AxumTestRequest::post(&format!("/api/nutrition-plans/{}/add-meal", plan.id))
        .header("authorization", &owner_token)
        .json(&json!({"food_id": food.id, "weekday": 1}))
        .send(router.clone())
        .await;
    assert_eq!(ok.status_code(), StatusCode::CREATED);
    let entry: MealEntryResponse = ok.json();
    assert!((entry.portion - 1.0).abs() < f64::EPSILON);

    // A different user cannot edit the plan's schedule
    let (_, stranger_token) = create_test_user(&resources, "stranger").await;
    let foreign = AxumTestRequest::post(&format!("/api/nutrition-plans/{}/add-meal", plan.id))
        .header("authorization", &stranger_token)
        .json(&json!({"food_id": food.id, "weekday": 1}))
        .send(router)
        .await;
    assert_eq!(foreign.status_code(), StatusCode::FORBIDDEN);
}
