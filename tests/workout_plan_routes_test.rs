// ABOUTME: Integration tests for workout plan routes
// ABOUTME: Template cloning, schedule editing, and ownership enforcement
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaTrack

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use axum::http::StatusCode;
use chrono::{Days, Utc};
use common::{
    create_test_resources, create_test_user, create_user_with_role, seed_category, seed_exercise,
    test_router,
};
use helpers::axum_test::AxumTestRequest;
use serde_json::json;
use uuid::Uuid;
use vitatrack_server::models::{Goal, User, UserRole, Weekday, WorkoutPlan, WorkoutScheduleEntry};
use vitatrack_server::resources::ServerResources;
use vitatrack_server::routes::workout_plans::{ScheduleEntryResponse, WorkoutPlanResponse};

async fn seed_template(
    resources: &std::sync::Arc<ServerResources>,
    trainer: &User,
    exercise_ids: &[Uuid],
) -> WorkoutPlan {
    let now = Utc::now();
    let today = now.date_naive();
    let plan = WorkoutPlan {
        id: Uuid::new_v4(),
        user_id: trainer.id,
        name: "Shred 28".to_owned(),
        goal: Goal::LoseWeight,
        description: Some("Template".to_owned()),
        start_date: today,
        end_date: today.checked_add_days(Days::new(28)).unwrap(),
        created_by: Some(trainer.id),
        active: true,
        created_at: now,
        updated_at: now,
    };
    resources.database.create_workout_plan(&plan).await.unwrap();

    for (i, exercise_id) in exercise_ids.iter().enumerate() {
        resources
            .database
            .add_workout_entry(&WorkoutScheduleEntry {
                id: Uuid::new_v4(),
                plan_id: plan.id,
                exercise_id: *exercise_id,
                weekday: Weekday::from_index(i as i64).unwrap(),
                sets: 3,
                reps: 12,
                notes: None,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();
    }

    plan
}

#[tokio::test]
async fn test_clone_template_copies_schedule_for_caller() {
    let resources = create_test_resources().await;
    let router = test_router(&resources);

    let (trainer, _) = create_user_with_role(&resources, "coach", UserRole::Trainer).await;
    let (client, client_token) = create_test_user(&resources, "client").await;

    let cardio = seed_category(&resources, "Cardio").await;
    let run = seed_exercise(&resources, "Running", cardio.id).await;
    let rope = seed_exercise(&resources, "Jump rope", cardio.id).await;
    let template = seed_template(&resources, &trainer, &[run.id, rope.id]).await;

    let response = AxumTestRequest::post(&format!("/api/workout-plans/{}/clone", template.id))
        .header("authorization", &client_token)
        .send(router.clone())
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);

    let clone: WorkoutPlanResponse = response.json();
    assert_eq!(clone.user_id, client.id.to_string());
    assert_eq!(clone.name, "Shred 28 (copy)");

    // The clone carries the template's full schedule
    let schedule = AxumTestRequest::get(&format!("/api/workout-plans/{}/schedules", clone.id))
        .header("authorization", &client_token)
        .send(router.clone())
        .await;
    assert_eq!(schedule.status_code(), StatusCode::OK);
    let entries: Vec<ScheduleEntryResponse> = schedule.json();
    assert_eq!(entries.len(), 2);

    // Removing a cloned entry leaves the template untouched
    let remove = AxumTestRequest::delete(&format!(
        "/api/workout-plans/{}/schedules/{}",
        clone.id, entries[0].id
    ))
    .header("authorization", &client_token)
    .send(router.clone())
    .await;
    assert_eq!(remove.status_code(), StatusCode::NO_CONTENT);

    let template_entries = resources
        .database
        .list_workout_schedule(template.id)
        .await
        .unwrap();
    assert_eq!(template_entries.len(), 2);
}

#[tokio::test]
async fn test_clone_rejects_non_template_plans() {
    let resources = create_test_resources().await;
    let router = test_router(&resources);

    let (_, owner_token) = create_test_user(&resources, "owner").await;
    let (other, _) = create_test_user(&resources, "other").await;

    // A self-made plan by another plain user is not a template
    let now = Utc::now();
    let today = now.date_naive();
    let plan = WorkoutPlan {
        id: Uuid::new_v4(),
        user_id: other.id,
        name: "Private plan".to_owned(),
        goal: Goal::Maintain,
        description: None,
        start_date: today,
        end_date: today.checked_add_days(Days::new(14)).unwrap(),
        created_by: Some(other.id),
        active: true,
        created_at: now,
        updated_at: now,
    };
    resources.database.create_workout_plan(&plan).await.unwrap();

    let response = AxumTestRequest::post(&format!("/api/workout-plans/{}/clone", plan.id))
        .header("authorization", &owner_token)
        .send(router.clone())
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let missing = AxumTestRequest::post(&format!("/api/workout-plans/{}/clone", Uuid::new_v4()))
        .header("authorization", &owner_token)
        .send(router)
        .await;
    assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_add_exercise_validates_weekday_and_ownership() {
    let resources = create_test_resources().await;
    let router = test_router(&resources);

    let (_, owner_token) = create_test_user(&resources, "owner").await;
    let (_, stranger_token) = create_test_user(&resources, "stranger").await;

    let cardio = seed_category(&resources, "Cardio").await;
    let run = seed_exercise(&resources, "Running", cardio.id).await;

    let created = AxumTestRequest::post("/api/workout-plans")
        .header("authorization", &owner_token)
        .json(&json!({
            "name": "My plan",
            "goal": "lose_weight",
            "start_date": "2025-03-01",
            "end_date": "2025-03-29"
        }))
        .send(router.clone())
        .await;
    assert_eq!(created.status_code(), StatusCode::CREATED);
    let plan: WorkoutPlanResponse = created.json();

    // Weekday outside [0, 6] is invalid input
    let bad_weekday = AxumTestRequest::post(&format!("/api/workout-plans/{}/add-exercise", plan.id))
        .header("authorization", &owner_token)
        .json(&json!({"exercise_id": run.id, "weekday": 9}))
        .send(router.clone())
        .await;
    assert_eq!(bad_weekday.status_code(), StatusCode::BAD_REQUEST);

    // Unknown exercise is not found
    let bad_exercise = AxumTestRequest::post(&format!("/api/workout-plans/{}/add-exercise", plan.id))
        .header("authorization", &owner_token)
        .json(&json!({"exercise_id": Uuid::new_v4(), "weekday": 2}))
        .send(router.clone())
        .await;
    assert_eq!(bad_exercise.status_code(), StatusCode::NOT_FOUND);

    // A non-owner may see the plan does exist, but may not edit it
    let foreign = AxumTestRequest::post(&format!("/api/workout-plans/{}/add-exercise", plan.id))
        .header("authorization", &stranger_token)
        .json(&json!({"exercise_id": run.id, "weekday": 2}))
        .send(router.clone())
        .await;
    assert_eq!(foreign.status_code(), StatusCode::FORBIDDEN);

    // The owner may append; multiple entries per weekday are allowed
    for _ in 0..2 {
        let ok = AxumTestRequest::post(&format!("/api/workout-plans/{}/add-exercise", plan.id))
            .header("authorization", &owner_token)
            .json(&json!({"exercise_id": run.id, "weekday": 2, "sets": 4, "reps": 8}))
            .send(router.clone())
            .await;
        assert_eq!(ok.status_code(), StatusCode::CREATED);
    }

    let schedule = AxumTestRequest::get(&format!("/api/workout-plans/{}/schedules", plan.id))
        .header("authorization", &owner_token)
        .send(router)
        .await;
    let entries: Vec<ScheduleEntryResponse> = schedule.json();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].sets, 4);
}

#[tokio::test]
async fn test_templates_endpoint_filters_by_goal() {
    let resources = create_test_resources().await;
    let router = test_router(&resources);

    let (trainer, _) = create_user_with_role(&resources, "coach", UserRole::Trainer).await;
    let (_, client_token) = create_test_user(&resources, "client").await;

    let cardio = seed_category(&resources, "Cardio").await;
    let run = seed_exercise(&resources, "Running", cardio.id).await;
    seed_template(&resources, &trainer, &[run.id]).await;

    let matching = AxumTestRequest::get("/api/workout-plans/templates?goal=lose_weight")
        .header("authorization", &client_token)
        .send(router.clone())
        .await;
    assert_eq!(matching.status_code(), StatusCode::OK);
    let plans: Vec<WorkoutPlanResponse> = matching.json();
    assert_eq!(plans.len(), 1);

    let other_goal = AxumTestRequest::get("/api/workout-plans/templates?goal=gain_muscle")
        .header("authorization", &client_token)
        .send(router)
        .await;
    let plans: Vec<WorkoutPlanResponse> = other_goal.json();
    assert!(plans.is_empty());
}

#[tokio::test]
async fn test_remove_entry_from_foreign_plan_is_not_found() {
    let resources = create_test_resources().await;
    let router = test_router(&resources);

    let (owner, owner_token) = create_test_user(&resources, "owner").await;
    let (_, stranger_token) = create_test_user(&resources, "stranger").await;

    let cardio = seed_category(&resources, "Cardio").await;
    let run = seed_exercise(&resources, "Running", cardio.id).await;
    let plan = seed_template(
        &resources,
        &owner, // plain user, so not a template; just a plan with an entry
        &[run.id],
    )
    .await;
    let entries = resources
        .database
        .list_workout_schedule(plan.id)
        .await
        .unwrap();

    let foreign = AxumTestRequest::delete(&format!(
        "/api/workout-plans/{}/schedules/{}",
        plan.id, entries[0].id
    ))
    .header("authorization", &stranger_token)
    .send(router.clone())
    .await;
    assert_eq!(foreign.status_code(), StatusCode::NOT_FOUND);

    let own = AxumTestRequest::delete(&format!(
        "/api/workout-plans/{}/schedules/{}",
        plan.id, entries[0].id
    ))
    .header("authorization", &owner_token)
    .send(router)
    .await;
    assert_eq!(own.status_code(), StatusCode::NO_CONTENT);
}
