// ABOUTME: Integration tests for the cross-user access-control policy
// ABOUTME: NotFound masking, the expert connection, and client data reach
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaTrack

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use axum::http::StatusCode;
use chrono::Utc;
use common::{
    create_profile_for, create_test_resources, create_test_user, create_user_with_role,
    test_router,
};
use helpers::axum_test::AxumTestRequest;
use serde_json::json;
use uuid::Uuid;
use vitatrack_server::models::{Goal, Progress, UserRole};
use vitatrack_server::routes::profiles::{ClientProfileResponse, ProfileResponse};

#[tokio::test]
async fn test_profile_matrix_owner_assigned_unconnected() {
    let resources = create_test_resources().await;
    let router = test_router(&resources);

    let (owner, owner_token) = create_test_user(&resources, "owner").await;
    let (assigned, assigned_token) =
        create_user_with_role(&resources, "assigned_coach", UserRole::Trainer).await;
    let (_, unconnected_token) =
        create_user_with_role(&resources, "other_coach", UserRole::Trainer).await;
    let (_, stranger_token) = create_test_user(&resources, "stranger").await;

    let profile = create_profile_for(&resources, &owner, Goal::LoseWeight, Some(assigned.id)).await;
    let url = format!("/api/health-profiles/{}", profile.id);

    // Owner sees their profile, with the derived BMI
    let own = AxumTestRequest::get(&url)
        .header("authorization", &owner_token)
        .send(router.clone())
        .await;
    assert_eq!(own.status_code(), StatusCode::OK);
    let body: ProfileResponse = own.json();
    assert!((body.bmi - 23.51).abs() < 1e-9);

    // The assigned specialist sees it too
    let connected = AxumTestRequest::get(&url)
        .header("authorization", &assigned_token)
        .send(router.clone())
        .await;
    assert_eq!(connected.status_code(), StatusCode::OK);

    // An unconnected specialist and a plain stranger both get NotFound,
    // indistinguishable from the profile not existing
    for token in [&unconnected_token, &stranger_token] {
        let masked = AxumTestRequest::get(&url)
            .header("authorization", token)
            .send(router.clone())
            .await;
        assert_eq!(masked.status_code(), StatusCode::NOT_FOUND);
    }
}

#[tokio::test]
async fn test_my_clients_lists_only_connected_profiles() {
    let resources = create_test_resources().await;
    let router = test_router(&resources);

    let (expert, expert_token) =
        create_user_with_role(&resources, "coach", UserRole::Trainer).await;
    let (client_a, _) = create_test_user(&resources, "client_a").await;
    let (client_b, _) = create_test_user(&resources, "client_b").await;

    create_profile_for(&resources, &client_a, Goal::LoseWeight, Some(expert.id)).await;
    create_profile_for(&resources, &client_b, Goal::Maintain, None).await;

    let response = AxumTestRequest::get("/api/health-profiles/my-clients")
        .header("authorization", &expert_token)
        .send(router.clone())
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let clients: Vec<ClientProfileResponse> = response.json();
    assert_eq!(clients.len(), 1);
    assert_eq!(clients[0].username, "client_a");

    // Plain users have no client list
    let (_, plain_token) = create_test_user(&resources, "plain").await;
    let denied = AxumTestRequest::get("/api/health-profiles/my-clients")
        .header("authorization", &plain_token)
        .send(router)
        .await;
    assert_eq!(denied.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_client_progress_respects_connection() {
    let resources = create_test_resources().await;
    let router = test_router(&resources);

    let (client, _) = create_test_user(&resources, "client").await;
    let (connected, connected_token) =
        create_user_with_role(&resources, "their_coach", UserRole::Trainer).await;
    let (_, unconnected_token) =
        create_user_with_role(&resources, "some_coach", UserRole::Trainer).await;

    create_profile_for(&resources, &client, Goal::GainMuscle, Some(connected.id)).await;

    let now = Utc::now();
    resources
        .database
        .create_progress(&Progress {
            id: Uuid::new_v4(),
            user_id: client.id,
            date: now.date_naive(),
            weight_kg: 71.0,
            body_fat_pct: None,
            muscle_mass_kg: None,
            photo_url: None,
            notes: None,
            active: true,
            created_at: now,
            updated_at: now,
        })
        .await
        .unwrap();

    let url = format!("/api/progress/client/{}", client.id);

    let allowed = AxumTestRequest::get(&url)
        .header("authorization", &connected_token)
        .send(router.clone())
        .await;
    assert_eq!(allowed.status_code(), StatusCode::OK);

    let masked = AxumTestRequest::get(&url)
        .header("authorization", &unconnected_token)
        .send(router)
        .await;
    assert_eq!(masked.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_plan_detail_masked_across_users() {
    let resources = create_test_resources().await;
    let router = test_router(&resources);

    let (_, owner_token) = create_test_user(&resources, "owner").await;
    let (_, stranger_token) = create_test_user(&resources, "stranger").await;

    let created = AxumTestRequest::post("/api/workout-plans")
        .header("authorization", &owner_token)
        .json(&json!({
            "name": "Private",
            "goal": "maintain",
            "start_date": "2025-01-01",
            "end_date": "2025-01-29"
        }))
        .send(router.clone())
        .await;
    assert_eq!(created.status_code(), StatusCode::CREATED);
    let plan: serde_json::Value = created.json();
    let plan_id = plan["id"].as_str().unwrap();

    let masked = AxumTestRequest::get(&format!("/api/workout-plans/{plan_id}"))
        .header("authorization", &stranger_token)
        .send(router)
        .await;
    assert_eq!(masked.status_code(), StatusCode::NOT_FOUND);
}
