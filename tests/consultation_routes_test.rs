// ABOUTME: Integration tests for consultation routes
// ABOUTME: Booking, participant scoping, and status transition legality
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaTrack

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{create_test_resources, create_test_user, create_user_with_role, test_router};
use helpers::axum_test::AxumTestRequest;
use serde_json::json;
use vitatrack_server::models::{ConsultationStatus, UserRole};
use vitatrack_server::routes::consultations::ConsultationResponse;

async fn book(
    router: &axum::Router,
    token: &str,
    expert_id: &str,
) -> ConsultationResponse {
    let appointment = Utc::now() + Duration::hours(48);
    let response = AxumTestRequest::post("/api/consultations")
        .header("authorization", token)
        .json(&json!({"expert_id": expert_id, "appointment_at": appointment}))
        .send(router.clone())
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    response.json()
}

#[tokio::test]
async fn test_booking_requires_a_specialist() {
    let resources = create_test_resources().await;
    let router = test_router(&resources);
    let (_, token) = create_test_user(&resources, "client").await;
    let (plain, _) = create_test_user(&resources, "not_an_expert").await;

    let response = AxumTestRequest::post("/api/consultations")
        .header("authorization", &token)
        .json(&json!({
            "expert_id": plain.id,
            "appointment_at": Utc::now() + Duration::hours(24)
        }))
        .send(router)
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_status_machine_happy_path() {
    let resources = create_test_resources().await;
    let router = test_router(&resources);

    let (_, client_token) = create_test_user(&resources, "client").await;
    let (expert, expert_token) =
        create_user_with_role(&resources, "coach", UserRole::Trainer).await;

    let booked = book(&router, &client_token, &expert.id.to_string()).await;
    assert_eq!(booked.status, ConsultationStatus::Pending);

    let confirm = AxumTestRequest::patch(&format!(
        "/api/consultations/{}/update-status",
        booked.id
    ))
    .header("authorization", &expert_token)
    .json(&json!({"status": "confirmed"}))
    .send(router.clone())
    .await;
    assert_eq!(confirm.status_code(), StatusCode::OK);
    let confirmed: ConsultationResponse = confirm.json();
    assert_eq!(confirmed.status, ConsultationStatus::Confirmed);

    let complete = AxumTestRequest::patch(&format!(
        "/api/consultations/{}/update-status",
        booked.id
    ))
    .header("authorization", &expert_token)
    .json(&json!({"status": "completed", "feedback": "Good session"}))
    .send(router)
    .await;
    assert_eq!(complete.status_code(), StatusCode::OK);
    let completed: ConsultationResponse = complete.json();
    assert_eq!(completed.status, ConsultationStatus::Completed);
    assert_eq!(completed.feedback.as_deref(), Some("Good session"));
}

#[tokio::test]
async fn test_invalid_transitions_are_rejected() {
    let resources = create_test_resources().await;
    let router = test_router(&resources);

    let (_, client_token) = create_test_user(&resources, "client").await;
    let (expert, expert_token) =
        create_user_with_role(&resources, "coach", UserRole::Trainer).await;

    let booked = book(&router, &client_token, &expert.id.to_string()).await;

    // pending cannot jump straight to completed
    let skip = AxumTestRequest::patch(&format!(
        "/api/consultations/{}/update-status",
        booked.id
    ))
    .header("authorization", &expert_token)
    .json(&json!({"status": "completed"}))
    .send(router.clone())
    .await;
    assert_eq!(skip.status_code(), StatusCode::BAD_REQUEST);

    // unknown status values are invalid input
    let unknown = AxumTestRequest::patch(&format!(
        "/api/consultations/{}/update-status",
        booked.id
    ))
    .header("authorization", &expert_token)
    .json(&json!({"status": "rescheduled"}))
    .send(router.clone())
    .await;
    assert_eq!(unknown.status_code(), StatusCode::BAD_REQUEST);

    // drive to completed, then verify the terminal state is frozen
    for status in ["confirmed", "completed"] {
        let response = AxumTestRequest::patch(&format!(
            "/api/consultations/{}/update-status",
            booked.id
        ))
        .header("authorization", &expert_token)
        .json(&json!({"status": status}))
        .send(router.clone())
        .await;
        assert_eq!(response.status_code(), StatusCode::OK);
    }

    let reopen = AxumTestRequest::patch(&format!(
        "/api/consultations/{}/update-status",
        booked.id
    ))
    .header("authorization", &expert_token)
    .json(&json!({"status": "confirmed"}))
    .send(router)
    .await;
    assert_eq!(reopen.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_consultations_are_participant_scoped() {
    let resources = create_test_resources().await;
    let router = test_router(&resources);

    let (_, client_token) = create_test_user(&resources, "client").await;
    let (expert, expert_token) =
        create_user_with_role(&resources, "coach", UserRole::Trainer).await;
    let (_, outsider_token) = create_test_user(&resources, "outsider").await;

    let booked = book(&router, &client_token, &expert.id.to_string()).await;

    // Both participants see it
    for token in [&client_token, &expert_token] {
        let response = AxumTestRequest::get(&format!("/api/consultations/{}", booked.id))
            .header("authorization", token)
            .send(router.clone())
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
    }

    // An outsider sees nothing, and may not transition it either
    let hidden = AxumTestRequest::get(&format!("/api/consultations/{}", booked.id))
        .header("authorization", &outsider_token)
        .send(router.clone())
        .await;
    assert_eq!(hidden.status_code(), StatusCode::NOT_FOUND);

    let denied = AxumTestRequest::patch(&format!(
        "/api/consultations/{}/update-status",
        booked.id
    ))
    .header("authorization", &outsider_token)
    .json(&json!({"status": "confirmed"}))
    .send(router.clone())
    .await;
    assert_eq!(denied.status_code(), StatusCode::NOT_FOUND);

    // Upcoming shows the pending appointment to the expert
    let upcoming = AxumTestRequest::get("/api/consultations/upcoming")
        .header("authorization", &expert_token)
        .send(router)
        .await;
    let list: Vec<ConsultationResponse> = upcoming.json();
    assert_eq!(list.len(), 1);
}
