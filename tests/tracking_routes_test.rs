// ABOUTME: Integration tests for daily tracking routes
// ABOUTME: Today idempotence, date uniqueness, and the weekly summary math
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaTrack

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use axum::http::StatusCode;
use chrono::{Days, Utc};
use common::{create_test_resources, create_test_user, test_router};
use helpers::axum_test::AxumTestRequest;
use serde_json::json;
use vitatrack_server::routes::tracking::{TrackingResponse, WeeklySummaryResponse};

#[tokio::test]
async fn test_today_is_idempotent() {
    let resources = create_test_resources().await;
    let router = test_router(&resources);
    let (_, token) = create_test_user(&resources, "walker").await;

    let first = AxumTestRequest::get("/api/daily-tracking/today")
        .header("authorization", &token)
        .send(router.clone())
        .await;
    assert_eq!(first.status_code(), StatusCode::OK);
    let created: TrackingResponse = first.json();
    assert_eq!(created.steps, 0);
    assert_eq!(created.water_intake_ml, 0);

    let second = AxumTestRequest::get("/api/daily-tracking/today")
        .header("authorization", &token)
        .send(router)
        .await;
    let same: TrackingResponse = second.json();
    assert_eq!(created.id, same.id);
    assert_eq!(created.date, same.date);
}

#[tokio::test]
async fn test_duplicate_date_is_conflict() {
    let resources = create_test_resources().await;
    let router = test_router(&resources);
    let (_, token) = create_test_user(&resources, "duper").await;

    let body = json!({"date": "2025-03-10", "steps": 4000});
    let first = AxumTestRequest::post("/api/daily-tracking")
        .header("authorization", &token)
        .json(&body)
        .send(router.clone())
        .await;
    assert_eq!(first.status_code(), StatusCode::CREATED);

    let second = AxumTestRequest::post("/api/daily-tracking")
        .header("authorization", &token)
        .json(&body)
        .send(router)
        .await;
    assert_eq!(second.status_code(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_weekly_summary_empty_window_is_zeroed() {
    let resources = create_test_resources().await;
    let router = test_router(&resources);
    let (_, token) = create_test_user(&resources, "idle").await;

    let response = AxumTestRequest::get("/api/daily-tracking/weekly-summary")
        .header("authorization", &token)
        .send(router)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let summary: WeeklySummaryResponse = response.json();
    assert!(summary.summary.avg_water_liters.abs() < f64::EPSILON);
    assert_eq!(summary.summary.high_activity_days, 0);
    assert!(summary.summary.estimated_calories.abs() < f64::EPSILON);
    assert!(summary.records.is_empty());
}

#[tokio::test]
async fn test_weekly_summary_aggregates() {
    let resources = create_test_resources().await;
    let router = test_router(&resources);
    let (_, token) = create_test_user(&resources, "active").await;

    let today = Utc::now().date_naive();
    for (offset, water, steps) in [(0_u64, 2000_i64, 6000_i64), (1, 1000, 4000)] {
        let date = today.checked_sub_days(Days::new(offset)).unwrap();
        let response = AxumTestRequest::post("/api/daily-tracking")
            .header("authorization", &token)
            .json(&json!({"date": date, "water_intake_ml": water, "steps": steps}))
            .send(router.clone())
            .await;
        assert_eq!(response.status_code(), StatusCode::CREATED);
    }

    let response = AxumTestRequest::get("/api/daily-tracking/weekly-summary")
        .header("authorization", &token)
        .send(router)
        .await;
    let summary: WeeklySummaryResponse = response.json();

    assert_eq!(summary.records.len(), 2);
    // mean of 2000 and 1000 ml is 1.5 liters
    assert!((summary.summary.avg_water_liters - 1.5).abs() < 1e-9);
    assert_eq!(summary.summary.high_activity_days, 1);
    // 10000 steps at 0.04 kcal each
    assert!((summary.summary.estimated_calories - 400.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_tracking_is_owner_scoped() {
    let resources = create_test_resources().await;
    let router = test_router(&resources);
    let (_, owner_token) = create_test_user(&resources, "owner").await;
    let (_, other_token) = create_test_user(&resources, "other").await;

    let created = AxumTestRequest::post("/api/daily-tracking")
        .header("authorization", &owner_token)
        .json(&json!({"date": "2025-03-12", "steps": 7000}))
        .send(router.clone())
        .await;
    let record: TrackingResponse = created.json();

    // Another user's detail view masks the record entirely
    let foreign = AxumTestRequest::get(&format!("/api/daily-tracking/{}", record.id))
        .header("authorization", &other_token)
        .send(router.clone())
        .await;
    assert_eq!(foreign.status_code(), StatusCode::NOT_FOUND);

    let own = AxumTestRequest::get(&format!("/api/daily-tracking/{}", record.id))
        .header("authorization", &owner_token)
        .send(router)
        .await;
    assert_eq!(own.status_code(), StatusCode::OK);
}
