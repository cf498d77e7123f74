// ABOUTME: Integration tests for journal and reminder routes
// ABOUTME: Journal date uniqueness, reminder today filter, and the toggle
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaTrack

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use axum::http::StatusCode;
use chrono::Utc;
use common::{create_test_resources, create_test_user, test_router};
use helpers::axum_test::AxumTestRequest;
use serde_json::json;
use vitatrack_server::models::Weekday;
use vitatrack_server::routes::journals::JournalResponse;
use vitatrack_server::routes::reminders::{ReminderResponse, ToggleResponse};

#[tokio::test]
async fn test_journal_one_entry_per_date() {
    let resources = create_test_resources().await;
    let router = test_router(&resources);
    let (_, token) = create_test_user(&resources, "journaler").await;

    let body = json!({
        "date": "2025-05-20",
        "title": "Leg day",
        "content": "Felt strong",
        "mood": "good",
        "energy_level": 7
    });

    let first = AxumTestRequest::post("/api/journals")
        .header("authorization", &token)
        .json(&body)
        .send(router.clone())
        .await;
    assert_eq!(first.status_code(), StatusCode::CREATED);
    let entry: JournalResponse = first.json();
    assert_eq!(entry.title, "Leg day");

    let duplicate = AxumTestRequest::post("/api/journals")
        .header("authorization", &token)
        .json(&body)
        .send(router.clone())
        .await;
    assert_eq!(duplicate.status_code(), StatusCode::CONFLICT);

    // Energy outside 1-10 is invalid input
    let out_of_range = AxumTestRequest::post("/api/journals")
        .header("authorization", &token)
        .json(&json!({
            "date": "2025-05-21",
            "title": "Rest",
            "content": "Recovery",
            "energy_level": 11
        }))
        .send(router)
        .await;
    assert_eq!(out_of_range.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_reminder_today_filter_and_toggle() {
    let resources = create_test_resources().await;
    let router = test_router(&resources);
    let (_, token) = create_test_user(&resources, "hydrated").await;

    let today = Weekday::of(Utc::now().date_naive()).as_index();
    let other_day = (today + 3) % 7;

    let todays = AxumTestRequest::post("/api/reminders")
        .header("authorization", &token)
        .json(&json!({
            "title": "Drink water",
            "reminder_type": "water",
            "time": "09:30:00",
            "days_of_week": [today]
        }))
        .send(router.clone())
        .await;
    assert_eq!(todays.status_code(), StatusCode::CREATED);
    let reminder: ReminderResponse = todays.json();

    let off_day = AxumTestRequest::post("/api/reminders")
        .header("authorization", &token)
        .json(&json!({
            "title": "Stretch",
            "reminder_type": "exercise",
            "time": "18:00:00",
            "days_of_week": [other_day]
        }))
        .send(router.clone())
        .await;
    assert_eq!(off_day.status_code(), StatusCode::CREATED);

    // Only the matching reminder fires today
    let fired = AxumTestRequest::get("/api/reminders/today")
        .header("authorization", &token)
        .send(router.clone())
        .await;
    let list: Vec<ReminderResponse> = fired.json();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].title, "Drink water");

    // Disabling it empties the today view
    let toggled = AxumTestRequest::post(&format!("/api/reminders/{}/toggle", reminder.id))
        .header("authorization", &token)
        .send(router.clone())
        .await;
    assert_eq!(toggled.status_code(), StatusCode::OK);
    let toggle: ToggleResponse = toggled.json();
    assert!(!toggle.is_enabled);

    let fired_after = AxumTestRequest::get("/api/reminders/today")
        .header("authorization", &token)
        .send(router.clone())
        .await;
    let list: Vec<ReminderResponse> = fired_after.json();
    assert!(list.is_empty());

    // A weekday outside 0-6 is invalid input
    let bad_day = AxumTestRequest::post("/api/reminders")
        .header("authorization", &token)
        .json(&json!({
            "title": "Broken",
            "reminder_type": "rest",
            "time": "12:00:00",
            "days_of_week": [8]
        }))
        .send(router)
        .await;
    assert_eq!(bad_day.status_code(), StatusCode::BAD_REQUEST);
}
