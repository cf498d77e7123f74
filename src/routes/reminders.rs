// ABOUTME: Reminder route handlers
// ABOUTME: Owner CRUD, the today filter, and the enable toggle
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaTrack

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::ReminderChanges;
use crate::errors::AppError;
use crate::models::{Reminder, ReminderType, Weekday};
use crate::resources::ServerResources;
use crate::routes::authenticate;

/// Reminder view
#[derive(Debug, Serialize, Deserialize)]
pub struct ReminderResponse {
    pub id: String,
    pub title: String,
    pub reminder_type: ReminderType,
    pub time: NaiveTime,
    pub days_of_week: Vec<Weekday>,
    pub is_enabled: bool,
    pub message: Option<String>,
}

impl ReminderResponse {
    fn from_reminder(reminder: &Reminder) -> Self {
        Self {
            id: reminder.id.to_string(),
            title: reminder.title.clone(),
            reminder_type: reminder.reminder_type,
            time: reminder.time,
            days_of_week: reminder.days_of_week.clone(),
            is_enabled: reminder.is_enabled,
            message: reminder.message.clone(),
        }
    }
}

/// Create a reminder
#[derive(Debug, Deserialize)]
pub struct CreateReminderRequest {
    pub title: String,
    pub reminder_type: ReminderType,
    pub time: NaiveTime,
    /// Weekdays 0-6 the reminder repeats on
    pub days_of_week: Vec<i64>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Partial update of a reminder
#[derive(Debug, Deserialize)]
pub struct UpdateReminderRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub reminder_type: Option<ReminderType>,
    #[serde(default)]
    pub time: Option<NaiveTime>,
    #[serde(default)]
    pub days_of_week: Option<Vec<i64>>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Toggle response
#[derive(Debug, Serialize, Deserialize)]
pub struct ToggleResponse {
    pub id: String,
    pub is_enabled: bool,
}

fn parse_days(raw: &[i64]) -> Result<Vec<Weekday>, AppError> {
    let mut days: Vec<Weekday> = raw
        .iter()
        .map(|&value| Weekday::from_index(value))
        .collect::<Result<_, _>>()?;
    days.sort_unstable();
    days.dedup();
    Ok(days)
}

/// Reminder routes handler
pub struct ReminderRoutes;

impl ReminderRoutes {
    /// Create all reminder routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/reminders",
                get(Self::list_reminders).post(Self::create_reminder),
            )
            .route("/api/reminders/today", get(Self::today_reminders))
            .route(
                "/api/reminders/:reminder_id",
                get(Self::get_reminder)
                    .put(Self::update_reminder)
                    .delete(Self::delete_reminder),
            )
            .route(
                "/api/reminders/:reminder_id/toggle",
                post(Self::toggle_reminder),
            )
            .with_state(resources)
    }

    async fn list_reminders(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let caller = authenticate(&headers, &resources).await?;

        let reminders = resources.database.list_reminders(caller.id).await?;
        let response: Vec<ReminderResponse> = reminders
            .iter()
            .map(ReminderResponse::from_reminder)
            .collect();
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    async fn create_reminder(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<CreateReminderRequest>,
    ) -> Result<Response, AppError> {
        let caller = authenticate(&headers, &resources).await?;

        if request.title.trim().is_empty() {
            return Err(AppError::invalid_input("title must not be empty"));
        }
        let days_of_week = parse_days(&request.days_of_week)?;
        if days_of_week.is_empty() {
            return Err(AppError::invalid_input(
                "days_of_week must name at least one weekday",
            ));
        }

        let now = Utc::now();
        let reminder = Reminder {
            id: Uuid::new_v4(),
            user_id: caller.id,
            title: request.title.trim().to_owned(),
            reminder_type: request.reminder_type,
            time: request.time,
            days_of_week,
            is_enabled: true,
            message: request.message,
            active: true,
            created_at: now,
            updated_at: now,
        };

        resources.database.create_reminder(&reminder).await?;
        Ok((StatusCode::CREATED, Json(ReminderResponse::from_reminder(&reminder))).into_response())
    }

    /// Reminders that fire today (enabled, today's weekday in the set)
    async fn today_reminders(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let caller = authenticate(&headers, &resources).await?;

        let today = Weekday::of(Utc::now().date_naive());
        let reminders = resources.database.list_reminders(caller.id).await?;

        let response: Vec<ReminderResponse> = reminders
            .iter()
            .filter(|r| r.fires_on(today))
            .map(ReminderResponse::from_reminder)
            .collect();
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    async fn get_reminder(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(reminder_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let caller = authenticate(&headers, &resources).await?;

        let reminder = resources
            .database
            .get_reminder(reminder_id)
            .await?
            .filter(|r| r.user_id == caller.id)
            .ok_or_else(|| AppError::not_found("Reminder"))?;

        Ok((StatusCode::OK, Json(ReminderResponse::from_reminder(&reminder))).into_response())
    }

    async fn update_reminder(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(reminder_id): Path<Uuid>,
        Json(request): Json<UpdateReminderRequest>,
    ) -> Result<Response, AppError> {
        let caller = authenticate(&headers, &resources).await?;

        let reminder = resources
            .database
            .get_reminder(reminder_id)
            .await?
            .filter(|r| r.user_id == caller.id)
            .ok_or_else(|| AppError::not_found("Reminder"))?;

        let days_of_week = request
            .days_of_week
            .as_deref()
            .map(parse_days)
            .transpose()?;
        if days_of_week.as_ref().is_some_and(Vec::is_empty) {
            return Err(AppError::invalid_input(
                "days_of_week must name at least one weekday",
            ));
        }

        resources
            .database
            .update_reminder(
                reminder.id,
                &ReminderChanges {
                    title: request.title,
                    reminder_type: request.reminder_type,
                    time: request.time,
                    days_of_week,
                    message: request.message,
                },
            )
            .await?;

        let updated = resources
            .database
            .get_reminder(reminder.id)
            .await?
            .ok_or_else(|| AppError::internal("Reminder vanished during update"))?;

        Ok((StatusCode::OK, Json(ReminderResponse::from_reminder(&updated))).into_response())
    }

    /// Flip the enabled flag
    async fn toggle_reminder(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(reminder_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let caller = authenticate(&headers, &resources).await?;

        resources
            .database
            .get_reminder(reminder_id)
            .await?
            .filter(|r| r.user_id == caller.id)
            .ok_or_else(|| AppError::not_found("Reminder"))?;

        let is_enabled = resources.database.toggle_reminder(reminder_id).await?;

        let response = ToggleResponse {
            id: reminder_id.to_string(),
            is_enabled,
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    async fn delete_reminder(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(reminder_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let caller = authenticate(&headers, &resources).await?;

        resources
            .database
            .get_reminder(reminder_id)
            .await?
            .filter(|r| r.user_id == caller.id)
            .ok_or_else(|| AppError::not_found("Reminder"))?;

        resources.database.delete_reminder(reminder_id).await?;
        Ok((StatusCode::NO_CONTENT, ()).into_response())
    }
}
