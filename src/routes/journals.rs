// ABOUTME: Health journal route handlers
// ABOUTME: Owner CRUD with one entry per date
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaTrack

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::JournalChanges;
use crate::errors::AppError;
use crate::models::{HealthJournal, Mood};
use crate::resources::ServerResources;
use crate::routes::authenticate;

/// Journal entry view
#[derive(Debug, Serialize, Deserialize)]
pub struct JournalResponse {
    pub id: String,
    pub date: NaiveDate,
    pub title: String,
    pub content: String,
    pub mood: Mood,
    pub workout_completed: bool,
    pub workout_notes: Option<String>,
    pub energy_level: i64,
    pub sleep_hours: Option<f64>,
    pub image_url: Option<String>,
}

impl JournalResponse {
    fn from_journal(journal: &HealthJournal) -> Self {
        Self {
            id: journal.id.to_string(),
            date: journal.date,
            title: journal.title.clone(),
            content: journal.content.clone(),
            mood: journal.mood,
            workout_completed: journal.workout_completed,
            workout_notes: journal.workout_notes.clone(),
            energy_level: journal.energy_level,
            sleep_hours: journal.sleep_hours,
            image_url: journal.image_url.clone(),
        }
    }
}

/// Create a journal entry
#[derive(Debug, Deserialize)]
pub struct CreateJournalRequest {
    pub date: NaiveDate,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub mood: Mood,
    #[serde(default)]
    pub workout_completed: bool,
    #[serde(default)]
    pub workout_notes: Option<String>,
    #[serde(default = "default_energy")]
    pub energy_level: i64,
    #[serde(default)]
    pub sleep_hours: Option<f64>,
    #[serde(default)]
    pub image_url: Option<String>,
}

const fn default_energy() -> i64 {
    5
}

/// Partial update of a journal entry
#[derive(Debug, Deserialize)]
pub struct UpdateJournalRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub mood: Option<Mood>,
    #[serde(default)]
    pub workout_completed: Option<bool>,
    #[serde(default)]
    pub workout_notes: Option<String>,
    #[serde(default)]
    pub energy_level: Option<i64>,
    #[serde(default)]
    pub sleep_hours: Option<f64>,
}

const ENERGY_RANGE: std::ops::RangeInclusive<i64> = 1..=10;

/// Journal routes handler
pub struct JournalRoutes;

impl JournalRoutes {
    /// Create all journal routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/journals",
                get(Self::list_journals).post(Self::create_journal),
            )
            .route(
                "/api/journals/:journal_id",
                get(Self::get_journal)
                    .put(Self::update_journal)
                    .delete(Self::delete_journal),
            )
            .with_state(resources)
    }

    async fn list_journals(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let caller = authenticate(&headers, &resources).await?;

        let journals = resources.database.list_journals(caller.id).await?;
        let response: Vec<JournalResponse> =
            journals.iter().map(JournalResponse::from_journal).collect();
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Create an entry; one per date, so a duplicate date conflicts
    async fn create_journal(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<CreateJournalRequest>,
    ) -> Result<Response, AppError> {
        let caller = authenticate(&headers, &resources).await?;

        if request.title.trim().is_empty() {
            return Err(AppError::invalid_input("title must not be empty"));
        }
        if !ENERGY_RANGE.contains(&request.energy_level) {
            return Err(AppError::invalid_input("energy_level must be 1-10"));
        }

        let now = Utc::now();
        let journal = HealthJournal {
            id: Uuid::new_v4(),
            user_id: caller.id,
            date: request.date,
            title: request.title.trim().to_owned(),
            content: request.content,
            mood: request.mood,
            workout_completed: request.workout_completed,
            workout_notes: request.workout_notes,
            energy_level: request.energy_level,
            sleep_hours: request.sleep_hours,
            image_url: request.image_url,
            active: true,
            created_at: now,
            updated_at: now,
        };

        resources.database.create_journal(&journal).await?;
        Ok((StatusCode::CREATED, Json(JournalResponse::from_journal(&journal))).into_response())
    }

    async fn get_journal(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(journal_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let caller = authenticate(&headers, &resources).await?;

        let journal = resources
            .database
            .get_journal(journal_id)
            .await?
            .filter(|j| j.user_id == caller.id)
            .ok_or_else(|| AppError::not_found("Journal entry"))?;

        Ok((StatusCode::OK, Json(JournalResponse::from_journal(&journal))).into_response())
    }

    async fn update_journal(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(journal_id): Path<Uuid>,
        Json(request): Json<UpdateJournalRequest>,
    ) -> Result<Response, AppError> {
        let caller = authenticate(&headers, &resources).await?;

        let journal = resources
            .database
            .get_journal(journal_id)
            .await?
            .filter(|j| j.user_id == caller.id)
            .ok_or_else(|| AppError::not_found("Journal entry"))?;

        if request
            .energy_level
            .is_some_and(|level| !ENERGY_RANGE.contains(&level))
        {
            return Err(AppError::invalid_input("energy_level must be 1-10"));
        }

        resources
            .database
            .update_journal(
                journal.id,
                &JournalChanges {
                    title: request.title,
                    content: request.content,
                    mood: request.mood,
                    workout_completed: request.workout_completed,
                    workout_notes: request.workout_notes,
                    energy_level: request.energy_level,
                    sleep_hours: request.sleep_hours,
                },
            )
            .await?;

        let updated = resources
            .database
            .get_journal(journal.id)
            .await?
            .ok_or_else(|| AppError::internal("Journal entry vanished during update"))?;

        Ok((StatusCode::OK, Json(JournalResponse::from_journal(&updated))).into_response())
    }

    async fn delete_journal(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(journal_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let caller = authenticate(&headers, &resources).await?;

        resources
            .database
            .get_journal(journal_id)
            .await?
            .filter(|j| j.user_id == caller.id)
            .ok_or_else(|| AppError::not_found("Journal entry"))?;

        resources.database.delete_journal(journal_id).await?;
        Ok((StatusCode::NO_CONTENT, ()).into_response())
    }
}
