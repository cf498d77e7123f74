// ABOUTME: Progress record route handlers
// ABOUTME: Owner CRUD, chart series, and the connected-client expert view
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaTrack

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::ProgressChanges;
use crate::errors::AppError;
use crate::models::Progress;
use crate::permissions::ensure_user_data_access;
use crate::reports::chart_series;
use crate::resources::ServerResources;
use crate::routes::authenticate;

const DEFAULT_CHART_DAYS: u64 = 30;

/// Progress record view
#[derive(Debug, Serialize, Deserialize)]
pub struct ProgressResponse {
    pub id: String,
    pub date: NaiveDate,
    pub weight_kg: f64,
    pub body_fat_pct: Option<f64>,
    pub muscle_mass_kg: Option<f64>,
    pub photo_url: Option<String>,
    pub notes: Option<String>,
}

impl ProgressResponse {
    fn from_record(record: &Progress) -> Self {
        Self {
            id: record.id.to_string(),
            date: record.date,
            weight_kg: record.weight_kg,
            body_fat_pct: record.body_fat_pct,
            muscle_mass_kg: record.muscle_mass_kg,
            photo_url: record.photo_url.clone(),
            notes: record.notes.clone(),
        }
    }
}

/// Create a progress record
#[derive(Debug, Deserialize)]
pub struct CreateProgressRequest {
    pub date: NaiveDate,
    pub weight_kg: f64,
    #[serde(default)]
    pub body_fat_pct: Option<f64>,
    #[serde(default)]
    pub muscle_mass_kg: Option<f64>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Partial update of a progress record
#[derive(Debug, Deserialize)]
pub struct UpdateProgressRequest {
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub body_fat_pct: Option<f64>,
    #[serde(default)]
    pub muscle_mass_kg: Option<f64>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Date-range query parameters
#[derive(Debug, Deserialize, Default)]
pub struct ProgressListQuery {
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

/// Chart lookback query
#[derive(Debug, Deserialize, Default)]
pub struct ChartQuery {
    #[serde(default)]
    pub days: Option<u64>,
}

/// Progress routes handler
pub struct ProgressRoutes;

impl ProgressRoutes {
    /// Create all progress routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/progress",
                get(Self::list_records).post(Self::create_record),
            )
            .route("/api/progress/chart-data", get(Self::chart_data))
            .route("/api/progress/client/:user_id", get(Self::client_progress))
            .route(
                "/api/progress/:record_id",
                get(Self::get_record)
                    .put(Self::update_record)
                    .delete(Self::delete_record),
            )
            .with_state(resources)
    }

    async fn list_records(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<ProgressListQuery>,
    ) -> Result<Response, AppError> {
        let caller = authenticate(&headers, &resources).await?;

        let records = resources
            .database
            .list_progress(caller.id, query.start_date, query.end_date)
            .await?;

        let response: Vec<ProgressResponse> =
            records.iter().map(ProgressResponse::from_record).collect();
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    async fn create_record(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<CreateProgressRequest>,
    ) -> Result<Response, AppError> {
        let caller = authenticate(&headers, &resources).await?;

        if request.weight_kg <= 0.0 {
            return Err(AppError::invalid_input("weight must be positive"));
        }

        let now = Utc::now();
        let record = Progress {
            id: Uuid::new_v4(),
            user_id: caller.id,
            date: request.date,
            weight_kg: request.weight_kg,
            body_fat_pct: request.body_fat_pct,
            muscle_mass_kg: request.muscle_mass_kg,
            photo_url: request.photo_url,
            notes: request.notes,
            active: true,
            created_at: now,
            updated_at: now,
        };

        resources.database.create_progress(&record).await?;
        Ok((StatusCode::CREATED, Json(ProgressResponse::from_record(&record))).into_response())
    }

    /// Chart series over the lookback window, oldest point first
    async fn chart_data(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<ChartQuery>,
    ) -> Result<Response, AppError> {
        let caller = authenticate(&headers, &resources).await?;

        let days = query.days.unwrap_or(DEFAULT_CHART_DAYS);
        let end_date = Utc::now().date_naive();
        let start_date = end_date
            .checked_sub_days(Days::new(days))
            .ok_or_else(|| AppError::invalid_input("days is out of range"))?;

        let records = resources
            .database
            .list_progress_window_asc(caller.id, start_date, end_date)
            .await?;

        Ok((StatusCode::OK, Json(chart_series(&records))).into_response())
    }

    /// A connected client's progress, for the assigned specialist
    async fn client_progress(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(user_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let caller = authenticate(&headers, &resources).await?;

        ensure_user_data_access(&resources.database, &caller, user_id, "Client").await?;

        let records = resources.database.list_progress(user_id, None, None).await?;
        let response: Vec<ProgressResponse> =
            records.iter().map(ProgressResponse::from_record).collect();
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    async fn get_record(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(record_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let caller = authenticate(&headers, &resources).await?;

        let record = resources
            .database
            .get_progress(record_id)
            .await?
            .filter(|r| r.user_id == caller.id)
            .ok_or_else(|| AppError::not_found("Progress record"))?;

        Ok((StatusCode::OK, Json(ProgressResponse::from_record(&record))).into_response())
    }

    async fn update_record(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(record_id): Path<Uuid>,
        Json(request): Json<UpdateProgressRequest>,
    ) -> Result<Response, AppError> {
        let caller = authenticate(&headers, &resources).await?;

        let record = resources
            .database
            .get_progress(record_id)
            .await?
            .filter(|r| r.user_id == caller.id)
            .ok_or_else(|| AppError::not_found("Progress record"))?;

        if request.weight_kg.is_some_and(|w| w <= 0.0) {
            return Err(AppError::invalid_input("weight must be positive"));
        }

        resources
            .database
            .update_progress(
                record.id,
                &ProgressChanges {
                    weight_kg: request.weight_kg,
                    body_fat_pct: request.body_fat_pct,
                    muscle_mass_kg: request.muscle_mass_kg,
                    photo_url: request.photo_url,
                    notes: request.notes,
                },
            )
            .await?;

        let updated = resources
            .database
            .get_progress(record.id)
            .await?
            .ok_or_else(|| AppError::internal("Progress record vanished during update"))?;

        Ok((StatusCode::OK, Json(ProgressResponse::from_record(&updated))).into_response())
    }

    async fn delete_record(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(record_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let caller = authenticate(&headers, &resources).await?;

        resources
            .database
            .get_progress(record_id)
            .await?
            .filter(|r| r.user_id == caller.id)
            .ok_or_else(|| AppError::not_found("Progress record"))?;

        resources.database.delete_progress(record_id).await?;
        Ok((StatusCode::NO_CONTENT, ()).into_response())
    }
}
