// ABOUTME: Daily tracking route handlers
// ABOUTME: Range listings, the idempotent today record, and the weekly summary
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

use crate::database::TrackingChanges;
use crate::errors::AppError;
use crate::models::DailyTracking;
use crate::reports::{weekly_summary, WeeklySummary};
use crate::resources::ServerResources;
use crate::routes::authenticate;

const SUMMARY_WINDOW_DAYS: u64 = 7;

/// Tracking record view
#[derive(Debug, Serialize, Deserialize)]
pub struct TrackingResponse {
    pub id: String,
    pub date: NaiveDate,
    pub weight_kg: Option<f64>,
    pub water_intake_ml: i64,
    pub steps: i64,
    pub heart_rate: Option<i64>,
    pub notes: Option<String>,
}

impl TrackingResponse {
    fn from_record(record: &DailyTracking) -> Self {
        Self {
            id: record.id.to_string(),
            date: record.date,
            weight_kg: record.weight_kg,
            water_intake_ml: record.water_intake_ml,
            steps: record.steps,
            heart_rate: record.heart_rate,
            notes: record.notes.clone(),
        }
    }
}

/// Weekly summary response: the derived aggregates plus the raw window
#[derive(Debug, Serialize, Deserialize)]
pub struct WeeklySummaryResponse {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(flatten)]
    pub summary: WeeklySummary,
    pub records: Vec<TrackingResponse>,
}

/// Create a tracking record
#[derive(Debug, Deserialize)]
pub struct CreateTrackingRequest {
    pub date: NaiveDate,
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub water_intake_ml: Option<i64>,
    #[serde(default)]
    pub steps: Option<i64>,
    #[serde(default)]
    pub heart_rate: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Partial update of a tracking record
#[derive(Debug, Deserialize)]
pub struct UpdateTrackingRequest {
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub water_intake_ml: Option<i64>,
    #[serde(default)]
    pub steps: Option<i64>,
    #[serde(default)]
    pub heart_rate: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Date-range query parameters
#[derive(Debug, Deserialize, Default)]
pub struct TrackingListQuery {
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

/// Daily tracking routes handler
pub struct TrackingRoutes;

impl TrackingRoutes {
    /// Create all tracking routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/daily-tracking",
                get(Self::list_records).post(Self::create_record),
            )
            .route("/api/daily-tracking/today", get(Self::today))
            .route(
                "/api/daily-tracking/weekly-summary",
                get(Self::weekly_summary),
            )
            .route(
                "/api/daily-tracking/:record_id",
                get(Self::get_record)
                    .put(Self::update_record)
                    .delete(Self::delete_record),
            )
            .with_state(resources)
    }

    async fn list_records(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<TrackingListQuery>,
    ) -> Result<Response, AppError> {
        let caller = authenticate(&headers, &resources).await?;

        let records = resources
            .database
            .list_tracking(caller.id, query.start_date, query.end_date)
            .await?;

        let response: Vec<TrackingResponse> =
            records.iter().map(TrackingResponse::from_record).collect();
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Create a record; one per date, so a duplicate date conflicts
    async fn create_record(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<CreateTrackingRequest>,
    ) -> Result<Response, AppError> {
        let caller = authenticate(&headers, &resources).await?;

        if request.water_intake_ml.is_some_and(|v| v < 0)
            || request.steps.is_some_and(|v| v < 0)
        {
            return Err(AppError::invalid_input(
                "water intake and steps must not be negative",
            ));
        }

        let now = Utc::now();
        let record = DailyTracking {
            id: Uuid::new_v4(),
            user_id: caller.id,
            date: request.date,
            weight_kg: request.weight_kg,
            water_intake_ml: request.water_intake_ml.unwrap_or(0),
            steps: request.steps.unwrap_or(0),
            heart_rate: request.heart_rate,
            notes: request.notes,
            active: true,
            created_at: now,
            updated_at: now,
        };

        resources.database.create_tracking(&record).await?;
        Ok((StatusCode::CREATED, Json(TrackingResponse::from_record(&record))).into_response())
    }

    /// Today's record; created empty on first access
    async fn today(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let caller = authenticate(&headers, &resources).await?;

        let today = Utc::now().date_naive();
        let record = resources
            .database
            .get_or_create_tracking(caller.id, today)
            .await?;

        Ok((StatusCode::OK, Json(TrackingResponse::from_record(&record))).into_response())
    }

    /// Aggregates over the trailing seven days
    async fn weekly_summary(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let caller = authenticate(&headers, &resources).await?;

        let end_date = Utc::now().date_naive();
        let start_date = end_date
            .checked_sub_days(Days::new(SUMMARY_WINDOW_DAYS))
            .ok_or_else(|| AppError::internal("Summary window out of range"))?;

        let records = resources
            .database
            .list_tracking(caller.id, Some(start_date), Some(end_date))
            .await?;

        let response = WeeklySummaryResponse {
            start_date,
            end_date,
            summary: weekly_summary(&records),
            records: records.iter().map(TrackingResponse::from_record).collect(),
        };
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
            .get_tracking(record_id)
            .await?
            .filter(|r| r.user_id == caller.id)
            .ok_or_else(|| AppError::not_found("Tracking record"))?;

        Ok((StatusCode::OK, Json(TrackingResponse::from_record(&record))).into_response())
    }

    async fn update_record(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(record_id): Path<Uuid>,
        Json(request): Json<UpdateTrackingRequest>,
    ) -> Result<Response, AppError> {
        let caller = authenticate(&headers, &resources).await?;

        let record = resources
            .database
            .get_tracking(record_id)
            .await?
            .filter(|r| r.user_id == caller.id)
            .ok_or_else(|| AppError::not_found("Tracking record"))?;

        if request.water_intake_ml.is_some_and(|v| v < 0)
            || request.steps.is_some_and(|v| v < 0)
        {
            return Err(AppError::invalid_input(
                "water intake and steps must not be negative",
            ));
        }

        resources
            .database
            .update_tracking(
                record.id,
                &TrackingChanges {
                    weight_kg: request.weight_kg,
                    water_intake_ml: request.water_intake_ml,
                    steps: request.steps,
                    heart_rate: request.heart_rate,
                    notes: request.notes,
                },
            )
            .await?;

        let updated = resources
            .database
            .get_tracking(record.id)
            .await?
            .ok_or_else(|| AppError::internal("Tracking record vanished during update"))?;

        Ok((StatusCode::OK, Json(TrackingResponse::from_record(&updated))).into_response())
    }

    async fn delete_record(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(record_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let caller = authenticate(&headers, &resources).await?;

        resources
            .database
            .get_tracking(record_id)
            .await?
            .filter(|r| r.user_id == caller.id)
            .ok_or_else(|| AppError::not_found("Tracking record"))?;

        resources.database.delete_tracking(record_id).await?;
        Ok((StatusCode::NO_CONTENT, ()).into_response())
    }
}
