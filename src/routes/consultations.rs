// ABOUTME: Consultation route handlers
// ABOUTME: Booking, role-scoped listings, and the status state machine
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaTrack

//! Consultation routes.
//!
//! Status transitions follow the state machine: pending may be confirmed
//! or cancelled, confirmed may be completed or cancelled, and terminal
//! states are frozen. An illegal transition is an invalid-input error.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{Consultation, ConsultationStatus};
use crate::permissions::can_view_consultation;
use crate::resources::ServerResources;
use crate::routes::authenticate;

/// Consultation view
#[derive(Debug, Serialize, Deserialize)]
pub struct ConsultationResponse {
    pub id: String,
    pub user_id: String,
    pub expert_id: String,
    pub appointment_at: DateTime<Utc>,
    pub status: ConsultationStatus,
    pub notes: Option<String>,
    pub feedback: Option<String>,
}

impl ConsultationResponse {
    fn from_consultation(consultation: &Consultation) -> Self {
        Self {
            id: consultation.id.to_string(),
            user_id: consultation.user_id.to_string(),
            expert_id: consultation.expert_id.to_string(),
            appointment_at: consultation.appointment_at,
            status: consultation.status,
            notes: consultation.notes.clone(),
            feedback: consultation.feedback.clone(),
        }
    }
}

/// Book a consultation with a specialist
#[derive(Debug, Deserialize)]
pub struct CreateConsultationRequest {
    pub expert_id: Uuid,
    pub appointment_at: DateTime<Utc>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Move a consultation to a new status. The status arrives as a raw
/// string so unknown values surface as the standard invalid-input error.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
    /// Expert feedback, recorded alongside completion
    #[serde(default)]
    pub feedback: Option<String>,
}

/// Consultation routes handler
pub struct ConsultationRoutes;

impl ConsultationRoutes {
    /// Create all consultation routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/consultations",
                get(Self::list_consultations).post(Self::create_consultation),
            )
            .route("/api/consultations/upcoming", get(Self::list_upcoming))
            .route(
                "/api/consultations/:consultation_id",
                get(Self::get_consultation).delete(Self::delete_consultation),
            )
            .route(
                "/api/consultations/:consultation_id/update-status",
                patch(Self::update_status),
            )
            .with_state(resources)
    }

    /// List consultations in the caller's scope: an expert sees their
    /// appointments, a user their bookings
    async fn list_consultations(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let caller = authenticate(&headers, &resources).await?;

        let consultations = if caller.role.is_specialist() {
            resources
                .database
                .list_consultations_for_expert(caller.id)
                .await?
        } else {
            resources
                .database
                .list_consultations_for_user(caller.id)
                .await?
        };

        let response: Vec<ConsultationResponse> = consultations
            .iter()
            .map(ConsultationResponse::from_consultation)
            .collect();
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Book a consultation; the target must hold a specialist role
    async fn create_consultation(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<CreateConsultationRequest>,
    ) -> Result<Response, AppError> {
        let caller = authenticate(&headers, &resources).await?;

        let expert = resources
            .database
            .get_user(request.expert_id)
            .await?
            .filter(|u| u.active && u.role.is_specialist())
            .ok_or_else(|| AppError::not_found("Expert"))?;

        let now = Utc::now();
        let consultation = Consultation {
            id: Uuid::new_v4(),
            user_id: caller.id,
            expert_id: expert.id,
            appointment_at: request.appointment_at,
            status: ConsultationStatus::Pending,
            notes: request.notes,
            feedback: None,
            active: true,
            created_at: now,
            updated_at: now,
        };

        resources.database.create_consultation(&consultation).await?;
        Ok((
            StatusCode::CREATED,
            Json(ConsultationResponse::from_consultation(&consultation)),
        )
            .into_response())
    }

    /// Upcoming pending/confirmed appointments, soonest first
    async fn list_upcoming(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let caller = authenticate(&headers, &resources).await?;

        let consultations = resources
            .database
            .list_upcoming_consultations(caller.id, caller.role.is_specialist(), Utc::now())
            .await?;

        let response: Vec<ConsultationResponse> = consultations
            .iter()
            .map(ConsultationResponse::from_consultation)
            .collect();
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    async fn get_consultation(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(consultation_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let caller = authenticate(&headers, &resources).await?;

        let consultation = resources
            .database
            .get_consultation(consultation_id)
            .await?
            .filter(|c| can_view_consultation(&caller, c))
            .ok_or_else(|| AppError::not_found("Consultation"))?;

        Ok((
            StatusCode::OK,
            Json(ConsultationResponse::from_consultation(&consultation)),
        )
            .into_response())
    }

    /// Apply a status transition; participants only, legality enforced
    async fn update_status(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(consultation_id): Path<Uuid>,
        Json(request): Json<UpdateStatusRequest>,
    ) -> Result<Response, AppError> {
        let caller = authenticate(&headers, &resources).await?;

        let consultation = resources
            .database
            .get_consultation(consultation_id)
            .await?
            .filter(|c| can_view_consultation(&caller, c))
            .ok_or_else(|| AppError::not_found("Consultation"))?;

        let next: ConsultationStatus = request.status.parse()?;
        if !consultation.status.can_transition_to(next) {
            return Err(AppError::invalid_input("invalid status"));
        }

        resources
            .database
            .update_consultation_status(consultation.id, next, request.feedback.as_deref())
            .await?;

        let updated = resources
            .database
            .get_consultation(consultation.id)
            .await?
            .ok_or_else(|| AppError::internal("Consultation vanished during update"))?;

        Ok((
            StatusCode::OK,
            Json(ConsultationResponse::from_consultation(&updated)),
        )
            .into_response())
    }

    /// Delete a consultation; the booking user only
    async fn delete_consultation(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(consultation_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let caller = authenticate(&headers, &resources).await?;

        resources
            .database
            .get_consultation(consultation_id)
            .await?
            .filter(|c| c.user_id == caller.id)
            .ok_or_else(|| AppError::not_found("Consultation"))?;

        resources.database.delete_consultation(consultation_id).await?;
        Ok((StatusCode::NO_CONTENT, ()).into_response())
    }
}
