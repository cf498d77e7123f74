// ABOUTME: Ownership and expert-connection visibility rules
// ABOUTME: The single place deciding who may see or mutate a resource
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaTrack

//! # Access-Control Policy
//!
//! A plain user reads and writes only what they own. A specialist
//! additionally reaches resources for clients with an explicit, active
//! connection (the `HealthProfile.expert` assignment) and resources they
//! authored. Cross-user reads that fail the policy surface as `NotFound`,
//! never as 403, so resource existence does not leak.

use uuid::Uuid;

use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{Consultation, HealthProfile, User};

/// Require the caller to own the resource; masks failures as `NotFound`
pub fn ensure_owner(caller_id: Uuid, resource_owner: Uuid, resource: &str) -> AppResult<()> {
    if caller_id == resource_owner {
        Ok(())
    } else {
        Err(AppError::not_found(resource))
    }
}

/// Whether the caller may see a health profile: the owner, or the
/// specialist recorded as its expert
#[must_use]
pub fn can_view_profile(caller: &User, profile: &HealthProfile) -> bool {
    if profile.user_id == caller.id {
        return true;
    }
    caller.role.is_specialist() && profile.expert_id == Some(caller.id)
}

/// Whether the caller may see a consultation: one of the two participants
#[must_use]
pub fn can_view_consultation(caller: &User, consultation: &Consultation) -> bool {
    consultation.user_id == caller.id || consultation.expert_id == caller.id
}

/// Whether the caller may read data belonging to `owner_id`: themselves, or
/// a specialist with an active connection to that user
///
/// # Errors
///
/// Returns a database error if the connection lookup fails
pub async fn can_access_user_data(
    db: &Database,
    caller: &User,
    owner_id: Uuid,
) -> AppResult<bool> {
    if caller.id == owner_id {
        return Ok(true);
    }
    if !caller.role.is_specialist() {
        return Ok(false);
    }
    db.is_expert_connected(caller.id, owner_id).await
}

/// Like [`can_access_user_data`] but failing with `NotFound` so callers can
/// use it as a guard on detail endpoints
///
/// # Errors
///
/// Returns `NotFound` when access is denied, or a database error
pub async fn ensure_user_data_access(
    db: &Database,
    caller: &User,
    owner_id: Uuid,
    resource: &str,
) -> AppResult<()> {
    if can_access_user_data(db, caller, owner_id).await? {
        Ok(())
    } else {
        Err(AppError::not_found(resource))
    }
}
