// ABOUTME: Daily tracking records and progress measurements
// ABOUTME: One tracking row per user per date; progress rows feed chart series
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaTrack

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-day tracking record. Unique on (user, date); fetching "today"
/// auto-creates an empty row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyTracking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub weight_kg: Option<f64>,
    /// Water intake in milliliters
    pub water_intake_ml: i64,
    pub steps: i64,
    /// Resting heart rate (bpm)
    pub heart_rate: Option<i64>,
    pub notes: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A body measurement snapshot for progress charting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Progress {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub weight_kg: f64,
    pub body_fat_pct: Option<f64>,
    pub muscle_mass_kg: Option<f64>,
    /// Photo reference resolved by the external object store
    pub photo_url: Option<String>,
    pub notes: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
