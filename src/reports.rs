// ABOUTME: Derived tracking aggregates: weekly summary and progress chart series
// ABOUTME: Pure computations over tracking rows; nothing here is ever stored
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaTrack

//! # Aggregation / Reporting
//!
//! Weekly summaries and chart series are recomputed from the raw rows on
//! every call. An empty window yields zeroed aggregates, not an error.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{DailyTracking, Progress};

/// Days with at least this many steps count as high-activity days
pub const HIGH_ACTIVITY_STEP_THRESHOLD: i64 = 5000;

/// Rough calories burned per step used for the weekly estimate
pub const CALORIES_PER_STEP: f64 = 0.04;

const ML_PER_LITER: f64 = 1000.0;

/// Aggregates over one tracking window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklySummary {
    /// Arithmetic mean of daily water intake, in liters
    pub avg_water_liters: f64,
    /// Number of days at or above the step threshold
    pub high_activity_days: i64,
    /// Total steps multiplied by the per-step calorie estimate
    pub estimated_calories: f64,
}

impl WeeklySummary {
    /// The all-zero summary of an empty window
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            avg_water_liters: 0.0,
            high_activity_days: 0,
            estimated_calories: 0.0,
        }
    }
}

/// Compute the summary over a window of tracking rows
#[must_use]
pub fn weekly_summary(records: &[DailyTracking]) -> WeeklySummary {
    if records.is_empty() {
        return WeeklySummary::empty();
    }

    let total_water_ml: i64 = records.iter().map(|r| r.water_intake_ml).sum();
    let total_steps: i64 = records.iter().map(|r| r.steps).sum();
    let high_activity_days = records
        .iter()
        .filter(|r| r.steps >= HIGH_ACTIVITY_STEP_THRESHOLD)
        .count() as i64;

    WeeklySummary {
        avg_water_liters: total_water_ml as f64 / records.len() as f64 / ML_PER_LITER,
        high_activity_days,
        estimated_calories: total_steps as f64 * CALORIES_PER_STEP,
    }
}

/// One point of the progress chart
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub weight_kg: f64,
    pub body_fat_pct: Option<f64>,
    pub muscle_mass_kg: Option<f64>,
}

/// Project progress rows (already date-ascending) onto chart points
#[must_use]
pub fn chart_series(records: &[Progress]) -> Vec<ChartPoint> {
    records
        .iter()
        .map(|r| ChartPoint {
            date: r.date,
            weight_kg: r.weight_kg,
            body_fat_pct: r.body_fat_pct,
            muscle_mass_kg: r.muscle_mass_kg,
        })
        .collect()
}
