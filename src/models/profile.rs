// ABOUTME: Health profile model with derived BMI and goal enumeration
// ABOUTME: One profile per user, optionally connected to an assigned expert
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaTrack

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;

/// Fitness goal driving plan selection and recommendations
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum Goal {
    LoseWeight,
    GainMuscle,
    #[default]
    Maintain,
}

impl Goal {
    /// Convert to string for database storage
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::LoseWeight => "lose_weight",
            Self::GainMuscle => "gain_muscle",
            Self::Maintain => "maintain",
        }
    }
}

impl Display for Goal {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Goal {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lose_weight" => Ok(Self::LoseWeight),
            "gain_muscle" => Ok(Self::GainMuscle),
            "maintain" => Ok(Self::Maintain),
            _ => Err(AppError::invalid_input(format!("Invalid goal: {s}"))),
        }
    }
}

/// BMI classification bands (WHO cutoffs)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BmiStatus {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiStatus {
    /// Classify a BMI value
    #[must_use]
    pub fn classify(bmi: f64) -> Self {
        if bmi < 18.5 {
            Self::Underweight
        } else if bmi < 25.0 {
            Self::Normal
        } else if bmi < 30.0 {
            Self::Overweight
        } else {
            Self::Obese
        }
    }
}

/// Health profile: body metrics, goal, and the optional expert connection.
///
/// The expert assignment is the single cross-user access grant in the
/// system; see [`crate::permissions`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthProfile {
    pub id: Uuid,
    /// Owner (unique; one profile per user)
    pub user_id: Uuid,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub age: i64,
    pub goal: Goal,
    pub target_weight_kg: Option<f64>,
    /// Assigned specialist, if any
    pub expert_id: Option<Uuid>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl HealthProfile {
    /// Body mass index, derived from current height and weight and rounded
    /// to two decimals. Never stored.
    #[must_use]
    pub fn bmi(&self) -> f64 {
        let height_m = self.height_cm / 100.0;
        (self.weight_kg / (height_m * height_m) * 100.0).round() / 100.0
    }

    /// Classification of the current BMI
    #[must_use]
    pub fn bmi_status(&self) -> BmiStatus {
        BmiStatus::classify(self.bmi())
    }
}
