// ABOUTME: Workout and nutrition plans with typed weekly schedule entries
// ABOUTME: Weekday enum plus join entities binding plans to catalog entries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaTrack

use std::fmt::{Display, Formatter, Result as FmtResult};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::profile::Goal;

/// Length of the date range given to a freshly cloned plan
pub const PLAN_CLONE_DURATION_DAYS: i64 = 28;

/// Day of week, 0 = Monday .. 6 = Sunday.
///
/// Serialized as the integer the mobile clients send; out-of-range values
/// are rejected at deserialization time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "u8", into = "u8")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// All weekdays in order, Monday first
    pub const ALL: [Self; 7] = [
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
        Self::Sunday,
    ];

    /// Numeric value for database storage (0 = Monday)
    #[must_use]
    pub const fn as_index(&self) -> i64 {
        *self as i64
    }

    /// Parse the stored numeric value
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for values outside [0, 6]
    pub fn from_index(value: i64) -> Result<Self, AppError> {
        match value {
            0 => Ok(Self::Monday),
            1 => Ok(Self::Tuesday),
            2 => Ok(Self::Wednesday),
            3 => Ok(Self::Thursday),
            4 => Ok(Self::Friday),
            5 => Ok(Self::Saturday),
            6 => Ok(Self::Sunday),
            _ => Err(AppError::invalid_input(format!(
                "weekday must be between 0 and 6, got {value}"
            ))),
        }
    }

    /// The weekday of a calendar date
    #[must_use]
    pub fn of(date: NaiveDate) -> Self {
        use chrono::Datelike;
        // num_days_from_monday is already 0 = Monday
        match Self::from_index(i64::from(date.weekday().num_days_from_monday())) {
            Ok(day) => day,
            // Unreachable: num_days_from_monday is always 0..=6
            Err(_) => Self::Monday,
        }
    }
}

impl Display for Weekday {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let name = match self {
            Self::Monday => "Monday",
            Self::Tuesday => "Tuesday",
            Self::Wednesday => "Wednesday",
            Self::Thursday => "Thursday",
            Self::Friday => "Friday",
            Self::Saturday => "Saturday",
            Self::Sunday => "Sunday",
        };
        write!(f, "{name}")
    }
}

impl TryFrom<u8> for Weekday {
    type Error = AppError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_index(i64::from(value))
    }
}

impl From<Weekday> for u8 {
    fn from(day: Weekday) -> Self {
        day.as_index() as Self
    }
}

/// A workout plan owned by a user.
///
/// A plan authored by a trainer and still active is a template: visible for
/// browsing and cloning, never directly editable by clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutPlan {
    pub id: Uuid,
    /// Owner
    pub user_id: Uuid,
    pub name: String,
    pub goal: Goal,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Author: the owner themselves or a specialist
    pub created_by: Option<Uuid>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Join entity binding a workout plan to an exercise for one weekday
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutScheduleEntry {
    pub id: Uuid,
    pub plan_id: Uuid,
    pub exercise_id: Uuid,
    pub weekday: Weekday,
    pub sets: i64,
    pub reps: i64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A nutrition plan owned by a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NutritionPlan {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub goal: Goal,
    pub description: Option<String>,
    /// Daily calorie target
    pub daily_calories: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_by: Option<Uuid>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Join entity binding a nutrition plan to a food for one weekday
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealScheduleEntry {
    pub id: Uuid,
    pub plan_id: Uuid,
    pub food_id: Uuid,
    pub weekday: Weekday,
    /// Serving multiplier (1.0 = one standard portion)
    pub portion: f64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weekday_bounds() {
        assert_eq!(Weekday::from_index(0).unwrap(), Weekday::Monday);
        assert_eq!(Weekday::from_index(6).unwrap(), Weekday::Sunday);
        assert!(Weekday::from_index(7).is_err());
        assert!(Weekday::from_index(-1).is_err());
    }

    #[test]
    fn test_weekday_serde_rejects_out_of_range() {
        let ok: Weekday = serde_json::from_str("3").unwrap();
        assert_eq!(ok, Weekday::Thursday);
        assert!(serde_json::from_str::<Weekday>("9").is_err());
    }

    #[test]
    fn test_weekday_of_date() {
        // 2025-01-06 was a Monday
        let date = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        assert_eq!(Weekday::of(date), Weekday::Monday);
        assert_eq!(Weekday::of(date + chrono::Days::new(6)), Weekday::Sunday);
    }
}
