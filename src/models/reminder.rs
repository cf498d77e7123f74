// ABOUTME: Recurring reminders keyed by a weekday set and time of day
// ABOUTME: User-owned with an enable/disable toggle
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaTrack

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::plan::Weekday;

/// Kind of activity being reminded about
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReminderType {
    Water,
    Exercise,
    Rest,
    Meal,
    Medicine,
}

impl ReminderType {
    /// Convert to string for database storage
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Water => "water",
            Self::Exercise => "exercise",
            Self::Rest => "rest",
            Self::Meal => "meal",
            Self::Medicine => "medicine",
        }
    }
}

impl Display for ReminderType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ReminderType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "water" => Ok(Self::Water),
            "exercise" => Ok(Self::Exercise),
            "rest" => Ok(Self::Rest),
            "meal" => Ok(Self::Meal),
            "medicine" => Ok(Self::Medicine),
            _ => Err(AppError::invalid_input(format!(
                "Invalid reminder type: {s}"
            ))),
        }
    }
}

/// A recurring reminder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reminder {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub reminder_type: ReminderType,
    /// Time of day the reminder fires
    pub time: NaiveTime,
    /// Weekdays the reminder repeats on
    pub days_of_week: Vec<Weekday>,
    pub is_enabled: bool,
    pub message: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reminder {
    /// Whether this reminder fires on the given weekday (and is enabled)
    #[must_use]
    pub fn fires_on(&self, day: Weekday) -> bool {
        self.is_enabled && self.days_of_week.contains(&day)
    }
}
