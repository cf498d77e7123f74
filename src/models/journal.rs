// ABOUTME: Health journal entries with mood and workout reflections
// ABOUTME: One journal entry per user per date
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaTrack

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;

/// Self-reported mood for the day
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum Mood {
    Great,
    Good,
    #[default]
    Normal,
    Tired,
    Bad,
}

impl Mood {
    /// Convert to string for database storage
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Great => "great",
            Self::Good => "good",
            Self::Normal => "normal",
            Self::Tired => "tired",
            Self::Bad => "bad",
        }
    }
}

impl Display for Mood {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Mood {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "great" => Ok(Self::Great),
            "good" => Ok(Self::Good),
            "normal" => Ok(Self::Normal),
            "tired" => Ok(Self::Tired),
            "bad" => Ok(Self::Bad),
            _ => Err(AppError::invalid_input(format!("Invalid mood: {s}"))),
        }
    }
}

/// A daily journal entry. Unique on (user, date).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthJournal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub title: String,
    pub content: String,
    pub mood: Mood,
    pub workout_completed: bool,
    pub workout_notes: Option<String>,
    /// Self-rated energy, 1-10
    pub energy_level: i64,
    pub sleep_hours: Option<f64>,
    pub image_url: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
