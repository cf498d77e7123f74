// ABOUTME: Consultation appointments between users and specialists
// ABOUTME: Status state machine: pending -> confirmed -> completed, cancellable until terminal
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaTrack

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;

/// Appointment lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum ConsultationStatus {
    #[default]
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl ConsultationStatus {
    /// Convert to string for database storage
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether no further transitions are possible
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Transition legality: pending -> {confirmed, cancelled},
    /// confirmed -> {completed, cancelled}, terminal states frozen.
    #[must_use]
    pub const fn can_transition_to(&self, next: Self) -> bool {
        match self {
            Self::Pending => matches!(next, Self::Confirmed | Self::Cancelled),
            Self::Confirmed => matches!(next, Self::Completed | Self::Cancelled),
            Self::Completed | Self::Cancelled => false,
        }
    }
}

impl Display for ConsultationStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ConsultationStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(AppError::invalid_input("invalid status")),
        }
    }
}

/// An appointment between a user and an assigned specialist
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Consultation {
    pub id: Uuid,
    /// Client
    pub user_id: Uuid,
    /// Specialist
    pub expert_id: Uuid,
    pub appointment_at: DateTime<Utc>,
    pub status: ConsultationStatus,
    pub notes: Option<String>,
    /// Filled in by the expert after completion
    pub feedback: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
