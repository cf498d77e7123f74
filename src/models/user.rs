// ABOUTME: User account model with role-based specialist distinction
// ABOUTME: User, UserRole definitions and registration helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaTrack

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;

/// Account role. Specialists (nutritionists and trainers) may be assigned to
/// clients and author template plans; plain users own their own data only.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum UserRole {
    /// Regular account
    #[default]
    User,
    /// Nutrition specialist
    Nutritionist,
    /// Training specialist
    Trainer,
}

impl UserRole {
    /// Whether this role is a specialist (may be assigned to clients)
    #[must_use]
    pub const fn is_specialist(&self) -> bool {
        matches!(self, Self::Nutritionist | Self::Trainer)
    }

    /// Convert to string for database storage
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Nutritionist => "nutritionist",
            Self::Trainer => "trainer",
        }
    }
}

impl Display for UserRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "nutritionist" => Ok(Self::Nutritionist),
            "trainer" => Ok(Self::Trainer),
            _ => Err(AppError::invalid_input(format!("Invalid user role: {s}"))),
        }
    }
}

/// A registered account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user ID
    pub id: Uuid,
    /// Login name (unique)
    pub username: String,
    /// Bcrypt password hash
    pub password_hash: String,
    /// Contact email
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    /// Avatar reference resolved by the external object store
    pub avatar_url: Option<String>,
    pub role: UserRole,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new plain-user account. Registration never grants a
    /// specialist role; those are provisioned out of band.
    #[must_use]
    pub fn new(username: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username,
            password_hash,
            email: None,
            first_name: None,
            last_name: None,
            phone: None,
            avatar_url: None,
            role: UserRole::User,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Display name, falling back to the username
    #[must_use]
    pub fn display_name(&self) -> String {
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(first), None) => first.to_owned(),
            (None, Some(last)) => last.to_owned(),
            (None, None) => self.username.clone(),
        }
    }
}
