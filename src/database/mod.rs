// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Database Management
//!
//! This module provides database functionality for the VitaTrack server.
//! One query module per domain; schema is created with idempotent
//! `CREATE TABLE IF NOT EXISTS` migrations run at startup.

mod catalog;
mod chat;
mod consultations;
mod journals;
mod nutrition_plans;
mod profiles;
mod progress;
mod reminders;
mod tracking;
mod users;
mod workout_plans;

pub use catalog::{ExerciseFilter, FoodFilter};

pub(crate) use journals::JournalChanges;
pub(crate) use nutrition_plans::NutritionPlanChanges;
pub(crate) use profiles::ProfileChanges;
pub(crate) use progress::ProgressChanges;
pub(crate) use reminders::ReminderChanges;
pub(crate) use tracking::TrackingChanges;
pub(crate) use workout_plans::WorkoutPlanChanges;

use std::str::FromStr;

use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{Pool, Sqlite};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

/// Database manager for all persisted state
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Create a new database connection and run migrations
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or a
    /// migration statement fails
    pub async fn new(database_url: &str) -> AppResult<Self> {
        // Foreign keys enforce the plan -> schedule-entry cascade deletes;
        // SQLite leaves them off unless asked.
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| AppError::config(format!("Invalid database URL: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true);

        // An in-memory database exists per connection, so the pool must not
        // fan out across connections or the schema disappears.
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };

        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| AppError::database(format!("Failed to connect: {e}")))?;

        let db = Self { pool };
        db.migrate().await?;

        Ok(db)
    }

    /// Get a reference to the database pool for advanced operations
    #[must_use]
    pub const fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Run database migrations
    ///
    /// # Errors
    ///
    /// Returns an error if a migration statement fails
    pub async fn migrate(&self) -> AppResult<()> {
        self.migrate_users().await?;
        self.migrate_profiles().await?;
        self.migrate_catalog().await?;
        self.migrate_workout_plans().await?;
        self.migrate_nutrition_plans().await?;
        self.migrate_tracking().await?;
        self.migrate_progress().await?;
        self.migrate_consultations().await?;
        self.migrate_reminders().await?;
        self.migrate_journals().await?;
        self.migrate_chat().await?;
        Ok(())
    }
}

/// Whether a sqlx error is a UNIQUE constraint violation
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// Parse a TEXT column back into a UUID
pub(crate) fn parse_uuid(value: &str, column: &str) -> AppResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|e| AppError::database(format!("Corrupt {column} value in database: {e}")))
}
