// ABOUTME: Database operations for recurring reminders
// ABOUTME: Weekday sets stored as JSON arrays, plus the enable toggle
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaTrack

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::{parse_uuid, Database};
use crate::errors::{AppError, AppResult};
use crate::models::{Reminder, Weekday};

fn map_reminder_row(row: &SqliteRow) -> AppResult<Reminder> {
    let days_raw: String = row.get("days_of_week");
    let days_of_week: Vec<Weekday> = serde_json::from_str(&days_raw)
        .map_err(|e| AppError::database(format!("Corrupt days_of_week value: {e}")))?;

    Ok(Reminder {
        id: parse_uuid(&row.get::<String, _>("id"), "reminders.id")?,
        user_id: parse_uuid(&row.get::<String, _>("user_id"), "reminders.user_id")?,
        title: row.get("title"),
        reminder_type: row.get::<String, _>("reminder_type").parse()?,
        time: row.get("time"),
        days_of_week,
        is_enabled: row.get("is_enabled"),
        message: row.get("message"),
        active: row.get("active"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

fn encode_days(days: &[Weekday]) -> AppResult<String> {
    serde_json::to_string(days)
        .map_err(|e| AppError::internal(format!("Failed to encode days_of_week: {e}")))
}

const REMINDER_COLUMNS: &str = "id, user_id, title, reminder_type, time, days_of_week, \
                                is_enabled, message, active, created_at, updated_at";

/// Field changes for a reminder update; `None` leaves the column untouched
#[derive(Debug, Default, Clone)]
pub(crate) struct ReminderChanges {
    pub title: Option<String>,
    pub reminder_type: Option<crate::models::ReminderType>,
    pub time: Option<chrono::NaiveTime>,
    pub days_of_week: Option<Vec<Weekday>>,
    pub message: Option<String>,
}

impl Database {
    /// Create the reminders table
    pub(super) async fn migrate_reminders(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS reminders (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                title TEXT NOT NULL,
                reminder_type TEXT NOT NULL,
                time TEXT NOT NULL,
                days_of_week TEXT NOT NULL DEFAULT '[]',
                is_enabled BOOLEAN NOT NULL DEFAULT true,
                message TEXT,
                active BOOLEAN NOT NULL DEFAULT true,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to create reminders table: {e}")))?;

        Ok(())
    }

    /// Insert a reminder
    pub async fn create_reminder(&self, reminder: &Reminder) -> AppResult<Uuid> {
        sqlx::query(
            r"
            INSERT INTO reminders (id, user_id, title, reminder_type, time, days_of_week,
                                   is_enabled, message, active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ",
        )
        .bind(reminder.id.to_string())
        .bind(reminder.user_id.to_string())
        .bind(&reminder.title)
        .bind(reminder.reminder_type.as_str())
        .bind(reminder.time)
        .bind(encode_days(&reminder.days_of_week)?)
        .bind(reminder.is_enabled)
        .bind(&reminder.message)
        .bind(reminder.active)
        .bind(reminder.created_at)
        .bind(reminder.updated_at)
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to create reminder: {e}")))?;

        Ok(reminder.id)
    }

    /// Get a reminder by ID
    pub async fn get_reminder(&self, reminder_id: Uuid) -> AppResult<Option<Reminder>> {
        let row = sqlx::query(&format!(
            "SELECT {REMINDER_COLUMNS} FROM reminders WHERE id = $1 AND active = true"
        ))
        .bind(reminder_id.to_string())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to get reminder: {e}")))?;

        row.as_ref().map(map_reminder_row).transpose()
    }

    /// List a user's reminders, ordered by time of day
    pub async fn list_reminders(&self, user_id: Uuid) -> AppResult<Vec<Reminder>> {
        let rows = sqlx::query(&format!(
            "SELECT {REMINDER_COLUMNS} FROM reminders
             WHERE user_id = $1 AND active = true
             ORDER BY time"
        ))
        .bind(user_id.to_string())
        .fetch_all(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to list reminders: {e}")))?;

        rows.iter().map(map_reminder_row).collect()
    }

    /// Apply partial changes to a reminder
    pub(crate) async fn update_reminder(
        &self,
        reminder_id: Uuid,
        changes: &ReminderChanges,
    ) -> AppResult<()> {
        let days = changes
            .days_of_week
            .as_deref()
            .map(encode_days)
            .transpose()?;

        sqlx::query(
            r"
            UPDATE reminders
            SET title = COALESCE($1, title),
                reminder_type = COALESCE($2, reminder_type),
                time = COALESCE($3, time),
                days_of_week = COALESCE($4, days_of_week),
                message = COALESCE($5, message),
                updated_at = $6
            WHERE id = $7
            ",
        )
        .bind(&changes.title)
        .bind(changes.reminder_type.map(|t| t.as_str()))
        .bind(changes.time)
        .bind(days)
        .bind(&changes.message)
        .bind(Utc::now())
        .bind(reminder_id.to_string())
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to update reminder: {e}")))?;

        Ok(())
    }

    /// Flip the enabled flag; returns the new value
    pub async fn toggle_reminder(&self, reminder_id: Uuid) -> AppResult<bool> {
        sqlx::query(
            "UPDATE reminders SET is_enabled = NOT is_enabled, updated_at = $1 WHERE id = $2",
        )
        .bind(Utc::now())
        .bind(reminder_id.to_string())
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to toggle reminder: {e}")))?;

        let row = sqlx::query("SELECT is_enabled FROM reminders WHERE id = $1")
            .bind(reminder_id.to_string())
            .fetch_one(self.pool())
            .await
            .map_err(|e| AppError::database(format!("Failed to read reminder toggle: {e}")))?;

        Ok(row.get("is_enabled"))
    }

    /// Delete a reminder
    pub async fn delete_reminder(&self, reminder_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM reminders WHERE id = $1")
            .bind(reminder_id.to_string())
            .execute(self.pool())
            .await
            .map_err(|e| AppError::database(format!("Failed to delete reminder: {e}")))?;

        Ok(result.rows_affected() > 0)
    }
}
