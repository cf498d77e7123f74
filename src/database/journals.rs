// ABOUTME: Database operations for health journal entries
// ABOUTME: Enforces one entry per (user, date)
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaTrack

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::{is_unique_violation, parse_uuid, Database};
use crate::errors::{AppError, AppResult};
use crate::models::{HealthJournal, Mood};

fn map_journal_row(row: &SqliteRow) -> AppResult<HealthJournal> {
    Ok(HealthJournal {
        id: parse_uuid(&row.get::<String, _>("id"), "journals.id")?,
        user_id: parse_uuid(&row.get::<String, _>("user_id"), "journals.user_id")?,
        date: row.get("date"),
        title: row.get("title"),
        content: row.get("content"),
        mood: row.get::<String, _>("mood").parse()?,
        workout_completed: row.get("workout_completed"),
        workout_notes: row.get("workout_notes"),
        energy_level: row.get("energy_level"),
        sleep_hours: row.get("sleep_hours"),
        image_url: row.get("image_url"),
        active: row.get("active"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

const JOURNAL_COLUMNS: &str = "id, user_id, date, title, content, mood, workout_completed, \
                               workout_notes, energy_level, sleep_hours, image_url, active, \
                               created_at, updated_at";

/// Field changes for a journal update; `None` leaves the column untouched
#[derive(Debug, Default, Clone)]
pub(crate) struct JournalChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub mood: Option<Mood>,
    pub workout_completed: Option<bool>,
    pub workout_notes: Option<String>,
    pub energy_level: Option<i64>,
    pub sleep_hours: Option<f64>,
}

impl Database {
    /// Create the journals table
    pub(super) async fn migrate_journals(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS journals (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                date TEXT NOT NULL,
                title TEXT NOT NULL,
                content TEXT NOT NULL,
                mood TEXT NOT NULL DEFAULT 'normal',
                workout_completed BOOLEAN NOT NULL DEFAULT false,
                workout_notes TEXT,
                energy_level INTEGER NOT NULL DEFAULT 5,
                sleep_hours REAL,
                image_url TEXT,
                active BOOLEAN NOT NULL DEFAULT true,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE (user_id, date)
            )
            ",
        )
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to create journals table: {e}")))?;

        Ok(())
    }

    /// Insert a journal entry
    ///
    /// # Errors
    ///
    /// Returns `Conflict` when an entry already exists for the (user, date)
    pub async fn create_journal(&self, journal: &HealthJournal) -> AppResult<Uuid> {
        sqlx::query(
            r"
            INSERT INTO journals (id, user_id, date, title, content, mood, workout_completed,
                                  workout_notes, energy_level, sleep_hours, image_url, active,
                                  created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            ",
        )
        .bind(journal.id.to_string())
        .bind(journal.user_id.to_string())
        .bind(journal.date)
        .bind(&journal.title)
        .bind(&journal.content)
        .bind(journal.mood.as_str())
        .bind(journal.workout_completed)
        .bind(&journal.workout_notes)
        .bind(journal.energy_level)
        .bind(journal.sleep_hours)
        .bind(&journal.image_url)
        .bind(journal.active)
        .bind(journal.created_at)
        .bind(journal.updated_at)
        .execute(self.pool())
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::conflict(format!(
                    "A journal entry already exists for {}",
                    journal.date
                ))
            } else {
                AppError::database(format!("Failed to create journal entry: {e}"))
            }
        })?;

        Ok(journal.id)
    }

    /// Get a journal entry by ID
    pub async fn get_journal(&self, journal_id: Uuid) -> AppResult<Option<HealthJournal>> {
        let row = sqlx::query(&format!(
            "SELECT {JOURNAL_COLUMNS} FROM journals WHERE id = $1 AND active = true"
        ))
        .bind(journal_id.to_string())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to get journal entry: {e}")))?;

        row.as_ref().map(map_journal_row).transpose()
    }

    /// List a user's journal entries, newest first
    pub async fn list_journals(&self, user_id: Uuid) -> AppResult<Vec<HealthJournal>> {
        let rows = sqlx::query(&format!(
            "SELECT {JOURNAL_COLUMNS} FROM journals
             WHERE user_id = $1 AND active = true
             ORDER BY date DESC"
        ))
        .bind(user_id.to_string())
        .fetch_all(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to list journal entries: {e}")))?;

        rows.iter().map(map_journal_row).collect()
    }

    /// Apply partial changes to a journal entry
    pub(crate) async fn update_journal(
        &self,
        journal_id: Uuid,
        changes: &JournalChanges,
    ) -> AppResult<()> {
        sqlx::query(
            r"
            UPDATE journals
            SET title = COALESCE($1, title),
                content = COALESCE($2, content),
                mood = COALESCE($3, mood),
                workout_completed = COALESCE($4, workout_completed),
                workout_notes = COALESCE($5, workout_notes),
                energy_level = COALESCE($6, energy_level),
                sleep_hours = COALESCE($7, sleep_hours),
                updated_at = $8
            WHERE id = $9
            ",
        )
        .bind(&changes.title)
        .bind(&changes.content)
        .bind(changes.mood.map(|m| m.as_str()))
        .bind(changes.workout_completed)
        .bind(&changes.workout_notes)
        .bind(changes.energy_level)
        .bind(changes.sleep_hours)
        .bind(Utc::now())
        .bind(journal_id.to_string())
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to update journal entry: {e}")))?;

        Ok(())
    }

    /// Delete a journal entry
    pub async fn delete_journal(&self, journal_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM journals WHERE id = $1")
            .bind(journal_id.to_string())
            .execute(self.pool())
            .await
            .map_err(|e| AppError::database(format!("Failed to delete journal entry: {e}")))?;

        Ok(result.rows_affected() > 0)
    }
}
