// ABOUTME: Database operations for progress measurement records
// ABOUTME: Date-range listings feed the chart series and expert client views
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaTrack

use chrono::{NaiveDate, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::{parse_uuid, Database};
use crate::errors::{AppError, AppResult};
use crate::models::Progress;

fn map_progress_row(row: &SqliteRow) -> AppResult<Progress> {
    Ok(Progress {
        id: parse_uuid(&row.get::<String, _>("id"), "progress.id")?,
        user_id: parse_uuid(&row.get::<String, _>("user_id"), "progress.user_id")?,
        date: row.get("date"),
        weight_kg: row.get("weight_kg"),
        body_fat_pct: row.get("body_fat_pct"),
        muscle_mass_kg: row.get("muscle_mass_kg"),
        photo_url: row.get("photo_url"),
        notes: row.get("notes"),
        active: row.get("active"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

const PROGRESS_COLUMNS: &str = "id, user_id, date, weight_kg, body_fat_pct, muscle_mass_kg, \
                                photo_url, notes, active, created_at, updated_at";

/// Field changes for a progress update; `None` leaves the column untouched
#[derive(Debug, Default, Clone)]
pub(crate) struct ProgressChanges {
    pub weight_kg: Option<f64>,
    pub body_fat_pct: Option<f64>,
    pub muscle_mass_kg: Option<f64>,
    pub photo_url: Option<String>,
    pub notes: Option<String>,
}

impl Database {
    /// Create the progress table
    pub(super) async fn migrate_progress(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS progress (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                date TEXT NOT NULL,
                weight_kg REAL NOT NULL,
                body_fat_pct REAL,
                muscle_mass_kg REAL,
                photo_url TEXT,
                notes TEXT,
                active BOOLEAN NOT NULL DEFAULT true,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to create progress table: {e}")))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_progress_user_date ON progress(user_id, date)",
        )
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to index progress: {e}")))?;

        Ok(())
    }

    /// Insert a progress record
    pub async fn create_progress(&self, record: &Progress) -> AppResult<Uuid> {
        sqlx::query(
            r"
            INSERT INTO progress (id, user_id, date, weight_kg, body_fat_pct, muscle_mass_kg,
                                  photo_url, notes, active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ",
        )
        .bind(record.id.to_string())
        .bind(record.user_id.to_string())
        .bind(record.date)
        .bind(record.weight_kg)
        .bind(record.body_fat_pct)
        .bind(record.muscle_mass_kg)
        .bind(&record.photo_url)
        .bind(&record.notes)
        .bind(record.active)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to create progress record: {e}")))?;

        Ok(record.id)
    }

    /// Get a progress record by ID
    pub async fn get_progress(&self, record_id: Uuid) -> AppResult<Option<Progress>> {
        let row = sqlx::query(&format!(
            "SELECT {PROGRESS_COLUMNS} FROM progress WHERE id = $1"
        ))
        .bind(record_id.to_string())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to get progress record: {e}")))?;

        row.as_ref().map(map_progress_row).transpose()
    }

    /// List a user's progress records, newest first, optionally bounded
    pub async fn list_progress(
        &self,
        user_id: Uuid,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> AppResult<Vec<Progress>> {
        let rows = sqlx::query(&format!(
            "SELECT {PROGRESS_COLUMNS} FROM progress
             WHERE user_id = $1
               AND ($2 IS NULL OR date >= $2)
               AND ($3 IS NULL OR date <= $3)
             ORDER BY date DESC"
        ))
        .bind(user_id.to_string())
        .bind(start_date)
        .bind(end_date)
        .fetch_all(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to list progress records: {e}")))?;

        rows.iter().map(map_progress_row).collect()
    }

    /// Progress rows inside a window, date ascending, for chart series
    pub async fn list_progress_window_asc(
        &self,
        user_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> AppResult<Vec<Progress>> {
        let rows = sqlx::query(&format!(
            "SELECT {PROGRESS_COLUMNS} FROM progress
             WHERE user_id = $1 AND date >= $2 AND date <= $3
             ORDER BY date ASC"
        ))
        .bind(user_id.to_string())
        .bind(start_date)
        .bind(end_date)
        .fetch_all(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to list progress window: {e}")))?;

        rows.iter().map(map_progress_row).collect()
    }

    /// Apply partial changes to a progress record
    pub(crate) async fn update_progress(
        &self,
        record_id: Uuid,
        changes: &ProgressChanges,
    ) -> AppResult<()> {
        sqlx::query(
            r"
            UPDATE progress
            SET weight_kg = COALESCE($1, weight_kg),
                body_fat_pct = COALESCE($2, body_fat_pct),
                muscle_mass_kg = COALESCE($3, muscle_mass_kg),
                photo_url = COALESCE($4, photo_url),
                notes = COALESCE($5, notes),
                updated_at = $6
            WHERE id = $7
            ",
        )
        .bind(changes.weight_kg)
        .bind(changes.body_fat_pct)
        .bind(changes.muscle_mass_kg)
        .bind(&changes.photo_url)
        .bind(&changes.notes)
        .bind(Utc::now())
        .bind(record_id.to_string())
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to update progress record: {e}")))?;

        Ok(())
    }

    /// Delete a progress record
    pub async fn delete_progress(&self, record_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM progress WHERE id = $1")
            .bind(record_id.to_string())
            .execute(self.pool())
            .await
            .map_err(|e| AppError::database(format!("Failed to delete progress record: {e}")))?;

        Ok(result.rows_affected() > 0)
    }
}
