// ABOUTME: Database operations for daily tracking records
// ABOUTME: Enforces one row per (user, date) and the idempotent today flow
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaTrack

use chrono::{NaiveDate, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::{is_unique_violation, parse_uuid, Database};
use crate::errors::{AppError, AppResult};
use crate::models::DailyTracking;

fn map_tracking_row(row: &SqliteRow) -> AppResult<DailyTracking> {
    Ok(DailyTracking {
        id: parse_uuid(&row.get::<String, _>("id"), "daily_tracking.id")?,
        user_id: parse_uuid(&row.get::<String, _>("user_id"), "daily_tracking.user_id")?,
        date: row.get("date"),
        weight_kg: row.get("weight_kg"),
        water_intake_ml: row.get("water_intake_ml"),
        steps: row.get("steps"),
        heart_rate: row.get("heart_rate"),
        notes: row.get("notes"),
        active: row.get("active"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

const TRACKING_COLUMNS: &str = "id, user_id, date, weight_kg, water_intake_ml, steps, \
                                heart_rate, notes, active, created_at, updated_at";

/// Field changes for a tracking update; `None` leaves the column untouched
#[derive(Debug, Default, Clone)]
pub(crate) struct TrackingChanges {
    pub weight_kg: Option<f64>,
    pub water_intake_ml: Option<i64>,
    pub steps: Option<i64>,
    pub heart_rate: Option<i64>,
    pub notes: Option<String>,
}

impl Database {
    /// Create the daily tracking table
    pub(super) async fn migrate_tracking(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS daily_tracking (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                date TEXT NOT NULL,
                weight_kg REAL,
                water_intake_ml INTEGER NOT NULL DEFAULT 0,
                steps INTEGER NOT NULL DEFAULT 0,
                heart_rate INTEGER,
                notes TEXT,
                active BOOLEAN NOT NULL DEFAULT true,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE (user_id, date)
            )
            ",
        )
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to create daily_tracking table: {e}")))?;

        Ok(())
    }

    /// Insert a tracking record
    ///
    /// # Errors
    ///
    /// Returns `Conflict` when a record already exists for the (user, date)
    pub async fn create_tracking(&self, record: &DailyTracking) -> AppResult<Uuid> {
        sqlx::query(
            r"
            INSERT INTO daily_tracking (id, user_id, date, weight_kg, water_intake_ml,
                                        steps, heart_rate, notes, active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ",
        )
        .bind(record.id.to_string())
        .bind(record.user_id.to_string())
        .bind(record.date)
        .bind(record.weight_kg)
        .bind(record.water_intake_ml)
        .bind(record.steps)
        .bind(record.heart_rate)
        .bind(&record.notes)
        .bind(record.active)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(self.pool())
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::conflict(format!(
                    "A tracking record already exists for {}",
                    record.date
                ))
            } else {
                AppError::database(format!("Failed to create tracking record: {e}"))
            }
        })?;

        Ok(record.id)
    }

    /// Get a tracking record by ID
    pub async fn get_tracking(&self, record_id: Uuid) -> AppResult<Option<DailyTracking>> {
        let row = sqlx::query(&format!(
            "SELECT {TRACKING_COLUMNS} FROM daily_tracking WHERE id = $1"
        ))
        .bind(record_id.to_string())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to get tracking record: {e}")))?;

        row.as_ref().map(map_tracking_row).transpose()
    }

    /// Get the record for one (user, date)
    pub async fn get_tracking_by_date(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> AppResult<Option<DailyTracking>> {
        let row = sqlx::query(&format!(
            "SELECT {TRACKING_COLUMNS} FROM daily_tracking WHERE user_id = $1 AND date = $2"
        ))
        .bind(user_id.to_string())
        .bind(date)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to get tracking record: {e}")))?;

        row.as_ref().map(map_tracking_row).transpose()
    }

    /// Get or create the record for one (user, date). Idempotent: the second
    /// call returns the row the first call created.
    pub async fn get_or_create_tracking(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> AppResult<DailyTracking> {
        if let Some(existing) = self.get_tracking_by_date(user_id, date).await? {
            return Ok(existing);
        }

        let now = Utc::now();
        let fresh = DailyTracking {
            id: Uuid::new_v4(),
            user_id,
            date,
            weight_kg: None,
            water_intake_ml: 0,
            steps: 0,
            heart_rate: None,
            notes: None,
            active: true,
            created_at: now,
            updated_at: now,
        };

        match self.create_tracking(&fresh).await {
            Ok(_) => Ok(fresh),
            // Lost the race to a concurrent create; the row is there now
            Err(e) if e.code == crate::errors::ErrorCode::ResourceAlreadyExists => self
                .get_tracking_by_date(user_id, date)
                .await?
                .ok_or_else(|| AppError::internal("Tracking record vanished after conflict")),
            Err(e) => Err(e),
        }
    }

    /// List a user's tracking records, newest first, optionally bounded
    pub async fn list_tracking(
        &self,
        user_id: Uuid,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> AppResult<Vec<DailyTracking>> {
        let rows = sqlx::query(&format!(
            "SELECT {TRACKING_COLUMNS} FROM daily_tracking
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
        .map_err(|e| AppError::database(format!("Failed to list tracking records: {e}")))?;

        rows.iter().map(map_tracking_row).collect()
    }

    /// Apply partial changes to a tracking record
    pub(crate) async fn update_tracking(
        &self,
        record_id: Uuid,
        changes: &TrackingChanges,
    ) -> AppResult<()> {
        sqlx::query(
            r"
            UPDATE daily_tracking
            SET weight_kg = COALESCE($1, weight_kg),
                water_intake_ml = COALESCE($2, water_intake_ml),
                steps = COALESCE($3, steps),
                heart_rate = COALESCE($4, heart_rate),
                notes = COALESCE($5, notes),
                updated_at = $6
            WHERE id = $7
            ",
        )
        .bind(changes.weight_kg)
        .bind(changes.water_intake_ml)
        .bind(changes.steps)
        .bind(changes.heart_rate)
        .bind(&changes.notes)
        .bind(Utc::now())
        .bind(record_id.to_string())
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to update tracking record: {e}")))?;

        Ok(())
    }

    /// Delete a tracking record
    pub async fn delete_tracking(&self, record_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM daily_tracking WHERE id = $1")
            .bind(record_id.to_string())
            .execute(self.pool())
            .await
            .map_err(|e| AppError::database(format!("Failed to delete tracking record: {e}")))?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::create_test_db;
    use crate::errors::ErrorCode;
    use crate::models::{DailyTracking, User};
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    fn record_for(user_id: Uuid, date: NaiveDate) -> DailyTracking {
        let now = Utc::now();
        DailyTracking {
            id: Uuid::new_v4(),
            user_id,
            date,
            weight_kg: Some(71.0),
            water_intake_ml: 1500,
            steps: 8000,
            heart_rate: Some(62),
            notes: None,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_duplicate_date_conflicts() {
        let db = create_test_db().await.unwrap();
        let user = User::new("walker".to_owned(), "h".to_owned());
        db.create_user(&user).await.unwrap();

        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        db.create_tracking(&record_for(user.id, date)).await.unwrap();
        let err = db
            .create_tracking(&record_for(user.id, date))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ResourceAlreadyExists);
    }

    #[tokio::test]
    async fn test_get_or_create_is_idempotent() {
        let db = create_test_db().await.unwrap();
        let user = User::new("today".to_owned(), "h".to_owned());
        db.create_user(&user).await.unwrap();

        let date = NaiveDate::from_ymd_opt(2025, 3, 11).unwrap();
        let first = db.get_or_create_tracking(user.id, date).await.unwrap();
        let second = db.get_or_create_tracking(user.id, date).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.steps, 0);
        assert_eq!(second.water_intake_ml, 0);
    }

    #[tokio::test]
    async fn test_range_listing() {
        let db = create_test_db().await.unwrap();
        let user = User::new("range".to_owned(), "h".to_owned());
        db.create_user(&user).await.unwrap();

        for day in 1..=5 {
            let date = NaiveDate::from_ymd_opt(2025, 3, day).unwrap();
            db.create_tracking(&record_for(user.id, date)).await.unwrap();
        }

        let window = db
            .list_tracking(
                user.id,
                NaiveDate::from_ymd_opt(2025, 3, 2),
                NaiveDate::from_ymd_opt(2025, 3, 4),
            )
            .await
            .unwrap();
        assert_eq!(window.len(), 3);
        // newest first
        assert!(window[0].date > window[2].date);
    }
}
