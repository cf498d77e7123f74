// ABOUTME: Database operations for consultations between users and specialists
// ABOUTME: Role-scoped listings and the status update path
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaTrack

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::{parse_uuid, Database};
use crate::errors::{AppError, AppResult};
use crate::models::{Consultation, ConsultationStatus};

fn map_consultation_row(row: &SqliteRow) -> AppResult<Consultation> {
    Ok(Consultation {
        id: parse_uuid(&row.get::<String, _>("id"), "consultations.id")?,
        user_id: parse_uuid(&row.get::<String, _>("user_id"), "consultations.user_id")?,
        expert_id: parse_uuid(&row.get::<String, _>("expert_id"), "consultations.expert_id")?,
        appointment_at: row.get("appointment_at"),
        status: row.get::<String, _>("status").parse()?,
        notes: row.get("notes"),
        feedback: row.get("feedback"),
        active: row.get("active"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

const CONSULTATION_COLUMNS: &str = "id, user_id, expert_id, appointment_at, status, notes, \
                                    feedback, active, created_at, updated_at";

impl Database {
    /// Create the consultations table
    pub(super) async fn migrate_consultations(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS consultations (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                expert_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                appointment_at TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending',
                notes TEXT,
                feedback TEXT,
                active BOOLEAN NOT NULL DEFAULT true,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to create consultations table: {e}")))?;

        Ok(())
    }

    /// Insert a consultation
    pub async fn create_consultation(&self, consultation: &Consultation) -> AppResult<Uuid> {
        sqlx::query(
            r"
            INSERT INTO consultations (id, user_id, expert_id, appointment_at, status,
                                       notes, feedback, active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ",
        )
        .bind(consultation.id.to_string())
        .bind(consultation.user_id.to_string())
        .bind(consultation.expert_id.to_string())
        .bind(consultation.appointment_at)
        .bind(consultation.status.as_str())
        .bind(&consultation.notes)
        .bind(&consultation.feedback)
        .bind(consultation.active)
        .bind(consultation.created_at)
        .bind(consultation.updated_at)
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to create consultation: {e}")))?;

        Ok(consultation.id)
    }

    /// Get a consultation by ID
    pub async fn get_consultation(&self, id: Uuid) -> AppResult<Option<Consultation>> {
        let row = sqlx::query(&format!(
            "SELECT {CONSULTATION_COLUMNS} FROM consultations WHERE id = $1 AND active = true"
        ))
        .bind(id.to_string())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to get consultation: {e}")))?;

        row.as_ref().map(map_consultation_row).transpose()
    }

    /// List consultations where the given user is the client
    pub async fn list_consultations_for_user(&self, user_id: Uuid) -> AppResult<Vec<Consultation>> {
        let rows = sqlx::query(&format!(
            "SELECT {CONSULTATION_COLUMNS} FROM consultations
             WHERE user_id = $1 AND active = true
             ORDER BY appointment_at DESC"
        ))
        .bind(user_id.to_string())
        .fetch_all(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to list consultations: {e}")))?;

        rows.iter().map(map_consultation_row).collect()
    }

    /// List consultations where the given specialist is the expert
    pub async fn list_consultations_for_expert(
        &self,
        expert_id: Uuid,
    ) -> AppResult<Vec<Consultation>> {
        let rows = sqlx::query(&format!(
            "SELECT {CONSULTATION_COLUMNS} FROM consultations
             WHERE expert_id = $1 AND active = true
             ORDER BY appointment_at DESC"
        ))
        .bind(expert_id.to_string())
        .fetch_all(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to list consultations: {e}")))?;

        rows.iter().map(map_consultation_row).collect()
    }

    /// Upcoming pending/confirmed appointments within the caller's scope,
    /// soonest first. `as_expert` switches between the two participant roles.
    pub async fn list_upcoming_consultations(
        &self,
        participant_id: Uuid,
        as_expert: bool,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Consultation>> {
        let column = if as_expert { "expert_id" } else { "user_id" };
        let rows = sqlx::query(&format!(
            "SELECT {CONSULTATION_COLUMNS} FROM consultations
             WHERE {column} = $1 AND active = true
               AND appointment_at >= $2
               AND status IN ('pending', 'confirmed')
             ORDER BY appointment_at ASC"
        ))
        .bind(participant_id.to_string())
        .bind(now)
        .fetch_all(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to list upcoming consultations: {e}")))?;

        rows.iter().map(map_consultation_row).collect()
    }

    /// Persist a status change (legality is checked by the caller against
    /// the state machine)
    pub async fn update_consultation_status(
        &self,
        id: Uuid,
        status: ConsultationStatus,
        feedback: Option<&str>,
    ) -> AppResult<()> {
        sqlx::query(
            r"
            UPDATE consultations
            SET status = $1,
                feedback = COALESCE($2, feedback),
                updated_at = $3
            WHERE id = $4
            ",
        )
        .bind(status.as_str())
        .bind(feedback)
        .bind(Utc::now())
        .bind(id.to_string())
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to update consultation: {e}")))?;

        Ok(())
    }

    /// Delete a consultation
    pub async fn delete_consultation(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM consultations WHERE id = $1")
            .bind(id.to_string())
            .execute(self.pool())
            .await
            .map_err(|e| AppError::database(format!("Failed to delete consultation: {e}")))?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::create_test_db;
    use crate::models::{Consultation, ConsultationStatus, User, UserRole};
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn consultation(user_id: Uuid, expert_id: Uuid, hours_from_now: i64) -> Consultation {
        let now = Utc::now();
        Consultation {
            id: Uuid::new_v4(),
            user_id,
            expert_id,
            appointment_at: now + Duration::hours(hours_from_now),
            status: ConsultationStatus::Pending,
            notes: None,
            feedback: None,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_upcoming_excludes_past_and_terminal() {
        let db = create_test_db().await.unwrap();
        let user = User::new("client".to_owned(), "h".to_owned());
        let mut expert = User::new("coach".to_owned(), "h".to_owned());
        expert.role = UserRole::Trainer;
        db.create_user(&user).await.unwrap();
        db.create_user(&expert).await.unwrap();

        let future = consultation(user.id, expert.id, 24);
        let past = consultation(user.id, expert.id, -24);
        let cancelled = consultation(user.id, expert.id, 48);
        db.create_consultation(&future).await.unwrap();
        db.create_consultation(&past).await.unwrap();
        db.create_consultation(&cancelled).await.unwrap();
        db.update_consultation_status(cancelled.id, ConsultationStatus::Cancelled, None)
            .await
            .unwrap();

        let upcoming = db
            .list_upcoming_consultations(user.id, false, Utc::now())
            .await
            .unwrap();
        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].id, future.id);

        let for_expert = db
            .list_upcoming_consultations(expert.id, true, Utc::now())
            .await
            .unwrap();
        assert_eq!(for_expert.len(), 1);
    }
}
