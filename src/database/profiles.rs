// ABOUTME: Database operations for health profiles
// ABOUTME: One profile per user; the expert assignment is the cross-user access grant
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaTrack

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::{is_unique_violation, parse_uuid, Database};
use crate::errors::{AppError, AppResult};
use crate::models::{Goal, HealthProfile};

fn map_profile_row(row: &SqliteRow) -> AppResult<HealthProfile> {
    let expert_id = row
        .get::<Option<String>, _>("expert_id")
        .as_deref()
        .map(|s| parse_uuid(s, "health_profiles.expert_id"))
        .transpose()?;

    Ok(HealthProfile {
        id: parse_uuid(&row.get::<String, _>("id"), "health_profiles.id")?,
        user_id: parse_uuid(&row.get::<String, _>("user_id"), "health_profiles.user_id")?,
        height_cm: row.get("height_cm"),
        weight_kg: row.get("weight_kg"),
        age: row.get("age"),
        goal: row.get::<String, _>("goal").parse()?,
        target_weight_kg: row.get("target_weight_kg"),
        expert_id,
        active: row.get("active"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

const PROFILE_COLUMNS: &str = "id, user_id, height_cm, weight_kg, age, goal, \
                               target_weight_kg, expert_id, active, created_at, updated_at";

/// Field changes for a profile update; `None` leaves the column untouched
#[derive(Debug, Default, Clone)]
pub(crate) struct ProfileChanges {
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub age: Option<i64>,
    pub goal: Option<Goal>,
    pub target_weight_kg: Option<f64>,
    pub expert_id: Option<Option<Uuid>>,
}

impl Database {
    /// Create the health profiles table
    pub(super) async fn migrate_profiles(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS health_profiles (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
                height_cm REAL NOT NULL,
                weight_kg REAL NOT NULL,
                age INTEGER NOT NULL,
                goal TEXT NOT NULL DEFAULT 'maintain',
                target_weight_kg REAL,
                expert_id TEXT REFERENCES users(id) ON DELETE SET NULL,
                active BOOLEAN NOT NULL DEFAULT true,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to create health_profiles table: {e}")))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_profiles_expert ON health_profiles(expert_id)")
            .execute(self.pool())
            .await
            .map_err(|e| AppError::database(format!("Failed to index health_profiles: {e}")))?;

        Ok(())
    }

    /// Insert a new health profile
    ///
    /// # Errors
    ///
    /// Returns `Conflict` when the user already has a profile
    pub async fn create_profile(&self, profile: &HealthProfile) -> AppResult<Uuid> {
        sqlx::query(
            r"
            INSERT INTO health_profiles (id, user_id, height_cm, weight_kg, age, goal,
                                         target_weight_kg, expert_id, active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ",
        )
        .bind(profile.id.to_string())
        .bind(profile.user_id.to_string())
        .bind(profile.height_cm)
        .bind(profile.weight_kg)
        .bind(profile.age)
        .bind(profile.goal.as_str())
        .bind(profile.target_weight_kg)
        .bind(profile.expert_id.map(|id| id.to_string()))
        .bind(profile.active)
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .execute(self.pool())
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::conflict("A health profile already exists for this user")
            } else {
                AppError::database(format!("Failed to create profile: {e}"))
            }
        })?;

        Ok(profile.id)
    }

    /// Get a profile by its owner
    pub async fn get_profile_by_user(&self, user_id: Uuid) -> AppResult<Option<HealthProfile>> {
        let row = sqlx::query(&format!(
            "SELECT {PROFILE_COLUMNS} FROM health_profiles WHERE user_id = $1 AND active = true"
        ))
        .bind(user_id.to_string())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to get profile: {e}")))?;

        row.as_ref().map(map_profile_row).transpose()
    }

    /// Get a profile by ID
    pub async fn get_profile(&self, profile_id: Uuid) -> AppResult<Option<HealthProfile>> {
        let row = sqlx::query(&format!(
            "SELECT {PROFILE_COLUMNS} FROM health_profiles WHERE id = $1 AND active = true"
        ))
        .bind(profile_id.to_string())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to get profile: {e}")))?;

        row.as_ref().map(map_profile_row).transpose()
    }

    /// List the profiles of clients connected to the given expert
    pub async fn list_profiles_for_expert(&self, expert_id: Uuid) -> AppResult<Vec<HealthProfile>> {
        let rows = sqlx::query(&format!(
            "SELECT {PROFILE_COLUMNS} FROM health_profiles
             WHERE expert_id = $1 AND active = true
             ORDER BY updated_at DESC"
        ))
        .bind(expert_id.to_string())
        .fetch_all(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to list client profiles: {e}")))?;

        rows.iter().map(map_profile_row).collect()
    }

    /// Whether the expert has an active connection to the user
    pub async fn is_expert_connected(&self, expert_id: Uuid, user_id: Uuid) -> AppResult<bool> {
        let row = sqlx::query(
            "SELECT COUNT(*) as n FROM health_profiles
             WHERE user_id = $1 AND expert_id = $2 AND active = true",
        )
        .bind(user_id.to_string())
        .bind(expert_id.to_string())
        .fetch_one(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to check connection: {e}")))?;

        Ok(row.get::<i64, _>("n") > 0)
    }

    /// Apply partial changes to a profile
    pub(crate) async fn update_profile(
        &self,
        profile_id: Uuid,
        changes: &ProfileChanges,
    ) -> AppResult<()> {
        // expert_id distinguishes "leave alone" (outer None) from "clear"
        // (inner None), so it cannot ride on COALESCE like the rest.
        let expert_update = changes.expert_id.is_some();
        let expert_value = changes
            .expert_id
            .as_ref()
            .and_then(|inner| inner.map(|id| id.to_string()));

        sqlx::query(
            r"
            UPDATE health_profiles
            SET height_cm = COALESCE($1, height_cm),
                weight_kg = COALESCE($2, weight_kg),
                age = COALESCE($3, age),
                goal = COALESCE($4, goal),
                target_weight_kg = COALESCE($5, target_weight_kg),
                expert_id = CASE WHEN $6 THEN $7 ELSE expert_id END,
                updated_at = $8
            WHERE id = $9
            ",
        )
        .bind(changes.height_cm)
        .bind(changes.weight_kg)
        .bind(changes.age)
        .bind(changes.goal.map(|g| g.as_str()))
        .bind(changes.target_weight_kg)
        .bind(expert_update)
        .bind(expert_value)
        .bind(Utc::now())
        .bind(profile_id.to_string())
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to update profile: {e}")))?;

        Ok(())
    }

    /// Delete a profile
    pub async fn delete_profile(&self, profile_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM health_profiles WHERE id = $1")
            .bind(profile_id.to_string())
            .execute(self.pool())
            .await
            .map_err(|e| AppError::database(format!("Failed to delete profile: {e}")))?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::create_test_db;
    use super::ProfileChanges;
    use crate::models::{Goal, HealthProfile, User, UserRole};
    use chrono::Utc;
    use uuid::Uuid;

    fn profile_for(user_id: Uuid) -> HealthProfile {
        let now = Utc::now();
        HealthProfile {
            id: Uuid::new_v4(),
            user_id,
            height_cm: 175.0,
            weight_kg: 72.0,
            age: 28,
            goal: Goal::Maintain,
            target_weight_kg: None,
            expert_id: None,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_one_profile_per_user() {
        let db = create_test_db().await.unwrap();
        let user = User::new("ha".to_owned(), "h".to_owned());
        db.create_user(&user).await.unwrap();

        db.create_profile(&profile_for(user.id)).await.unwrap();
        let err = db.create_profile(&profile_for(user.id)).await.unwrap_err();
        assert_eq!(err.code, crate::errors::ErrorCode::ResourceAlreadyExists);
    }

    #[tokio::test]
    async fn test_expert_connection() {
        let db = create_test_db().await.unwrap();
        let user = User::new("client".to_owned(), "h".to_owned());
        let mut expert = User::new("coach".to_owned(), "h".to_owned());
        expert.role = UserRole::Trainer;
        db.create_user(&user).await.unwrap();
        db.create_user(&expert).await.unwrap();

        let mut profile = profile_for(user.id);
        profile.expert_id = Some(expert.id);
        db.create_profile(&profile).await.unwrap();

        assert!(db.is_expert_connected(expert.id, user.id).await.unwrap());
        assert!(!db.is_expert_connected(user.id, expert.id).await.unwrap());

        let clients = db.list_profiles_for_expert(expert.id).await.unwrap();
        assert_eq!(clients.len(), 1);
        assert_eq!(clients[0].user_id, user.id);
    }

    #[tokio::test]
    async fn test_partial_update_keeps_other_fields() {
        let db = create_test_db().await.unwrap();
        let user = User::new("update".to_owned(), "h".to_owned());
        db.create_user(&user).await.unwrap();
        let profile = profile_for(user.id);
        db.create_profile(&profile).await.unwrap();

        db.update_profile(
            profile.id,
            &ProfileChanges {
                weight_kg: Some(70.5),
                ..ProfileChanges::default()
            },
        )
        .await
        .unwrap();

        let updated = db.get_profile(profile.id).await.unwrap().unwrap();
        assert!((updated.weight_kg - 70.5).abs() < f64::EPSILON);
        assert!((updated.height_cm - 175.0).abs() < f64::EPSILON);
        assert_eq!(updated.goal, Goal::Maintain);
    }
}
