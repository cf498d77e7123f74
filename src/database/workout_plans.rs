// ABOUTME: Database operations for workout plans and their weekly schedules
// ABOUTME: Template lookup plus the transactional plan cloner
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaTrack

use chrono::{Days, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::{parse_uuid, Database};
use crate::errors::{AppError, AppResult};
use crate::models::{Goal, Weekday, WorkoutPlan, WorkoutScheduleEntry, PLAN_CLONE_DURATION_DAYS};

fn map_plan_row(row: &SqliteRow) -> AppResult<WorkoutPlan> {
    let created_by = row
        .get::<Option<String>, _>("created_by")
        .as_deref()
        .map(|s| parse_uuid(s, "workout_plans.created_by"))
        .transpose()?;

    Ok(WorkoutPlan {
        id: parse_uuid(&row.get::<String, _>("id"), "workout_plans.id")?,
        user_id: parse_uuid(&row.get::<String, _>("user_id"), "workout_plans.user_id")?,
        name: row.get("name"),
        goal: row.get::<String, _>("goal").parse()?,
        description: row.get("description"),
        start_date: row.get("start_date"),
        end_date: row.get("end_date"),
        created_by,
        active: row.get("active"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

fn map_entry_row(row: &SqliteRow) -> AppResult<WorkoutScheduleEntry> {
    Ok(WorkoutScheduleEntry {
        id: parse_uuid(&row.get::<String, _>("id"), "workout_schedule.id")?,
        plan_id: parse_uuid(&row.get::<String, _>("plan_id"), "workout_schedule.plan_id")?,
        exercise_id: parse_uuid(
            &row.get::<String, _>("exercise_id"),
            "workout_schedule.exercise_id",
        )?,
        weekday: Weekday::from_index(row.get("weekday"))?,
        sets: row.get("sets"),
        reps: row.get("reps"),
        notes: row.get("notes"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

const PLAN_COLUMNS: &str = "id, user_id, name, goal, description, start_date, end_date, \
                            created_by, active, created_at, updated_at";

const ENTRY_COLUMNS: &str =
    "id, plan_id, exercise_id, weekday, sets, reps, notes, created_at, updated_at";

/// Field changes for a plan update; `None` leaves the column untouched
#[derive(Debug, Default, Clone)]
pub(crate) struct WorkoutPlanChanges {
    pub name: Option<String>,
    pub goal: Option<Goal>,
    pub description: Option<String>,
    pub start_date: Option<chrono::NaiveDate>,
    pub end_date: Option<chrono::NaiveDate>,
}

impl Database {
    /// Create the workout plan tables
    pub(super) async fn migrate_workout_plans(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS workout_plans (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                goal TEXT NOT NULL,
                description TEXT,
                start_date TEXT NOT NULL,
                end_date TEXT NOT NULL,
                created_by TEXT REFERENCES users(id) ON DELETE SET NULL,
                active BOOLEAN NOT NULL DEFAULT true,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to create workout_plans table: {e}")))?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS workout_schedule (
                id TEXT PRIMARY KEY,
                plan_id TEXT NOT NULL REFERENCES workout_plans(id) ON DELETE CASCADE,
                exercise_id TEXT NOT NULL REFERENCES exercises(id) ON DELETE CASCADE,
                weekday INTEGER NOT NULL,
                sets INTEGER NOT NULL DEFAULT 3,
                reps INTEGER NOT NULL DEFAULT 10,
                notes TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to create workout_schedule table: {e}")))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_workout_schedule_plan ON workout_schedule(plan_id)",
        )
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to index workout_schedule: {e}")))?;

        Ok(())
    }

    /// Insert a new workout plan
    pub async fn create_workout_plan(&self, plan: &WorkoutPlan) -> AppResult<Uuid> {
        sqlx::query(
            r"
            INSERT INTO workout_plans (id, user_id, name, goal, description, start_date,
                                       end_date, created_by, active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ",
        )
        .bind(plan.id.to_string())
        .bind(plan.user_id.to_string())
        .bind(&plan.name)
        .bind(plan.goal.as_str())
        .bind(&plan.description)
        .bind(plan.start_date)
        .bind(plan.end_date)
        .bind(plan.created_by.map(|id| id.to_string()))
        .bind(plan.active)
        .bind(plan.created_at)
        .bind(plan.updated_at)
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to create workout plan: {e}")))?;

        Ok(plan.id)
    }

    /// Get an active workout plan by ID
    pub async fn get_workout_plan(&self, plan_id: Uuid) -> AppResult<Option<WorkoutPlan>> {
        let row = sqlx::query(&format!(
            "SELECT {PLAN_COLUMNS} FROM workout_plans WHERE id = $1 AND active = true"
        ))
        .bind(plan_id.to_string())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to get workout plan: {e}")))?;

        row.as_ref().map(map_plan_row).transpose()
    }

    /// List a user's own active workout plans
    pub async fn list_workout_plans_for_owner(&self, user_id: Uuid) -> AppResult<Vec<WorkoutPlan>> {
        let rows = sqlx::query(&format!(
            "SELECT {PLAN_COLUMNS} FROM workout_plans
             WHERE user_id = $1 AND active = true
             ORDER BY created_at DESC"
        ))
        .bind(user_id.to_string())
        .fetch_all(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to list workout plans: {e}")))?;

        rows.iter().map(map_plan_row).collect()
    }

    /// List active workout plans authored by the given specialist
    pub async fn list_workout_plans_created_by(
        &self,
        creator_id: Uuid,
    ) -> AppResult<Vec<WorkoutPlan>> {
        let rows = sqlx::query(&format!(
            "SELECT {PLAN_COLUMNS} FROM workout_plans
             WHERE created_by = $1 AND active = true
             ORDER BY created_at DESC"
        ))
        .bind(creator_id.to_string())
        .fetch_all(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to list workout plans: {e}")))?;

        rows.iter().map(map_plan_row).collect()
    }

    /// Newest template plans for a goal: active plans authored by a trainer
    pub async fn list_workout_templates(
        &self,
        goal: Goal,
        limit: i64,
    ) -> AppResult<Vec<WorkoutPlan>> {
        let rows = sqlx::query(&format!(
            "SELECT {PLAN_COLUMNS} FROM workout_plans p
             WHERE p.goal = $1 AND p.active = true
               AND p.created_by IN (SELECT id FROM users WHERE role = 'trainer')
             ORDER BY p.created_at DESC
             LIMIT $2"
        ))
        .bind(goal.as_str())
        .bind(limit)
        .fetch_all(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to list workout templates: {e}")))?;

        rows.iter().map(map_plan_row).collect()
    }

    /// Get an active workout plan only if it is a trainer-authored template
    pub async fn get_workout_template(&self, plan_id: Uuid) -> AppResult<Option<WorkoutPlan>> {
        let row = sqlx::query(&format!(
            "SELECT {PLAN_COLUMNS} FROM workout_plans p
             WHERE p.id = $1 AND p.active = true
               AND p.created_by IN (SELECT id FROM users WHERE role = 'trainer')"
        ))
        .bind(plan_id.to_string())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to get workout template: {e}")))?;

        row.as_ref().map(map_plan_row).transpose()
    }

    /// Apply partial changes to a workout plan
    pub(crate) async fn update_workout_plan(
        &self,
        plan_id: Uuid,
        changes: &WorkoutPlanChanges,
    ) -> AppResult<()> {
        sqlx::query(
            r"
            UPDATE workout_plans
            SET name = COALESCE($1, name),
                goal = COALESCE($2, goal),
                description = COALESCE($3, description),
                start_date = COALESCE($4, start_date),
                end_date = COALESCE($5, end_date),
                updated_at = $6
            WHERE id = $7
            ",
        )
        .bind(&changes.name)
        .bind(changes.goal.map(|g| g.as_str()))
        .bind(&changes.description)
        .bind(changes.start_date)
        .bind(changes.end_date)
        .bind(Utc::now())
        .bind(plan_id.to_string())
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to update workout plan: {e}")))?;

        Ok(())
    }

    /// Delete a workout plan; schedule entries go with it via the cascade
    pub async fn delete_workout_plan(&self, plan_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM workout_plans WHERE id = $1")
            .bind(plan_id.to_string())
            .execute(self.pool())
            .await
            .map_err(|e| AppError::database(format!("Failed to delete workout plan: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    /// The plan's schedule entries, ordered by weekday
    pub async fn list_workout_schedule(
        &self,
        plan_id: Uuid,
    ) -> AppResult<Vec<WorkoutScheduleEntry>> {
        let rows = sqlx::query(&format!(
            "SELECT {ENTRY_COLUMNS} FROM workout_schedule
             WHERE plan_id = $1
             ORDER BY weekday, created_at"
        ))
        .bind(plan_id.to_string())
        .fetch_all(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to list workout schedule: {e}")))?;

        rows.iter().map(map_entry_row).collect()
    }

    /// Append a schedule entry to a plan
    pub async fn add_workout_entry(&self, entry: &WorkoutScheduleEntry) -> AppResult<Uuid> {
        sqlx::query(
            r"
            INSERT INTO workout_schedule (id, plan_id, exercise_id, weekday, sets, reps,
                                          notes, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ",
        )
        .bind(entry.id.to_string())
        .bind(entry.plan_id.to_string())
        .bind(entry.exercise_id.to_string())
        .bind(entry.weekday.as_index())
        .bind(entry.sets)
        .bind(entry.reps)
        .bind(&entry.notes)
        .bind(entry.created_at)
        .bind(entry.updated_at)
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to add workout entry: {e}")))?;

        Ok(entry.id)
    }

    /// Remove a schedule entry, but only from a plan the given user owns.
    /// Returns false when no such entry was visible to the caller.
    pub async fn remove_workout_entry(&self, entry_id: Uuid, owner_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            r"
            DELETE FROM workout_schedule
            WHERE id = $1
              AND plan_id IN (SELECT id FROM workout_plans WHERE user_id = $2)
            ",
        )
        .bind(entry_id.to_string())
        .bind(owner_id.to_string())
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to remove workout entry: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    /// Clone a template plan and its full schedule for a new owner.
    ///
    /// The new plan's date range is anchored at today for the standard
    /// 28-day duration. Plan and entries are written in one transaction so
    /// a partially cloned plan is never visible.
    pub async fn clone_workout_plan(
        &self,
        template: &WorkoutPlan,
        new_owner: Uuid,
    ) -> AppResult<WorkoutPlan> {
        let now = Utc::now();
        let today = now.date_naive();
        let end = today
            .checked_add_days(Days::new(PLAN_CLONE_DURATION_DAYS as u64))
            .ok_or_else(|| AppError::internal("Plan end date out of range"))?;

        let clone = WorkoutPlan {
            id: Uuid::new_v4(),
            user_id: new_owner,
            name: format!("{} (copy)", template.name),
            goal: template.goal,
            description: template.description.clone(),
            start_date: today,
            end_date: end,
            created_by: Some(new_owner),
            active: true,
            created_at: now,
            updated_at: now,
        };

        let entries = self.list_workout_schedule(template.id).await?;

        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        sqlx::query(
            r"
            INSERT INTO workout_plans (id, user_id, name, goal, description, start_date,
                                       end_date, created_by, active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ",
        )
        .bind(clone.id.to_string())
        .bind(clone.user_id.to_string())
        .bind(&clone.name)
        .bind(clone.goal.as_str())
        .bind(&clone.description)
        .bind(clone.start_date)
        .bind(clone.end_date)
        .bind(clone.created_by.map(|id| id.to_string()))
        .bind(clone.active)
        .bind(clone.created_at)
        .bind(clone.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to clone workout plan: {e}")))?;

        for entry in &entries {
            sqlx::query(
                r"
                INSERT INTO workout_schedule (id, plan_id, exercise_id, weekday, sets, reps,
                                              notes, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                ",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(clone.id.to_string())
            .bind(entry.exercise_id.to_string())
            .bind(entry.weekday.as_index())
            .bind(entry.sets)
            .bind(entry.reps)
            .bind(&entry.notes)
            .bind(now)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to clone schedule entry: {e}")))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit plan clone: {e}")))?;

        Ok(clone)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{create_test_db, test_category, test_exercise};
    use crate::models::{
        Goal, User, UserRole, Weekday, WorkoutPlan, WorkoutScheduleEntry,
        PLAN_CLONE_DURATION_DAYS,
    };
    use chrono::{Days, Utc};
    use uuid::Uuid;

    fn plan_for(user_id: Uuid, created_by: Uuid, name: &str) -> WorkoutPlan {
        let now = Utc::now();
        let today = now.date_naive();
        WorkoutPlan {
            id: Uuid::new_v4(),
            user_id,
            name: name.to_owned(),
            goal: Goal::LoseWeight,
            description: Some("Template plan".to_owned()),
            start_date: today,
            end_date: today.checked_add_days(Days::new(28)).unwrap(),
            created_by: Some(created_by),
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn entry_for(plan_id: Uuid, exercise_id: Uuid, weekday: Weekday) -> WorkoutScheduleEntry {
        let now = Utc::now();
        WorkoutScheduleEntry {
            id: Uuid::new_v4(),
            plan_id,
            exercise_id,
            weekday,
            sets: 4,
            reps: 12,
            notes: Some("slow tempo".to_owned()),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_clone_copies_schedule_and_stays_independent() {
        let db = create_test_db().await.unwrap();

        let mut trainer = User::new("trainer".to_owned(), "h".to_owned());
        trainer.role = UserRole::Trainer;
        let client = User::new("client".to_owned(), "h".to_owned());
        db.create_user(&trainer).await.unwrap();
        db.create_user(&client).await.unwrap();

        let cat = test_category("Cardio");
        db.create_exercise_category(&cat).await.unwrap();
        let run = test_exercise("Running", cat.id);
        let row = test_exercise("Rowing", cat.id);
        db.create_exercise(&run).await.unwrap();
        db.create_exercise(&row).await.unwrap();

        let template = plan_for(trainer.id, trainer.id, "Shred 28");
        db.create_workout_plan(&template).await.unwrap();
        db.add_workout_entry(&entry_for(template.id, run.id, Weekday::Monday))
            .await
            .unwrap();
        db.add_workout_entry(&entry_for(template.id, row.id, Weekday::Wednesday))
            .await
            .unwrap();

        let clone = db.clone_workout_plan(&template, client.id).await.unwrap();
        assert_eq!(clone.user_id, client.id);
        assert_eq!(clone.name, "Shred 28 (copy)");
        assert_eq!(
            clone.end_date,
            clone
                .start_date
                .checked_add_days(Days::new(PLAN_CLONE_DURATION_DAYS as u64))
                .unwrap()
        );

        let cloned_entries = db.list_workout_schedule(clone.id).await.unwrap();
        let template_entries = db.list_workout_schedule(template.id).await.unwrap();
        assert_eq!(cloned_entries.len(), template_entries.len());
        assert_eq!(cloned_entries[0].sets, 4);
        assert_eq!(cloned_entries[0].reps, 12);

        // Mutating the clone leaves the template untouched
        db.remove_workout_entry(cloned_entries[0].id, client.id)
            .await
            .unwrap();
        assert_eq!(db.list_workout_schedule(clone.id).await.unwrap().len(), 1);
        assert_eq!(db.list_workout_schedule(template.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_template_lookup_requires_trainer_author() {
        let db = create_test_db().await.unwrap();
        let user = User::new("self_made".to_owned(), "h".to_owned());
        db.create_user(&user).await.unwrap();

        let own_plan = plan_for(user.id, user.id, "My plan");
        db.create_workout_plan(&own_plan).await.unwrap();

        assert!(db.get_workout_template(own_plan.id).await.unwrap().is_none());
        assert!(db
            .list_workout_templates(Goal::LoseWeight, 3)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_remove_entry_requires_plan_ownership() {
        let db = create_test_db().await.unwrap();
        let owner = User::new("owner".to_owned(), "h".to_owned());
        let other = User::new("other".to_owned(), "h".to_owned());
        db.create_user(&owner).await.unwrap();
        db.create_user(&other).await.unwrap();

        let cat = test_category("Strength");
        db.create_exercise_category(&cat).await.unwrap();
        let lift = test_exercise("Deadlift", cat.id);
        db.create_exercise(&lift).await.unwrap();

        let plan = plan_for(owner.id, owner.id, "Mine");
        db.create_workout_plan(&plan).await.unwrap();
        let entry = entry_for(plan.id, lift.id, Weekday::Friday);
        db.add_workout_entry(&entry).await.unwrap();

        assert!(!db.remove_workout_entry(entry.id, other.id).await.unwrap());
        assert!(db.remove_workout_entry(entry.id, owner.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_plan_cascades_to_entries() {
        let db = create_test_db().await.unwrap();
        let owner = User::new("cascade".to_owned(), "h".to_owned());
        db.create_user(&owner).await.unwrap();

        let cat = test_category("HIIT");
        db.create_exercise_category(&cat).await.unwrap();
        let burpees = test_exercise("Burpees", cat.id);
        db.create_exercise(&burpees).await.unwrap();

        let plan = plan_for(owner.id, owner.id, "Short lived");
        db.create_workout_plan(&plan).await.unwrap();
        db.add_workout_entry(&entry_for(plan.id, burpees.id, Weekday::Tuesday))
            .await
            .unwrap();

        assert!(db.delete_workout_plan(plan.id).await.unwrap());
        assert!(db.list_workout_schedule(plan.id).await.unwrap().is_empty());
    }
}
