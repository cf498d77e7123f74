// ABOUTME: Database operations for nutrition plans and their meal schedules
// ABOUTME: Mirrors the workout plan module with nutritionist-authored templates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaTrack

use chrono::{Days, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::{parse_uuid, Database};
use crate::errors::{AppError, AppResult};
use crate::models::{Goal, MealScheduleEntry, NutritionPlan, Weekday, PLAN_CLONE_DURATION_DAYS};

fn map_plan_row(row: &SqliteRow) -> AppResult<NutritionPlan> {
    let created_by = row
        .get::<Option<String>, _>("created_by")
        .as_deref()
        .map(|s| parse_uuid(s, "nutrition_plans.created_by"))
        .transpose()?;

    Ok(NutritionPlan {
        id: parse_uuid(&row.get::<String, _>("id"), "nutrition_plans.id")?,
        user_id: parse_uuid(&row.get::<String, _>("user_id"), "nutrition_plans.user_id")?,
        name: row.get("name"),
        goal: row.get::<String, _>("goal").parse()?,
        description: row.get("description"),
        daily_calories: row.get("daily_calories"),
        start_date: row.get("start_date"),
        end_date: row.get("end_date"),
        created_by,
        active: row.get("active"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

fn map_entry_row(row: &SqliteRow) -> AppResult<MealScheduleEntry> {
    Ok(MealScheduleEntry {
        id: parse_uuid(&row.get::<String, _>("id"), "meal_schedule.id")?,
        plan_id: parse_uuid(&row.get::<String, _>("plan_id"), "meal_schedule.plan_id")?,
        food_id: parse_uuid(&row.get::<String, _>("food_id"), "meal_schedule.food_id")?,
        weekday: Weekday::from_index(row.get("weekday"))?,
        portion: row.get("portion"),
        notes: row.get("notes"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

const PLAN_COLUMNS: &str = "id, user_id, name, goal, description, daily_calories, \
                            start_date, end_date, created_by, active, created_at, updated_at";

const ENTRY_COLUMNS: &str =
    "id, plan_id, food_id, weekday, portion, notes, created_at, updated_at";

/// Field changes for a plan update; `None` leaves the column untouched
#[derive(Debug, Default, Clone)]
pub(crate) struct NutritionPlanChanges {
    pub name: Option<String>,
    pub goal: Option<Goal>,
    pub description: Option<String>,
    pub daily_calories: Option<i64>,
    pub start_date: Option<chrono::NaiveDate>,
    pub end_date: Option<chrono::NaiveDate>,
}

impl Database {
    /// Create the nutrition plan tables
    pub(super) async fn migrate_nutrition_plans(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS nutrition_plans (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                goal TEXT NOT NULL,
                description TEXT,
                daily_calories INTEGER NOT NULL,
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
        .map_err(|e| AppError::database(format!("Failed to create nutrition_plans table: {e}")))?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS meal_schedule (
                id TEXT PRIMARY KEY,
                plan_id TEXT NOT NULL REFERENCES nutrition_plans(id) ON DELETE CASCADE,
                food_id TEXT NOT NULL REFERENCES foods(id) ON DELETE CASCADE,
                weekday INTEGER NOT NULL,
                portion REAL NOT NULL DEFAULT 1.0,
                notes TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to create meal_schedule table: {e}")))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_meal_schedule_plan ON meal_schedule(plan_id)")
            .execute(self.pool())
            .await
            .map_err(|e| AppError::database(format!("Failed to index meal_schedule: {e}")))?;

        Ok(())
    }

    /// Insert a new nutrition plan
    pub async fn create_nutrition_plan(&self, plan: &NutritionPlan) -> AppResult<Uuid> {
        sqlx::query(
            r"
            INSERT INTO nutrition_plans (id, user_id, name, goal, description, daily_calories,
                                         start_date, end_date, created_by, active,
                                         created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ",
        )
        .bind(plan.id.to_string())
        .bind(plan.user_id.to_string())
        .bind(&plan.name)
        .bind(plan.goal.as_str())
        .bind(&plan.description)
        .bind(plan.daily_calories)
        .bind(plan.start_date)
        .bind(plan.end_date)
        .bind(plan.created_by.map(|id| id.to_string()))
        .bind(plan.active)
        .bind(plan.created_at)
        .bind(plan.updated_at)
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to create nutrition plan: {e}")))?;

        Ok(plan.id)
    }

    /// Get an active nutrition plan by ID
    pub async fn get_nutrition_plan(&self, plan_id: Uuid) -> AppResult<Option<NutritionPlan>> {
        let row = sqlx::query(&format!(
            "SELECT {PLAN_COLUMNS} FROM nutrition_plans WHERE id = $1 AND active = true"
        ))
        .bind(plan_id.to_string())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to get nutrition plan: {e}")))?;

        row.as_ref().map(map_plan_row).transpose()
    }

    /// List a user's own active nutrition plans
    pub async fn list_nutrition_plans_for_owner(
        &self,
        user_id: Uuid,
    ) -> AppResult<Vec<NutritionPlan>> {
        let rows = sqlx::query(&format!(
            "SELECT {PLAN_COLUMNS} FROM nutrition_plans
             WHERE user_id = $1 AND active = true
             ORDER BY created_at DESC"
        ))
        .bind(user_id.to_string())
        .fetch_all(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to list nutrition plans: {e}")))?;

        rows.iter().map(map_plan_row).collect()
    }

    /// List active nutrition plans authored by the given specialist
    pub async fn list_nutrition_plans_created_by(
        &self,
        creator_id: Uuid,
    ) -> AppResult<Vec<NutritionPlan>> {
        let rows = sqlx::query(&format!(
            "SELECT {PLAN_COLUMNS} FROM nutrition_plans
             WHERE created_by = $1 AND active = true
             ORDER BY created_at DESC"
        ))
        .bind(creator_id.to_string())
        .fetch_all(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to list nutrition plans: {e}")))?;

        rows.iter().map(map_plan_row).collect()
    }

    /// Newest template plans for a goal: active plans authored by a nutritionist
    pub async fn list_nutrition_templates(
        &self,
        goal: Goal,
        limit: i64,
    ) -> AppResult<Vec<NutritionPlan>> {
        let rows = sqlx::query(&format!(
            "SELECT {PLAN_COLUMNS} FROM nutrition_plans p
             WHERE p.goal = $1 AND p.active = true
               AND p.created_by IN (SELECT id FROM users WHERE role = 'nutritionist')
             ORDER BY p.created_at DESC
             LIMIT $2"
        ))
        .bind(goal.as_str())
        .bind(limit)
        .fetch_all(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to list nutrition templates: {e}")))?;

        rows.iter().map(map_plan_row).collect()
    }

    /// Get an active nutrition plan only if it is a nutritionist-authored template
    pub async fn get_nutrition_template(&self, plan_id: Uuid) -> AppResult<Option<NutritionPlan>> {
        let row = sqlx::query(&format!(
            "SELECT {PLAN_COLUMNS} FROM nutrition_plans p
             WHERE p.id = $1 AND p.active = true
               AND p.created_by IN (SELECT id FROM users WHERE role = 'nutritionist')"
        ))
        .bind(plan_id.to_string())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to get nutrition template: {e}")))?;

        row.as_ref().map(map_plan_row).transpose()
    }

    /// Apply partial changes to a nutrition plan
    pub(crate) async fn update_nutrition_plan(
        &self,
        plan_id: Uuid,
        changes: &NutritionPlanChanges,
    ) -> AppResult<()> {
        sqlx::query(
            r"
            UPDATE nutrition_plans
            SET name = COALESCE($1, name),
                goal = COALESCE($2, goal),
                description = COALESCE($3, description),
                daily_calories = COALESCE($4, daily_calories),
                start_date = COALESCE($5, start_date),
                end_date = COALESCE($6, end_date),
                updated_at = $7
            WHERE id = $8
            ",
        )
        .bind(&changes.name)
        .bind(changes.goal.map(|g| g.as_str()))
        .bind(&changes.description)
        .bind(changes.daily_calories)
        .bind(changes.start_date)
        .bind(changes.end_date)
        .bind(Utc::now())
        .bind(plan_id.to_string())
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to update nutrition plan: {e}")))?;

        Ok(())
    }

    /// Delete a nutrition plan; meal entries go with it via the cascade
    pub async fn delete_nutrition_plan(&self, plan_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM nutrition_plans WHERE id = $1")
            .bind(plan_id.to_string())
            .execute(self.pool())
            .await
            .map_err(|e| AppError::database(format!("Failed to delete nutrition plan: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    /// The plan's meal entries, ordered by weekday
    pub async fn list_meal_schedule(&self, plan_id: Uuid) -> AppResult<Vec<MealScheduleEntry>> {
        let rows = sqlx::query(&format!(
            "SELECT {ENTRY_COLUMNS} FROM meal_schedule
             WHERE plan_id = $1
             ORDER BY weekday, created_at"
        ))
        .bind(plan_id.to_string())
        .fetch_all(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to list meal schedule: {e}")))?;

        rows.iter().map(map_entry_row).collect()
    }

    /// Append a meal entry to a plan
    pub async fn add_meal_entry(&self, entry: &MealScheduleEntry) -> AppResult<Uuid> {
        sqlx::query(
            r"
            INSERT INTO meal_schedule (id, plan_id, food_id, weekday, portion, notes,
                                       created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(entry.id.to_string())
        .bind(entry.plan_id.to_string())
        .bind(entry.food_id.to_string())
        .bind(entry.weekday.as_index())
        .bind(entry.portion)
        .bind(&entry.notes)
        .bind(entry.created_at)
        .bind(entry.updated_at)
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to add meal entry: {e}")))?;

        Ok(entry.id)
    }

    /// Remove a meal entry, but only from a plan the given user owns.
    /// Returns false when no such entry was visible to the caller.
    pub async fn remove_meal_entry(&self, entry_id: Uuid, owner_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            r"
            DELETE FROM meal_schedule
            WHERE id = $1
              AND plan_id IN (SELECT id FROM nutrition_plans WHERE user_id = $2)
            ",
        )
        .bind(entry_id.to_string())
        .bind(owner_id.to_string())
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to remove meal entry: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    /// Clone a template plan and its meal schedule for a new owner, inside
    /// one transaction; the date range is re-anchored at today.
    pub async fn clone_nutrition_plan(
        &self,
        template: &NutritionPlan,
        new_owner: Uuid,
    ) -> AppResult<NutritionPlan> {
        let now = Utc::now();
        let today = now.date_naive();
        let end = today
            .checked_add_days(Days::new(PLAN_CLONE_DURATION_DAYS as u64))
            .ok_or_else(|| AppError::internal("Plan end date out of range"))?;

        let clone = NutritionPlan {
            id: Uuid::new_v4(),
            user_id: new_owner,
            name: format!("{} (copy)", template.name),
            goal: template.goal,
            description: template.description.clone(),
            daily_calories: template.daily_calories,
            start_date: today,
            end_date: end,
            created_by: Some(new_owner),
            active: true,
            created_at: now,
            updated_at: now,
        };

        let entries = self.list_meal_schedule(template.id).await?;

        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        sqlx::query(
            r"
            INSERT INTO nutrition_plans (id, user_id, name, goal, description, daily_calories,
                                         start_date, end_date, created_by, active,
                                         created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ",
        )
        .bind(clone.id.to_string())
        .bind(clone.user_id.to_string())
        .bind(&clone.name)
        .bind(clone.goal.as_str())
        .bind(&clone.description)
        .bind(clone.daily_calories)
        .bind(clone.start_date)
        .bind(clone.end_date)
        .bind(clone.created_by.map(|id| id.to_string()))
        .bind(clone.active)
        .bind(clone.created_at)
        .bind(clone.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to clone nutrition plan: {e}")))?;

        for entry in &entries {
            sqlx::query(
                r"
                INSERT INTO meal_schedule (id, plan_id, food_id, weekday, portion, notes,
                                           created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                ",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(clone.id.to_string())
            .bind(entry.food_id.to_string())
            .bind(entry.weekday.as_index())
            .bind(entry.portion)
            .bind(&entry.notes)
            .bind(now)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to clone meal entry: {e}")))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit plan clone: {e}")))?;

        Ok(clone)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{create_test_db, test_food};
    use crate::models::{Goal, MealScheduleEntry, NutritionPlan, User, UserRole, Weekday};
    use chrono::{Days, Utc};
    use uuid::Uuid;

    fn plan_for(user_id: Uuid, created_by: Uuid, name: &str) -> NutritionPlan {
        let now = Utc::now();
        let today = now.date_naive();
        NutritionPlan {
            id: Uuid::new_v4(),
            user_id,
            name: name.to_owned(),
            goal: Goal::GainMuscle,
            description: None,
            daily_calories: 2800,
            start_date: today,
            end_date: today.checked_add_days(Days::new(28)).unwrap(),
            created_by: Some(created_by),
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_clone_preserves_portions_and_calorie_target() {
        let db = create_test_db().await.unwrap();

        let mut dietitian = User::new("dietitian".to_owned(), "h".to_owned());
        dietitian.role = UserRole::Nutritionist;
        let client = User::new("client".to_owned(), "h".to_owned());
        db.create_user(&dietitian).await.unwrap();
        db.create_user(&client).await.unwrap();

        let oats = test_food("Oats", 250, 12.0);
        db.create_food(&oats).await.unwrap();

        let template = plan_for(dietitian.id, dietitian.id, "Bulk meals");
        db.create_nutrition_plan(&template).await.unwrap();
        let now = Utc::now();
        db.add_meal_entry(&MealScheduleEntry {
            id: Uuid::new_v4(),
            plan_id: template.id,
            food_id: oats.id,
            weekday: Weekday::Monday,
            portion: 1.5,
            notes: None,
            created_at: now,
            updated_at: now,
        })
        .await
        .unwrap();

        let clone = db.clone_nutrition_plan(&template, client.id).await.unwrap();
        assert_eq!(clone.daily_calories, 2800);
        assert_eq!(clone.user_id, client.id);

        let entries = db.list_meal_schedule(clone.id).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert!((entries[0].portion - 1.5).abs() < f64::EPSILON);
        assert_eq!(entries[0].weekday, Weekday::Monday);
    }

    #[tokio::test]
    async fn test_nutrition_template_requires_nutritionist_author() {
        let db = create_test_db().await.unwrap();
        let mut trainer = User::new("trainer".to_owned(), "h".to_owned());
        trainer.role = UserRole::Trainer;
        db.create_user(&trainer).await.unwrap();

        // A trainer-authored nutrition plan is not a nutrition template
        let plan = plan_for(trainer.id, trainer.id, "Wrong specialist");
        db.create_nutrition_plan(&plan).await.unwrap();

        assert!(db.get_nutrition_template(plan.id).await.unwrap().is_none());
    }
}
