// ABOUTME: Database operations for catalog reference data (exercises, foods)
// ABOUTME: Browsing filters plus the goal-driven recommendation queries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaTrack

use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::{parse_uuid, Database};
use crate::errors::{AppError, AppResult};
use crate::models::{Difficulty, Exercise, ExerciseCategory, Food, MealType};

fn map_category_row(row: &SqliteRow) -> AppResult<ExerciseCategory> {
    Ok(ExerciseCategory {
        id: parse_uuid(&row.get::<String, _>("id"), "exercise_categories.id")?,
        name: row.get("name"),
        description: row.get("description"),
    })
}

fn map_exercise_row(row: &SqliteRow) -> AppResult<Exercise> {
    Ok(Exercise {
        id: parse_uuid(&row.get::<String, _>("id"), "exercises.id")?,
        name: row.get("name"),
        description: row.get("description"),
        category_id: parse_uuid(&row.get::<String, _>("category_id"), "exercises.category_id")?,
        category_name: row.get("category_name"),
        difficulty: row.get::<String, _>("difficulty").parse()?,
        duration_minutes: row.get("duration_minutes"),
        calories_burned: row.get("calories_burned"),
        image_url: row.get("image_url"),
        video_url: row.get("video_url"),
        instructions: row.get("instructions"),
        active: row.get("active"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

fn map_food_row(row: &SqliteRow) -> AppResult<Food> {
    Ok(Food {
        id: parse_uuid(&row.get::<String, _>("id"), "foods.id")?,
        name: row.get("name"),
        description: row.get("description"),
        image_url: row.get("image_url"),
        meal_type: row.get::<String, _>("meal_type").parse()?,
        calories: row.get("calories"),
        protein_g: row.get("protein_g"),
        carbs_g: row.get("carbs_g"),
        fat_g: row.get("fat_g"),
        recipe: row.get("recipe"),
        active: row.get("active"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

const EXERCISE_SELECT: &str = "SELECT e.id, e.name, e.description, e.category_id, \
     c.name AS category_name, e.difficulty, e.duration_minutes, e.calories_burned, \
     e.image_url, e.video_url, e.instructions, e.active, e.created_at, e.updated_at \
     FROM exercises e JOIN exercise_categories c ON c.id = e.category_id";

const FOOD_COLUMNS: &str = "id, name, description, image_url, meal_type, calories, \
                            protein_g, carbs_g, fat_g, recipe, active, created_at, updated_at";

/// Browse filters for the exercise catalog
#[derive(Debug, Default, Clone)]
pub struct ExerciseFilter {
    pub category_id: Option<Uuid>,
    pub difficulty: Option<Difficulty>,
    /// Substring match against name or description
    pub search: Option<String>,
}

/// Browse filters for the food catalog
#[derive(Debug, Default, Clone)]
pub struct FoodFilter {
    pub meal_type: Option<MealType>,
    pub search: Option<String>,
    pub max_calories: Option<i64>,
}

impl Database {
    /// Create the catalog tables
    pub(super) async fn migrate_catalog(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS exercise_categories (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                description TEXT
            )
            ",
        )
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to create exercise_categories: {e}")))?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS exercises (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT NOT NULL,
                category_id TEXT NOT NULL REFERENCES exercise_categories(id) ON DELETE CASCADE,
                difficulty TEXT NOT NULL DEFAULT 'medium',
                duration_minutes INTEGER NOT NULL,
                calories_burned INTEGER NOT NULL,
                image_url TEXT,
                video_url TEXT,
                instructions TEXT NOT NULL,
                active BOOLEAN NOT NULL DEFAULT true,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to create exercises table: {e}")))?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS foods (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT,
                image_url TEXT,
                meal_type TEXT NOT NULL,
                calories INTEGER NOT NULL,
                protein_g REAL NOT NULL DEFAULT 0,
                carbs_g REAL NOT NULL DEFAULT 0,
                fat_g REAL NOT NULL DEFAULT 0,
                recipe TEXT,
                active BOOLEAN NOT NULL DEFAULT true,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to create foods table: {e}")))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_exercises_category ON exercises(category_id)")
            .execute(self.pool())
            .await
            .map_err(|e| AppError::database(format!("Failed to index exercises: {e}")))?;

        Ok(())
    }

    /// Insert an exercise category
    pub async fn create_exercise_category(&self, category: &ExerciseCategory) -> AppResult<Uuid> {
        sqlx::query(
            "INSERT INTO exercise_categories (id, name, description) VALUES ($1, $2, $3)",
        )
        .bind(category.id.to_string())
        .bind(&category.name)
        .bind(&category.description)
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to create category: {e}")))?;

        Ok(category.id)
    }

    /// List all exercise categories
    pub async fn list_exercise_categories(&self) -> AppResult<Vec<ExerciseCategory>> {
        let rows =
            sqlx::query("SELECT id, name, description FROM exercise_categories ORDER BY name")
                .fetch_all(self.pool())
                .await
                .map_err(|e| AppError::database(format!("Failed to list categories: {e}")))?;

        rows.iter().map(map_category_row).collect()
    }

    /// Insert an exercise
    pub async fn create_exercise(&self, exercise: &Exercise) -> AppResult<Uuid> {
        sqlx::query(
            r"
            INSERT INTO exercises (id, name, description, category_id, difficulty,
                                   duration_minutes, calories_burned, image_url, video_url,
                                   instructions, active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ",
        )
        .bind(exercise.id.to_string())
        .bind(&exercise.name)
        .bind(&exercise.description)
        .bind(exercise.category_id.to_string())
        .bind(exercise.difficulty.as_str())
        .bind(exercise.duration_minutes)
        .bind(exercise.calories_burned)
        .bind(&exercise.image_url)
        .bind(&exercise.video_url)
        .bind(&exercise.instructions)
        .bind(exercise.active)
        .bind(exercise.created_at)
        .bind(exercise.updated_at)
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to create exercise: {e}")))?;

        Ok(exercise.id)
    }

    /// Get an active exercise by ID
    pub async fn get_exercise(&self, exercise_id: Uuid) -> AppResult<Option<Exercise>> {
        let row = sqlx::query(&format!("{EXERCISE_SELECT} WHERE e.id = $1 AND e.active = true"))
            .bind(exercise_id.to_string())
            .fetch_optional(self.pool())
            .await
            .map_err(|e| AppError::database(format!("Failed to get exercise: {e}")))?;

        row.as_ref().map(map_exercise_row).transpose()
    }

    /// List active exercises matching the browse filters
    pub async fn list_exercises(&self, filter: &ExerciseFilter) -> AppResult<Vec<Exercise>> {
        let search = filter.search.as_ref().map(|s| format!("%{s}%"));

        let rows = sqlx::query(&format!(
            "{EXERCISE_SELECT}
             WHERE e.active = true
               AND ($1 IS NULL OR e.category_id = $1)
               AND ($2 IS NULL OR e.difficulty = $2)
               AND ($3 IS NULL OR e.name LIKE $3 OR e.description LIKE $3)
             ORDER BY e.name"
        ))
        .bind(filter.category_id.map(|id| id.to_string()))
        .bind(filter.difficulty.map(|d| d.as_str()))
        .bind(search)
        .fetch_all(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to list exercises: {e}")))?;

        rows.iter().map(map_exercise_row).collect()
    }

    /// List active exercises whose category is one of the given names
    pub async fn list_exercises_in_categories(
        &self,
        category_names: &[&str],
        limit: i64,
    ) -> AppResult<Vec<Exercise>> {
        // The rule table only ever names a handful of categories
        let placeholders: Vec<String> = (0..category_names.len())
            .map(|i| format!("${}", i + 1))
            .collect();
        let sql = format!(
            "{EXERCISE_SELECT}
             WHERE e.active = true AND c.name IN ({})
             ORDER BY e.name LIMIT ${}",
            placeholders.join(", "),
            category_names.len() + 1
        );

        let mut query = sqlx::query(&sql);
        for name in category_names {
            query = query.bind(*name);
        }
        let rows = query
            .bind(limit)
            .fetch_all(self.pool())
            .await
            .map_err(|e| AppError::database(format!("Failed to list exercises: {e}")))?;

        rows.iter().map(map_exercise_row).collect()
    }

    /// First N active exercises (the unfiltered default set)
    pub async fn list_default_exercises(&self, limit: i64) -> AppResult<Vec<Exercise>> {
        let rows = sqlx::query(&format!(
            "{EXERCISE_SELECT} WHERE e.active = true ORDER BY e.name LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to list exercises: {e}")))?;

        rows.iter().map(map_exercise_row).collect()
    }

    /// Insert a food
    pub async fn create_food(&self, food: &Food) -> AppResult<Uuid> {
        sqlx::query(
            r"
            INSERT INTO foods (id, name, description, image_url, meal_type, calories,
                               protein_g, carbs_g, fat_g, recipe, active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ",
        )
        .bind(food.id.to_string())
        .bind(&food.name)
        .bind(&food.description)
        .bind(&food.image_url)
        .bind(food.meal_type.as_str())
        .bind(food.calories)
        .bind(food.protein_g)
        .bind(food.carbs_g)
        .bind(food.fat_g)
        .bind(&food.recipe)
        .bind(food.active)
        .bind(food.created_at)
        .bind(food.updated_at)
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to create food: {e}")))?;

        Ok(food.id)
    }

    /// Get an active food by ID
    pub async fn get_food(&self, food_id: Uuid) -> AppResult<Option<Food>> {
        let row = sqlx::query(&format!(
            "SELECT {FOOD_COLUMNS} FROM foods WHERE id = $1 AND active = true"
        ))
        .bind(food_id.to_string())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to get food: {e}")))?;

        row.as_ref().map(map_food_row).transpose()
    }

    /// List active foods matching the browse filters
    pub async fn list_foods(&self, filter: &FoodFilter) -> AppResult<Vec<Food>> {
        let search = filter.search.as_ref().map(|s| format!("%{s}%"));

        let rows = sqlx::query(&format!(
            "SELECT {FOOD_COLUMNS} FROM foods
             WHERE active = true
               AND ($1 IS NULL OR meal_type = $1)
               AND ($2 IS NULL OR name LIKE $2 OR description LIKE $2)
               AND ($3 IS NULL OR calories <= $3)
             ORDER BY name"
        ))
        .bind(filter.meal_type.map(|m| m.as_str()))
        .bind(search)
        .bind(filter.max_calories)
        .fetch_all(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to list foods: {e}")))?;

        rows.iter().map(map_food_row).collect()
    }

    /// Active foods under the calorie threshold (weight-loss picks)
    pub async fn list_foods_below_calories(
        &self,
        max_calories: i64,
        limit: i64,
    ) -> AppResult<Vec<Food>> {
        let rows = sqlx::query(&format!(
            "SELECT {FOOD_COLUMNS} FROM foods
             WHERE active = true AND calories < $1
             ORDER BY name LIMIT $2"
        ))
        .bind(max_calories)
        .bind(limit)
        .fetch_all(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to list foods: {e}")))?;

        rows.iter().map(map_food_row).collect()
    }

    /// Active foods at or above the protein threshold (muscle-gain picks)
    pub async fn list_foods_above_protein(
        &self,
        min_protein_g: f64,
        limit: i64,
    ) -> AppResult<Vec<Food>> {
        let rows = sqlx::query(&format!(
            "SELECT {FOOD_COLUMNS} FROM foods
             WHERE active = true AND protein_g >= $1
             ORDER BY name LIMIT $2"
        ))
        .bind(min_protein_g)
        .bind(limit)
        .fetch_all(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to list foods: {e}")))?;

        rows.iter().map(map_food_row).collect()
    }

    /// First N active foods (the unfiltered default set)
    pub async fn list_default_foods(&self, limit: i64) -> AppResult<Vec<Food>> {
        let rows = sqlx::query(&format!(
            "SELECT {FOOD_COLUMNS} FROM foods
             WHERE active = true ORDER BY name LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to list foods: {e}")))?;

        rows.iter().map(map_food_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{create_test_db, test_category as category, test_exercise as exercise, test_food as food};
    use super::{ExerciseFilter, FoodFilter};

    #[tokio::test]
    async fn test_exercise_filters() {
        let db = create_test_db().await.unwrap();
        let cardio = category("Cardio");
        let strength = category("Strength");
        db.create_exercise_category(&cardio).await.unwrap();
        db.create_exercise_category(&strength).await.unwrap();

        db.create_exercise(&exercise("Running", cardio.id)).await.unwrap();
        db.create_exercise(&exercise("Deadlift", strength.id)).await.unwrap();

        let all = db.list_exercises(&ExerciseFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);

        let cardio_only = db
            .list_exercises(&ExerciseFilter {
                category_id: Some(cardio.id),
                ..ExerciseFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(cardio_only.len(), 1);
        assert_eq!(cardio_only[0].category_name, "Cardio");

        let searched = db
            .list_exercises(&ExerciseFilter {
                search: Some("dead".to_owned()),
                ..ExerciseFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(searched.len(), 1);
        assert_eq!(searched[0].name, "Deadlift");
    }

    #[tokio::test]
    async fn test_food_thresholds() {
        let db = create_test_db().await.unwrap();
        db.create_food(&food("Salad", 150, 5.0)).await.unwrap();
        db.create_food(&food("Steak", 450, 40.0)).await.unwrap();

        let light = db.list_foods_below_calories(300, 10).await.unwrap();
        assert_eq!(light.len(), 1);
        assert_eq!(light[0].name, "Salad");

        let protein = db.list_foods_above_protein(20.0, 10).await.unwrap();
        assert_eq!(protein.len(), 1);
        assert_eq!(protein[0].name, "Steak");

        let capped = db
            .list_foods(&FoodFilter {
                max_calories: Some(200),
                ..FoodFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(capped.len(), 1);
    }
}
