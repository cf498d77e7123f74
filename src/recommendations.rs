// ABOUTME: Goal-based exercise and food recommendations
// ABOUTME: A deterministic rule table keyed by the profile goal, capped at ten picks
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaTrack

//! # Recommendation Filter
//!
//! Rule table:
//! - lose weight: cardio/HIIT exercises, foods under 300 kcal
//! - gain muscle: strength/weightlifting exercises, foods with >= 20 g protein
//! - maintain: the unfiltered default set

use crate::database::Database;
use crate::errors::AppResult;
use crate::models::{Exercise, Food, Goal, HealthProfile};

/// Maximum number of recommended entities per request
pub const MAX_RECOMMENDATIONS: i64 = 10;

/// Foods under this calorie count qualify as weight-loss picks
pub const LOW_CALORIE_THRESHOLD: i64 = 300;

/// Foods at or above this protein content qualify as muscle-gain picks
pub const HIGH_PROTEIN_THRESHOLD_G: f64 = 20.0;

const WEIGHT_LOSS_CATEGORIES: [&str; 2] = ["Cardio", "HIIT"];
const MUSCLE_GAIN_CATEGORIES: [&str; 2] = ["Strength", "Weightlifting"];

/// Recommend exercises for the profile's goal
///
/// # Errors
///
/// Returns a database error if the catalog query fails
pub async fn recommend_exercises(
    db: &Database,
    profile: &HealthProfile,
) -> AppResult<Vec<Exercise>> {
    match profile.goal {
        Goal::LoseWeight => {
            db.list_exercises_in_categories(&WEIGHT_LOSS_CATEGORIES, MAX_RECOMMENDATIONS)
                .await
        }
        Goal::GainMuscle => {
            db.list_exercises_in_categories(&MUSCLE_GAIN_CATEGORIES, MAX_RECOMMENDATIONS)
                .await
        }
        Goal::Maintain => db.list_default_exercises(MAX_RECOMMENDATIONS).await,
    }
}

/// Recommend foods for the profile's goal
///
/// # Errors
///
/// Returns a database error if the catalog query fails
pub async fn recommend_foods(db: &Database, profile: &HealthProfile) -> AppResult<Vec<Food>> {
    match profile.goal {
        Goal::LoseWeight => {
            db.list_foods_below_calories(LOW_CALORIE_THRESHOLD, MAX_RECOMMENDATIONS)
                .await
        }
        Goal::GainMuscle => {
            db.list_foods_above_protein(HIGH_PROTEIN_THRESHOLD_G, MAX_RECOMMENDATIONS)
                .await
        }
        Goal::Maintain => db.list_default_foods(MAX_RECOMMENDATIONS).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExerciseCategory, Goal, User};
    use chrono::Utc;
    use uuid::Uuid;

    async fn seeded_db() -> (Database, HealthProfile) {
        let db = Database::new("sqlite::memory:").await.unwrap();

        let user = User::new("reco".to_owned(), "h".to_owned());
        db.create_user(&user).await.unwrap();

        for name in ["Cardio", "HIIT", "Strength", "Weightlifting", "Yoga"] {
            let category = ExerciseCategory {
                id: Uuid::new_v4(),
                name: name.to_owned(),
                description: None,
            };
            db.create_exercise_category(&category).await.unwrap();
            for i in 0..3 {
                let mut exercise =
                    crate::models::Exercise {
                        id: Uuid::new_v4(),
                        name: format!("{name} move {i}"),
                        description: String::new(),
                        category_id: category.id,
                        category_name: String::new(),
                        difficulty: crate::models::Difficulty::Medium,
                        duration_minutes: 20,
                        calories_burned: 150,
                        image_url: None,
                        video_url: None,
                        instructions: "breathe".to_owned(),
                        active: true,
                        created_at: Utc::now(),
                        updated_at: Utc::now(),
                    };
                exercise.description = format!("{name} description");
                db.create_exercise(&exercise).await.unwrap();
            }
        }

        for (name, calories, protein) in [
            ("Salad", 120_i64, 4.0),
            ("Soup", 250, 8.0),
            ("Chicken breast", 340, 32.0),
            ("Protein shake", 280, 25.0),
            ("Burger", 650, 28.0),
        ] {
            let now = Utc::now();
            db.create_food(&crate::models::Food {
                id: Uuid::new_v4(),
                name: name.to_owned(),
                description: None,
                image_url: None,
                meal_type: crate::models::MealType::Lunch,
                calories,
                protein_g: protein,
                carbs_g: 20.0,
                fat_g: 10.0,
                recipe: None,
                active: true,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();
        }

        let now = Utc::now();
        let profile = HealthProfile {
            id: Uuid::new_v4(),
            user_id: user.id,
            height_cm: 175.0,
            weight_kg: 80.0,
            age: 30,
            goal: Goal::LoseWeight,
            target_weight_kg: Some(74.0),
            expert_id: None,
            active: true,
            created_at: now,
            updated_at: now,
        };
        db.create_profile(&profile).await.unwrap();

        (db, profile)
    }

    #[tokio::test]
    async fn test_weight_loss_rules() {
        let (db, profile) = seeded_db().await;

        let exercises = recommend_exercises(&db, &profile).await.unwrap();
        assert!(!exercises.is_empty());
        assert!(exercises.len() <= MAX_RECOMMENDATIONS as usize);
        assert!(exercises
            .iter()
            .all(|e| e.category_name == "Cardio" || e.category_name == "HIIT"));

        let foods = recommend_foods(&db, &profile).await.unwrap();
        assert!(!foods.is_empty());
        assert!(foods.iter().all(|f| f.calories < LOW_CALORIE_THRESHOLD));
    }

    #[tokio::test]
    async fn test_muscle_gain_rules() {
        let (db, mut profile) = seeded_db().await;
        profile.goal = Goal::GainMuscle;

        let exercises = recommend_exercises(&db, &profile).await.unwrap();
        assert!(exercises
            .iter()
            .all(|e| e.category_name == "Strength" || e.category_name == "Weightlifting"));

        let foods = recommend_foods(&db, &profile).await.unwrap();
        assert!(!foods.is_empty());
        assert!(foods.iter().all(|f| f.protein_g >= HIGH_PROTEIN_THRESHOLD_G));
    }

    #[tokio::test]
    async fn test_maintain_returns_capped_default_set() {
        let (db, mut profile) = seeded_db().await;
        profile.goal = Goal::Maintain;

        let exercises = recommend_exercises(&db, &profile).await.unwrap();
        assert_eq!(exercises.len(), MAX_RECOMMENDATIONS as usize);
    }
}
