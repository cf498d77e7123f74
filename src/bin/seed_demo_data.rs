// ABOUTME: Demo data seeding binary
// ABOUTME: Populates catalog reference data, demo accounts, and template plans
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Seeds a development database with catalog entries, demo users (password
//! `password123`), and one template plan per specialist.

use anyhow::Result;
use chrono::{Days, Utc};
use clap::Parser;
use tracing::info;
use uuid::Uuid;

use vitatrack_server::{
    auth::hash_password,
    config::environment::ServerConfig,
    database::Database,
    logging,
    models::{
        Difficulty, Exercise, ExerciseCategory, Food, Goal, HealthProfile, MealScheduleEntry,
        MealType, NutritionPlan, User, UserRole, Weekday, WorkoutPlan, WorkoutScheduleEntry,
    },
};

#[derive(Parser)]
#[command(name = "seed-demo-data")]
#[command(about = "Populate the VitaTrack database with demo data")]
struct Args {
    /// Override database URL
    #[arg(long)]
    database_url: Option<String>,
}

const DEMO_PASSWORD: &str = "password123";

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init_from_env()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(url) = args.database_url {
        config.database.url = url;
    }

    let db = Database::new(&config.database.url).await?;
    info!("Seeding {}", config.database.url);

    let (trainer, nutritionist, client) = seed_users(&db).await?;
    let (cardio, strength) = seed_catalog(&db).await?;
    seed_profile(&db, &client, &trainer).await?;
    seed_template_plans(&db, &trainer, &nutritionist, cardio, strength).await?;

    info!("Demo data ready (all demo accounts use password '{DEMO_PASSWORD}')");
    Ok(())
}

async fn seed_users(db: &Database) -> Result<(User, User, User)> {
    let password_hash = hash_password(DEMO_PASSWORD)?;

    let mut trainer = User::new("coach_fit".to_owned(), password_hash.clone());
    trainer.role = UserRole::Trainer;
    trainer.first_name = Some("Tom".to_owned());
    trainer.last_name = Some("Anderson".to_owned());
    trainer.email = Some("tom@example.com".to_owned());

    let mut nutritionist = User::new("dr_nutrition".to_owned(), password_hash.clone());
    nutritionist.role = UserRole::Nutritionist;
    nutritionist.first_name = Some("Sarah".to_owned());
    nutritionist.last_name = Some("Johnson".to_owned());
    nutritionist.email = Some("sarah@example.com".to_owned());

    let mut client = User::new("john_doe".to_owned(), password_hash);
    client.first_name = Some("John".to_owned());
    client.last_name = Some("Doe".to_owned());
    client.email = Some("john@example.com".to_owned());

    for user in [&trainer, &nutritionist, &client] {
        db.create_user(user).await?;
        info!("Created user {}", user.username);
    }

    Ok((trainer, nutritionist, client))
}

async fn seed_catalog(db: &Database) -> Result<(Uuid, Uuid)> {
    let now = Utc::now();

    let mut category_ids = Vec::new();
    for (name, description) in [
        ("Cardio", "Endurance work that raises the heart rate"),
        ("HIIT", "High-intensity interval training"),
        ("Strength", "Compound and isolation resistance work"),
        ("Weightlifting", "Barbell-centric lifts"),
        ("Yoga", "Mobility and balance"),
    ] {
        let category = ExerciseCategory {
            id: Uuid::new_v4(),
            name: name.to_owned(),
            description: Some(description.to_owned()),
        };
        db.create_exercise_category(&category).await?;
        category_ids.push((name, category.id));
    }

    let category_id = |wanted: &str| {
        category_ids
            .iter()
            .find(|(name, _)| *name == wanted)
            .map(|(_, id)| *id)
            .unwrap_or_default()
    };

    let exercises = [
        ("Running", "Cardio", Difficulty::Easy, 30, 300, "Steady pace, nose breathing"),
        ("Jump rope", "Cardio", Difficulty::Medium, 15, 200, "Stay on the balls of your feet"),
        ("Burpee circuit", "HIIT", Difficulty::Hard, 20, 250, "30s work, 15s rest"),
        ("Sprint intervals", "HIIT", Difficulty::Hard, 20, 280, "8 rounds of 30s sprints"),
        ("Push-ups", "Strength", Difficulty::Easy, 10, 80, "Elbows at 45 degrees"),
        ("Squats", "Strength", Difficulty::Medium, 15, 120, "Hips below parallel"),
        ("Deadlift", "Weightlifting", Difficulty::Hard, 25, 180, "Neutral spine, push the floor away"),
        ("Bench press", "Weightlifting", Difficulty::Medium, 25, 150, "Feet planted, shoulder blades pinched"),
        ("Sun salutation", "Yoga", Difficulty::Easy, 20, 90, "Move with the breath"),
    ];
    for (name, category, difficulty, duration, calories, instructions) in exercises {
        db.create_exercise(&Exercise {
            id: Uuid::new_v4(),
            name: name.to_owned(),
            description: format!("{name} ({category})"),
            category_id: category_id(category),
            category_name: category.to_owned(),
            difficulty,
            duration_minutes: duration,
            calories_burned: calories,
            image_url: None,
            video_url: None,
            instructions: instructions.to_owned(),
            active: true,
            created_at: now,
            updated_at: now,
        })
        .await?;
    }

    let foods = [
        ("Oatmeal with berries", MealType::Breakfast, 280, 8.0, 45.0, 6.0),
        ("Scrambled eggs", MealType::Breakfast, 220, 14.0, 2.0, 16.0),
        ("Grilled chicken salad", MealType::Lunch, 350, 32.0, 12.0, 18.0),
        ("Lentil soup", MealType::Lunch, 230, 12.0, 30.0, 4.0),
        ("Salmon with rice", MealType::Dinner, 480, 34.0, 42.0, 16.0),
        ("Tofu stir-fry", MealType::Dinner, 320, 20.0, 24.0, 14.0),
        ("Greek yogurt", MealType::Snack, 120, 11.0, 8.0, 4.0),
        ("Protein shake", MealType::Snack, 180, 25.0, 9.0, 3.0),
    ];
    for (name, meal_type, calories, protein, carbs, fat) in foods {
        db.create_food(&Food {
            id: Uuid::new_v4(),
            name: name.to_owned(),
            description: None,
            image_url: None,
            meal_type,
            calories,
            protein_g: protein,
            carbs_g: carbs,
            fat_g: fat,
            recipe: None,
            active: true,
            created_at: now,
            updated_at: now,
        })
        .await?;
    }

    info!("Catalog seeded");
    Ok((category_id("Cardio"), category_id("Strength")))
}

async fn seed_profile(db: &Database, client: &User, trainer: &User) -> Result<()> {
    let now = Utc::now();
    db.create_profile(&HealthProfile {
        id: Uuid::new_v4(),
        user_id: client.id,
        height_cm: 175.0,
        weight_kg: 72.0,
        age: 28,
        goal: Goal::LoseWeight,
        target_weight_kg: Some(68.0),
        expert_id: Some(trainer.id),
        active: true,
        created_at: now,
        updated_at: now,
    })
    .await?;
    info!("Profile for {} connected to {}", client.username, trainer.username);
    Ok(())
}

async fn seed_template_plans(
    db: &Database,
    trainer: &User,
    nutritionist: &User,
    cardio_category: Uuid,
    strength_category: Uuid,
) -> Result<()> {
    let now = Utc::now();
    let today = now.date_naive();
    let end = today
        .checked_add_days(Days::new(28))
        .unwrap_or(today);

    let workout_template = WorkoutPlan {
        id: Uuid::new_v4(),
        user_id: trainer.id,
        name: "Fat-loss starter".to_owned(),
        goal: Goal::LoseWeight,
        description: Some("Three cardio-focused days a week".to_owned()),
        start_date: today,
        end_date: end,
        created_by: Some(trainer.id),
        active: true,
        created_at: now,
        updated_at: now,
    };
    db.create_workout_plan(&workout_template).await?;

    let cardio_exercises = db
        .list_exercises(&vitatrack_server::database::ExerciseFilter {
            category_id: Some(cardio_category),
            ..Default::default()
        })
        .await?;
    let strength_exercises = db
        .list_exercises(&vitatrack_server::database::ExerciseFilter {
            category_id: Some(strength_category),
            ..Default::default()
        })
        .await?;

    for (exercise, weekday) in cardio_exercises
        .iter()
        .chain(strength_exercises.iter().take(1))
        .zip([Weekday::Monday, Weekday::Wednesday, Weekday::Friday])
    {
        db.add_workout_entry(&WorkoutScheduleEntry {
            id: Uuid::new_v4(),
            plan_id: workout_template.id,
            exercise_id: exercise.id,
            weekday,
            sets: 3,
            reps: 12,
            notes: None,
            created_at: now,
            updated_at: now,
        })
        .await?;
    }

    let nutrition_template = NutritionPlan {
        id: Uuid::new_v4(),
        user_id: nutritionist.id,
        name: "Light week".to_owned(),
        goal: Goal::LoseWeight,
        description: Some("Calorie-controlled base plan".to_owned()),
        daily_calories: 1800,
        start_date: today,
        end_date: end,
        created_by: Some(nutritionist.id),
        active: true,
        created_at: now,
        updated_at: now,
    };
    db.create_nutrition_plan(&nutrition_template).await?;

    let foods = db
        .list_foods_below_calories(300, 3)
        .await?;
    for (food, weekday) in foods
        .iter()
        .zip([Weekday::Monday, Weekday::Tuesday, Weekday::Thursday])
    {
        db.add_meal_entry(&MealScheduleEntry {
            id: Uuid::new_v4(),
            plan_id: nutrition_template.id,
            food_id: food.id,
            weekday,
            portion: 1.0,
            notes: None,
            created_at: now,
            updated_at: now,
        })
        .await?;
    }

    info!("Template plans seeded");
    Ok(())
}
