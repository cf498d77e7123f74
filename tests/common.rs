// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides common database, auth, and fixture creation helpers
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright (c) 2025 VitaTrack

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used, clippy::panic)]

//! Shared test utilities for `vitatrack-server`
//!
//! Common setup functions to reduce duplication across integration tests.

use std::sync::{Arc, Once};

use chrono::Utc;
use uuid::Uuid;

use vitatrack_server::{
    auth::{generate_jwt_secret, hash_password, AuthManager},
    config::environment::ServerConfig,
    database::Database,
    models::{
        Difficulty, Exercise, ExerciseCategory, Food, Goal, HealthProfile, MealType, User,
        UserRole,
    },
    resources::ServerResources,
    routes,
};

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Standard test resources over an in-memory database
pub async fn create_test_resources() -> Arc<ServerResources> {
    init_test_logging();
    let database = Database::new("sqlite::memory:").await.unwrap();
    let auth_manager = AuthManager::new(&generate_jwt_secret(), 24);
    let config = ServerConfig::from_env().unwrap();
    Arc::new(ServerResources::new(database, auth_manager, config))
}

/// The full application router for end-to-end route tests
pub fn test_router(resources: &Arc<ServerResources>) -> axum::Router {
    routes::router(resources)
}

/// Create a user with the given role; returns the user and a bearer header
pub async fn create_user_with_role(
    resources: &Arc<ServerResources>,
    username: &str,
    role: UserRole,
) -> (User, String) {
    let mut user = User::new(username.to_owned(), hash_password("password123").unwrap());
    user.role = role;
    resources.database.create_user(&user).await.unwrap();

    let (token, _) = resources.auth_manager.generate_token(&user).unwrap();
    (user, format!("Bearer {token}"))
}

/// Create a plain user; returns the user and a bearer header
pub async fn create_test_user(
    resources: &Arc<ServerResources>,
    username: &str,
) -> (User, String) {
    create_user_with_role(resources, username, UserRole::User).await
}

/// Create a health profile for a user, optionally connected to an expert
pub async fn create_profile_for(
    resources: &Arc<ServerResources>,
    user: &User,
    goal: Goal,
    expert_id: Option<Uuid>,
) -> HealthProfile {
    let now = Utc::now();
    let profile = HealthProfile {
        id: Uuid::new_v4(),
        user_id: user.id,
        height_cm: 175.0,
        weight_kg: 72.0,
        age: 28,
        goal,
        target_weight_kg: None,
        expert_id,
        active: true,
        created_at: now,
        updated_at: now,
    };
    resources.database.create_profile(&profile).await.unwrap();
    profile
}

/// Seed an exercise category and return it
pub async fn seed_category(resources: &Arc<ServerResources>, name: &str) -> ExerciseCategory {
    let category = ExerciseCategory {
        id: Uuid::new_v4(),
        name: name.to_owned(),
        description: None,
    };
    resources
        .database
        .create_exercise_category(&category)
        .await
        .unwrap();
    category
}

/// Seed an exercise in a category and return it
pub async fn seed_exercise(
    resources: &Arc<ServerResources>,
    name: &str,
    category_id: Uuid,
) -> Exercise {
    let now = Utc::now();
    let exercise = Exercise {
        id: Uuid::new_v4(),
        name: name.to_owned(),
        description: format!("{name} description"),
        category_id,
        category_name: String::new(),
        difficulty: Difficulty::Medium,
        duration_minutes: 30,
        calories_burned: 200,
        image_url: None,
        video_url: None,
        instructions: "Form first".to_owned(),
        active: true,
        created_at: now,
        updated_at: now,
    };
    resources.database.create_exercise(&exercise).await.unwrap();
    exercise
}

/// Seed a food and return it
pub async fn seed_food(
    resources: &Arc<ServerResources>,
    name: &str,
    calories: i64,
    protein_g: f64,
) -> Food {
    let now = Utc::now();
    let food = Food {
        id: Uuid::new_v4(),
        name: name.to_owned(),
        description: None,
        image_url: None,
        meal_type: MealType::Lunch,
        calories,
        protein_g,
        carbs_g: 15.0,
        fat_g: 8.0,
        recipe: None,
        active: true,
        created_at: now,
        updated_at: now,
    };
    resources.database.create_food(&food).await.unwrap();
    food
}
