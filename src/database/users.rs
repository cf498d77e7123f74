// ABOUTME: Database operations for user accounts
// ABOUTME: Registration, lookup, profile-field updates, and the expert directory
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaTrack

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::{is_unique_violation, parse_uuid, Database};
use crate::errors::{AppError, AppResult};
use crate::models::{User, UserRole};

fn map_user_row(row: &SqliteRow) -> AppResult<User> {
    Ok(User {
        id: parse_uuid(&row.get::<String, _>("id"), "users.id")?,
        username: row.get("username"),
        password_hash: row.get("password_hash"),
        email: row.get("email"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        phone: row.get("phone"),
        avatar_url: row.get("avatar_url"),
        role: row.get::<String, _>("role").parse()?,
        active: row.get("active"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

const USER_COLUMNS: &str = "id, username, password_hash, email, first_name, last_name, \
                            phone, avatar_url, role, active, created_at, updated_at";

impl Database {
    /// Create the users table
    pub(super) async fn migrate_users(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                email TEXT,
                first_name TEXT,
                last_name TEXT,
                phone TEXT,
                avatar_url TEXT,
                role TEXT NOT NULL DEFAULT 'user',
                active BOOLEAN NOT NULL DEFAULT true,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to create users table: {e}")))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_role ON users(role)")
            .execute(self.pool())
            .await
            .map_err(|e| AppError::database(format!("Failed to index users: {e}")))?;

        Ok(())
    }

    /// Insert a new user
    ///
    /// # Errors
    ///
    /// Returns `Conflict` when the username is already taken
    pub async fn create_user(&self, user: &User) -> AppResult<Uuid> {
        sqlx::query(
            r"
            INSERT INTO users (id, username, password_hash, email, first_name, last_name,
                               phone, avatar_url, role, active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ",
        )
        .bind(user.id.to_string())
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.phone)
        .bind(&user.avatar_url)
        .bind(user.role.as_str())
        .bind(user.active)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(self.pool())
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::conflict(format!("Username '{}' is already taken", user.username))
            } else {
                AppError::database(format!("Failed to create user: {e}"))
            }
        })?;

        Ok(user.id)
    }

    /// Get a user by ID
    pub async fn get_user(&self, user_id: Uuid) -> AppResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(user_id.to_string())
            .fetch_optional(self.pool())
            .await
            .map_err(|e| AppError::database(format!("Failed to get user: {e}")))?;

        row.as_ref().map(map_user_row).transpose()
    }

    /// Get a user by username (login)
    pub async fn get_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to get user: {e}")))?;

        row.as_ref().map(map_user_row).transpose()
    }

    /// Update the mutable account fields (names and email)
    pub async fn update_user_details(
        &self,
        user_id: Uuid,
        first_name: Option<&str>,
        last_name: Option<&str>,
        email: Option<&str>,
    ) -> AppResult<()> {
        sqlx::query(
            r"
            UPDATE users
            SET first_name = COALESCE($1, first_name),
                last_name = COALESCE($2, last_name),
                email = COALESCE($3, email),
                updated_at = $4
            WHERE id = $5
            ",
        )
        .bind(first_name)
        .bind(last_name)
        .bind(email)
        .bind(Utc::now())
        .bind(user_id.to_string())
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to update user: {e}")))?;

        Ok(())
    }

    /// List specialist accounts, optionally restricted to one role
    pub async fn list_experts(&self, role: Option<UserRole>) -> AppResult<Vec<User>> {
        let rows = match role {
            Some(role) => {
                sqlx::query(&format!(
                    "SELECT {USER_COLUMNS} FROM users
                     WHERE role = $1 AND active = true
                     ORDER BY username"
                ))
                .bind(role.as_str())
                .fetch_all(self.pool())
                .await
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {USER_COLUMNS} FROM users
                     WHERE role IN ('nutritionist', 'trainer') AND active = true
                     ORDER BY username"
                ))
                .fetch_all(self.pool())
                .await
            }
        }
        .map_err(|e| AppError::database(format!("Failed to list experts: {e}")))?;

        rows.iter().map(map_user_row).collect()
    }
}
