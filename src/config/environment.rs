// ABOUTME: Environment-variable based server configuration
// ABOUTME: HTTP port, database URL, auth settings, and CORS origin
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaTrack

use std::env;

use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};

/// Server configuration resolved from the environment at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP API port
    pub http_port: u16,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Authentication configuration
    pub auth: AuthConfig,
    /// Allowed CORS origin ("*" during development)
    pub cors_origin: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database URL (e.g. `sqlite:data/vitatrack.db`)
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// JWT signing secret; generated per process when not configured
    pub jwt_secret: Option<String>,
    /// JWT expiry time in hours
    pub jwt_expiry_hours: i64,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` when a variable is present but malformed
    pub fn from_env() -> AppResult<Self> {
        let http_port = match env::var("HTTP_PORT") {
            Ok(value) => value
                .parse()
                .map_err(|e| AppError::config(format!("Invalid HTTP_PORT: {e}")))?,
            Err(_) => 8080,
        };

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:data/vitatrack.db".into());

        let jwt_expiry_hours = match env::var("JWT_EXPIRY_HOURS") {
            Ok(value) => value
                .parse()
                .map_err(|e| AppError::config(format!("Invalid JWT_EXPIRY_HOURS: {e}")))?,
            Err(_) => 24,
        };

        Ok(Self {
            http_port,
            database: DatabaseConfig { url: database_url },
            auth: AuthConfig {
                jwt_secret: env::var("JWT_SECRET").ok(),
                jwt_expiry_hours,
            },
            cors_origin: env::var("CORS_ORIGIN").unwrap_or_else(|_| "*".into()),
        })
    }

    /// One-line summary for startup logging
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "port={} database={} jwt_expiry={}h cors={}",
            self.http_port, self.database.url, self.auth.jwt_expiry_hours, self.cors_origin
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_env() {
        // Environment variables are unset in the test runner by default
        let config = ServerConfig::from_env().unwrap();
        assert!(config.http_port > 0);
        assert!(config.database.url.starts_with("sqlite:"));
        assert!(config.auth.jwt_expiry_hours > 0);
        assert!(config.summary().contains("port="));
    }
}
