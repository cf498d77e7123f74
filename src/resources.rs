// ABOUTME: Shared server resources handed to every route handler
// ABOUTME: Database, auth manager, and configuration behind Arcs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaTrack

use std::sync::Arc;

use crate::auth::AuthManager;
use crate::config::environment::ServerConfig;
use crate::database::Database;

/// Shared state for the HTTP layer
pub struct ServerResources {
    pub database: Arc<Database>,
    pub auth_manager: Arc<AuthManager>,
    pub config: Arc<ServerConfig>,
}

impl ServerResources {
    /// Create new server resources with proper Arc sharing
    #[must_use]
    pub fn new(database: Database, auth_manager: AuthManager, config: ServerConfig) -> Self {
        Self {
            database: Arc::new(database),
            auth_manager: Arc::new(auth_manager),
            config: Arc::new(config),
        }
    }
}
