// ABOUTME: VitaTrack server binary
// ABOUTME: Loads configuration, opens the database, and serves the REST API
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # VitaTrack Server Binary
//!
//! Starts the health-tracking REST API with JWT authentication and a
//! SQLite store.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use vitatrack_server::{
    auth::{generate_jwt_secret, AuthManager},
    config::environment::ServerConfig,
    database::Database,
    logging,
    resources::ServerResources,
    server::HttpServer,
};

#[derive(Parser)]
#[command(name = "vitatrack-server")]
#[command(about = "VitaTrack - health and fitness tracking backend")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override database URL
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration from environment, apply CLI overrides
    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(database_url) = args.database_url {
        config.database.url = database_url;
    }

    logging::init_from_env()?;

    info!("Starting VitaTrack server");
    info!("{}", config.summary());

    let database = Database::new(&config.database.url).await?;
    info!("Database ready: {}", config.database.url);

    // A configured secret keeps sessions valid across restarts; without
    // one, each process signs with a fresh random secret.
    let auth_manager = match config.auth.jwt_secret.as_deref() {
        Some(secret) => AuthManager::new(secret.as_bytes(), config.auth.jwt_expiry_hours),
        None => {
            info!("JWT_SECRET not set; using a process-local secret");
            AuthManager::new(&generate_jwt_secret(), config.auth.jwt_expiry_hours)
        }
    };

    let port = config.http_port;
    let resources = Arc::new(ServerResources::new(database, auth_manager, config));
    let server = HttpServer::new(resources);

    info!("Serving REST API on port {port}");
    if let Err(e) = server.run(port).await {
        error!("Server error: {e}");
        return Err(e);
    }

    Ok(())
}
