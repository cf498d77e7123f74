// ABOUTME: Main library entry point for the VitaTrack health tracking backend
// ABOUTME: Exposes the domain model, persistence layer, and REST API routes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaTrack

#![deny(unsafe_code)]

//! # VitaTrack Server
//!
//! A health and fitness tracking backend: user accounts, health profiles,
//! workout and nutrition plans with weekly schedules, daily tracking,
//! progress logs, consultations with specialists, reminders, journals, and
//! user-to-specialist chat.
//!
//! ## Architecture
//!
//! The server follows a modular architecture:
//! - **Models**: Typed domain entities and enums
//! - **Database**: SQLite persistence via `sqlx`, one query module per domain
//! - **Routes**: Axum REST handlers, one router per domain
//! - **Permissions**: Ownership and expert-connection visibility rules
//! - **Reports / Recommendations**: Derived aggregates and goal-based picks
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use vitatrack_server::config::environment::ServerConfig;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("VitaTrack configured for port {}", config.http_port);
//!     Ok(())
//! }
//! ```

// ── Public API ──────────────────────────────────────────────────────────
// These modules are used by the binaries (src/bin/) and integration tests
// (tests/). They must remain `pub` so external consumers can access them.

/// JWT authentication and password hashing
pub mod auth;

/// Configuration management
pub mod config;

/// Database management and per-domain query modules
pub mod database;

/// Unified error handling (`AppError`, `ErrorCode`, HTTP error responses)
pub mod errors;

/// Logging configuration and structured logging setup
pub mod logging;

/// Domain model types
pub mod models;

/// Ownership and expert-connection access rules
pub mod permissions;

/// Goal-based exercise and food recommendations
pub mod recommendations;

/// Derived tracking aggregates (weekly summary, progress chart series)
pub mod reports;

/// Shared server resources (`database`, auth manager, config)
pub mod resources;

/// `HTTP` route handlers
pub mod routes;

/// Router assembly and server lifecycle
pub mod server;
