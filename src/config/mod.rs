// ABOUTME: Configuration management for the VitaTrack server
// ABOUTME: Environment-driven settings resolved once at startup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaTrack

/// Environment-based server configuration
pub mod environment;
