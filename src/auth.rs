// ABOUTME: JWT-based user authentication and password hashing
// ABOUTME: Token generation, validation, and bcrypt credential checks
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright (c) 2025 VitaTrack

//! # Authentication
//!
//! JWT bearer tokens signed with a server secret, plus bcrypt password
//! hashing for the registration/login flow. Session identity itself is the
//! concern of an external identity provider in larger deployments; this
//! module is the self-contained scheme the server ships with.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::User;

/// `JWT` claims for user authentication
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    /// Username for logging context
    pub username: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

/// Token manager: issues and validates bearer tokens
#[derive(Clone)]
pub struct AuthManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry_hours: i64,
}

impl AuthManager {
    /// Create a new auth manager from the server secret
    #[must_use]
    pub fn new(jwt_secret: &[u8], expiry_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(jwt_secret),
            decoding_key: DecodingKey::from_secret(jwt_secret),
            expiry_hours,
        }
    }

    /// Generate a token for the user; returns the token and its expiry
    ///
    /// # Errors
    ///
    /// Returns an error if token signing fails
    pub fn generate_token(&self, user: &User) -> AppResult<(String, DateTime<Utc>)> {
        let now = Utc::now();
        let expires_at = now + Duration::hours(self.expiry_hours);

        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to sign token: {e}")))?;

        Ok((token, expires_at))
    }

    /// Validate a token and return the authenticated user ID
    ///
    /// # Errors
    ///
    /// Returns `AuthInvalid` for expired, malformed, or mis-signed tokens
    pub fn validate_token(&self, token: &str) -> AppResult<Uuid> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| AppError::auth_invalid(format!("Invalid token: {e}")))?;

        Uuid::parse_str(&data.claims.sub)
            .map_err(|e| AppError::auth_invalid(format!("Invalid token subject: {e}")))
    }
}

/// Hash a password for storage
///
/// # Errors
///
/// Returns an error if hashing fails
pub fn hash_password(password: &str) -> AppResult<String> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))
}

/// Check a password against the stored hash
///
/// # Errors
///
/// Returns an error if the hash is malformed
pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    bcrypt::verify(password, hash)
        .map_err(|e| AppError::internal(format!("Failed to verify password: {e}")))
}

/// Generate a random JWT secret (64 bytes)
#[must_use]
pub fn generate_jwt_secret() -> [u8; 64] {
    let mut secret = [0u8; 64];
    rand::thread_rng().fill(&mut secret);
    secret
}
