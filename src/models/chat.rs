// ABOUTME: Chat rooms between users and their specialists, plus messages
// ABOUTME: One room per (user, expert) pair; messages ordered by creation time
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaTrack

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A chat room. Unique on (user, expert); carries a denormalized preview of
/// the most recent message for room listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRoom {
    pub id: Uuid,
    pub user_id: Uuid,
    pub expert_id: Uuid,
    pub last_message: Option<String>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChatRoom {
    /// Whether the given user is one of the two participants
    #[must_use]
    pub fn has_participant(&self, user_id: Uuid) -> bool {
        self.user_id == user_id || self.expert_id == user_id
    }

    /// The participant other than the given one
    #[must_use]
    pub fn other_participant(&self, user_id: Uuid) -> Uuid {
        if self.user_id == user_id {
            self.expert_id
        } else {
            self.user_id
        }
    }
}

/// A message in a chat room. The read flag is meaningful to the non-sender.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub room_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}
