// ABOUTME: Database operations for chat rooms and messages
// ABOUTME: One room per (user, expert) pair with read tracking for the recipient
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaTrack

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::{parse_uuid, Database};
use crate::errors::{AppError, AppResult};
use crate::models::{ChatMessage, ChatRoom};

fn map_room_row(row: &SqliteRow) -> AppResult<ChatRoom> {
    Ok(ChatRoom {
        id: parse_uuid(&row.get::<String, _>("id"), "chat_rooms.id")?,
        user_id: parse_uuid(&row.get::<String, _>("user_id"), "chat_rooms.user_id")?,
        expert_id: parse_uuid(&row.get::<String, _>("expert_id"), "chat_rooms.expert_id")?,
        last_message: row.get("last_message"),
        last_message_at: row.get("last_message_at"),
        active: row.get("active"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

fn map_message_row(row: &SqliteRow) -> AppResult<ChatMessage> {
    Ok(ChatMessage {
        id: parse_uuid(&row.get::<String, _>("id"), "chat_messages.id")?,
        room_id: parse_uuid(&row.get::<String, _>("room_id"), "chat_messages.room_id")?,
        sender_id: parse_uuid(&row.get::<String, _>("sender_id"), "chat_messages.sender_id")?,
        content: row.get("content"),
        is_read: row.get("is_read"),
        created_at: row.get("created_at"),
    })
}

const ROOM_COLUMNS: &str = "id, user_id, expert_id, last_message, last_message_at, active, \
                            created_at, updated_at";

impl Database {
    /// Create the chat tables
    pub(super) async fn migrate_chat(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS chat_rooms (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                expert_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                last_message TEXT,
                last_message_at TEXT,
                active BOOLEAN NOT NULL DEFAULT true,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE (user_id, expert_id)
            )
            ",
        )
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to create chat_rooms table: {e}")))?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS chat_messages (
                id TEXT PRIMARY KEY,
                room_id TEXT NOT NULL REFERENCES chat_rooms(id) ON DELETE CASCADE,
                sender_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                content TEXT NOT NULL,
                is_read BOOLEAN NOT NULL DEFAULT false,
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to create chat_messages table: {e}")))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_chat_messages_room ON chat_messages(room_id)")
            .execute(self.pool())
            .await
            .map_err(|e| AppError::database(format!("Failed to index chat_messages: {e}")))?;

        Ok(())
    }

    /// Get the room for a (user, expert) pair, creating it on first contact.
    /// The UNIQUE constraint makes this a get-or-create.
    pub async fn get_or_create_chat_room(
        &self,
        user_id: Uuid,
        expert_id: Uuid,
    ) -> AppResult<ChatRoom> {
        if let Some(existing) = self.find_chat_room(user_id, expert_id).await? {
            return Ok(existing);
        }

        let now = Utc::now();
        let room = ChatRoom {
            id: Uuid::new_v4(),
            user_id,
            expert_id,
            last_message: None,
            last_message_at: None,
            active: true,
            created_at: now,
            updated_at: now,
        };

        let inserted = sqlx::query(
            r"
            INSERT INTO chat_rooms (id, user_id, expert_id, last_message, last_message_at,
                                    active, created_at, updated_at)
            VALUES ($1, $2, $3, NULL, NULL, $4, $5, $6)
            ",
        )
        .bind(room.id.to_string())
        .bind(room.user_id.to_string())
        .bind(room.expert_id.to_string())
        .bind(room.active)
        .bind(room.created_at)
        .bind(room.updated_at)
        .execute(self.pool())
        .await;

        match inserted {
            Ok(_) => Ok(room),
            Err(e) if super::is_unique_violation(&e) => self
                .find_chat_room(user_id, expert_id)
                .await?
                .ok_or_else(|| AppError::internal("Chat room vanished after conflict")),
            Err(e) => Err(AppError::database(format!("Failed to create chat room: {e}"))),
        }
    }

    /// Find the room for a (user, expert) pair
    pub async fn find_chat_room(
        &self,
        user_id: Uuid,
        expert_id: Uuid,
    ) -> AppResult<Option<ChatRoom>> {
        let row = sqlx::query(&format!(
            "SELECT {ROOM_COLUMNS} FROM chat_rooms WHERE user_id = $1 AND expert_id = $2"
        ))
        .bind(user_id.to_string())
        .bind(expert_id.to_string())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to find chat room: {e}")))?;

        row.as_ref().map(map_room_row).transpose()
    }

    /// Get a room by ID
    pub async fn get_chat_room(&self, room_id: Uuid) -> AppResult<Option<ChatRoom>> {
        let row = sqlx::query(&format!(
            "SELECT {ROOM_COLUMNS} FROM chat_rooms WHERE id = $1 AND active = true"
        ))
        .bind(room_id.to_string())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to get chat room: {e}")))?;

        row.as_ref().map(map_room_row).transpose()
    }

    /// List rooms where the given user participates, most recent talk first
    pub async fn list_chat_rooms(&self, participant_id: Uuid) -> AppResult<Vec<ChatRoom>> {
        let rows = sqlx::query(&format!(
            "SELECT {ROOM_COLUMNS} FROM chat_rooms
             WHERE (user_id = $1 OR expert_id = $1) AND active = true
             ORDER BY last_message_at IS NULL, last_message_at DESC"
        ))
        .bind(participant_id.to_string())
        .fetch_all(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to list chat rooms: {e}")))?;

        rows.iter().map(map_room_row).collect()
    }

    /// Messages in a room, oldest first
    pub async fn list_chat_messages(&self, room_id: Uuid) -> AppResult<Vec<ChatMessage>> {
        let rows = sqlx::query(
            "SELECT id, room_id, sender_id, content, is_read, created_at
             FROM chat_messages
             WHERE room_id = $1
             ORDER BY created_at ASC",
        )
        .bind(room_id.to_string())
        .fetch_all(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to list chat messages: {e}")))?;

        rows.iter().map(map_message_row).collect()
    }

    /// Mark messages from the other participant as read
    pub async fn mark_chat_messages_read(&self, room_id: Uuid, reader_id: Uuid) -> AppResult<()> {
        sqlx::query(
            "UPDATE chat_messages SET is_read = true
             WHERE room_id = $1 AND sender_id != $2 AND is_read = false",
        )
        .bind(room_id.to_string())
        .bind(reader_id.to_string())
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to mark messages read: {e}")))?;

        Ok(())
    }

    /// Count messages in a room still unread by the given participant
    pub async fn count_unread_messages(&self, room_id: Uuid, reader_id: Uuid) -> AppResult<i64> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS n FROM chat_messages
             WHERE room_id = $1 AND sender_id != $2 AND is_read = false",
        )
        .bind(room_id.to_string())
        .bind(reader_id.to_string())
        .fetch_one(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to count unread messages: {e}")))?;

        Ok(row.get("n"))
    }

    /// Append a message and refresh the room's denormalized preview
    pub async fn add_chat_message(
        &self,
        room_id: Uuid,
        sender_id: Uuid,
        content: &str,
    ) -> AppResult<ChatMessage> {
        let now = Utc::now();
        let message = ChatMessage {
            id: Uuid::new_v4(),
            room_id,
            sender_id,
            content: content.to_owned(),
            is_read: false,
            created_at: now,
        };

        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        sqlx::query(
            r"
            INSERT INTO chat_messages (id, room_id, sender_id, content, is_read, created_at)
            VALUES ($1, $2, $3, $4, false, $5)
            ",
        )
        .bind(message.id.to_string())
        .bind(message.room_id.to_string())
        .bind(message.sender_id.to_string())
        .bind(&message.content)
        .bind(message.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to send message: {e}")))?;

        sqlx::query(
            r"
            UPDATE chat_rooms
            SET last_message = $1, last_message_at = $2, updated_at = $2
            WHERE id = $3
            ",
        )
        .bind(&message.content)
        .bind(message.created_at)
        .bind(room_id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to update chat room: {e}")))?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit message: {e}")))?;

        Ok(message)
    }
}
