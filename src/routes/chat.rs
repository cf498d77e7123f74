// ABOUTME: Chat route handlers for user-specialist messaging
// ABOUTME: Room listing, get-or-create on first contact, messages, and send
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaTrack

//! Chat routes.
//!
//! One room exists per (user, expert) pair; starting a chat with the same
//! expert twice returns the existing room. Reading a room's messages marks
//! the other party's messages as read.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{ChatMessage, ChatRoom, User};
use crate::resources::ServerResources;
use crate::routes::authenticate;

/// Room listing entry with the unread count for the caller
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatRoomResponse {
    pub id: String,
    pub user_id: String,
    pub expert_id: String,
    /// The participant who is not the caller
    pub partner_id: String,
    pub last_message: Option<String>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub unread_count: i64,
}

/// Message view
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatMessageResponse {
    pub id: String,
    pub sender_id: String,
    pub content: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl ChatMessageResponse {
    fn from_message(message: &ChatMessage) -> Self {
        Self {
            id: message.id.to_string(),
            sender_id: message.sender_id.to_string(),
            content: message.content.clone(),
            is_read: message.is_read,
            created_at: message.created_at,
        }
    }
}

/// Send a message
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
}

/// Chat routes handler
pub struct ChatRoutes;

impl ChatRoutes {
    /// Create all chat routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/chat-rooms", get(Self::list_rooms))
            .route("/api/chat-rooms/start/:expert_id", post(Self::start_chat))
            .route("/api/chat-rooms/:room_id/messages", get(Self::list_messages))
            .route("/api/chat-rooms/:room_id/send", post(Self::send_message))
            .with_state(resources)
    }

    async fn room_response(
        resources: &Arc<ServerResources>,
        room: &ChatRoom,
        caller: &User,
    ) -> Result<ChatRoomResponse, AppError> {
        let unread_count = resources
            .database
            .count_unread_messages(room.id, caller.id)
            .await?;

        Ok(ChatRoomResponse {
            id: room.id.to_string(),
            user_id: room.user_id.to_string(),
            expert_id: room.expert_id.to_string(),
            partner_id: room.other_participant(caller.id).to_string(),
            last_message: room.last_message.clone(),
            last_message_at: room.last_message_at,
            unread_count,
        })
    }

    /// Load a room the caller participates in
    async fn load_room(
        resources: &Arc<ServerResources>,
        caller: &User,
        room_id: Uuid,
    ) -> Result<ChatRoom, AppError> {
        resources
            .database
            .get_chat_room(room_id)
            .await?
            .filter(|room| room.has_participant(caller.id))
            .ok_or_else(|| AppError::not_found("Chat room"))
    }

    /// The caller's rooms, most recent conversation first
    async fn list_rooms(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let caller = authenticate(&headers, &resources).await?;

        let rooms = resources.database.list_chat_rooms(caller.id).await?;
        let mut response = Vec::with_capacity(rooms.len());
        for room in &rooms {
            response.push(Self::room_response(&resources, room, &caller).await?);
        }

        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Open (or return) the room with the given specialist
    async fn start_chat(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(expert_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let caller = authenticate(&headers, &resources).await?;

        let expert = resources
            .database
            .get_user(expert_id)
            .await?
            .filter(|u| u.active && u.role.is_specialist())
            .ok_or_else(|| AppError::not_found("Expert"))?;

        if expert.id == caller.id {
            return Err(AppError::invalid_input("cannot start a chat with yourself"));
        }

        let room = resources
            .database
            .get_or_create_chat_room(caller.id, expert.id)
            .await?;

        let response = Self::room_response(&resources, &room, &caller).await?;
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Messages in a room, oldest first; marks the other party's messages
    /// read for the caller
    async fn list_messages(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(room_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let caller = authenticate(&headers, &resources).await?;
        let room = Self::load_room(&resources, &caller, room_id).await?;

        resources
            .database
            .mark_chat_messages_read(room.id, caller.id)
            .await?;

        let messages = resources.database.list_chat_messages(room.id).await?;
        let response: Vec<ChatMessageResponse> = messages
            .iter()
            .map(ChatMessageResponse::from_message)
            .collect();
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Send a message into a room the caller participates in
    async fn send_message(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(room_id): Path<Uuid>,
        Json(request): Json<SendMessageRequest>,
    ) -> Result<Response, AppError> {
        let caller = authenticate(&headers, &resources).await?;
        let room = Self::load_room(&resources, &caller, room_id).await?;

        if request.content.trim().is_empty() {
            return Err(AppError::invalid_input("message must not be empty"));
        }

        let message = resources
            .database
            .add_chat_message(room.id, caller.id, request.content.trim())
            .await?;

        Ok((
            StatusCode::CREATED,
            Json(ChatMessageResponse::from_message(&message)),
        )
            .into_response())
    }
}
