// ABOUTME: Integration tests for chat routes
// ABOUTME: Room uniqueness, participant scoping, and read marking
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaTrack

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use axum::http::StatusCode;
use common::{create_test_resources, create_test_user, create_user_with_role, test_router};
use helpers::axum_test::AxumTestRequest;
use serde_json::json;
use vitatrack_server::models::UserRole;
use vitatrack_server::routes::chat::{ChatMessageResponse, ChatRoomResponse};

#[tokio::test]
async fn test_start_chat_is_get_or_create() {
    let resources = create_test_resources().await;
    let router = test_router(&resources);

    let (_, user_token) = create_test_user(&resources, "client").await;
    let (expert, _) = create_user_with_role(&resources, "coach", UserRole::Trainer).await;

    let first = AxumTestRequest::post(&format!("/api/chat-rooms/start/{}", expert.id))
        .header("authorization", &user_token)
        .send(router.clone())
        .await;
    assert_eq!(first.status_code(), StatusCode::OK);
    let room_a: ChatRoomResponse = first.json();

    let second = AxumTestRequest::post(&format!("/api/chat-rooms/start/{}", expert.id))
        .header("authorization", &user_token)
        .send(router.clone())
        .await;
    let room_b: ChatRoomResponse = second.json();
    assert_eq!(room_a.id, room_b.id);

    // Starting a chat with a plain user is refused
    let (plain, _) = create_test_user(&resources, "not_an_expert").await;
    let refused = AxumTestRequest::post(&format!("/api/chat-rooms/start/{}", plain.id))
        .header("authorization", &user_token)
        .send(router)
        .await;
    assert_eq!(refused.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_messages_flow_and_read_marking() {
    let resources = create_test_resources().await;
    let router = test_router(&resources);

    let (_, user_token) = create_test_user(&resources, "client").await;
    let (expert, expert_token) =
        create_user_with_role(&resources, "coach", UserRole::Trainer).await;

    let started = AxumTestRequest::post(&format!("/api/chat-rooms/start/{}", expert.id))
        .header("authorization", &user_token)
        .send(router.clone())
        .await;
    let room: ChatRoomResponse = started.json();

    let sent = AxumTestRequest::post(&format!("/api/chat-rooms/{}/send", room.id))
        .header("authorization", &user_token)
        .json(&json!({"content": "How is my plan looking?"}))
        .send(router.clone())
        .await;
    assert_eq!(sent.status_code(), StatusCode::CREATED);

    // The expert has one unread message in the room listing
    let rooms = AxumTestRequest::get("/api/chat-rooms")
        .header("authorization", &expert_token)
        .send(router.clone())
        .await;
    let listing: Vec<ChatRoomResponse> = rooms.json();
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0].unread_count, 1);
    assert_eq!(
        listing[0].last_message.as_deref(),
        Some("How is my plan looking?")
    );

    // Reading the messages marks them read for the expert
    let messages = AxumTestRequest::get(&format!("/api/chat-rooms/{}/messages", room.id))
        .header("authorization", &expert_token)
        .send(router.clone())
        .await;
    assert_eq!(messages.status_code(), StatusCode::OK);
    let list: Vec<ChatMessageResponse> = messages.json();
    assert_eq!(list.len(), 1);

    let rooms_after = AxumTestRequest::get("/api/chat-rooms")
        .header("authorization", &expert_token)
        .send(router.clone())
        .await;
    let listing: Vec<ChatRoomResponse> = rooms_after.json();
    assert_eq!(listing[0].unread_count, 0);

    // A third party can neither read nor post
    let (_, outsider_token) = create_test_user(&resources, "outsider").await;
    let hidden = AxumTestRequest::get(&format!("/api/chat-rooms/{}/messages", room.id))
        .header("authorization", &outsider_token)
        .send(router.clone())
        .await;
    assert_eq!(hidden.status_code(), StatusCode::NOT_FOUND);

    let denied = AxumTestRequest::post(&format!("/api/chat-rooms/{}/send", room.id))
        .header("authorization", &outsider_token)
        .json(&json!({"content": "let me in"}))
        .send(router)
        .await;
    assert_eq!(denied.status_code(), StatusCode::NOT_FOUND);
}
