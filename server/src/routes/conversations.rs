//! Conversation lifecycle, message posting, and retrieval endpoints.

use crate::error::ApiResult;
use crate::state::AppState;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use palaver_store::{ConversationId, LedgerRecord, UserConversations, UserId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostMessageRequest {
    pub from_username: String,
    pub conversation_id: ConversationId,
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewChatRequest {
    pub conversation_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewChatResponse {
    pub conversation_id: ConversationId,
    pub conversation_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFriendChatRequest {
    pub from_user_id: UserId,
    pub to_user_id: UserId,
    #[serde(default)]
    pub initial_message: Option<String>,
    #[serde(default)]
    pub conversation_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteChatRequest {
    pub conversation_id: ConversationId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagesQuery {
    pub conversation_id: ConversationId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserChatsQuery {
    pub user_id: UserId,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/message", post(post_message))
        .route("/new-chat", post(new_chat))
        .route("/create-friend-chat", post(create_friend_chat))
        .route("/delete-chat", delete(delete_chat))
        .route("/messages", get(conversation_messages))
        .route("/user-chats", get(user_chats))
}

async fn post_message(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PostMessageRequest>,
) -> ApiResult<Json<LedgerRecord>> {
    let ledger = state.ledger().lock().await;
    let message = ledger.post_message(&body.from_username, &body.conversation_id, &body.message)?;
    Ok(Json(LedgerRecord::Message(message)))
}

async fn new_chat(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewChatRequest>,
) -> ApiResult<Json<NewChatResponse>> {
    let ledger = state.ledger().lock().await;
    let descriptor = ledger.create_broadcast_chat(&body.conversation_name)?;
    Ok(Json(NewChatResponse {
        conversation_id: descriptor.id,
        conversation_name: descriptor.conversation_name,
    }))
}

async fn create_friend_chat(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewFriendChatRequest>,
) -> ApiResult<Json<LedgerRecord>> {
    let ledger = state.ledger().lock().await;
    let descriptor = ledger.create_friend_chat(
        &body.from_user_id,
        &body.to_user_id,
        body.initial_message.as_deref(),
        body.conversation_name.as_deref(),
    )?;
    Ok(Json(LedgerRecord::FriendChat(descriptor)))
}

async fn delete_chat(
    State(state): State<Arc<AppState>>,
    Json(body): Json<DeleteChatRequest>,
) -> ApiResult<StatusCode> {
    let ledger = state.ledger().lock().await;
    ledger.delete_conversation(&body.conversation_id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn conversation_messages(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MessagesQuery>,
) -> ApiResult<Json<Vec<LedgerRecord>>> {
    let ledger = state.ledger().lock().await;
    let records = ledger.conversation_messages(&query.conversation_id)?;
    Ok(Json(records))
}

async fn user_chats(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserChatsQuery>,
) -> ApiResult<Json<UserConversations>> {
    let ledger = state.ledger().lock().await;
    let conversations = ledger.user_conversations(&query.user_id)?;
    Ok(Json(conversations))
}
