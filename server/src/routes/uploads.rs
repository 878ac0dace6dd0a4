//! Multipart file upload, recorded in the ledger as a file message.

use crate::error::{ApiError, ApiResult};
use crate::routes::accounts::bad_multipart;
use crate::state::AppState;
use axum::extract::{Multipart, State};
use axum::routing::post;
use axum::{Json, Router};
use palaver_store::{ConversationId, LedgerRecord};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/upload", post(upload))
}

/// Multipart form with `conversationId`, `fromUsername`, `toUsername`
/// fields and a `file` part. The payload lands in the conversation's
/// attachment directory under a generated name; the resulting file
/// message carries the tree-relative path.
async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> ApiResult<Json<LedgerRecord>> {
    let mut conversation_id: Option<ConversationId> = None;
    let mut from_username: Option<String> = None;
    let mut to_username: Option<String> = None;
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "conversationId" => {
                let raw = field.text().await.map_err(bad_multipart)?;
                let id = raw.parse().map_err(|_| {
                    ApiError::BadRequest("conversationId must be a UUID".to_string())
                })?;
                conversation_id = Some(ConversationId(id));
            }
            "fromUsername" => {
                from_username = Some(field.text().await.map_err(bad_multipart)?);
            }
            "toUsername" => {
                to_username = Some(field.text().await.map_err(bad_multipart)?);
            }
            "file" => {
                let name = field.file_name().unwrap_or("upload").to_string();
                let bytes = field.bytes().await.map_err(bad_multipart)?;
                file = Some((name, bytes.to_vec()));
            }
            _ => {}
        }
    }

    let conversation_id = conversation_id
        .ok_or_else(|| ApiError::BadRequest("conversationId field required".to_string()))?;
    let from_username = from_username
        .ok_or_else(|| ApiError::BadRequest("fromUsername field required".to_string()))?;
    let to_username = to_username
        .ok_or_else(|| ApiError::BadRequest("toUsername field required".to_string()))?;

    let stored = match file {
        Some((name, bytes)) => Some(state.attachments().store_conversation_file(
            Some(&conversation_id),
            &name,
            &bytes,
        )?),
        None => None,
    };

    // Registry before ledger, matching the lock order documented on
    // AppState.
    let registry = state.registry().lock().await;
    let ledger = state.ledger().lock().await;
    let message = ledger.post_file_message(
        &registry,
        &conversation_id,
        &from_username,
        &to_username,
        stored.as_ref(),
    )?;
    Ok(Json(LedgerRecord::File(message)))
}
