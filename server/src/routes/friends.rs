//! Friendship endpoints: request (auto-accepted) and listing.

use crate::error::ApiResult;
use crate::state::AppState;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use palaver_store::FriendView;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequestBody {
    pub from_username: String,
    pub to_username: String,
}

#[derive(Debug, Deserialize)]
pub struct FriendsQuery {
    pub username: String,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/friend-request", post(send_friend_request))
        .route("/friends", get(list_friends))
}

async fn send_friend_request(
    State(state): State<Arc<AppState>>,
    Json(body): Json<FriendRequestBody>,
) -> ApiResult<StatusCode> {
    let registry = state.registry().lock().await;
    registry.send_friend_request(&body.from_username, &body.to_username)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_friends(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FriendsQuery>,
) -> ApiResult<Json<Vec<FriendView>>> {
    let registry = state.registry().lock().await;
    let friends = registry.list_friends(&query.username)?;
    Ok(Json(friends))
}
