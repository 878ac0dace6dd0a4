//! Account endpoints: signup, login, password and profile image changes.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use palaver_store::{User, UserId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Public view of an account, stripped of the password and friend list.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub id: UserId,
    pub username: String,
}

impl From<User> for AccountResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub user_id: UserId,
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileImageResponse {
    pub profile_image: String,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/change-password", post(change_password))
        .route("/update-profile-image", post(update_profile_image))
}

async fn signup(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Credentials>,
) -> ApiResult<(StatusCode, Json<AccountResponse>)> {
    let registry = state.registry().lock().await;
    let user = registry.signup(&body.username, &body.password)?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Credentials>,
) -> ApiResult<Json<AccountResponse>> {
    let registry = state.registry().lock().await;
    let user = registry.login(&body.username, &body.password)?;
    Ok(Json(user.into()))
}

async fn change_password(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ChangePasswordRequest>,
) -> ApiResult<StatusCode> {
    let registry = state.registry().lock().await;
    registry.change_password(&body.user_id, &body.old_password, &body.new_password)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Multipart form with a `userId` field and a `profileImage` file. The
/// image is stored under the user's directory as `profile.<ext>` and the
/// account record is pointed at it.
async fn update_profile_image(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> ApiResult<Json<ProfileImageResponse>> {
    let mut user_id: Option<UserId> = None;
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "userId" => {
                let raw = field.text().await.map_err(bad_multipart)?;
                let id = raw
                    .parse()
                    .map_err(|_| ApiError::BadRequest("userId must be a UUID".to_string()))?;
                user_id = Some(UserId(id));
            }
            "profileImage" => {
                let name = field.file_name().unwrap_or("profile").to_string();
                let bytes = field.bytes().await.map_err(bad_multipart)?;
                file = Some((name, bytes.to_vec()));
            }
            _ => {}
        }
    }

    let user_id =
        user_id.ok_or_else(|| ApiError::BadRequest("userId field required".to_string()))?;
    let (name, bytes) =
        file.ok_or_else(|| ApiError::BadRequest("profileImage file required".to_string()))?;

    let stored = state
        .attachments()
        .store_profile_image(&user_id, &name, &bytes)?;
    let registry = state.registry().lock().await;
    let profile_image = registry.update_profile_image(&user_id, &stored.relative_path)?;
    Ok(Json(ProfileImageResponse { profile_image }))
}

pub(crate) fn bad_multipart(err: axum::extract::multipart::MultipartError) -> ApiError {
    ApiError::BadRequest(format!("invalid multipart payload: {err}"))
}
