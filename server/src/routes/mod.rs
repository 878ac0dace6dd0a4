pub mod accounts;
pub mod conversations;
pub mod friends;
pub mod health;
pub mod uploads;

use crate::state::AppState;
use axum::Router;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Assemble the application router: the operation endpoints plus static
/// serving for the public assets and both attachment trees.
pub fn router(state: Arc<AppState>) -> Router {
    let config = state.config();
    let public = ServeDir::new(&config.public_dir);
    let upload_files = ServeDir::new(&config.uploads_dir);
    let user_images = ServeDir::new(&config.user_images_dir);

    Router::new()
        .merge(health::routes())
        .merge(accounts::routes())
        .merge(friends::routes())
        .merge(conversations::routes())
        .merge(uploads::routes())
        .nest_service("/uploads", upload_files)
        .nest_service("/user-images", user_images)
        .fallback_service(public)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
