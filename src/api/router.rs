// Router assembly

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use super::{handlers, AppState};

/// Build the API router. Uploads are served back under `/videos`.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let body_limit = state.config.max_upload_bytes;
    let uploads = ServeDir::new(state.config.uploads_dir());

    Router::new()
        .route("/", get(handlers::root))
        .route("/upload-video", post(handlers::upload_video))
        .route("/search", get(handlers::search))
        .nest_service("/videos", uploads)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .with_state(state)
}
