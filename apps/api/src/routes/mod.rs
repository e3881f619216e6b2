pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::candidates::handlers;
use crate::state::AppState;
use crate::uploads::handlers::handle_upload;

/// Room for multipart framing on top of the file itself, so an oversize file
/// is caught by the upload handler rather than the body limit.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state
        .config
        .max_upload_bytes
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/candidates", post(handlers::handle_add_candidate))
        .route("/candidates/:id", get(handlers::handle_get_candidate))
        .route(
            "/upload",
            post(handle_upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .with_state(state)
}
