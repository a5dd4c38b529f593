pub mod control;
pub mod data;
pub mod files;
pub mod types;

use axum::routing::{get, post};
use axum::Router;

use crate::server::state::AppState;

/// Build the control-panel routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(data::index_handler))
        .route("/api/data", get(data::data_handler))
        .route("/api/status", get(data::status_handler))
        .route("/upload", post(files::upload_handler))
        .route("/rename", post(files::rename_handler))
        .route("/delete", post(files::delete_handler))
        .route("/start", post(control::start_handler))
        .route("/stop", post(control::stop_handler))
}
