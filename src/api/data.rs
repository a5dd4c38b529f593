use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;

use crate::api::types::DataResponse;
use crate::server::state::AppState;

static INDEX_HTML: &str = include_str!("index.html");

/// GET / - The control-panel page.
pub async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /api/data - Workspace files, log lines and whether the bot is live.
pub async fn data_handler(State(state): State<AppState>) -> Response {
    match state.workspace.list().await {
        Ok(files) => Json(DataResponse {
            files,
            logs: state.log.read_all(),
            is_bot_online: state.supervisor.is_running().await,
            error: None,
        })
        .into_response(),
        Err(e) => {
            tracing::error!("failed to list workspace: {e}");
            let body = DataResponse {
                files: vec![],
                logs: vec![],
                is_bot_online: false,
                error: Some(e.to_string()),
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}

/// GET /api/status - Supervisor state, pid, target and uptime.
pub async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.supervisor.status().await)
}
