use axum::extract::State;
use axum::Json;

use crate::api::types::StatusResponse;
use crate::server::state::AppState;

/// POST /start - Re-enable auto-restart and launch the bot.
pub async fn start_handler(State(state): State<AppState>) -> Json<StatusResponse> {
    state.supervisor.set_auto_restart(true).await;
    let outcome = state.supervisor.start().await;
    Json(StatusResponse {
        status: outcome.label(),
    })
}

/// POST /stop - Disable auto-restart and kill the bot.
pub async fn stop_handler(State(state): State<AppState>) -> Json<StatusResponse> {
    state.supervisor.stop().await;
    Json(StatusResponse {
        status: "Stopped".into(),
    })
}
