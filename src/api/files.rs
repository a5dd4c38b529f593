use std::path::Path;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;

use crate::api::types::{DeleteRequest, RenameRequest, SuccessResponse};
use crate::error::Result;
use crate::server::state::AppState;
use crate::supervisor::StartOutcome;

/// POST /upload - Store the `file` field, kick the bot, notify the webhook.
///
/// Requests without a `file` field are simply redirected back to the page.
pub async fn upload_handler(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return e.into_response(),
        };
        if field.name() != Some("file") {
            continue;
        }
        // Browsers may send a full client path; keep only the final component.
        let Some(name) = field
            .file_name()
            .and_then(|n| Path::new(n).file_name())
            .and_then(|n| n.to_str())
            .map(str::to_string)
        else {
            continue;
        };
        let content = match field.bytes().await {
            Ok(content) => content,
            Err(e) => return e.into_response(),
        };
        if let Err(e) = state.workspace.save(&name, &content).await {
            tracing::error!(file = %name, "upload failed: {e}");
            return e.into_response();
        }
        tracing::info!(file = %name, bytes = content.len(), "file uploaded");

        state.supervisor.set_auto_restart(true).await;
        let sup = state.supervisor.clone();
        tokio::spawn(async move {
            if sup.start().await == StartOutcome::Started {
                sup.log().system("Bot started successfully after upload.");
            }
        });

        state.notifier.notify_file(&name, content);
        break;
    }
    Redirect::to("/").into_response()
}

/// POST /rename - Rename a workspace file.
pub async fn rename_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RenameRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>> {
    let Json(request) = payload?;
    state
        .workspace
        .rename(&request.old_name, &request.new_name)
        .await?;
    tracing::info!(from = %request.old_name, to = %request.new_name, "file renamed");
    Ok(Json(SuccessResponse { success: true }))
}

/// POST /delete - Remove a workspace file. Missing files are an error.
pub async fn delete_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<DeleteRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>> {
    let Json(request) = payload?;
    state.workspace.remove(&request.filename).await?;
    tracing::info!(file = %request.filename, "file deleted");
    Ok(Json(SuccessResponse { success: true }))
}
