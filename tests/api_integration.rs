//! HTTP API integration tests
//!
//! Exercises the axum router end to end with a temp workspace and a
//! recording notifier. Bot processes run under `sh`.

#![cfg(unix)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use a3s_bothost::config::{HostConfig, RuntimeConfig};
use a3s_bothost::server::router;
use a3s_bothost::server::state::AppState;
use a3s_bothost::{Notifier, Workspace};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use bytes::Bytes;
use http_body_util::BodyExt;
use tower::ServiceExt;

#[derive(Default)]
struct Recorder {
    files: Mutex<Vec<(String, Bytes)>>,
}

impl Notifier for Recorder {
    fn notify_text(&self, _line: &str) {}
    fn notify_file(&self, name: &str, content: Bytes) {
        self.files.lock().unwrap().push((name.to_string(), content));
    }
}

struct TestApp {
    _dir: tempfile::TempDir,
    state: AppState,
    notifier: Arc<Recorder>,
}

impl TestApp {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = HostConfig {
            workspace_dir: dir.path().join("uploads"),
            runtime: RuntimeConfig {
                program: "sh".into(),
                install_cmd: vec![],
                ..RuntimeConfig::default()
            },
            ..HostConfig::default()
        };
        let workspace = Workspace::open(&config.workspace_dir).unwrap();
        let notifier = Arc::new(Recorder::default());
        let state = AppState::new(config, workspace, notifier.clone());
        Self {
            _dir: dir,
            state,
            notifier,
        }
    }

    async fn send(&self, req: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Bytes) {
        let resp = router::build(self.state.clone()).oneshot(req).await.unwrap();
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        (status, headers, body)
    }

    async fn get_json(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        let req = Request::get(uri).body(Body::empty()).unwrap();
        let (status, _, body) = self.send(req).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    async fn post_json(&self, uri: &str, json: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let req = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap();
        let (status, _, body) = self.send(req).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    async fn post_empty(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        let req = Request::post(uri).body(Body::empty()).unwrap();
        let (status, _, body) = self.send(req).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    async fn upload(&self, field: &str, filename: &str, content: &str) -> (StatusCode, axum::http::HeaderMap) {
        let boundary = "a3s-test-boundary";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\
             Content-Type: application/javascript\r\n\r\n\
             {content}\r\n\
             --{boundary}--\r\n"
        );
        let req = Request::post("/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();
        let (status, headers, _) = self.send(req).await;
        (status, headers)
    }

    async fn wait_online(&self) -> bool {
        for _ in 0..250 {
            if self.state.supervisor.is_running().await {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        false
    }
}

// ─── Page & data ─────────────────────────────────────────────────

#[tokio::test]
async fn test_index_page() {
    let app = TestApp::new();
    let (status, headers, body) = app.send(Request::get("/").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert!(headers[header::CONTENT_TYPE].to_str().unwrap().starts_with("text/html"));
    assert!(String::from_utf8_lossy(&body).contains("/api/data"));
}

#[tokio::test]
async fn test_data_empty_workspace() {
    let app = TestApp::new();
    let (status, json) = app.get_json("/api/data").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["files"], serde_json::json!([]));
    assert_eq!(json["logs"], serde_json::json!([]));
    assert_eq!(json["isBotOnline"], false);
    assert!(json.get("error").is_none());
}

#[tokio::test]
async fn test_data_lists_files_and_logs() {
    let app = TestApp::new();
    app.state.workspace.save("b.js", b"").await.unwrap();
    app.state.workspace.save("a.txt", b"").await.unwrap();
    app.state.log.system("hello");

    let (_, json) = app.get_json("/api/data").await;
    assert_eq!(json["files"], serde_json::json!(["a.txt", "b.js"]));
    assert!(json["logs"][0].as_str().unwrap().ends_with("[SYSTEM] hello"));
}

#[tokio::test]
async fn test_data_error_when_workspace_vanishes() {
    let app = TestApp::new();
    std::fs::remove_dir_all(app.state.workspace.root()).unwrap();

    let (status, json) = app.get_json("/api/data").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["files"], serde_json::json!([]));
    assert_eq!(json["logs"], serde_json::json!([]));
    assert_eq!(json["isBotOnline"], false);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_status_endpoint_idle() {
    let app = TestApp::new();
    let (status, json) = app.get_json("/api/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["state"], "idle");
    assert_eq!(json["autoRestart"], true);
}

// ─── Rename & delete ─────────────────────────────────────────────

#[tokio::test]
async fn test_rename_success() {
    let app = TestApp::new();
    app.state.workspace.save("bot.js", b"x").await.unwrap();

    let (status, json) = app
        .post_json("/rename", serde_json::json!({"oldName": "bot.js", "newName": "index.js"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, serde_json::json!({"success": true}));
    assert_eq!(app.state.workspace.list().await.unwrap(), vec!["index.js"]);
}

#[tokio::test]
async fn test_rename_missing_file_is_error() {
    let app = TestApp::new();
    let (status, json) = app
        .post_json("/rename", serde_json::json!({"oldName": "ghost.js", "newName": "index.js"}))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_rename_rejects_path_escape() {
    let app = TestApp::new();
    app.state.workspace.save("bot.js", b"x").await.unwrap();
    let (status, json) = app
        .post_json("/rename", serde_json::json!({"oldName": "bot.js", "newName": "../bot.js"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("invalid file name"));
    assert!(app.state.workspace.contains("bot.js").await);
}

#[tokio::test]
async fn test_rename_missing_fields_rejected() {
    let app = TestApp::new();
    let req = Request::post("/rename")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"oldName":"a.js"}"#))
        .unwrap();
    let (status, _, body) = app.send(req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(json["error"].as_str().unwrap().contains("newName"));
}

#[tokio::test]
async fn test_delete_missing_field_rejected() {
    let app = TestApp::new();
    app.state.workspace.save("keep.js", b"x").await.unwrap();
    let (status, json) = app.post_json("/delete", serde_json::json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("filename"));
    assert!(app.state.workspace.contains("keep.js").await);
}

#[tokio::test]
async fn test_delete_malformed_body_rejected() {
    let app = TestApp::new();
    let req = Request::post("/delete")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _, body) = app.send(req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_delete_success_and_missing() {
    let app = TestApp::new();
    app.state.workspace.save("old.js", b"x").await.unwrap();

    let (status, json) = app
        .post_json("/delete", serde_json::json!({"filename": "old.js"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert!(app.state.workspace.list().await.unwrap().is_empty());

    let (status, json) = app
        .post_json("/delete", serde_json::json!({"filename": "old.js"}))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json["error"].is_string());
}

// ─── Start & stop ────────────────────────────────────────────────

#[tokio::test]
async fn test_start_without_entry_point() {
    let app = TestApp::new();
    let (status, json) = app.post_empty("/start").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "No entry point found");
    let logs = app.state.log.read_all();
    assert!(logs[0].contains("No bot file (index.js) found"));
}

#[tokio::test]
async fn test_start_then_already_running_then_stop() {
    let app = TestApp::new();
    app.state.workspace.save("index.js", b"exec sleep 30\n").await.unwrap();

    let (_, json) = app.post_empty("/start").await;
    assert_eq!(json["status"], "Started");
    let (_, json) = app.post_empty("/start").await;
    assert_eq!(json["status"], "Already running");

    let (_, data) = app.get_json("/api/data").await;
    assert_eq!(data["isBotOnline"], true);

    let (status, json) = app.post_empty("/stop").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "Stopped");
    assert!(!app.state.supervisor.is_running().await);
    assert!(!app.state.supervisor.status().await.auto_restart);
}

#[tokio::test]
async fn test_start_reenables_auto_restart() {
    let app = TestApp::new();
    app.post_empty("/stop").await;
    assert!(!app.state.supervisor.status().await.auto_restart);
    app.post_empty("/start").await;
    assert!(app.state.supervisor.status().await.auto_restart);
}

// ─── Upload ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_upload_saves_starts_notifies_and_redirects() {
    let app = TestApp::new();
    app.post_empty("/stop").await;

    let (status, headers) = app.upload("file", "index.js", "exec sleep 30").await;
    assert!(status.is_redirection());
    assert_eq!(headers[header::LOCATION], "/");

    assert!(app.state.workspace.contains("index.js").await);
    assert!(app.state.supervisor.status().await.auto_restart);
    assert!(app.wait_online().await);

    let files = app.notifier.files.lock().unwrap().clone();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].0, "index.js");
    assert_eq!(&files[0].1[..], b"exec sleep 30");

    for _ in 0..100 {
        if app
            .state
            .log
            .read_all()
            .iter()
            .any(|l| l.contains("Bot started successfully after upload."))
        {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(app
        .state
        .log
        .read_all()
        .iter()
        .any(|l| l.contains("Bot started successfully after upload.")));
    app.state.supervisor.stop().await;
}

#[tokio::test]
async fn test_uploaded_entry_point_wins_over_other_scripts() {
    let app = TestApp::new();
    app.state.workspace.save("aaa.js", b"exec sleep 30\n").await.unwrap();

    app.upload("file", "index.js", "exec sleep 30").await;
    assert!(app.wait_online().await);
    let status = app.state.supervisor.status().await;
    assert_eq!(status.target.as_deref(), Some("index.js"));
    app.state.supervisor.stop().await;
}

#[tokio::test]
async fn test_upload_strips_client_path() {
    let app = TestApp::new();
    app.upload("file", "C:/Users/me/bot.js", "exit 0").await;
    assert!(app.state.workspace.contains("bot.js").await);
    app.state.supervisor.stop().await;
}

#[tokio::test]
async fn test_upload_without_file_field_only_redirects() {
    let app = TestApp::new();
    let (status, headers) = app.upload("other", "index.js", "exit 0").await;
    assert!(status.is_redirection());
    assert_eq!(headers[header::LOCATION], "/");
    assert!(app.state.workspace.list().await.unwrap().is_empty());
    assert!(app.notifier.files.lock().unwrap().is_empty());
}
