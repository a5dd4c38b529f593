//! Best-effort delivery of log lines and upload notices to a webhook.
//!
//! Every call returns immediately. Delivery happens on a detached task and
//! any failure is logged at debug level and dropped.

use std::time::Duration;

use bytes::Bytes;
use reqwest::multipart::{Form, Part};

use crate::error::{HostError, Result};

/// Webhook payloads are cut to this many characters.
pub const MAX_CONTENT_CHARS: usize = 2000;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub trait Notifier: Send + Sync {
    /// Forward a single text line. Must not block the caller.
    fn notify_text(&self, line: &str);

    /// Announce a newly uploaded file, attaching its content. Must not block the caller.
    fn notify_file(&self, name: &str, content: Bytes);
}

/// Drops everything. Used when no webhook is configured.
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify_text(&self, _line: &str) {}
    fn notify_file(&self, _name: &str, _content: Bytes) {}
}

/// Posts to a Discord-style webhook accepting `{"content": ...}` JSON or
/// multipart `content` + `file`.
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| HostError::Config(format!("failed to build webhook client: {e}")))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    fn detach<F>(fut: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(fut);
            }
            Err(_) => tracing::debug!("no async runtime, webhook notification dropped"),
        }
    }
}

impl Notifier for WebhookNotifier {
    fn notify_text(&self, line: &str) {
        if line.trim().is_empty() {
            return;
        }
        let body = serde_json::json!({ "content": truncate(line, MAX_CONTENT_CHARS) });
        let request = self.client.post(&self.url).json(&body);
        Self::detach(async move {
            if let Err(e) = request.send().await.and_then(|r| r.error_for_status()) {
                tracing::debug!("webhook text delivery failed: {e}");
            }
        });
    }

    fn notify_file(&self, name: &str, content: Bytes) {
        let part = Part::stream(content).file_name(name.to_string());
        let form = Form::new()
            .text("content", format!("New file uploaded: {name}"))
            .part("file", part);
        let request = self.client.post(&self.url).multipart(form);
        let name = name.to_string();
        Self::detach(async move {
            if let Err(e) = request.send().await.and_then(|r| r.error_for_status()) {
                tracing::debug!(file = %name, "webhook file delivery failed: {e}");
            }
        });
    }
}

/// Cut `s` to at most `max` characters, respecting char boundaries.
pub fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
