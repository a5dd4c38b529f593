//! # a3s-bothost
//!
//! Upload a script bot through a small web control panel, run it as a
//! supervised child process, and keep it alive.
//!
//! ## Overview
//!
//! - **Workspace** — one flat directory holding the uploaded files
//! - **Supervisor** — owns the single bot process; start, stop, and
//!   auto-restart after a fixed delay when it exits
//! - **LogBuffer** — bounded, timestamped console history of the bot
//! - **Notifier** — best-effort webhook forwarding of sampled log lines and
//!   upload notices
//! - **server / api** — the axum HTTP surface tying these together
//!
//! ## Launch target
//!
//! Each start picks the configured entry point (`index.js` by default) if
//! present, otherwise the first file in name order with the script
//! extension.

pub mod api;
pub mod config;
pub mod error;
pub mod log;
pub mod notify;
pub mod server;
pub mod state;
pub mod supervisor;
pub mod workspace;

pub use config::{HostConfig, RuntimeConfig};
pub use error::{HostError, Result};
pub use log::LogBuffer;
pub use notify::{NoopNotifier, Notifier, WebhookNotifier};
pub use supervisor::{StartOutcome, StatusRow, Supervisor};
pub use workspace::Workspace;
