pub mod router;
pub mod state;

use std::sync::Arc;

use crate::config::HostConfig;
use crate::error::{HostError, Result};
use crate::notify::{NoopNotifier, Notifier, WebhookNotifier};
use crate::workspace::Workspace;

/// Pick the webhook notifier when a URL is configured, a no-op otherwise.
pub fn build_notifier(config: &HostConfig) -> Result<Arc<dyn Notifier>> {
    match config.webhook_url.as_deref() {
        Some(url) => Ok(Arc::new(WebhookNotifier::new(url)?)),
        None => {
            tracing::info!("No webhook configured, notifications disabled");
            Ok(Arc::new(NoopNotifier))
        }
    }
}

/// Start the control panel and the bot supervisor with the given configuration.
pub async fn start(config: HostConfig) -> Result<()> {
    let workspace = Workspace::open(&config.workspace_dir).map_err(|e| {
        HostError::Server(format!(
            "Failed to create workspace {}: {e}",
            config.workspace_dir.display()
        ))
    })?;
    tracing::info!(dir = %workspace.root().display(), "Workspace ready");

    let notifier = build_notifier(&config)?;
    let bind_addr = config.bind_address();
    let boot_delay = config.boot_delay();
    let app_state = state::AppState::new(config, workspace, notifier);
    let supervisor = app_state.supervisor.clone();

    supervisor.start_after(boot_delay);

    let app = router::build(app_state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| HostError::Server(format!("Failed to bind to {bind_addr}: {e}")))?;

    tracing::info!("Server listening on {bind_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| HostError::Server(format!("Server error: {e}")))?;

    supervisor.stop().await;
    tracing::info!("Shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
}
