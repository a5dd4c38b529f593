use std::sync::Arc;

use crate::config::HostConfig;
use crate::log::LogBuffer;
use crate::notify::Notifier;
use crate::supervisor::Supervisor;
use crate::workspace::Workspace;

/// Shared application state accessible to all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub supervisor: Supervisor,
    pub workspace: Arc<Workspace>,
    pub log: Arc<LogBuffer>,
    pub notifier: Arc<dyn Notifier>,
    pub config: Arc<HostConfig>,
}

impl AppState {
    /// Wire the log buffer and supervisor around an opened workspace.
    pub fn new(config: HostConfig, workspace: Workspace, notifier: Arc<dyn Notifier>) -> Self {
        let workspace = Arc::new(workspace);
        let log = Arc::new(LogBuffer::new(config.log_capacity, notifier.clone()));
        let supervisor = Supervisor::new(
            workspace.clone(),
            Arc::new(config.runtime.clone()),
            log.clone(),
            config.restart_delay(),
        );
        Self {
            supervisor,
            workspace,
            log,
            notifier,
            config: Arc::new(config),
        }
    }
}
