//! Lifecycle of the single hosted bot process.
//!
//! The supervisor is either idle or running exactly one child. Start
//! requests while a child is live are no-ops. When the child exits and
//! auto-restart is still enabled, one fresh start attempt is scheduled after
//! the restart delay; there is no backoff and no retry limit.

use std::process::ExitStatus;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::process::Child;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;

use crate::config::RuntimeConfig;
use crate::log::LogBuffer;
use crate::state::BotState;
use crate::workspace::Workspace;

use spawn::{spawn_bot, spawn_install, SpawnSpec};

mod spawn;

/// Upper bound on waiting for trailing stdout after the bot exits.
const OUTPUT_DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Result of a start request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    AlreadyRunning,
    NoEntryPoint,
    Started,
    /// The launch could not happen (workspace unreadable or spawn failed).
    Failed(String),
}

impl StartOutcome {
    pub fn label(&self) -> String {
        match self {
            StartOutcome::AlreadyRunning => "Already running".into(),
            StartOutcome::NoEntryPoint => "No entry point found".into(),
            StartOutcome::Started => "Started".into(),
            StartOutcome::Failed(msg) => format!("Error: {msg}"),
        }
    }
}

/// Point-in-time view of the supervisor, served by `/api/status`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusRow {
    pub state: String,
    pub pid: Option<u32>,
    pub target: Option<String>,
    pub uptime_secs: Option<u64>,
    pub auto_restart: bool,
}

struct BotHandle {
    generation: u64,
    state: BotState,
    /// Tells the exit monitor to kill the child.
    kill: oneshot::Sender<()>,
}

struct SupervisorState {
    bot: Option<BotHandle>,
    auto_restart: bool,
    /// Incremented on every launch so stale exit reports can be recognized.
    generation: u64,
}

#[derive(Clone)]
pub struct Supervisor {
    state: Arc<Mutex<SupervisorState>>,
    workspace: Arc<Workspace>,
    runtime: Arc<RuntimeConfig>,
    log: Arc<LogBuffer>,
    restart_delay: Duration,
}

impl Supervisor {
    pub fn new(
        workspace: Arc<Workspace>,
        runtime: Arc<RuntimeConfig>,
        log: Arc<LogBuffer>,
        restart_delay: Duration,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(SupervisorState {
                bot: None,
                auto_restart: true,
                generation: 0,
            })),
            workspace,
            runtime,
            log,
            restart_delay,
        }
    }

    pub fn log(&self) -> &Arc<LogBuffer> {
        &self.log
    }

    pub async fn is_running(&self) -> bool {
        self.state.lock().await.bot.is_some()
    }

    pub async fn set_auto_restart(&self, enabled: bool) {
        self.state.lock().await.auto_restart = enabled;
    }

    pub async fn status(&self) -> StatusRow {
        let state = self.state.lock().await;
        let bot = state
            .bot
            .as_ref()
            .map(|b| b.state.clone())
            .unwrap_or(BotState::Idle);
        StatusRow {
            state: bot.label().to_string(),
            pid: bot.pid(),
            target: bot.target().map(str::to_string),
            uptime_secs: bot.uptime_secs(),
            auto_restart: state.auto_restart,
        }
    }

    /// Launch the bot unless one is already live.
    pub async fn start(&self) -> StartOutcome {
        let mut state = self.state.lock().await;
        self.start_locked(&mut state).await
    }

    /// Disable auto-restart and kill the live bot, if any.
    pub async fn stop(&self) {
        let mut state = self.state.lock().await;
        state.auto_restart = false;
        if let Some(bot) = state.bot.take() {
            tracing::info!(pid = ?bot.state.pid(), "stopping bot");
            let _ = bot.kill.send(());
        }
    }

    /// Run one start attempt after `delay`. Used at boot.
    pub fn start_after(&self, delay: Duration) -> JoinHandle<()> {
        let sup = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let outcome = sup.start().await;
            tracing::info!("initial start: {}", outcome.label());
        })
    }

    async fn start_locked(&self, state: &mut SupervisorState) -> StartOutcome {
        if state.bot.is_some() {
            return StartOutcome::AlreadyRunning;
        }

        let target = match self.workspace.launch_target(&self.runtime).await {
            Ok(Some(target)) => target,
            Ok(None) => {
                self.log.system(format!(
                    "No bot file ({}) found. Please upload one.",
                    self.runtime.entry_point
                ));
                return StartOutcome::NoEntryPoint;
            }
            Err(e) => {
                tracing::error!("failed to read workspace: {e}");
                return StartOutcome::Failed(e.to_string());
            }
        };

        self.log.system(format!("Starting bot: {target}..."));

        if self.workspace.contains(&self.runtime.manifest).await {
            self.log.system("Installing local dependencies...");
            spawn_install(self.workspace.root(), &self.runtime);
        }

        let spec = SpawnSpec {
            target: &target,
            workspace: self.workspace.root(),
            runtime: &self.runtime,
        };
        let result = match spawn_bot(&spec, &self.log) {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(target = %target, "spawn failed: {e}");
                if state.auto_restart {
                    self.schedule_restart();
                }
                return StartOutcome::Failed(e.to_string());
            }
        };

        state.generation += 1;
        let generation = state.generation;
        let (kill_tx, kill_rx) = oneshot::channel();
        tracing::info!(target = %target, pid = ?result.pid, "bot started");
        state.bot = Some(BotHandle {
            generation,
            state: BotState::Running {
                pid: result.pid,
                target,
                since: Instant::now(),
            },
            kill: kill_tx,
        });
        self.spawn_exit_monitor(result.child, result.output, generation, kill_rx);

        StartOutcome::Started
    }

    /// Wait for the child to exit (or be told to kill it), then report.
    fn spawn_exit_monitor(
        &self,
        mut child: Child,
        output: JoinHandle<()>,
        generation: u64,
        kill_rx: oneshot::Receiver<()>,
    ) {
        let sup = self.clone();
        tokio::spawn(async move {
            let status = tokio::select! {
                status = child.wait() => status,
                _ = kill_rx => {
                    if let Err(e) = child.start_kill() {
                        tracing::debug!("kill failed: {e}");
                    }
                    child.wait().await
                }
            };
            // Let trailing output land before the exit line.
            let _ = tokio::time::timeout(OUTPUT_DRAIN_TIMEOUT, output).await;
            sup.handle_exit(generation, status.ok()).await;
        });
    }

    async fn handle_exit(&self, generation: u64, status: Option<ExitStatus>) {
        let restart = {
            let mut state = self.state.lock().await;
            let was_live = state
                .bot
                .as_ref()
                .is_some_and(|b| b.generation == generation);
            if was_live {
                state.bot = None;
            }
            was_live && state.auto_restart
        };

        let code = status
            .and_then(|s| s.code())
            .map(|c| c.to_string())
            .unwrap_or_else(|| "none".into());
        tracing::info!(code = %code, restart, "bot exited");
        if restart {
            self.log.system(format!(
                "Bot stopped (code {code}). Restarting in {}s...",
                self.restart_delay.as_secs_f32()
            ));
            self.schedule_restart();
        } else {
            self.log.system(format!("Bot stopped (code {code})."));
        }
    }

    /// One-shot deferred start; skipped if auto-restart was disabled meanwhile.
    fn schedule_restart(&self) {
        let sup = self.clone();
        let delay = self.restart_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut state = sup.state.lock().await;
            if !state.auto_restart {
                tracing::debug!("auto-restart disabled, skipping scheduled start");
                return;
            }
            let outcome = sup.start_locked(&mut state).await;
            tracing::debug!("scheduled restart: {}", outcome.label());
        });
    }
}
