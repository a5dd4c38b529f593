use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStderr, ChildStdout, Command};
use tokio::task::JoinHandle;

use crate::config::RuntimeConfig;
use crate::log::LogBuffer;

/// Everything needed to launch the bot.
pub struct SpawnSpec<'a> {
    pub target: &'a str,
    pub workspace: &'a Path,
    pub runtime: &'a RuntimeConfig,
}

pub struct SpawnResult {
    pub child: Child,
    pub pid: Option<u32>,
    /// Finishes once the bot's stdout reaches EOF.
    pub output: JoinHandle<()>,
}

/// Launch `<program> <target>` inside the workspace. Stdout lines go to the
/// log buffer; stderr only reaches local diagnostics.
pub fn spawn_bot(spec: &SpawnSpec<'_>, log: &Arc<LogBuffer>) -> std::io::Result<SpawnResult> {
    let mut cmd = Command::new(&spec.runtime.program);
    cmd.arg(spec.target)
        .current_dir(spec.workspace)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    match module_search_path(spec.workspace, spec.runtime) {
        Some(path) => {
            cmd.env(&spec.runtime.module_path_var, path);
        }
        None => tracing::warn!(
            "could not build {} for the bot, leaving it unset",
            spec.runtime.module_path_var
        ),
    }

    let mut child = cmd.spawn()?;
    let pid = child.id();

    let output = match child.stdout.take() {
        Some(stdout) => attach_stdout(log.clone(), stdout),
        None => tokio::spawn(async {}),
    };
    if let Some(stderr) = child.stderr.take() {
        attach_stderr(spec.target.to_string(), stderr);
    }

    Ok(SpawnResult { child, pid, output })
}

fn attach_stdout(log: Arc<LogBuffer>, stdout: ChildStdout) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut reader = BufReader::new(stdout).lines();
        while let Ok(Some(line)) = reader.next_line().await {
            let line = line.trim();
            if !line.is_empty() {
                log.online(line);
            }
        }
    })
}

fn attach_stderr(target: String, stderr: ChildStderr) {
    tokio::spawn(async move {
        let mut reader = BufReader::new(stderr).lines();
        while let Ok(Some(line)) = reader.next_line().await {
            tracing::warn!(target = %target, "bot stderr: {line}");
        }
    });
}

/// Run the dependency install command in the workspace without waiting on it.
pub fn spawn_install(workspace: &Path, runtime: &RuntimeConfig) {
    let Some((program, args)) = runtime.install_cmd.split_first() else {
        return;
    };
    let spawned = Command::new(program)
        .args(args)
        .current_dir(workspace)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn();
    match spawned {
        Ok(mut child) => {
            let program = program.clone();
            tokio::spawn(async move {
                match child.wait().await {
                    Ok(status) => tracing::debug!("{program} finished: {status}"),
                    Err(e) => tracing::debug!("{program} wait failed: {e}"),
                }
            });
        }
        Err(e) => tracing::debug!("dependency install could not start: {e}"),
    }
}

/// Module search path: the workspace dependency dir, the host's own
/// dependency dir, then any configured extras.
pub fn module_search_path(workspace: &Path, runtime: &RuntimeConfig) -> Option<OsString> {
    let mut dirs: Vec<PathBuf> = vec![workspace.join(&runtime.dependency_dir)];
    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd.join(&runtime.dependency_dir));
    }
    dirs.extend(runtime.extra_module_paths.iter().cloned());
    std::env::join_paths(dirs).ok()
}
