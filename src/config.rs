use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{HostError, Result};

pub const ENV_WEBHOOK_URL: &str = "BOTHOST_WEBHOOK_URL";
pub const ENV_WORKSPACE: &str = "BOTHOST_WORKSPACE";
pub const ENV_PORT: &str = "BOTHOST_PORT";

/// User-configurable settings for the control panel and supervisor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    /// Bind address for the HTTP server (default: 0.0.0.0)
    #[serde(default = "default_host")]
    pub host: String,

    /// Port for the HTTP server (default: 5000)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding the uploaded bot files
    #[serde(default = "default_workspace_dir")]
    pub workspace_dir: PathBuf,

    /// Webhook receiving sampled log lines and upload notices. Treated as a secret.
    #[serde(default)]
    pub webhook_url: Option<String>,

    /// Maximum number of log lines kept in memory
    #[serde(default = "default_log_capacity")]
    pub log_capacity: usize,

    #[serde(default = "default_boot_delay_secs")]
    pub boot_delay_secs: u64,

    #[serde(default = "default_restart_delay_secs")]
    pub restart_delay_secs: u64,

    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    #[serde(default)]
    pub runtime: RuntimeConfig,
}

/// How the hosted bot is located and launched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Interpreter the entry point is handed to
    #[serde(default = "default_program")]
    pub program: String,
    /// File preferred as the launch target when present
    #[serde(default = "default_entry_point")]
    pub entry_point: String,
    /// Extension of fallback launch targets
    #[serde(default = "default_extension")]
    pub extension: String,
    /// Dependency manifest that triggers the install step
    #[serde(default = "default_manifest")]
    pub manifest: String,
    #[serde(default = "default_install_cmd")]
    pub install_cmd: Vec<String>,
    /// Environment variable carrying the module search path
    #[serde(default = "default_module_path_var")]
    pub module_path_var: String,
    /// Name of the dependency directory inside the workspace and the host dir
    #[serde(default = "default_dependency_dir")]
    pub dependency_dir: String,
    #[serde(default)]
    pub extra_module_paths: Vec<PathBuf>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_workspace_dir() -> PathBuf {
    std::env::temp_dir().join("bot-host-uploads")
}

fn default_log_capacity() -> usize {
    500
}

fn default_boot_delay_secs() -> u64 {
    2
}

fn default_restart_delay_secs() -> u64 {
    5
}

fn default_max_upload_bytes() -> usize {
    50 * 1024 * 1024
}

fn default_program() -> String {
    "node".into()
}
fn default_entry_point() -> String {
    "index.js".into()
}
fn default_extension() -> String {
    ".js".into()
}
fn default_manifest() -> String {
    "package.json".into()
}
fn default_install_cmd() -> Vec<String> {
    vec!["npm".into(), "install".into()]
}
fn default_module_path_var() -> String {
    "NODE_PATH".into()
}
fn default_dependency_dir() -> String {
    "node_modules".into()
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            entry_point: default_entry_point(),
            extension: default_extension(),
            manifest: default_manifest(),
            install_cmd: default_install_cmd(),
            module_path_var: default_module_path_var(),
            dependency_dir: default_dependency_dir(),
            extra_module_paths: Vec::new(),
        }
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workspace_dir: default_workspace_dir(),
            webhook_url: None,
            log_capacity: default_log_capacity(),
            boot_delay_secs: default_boot_delay_secs(),
            restart_delay_secs: default_restart_delay_secs(),
            max_upload_bytes: default_max_upload_bytes(),
            runtime: RuntimeConfig::default(),
        }
    }
}

impl HostConfig {
    /// Load configuration from `path` when given, defaults otherwise, then
    /// apply `BOTHOST_*` environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|e| {
                    HostError::Config(format!(
                        "Failed to read config file {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                toml::from_str::<HostConfig>(&content)?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = lookup(ENV_WEBHOOK_URL).filter(|u| !u.trim().is_empty()) {
            self.webhook_url = Some(url);
        }
        if let Some(dir) = lookup(ENV_WORKSPACE) {
            self.workspace_dir = PathBuf::from(dir);
        }
        if let Some(port) = lookup(ENV_PORT) {
            self.port = port
                .parse()
                .map_err(|_| HostError::Config(format!("{ENV_PORT} is not a valid port: {port}")))?;
        }
        Ok(())
    }

    /// Returns the server bind address string (e.g., "0.0.0.0:5000").
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn boot_delay(&self) -> Duration {
        Duration::from_secs(self.boot_delay_secs)
    }

    pub fn restart_delay(&self) -> Duration {
        Duration::from_secs(self.restart_delay_secs)
    }
}
