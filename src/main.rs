use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use a3s_bothost::config::HostConfig;
use a3s_bothost::server;

#[derive(Parser)]
#[command(
    name = "a3s-bothost",
    about = "a3s-bothost — upload, run, and auto-restart a script bot from a web panel"
)]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// Port (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Workspace directory for uploaded files (overrides config)
    #[arg(short, long)]
    workspace: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = HostConfig::load(cli.config.as_deref())?;
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(dir) = cli.workspace {
        config.workspace_dir = dir;
    }

    server::start(config).await?;
    Ok(())
}
