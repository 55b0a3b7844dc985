//! Interactive casebook: register people, persist snapshots, sync remotely.

use anyhow::Context;
use casebook_rs::config::CasebookConfig;
use casebook_rs::shell::Shell;
use casebook_rs::{build_store, init_logging};
use clap::Parser;
use log::{debug, info};
use std::io;
use std::path::PathBuf;

/// Command-line options for the casebook shell.
#[derive(Parser)]
#[command(name = "casebook", version)]
struct Cli {
    /// Optional path to a casebook.json5 config file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Snapshot file used by save/load (overrides config)
    #[arg(long)]
    snapshot: Option<PathBuf>,
    /// Disable remote sync regardless of config
    #[arg(long)]
    offline: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let cli = Cli::parse();
    info!(
        "starting casebook (config_set={}, snapshot_set={}, offline={})",
        cli.config.is_some(),
        cli.snapshot.is_some(),
        cli.offline
    );
    let mut config = if let Some(path) = cli.config.as_ref() {
        CasebookConfig::load_from_path(path).context("failed to load config")?
    } else {
        let cwd = std::env::current_dir().context("cwd")?;
        let layered =
            CasebookConfig::load_layered(&cwd).context("failed to load layered config")?;
        debug!("layered config loaded (layers={})", layered.layers.len());
        layered.config
    };
    if cli.offline {
        config.remote.enabled = false;
    }

    let snapshot_path = cli
        .snapshot
        .unwrap_or_else(|| PathBuf::from(&config.snapshot.path));
    let store = build_store(&config.remote);

    let stdin = io::stdin();
    let mut shell = Shell::new(stdin.lock(), io::stdout(), store, snapshot_path);
    shell.run().await.context("shell i/o failed")?;
    let store = shell.finish().await;
    info!("casebook exiting (records={})", store.len());
    Ok(())
}
