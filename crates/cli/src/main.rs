// SPDX-License-Identifier: MIT

//! `lifetrace` — thin CLI wrapper around the daemon composition root.
//! Runs the same capture/OCR/aggregation/scheduler pipeline as
//! `lifetraced`, in the foreground, with per-invocation overrides for
//! the recorder's interval and screen selection.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};

use lt_core::Clock;
use lt_daemon::Composition;

const SCHEDULER_TICK: Duration = Duration::from_secs(1);

#[derive(Parser)]
#[command(name = "lifetrace", version, about = "LifeTrace recording pipeline")]
struct Cli {
    /// User data directory. Defaults to `$LIFETRACE_DATA_DIR` or `~/.lifetrace`.
    #[arg(long, env = "LIFETRACE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// HTTP bind host for the API collaborator.
    #[arg(long)]
    host: Option<String>,

    /// HTTP bind port for the API collaborator.
    #[arg(long)]
    port: Option<u16>,

    /// Override the recorder's capture interval, in seconds, for this run.
    #[arg(long)]
    interval: Option<u64>,

    /// Override which screens to capture: `all` or a comma-separated list
    /// of monitor ids (e.g. `0,1`).
    #[arg(long)]
    screens: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    if let Err(error) = run(cli).await {
        error!(%error, "lifetrace exited with an error");
        std::process::exit(1);
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let data_dir = cli.data_dir.unwrap_or_else(default_data_dir);

    let mut overrides: Vec<(&str, serde_yaml::Value)> = Vec::new();
    if let Some(host) = &cli.host {
        overrides.push(("server.host", serde_yaml::Value::from(host.clone())));
    }
    if let Some(port) = cli.port {
        overrides.push(("server.port", serde_yaml::Value::from(port)));
    }
    if let Some(interval) = cli.interval {
        overrides.push(("jobs.recorder.interval", serde_yaml::Value::from(interval)));
    }
    if let Some(screens) = &cli.screens {
        let value = if screens.eq_ignore_ascii_case("all") {
            serde_yaml::Value::from(screens.clone())
        } else {
            let ids: Vec<u32> = screens
                .split(',')
                .map(|s| s.trim().parse::<u32>().context("--screens must be `all` or a comma-separated list of ids"))
                .collect::<Result<_>>()?;
            serde_yaml::to_value(ids).context("failed to encode --screens override")?
        };
        overrides.push(("jobs.recorder.params.screens", value));
    }

    let composition =
        Composition::build_with_overrides(data_dir, &overrides).context("failed to start LifeTrace")?;

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut tick = tokio::time::interval(SCHEDULER_TICK);

    info!(host = %composition.server_host, port = composition.server_port, "lifetrace running in the foreground");

    loop {
        tokio::select! {
            _ = tick.tick() => {
                let now = composition.clock.now_utc();
                if let Err(error) = composition.scheduler.run_pending(now) {
                    error!(%error, "scheduler tick failed");
                }
            }
            _ = sigterm.recv() => {
                info!("received SIGTERM, shutting down");
                break;
            }
            _ = sigint.recv() => {
                info!("received SIGINT, shutting down");
                break;
            }
        }
    }

    composition.scheduler.shutdown(true).await;
    Ok(())
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".lifetrace")
}
