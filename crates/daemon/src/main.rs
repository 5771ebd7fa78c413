// SPDX-License-Identifier: MIT

//! `lifetraced` — the background recording daemon.
//!
//! Typically started by the `lifetrace` CLI and left to run in the
//! background: captures screenshots, runs OCR, aggregates activity, and
//! fires reminders on a schedule, all driven by the scheduler tick loop
//! below.

use std::path::PathBuf;
use std::time::Duration;

use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};

use lt_core::Clock;
use lt_daemon::{logging, Composition};

const SCHEDULER_TICK: Duration = Duration::from_secs(1);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" => {
                println!("lifetraced {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            other => {
                eprintln!("error: unexpected argument '{other}'");
                eprintln!("Usage: lifetraced [--help | --version]");
                std::process::exit(1);
            }
        }
    }

    let data_dir = resolve_data_dir();
    let log_path = data_dir.join("data").join("logs").join("lifetraced.log");
    logging::rotate_log_if_needed(&log_path);
    let _log_guard = logging::setup(&log_path)?;

    info!("starting lifetraced");

    let composition = match Composition::build(data_dir) {
        Ok(composition) => composition,
        Err(error) => {
            error!(%error, "failed to start daemon");
            std::process::exit(1);
        }
    };

    let _watcher = match composition.config.watch() {
        Ok(watcher) => Some(watcher),
        Err(error) => {
            error!(%error, "failed to watch config.yaml for changes, continuing without hot reload");
            None
        }
    };

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut tick = tokio::time::interval(SCHEDULER_TICK);

    info!(host = %composition.server_host, port = composition.server_port, "lifetraced ready");
    println!("READY");

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
    info!("lifetraced stopped");
    Ok(())
}

fn resolve_data_dir() -> PathBuf {
    if let Ok(path) = std::env::var("LIFETRACE_DATA_DIR") {
        return PathBuf::from(path);
    }
    dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".lifetrace")
}

fn print_help() {
    println!("lifetraced {}", env!("CARGO_PKG_VERSION"));
    println!("Background recording daemon for LifeTrace.");
    println!();
    println!("USAGE:");
    println!("    lifetraced");
    println!();
    println!("The daemon is typically started by the `lifetrace` CLI and should");
    println!("not be invoked directly. Data directory resolution:");
    println!("    1. $LIFETRACE_DATA_DIR");
    println!("    2. ~/.lifetrace");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Print help information");
    println!("    -V, --version    Print version information");
}
