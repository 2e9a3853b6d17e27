//! `fleetdeck-tui` — terminal dashboard for a small machine fleet.
//!
//! Built on [ratatui](https://ratatui.rs) with data streamed from
//! `fleetdeck-core`'s [`Controller`]: the inventory poller keeps the card
//! grid eventually consistent with the backend, and power operations run
//! the optimistic-then-challenge authentication flow through a modal
//! password prompt.
//!
//! Logs are written to a file (default `/tmp/fleetdeck-tui.log`) to avoid
//! corrupting the terminal UI.
//!
//! Entry point: CLI argument parsing, tracing setup, panic hooks, and app
//! launch.

mod action;
mod app;
mod component;
mod data_bridge;
mod event;
mod screens;
mod theme;
mod tui;
mod widgets;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Result, eyre};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use fleetdeck_core::{Controller, ControllerConfig};

use crate::app::App;

/// Terminal dashboard for monitoring and controlling a machine fleet.
#[derive(Parser, Debug)]
#[command(name = "fleetdeck-tui", version, about)]
struct Cli {
    /// Backend URL (e.g., http://homeserver:5000)
    #[arg(short = 'b', long, env = "FLEETDECK_BACKEND")]
    backend: Option<String>,

    /// Backend profile from the shared config file
    #[arg(short = 'p', long, env = "FLEETDECK_PROFILE")]
    profile: Option<String>,

    /// Inventory poll interval in seconds
    #[arg(long)]
    poll_interval: Option<u64>,

    /// Accept self-signed TLS certificates
    #[arg(short = 'k', long, env = "FLEETDECK_INSECURE")]
    insecure: bool,

    /// Log file path
    #[arg(long, default_value = "/tmp/fleetdeck-tui.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Set up file-based tracing. We MUST NOT log to stdout/stderr — that would
/// corrupt the TUI output. Returns a guard that must be held for the
/// lifetime of the application to ensure logs are flushed.
fn setup_tracing(cli: &Cli) -> Result<WorkerGuard> {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "fleetdeck_tui={log_level},fleetdeck_core={log_level},fleetdeck_api={log_level}"
        ))
    });

    let log_dir = cli
        .log_file
        .parent()
        .unwrap_or(std::path::Path::new("/tmp"));
    let log_name = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("fleetdeck-tui.log"));

    let appender = tracing_appender::rolling::never(log_dir, log_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .init();

    Ok(guard)
}

/// Resolve the backend connection from flags, env, and the shared config.
fn resolve_config(cli: &Cli) -> Result<ControllerConfig> {
    // Explicit --backend wins outright.
    if let Some(ref backend) = cli.backend {
        let url = backend
            .parse()
            .map_err(|_| eyre!("invalid backend URL: {backend}"))?;
        let mut config = ControllerConfig {
            url,
            accept_invalid_certs: cli.insecure,
            ..ControllerConfig::default()
        };
        if let Some(interval) = cli.poll_interval {
            config.poll_interval_secs = interval;
        }
        return Ok(config);
    }

    // Otherwise fall back to the shared profile config.
    let cfg = fleetdeck_config::load_config_or_default();
    let profile_name = cli
        .profile
        .clone()
        .or(cfg.default_profile)
        .unwrap_or_else(|| "default".into());

    let profile = cfg.profiles.get(&profile_name).ok_or_else(|| {
        eyre!(
            "no backend configured — pass --backend <url>, set FLEETDECK_BACKEND, \
             or create a profile with: fleetdeck config init --backend <url>"
        )
    })?;

    let mut config = fleetdeck_config::profile_to_controller_config(profile)?;
    if cli.insecure {
        config.accept_invalid_certs = true;
    }
    if let Some(interval) = cli.poll_interval {
        config.poll_interval_secs = interval;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let _guard = setup_tracing(&cli)?;
    tui::install_hooks()?;

    let config = resolve_config(&cli)?;
    info!(url = %config.url, "starting fleetdeck-tui");

    let controller = Controller::new(config).map_err(|e| eyre!(e.to_string()))?;

    let mut app = App::new(controller);
    app.run().await
}
