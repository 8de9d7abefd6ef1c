//! camsnap - periodic network camera snapshot archiver
//!
//! Loads a YAML config, then either captures every camera once (`--once`) or
//! keeps capturing on the configured interval until Ctrl+C.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::mpsc;

use anyhow::Context;
use camsnap::{CamsnapConfig, HttpSource, run_cycle, run_schedule};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "camsnap", version, about = "Periodic network camera snapshot archiver")]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = "camsnap.yaml")]
    config: PathBuf,

    /// Capture every camera once and exit
    #[arg(long)]
    once: bool,

    /// Tracing filter, overrides `RUST_LOG` and the config's `log_level`
    #[arg(long)]
    log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let config = CamsnapConfig::from_file(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    init_tracing(&cli, &config);

    let source = HttpSource::new(&config.capture).context("building HTTP client")?;

    if cli.once {
        let summary = run_cycle(&config, &source);
        return Ok(if summary.is_clean() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    let (tx, rx) = mpsc::channel();
    ctrlc::set_handler(move || {
        tracing::info!("Received Ctrl+C, shutting down...");
        let _ = tx.send(());
    })
    .context("installing Ctrl+C handler")?;

    run_schedule(&config, &source, &rx);
    Ok(ExitCode::SUCCESS)
}

fn init_tracing(cli: &Cli, config: &CamsnapConfig) {
    let filter = match &cli.log_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);
    if cli.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
