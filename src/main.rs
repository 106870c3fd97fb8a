//! webpilot: drive a real browser as an automation agent.
//!
//! Entry point for the webpilot CLI.

mod cli;
mod cmd_page;
mod cmd_run;
mod config;
mod session;

use std::path::PathBuf;
use std::sync::OnceLock;

use anyhow::Result;
use clap::Parser;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::{Cli, Commands};
use crate::config::Config;

/// Get the .webpilot directory path.
fn webpilot_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".webpilot"))
        .unwrap_or_else(|| PathBuf::from(".webpilot"))
}

/// Initialize tracing with stderr and file output.
///
/// Log files are written to ~/.webpilot/logs/ with daily rotation. Stdout
/// stays reserved for command output (trees, JSON results, event lines).
fn init_tracing() -> Result<()> {
    let log_dir = webpilot_dir().join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("webpilot")
        .filename_suffix("log")
        .max_log_files(14)
        .build(&log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Keep the writer guard alive for the program duration.
    static GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(host) = &cli.host {
        config.browser.debug_host = host.clone();
    }
    if let Some(port) = cli.port {
        config.browser.debug_port = port;
    }
    if cli.headless {
        config.browser.headless = true;
    }

    match cli.command {
        Commands::Snapshot {
            url,
            json,
            viewport_expansion,
        } => cmd_page::snapshot(&config, url.as_deref(), json, viewport_expansion).await,
        Commands::Text {
            url,
            no_links,
            max_length,
            start_from,
        } => cmd_page::text(&config, url.as_deref(), !no_links, max_length, start_from).await,
        Commands::Act { action, url } => cmd_page::act(&config, &action, url.as_deref()).await,
        Commands::Run {
            script,
            instruction,
            max_steps,
            screenshots,
        } => cmd_run::run(&config, &script, &instruction, max_steps, screenshots).await,
    }
}
