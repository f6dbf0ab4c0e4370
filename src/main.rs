//! talent-ingest - bulk CSV ingestion for talent profiles
//!
//! Decodes a CSV of candidate profiles, optionally validates it locally and
//! submits it to the talent backend in one request.

mod cli;
mod config;
mod error;
mod handlers;
mod services;
mod types;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // Load configuration
    let config = config::Config::from_env()?;

    std::fs::create_dir_all(&config.logs_dir).ok();

    // File appender for persistent logs (daily rotation)
    let file_appender = RollingFileAppender::new(Rotation::DAILY, &config.logs_dir, "talent-ingest.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    // Initialize logging - both stderr and file
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,talent_ingest=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    info!(
        "talent-ingest {} (mode {}, required {}, lists {})",
        env!("CARGO_PKG_VERSION"),
        config.upload_mode,
        config.required_policy,
        config.list_policy
    );

    if let Err(e) = handlers::run(cli.command, &config).await {
        error!("{:#}", e);
        return Err(e);
    }

    Ok(())
}
