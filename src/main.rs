use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use hrchat::app::{AppConfig, AppState};
use hrchat::cli::{ask_once, Cli, Commands};
use hrchat::platform::AppPaths;
use hrchat::tui;

fn env_filter(debug: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if debug { "hrchat=debug" } else { "hrchat=info" })
    })
}

/// The chat screen owns the terminal, so its logs go to a daily file.
fn init_file_logging(paths: &AppPaths, debug: bool) -> WorkerGuard {
    let appender = tracing_appender::rolling::daily(paths.logs_dir(), "hrchat.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(debug))
        .with_writer(writer)
        .with_ansi(false)
        .init();

    guard
}

fn init_stderr_logging(debug: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(debug))
        .with_writer(std::io::stderr)
        .init();
}

async fn load_config(cli: &Cli, paths: &AppPaths) -> anyhow::Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => AppConfig::load(paths)
            .await
            .context("Failed to load configuration")?,
    };
    cli.apply_overrides(&mut config)
        .context("Invalid command-line options")?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let paths = AppPaths::new().context("Failed to resolve application directories")?;
    paths
        .ensure_dirs_exist()
        .context("Failed to create application directories")?;

    match cli.command() {
        Commands::Chat => {
            let _guard = init_file_logging(&paths, cli.debug);
            info!("Starting hrchat {}", env!("CARGO_PKG_VERSION"));

            let config = load_config(&cli, &paths).await?;
            let state = Arc::new(AppState::new(config)?);
            tui::run(state).await?;
        }
        Commands::Ask { message } => {
            init_stderr_logging(cli.debug);

            let config = load_config(&cli, &paths).await?;
            let state = AppState::new(config)?;
            let answer = ask_once(&state, &message.join(" ")).await?;
            println!("{}", answer);
        }
    }

    Ok(())
}
