mod api;
mod app;
mod cache;
mod commands;
mod config;
mod event;
mod forms;
mod query;
mod routes;
mod session;
mod table;
mod ui;

use clap::Parser;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::path::PathBuf;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "d9s")]
#[command(about = "A terminal admin dashboard for users and posts, inspired by k9s")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/d9s/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Base URL of the users/posts service
  #[arg(long)]
  base_url: Option<String>,

  /// Rows per page; must be one of the configured page sizes
  #[arg(long)]
  page_size: Option<usize>,
}

/// Log to a file; the terminal belongs to the UI
fn init_logging(level: &str) -> Result<WorkerGuard> {
  let dir = config::Config::data_dir()?;
  std::fs::create_dir_all(&dir)
    .map_err(|e| eyre!("Failed to create log directory {}: {}", dir.display(), e))?;

  let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(&dir, "d9s.log"));
  let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(writer)
    .with_ansi(false)
    .init();

  Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration
  let mut config = config::Config::load(args.config.as_deref())?;

  // Command line overrides
  if let Some(base_url) = args.base_url {
    config.api.base_url = base_url;
  }
  if let Some(page_size) = args.page_size {
    config.table.default_page_size = page_size;
  }
  config.validate()?;

  let _guard = init_logging(&config.log.level)?;
  info!(base_url = %config.api.base_url, "starting d9s");

  // Initialize and run the app
  let mut app = app::App::new(config)?;
  app.run().await?;

  Ok(())
}
