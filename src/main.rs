mod budget;
mod config;
mod db;
mod error;
mod expenses;
mod export;
mod fx;
mod goals;
mod models;
mod run;
mod storage;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = run::Cli::parse();
    let data_dir = get_data_dir()?;

    let (config_path, explicit) = match &cli.config {
        Some(path) => (path.clone(), true),
        None => (data_dir.join(config::CONFIG_FILE_NAME), false),
    };
    let mut cfg = config::AppConfig::load(&config_path, explicit)?;
    if let Some(url) = &cli.rates_url {
        cfg.rates_url = url.clone();
    }

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("pocketfin={}", cfg.log_level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let db_path = cli
        .db
        .clone()
        .or_else(|| cfg.db_path.clone())
        .unwrap_or_else(|| data_dir.join("pocketfin.db"));
    tracing::debug!(db = %db_path.display(), config = %config_path.display(), "starting");
    let db = db::Database::open(&db_path)?;

    let session = run::Session {
        db: &db,
        config: &cfg,
        today: chrono::Local::now().date_naive(),
    };
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run::as_cli(cli.command, &session, &mut out).await
}

fn get_data_dir() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "pocketfin", "PocketFin")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
    Ok(data_dir.to_path_buf())
}
