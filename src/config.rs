use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub(crate) const CONFIG_FILE_NAME: &str = "pocketfin.toml";
const ENV_PREFIX: &str = "POCKETFIN";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub(crate) struct AppConfig {
    /// Flat JSON document mapping currency code to its factor against UAH.
    pub(crate) rates_url: String,
    pub(crate) fetch_timeout_secs: u64,
    /// Defaults to `pocketfin.db` in the platform data directory.
    pub(crate) db_path: Option<PathBuf>,
    pub(crate) log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            rates_url: "http://localhost:5173/api/rates.json".to_string(),
            fetch_timeout_secs: 10,
            db_path: None,
            log_level: "warn".to_string(),
        }
    }
}

impl AppConfig {
    /// Layer built-in defaults, the TOML file and `POCKETFIN_*` variables.
    /// An explicitly named file must exist; the default one is optional.
    pub(crate) fn load(path: &Path, explicit: bool) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path).required(explicit))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
        settings
            .try_deserialize()
            .context("Invalid configuration")
    }

    pub(crate) fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs.max(1))
    }
}
