use crate::errors::{Error, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::{env, fs, path::Path};
use tracing::{debug, info};

/// Top-level application configuration, loaded from a TOML file.
#[derive(Deserialize, Debug)]
pub struct AppConfig {
    /// Path to the SQLite database file.
    pub database_path: String,
    /// Goals seeded into the database on first run (skipped once present).
    #[serde(default)]
    pub goals: Vec<GoalConfig>,
}

/// One seed goal from `config.toml`.
#[derive(Deserialize, Debug, Clone)]
pub struct GoalConfig {
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
    /// Quoted ISO date in the TOML file, e.g. `"2027-06-01"`.
    pub target_date: NaiveDate,
    pub target_amount: f64,
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = fs::read_to_string(path_ref)
        .map_err(|e| Error::Config(format!("Failed to read config file {:?}: {}", path_ref, e)))?;
    let app_config: AppConfig = toml::from_str(&contents).map_err(|e| {
        Error::Config(format!(
            "Failed to parse TOML from config file {:?}: {}",
            path_ref, e
        ))
    })?;
    Ok(app_config)
}

/// Loads the application configuration, honoring environment overrides.
///
/// The config file path comes from `GOAL_BUDDY_CONFIG` (default
/// `config.toml`); `DATABASE_PATH` overrides the database location from the
/// file when set.
pub fn load_app_configuration() -> Result<AppConfig> {
    let config_path =
        env::var("GOAL_BUDDY_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    let mut app_config = load_config(&config_path)?;

    if let Ok(db_path) = env::var("DATABASE_PATH") {
        info!(
            "DATABASE_PATH is set; overriding configured database path ({} -> {}).",
            app_config.database_path, db_path
        );
        app_config.database_path = db_path;
    }

    info!(
        "Configuration loaded from '{}' with {} seed goal(s).",
        config_path,
        app_config.goals.len()
    );
    Ok(app_config)
}
