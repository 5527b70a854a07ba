mod types;

pub use types::*;

use crate::{Error, Result};
use std::{env, path::Path};
use tracing::debug;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";

pub async fn load() -> Result<Config> {
    // A missing .env is fine; anything already exported wins.
    let _ = dotenvy::dotenv();

    let explicit_path = env::var("CONFIG_PATH").ok();
    load_from(explicit_path.as_deref(), |key| env::var(key).ok()).await
}

/// Loads the YAML file (if any), applies environment overrides and validates.
///
/// `path` is an explicitly requested file and must exist. Without one the
/// default `config.yaml` is read when present, otherwise defaults apply.
pub async fn load_from<F>(path: Option<&str>, lookup: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => {
            debug!("Loading configuration from: {}", path);
            let config_str = tokio::fs::read_to_string(path).await?;
            serde_yaml::from_str(&config_str)?
        }
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            debug!("Loading configuration from: {}", DEFAULT_CONFIG_PATH);
            let config_str = tokio::fs::read_to_string(DEFAULT_CONFIG_PATH).await?;
            serde_yaml::from_str(&config_str)?
        }
        None => {
            debug!("No configuration file found, using defaults");
            Config::default()
        }
    };

    apply_env_overrides(&mut config, lookup);
    validate(&config)?;

    Ok(config)
}

pub fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(model) = lookup("MODEL") {
        config.model.path = model;
    }
    if let Some(train_df) = lookup("TRAIN_DF") {
        config.model.reference_path = train_df;
    }
    if let Some(ledger) = lookup("LEDGER_DB_PATH") {
        config.ledger.path = ledger;
    }
}

pub fn validate(config: &Config) -> Result<()> {
    if config.model.path.trim().is_empty() {
        return Err(Error::config(
            "model path is not set (config `model.path` or MODEL)",
        ));
    }
    if config.model.reference_path.trim().is_empty() {
        return Err(Error::config(
            "training reference path is not set (config `model.reference_path` or TRAIN_DF)",
        ));
    }
    if config.model.reference_rows == 0 {
        return Err(Error::config("model.reference_rows must be at least 1"));
    }
    if config.model.max_processing_ms == 0 {
        return Err(Error::config("model.max_processing_ms must be positive"));
    }
    if config.ledger.path.trim().is_empty() {
        return Err(Error::config("ledger.path must not be empty"));
    }
    if !(-23..=23).contains(&config.ledger.utc_offset_hours) {
        return Err(Error::config(format!(
            "ledger.utc_offset_hours out of range: {}",
            config.ledger.utc_offset_hours
        )));
    }
    Ok(())
}
