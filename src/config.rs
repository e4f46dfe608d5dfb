use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{AppError, AppResult};

/// Hard ceiling on images per artwork imposed by the service.
pub const MAX_IMAGES_PER_ARTWORK: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub max_images: usize,
    pub max_file_size_mb: u64,
    pub feed_query_key: String,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.arttoktok.com/api/".to_string(),
            request_timeout_secs: 120,
            max_images: MAX_IMAGES_PER_ARTWORK,
            max_file_size_mb: 20,
            feed_query_key: "allArtworks".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn log_level_filter(&self) -> log::LevelFilter {
        match self.log_level.as_str() {
            "error" => log::LevelFilter::Error,
            "warn" => log::LevelFilter::Warn,
            "debug" => log::LevelFilter::Debug,
            "trace" => log::LevelFilter::Trace,
            _ => log::LevelFilter::Info,
        }
    }
}

pub fn get_config_path() -> AppResult<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| AppError::Config("Could not find config directory".to_string()))?
        .join("ArtTokTok");

    fs::create_dir_all(&config_dir)?;
    Ok(config_dir.join("config.json"))
}

pub fn load_config() -> AppResult<Config> {
    load_config_from(&get_config_path()?)
}

/// Reads the config at `path`, writing defaults when the file does not exist yet.
pub fn load_config_from(path: &Path) -> AppResult<Config> {
    if path.exists() {
        let config_str = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_str).unwrap_or_else(|e| {
            log::warn!("Failed to parse config file: {}. Using defaults.", e);
            Config::default()
        });

        validate_config(&config)?;

        Ok(config)
    } else {
        let default_config = Config::default();
        save_config_to(path, &default_config)?;
        Ok(default_config)
    }
}

pub fn save_config(config: &Config) -> AppResult<()> {
    save_config_to(&get_config_path()?, config)
}

pub fn save_config_to(path: &Path, config: &Config) -> AppResult<()> {
    validate_config(config)?;

    if path.exists() {
        let backup_path = path.with_extension("json.bak");
        if let Err(e) = fs::copy(path, &backup_path) {
            log::warn!("Failed to create config backup: {}", e);
        }
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let config_str = serde_json::to_string_pretty(config)?;
    fs::write(path, config_str)?;

    log::info!("Configuration saved to {}", path.display());
    Ok(())
}

pub fn validate_config(config: &Config) -> AppResult<()> {
    let base = config.api_base_url.trim();
    if !(base.starts_with("https://") || base.starts_with("http://")) {
        return Err(AppError::validation(
            "api_base_url",
            "Must be an http or https URL",
        ));
    }

    if config.max_images == 0 || config.max_images > MAX_IMAGES_PER_ARTWORK {
        return Err(AppError::validation("max_images", "Must be between 1 and 10"));
    }

    if config.request_timeout_secs == 0 || config.request_timeout_secs > 600 {
        return Err(AppError::validation(
            "request_timeout_secs",
            "Must be between 1 and 600",
        ));
    }

    if config.max_file_size_mb == 0 {
        return Err(AppError::validation("max_file_size_mb", "Must be greater than 0"));
    }

    if config.feed_query_key.trim().is_empty() {
        return Err(AppError::validation("feed_query_key", "Cannot be empty"));
    }

    let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
    if !valid_log_levels.contains(&config.log_level.as_str()) {
        return Err(AppError::validation("log_level", "Must be a valid log level"));
    }

    Ok(())
}

// Reset configuration to defaults
pub fn reset_config() -> AppResult<Config> {
    reset_config_at(&get_config_path()?)
}

pub fn reset_config_at(path: &Path) -> AppResult<Config> {
    if path.exists() {
        let backup_path = path.with_extension("json.reset_backup");
        fs::copy(path, &backup_path)?;
        log::info!("Existing config backed up to {}", backup_path.display());
    }

    let default_config = Config::default();
    save_config_to(path, &default_config)?;

    log::info!("Configuration reset to defaults");
    Ok(default_config)
}
