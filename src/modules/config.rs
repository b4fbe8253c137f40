use std::path::{Path, PathBuf};

use super::storage::{get_data_dir, read_json};
use crate::error::{AppError, AppResult};
use crate::models::AppConfig;

const CONFIG_FILE: &str = "config.json";

/// Load bot config: `<data_dir>/config.json` first, then environment overrides
pub fn load_app_config() -> AppResult<AppConfig> {
    let data_dir = get_data_dir()?;
    let mut config = load_config_file(&data_dir.join(CONFIG_FILE))?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate(&config)?;
    Ok(config)
}

fn load_config_file(path: &Path) -> AppResult<AppConfig> {
    match read_json::<AppConfig>(path) {
        Ok(Some(config)) => {
            tracing::info!("Loaded config file {:?}", path);
            Ok(config)
        }
        Ok(None) => Ok(AppConfig::new()),
        Err(e) => Err(AppError::Config(format!(
            "Failed to parse config file {:?}: {}",
            path, e
        ))),
    }
}

/// Apply `TELEGRAM_BOT_TOKEN`, `ADMIN_ID`, `MAX_IMAGES_PER_DAY`, `HISTORY_SIZE`, `ASSETS_DIR`
pub fn apply_env_overrides<F>(config: &mut AppConfig, get: F) -> AppResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    if let Some(token) = non_empty("TELEGRAM_BOT_TOKEN") {
        config.bot_token = token;
    }
    if let Some(admin) = non_empty("ADMIN_ID") {
        let id = parse_env::<i64>("ADMIN_ID", &admin)?;
        config.admin_id = if id == 0 { None } else { Some(id) };
    }
    if let Some(limit) = non_empty("MAX_IMAGES_PER_DAY") {
        config.max_images_per_day = parse_env("MAX_IMAGES_PER_DAY", &limit)?;
    }
    if let Some(size) = non_empty("HISTORY_SIZE") {
        config.history_size = parse_env("HISTORY_SIZE", &size)?;
    }
    if let Some(dir) = non_empty("ASSETS_DIR") {
        config.assets_dir = PathBuf::from(dir);
    }
    Ok(())
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> AppResult<T> {
    value
        .parse()
        .map_err(|_| AppError::Config(format!("Invalid value for {}: {:?}", key, value)))
}

fn validate(config: &AppConfig) -> AppResult<()> {
    if config.bot_token.is_empty() {
        return Err(AppError::Config(
            "TELEGRAM_BOT_TOKEN is not set".to_string(),
        ));
    }
    if config.request_timeout <= config.poll_timeout {
        return Err(AppError::Config(format!(
            "request_timeout ({}s) must exceed poll_timeout ({}s)",
            config.request_timeout, config.poll_timeout
        )));
    }
    Ok(())
}
