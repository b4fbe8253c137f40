use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

const DATA_DIR: &str = ".gemini_watermark_bot";
const DATA_DIR_ENV: &str = "BOT_DATA_DIR";

/// Get data directory path
///
/// `BOT_DATA_DIR` wins over the home-relative default so containers can mount a volume.
pub fn get_data_dir() -> AppResult<PathBuf> {
    let data_dir = match std::env::var(DATA_DIR_ENV) {
        Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
        _ => dirs::home_dir()
            .ok_or_else(|| AppError::Config("Failed to get user home directory".to_string()))?
            .join(DATA_DIR),
    };

    // Ensure directory exists
    if !data_dir.exists() {
        fs::create_dir_all(&data_dir)?;
    }

    Ok(data_dir)
}

/// Read a JSON document, returning None when the file does not exist
pub fn read_json<T: DeserializeOwned>(path: &Path) -> AppResult<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&content)?))
}

/// Write a JSON document (atomic write)
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> AppResult<()> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| AppError::Unknown(format!("Invalid state path: {:?}", path)))?;
    let temp_path = path.with_file_name(format!("{}.tmp", file_name));

    let content = serde_json::to_string_pretty(value)?;

    // Write to temp file
    fs::write(&temp_path, content)?;

    // Atomic rename
    fs::rename(temp_path, path)?;
    Ok(())
}
