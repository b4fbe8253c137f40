use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Bot configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Bot API token issued by @BotFather
    #[serde(default)]
    pub bot_token: String,

    /// Telegram user id allowed to run /stats (None disables the command)
    #[serde(default)]
    pub admin_id: Option<i64>,

    #[serde(default = "default_max_images_per_day")]
    pub max_images_per_day: u32,

    /// Number of results kept per user for /history and inline mode
    #[serde(default = "default_history_size")]
    pub history_size: usize,

    /// Directory holding the bg_48.png / bg_96.png reference captures
    #[serde(default = "default_assets_dir")]
    pub assets_dir: PathBuf,

    /// Largest uncompressed size accepted for a single ZIP entry (bytes)
    #[serde(default = "default_max_zip_entry_bytes")]
    pub max_zip_entry_bytes: u64,

    /// How long to wait for the rest of an album before processing it
    #[serde(default = "default_media_group_delay_ms")]
    pub media_group_delay_ms: u64,

    /// Long-polling timeout passed to getUpdates (seconds)
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout: u64,

    /// HTTP request timeout (seconds), must exceed poll_timeout
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Interval between periodic state snapshots (seconds)
    #[serde(default = "default_save_interval")]
    pub save_interval_secs: u64,

    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    #[serde(default)]
    pub upstream_proxy: UpstreamProxyConfig,
}

/// Upstream proxy configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpstreamProxyConfig {
    pub enabled: bool,
    /// Proxy address (http://, https://, socks5://)
    pub url: String,
}

fn default_max_images_per_day() -> u32 {
    50
}

fn default_history_size() -> usize {
    10
}

fn default_assets_dir() -> PathBuf {
    PathBuf::from("assets")
}

fn default_max_zip_entry_bytes() -> u64 {
    50 * 1024 * 1024
}

fn default_media_group_delay_ms() -> u64 {
    1000
}

fn default_poll_timeout() -> u64 {
    30
}

fn default_request_timeout() -> u64 {
    120
}

fn default_save_interval() -> u64 {
    60
}

fn default_api_base_url() -> String {
    "https://api.telegram.org".to_string()
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            bot_token: String::new(),
            admin_id: None,
            max_images_per_day: default_max_images_per_day(),
            history_size: default_history_size(),
            assets_dir: default_assets_dir(),
            max_zip_entry_bytes: default_max_zip_entry_bytes(),
            media_group_delay_ms: default_media_group_delay_ms(),
            poll_timeout: default_poll_timeout(),
            request_timeout: default_request_timeout(),
            save_interval_secs: default_save_interval(),
            api_base_url: default_api_base_url(),
            upstream_proxy: UpstreamProxyConfig::default(),
        }
    }

    pub fn is_admin(&self, user_id: i64) -> bool {
        matches!(self.admin_id, Some(id) if id != 0 && id == user_id)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"bot_token":"123:abc","admin_id":42}"#).unwrap();
        assert_eq!(config.bot_token, "123:abc");
        assert_eq!(config.max_images_per_day, 50);
        assert_eq!(config.history_size, 10);
        assert_eq!(config.assets_dir, PathBuf::from("assets"));
        assert_eq!(config.max_zip_entry_bytes, 50 * 1024 * 1024);
        assert!(!config.upstream_proxy.enabled);
    }

    #[test]
    fn test_is_admin() {
        let mut config = AppConfig::new();
        assert!(!config.is_admin(42));
        config.admin_id = Some(0);
        assert!(!config.is_admin(0));
        config.admin_id = Some(42);
        assert!(config.is_admin(42));
        assert!(!config.is_admin(7));
    }
}
