pub mod config;
pub mod stats;
pub mod user;

pub use config::{AppConfig, UpstreamProxyConfig};
pub use stats::{DailyStats, StateSnapshot, UsageStats};
pub use user::{HistoryEntry, RateWindow, UserData};
