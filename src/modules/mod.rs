pub mod charts;
pub mod config;
pub mod i18n;
pub mod logger;
pub mod storage;

pub use config::load_app_config;
pub use storage::get_data_dir;
