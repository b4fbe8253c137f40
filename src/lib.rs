pub mod bot;
pub mod error;
pub mod models;
pub mod modules;
pub mod telegram;
mod utils;
pub mod watermark;

use std::sync::Arc;

use anyhow::Context;
use bot::{Bot, BotContext, BotState};
use modules::logger;
use telegram::TelegramClient;
use tracing::{error, info, warn};
use watermark::WatermarkRemover;

const STATE_FILE: &str = "state.json";

pub async fn run() -> anyhow::Result<()> {
    let data_dir = modules::get_data_dir().context("Failed to prepare data directory")?;
    // Keep the guard alive so buffered file logs get flushed on exit
    let _log_guard = logger::init_logger(&data_dir);

    let config = modules::load_app_config().context("Failed to load configuration")?;
    info!(
        "Starting bot (limit {} images/day, history {}, admin {})",
        config.max_images_per_day,
        config.history_size,
        if config.admin_id.is_some() { "set" } else { "unset" }
    );

    let remover = WatermarkRemover::new(config.assets_dir.clone());
    if let Err(e) = remover.preload() {
        // Maps are loaded lazily again on first use
        warn!("Failed to preload alpha maps: {}", e);
    }

    let state_path = data_dir.join(STATE_FILE);
    let state = BotState::load(&state_path, config.max_images_per_day, config.history_size)
        .context("Failed to load bot state")?;

    let api = Arc::new(TelegramClient::new(&config));
    let ctx = BotContext::new(config, api, remover, state).with_state_path(state_path);

    let (bot, handle) = Bot::start(ctx);

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutting down...");
    bot.stop();
    handle.await.context("Polling task panicked")?;
    info!("Bye");
    Ok(())
}
