// bot module - update routing, handlers and shared state

pub mod handlers;
pub mod media_group;
pub mod polling;
pub mod report;
pub mod state;
pub mod tasks;

use std::path::PathBuf;
use std::sync::Arc;
use tracing::error;

use crate::models::AppConfig;
use crate::telegram::TelegramApi;
use crate::watermark::WatermarkRemover;
pub use media_group::MediaGroupBuffer;
pub use polling::Bot;
pub use state::BotState;
pub use tasks::TaskSet;

/// Everything a handler needs, cheap to clone into spawned tasks
#[derive(Clone)]
pub struct BotContext {
    pub api: Arc<dyn TelegramApi>,
    pub state: Arc<BotState>,
    pub remover: Arc<WatermarkRemover>,
    pub config: Arc<AppConfig>,
    pub media_groups: Arc<MediaGroupBuffer>,
    /// In-flight handlers and album flushes, drained on shutdown
    pub tasks: Arc<TaskSet>,
    /// Snapshot file; None keeps state in memory only
    pub state_path: Option<Arc<PathBuf>>,
}

impl BotContext {
    pub fn new(
        config: AppConfig,
        api: Arc<dyn TelegramApi>,
        remover: WatermarkRemover,
        state: BotState,
    ) -> Self {
        Self {
            api,
            state: Arc::new(state),
            remover: Arc::new(remover),
            config: Arc::new(config),
            media_groups: Arc::new(MediaGroupBuffer::new()),
            tasks: Arc::new(TaskSet::new()),
            state_path: None,
        }
    }

    pub fn with_state_path(mut self, path: PathBuf) -> Self {
        self.state_path = Some(Arc::new(path));
        self
    }

    /// Save the state if it changed; failures are logged and retried on the next call
    pub async fn persist(&self) {
        if let Some(path) = &self.state_path {
            if let Err(e) = self.state.save_if_dirty(path).await {
                error!("Failed to save state: {}", e);
            }
        }
    }
}
