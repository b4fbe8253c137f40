use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

use super::handlers;
use super::BotContext;

const ERROR_BACKOFF: Duration = Duration::from_secs(5);
// How long in-flight handlers get to finish after stop
const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

/// Long-polling loop handle
pub struct Bot {
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl Bot {
    /// Start polling getUpdates in a new task.
    ///
    /// Each update is handled on its own task; stopping waits for those tasks
    /// (up to a grace period) before the final save. When the context has a state path the
    /// state is saved every `save_interval_secs` if it changed, and once more on shutdown.
    pub fn start(ctx: BotContext) -> (Self, tokio::task::JoinHandle<()>) {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        let bot = Self {
            shutdown_tx: Some(shutdown_tx),
        };

        let handle = tokio::spawn(async move {
            let mut offset: i64 = 0;
            let mut save_tick =
                tokio::time::interval(Duration::from_secs(ctx.config.save_interval_secs.max(1)));
            save_tick.tick().await;

            info!("Bot started polling for updates");
            loop {
                tokio::select! {
                    res = ctx.api.get_updates(offset, ctx.config.poll_timeout) => {
                        match res {
                            Ok(updates) => {
                                for update in updates {
                                    offset = offset.max(update.update_id + 1);
                                    let task_ctx = ctx.clone();
                                    ctx.tasks.spawn(async move {
                                        handlers::dispatch(&task_ctx, update).await;
                                    });
                                }
                            }
                            Err(e) => {
                                warn!("getUpdates failed: {}, retrying in {:?}", e, ERROR_BACKOFF);
                                tokio::select! {
                                    _ = tokio::time::sleep(ERROR_BACKOFF) => {}
                                    _ = &mut shutdown_rx => break,
                                }
                            }
                        }
                    }
                    _ = save_tick.tick() => {
                        debug!("Periodic state save");
                        ctx.persist().await;
                    }
                    _ = &mut shutdown_rx => break,
                }
            }

            info!("Bot stopped polling, waiting for {} handler tasks", ctx.tasks.len());
            if !ctx.tasks.drain(SHUTDOWN_GRACE).await {
                warn!("Some handlers did not finish within {:?}", SHUTDOWN_GRACE);
            }
            if let Some(path) = &ctx.state_path {
                if let Err(e) = ctx.state.save(path).await {
                    error!("Failed to save state on shutdown: {}", e);
                }
            }
        });

        (bot, handle)
    }

    pub fn stop(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
