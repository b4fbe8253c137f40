// Rate limiter for message edits
// Telegram throttles frequent edits of the same chat, so keep a minimum gap per chat

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{sleep, Duration, Instant};

pub struct RateLimiter {
    min_interval: Duration,
    last_call: Arc<Mutex<Option<Instant>>>,
}

impl RateLimiter {
    pub fn new(min_interval_ms: u64) -> Self {
        Self {
            min_interval: Duration::from_millis(min_interval_ms),
            last_call: Arc::new(Mutex::new(None)),
        }
    }

    pub async fn wait(&self) {
        let mut last = self.last_call.lock().await;
        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }

    /// True once the last call is at least `idle` ago; busy or unused limiters are not idle
    fn idle_for(&self, idle: Duration) -> bool {
        match self.last_call.try_lock() {
            Ok(last) => (*last).map(|t| t.elapsed() >= idle).unwrap_or(false),
            Err(_) => false,
        }
    }
}

const IDLE_EVICT_AFTER: Duration = Duration::from_secs(60);

/// One limiter per chat, dropped once the chat has been quiet for a while
pub struct ChatRateLimiter {
    min_interval_ms: u64,
    idle_after: Duration,
    chats: DashMap<i64, Arc<RateLimiter>>,
}

impl ChatRateLimiter {
    pub fn new(min_interval_ms: u64) -> Self {
        Self::with_idle_after(min_interval_ms, IDLE_EVICT_AFTER)
    }

    pub fn with_idle_after(min_interval_ms: u64, idle_after: Duration) -> Self {
        Self {
            min_interval_ms,
            // Never evict a limiter that could still delay its next call
            idle_after: idle_after.max(Duration::from_millis(min_interval_ms)),
            chats: DashMap::new(),
        }
    }

    pub fn tracked_chats(&self) -> usize {
        self.chats.len()
    }

    pub async fn wait(&self, chat_id: i64) {
        self.chats
            .retain(|_, limiter| !limiter.idle_for(self.idle_after));
        let limiter = self
            .chats
            .entry(chat_id)
            .or_insert_with(|| Arc::new(RateLimiter::new(self.min_interval_ms)))
            .clone();
        limiter.wait().await;
    }
}
