use chrono::NaiveDate;
use dashmap::DashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

use crate::error::AppResult;
use crate::models::{HistoryEntry, StateSnapshot, UsageStats, UserData};
use crate::modules::storage::{read_json, write_json_atomic};

/// Local calendar day used for quotas and daily stats
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Per-user data and global statistics shared by all handlers
pub struct BotState {
    users: DashMap<i64, UserData>,
    stats: Mutex<UsageStats>,
    max_images_per_day: u32,
    history_size: usize,
    dirty: AtomicBool,
    // Held across snapshot and write so saves land in order and never share the tmp file
    save_lock: Mutex<()>,
}

impl BotState {
    pub fn new(max_images_per_day: u32, history_size: usize) -> Self {
        Self::from_snapshot(StateSnapshot::default(), max_images_per_day, history_size)
    }

    pub fn from_snapshot(snapshot: StateSnapshot, max_images_per_day: u32, history_size: usize) -> Self {
        let users = DashMap::new();
        for (user_id, mut data) in snapshot.users {
            // HISTORY_SIZE may have shrunk since the snapshot was written
            data.history.truncate(history_size);
            users.insert(user_id, data);
        }
        Self {
            users,
            stats: Mutex::new(snapshot.stats),
            max_images_per_day,
            history_size,
            dirty: AtomicBool::new(false),
            save_lock: Mutex::new(()),
        }
    }

    /// Load a snapshot written by `save`; a missing file starts empty
    pub fn load(path: &Path, max_images_per_day: u32, history_size: usize) -> AppResult<Self> {
        let snapshot = read_json::<StateSnapshot>(path)?.unwrap_or_default();
        tracing::info!(
            "Loaded state for {} users ({} images processed so far)",
            snapshot.users.len(),
            snapshot.stats.total_images
        );
        Ok(Self::from_snapshot(snapshot, max_images_per_day, history_size))
    }

    pub fn max_images_per_day(&self) -> u32 {
        self.max_images_per_day
    }

    /// Whether `count` more images fit into the user's daily quota, and how many remain
    pub fn check_rate_limit(&self, user_id: i64, count: u32) -> (bool, u32) {
        self.check_rate_limit_on(today(), user_id, count)
    }

    pub fn check_rate_limit_on(&self, date: NaiveDate, user_id: i64, count: u32) -> (bool, u32) {
        self.users
            .entry(user_id)
            .or_default()
            .check_rate(date, self.max_images_per_day, count)
    }

    pub fn increment_rate(&self, user_id: i64, count: u32) {
        self.increment_rate_on(today(), user_id, count)
    }

    pub fn increment_rate_on(&self, date: NaiveDate, user_id: i64, count: u32) {
        self.users
            .entry(user_id)
            .or_default()
            .increment_rate(date, count);
        self.mark_dirty();
    }

    pub fn add_to_history(&self, user_id: i64, entry: HistoryEntry) {
        self.users
            .entry(user_id)
            .or_default()
            .push_history(entry, self.history_size);
        self.mark_dirty();
    }

    pub fn get_history(&self, user_id: i64) -> Vec<HistoryEntry> {
        self.users
            .get(&user_id)
            .map(|u| u.history.clone())
            .unwrap_or_default()
    }

    pub async fn record_usage(&self, user_id: i64, count: u64) {
        self.record_usage_on(today(), user_id, count).await
    }

    pub async fn record_usage_on(&self, date: NaiveDate, user_id: i64, count: u64) {
        self.stats.lock().await.record(date, user_id, count);
        self.mark_dirty();
    }

    pub async fn stats(&self) -> UsageStats {
        self.stats.lock().await.clone()
    }

    pub async fn snapshot(&self) -> StateSnapshot {
        let users = self
            .users
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();
        StateSnapshot {
            users,
            stats: self.stats().await,
        }
    }

    fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::Release);
    }

    /// Persist if anything changed since the last save
    pub async fn save_if_dirty(&self, path: &Path) -> AppResult<bool> {
        if !self.dirty.swap(false, Ordering::AcqRel) {
            return Ok(false);
        }
        if let Err(e) = self.save(path).await {
            self.mark_dirty();
            return Err(e);
        }
        Ok(true)
    }

    pub async fn save(&self, path: &Path) -> AppResult<()> {
        let _guard = self.save_lock.lock().await;
        let snapshot = self.snapshot().await;
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || write_json_atomic(&path, &snapshot)).await??;
        tracing::debug!("State saved");
        Ok(())
    }
}
