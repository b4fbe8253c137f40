use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A processed result the user can fetch again
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Telegram file_id of the cleaned document
    pub file_id: String,
    pub filename: String,
    pub timestamp: i64, // Unix seconds
    pub original_name: String,
}

impl HistoryEntry {
    /// Name shown to the user, falling back to the output filename
    pub fn display_name(&self) -> &str {
        if self.original_name.is_empty() {
            &self.filename
        } else {
            &self.original_name
        }
    }
}

/// Per-day image counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateWindow {
    pub date: NaiveDate,
    pub count: u32,
}

/// Everything the bot remembers about a single user
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserData {
    #[serde(default)]
    pub rate: Option<RateWindow>,
    /// Newest first
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

impl UserData {
    /// Current window, reset when the stored date is not `today`
    fn window(&mut self, today: NaiveDate) -> &mut RateWindow {
        let rate = self.rate.get_or_insert(RateWindow {
            date: today,
            count: 0,
        });
        if rate.date != today {
            *rate = RateWindow {
                date: today,
                count: 0,
            };
        }
        rate
    }

    /// Returns whether `count` more images fit into today's quota, and how many are left
    pub fn check_rate(&mut self, today: NaiveDate, limit: u32, count: u32) -> (bool, u32) {
        let used = self.window(today).count;
        let remaining = limit.saturating_sub(used);
        (count <= remaining, remaining)
    }

    pub fn increment_rate(&mut self, today: NaiveDate, count: u32) {
        let window = self.window(today);
        window.count = window.count.saturating_add(count);
    }

    pub fn push_history(&mut self, entry: HistoryEntry, cap: usize) {
        self.history.insert(0, entry);
        self.history.truncate(cap);
    }
}
