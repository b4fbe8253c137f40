use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::UserData;

/// Days of per-day statistics kept around
pub const STATS_DAYS_KEPT: i64 = 30;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStats {
    pub images: u64,
    pub users: BTreeSet<i64>,
}

/// Global usage statistics shown to the admin
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsageStats {
    pub total_images: u64,
    pub users: BTreeSet<i64>,
    pub user_counts: HashMap<i64, u64>,
    pub daily: BTreeMap<NaiveDate, DailyStats>,
}

impl UsageStats {
    pub fn record(&mut self, today: NaiveDate, user_id: i64, count: u64) {
        self.total_images += count;
        self.users.insert(user_id);
        *self.user_counts.entry(user_id).or_insert(0) += count;

        let day = self.daily.entry(today).or_default();
        day.images += count;
        day.users.insert(user_id);

        let cutoff = today - Duration::days(STATS_DAYS_KEPT);
        self.daily.retain(|date, _| *date >= cutoff);
    }

    pub fn day(&self, date: NaiveDate) -> Option<&DailyStats> {
        self.daily.get(&date)
    }

    /// Image counts for the 7 days ending at `today`, oldest first
    pub fn last_7_days(&self, today: NaiveDate) -> Vec<(NaiveDate, u64)> {
        (0..7)
            .rev()
            .map(|i| {
                let date = today - Duration::days(i);
                (date, self.day(date).map(|d| d.images).unwrap_or(0))
            })
            .collect()
    }

    /// Users sorted by processed images, descending; ties keep the lower id first
    pub fn top_users(&self, limit: usize) -> Vec<(i64, u64)> {
        top_users(&self.user_counts, limit)
    }
}

pub fn top_users(user_counts: &HashMap<i64, u64>, limit: usize) -> Vec<(i64, u64)> {
    let mut top: Vec<(i64, u64)> = user_counts.iter().map(|(u, c)| (*u, *c)).collect();
    top.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    top.truncate(limit);
    top
}

/// Persisted form of the whole bot state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateSnapshot {
    #[serde(default)]
    pub users: HashMap<i64, UserData>,
    #[serde(default)]
    pub stats: UsageStats,
}
