//! Text formatting for /stats, /history and inline results

use chrono::{Local, NaiveDate, TimeZone};

use crate::models::UsageStats;

const BAR_WIDTH: f64 = 8.0;
const TOP_USERS: usize = 10;
const MAX_LABEL_CHARS: usize = 40;

/// 1234567 -> "1,234,567"
pub fn format_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Labels longer than 40 characters are cut to 37 plus "..."
pub fn truncate_label(label: &str) -> String {
    if label.chars().count() > MAX_LABEL_CHARS {
        let head: String = label.chars().take(MAX_LABEL_CHARS - 3).collect();
        format!("{}...", head)
    } else {
        label.to_string()
    }
}

/// Unix seconds -> "YYYY-MM-DD HH:MM" in local time
pub fn format_timestamp(ts: i64) -> String {
    match Local.timestamp_opt(ts, 0).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        None => String::new(),
    }
}

fn bar_len(count: u64, max: u64) -> usize {
    if max == 0 {
        return 0;
    }
    (count as f64 / max as f64 * BAR_WIDTH).round_ties_even() as usize
}

/// Plain-text admin report, to be wrapped in `<pre>`
pub fn format_stats_report(stats: &UsageStats, today: NaiveDate) -> String {
    let (today_images, today_users) = stats
        .day(today)
        .map(|d| (d.images, d.users.len()))
        .unwrap_or((0, 0));

    let mut lines = vec![
        "\u{1F4CA} Bot Statistics".to_string(),
        "\u{2500}".repeat(20),
        format!("Total images:  {}", format_thousands(stats.total_images)),
        format!("Unique users:  {}", format_thousands(stats.users.len() as u64)),
        format!(
            "Today:         {} images, {} users",
            today_images, today_users
        ),
        String::new(),
    ];

    let last_7 = stats.last_7_days(today);
    let max = last_7.iter().map(|(_, c)| *c).max().unwrap_or(0);
    if max > 0 {
        lines.push("Last 7 days:".to_string());
        for (date, count) in &last_7 {
            lines.push(format!(
                "  {}  {} {}",
                date.format("%b %d"),
                "\u{2588}".repeat(bar_len(*count, max)),
                count
            ));
        }
        lines.push(String::new());
    }

    let top = stats.top_users(TOP_USERS);
    if !top.is_empty() {
        lines.push("Top users (all-time):".to_string());
        for (rank, (user_id, count)) in top.iter().enumerate() {
            lines.push(format!(
                "  {}. #{}  \u{2192}  {} images",
                rank + 1,
                user_id,
                format_thousands(*count)
            ));
        }
    }

    lines.join("\n")
}

/// Minimal escaping for text placed inside HTML parse mode
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
