//! PNG charts for /stats, drawn straight onto an `RgbImage` with a dark theme.

use chrono::NaiveDate;
use image::{Rgb, RgbImage};
use std::collections::HashMap;

use crate::error::AppResult;
use crate::models::stats::top_users;
use crate::models::UsageStats;
use crate::watermark::codec::encode_png;

const BG: Rgb<u8> = Rgb([0x1e, 0x1e, 0x2e]);
const FG: Rgb<u8> = Rgb([0xcd, 0xd6, 0xf4]);
const ACCENT: Rgb<u8> = Rgb([0x89, 0xb4, 0xfa]);
const ACCENT2: Rgb<u8> = Rgb([0xa6, 0xe3, 0xa1]);
const GRID: Rgb<u8> = Rgb([0x45, 0x47, 0x5a]);

// 8x5 inches at 150 dpi
const OVERVIEW_WIDTH: u32 = 1200;
const OVERVIEW_HEIGHT: u32 = 750;
const PX_PER_ROW: f64 = 150.0;
const GRID_LINES: u32 = 5;

#[derive(Debug, Clone, Copy)]
struct Rect {
    x0: u32,
    y0: u32,
    x1: u32,
    y1: u32,
}

impl Rect {
    fn width(&self) -> u32 {
        self.x1 - self.x0
    }

    fn height(&self) -> u32 {
        self.y1 - self.y0
    }
}

fn mix(a: Rgb<u8>, b: Rgb<u8>, alpha: f32) -> Rgb<u8> {
    let c = |i: usize| (a.0[i] as f32 * alpha + b.0[i] as f32 * (1.0 - alpha)).round() as u8;
    Rgb([c(0), c(1), c(2)])
}

fn fill_rect(img: &mut RgbImage, x0: u32, y0: u32, x1: u32, y1: u32, color: Rgb<u8>) {
    let x1 = x1.min(img.width());
    let y1 = y1.min(img.height());
    for y in y0..y1 {
        for x in x0..x1 {
            img.put_pixel(x, y, color);
        }
    }
}

fn dashed_hline(img: &mut RgbImage, y: u32, x0: u32, x1: u32, color: Rgb<u8>) {
    for x in (x0..x1).filter(|x| (x - x0) % 12 < 6) {
        img.put_pixel(x, y, color);
    }
}

fn dashed_vline(img: &mut RgbImage, x: u32, y0: u32, y1: u32, color: Rgb<u8>) {
    for y in (y0..y1).filter(|y| (y - y0) % 12 < 6) {
        img.put_pixel(x, y, color);
    }
}

/// Left and bottom spines plus a dashed value grid
fn draw_axes(img: &mut RgbImage, plot: Rect, horizontal_grid: bool) {
    let grid = mix(GRID, BG, 0.5);
    for i in 1..=GRID_LINES {
        if horizontal_grid {
            let y = plot.y1 - plot.height() * i / GRID_LINES;
            dashed_hline(img, y, plot.x0, plot.x1, grid);
        } else {
            let x = plot.x0 + plot.width() * i / GRID_LINES;
            dashed_vline(img, x, plot.y0, plot.y1, grid);
        }
    }
    fill_rect(img, plot.x0, plot.y1, plot.x1, plot.y1 + 2, GRID);
    fill_rect(img, plot.x0.saturating_sub(2), plot.y0, plot.x0, plot.y1 + 2, GRID);
}

fn scaled(value: u64, max: u64, span: u32) -> u32 {
    if max == 0 {
        return 0;
    }
    // Keep 10% headroom above the tallest bar
    (value as f64 / max as f64 * span as f64 * 0.9).round() as u32
}

/// 7-day bar chart with a summary panel of today's share below it
pub fn render_overview_chart(stats: &UsageStats, today: NaiveDate) -> AppResult<Vec<u8>> {
    let mut img = RgbImage::from_pixel(OVERVIEW_WIDTH, OVERVIEW_HEIGHT, BG);

    // Height ratio 3:1 between the bar chart and the summary panel
    let plot = Rect {
        x0: 90,
        y0: 60,
        x1: OVERVIEW_WIDTH - 40,
        y1: 540,
    };
    draw_axes(&mut img, plot, true);

    let week = stats.last_7_days(today);
    let max = week.iter().map(|(_, c)| *c).max().unwrap_or(0);
    let slot = plot.width() / week.len() as u32;
    let bar_width = slot * 6 / 10;
    for (i, (_, count)) in week.iter().enumerate() {
        let height = scaled(*count, max, plot.height());
        if height == 0 {
            continue;
        }
        let x0 = plot.x0 + slot * i as u32 + (slot - bar_width) / 2;
        fill_rect(&mut img, x0, plot.y1 - height, x0 + bar_width, plot.y1, ACCENT);
    }

    let panel = Rect {
        x0: 150,
        y0: 600,
        x1: OVERVIEW_WIDTH - 150,
        y1: 710,
    };
    fill_rect(&mut img, panel.x0, panel.y0, panel.x1, panel.y1, mix(GRID, BG, 0.6));

    // Two meters: today's images vs the busiest day, today's users vs all users
    let (today_images, today_users) = stats
        .day(today)
        .map(|d| (d.images, d.users.len() as u64))
        .unwrap_or((0, 0));
    let meter_span = panel.width() - 60;
    let meters = [
        (today_images, max, ACCENT),
        (today_users, stats.users.len() as u64, ACCENT2),
    ];
    for (i, (value, total, color)) in meters.into_iter().enumerate() {
        let y0 = panel.y0 + 25 + i as u32 * 40;
        fill_rect(&mut img, panel.x0 + 30, y0, panel.x1 - 30, y0 + 20, BG);
        let filled = if total == 0 {
            0
        } else {
            (value.min(total) as f64 / total as f64 * meter_span as f64).round() as u32
        };
        fill_rect(&mut img, panel.x0 + 30, y0, panel.x0 + 30 + filled, y0 + 20, color);
    }

    encode_png(&img)
}

/// Horizontal bars for the busiest users, top user first; None when nobody processed anything
pub fn render_top_users_chart(
    user_counts: &HashMap<i64, u64>,
    limit: usize,
) -> AppResult<Option<Vec<u8>>> {
    let top = top_users(user_counts, limit);
    if top.is_empty() {
        return Ok(None);
    }

    let rows = (0.5 * top.len() as f64 + 1.0).max(3.0);
    let height = (rows * PX_PER_ROW).round() as u32;
    let mut img = RgbImage::from_pixel(OVERVIEW_WIDTH, height, BG);

    let plot = Rect {
        x0: 180,
        y0: 60,
        x1: OVERVIEW_WIDTH - 60,
        y1: height - 70,
    };
    draw_axes(&mut img, plot, false);

    let max = top.first().map(|(_, c)| *c).unwrap_or(0);
    let slot = plot.height() / top.len() as u32;
    let bar_height = slot * 6 / 10;
    for (i, (_, count)) in top.iter().enumerate() {
        let width = scaled(*count, max, plot.width());
        let y0 = plot.y0 + slot * i as u32 + (slot - bar_height) / 2;
        fill_rect(&mut img, plot.x0, y0, plot.x0 + width, y0 + bar_height, ACCENT2);
        // Rank tick on the axis
        fill_rect(&mut img, plot.x0 - 14, y0 + bar_height / 2, plot.x0 - 4, y0 + bar_height / 2 + 2, FG);
    }

    Ok(Some(encode_png(&img)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::watermark::codec::decode;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 2, d).unwrap()
    }

    #[test]
    fn test_overview_dimensions_and_bars() {
        let mut stats = UsageStats::default();
        stats.record(day(10), 1, 10);

        let png = render_overview_chart(&stats, day(10)).unwrap();
        let img = decode(&png).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (OVERVIEW_WIDTH, OVERVIEW_HEIGHT));

        // Today's bar is the last slot, just above the baseline
        let slot = (OVERVIEW_WIDTH - 40 - 90) / 7;
        let x = 90 + slot * 6 + slot / 2;
        assert_eq!(*img.get_pixel(x, 530), ACCENT);
        // First slot has no images
        let x = 90 + slot / 2;
        assert_ne!(*img.get_pixel(x, 530), ACCENT);
    }

    #[test]
    fn test_overview_without_data() {
        let png = render_overview_chart(&UsageStats::default(), day(1)).unwrap();
        let img = decode(&png).unwrap().to_rgb8();
        assert!(img.pixels().all(|p| *p != ACCENT));
    }

    #[test]
    fn test_top_users_none_when_empty() {
        assert!(render_top_users_chart(&HashMap::new(), 10).unwrap().is_none());
    }

    #[test]
    fn test_top_users_none_when_limit_zero() {
        let counts: HashMap<i64, u64> = [(1, 5)].into_iter().collect();
        assert!(render_top_users_chart(&counts, 0).unwrap().is_none());
    }

    #[test]
    fn test_top_users_height_grows_with_rows() {
        let few: HashMap<i64, u64> = [(1, 5), (2, 3)].into_iter().collect();
        let many: HashMap<i64, u64> = (0..10).map(|i| (i, i as u64 + 1)).collect();

        let small = decode(&render_top_users_chart(&few, 10).unwrap().unwrap()).unwrap();
        let large = decode(&render_top_users_chart(&many, 10).unwrap().unwrap()).unwrap();
        assert_eq!(small.height(), 450);
        assert_eq!(large.height(), 900);
    }

    #[test]
    fn test_top_user_bar_is_longest() {
        let counts: HashMap<i64, u64> = [(1, 10), (2, 5)].into_iter().collect();
        let img = decode(&render_top_users_chart(&counts, 10).unwrap().unwrap())
            .unwrap()
            .to_rgb8();

        let row_y = |i: u32| {
            let plot_h = 450 - 70 - 60;
            let slot = plot_h / 2;
            60 + slot * i + slot / 2
        };
        let bar_end = |y: u32| (180..OVERVIEW_WIDTH).take_while(|x| *img.get_pixel(*x, y) == ACCENT2).count();
        assert!(bar_end(row_y(0)) > bar_end(row_y(1)));
        assert!(bar_end(row_y(1)) > 0);
    }
}
