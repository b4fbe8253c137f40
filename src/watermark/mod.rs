//! Gemini watermark removal by reverse alpha blending.
//!
//! Gemini stamps a white logo into the bottom-right corner as
//! `out = alpha * 255 + (1 - alpha) * original`. Knowing alpha per pixel
//! (captured once against a black background) lets us solve for `original`.

pub mod alpha_map;
pub mod codec;

use dashmap::DashMap;
use image::{DynamicImage, RgbImage};
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::{AppError, AppResult};
pub use alpha_map::AlphaMap;

/// Ignore noise-level alpha
pub const ALPHA_THRESHOLD: f32 = 0.002;
/// Cap to avoid division by near-zero
pub const MAX_ALPHA: f32 = 0.99;
/// The logo is pure white
pub const LOGO_VALUE: f32 = 255.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatermarkConfig {
    pub logo_size: u32,
    pub margin_right: u32,
    pub margin_bottom: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatermarkPosition {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Large images (both sides over 1024px) carry the 96px logo, everything else the 48px one
pub fn detect_watermark_config(width: u32, height: u32) -> WatermarkConfig {
    if width > 1024 && height > 1024 {
        WatermarkConfig {
            logo_size: 96,
            margin_right: 64,
            margin_bottom: 64,
        }
    } else {
        WatermarkConfig {
            logo_size: 48,
            margin_right: 32,
            margin_bottom: 32,
        }
    }
}

/// Logo rectangle, or None when the image is too small to contain it
pub fn calculate_watermark_position(
    width: u32,
    height: u32,
    config: &WatermarkConfig,
) -> Option<WatermarkPosition> {
    let logo = config.logo_size;
    let x = width.checked_sub(config.margin_right + logo)?;
    let y = height.checked_sub(config.margin_bottom + logo)?;
    Some(WatermarkPosition {
        x,
        y,
        width: logo,
        height: logo,
    })
}

/// Undo the blend inside `pos` in place
pub fn apply_alpha_map(
    image: &mut RgbImage,
    pos: &WatermarkPosition,
    alpha_map: &AlphaMap,
) -> AppResult<()> {
    if alpha_map.width() < pos.width || alpha_map.height() < pos.height {
        return Err(AppError::Watermark(format!(
            "Alpha map {}x{} is smaller than the {}x{} watermark region",
            alpha_map.width(),
            alpha_map.height(),
            pos.width,
            pos.height
        )));
    }

    for dy in 0..pos.height {
        for dx in 0..pos.width {
            let alpha = alpha_map.get(dx, dy);
            if alpha < ALPHA_THRESHOLD {
                continue;
            }
            let alpha = alpha.min(MAX_ALPHA);
            let one_minus = 1.0 - alpha;

            let pixel = image.get_pixel_mut(pos.x + dx, pos.y + dy);
            for channel in pixel.0.iter_mut() {
                let restored = (*channel as f32 - alpha * LOGO_VALUE) / one_minus;
                *channel = restored.clamp(0.0, 255.0) as u8;
            }
        }
    }
    Ok(())
}

/// Removes the watermark, caching alpha maps per logo size
pub struct WatermarkRemover {
    assets_dir: PathBuf,
    alpha_maps: DashMap<u32, Arc<AlphaMap>>,
}

impl WatermarkRemover {
    pub fn new(assets_dir: PathBuf) -> Self {
        Self {
            assets_dir,
            alpha_maps: DashMap::new(),
        }
    }

    /// Seed the cache, bypassing the assets directory
    pub fn with_alpha_map(self, size: u32, alpha_map: AlphaMap) -> Self {
        self.alpha_maps.insert(size, Arc::new(alpha_map));
        self
    }

    pub fn alpha_map(&self, size: u32) -> AppResult<Arc<AlphaMap>> {
        if let Some(map) = self.alpha_maps.get(&size) {
            return Ok(map.value().clone());
        }
        let map = Arc::new(AlphaMap::load(&self.assets_dir, size)?);
        self.alpha_maps.insert(size, map.clone());
        Ok(map)
    }

    /// Check that both reference captures are readable
    pub fn preload(&self) -> AppResult<()> {
        for size in [48, 96] {
            self.alpha_map(size)?;
        }
        Ok(())
    }

    pub fn remove_watermark(&self, image: &DynamicImage) -> AppResult<RgbImage> {
        let mut rgb = image.to_rgb8();
        let (width, height) = rgb.dimensions();

        let config = detect_watermark_config(width, height);
        let Some(pos) = calculate_watermark_position(width, height, &config) else {
            tracing::warn!(
                "Image {}x{} is too small for a {}px watermark, returning it unchanged",
                width,
                height,
                config.logo_size
            );
            return Ok(rgb);
        };

        let alpha_map = self.alpha_map(config.logo_size)?;
        apply_alpha_map(&mut rgb, &pos, &alpha_map)?;
        Ok(rgb)
    }

    /// Decode, clean and hand back the RGB result
    pub fn clean_bytes(&self, bytes: &[u8]) -> AppResult<RgbImage> {
        let image = codec::decode(bytes)?;
        self.remove_watermark(&image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    /// Alpha map with a solid square logo in the middle
    fn square_alpha(size: u32, alpha: f32) -> AlphaMap {
        let quarter = size / 4;
        let values = (0..size * size)
            .map(|i| {
                let (x, y) = (i % size, i / size);
                let inside = (quarter..size - quarter).contains(&x)
                    && (quarter..size - quarter).contains(&y);
                if inside {
                    alpha
                } else {
                    0.0
                }
            })
            .collect();
        AlphaMap::from_values(size, size, values).unwrap()
    }

    /// Forward blend used to fake a watermarked image
    fn blend(
        image: &mut RgbImage,
        pos: &WatermarkPosition,
        alpha_map: &AlphaMap,
    ) {
        for dy in 0..pos.height {
            for dx in 0..pos.width {
                let a = alpha_map.get(dx, dy);
                let p = image.get_pixel_mut(pos.x + dx, pos.y + dy);
                for c in p.0.iter_mut() {
                    *c = (a * 255.0 + (1.0 - a) * *c as f32).round() as u8;
                }
            }
        }
    }

    #[test]
    fn test_detect_config_thresholds() {
        assert_eq!(detect_watermark_config(1024, 2048).logo_size, 48);
        assert_eq!(detect_watermark_config(2048, 1024).logo_size, 48);
        let large = detect_watermark_config(1025, 1025);
        assert_eq!(
            large,
            WatermarkConfig {
                logo_size: 96,
                margin_right: 64,
                margin_bottom: 64
            }
        );
    }

    #[test]
    fn test_position_bottom_right() {
        let config = detect_watermark_config(800, 600);
        let pos = calculate_watermark_position(800, 600, &config).unwrap();
        assert_eq!(
            pos,
            WatermarkPosition {
                x: 720,
                y: 520,
                width: 48,
                height: 48
            }
        );

        let config = detect_watermark_config(2048, 2048);
        let pos = calculate_watermark_position(2048, 2048, &config).unwrap();
        assert_eq!((pos.x, pos.y, pos.width), (1888, 1888, 96));
    }

    #[test]
    fn test_position_too_small() {
        let config = detect_watermark_config(79, 200);
        assert!(calculate_watermark_position(79, 200, &config).is_none());
        assert!(calculate_watermark_position(80, 80, &config).is_some());
    }

    #[test]
    fn test_removal_restores_original_pixels() {
        let original = RgbImage::from_fn(200, 150, |x, y| {
            Rgb([(x % 200) as u8, (y % 150) as u8, 90])
        });
        let alpha = square_alpha(48, 0.5);
        let pos = calculate_watermark_position(200, 150, &detect_watermark_config(200, 150))
            .unwrap();

        let mut stamped = original.clone();
        blend(&mut stamped, &pos, &alpha);
        assert_ne!(stamped, original);

        let remover = WatermarkRemover::new(PathBuf::from("/nonexistent")).with_alpha_map(48, alpha);
        let cleaned = remover
            .remove_watermark(&DynamicImage::ImageRgb8(stamped))
            .unwrap();

        for (a, b) in cleaned.pixels().zip(original.pixels()) {
            for c in 0..3 {
                assert!((a.0[c] as i16 - b.0[c] as i16).abs() <= 2);
            }
        }
    }

    #[test]
    fn test_below_threshold_pixels_untouched() {
        let mut image = RgbImage::from_pixel(100, 100, Rgb([200, 200, 200]));
        let pos = WatermarkPosition {
            x: 20,
            y: 20,
            width: 48,
            height: 48,
        };
        let alpha = AlphaMap::from_values(48, 48, vec![0.001; 48 * 48]).unwrap();
        apply_alpha_map(&mut image, &pos, &alpha).unwrap();
        assert!(image.pixels().all(|p| p.0 == [200, 200, 200]));
    }

    #[test]
    fn test_full_alpha_is_capped_and_clamped() {
        let mut image = RgbImage::from_pixel(100, 100, Rgb([255, 100, 0]));
        let pos = WatermarkPosition {
            x: 0,
            y: 0,
            width: 1,
            height: 1,
        };
        let alpha = AlphaMap::from_values(1, 1, vec![1.0]).unwrap();
        apply_alpha_map(&mut image, &pos, &alpha).unwrap();

        // alpha is capped at 0.99, so a saturated pixel stays near white
        // and anything darker than the logo clamps to 0
        let restored = image.get_pixel(0, 0).0;
        assert!(restored[0] >= 250);
        assert_eq!(&restored[1..], &[0, 0]);
        assert_eq!(image.get_pixel(1, 0).0, [255, 100, 0]);
    }

    #[test]
    fn test_small_alpha_map_is_error() {
        let mut image = RgbImage::new(100, 100);
        let pos = WatermarkPosition {
            x: 0,
            y: 0,
            width: 48,
            height: 48,
        };
        let alpha = AlphaMap::from_values(10, 10, vec![0.5; 100]).unwrap();
        assert!(apply_alpha_map(&mut image, &pos, &alpha).is_err());
    }

    #[test]
    fn test_tiny_image_returned_unchanged() {
        let image = RgbImage::from_pixel(40, 40, Rgb([1, 2, 3]));
        let remover = WatermarkRemover::new(PathBuf::from("/nonexistent"));
        let cleaned = remover
            .remove_watermark(&DynamicImage::ImageRgb8(image.clone()))
            .unwrap();
        assert_eq!(cleaned, image);
    }

    #[test]
    fn test_missing_assets_is_error() {
        let remover = WatermarkRemover::new(PathBuf::from("/nonexistent"));
        let image = DynamicImage::ImageRgb8(RgbImage::new(300, 300));
        assert!(matches!(
            remover.remove_watermark(&image),
            Err(AppError::Watermark(_))
        ));
    }

    #[test]
    fn test_rgba_input_converted() {
        let image = DynamicImage::new_rgba8(120, 120);
        let remover = WatermarkRemover::new(PathBuf::from("/nonexistent"))
            .with_alpha_map(48, square_alpha(48, 0.0));
        let cleaned = remover.remove_watermark(&image).unwrap();
        assert_eq!(cleaned.dimensions(), (120, 120));
    }
}
