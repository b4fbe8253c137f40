use image::RgbImage;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Per-pixel watermark opacity, row-major, values in [0, 1]
#[derive(Debug, Clone, PartialEq)]
pub struct AlphaMap {
    width: u32,
    height: u32,
    values: Vec<f32>,
}

impl AlphaMap {
    /// Derive an alpha map from a capture of the watermark over pure black.
    ///
    /// Blending white over black gives `pixel = alpha * 255`, so
    /// `alpha = max(R, G, B) / 255`.
    pub fn from_reference(reference: &RgbImage) -> Self {
        let values = reference
            .pixels()
            .map(|p| p.0.iter().copied().max().unwrap_or(0) as f32 / 255.0)
            .collect();
        Self {
            width: reference.width(),
            height: reference.height(),
            values,
        }
    }

    /// Build from raw values (row-major)
    pub fn from_values(width: u32, height: u32, values: Vec<f32>) -> AppResult<Self> {
        if values.len() != (width as usize) * (height as usize) {
            return Err(AppError::Watermark(format!(
                "Alpha map of {}x{} needs {} values, got {}",
                width,
                height,
                width * height,
                values.len()
            )));
        }
        Ok(Self {
            width,
            height,
            values,
        })
    }

    pub fn reference_path(assets_dir: &Path, size: u32) -> PathBuf {
        assets_dir.join(format!("bg_{}.png", size))
    }

    /// Load `bg_{size}.png` from the assets directory
    pub fn load(assets_dir: &Path, size: u32) -> AppResult<Self> {
        let path = Self::reference_path(assets_dir, size);
        let reference = image::open(&path)
            .map_err(|e| {
                AppError::Watermark(format!("Failed to load alpha reference {:?}: {}", path, e))
            })?
            .to_rgb8();
        tracing::info!(
            "Loaded alpha map {:?} ({}x{})",
            path,
            reference.width(),
            reference.height()
        );
        Ok(Self::from_reference(&reference))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.values[(y as usize) * (self.width as usize) + x as usize]
    }
}
