use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, RgbImage};
use std::io::Cursor;

use crate::error::AppResult;

/// Preview quality for the compressed photo reply
pub const PREVIEW_JPEG_QUALITY: u8 = 85;
/// Quality for JPEG entries re-encoded inside archives
pub const ARCHIVE_JPEG_QUALITY: u8 = 75;

/// Output format used for a cleaned archive entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Jpeg,
}

impl OutputFormat {
    /// `.png` stays PNG, everything else is written as JPEG
    pub fn for_file_name(name: &str) -> Self {
        match extension(name).as_deref() {
            Some("png") => OutputFormat::Png,
            _ => OutputFormat::Jpeg,
        }
    }
}

/// Lowercased extension without the dot
pub fn extension(name: &str) -> Option<String> {
    let file = name.rsplit('/').next().unwrap_or(name);
    let (stem, ext) = file.rsplit_once('.')?;
    if stem.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

pub fn decode(bytes: &[u8]) -> AppResult<DynamicImage> {
    Ok(image::load_from_memory(bytes)?)
}

pub fn encode_png(image: &RgbImage) -> AppResult<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, ImageFormat::Png)?;
    Ok(buf.into_inner())
}

pub fn encode_jpeg(image: &RgbImage, quality: u8) -> AppResult<Vec<u8>> {
    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buf, quality);
    image.write_with_encoder(encoder)?;
    Ok(buf)
}

pub fn encode(image: &RgbImage, format: OutputFormat) -> AppResult<Vec<u8>> {
    match format {
        OutputFormat::Png => encode_png(image),
        OutputFormat::Jpeg => encode_jpeg(image, ARCHIVE_JPEG_QUALITY),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension() {
        assert_eq!(extension("a/b/Photo.JPG").as_deref(), Some("jpg"));
        assert_eq!(extension("image.tar.png").as_deref(), Some("png"));
        assert_eq!(extension("README"), None);
        assert_eq!(extension("dir.d/.hidden"), None);
    }

    #[test]
    fn test_output_format_for_file_name() {
        assert_eq!(OutputFormat::for_file_name("x.PNG"), OutputFormat::Png);
        assert_eq!(OutputFormat::for_file_name("x.webp"), OutputFormat::Jpeg);
        assert_eq!(OutputFormat::for_file_name("x.jpeg"), OutputFormat::Jpeg);
    }

    #[test]
    fn test_png_is_lossless() {
        let image = RgbImage::from_fn(5, 4, |x, y| image::Rgb([x as u8 * 40, y as u8 * 50, 7]));
        let bytes = encode_png(&image).unwrap();
        assert_eq!(decode(&bytes).unwrap().to_rgb8(), image);
    }

    #[test]
    fn test_jpeg_has_magic_bytes() {
        let image = RgbImage::new(8, 8);
        let bytes = encode_jpeg(&image, PREVIEW_JPEG_QUALITY).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(decode(b"definitely not an image").is_err());
    }
}
