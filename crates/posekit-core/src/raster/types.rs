//! Core raster types.

use serde::{Deserialize, Serialize};

use crate::TransformError;

/// Filter type for resampling operations (resize and rotation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterType {
    /// Nearest neighbor interpolation (fastest, lowest quality).
    Nearest,
    /// Bilinear interpolation (fast, acceptable quality).
    #[default]
    Bilinear,
    /// Lanczos3 interpolation (slower, highest quality).
    Lanczos3,
}

impl FilterType {
    /// Convert to the image crate's FilterType.
    pub fn to_image_filter(self) -> image::imageops::FilterType {
        match self {
            FilterType::Nearest => image::imageops::FilterType::Nearest,
            FilterType::Bilinear => image::imageops::FilterType::Triangle,
            FilterType::Lanczos3 => image::imageops::FilterType::Lanczos3,
        }
    }
}

/// An RGB raster buffer.
///
/// Transforms never mutate a raster in place; every operation returns a new
/// buffer bound to its own size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// RGB pixel data in row-major order (3 bytes per pixel).
    /// Length should be width * height * 3.
    pub pixels: Vec<u8>,
}

impl Raster {
    /// Create a new Raster with the given dimensions and pixel data.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            (width * height * 3) as usize,
            "Pixel buffer size mismatch"
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Create a raster filled with a single color.
    pub fn filled(width: u32, height: u32, color: [u8; 3]) -> Self {
        let pixels = color
            .iter()
            .copied()
            .cycle()
            .take((width * height * 3) as usize)
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Create a Raster from an image::RgbImage.
    pub fn from_rgb_image(img: image::RgbImage) -> Self {
        let (width, height) = img.dimensions();
        let pixels = img.into_raw();
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Convert to an image::RgbImage for processing with `imageops`.
    pub fn to_rgb_image(&self) -> Result<image::RgbImage, TransformError> {
        image::RgbImage::from_raw(self.width, self.height, self.pixels.clone()).ok_or_else(|| {
            TransformError::CorruptedImage(format!(
                "{} bytes do not describe a {}x{} RGB image",
                self.pixels.len(),
                self.width,
                self.height
            ))
        })
    }

    /// (width, height) of the raster.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Read the pixel at (x, y). Panics when out of bounds.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let idx = ((y * self.width + x) * 3) as usize;
        [self.pixels[idx], self.pixels[idx + 1], self.pixels[idx + 2]]
    }

    /// Write the pixel at (x, y). Panics when out of bounds.
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, value: [u8; 3]) {
        let idx = ((y * self.width + x) * 3) as usize;
        self.pixels[idx..idx + 3].copy_from_slice(&value);
    }

    /// Get the total number of pixels.
    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }

    /// Check if this is an empty/invalid image.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }

    /// Verify that the buffer length matches the declared dimensions.
    pub fn validate(&self) -> Result<(), TransformError> {
        let expected = self.width as usize * self.height as usize * 3;
        if self.pixels.len() != expected {
            return Err(TransformError::CorruptedImage(format!(
                "expected {} bytes for a {}x{} raster, found {}",
                expected,
                self.width,
                self.height,
                self.pixels.len()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_type_conversion() {
        assert!(matches!(
            FilterType::Nearest.to_image_filter(),
            image::imageops::FilterType::Nearest
        ));
        assert!(matches!(
            FilterType::Bilinear.to_image_filter(),
            image::imageops::FilterType::Triangle
        ));
        assert!(matches!(
            FilterType::Lanczos3.to_image_filter(),
            image::imageops::FilterType::Lanczos3
        ));
    }

    #[test]
    fn test_raster_creation() {
        let pixels = vec![0u8; 100 * 50 * 3];
        let img = Raster::new(100, 50, pixels);

        assert_eq!(img.dimensions(), (100, 50));
        assert_eq!(img.pixel_count(), 5000);
        assert!(!img.is_empty());
    }

    #[test]
    fn test_raster_empty() {
        let img = Raster::new(0, 0, vec![]);
        assert!(img.is_empty());
    }

    #[test]
    fn test_filled_and_pixel_access() {
        let mut img = Raster::filled(3, 2, [10, 20, 30]);
        assert_eq!(img.pixels.len(), 18);
        assert_eq!(img.pixel(2, 1), [10, 20, 30]);

        img.set_pixel(1, 0, [1, 2, 3]);
        assert_eq!(img.pixel(1, 0), [1, 2, 3]);
        assert_eq!(img.pixel(0, 0), [10, 20, 30]);
    }

    #[test]
    fn test_rgb_image_roundtrip() {
        let img = Raster::filled(4, 3, [5, 6, 7]);
        let rgb = img.to_rgb_image().unwrap();
        assert_eq!(rgb.dimensions(), (4, 3));
        assert_eq!(Raster::from_rgb_image(rgb), img);
    }

    #[test]
    fn test_to_rgb_image_rejects_bad_buffer() {
        let img = Raster {
            width: 4,
            height: 4,
            pixels: vec![0; 5],
        };
        assert!(matches!(
            img.to_rgb_image(),
            Err(TransformError::CorruptedImage(_))
        ));
        assert!(img.validate().is_err());
        assert!(Raster::filled(2, 2, [0, 0, 0]).validate().is_ok());
    }
}
