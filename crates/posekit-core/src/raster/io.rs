//! Raster decoding through the `image` crate.

use std::io::Cursor;
use std::path::Path;

use image::ImageReader;

use super::Raster;
use crate::TransformError;

/// Decode an encoded image (PNG, JPEG) from bytes into an RGB raster.
///
/// # Errors
///
/// Returns `TransformError::Decode` if the format is unknown or the data is corrupted.
pub fn decode_raster(bytes: &[u8]) -> Result<Raster, TransformError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| TransformError::CorruptedImage(e.to_string()))?;
    let img = reader.decode()?;
    Ok(Raster::from_rgb_image(img.into_rgb8()))
}

/// Load an image file from disk into an RGB raster.
///
/// The format is guessed from the file contents, not the extension.
///
/// # Errors
///
/// Returns `TransformError::Decode` for unreadable or undecodable files.
pub fn load_raster(path: impl AsRef<Path>) -> Result<Raster, TransformError> {
    let bytes = std::fs::read(path).map_err(image::ImageError::IoError)?;
    decode_raster(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_png(width: u32, height: u32) -> Vec<u8> {
        let mut img = image::RgbImage::new(width, height);
        img.put_pixel(0, 0, image::Rgb([255, 0, 0]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_decode_valid_png() {
        let raster = decode_raster(&encode_png(3, 2)).unwrap();
        assert_eq!(raster.dimensions(), (3, 2));
        assert_eq!(raster.pixel(0, 0), [255, 0, 0]);
        assert_eq!(raster.pixel(2, 1), [0, 0, 0]);
    }

    #[test]
    fn test_decode_invalid_bytes() {
        let result = decode_raster(&[0x00, 0x01, 0x02, 0x03]);
        assert!(matches!(result, Err(TransformError::Decode(_))));
    }

    #[test]
    fn test_decode_empty_bytes() {
        assert!(decode_raster(&[]).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_raster("/nonexistent/posekit/image.png");
        assert!(matches!(
            result,
            Err(TransformError::Decode(image::ImageError::IoError(_)))
        ));
    }

    #[test]
    fn test_load_sniffs_format_from_contents() {
        let dir = tempfile::tempdir().unwrap();
        // PNG bytes behind a misleading extension
        let path = dir.path().join("frame.jpg");
        std::fs::write(&path, encode_png(4, 3)).unwrap();

        let raster = load_raster(&path).unwrap();

        assert_eq!(raster.dimensions(), (4, 3));
        assert_eq!(raster.pixel(0, 0), [255, 0, 0]);
    }
}
