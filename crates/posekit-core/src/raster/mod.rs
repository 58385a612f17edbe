//! RGB raster buffers and the pixel-level operations behind the transforms.
//!
//! This module provides:
//! - The `Raster` buffer type and conversions to/from `image::RgbImage`
//! - Decoding from bytes or files
//! - Exact, shorter-side and longer-side resizing
//!
//! All operations are synchronous and return new buffers.

mod io;
mod resize;
mod types;

pub use io::{decode_raster, load_raster};
pub use resize::{longer_side_dimensions, resize_raster, shorter_side_dimensions};
pub use types::{FilterType, Raster};
