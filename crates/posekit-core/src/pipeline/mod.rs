//! Composable transform pipeline.
//!
//! A pipeline is an ordered list of [`KeypointTransform`]s run by [`Compose`].
//! Each stage receives the [`TransformState`] of the run and the random
//! generator owned by the caller, which makes a run reproducible from a seed.
//!
//! ```ignore
//! let mut pipeline = Compose::default().with_expected_keypoints(18);
//! pipeline.push(RandomRotation::new(30.0)?);
//! pipeline.push(image_only(ColorJitter::new(0.25, 0.25, 0.25)?));
//! let out = pipeline.apply(sample, &mut TransformState::new(), &mut rng)?;
//! ```

mod compose;
mod geometric;
mod photometric;
pub mod random;
mod state;

pub use compose::{Compose, KeypointTransform};
pub use geometric::{
    CenterCrop, Crop, HorizontalFlip, Resize, ResizePad, ResizedCrop, Rotate, VerticalFlip,
};
pub use photometric::{
    adjust_brightness, adjust_contrast, adjust_saturation, image_only, ColorJitter, ImageOnly,
    PhotometricTransform,
};
pub use random::{
    blur_raster, GaussianBlur, RandomApply, RandomHorizontalFlip, RandomResizedCrop,
    RandomRotation,
};
pub use state::TransformState;
