//! The transform trait and sequential composition.

use log::debug;
use rand::RngCore;

use super::TransformState;
use crate::keypoint::LabeledImage;
use crate::TransformError;

/// A transform over an (image, keypoints) pair.
///
/// Implementations hold no interior mutability and draw randomness only from
/// `rng`, so one instance can be shared across threads as long as each caller
/// brings its own generator.
pub trait KeypointTransform: Send + Sync {
    /// Apply the transform, updating `state` for any geometry change.
    fn apply(
        &self,
        input: LabeledImage,
        state: &mut TransformState,
        rng: &mut dyn RngCore,
    ) -> Result<LabeledImage, TransformError>;

    /// Name used in log messages.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// An ordered list of transforms applied one after another.
///
/// The first error aborts the run; no partial result is returned.
#[derive(Default)]
pub struct Compose {
    transforms: Vec<Box<dyn KeypointTransform>>,
    expected_keypoints: Option<usize>,
}

impl Compose {
    pub fn new(transforms: Vec<Box<dyn KeypointTransform>>) -> Self {
        Self {
            transforms,
            expected_keypoints: None,
        }
    }

    /// Check the keypoint count on input and after every step.
    pub fn with_expected_keypoints(mut self, count: usize) -> Self {
        self.expected_keypoints = Some(count);
        self
    }

    /// Append a transform to the end of the pipeline.
    pub fn push(&mut self, transform: impl KeypointTransform + 'static) {
        self.transforms.push(Box::new(transform));
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// Run every transform in order, feeding each output into the next.
    pub fn apply(
        &self,
        input: LabeledImage,
        state: &mut TransformState,
        rng: &mut dyn RngCore,
    ) -> Result<LabeledImage, TransformError> {
        if let Some(expected) = self.expected_keypoints {
            input.ensure_keypoint_count(expected)?;
        }
        state.record_size(&input.image);

        let mut current = input;
        for (step, transform) in self.transforms.iter().enumerate() {
            current = transform.apply(current, state, rng).inspect_err(|err| {
                debug!("pipeline step {} ({}) failed: {}", step, transform.name(), err);
            })?;

            if let Some(expected) = self.expected_keypoints {
                current.ensure_keypoint_count(expected)?;
            }
        }

        Ok(current)
    }
}

impl std::fmt::Debug for Compose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.transforms.iter().map(|t| t.name()).collect();
        f.debug_struct("Compose")
            .field("transforms", &names)
            .field("expected_keypoints", &self.expected_keypoints)
            .finish()
    }
}

impl KeypointTransform for Compose {
    fn apply(
        &self,
        input: LabeledImage,
        state: &mut TransformState,
        rng: &mut dyn RngCore,
    ) -> Result<LabeledImage, TransformError> {
        Compose::apply(self, input, state, rng)
    }

    fn name(&self) -> &'static str {
        "Compose"
    }
}
