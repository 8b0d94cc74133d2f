// Transform — image and target extension points

use ndarray::Array3;

use crate::error::{Error, Result};

/// A transform applied to the decoded image before it is returned.
///
/// The dataset applies no transform by default; this is the plug-in point
/// for resizing, cropping and augmentation pipelines owned by the caller.
pub trait Transform: Send + Sync {
    /// Apply the transform, returning the modified image.
    fn apply(&self, image: Array3<f32>) -> Array3<f32>;
}

/// Any plain function over the image is a transform.
impl<F> Transform for F
where
    F: Fn(Array3<f32>) -> Array3<f32> + Send + Sync,
{
    fn apply(&self, image: Array3<f32>) -> Array3<f32> {
        self(image)
    }
}

/// Chain multiple transforms, applied in order.
pub struct Compose {
    transforms: Vec<Box<dyn Transform>>,
}

impl Compose {
    pub fn new(transforms: Vec<Box<dyn Transform>>) -> Self {
        Self { transforms }
    }
}

impl Transform for Compose {
    fn apply(&self, mut image: Array3<f32>) -> Array3<f32> {
        for t in &self.transforms {
            image = t.apply(image);
        }
        image
    }
}

/// A transform applied to the `(score, weight)` label pair.
pub trait TargetTransform: Send + Sync {
    /// Apply the transform, returning the modified pair.
    fn apply(&self, score: f32, weight: f32) -> (f32, f32);
}

/// Any plain function over the label pair is a target transform.
impl<F> TargetTransform for F
where
    F: Fn(f32, f32) -> (f32, f32) + Send + Sync,
{
    fn apply(&self, score: f32, weight: f32) -> (f32, f32) {
        self(score, weight)
    }
}

/// Standardize the score to zero mean and unit variance, leaving the
/// weight untouched.
///
/// The `(mean, std)` pair comes from the caller (computed over the training
/// split); a zero std is rejected at construction since the division would
/// be undefined.
#[derive(Debug, Clone, Copy)]
pub struct ScoreNormalize {
    mean: f32,
    std: f32,
}

impl ScoreNormalize {
    /// Create a normalizer. Fails with [`Error::ZeroStd`] when `std == 0.0`.
    pub fn new(mean: f32, std: f32) -> Result<Self> {
        if std == 0.0 {
            return Err(Error::ZeroStd);
        }
        Ok(Self { mean, std })
    }

    /// Invert the normalization: `score * std + mean`.
    pub fn denormalize(&self, score: f32) -> f32 {
        score * self.std + self.mean
    }
}

impl TargetTransform for ScoreNormalize {
    fn apply(&self, score: f32, weight: f32) -> (f32, f32) {
        ((score - self.mean) / self.std, weight)
    }
}

// Tests
