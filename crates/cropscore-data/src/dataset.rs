// Dataset trait — indexed access to (image, label) samples

use ndarray::Array3;

use crate::error::Result;

/// The regression target attached to one crop: a score and a loss weight.
///
/// The weight is `1.0` whenever the dataset was built without weighting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreLabel {
    pub score: f32,
    pub weight: f32,
}

/// A single sample: a decoded image paired with its label.
///
/// The image is stored in `[C, H, W]` layout with three RGB channels and
/// pixel values scaled to `[0, 1]`, unless an image transform produced a
/// different representation.
#[derive(Debug, Clone)]
pub struct Sample {
    pub image: Array3<f32>,
    pub label: ScoreLabel,
}

/// An indexed collection of samples.
///
/// Implementations must be `Send + Sync` so an external loading harness can
/// fetch from multiple worker threads against the same dataset. Per-sample
/// failures (a corrupt or missing image file) surface as errors from
/// [`get`](Dataset::get) and are never retried or suppressed here; the
/// caller decides retry/skip policy.
pub trait Dataset: Send + Sync {
    /// Total number of samples in the dataset.
    fn len(&self) -> usize;

    /// Whether the dataset is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Retrieve the sample at position `index`.
    ///
    /// Fails with [`Error::IndexOutOfRange`](crate::Error::IndexOutOfRange)
    /// when `index >= self.len()` and with
    /// [`Error::ImageDecode`](crate::Error::ImageDecode) when the backing
    /// image file is unreadable or corrupt.
    fn get(&self, index: usize) -> Result<Sample>;

    /// Optional human-readable name.
    fn name(&self) -> &str {
        "dataset"
    }
}
