// collate — assemble fetched samples into one batch of tensors

use ndarray::{stack, Array1, Array4, ArrayView3, Axis};

use crate::dataset::Sample;
use crate::error::{Error, Result};

/// One mini-batch: stacked images plus the score and weight vectors.
///
/// `images` has shape `[N, C, H, W]`; `scores` and `weights` each have
/// length `N`, in the same order as the input samples.
#[derive(Debug, Clone)]
pub struct Batch {
    pub images: Array4<f32>,
    pub scores: Array1<f32>,
    pub weights: Array1<f32>,
}

impl Batch {
    /// Number of samples in the batch.
    pub fn len(&self) -> usize {
        self.images.shape()[0]
    }

    /// Whether the batch holds no samples.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Stack a sequence of samples into a [`Batch`].
///
/// Images are stacked along a new leading axis; the input order is
/// preserved exactly. All images must share identical dimensions — a
/// mismatch is a precondition violation reported as
/// [`Error::ShapeMismatch`], and an empty input as [`Error::EmptyBatch`].
pub fn collate(samples: &[Sample]) -> Result<Batch> {
    let first = samples.first().ok_or(Error::EmptyBatch)?;
    let expected = first.image.dim();
    for sample in &samples[1..] {
        let got = sample.image.dim();
        if got != expected {
            return Err(Error::ShapeMismatch {
                expected: [expected.0, expected.1, expected.2],
                got: [got.0, got.1, got.2],
            });
        }
    }

    let views: Vec<ArrayView3<f32>> = samples.iter().map(|s| s.image.view()).collect();
    let images = stack(Axis(0), &views).expect("same-shape images stack");
    let scores: Array1<f32> = samples.iter().map(|s| s.label.score).collect();
    let weights: Array1<f32> = samples.iter().map(|s| s.label.weight).collect();

    Ok(Batch {
        images,
        scores,
        weights,
    })
}

// Tests
