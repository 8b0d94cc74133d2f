//! # cropscore-data
//!
//! Dataset adapter mapping scored image-crop annotations to training samples.
//!
//! This crate provides:
//! - [`ScoreDataset`] — resolves annotation rows to `(image, (score, weight))`
//!   samples, decoding `{id}_{serial}.jpg` crops on demand
//! - [`AnnotationTable`] — the in-memory CSV annotation table
//! - [`Dataset`] trait — indexable, length-reporting sample access
//! - [`collate`] — stacks samples into `[N, C, H, W]` / score / weight tensors
//! - [`DataLoader`] — batching, shuffling, parallel iteration over a Dataset
//! - [`Transform`] / [`TargetTransform`] — injectable preprocessing hooks,
//!   including [`ScoreNormalize`] for target standardization

pub mod annotations;
pub mod collate;
pub mod dataset;
pub mod error;
pub mod loader;
pub mod score_dataset;
pub mod transform;

pub use annotations::{Annotation, AnnotationTable};
pub use collate::{collate, Batch};
pub use dataset::{Dataset, Sample, ScoreLabel};
pub use error::{Error, Result};
pub use loader::{BatchIterator, DataLoader, LoaderConfig};
pub use score_dataset::{Phase, ScoreDataset, ScoreDatasetBuilder};
pub use transform::{Compose, ScoreNormalize, TargetTransform, Transform};
