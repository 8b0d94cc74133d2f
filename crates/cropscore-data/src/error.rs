use std::path::PathBuf;

/// All errors that can occur within cropscore-data.
///
/// One enum covers every failure mode: annotation I/O and parsing at
/// construction time, per-sample image decoding, index contract violations,
/// and shape mismatches at collation. Using a single error type across the
/// library simplifies error propagation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The annotation file could not be read.
    #[error("failed to read annotation file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The annotation file could not be parsed as CSV.
    #[error("malformed annotation file {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A required column is missing from the annotation file header.
    #[error("annotation file {} has no `{column}` column", path.display())]
    MissingColumn { path: PathBuf, column: &'static str },

    /// A row in a weighted annotation file has an empty `weight` cell.
    #[error("annotation file {}: row {row} has no weight value", path.display())]
    MissingWeight { path: PathBuf, row: usize },

    /// An image file could not be opened or decoded.
    #[error("failed to decode image {}: {source}", path.display())]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Index out of range for the dataset length.
    #[error("index {index} out of range for dataset of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// Images with different dimensions cannot be stacked into one batch.
    #[error("cannot stack image of shape {got:?} into a batch of {expected:?} images")]
    ShapeMismatch {
        expected: [usize; 3],
        got: [usize; 3],
    },

    /// Collation requires at least one sample.
    #[error("cannot collate an empty batch")]
    EmptyBatch,

    /// Score normalization with a zero standard deviation is undefined.
    #[error("normalization std must be non-zero")]
    ZeroStd,
}

pub type Result<T> = std::result::Result<T, Error>;
