// ScoreDataset — maps scored crop annotations to (image, label) samples
//
// Expected filesystem layout:
//
//   root/
//     crop/                        <- crop_set
//       7_0.jpg                    <- {id}_{serial}.jpg
//       7_1.jpg
//       ...
//     score-1_train.csv            <- {split_name}_{phase}.csv
//     score-1_weight_train.csv     <- weighted variant, train phase only
//     score-1_test.csv

use std::fmt;
use std::path::{Path, PathBuf};

use log::debug;
use ndarray::Array3;

use crate::annotations::{Annotation, AnnotationTable};
use crate::dataset::{Dataset, Sample, ScoreLabel};
use crate::error::{Error, Result};
use crate::transform::{TargetTransform, Transform};

/// Which split role the dataset serves.
///
/// The lowercase name is part of the annotation file name, e.g.
/// `score-1_train.csv`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Train,
    Val,
    Test,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Train => "train",
            Phase::Val => "val",
            Phase::Test => "test",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ScoreDatasetBuilder

/// Builder for [`ScoreDataset`].
pub struct ScoreDatasetBuilder {
    root: PathBuf,
    crop_set: String,
    split_name: String,
    phase: Phase,
    weighted: bool,
    transform: Option<Box<dyn Transform>>,
    target_transform: Option<Box<dyn TargetTransform>>,
}

impl ScoreDatasetBuilder {
    /// Create a builder rooted at the given directory.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            crop_set: "crop".to_string(),
            split_name: "score-1".to_string(),
            phase: Phase::Train,
            weighted: false,
            transform: None,
            target_transform: None,
        }
    }

    /// Subdirectory of `root` holding the crop images (default: `crop`).
    pub fn crop_set(mut self, name: &str) -> Self {
        self.crop_set = name.to_string();
        self
    }

    /// Annotation split name (default: `score-1`).
    pub fn split_name(mut self, name: &str) -> Self {
        self.split_name = name.to_string();
        self
    }

    /// Split role (default: [`Phase::Train`]).
    pub fn phase(mut self, phase: Phase) -> Self {
        self.phase = phase;
        self
    }

    /// Read per-sample loss weights from the annotation file (default: off).
    ///
    /// Only the train phase has a dedicated weighted annotation file; in
    /// other phases the flag selects the regular file but still reads the
    /// `weight` column.
    pub fn weighted(mut self, yes: bool) -> Self {
        self.weighted = yes;
        self
    }

    /// Image transform applied to every decoded image.
    pub fn transform(mut self, t: Box<dyn Transform>) -> Self {
        self.transform = Some(t);
        self
    }

    /// Target transform applied to every `(score, weight)` pair.
    pub fn target_transform(mut self, t: Box<dyn TargetTransform>) -> Self {
        self.target_transform = Some(t);
        self
    }

    /// The annotation file name this configuration resolves to.
    ///
    /// The weighted variant exists for the train phase only.
    fn annotation_file_name(&self) -> String {
        if self.phase == Phase::Train && self.weighted {
            format!("{}_weight_{}.csv", self.split_name, self.phase)
        } else {
            format!("{}_{}.csv", self.split_name, self.phase)
        }
    }

    /// Load the annotation table and build the dataset.
    ///
    /// Fails fast on a missing or malformed annotation file; images are not
    /// touched until [`Dataset::get`].
    pub fn build(self) -> Result<ScoreDataset> {
        let img_dir = self.root.join(&self.crop_set);
        let anno_file = self.root.join(self.annotation_file_name());

        let table = AnnotationTable::from_path(&anno_file, self.weighted)?;
        debug!(
            "loaded {} annotation rows from {}",
            table.len(),
            anno_file.display()
        );

        Ok(ScoreDataset {
            img_dir,
            anno_file,
            table,
            phase: self.phase,
            weighted: self.weighted,
            transform: self.transform,
            target_transform: self.target_transform,
        })
    }
}

// ScoreDataset

/// A dataset of scored image crops.
///
/// Each annotation row addresses one image file, `{id}_{serial}.jpg` under
/// the crop directory. Fetching a sample opens and decodes that file,
/// coerces it to three RGB channels (grayscale is replicated across
/// channels, alpha is dropped), scales pixels to `[0, 1]` in `[C, H, W]`
/// layout, and pairs it with the row's `(score, weight)` label.
pub struct ScoreDataset {
    img_dir: PathBuf,
    anno_file: PathBuf,
    table: AnnotationTable,
    phase: Phase,
    weighted: bool,
    transform: Option<Box<dyn Transform>>,
    target_transform: Option<Box<dyn TargetTransform>>,
}

impl std::fmt::Debug for ScoreDataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoreDataset")
            .field("img_dir", &self.img_dir)
            .field("anno_file", &self.anno_file)
            .field("table", &self.table)
            .field("phase", &self.phase)
            .field("weighted", &self.weighted)
            .field("transform", &self.transform.as_ref().map(|_| "..."))
            .field("target_transform", &self.target_transform.as_ref().map(|_| "..."))
            .finish()
    }
}

impl ScoreDataset {
    /// Convenience entry-point: `ScoreDataset::builder(root)` returns a builder.
    pub fn builder<P: AsRef<Path>>(root: P) -> ScoreDatasetBuilder {
        ScoreDatasetBuilder::new(root)
    }

    /// The annotation file backing this dataset.
    pub fn annotation_file(&self) -> &Path {
        &self.anno_file
    }

    /// The directory holding the crop images.
    pub fn image_dir(&self) -> &Path {
        &self.img_dir
    }

    /// The split role this dataset was built for.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The image file the sample at `index` resolves to.
    pub fn image_path(&self, index: usize) -> Result<PathBuf> {
        Ok(self.image_file(self.table.row(index)?))
    }

    fn image_file(&self, row: &Annotation) -> PathBuf {
        self.img_dir.join(format!("{}_{}.jpg", row.id, row.serial))
    }
}

/// Open and decode one image into `[3, H, W]` pixels in `[0, 1]`.
fn load_image(path: &Path) -> Result<Array3<f32>> {
    let img = image::open(path).map_err(|e| Error::ImageDecode {
        path: path.to_path_buf(),
        source: e,
    })?;

    // Coerce to RGB: replicates grayscale, drops alpha.
    let rgb = img.to_rgb8();
    let (w, h) = rgb.dimensions();
    let raw = rgb.into_raw();

    // [H, W, C] interleaved -> [C, H, W] planar
    let npix = (w as usize) * (h as usize);
    let mut data = vec![0.0f32; 3 * npix];
    for i in 0..npix {
        data[i] = raw[i * 3] as f32 / 255.0;
        data[npix + i] = raw[i * 3 + 1] as f32 / 255.0;
        data[2 * npix + i] = raw[i * 3 + 2] as f32 / 255.0;
    }

    Ok(Array3::from_shape_vec((3, h as usize, w as usize), data)
        .expect("planar buffer matches [3, H, W]"))
}

impl Dataset for ScoreDataset {
    fn len(&self) -> usize {
        self.table.len()
    }

    fn get(&self, index: usize) -> Result<Sample> {
        let row = self.table.row(index)?;

        let mut image = load_image(&self.image_file(row))?;
        if let Some(t) = &self.transform {
            image = t.apply(image);
        }

        let score = row.score;
        let weight = if self.weighted {
            // Presence was validated when the table was loaded.
            row.weight.unwrap_or(1.0)
        } else {
            1.0
        };
        let (score, weight) = match &self.target_transform {
            Some(t) => t.apply(score, weight),
            None => (score, weight),
        };

        Ok(Sample {
            image,
            label: ScoreLabel { score, weight },
        })
    }

    fn name(&self) -> &str {
        "score-crops"
    }
}

// Tests (filesystem-backed tests live in tests/data_tests.rs)
