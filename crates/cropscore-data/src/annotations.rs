// AnnotationTable — tabular annotation records backing a ScoreDataset

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

/// One annotation record: a crop identity plus its regression target.
///
/// `id` and `serial` are kept as strings so that integer and string
/// identifiers both format into the `{id}_{serial}.jpg` file name exactly
/// as they appear in the annotation file.
#[derive(Debug, Clone, Deserialize)]
pub struct Annotation {
    /// Source image identifier.
    pub id: String,
    /// Disambiguates multiple crops of the same source image.
    pub serial: String,
    /// Floating-point regression target.
    pub score: f32,
    /// Per-sample loss weight. Only present in weighted annotation files.
    #[serde(default)]
    pub weight: Option<f32>,
}

/// An ordered, read-only table of [`Annotation`] rows loaded from a CSV file.
///
/// The table is built once at dataset construction and never mutated, so it
/// can be read from any number of worker threads without locking.
#[derive(Debug)]
pub struct AnnotationTable {
    rows: Vec<Annotation>,
    path: PathBuf,
}

impl AnnotationTable {
    /// Load a table from a CSV file on disk.
    ///
    /// With `weighted` set, the file must carry a `weight` column and every
    /// row must have a value in it; violations fail here rather than at
    /// fetch time.
    pub fn from_path<P: AsRef<Path>>(path: P, weighted: bool) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::read(csv::Reader::from_reader(file), path.to_path_buf(), weighted)
    }

    /// Parse a table from any reader (e.g. an in-memory CSV string).
    pub fn from_reader<R: io::Read>(reader: R, weighted: bool) -> Result<Self> {
        Self::read(
            csv::Reader::from_reader(reader),
            PathBuf::from("<memory>"),
            weighted,
        )
    }

    fn read<R: io::Read>(
        mut reader: csv::Reader<R>,
        path: PathBuf,
        weighted: bool,
    ) -> Result<Self> {
        let has_weight = reader
            .headers()
            .map_err(|e| Error::Csv {
                path: path.clone(),
                source: e,
            })?
            .iter()
            .any(|h| h == "weight");
        if weighted && !has_weight {
            return Err(Error::MissingColumn {
                path,
                column: "weight",
            });
        }

        let mut rows: Vec<Annotation> = Vec::new();
        for record in reader.deserialize() {
            let row: Annotation = record.map_err(|e| Error::Csv {
                path: path.clone(),
                source: e,
            })?;
            if weighted && row.weight.is_none() {
                return Err(Error::MissingWeight {
                    path,
                    row: rows.len(),
                });
            }
            rows.push(row);
        }

        Ok(Self { rows, path })
    }

    /// Number of rows (= dataset length).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The file the table was loaded from (`<memory>` for in-memory tables).
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The row at `index`, or `None` past the end.
    pub fn get(&self, index: usize) -> Option<&Annotation> {
        self.rows.get(index)
    }

    /// The row at `index`, as a checked lookup.
    pub fn row(&self, index: usize) -> Result<&Annotation> {
        self.rows.get(index).ok_or(Error::IndexOutOfRange {
            index,
            len: self.rows.len(),
        })
    }
}

// Tests
