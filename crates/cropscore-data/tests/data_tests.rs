// Tests for cropscore-data: ScoreDataset against a real on-disk fixture

use std::fs;
use std::path::Path;

use image::{Luma, Rgb};
use ndarray::Array3;
use tempfile::TempDir;

use cropscore_data::{
    collate, DataLoader, Dataset, Error, LoaderConfig, Phase, ScoreDataset, ScoreNormalize,
};

// Fixture layout:
//
//   root/
//     crop/
//       7_0.jpg   solid red
//       7_1.jpg   solid green
//       8_0.jpg   solid blue
//       9_0.jpg   grayscale
//       10_0.jpg  truncated garbage
//     score-1_train.csv
//     score-1_weight_train.csv
//     score-1_test.csv
fn fixture() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    let crop = root.join("crop");
    fs::create_dir(&crop).unwrap();

    save_rgb(&crop.join("7_0.jpg"), [255, 0, 0]);
    save_rgb(&crop.join("7_1.jpg"), [0, 255, 0]);
    save_rgb(&crop.join("8_0.jpg"), [0, 0, 255]);
    image::GrayImage::from_pixel(16, 16, Luma([128]))
        .save(crop.join("9_0.jpg"))
        .unwrap();
    fs::write(crop.join("10_0.jpg"), b"not a jpeg").unwrap();

    fs::write(
        root.join("score-1_train.csv"),
        "id,serial,score\n7,0,3.5\n7,1,2.0\n8,0,4.25\n",
    )
    .unwrap();
    fs::write(
        root.join("score-1_weight_train.csv"),
        "id,serial,score,weight\n7,0,3.5,0.8\n7,1,2.0,1.2\n8,0,4.25,1.0\n",
    )
    .unwrap();
    fs::write(
        root.join("score-1_test.csv"),
        "id,serial,score\n9,0,1.5\n10,0,2.5\n",
    )
    .unwrap();

    dir
}

fn save_rgb(path: &Path, rgb: [u8; 3]) {
    image::RgbImage::from_pixel(16, 16, Rgb(rgb))
        .save(path)
        .unwrap();
}

// Construction

#[test]
fn train_dataset_reads_plain_annotation_file() {
    let dir = fixture();
    let ds = ScoreDataset::builder(dir.path()).build().unwrap();

    assert_eq!(ds.len(), 3);
    assert_eq!(
        ds.annotation_file(),
        dir.path().join("score-1_train.csv").as_path()
    );
}

#[test]
fn weighted_train_dataset_reads_weight_annotation_file() {
    let dir = fixture();
    let ds = ScoreDataset::builder(dir.path())
        .weighted(true)
        .build()
        .unwrap();

    assert_eq!(
        ds.annotation_file(),
        dir.path().join("score-1_weight_train.csv").as_path()
    );
}

#[test]
fn test_phase_reads_test_annotation_file() {
    let dir = fixture();
    let ds = ScoreDataset::builder(dir.path())
        .phase(Phase::Test)
        .build()
        .unwrap();

    assert_eq!(
        ds.annotation_file(),
        dir.path().join("score-1_test.csv").as_path()
    );
    assert_eq!(ds.len(), 2);
}

#[test]
fn missing_annotation_file_fails_at_build() {
    let dir = fixture();
    let err = ScoreDataset::builder(dir.path())
        .phase(Phase::Val)
        .build()
        .unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
}

// Sample fetching

#[test]
fn fetch_resolves_image_path_from_id_and_serial() {
    let dir = fixture();
    let ds = ScoreDataset::builder(dir.path()).build().unwrap();

    assert_eq!(
        ds.image_path(0).unwrap(),
        dir.path().join("crop").join("7_0.jpg")
    );
    assert_eq!(
        ds.image_path(2).unwrap(),
        dir.path().join("crop").join("8_0.jpg")
    );
}

#[test]
fn fetch_without_weighting_pins_weight_to_one() {
    let dir = fixture();
    let ds = ScoreDataset::builder(dir.path()).build().unwrap();

    let sample = ds.get(0).unwrap();
    assert_eq!(sample.label.score, 3.5);
    assert_eq!(sample.label.weight, 1.0);
    assert_eq!(sample.image.shape(), &[3, 16, 16]);

    // solid red, modulo JPEG loss
    assert!((sample.image[[0, 8, 8]] - 1.0).abs() < 0.06);
    assert!(sample.image[[1, 8, 8]] < 0.06);
    assert!(sample.image[[2, 8, 8]] < 0.06);
}

#[test]
fn fetch_with_weighting_reads_stored_weight() {
    let dir = fixture();
    let ds = ScoreDataset::builder(dir.path())
        .weighted(true)
        .build()
        .unwrap();

    let sample = ds.get(1).unwrap();
    assert_eq!(sample.label.score, 2.0);
    assert_eq!(sample.label.weight, 1.2);
}

#[test]
fn grayscale_image_is_replicated_to_three_channels() {
    let dir = fixture();
    let ds = ScoreDataset::builder(dir.path())
        .phase(Phase::Test)
        .build()
        .unwrap();

    let sample = ds.get(0).unwrap();
    assert_eq!(sample.image.shape(), &[3, 16, 16]);
    for c in 0..3 {
        assert!((sample.image[[c, 4, 4]] - 128.0 / 255.0).abs() < 0.06);
    }
}

#[test]
fn corrupt_image_fails_the_fetch() {
    let dir = fixture();
    let ds = ScoreDataset::builder(dir.path())
        .phase(Phase::Test)
        .build()
        .unwrap();

    let err = ds.get(1).unwrap_err();
    assert!(matches!(err, Error::ImageDecode { .. }));
}

#[test]
fn out_of_range_index_fails_the_fetch() {
    let dir = fixture();
    let ds = ScoreDataset::builder(dir.path()).build().unwrap();

    let err = ds.get(99).unwrap_err();
    assert!(matches!(err, Error::IndexOutOfRange { index: 99, len: 3 }));
}

// Transforms

#[test]
fn image_transform_is_applied_to_the_decoded_image() {
    let dir = fixture();
    let ds = ScoreDataset::builder(dir.path())
        .transform(Box::new(|image: Array3<f32>| image * 0.0))
        .build()
        .unwrap();

    let sample = ds.get(0).unwrap();
    assert!(sample.image.iter().all(|&v| v == 0.0));
    // label untouched by the image transform
    assert_eq!(sample.label.score, 3.5);
}

#[test]
fn target_transform_normalizes_the_score() {
    let dir = fixture();
    let normalize = ScoreNormalize::new(3.0, 0.5).unwrap();
    let ds = ScoreDataset::builder(dir.path())
        .target_transform(Box::new(normalize))
        .build()
        .unwrap();

    let sample = ds.get(0).unwrap();
    assert!((sample.label.score - 1.0).abs() < 1e-6); // (3.5 - 3.0) / 0.5
    assert_eq!(sample.label.weight, 1.0);
    assert!((normalize.denormalize(sample.label.score) - 3.5).abs() < 1e-5);
}

// End-to-end: dataset -> loader -> collated batches

#[test]
fn loader_batches_the_dataset() {
    let dir = fixture();
    let ds = ScoreDataset::builder(dir.path())
        .weighted(true)
        .build()
        .unwrap();
    let mut loader = DataLoader::new(&ds, LoaderConfig::default().batch_size(2).shuffle(false));

    let batches: Vec<_> = loader.iter_batches().map(|b| b.unwrap()).collect();
    assert_eq!(batches.len(), 2);

    assert_eq!(batches[0].images.shape(), &[2, 3, 16, 16]);
    assert_eq!(batches[0].scores.to_vec(), vec![3.5, 2.0]);
    assert_eq!(batches[0].weights.to_vec(), vec![0.8, 1.2]);

    assert_eq!(batches[1].images.shape(), &[1, 3, 16, 16]);
    assert_eq!(batches[1].scores.to_vec(), vec![4.25]);
}

#[test]
fn manual_fetch_then_collate_preserves_order() {
    let dir = fixture();
    let ds = ScoreDataset::builder(dir.path()).build().unwrap();

    let samples: Vec<_> = (0..ds.len()).map(|i| ds.get(i).unwrap()).collect();
    let batch = collate(&samples).unwrap();

    assert_eq!(batch.len(), 3);
    assert_eq!(batch.scores.to_vec(), vec![3.5, 2.0, 4.25]);
    assert!(batch.weights.to_vec().iter().all(|&w| w == 1.0));
}
