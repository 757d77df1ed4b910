// ============================================================
// Layer 4 — MNIST Loader
// ============================================================
// Reads the four uncompressed MNIST IDX files from a local
// directory with the `mnist` crate:
//
//   data/
//     train-images-idx3-ubyte   60 000 x 28 x 28 pixels
//     train-labels-idx1-ubyte   60 000 labels
//     t10k-images-idx3-ubyte    10 000 x 28 x 28 pixels
//     t10k-labels-idx1-ubyte    10 000 labels
//
// Downloading them is someone else's job. The `mnist` crate
// panics on a missing file, so presence is checked first and
// reported as a normal error.

use anyhow::{bail, Context, Result};
use mnist::{Mnist, MnistBuilder};
use std::path::PathBuf;

use crate::domain::{
    features::{DatasetSplits, Label, LabeledImage, FEATURE_LEN},
    traits::DigitSource,
};

pub const TRAIN_IMAGES: &str = "train-images-idx3-ubyte";
pub const TRAIN_LABELS: &str = "train-labels-idx1-ubyte";
pub const TEST_IMAGES: &str = "t10k-images-idx3-ubyte";
pub const TEST_LABELS: &str = "t10k-labels-idx1-ubyte";

const TRAIN_LEN: u32 = 60_000;
const TEST_LEN: u32 = 10_000;

/// Loads the canonical MNIST train/test partitions from disk.
pub struct MnistLoader {
    dir: PathBuf,
}

impl MnistLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn check_files(&self) -> Result<()> {
        let missing: Vec<&str> = [TRAIN_IMAGES, TRAIN_LABELS, TEST_IMAGES, TEST_LABELS]
            .into_iter()
            .filter(|name| !self.dir.join(name).is_file())
            .collect();

        if !missing.is_empty() {
            bail!(
                "MNIST files missing from '{}': {}. \
                 Download and decompress the dataset there first.",
                self.dir.display(),
                missing.join(", ")
            );
        }
        Ok(())
    }
}

impl DigitSource for MnistLoader {
    fn load_splits(&self) -> Result<DatasetSplits> {
        self.check_files()?;

        let base = self
            .dir
            .to_str()
            .with_context(|| format!("Data path '{}' is not valid UTF-8", self.dir.display()))?;

        let Mnist { trn_img, trn_lbl, tst_img, tst_lbl, .. } = MnistBuilder::new()
            .base_path(base)
            .label_format_digit()
            .training_set_length(TRAIN_LEN)
            .validation_set_length(0)
            .test_set_length(TEST_LEN)
            .finalize();

        let train = pair_images(&trn_img, &trn_lbl).context("Bad MNIST training split")?;
        let test  = pair_images(&tst_img, &tst_lbl).context("Bad MNIST test split")?;

        tracing::info!(
            "Loaded MNIST from '{}': {} train, {} test",
            self.dir.display(),
            train.len(),
            test.len()
        );
        Ok(DatasetSplits { train, test })
    }
}

/// Zip a flat pixel buffer (784 bytes per image) with its labels.
pub fn pair_images(pixels: &[u8], labels: &[u8]) -> Result<Vec<LabeledImage>> {
    if pixels.len() != labels.len() * FEATURE_LEN {
        bail!(
            "{} pixel bytes do not hold {} images of {} pixels",
            pixels.len(),
            labels.len(),
            FEATURE_LEN
        );
    }

    pixels
        .chunks_exact(FEATURE_LEN)
        .zip(labels)
        .map(|(image, &digit)| -> Result<LabeledImage> {
            Ok(LabeledImage {
                pixels: image.to_vec(),
                label:  Label::new(digit)?,
            })
        })
        .collect()
}
