use burn::data::dataset::Dataset;
use std::sync::Arc;

use crate::data::preprocessor::Preprocessor;
use crate::domain::{
    error::DigitError,
    features::{FeatureVector, Label, LabeledImage},
};

/// One transformed example, ready to be batched.
#[derive(Debug, Clone, PartialEq)]
pub struct DigitSample {
    pub features: FeatureVector,
    pub label:    Label,
}

/// An in-memory set of transformed examples.
///
/// Samples sit behind an Arc: a data loader takes its dataset by
/// value, and the trainer and evaluator each build one.
#[derive(Debug, Clone, Default)]
pub struct DigitDataset {
    samples: Arc<Vec<DigitSample>>,
}

impl DigitDataset {
    pub fn new(samples: Vec<DigitSample>) -> Self {
        Self { samples: Arc::new(samples) }
    }

    /// Run every raw dataset image through the training-path transform.
    pub fn from_images(
        images:       &[LabeledImage],
        preprocessor: &Preprocessor,
    ) -> Result<Self, DigitError> {
        let samples = images
            .iter()
            .map(|image| -> Result<DigitSample, DigitError> {
                Ok(DigitSample {
                    features: preprocessor.from_dataset_pixels(&image.pixels)?,
                    label:    image.label,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(samples))
    }
}

impl Dataset<DigitSample> for DigitDataset {
    fn get(&self, index: usize) -> Option<DigitSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::features::FEATURE_LEN;

    fn dataset(n: usize) -> DigitDataset {
        let images: Vec<LabeledImage> = (0..n)
            .map(|i| LabeledImage {
                pixels: vec![(i % 256) as u8; FEATURE_LEN],
                label:  Label::new((i % 10) as u8).unwrap(),
            })
            .collect();
        DigitDataset::from_images(&images, &Preprocessor::new()).unwrap()
    }

    #[test]
    fn test_from_images_transforms_pixels() {
        let ds = dataset(3);
        assert_eq!(ds.len(), 3);
        let second = ds.get(1).unwrap();
        assert_eq!(second.label.index(), 1);
        assert!((second.features.as_slice()[0] - 1.0 / 255.0).abs() < 1e-7);
        assert!(ds.get(3).is_none());
    }

    #[test]
    fn test_from_images_rejects_bad_grid() {
        let images = vec![LabeledImage { pixels: vec![0; 10], label: Label::new(1).unwrap() }];
        assert!(DigitDataset::from_images(&images, &Preprocessor::new()).is_err());
    }

    #[test]
    fn test_clones_share_samples() {
        let ds = dataset(4);
        let copy = ds.clone();
        assert!(Arc::ptr_eq(&ds.samples, &copy.samples));
        assert_eq!(copy.get(2), ds.get(2));
    }

    #[test]
    fn test_default_is_empty() {
        let ds = DigitDataset::default();
        assert!(ds.is_empty());
        assert_eq!(ds.len(), 0);
    }
}
