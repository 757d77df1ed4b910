// ============================================================
// Layer 3 — Feature Vector & Label
// ============================================================
// The feature-representation contract between training and
// serving lives here:
//
//   FeatureVector = 28 x 28 grid, flattened row-major,
//                   every value in [0, 1]
//
// Both the dataset path and the upload path must produce this
// type, and the constructors refuse anything else.

use serde::{Deserialize, Serialize};

use crate::domain::error::DigitError;

/// Side length of the canonical digit grid.
pub const IMAGE_SIDE: usize = 28;

/// Length of every FeatureVector fed to the model (28 * 28).
pub const FEATURE_LEN: usize = IMAGE_SIDE * IMAGE_SIDE;

/// Number of output classes (digits 0 through 9).
pub const NUM_CLASSES: usize = 10;

/// A validated, normalized, fixed-length model input.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Vec<f32>);

impl FeatureVector {
    /// Wrap already-normalized values.
    ///
    /// Fails with `ShapeMismatch` when the length is not 784 and with
    /// `TransformFailure` when any value is NaN or outside [0, 1].
    pub fn new(values: Vec<f32>) -> Result<Self, DigitError> {
        if values.len() != FEATURE_LEN {
            return Err(DigitError::ShapeMismatch {
                expected: FEATURE_LEN,
                actual:   values.len(),
            });
        }
        if let Some(bad) = values.iter().find(|v| !(0.0..=1.0).contains(*v)) {
            return Err(DigitError::TransformFailure(format!(
                "feature value {bad} outside [0, 1]"
            )));
        }
        Ok(Self(values))
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}

/// A digit class in 0..=9.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Label(u8);

impl Label {
    pub fn new(digit: u8) -> Result<Self, DigitError> {
        if usize::from(digit) < NUM_CLASSES {
            Ok(Self(digit))
        } else {
            Err(DigitError::InvalidLabel(digit))
        }
    }

    pub fn index(self) -> usize {
        usize::from(self.0)
    }

    /// One-hot encoding used as the cross-entropy target:
    /// 3 → [0, 0, 0, 1, 0, 0, 0, 0, 0, 0]
    pub fn one_hot(self) -> [f32; NUM_CLASSES] {
        let mut encoded = [0.0; NUM_CLASSES];
        encoded[self.index()] = 1.0;
        encoded
    }
}

impl TryFrom<u8> for Label {
    type Error = DigitError;

    fn try_from(digit: u8) -> Result<Self, Self::Error> {
        Label::new(digit)
    }
}

/// One training or test example straight from the dataset,
/// before the feature transform: 784 raw intensities (bright digit
/// on a dark background) plus its label.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledImage {
    pub pixels: Vec<u8>,
    pub label:  Label,
}

/// The two partitions a digit dataset provides.
#[derive(Debug, Clone, Default)]
pub struct DatasetSplits {
    pub train: Vec<LabeledImage>,
    pub test:  Vec<LabeledImage>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_vector_rejects_wrong_length() {
        let err = FeatureVector::new(vec![0.0; 783]).unwrap_err();
        assert!(matches!(
            err,
            DigitError::ShapeMismatch { expected: 784, actual: 783 }
        ));
    }

    #[test]
    fn test_feature_vector_rejects_out_of_range() {
        let mut values = vec![0.5; FEATURE_LEN];
        values[10] = 1.5;
        assert!(matches!(
            FeatureVector::new(values),
            Err(DigitError::TransformFailure(_))
        ));

        let mut values = vec![0.5; FEATURE_LEN];
        values[0] = f32::NAN;
        assert!(FeatureVector::new(values).is_err());
    }

    #[test]
    fn test_feature_vector_accepts_bounds() {
        let mut values = vec![0.0; FEATURE_LEN];
        values[FEATURE_LEN - 1] = 1.0;
        let fv = FeatureVector::new(values).unwrap();
        assert_eq!(fv.as_slice().len(), FEATURE_LEN);
    }

    #[test]
    fn test_label_range() {
        assert!(Label::new(0).is_ok());
        assert!(Label::new(9).is_ok());
        assert!(matches!(Label::new(10), Err(DigitError::InvalidLabel(10))));
        assert!(Label::try_from(255).is_err());
    }

    #[test]
    fn test_one_hot() {
        let encoded = Label::new(3).unwrap().one_hot();
        assert_eq!(encoded, [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(encoded.iter().sum::<f32>(), 1.0);
    }
}
