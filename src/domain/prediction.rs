use serde::{Deserialize, Serialize};

use crate::domain::{error::DigitError, features::NUM_CLASSES};

/// Output of one inference: the winning class and the full
/// softmax distribution it was picked from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub predicted_class: usize,
    pub probabilities:   Vec<f32>,
}

impl PredictionResult {
    /// Build a result from a softmax row. The predicted class is always
    /// derived from the distribution, never passed in separately.
    pub fn from_probabilities(probabilities: Vec<f32>) -> Result<Self, DigitError> {
        if probabilities.len() != NUM_CLASSES {
            return Err(DigitError::ModelMismatch {
                expected: NUM_CLASSES,
                actual:   probabilities.len(),
            });
        }
        if probabilities.iter().any(|p| !p.is_finite()) {
            return Err(DigitError::Inference(
                "model produced a non-finite probability".into(),
            ));
        }
        let predicted_class = argmax(&probabilities);
        Ok(Self { predicted_class, probabilities })
    }

    /// Probability assigned to the predicted class.
    pub fn confidence(&self) -> f32 {
        self.probabilities[self.predicted_class]
    }
}

/// Index of the largest value; ties resolve to the lowest index.
pub fn argmax(values: &[f32]) -> usize {
    values
        .iter()
        .enumerate()
        .fold((0, f32::NEG_INFINITY), |(best_i, best_v), (i, &v)| {
            if v > best_v { (i, v) } else { (best_i, best_v) }
        })
        .0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argmax_first_of_ties() {
        assert_eq!(argmax(&[0.1, 0.4, 0.4, 0.1]), 1);
        assert_eq!(argmax(&[0.9]), 0);
        assert_eq!(argmax(&[]), 0);
    }

    #[test]
    fn test_from_probabilities() {
        let mut probs = vec![0.05; NUM_CLASSES];
        probs[7] = 0.55;
        let result = PredictionResult::from_probabilities(probs).unwrap();
        assert_eq!(result.predicted_class, 7);
        assert!((result.confidence() - 0.55).abs() < f32::EPSILON);
    }

    #[test]
    fn test_rejects_wrong_length() {
        assert!(matches!(
            PredictionResult::from_probabilities(vec![1.0]),
            Err(DigitError::ModelMismatch { expected: 10, actual: 1 })
        ));
    }

    #[test]
    fn test_rejects_nan() {
        let mut probs = vec![0.1; NUM_CLASSES];
        probs[2] = f32::NAN;
        assert!(matches!(
            PredictionResult::from_probabilities(probs),
            Err(DigitError::Inference(_))
        ));
    }
}
