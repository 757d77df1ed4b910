use burn::{data::dataloader::DataLoaderBuilder, prelude::*};

use crate::data::{batcher::DigitBatcher, dataset::DigitDataset};
use crate::domain::{error::DigitError, features::FEATURE_LEN, prediction::argmax};
use crate::ml::model::DigitMlp;

pub const EVAL_BATCH_SIZE: usize = 128;

/// Raw counts from one pass over a labelled set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Evaluation {
    pub correct: usize,
    pub total:   usize,
}

impl Evaluation {
    /// Accuracy as a percentage. An empty set scores 0.
    pub fn accuracy_percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.correct as f64 / self.total as f64 * 100.0
    }
}

/// Score `model` on `dataset` without touching its weights.
///
/// Pass the inner (non-autodiff) module from `valid()` so dropout is off.
pub fn evaluate<B: Backend>(
    model:   &DigitMlp<B>,
    dataset: &DigitDataset,
    device:  &B::Device,
) -> Result<Evaluation, DigitError> {
    if model.input_size() != FEATURE_LEN {
        return Err(DigitError::ShapeMismatch {
            expected: model.input_size(),
            actual:   FEATURE_LEN,
        });
    }

    // No shuffle: evaluation order does not change the counts.
    let loader = DataLoaderBuilder::new(DigitBatcher::<B>::new(device.clone()))
        .batch_size(EVAL_BATCH_SIZE)
        .build(dataset.clone());

    let mut eval = Evaluation::default();
    for batch in loader.iter() {
        eval.total   += batch.labels.len();
        eval.correct += count_correct(model.forward(batch.images), &batch.labels)?;
    }

    tracing::debug!("Evaluated {}/{} correct", eval.correct, eval.total);
    Ok(eval)
}

/// Number of rows whose arg-max matches the label. Done on the host:
/// one read-back per batch.
pub fn count_correct<B: Backend>(
    logits: Tensor<B, 2>,
    labels: &[usize],
) -> Result<usize, DigitError> {
    let [_, num_classes] = logits.dims();
    let values = logits
        .into_data()
        .to_vec::<f32>()
        .map_err(|e| DigitError::Inference(format!("cannot read logits: {e:?}")))?;

    Ok(values
        .chunks(num_classes.max(1))
        .zip(labels)
        .filter(|(row, &label)| argmax(row) == label)
        .count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::DigitSample;
    use crate::domain::features::{FeatureVector, Label};
    use crate::ml::{model::DigitMlpConfig, InferBackend};

    #[test]
    fn test_empty_set_scores_zero() {
        let device = Default::default();
        let model: DigitMlp<InferBackend> = DigitMlpConfig::new(8, 0.0).init(0, &device);
        let eval = evaluate(&model, &DigitDataset::default(), &device).unwrap();
        assert_eq!(eval, Evaluation { correct: 0, total: 0 });
        assert_eq!(eval.accuracy_percent(), 0.0);
    }

    #[test]
    fn test_accuracy_percent() {
        assert_eq!(Evaluation { correct: 3, total: 4 }.accuracy_percent(), 75.0);
        assert_eq!(Evaluation { correct: 0, total: 9 }.accuracy_percent(), 0.0);
    }

    #[test]
    fn test_count_correct() {
        let device = Default::default();
        let logits = Tensor::<InferBackend, 2>::from_data(
            TensorData::new(vec![0.1f32, 0.9, 0.8, 0.2, 0.5, 0.4], [3, 2]),
            &device,
        );
        assert_eq!(count_correct(logits, &[1, 0, 1]).unwrap(), 2);
    }

    #[test]
    fn test_counts_cover_every_batch() {
        let device = Default::default();
        let model: DigitMlp<InferBackend> = DigitMlpConfig::new(8, 0.0).init(2, &device);
        let samples: Vec<DigitSample> = (0..EVAL_BATCH_SIZE + 5)
            .map(|i| DigitSample {
                features: FeatureVector::new(vec![(i % 7) as f32 / 7.0; FEATURE_LEN]).unwrap(),
                label:    Label::new((i % 10) as u8).unwrap(),
            })
            .collect();
        let eval = evaluate(&model, &DigitDataset::new(samples), &device).unwrap();
        assert_eq!(eval.total, EVAL_BATCH_SIZE + 5);
        assert!(eval.correct <= eval.total);
    }

    #[test]
    fn test_wrong_input_size_is_rejected() {
        let device = Default::default();
        let model: DigitMlp<InferBackend> =
            DigitMlpConfig::new(8, 0.0).with_input_size(64).init(0, &device);
        assert!(matches!(
            evaluate(&model, &DigitDataset::default(), &device),
            Err(DigitError::ShapeMismatch { expected: 64, .. })
        ));
    }
}
