// ============================================================
// Layer 4 — Digit Batcher
// ============================================================
// Stacks DigitSamples into the tensors the model consumes.
//
//   Input:  N samples, each a 784-value FeatureVector + Label
//   Output: images  [N, 784]  float, already in [0, 1]
//           targets [N, 10]   one-hot float
//           labels  Vec<usize> kept on the host for accuracy
//
// Features are flattened into one Vec<f32> and handed to Burn
// as a single TensorData, so a batch costs one allocation.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::DigitSample;
use crate::domain::features::{FeatureVector, FEATURE_LEN, NUM_CLASSES};

/// A batch of digit samples ready for the forward pass.
#[derive(Debug, Clone)]
pub struct DigitBatch<B: Backend> {
    /// Shape [batch_size, 784]
    pub images: Tensor<B, 2>,

    /// One-hot targets, shape [batch_size, 10]
    pub targets: Tensor<B, 2>,

    /// Class indices, same order as the rows above
    pub labels: Vec<usize>,
}

/// Holds the target device so tensors are created in the right place.
#[derive(Clone, Debug)]
pub struct DigitBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> DigitBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }

    /// Features only, for evaluation and inference.
    pub fn images<'a>(&self, features: impl IntoIterator<Item = &'a FeatureVector>) -> Tensor<B, 2> {
        let mut flat: Vec<f32> = Vec::new();
        let mut rows = 0usize;
        for fv in features {
            flat.extend_from_slice(fv.as_slice());
            rows += 1;
        }
        Tensor::<B, 2>::from_data(TensorData::new(flat, [rows, FEATURE_LEN]), &self.device)
    }
}

// ─── Burn Batcher Trait Implementation ────────────────────────────────────────
// The DataLoader calls .batch(items) with each mini-batch of samples.
impl<B: Backend> Batcher<DigitSample, DigitBatch<B>> for DigitBatcher<B> {
    fn batch(&self, items: Vec<DigitSample>) -> DigitBatch<B> {
        let batch_size = items.len();

        let images = self.images(items.iter().map(|s| &s.features));

        let targets_flat: Vec<f32> = items
            .iter()
            .flat_map(|s| s.label.one_hot())
            .collect();
        let targets = Tensor::<B, 2>::from_data(
            TensorData::new(targets_flat, [batch_size, NUM_CLASSES]),
            &self.device,
        );

        let labels = items.iter().map(|s| s.label.index()).collect();

        DigitBatch { images, targets, labels }
    }
}
