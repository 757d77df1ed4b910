// ============================================================
// Layer 5 — Inferencer
// ============================================================
// The loaded model, built once at startup and then shared by
// every request behind Arc<dyn DigitClassifier>.
//
// The module sits behind a Mutex: forward passes are short and
// the backend is not promised to be reentrant, so requests take
// turns. Weights are never written after construction.

use anyhow::Result;
use burn::prelude::*;
use std::sync::Mutex;

use crate::data::batcher::DigitBatcher;
use crate::domain::{
    error::DigitError,
    features::FeatureVector,
    prediction::PredictionResult,
    traits::DigitClassifier,
};
use crate::infra::artifact::ModelStore;
use crate::ml::{model::DigitMlp, InferBackend};

pub struct Inferencer {
    model:   Mutex<DigitMlp<InferBackend>>,
    batcher: DigitBatcher<InferBackend>,
}

impl Inferencer {
    pub fn new(model: DigitMlp<InferBackend>, device: <InferBackend as Backend>::Device) -> Self {
        Self {
            model:   Mutex::new(model),
            batcher: DigitBatcher::new(device),
        }
    }

    pub fn from_store(store: &ModelStore) -> Result<Self> {
        let device = <InferBackend as Backend>::Device::default();
        let (model, config) = store.load::<InferBackend>(&device)?;
        tracing::info!(
            "Model loaded from '{}' (hidden_units={}, dropout={})",
            store.dir().display(),
            config.hidden_units,
            config.dropout
        );
        Ok(Self::new(model, device))
    }

    /// Softmax distribution for one input.
    pub fn probabilities(&self, features: &FeatureVector) -> Result<Vec<f32>, DigitError> {
        // A panic mid-forward poisons the lock but cannot corrupt the
        // weights, which are never written, so keep serving.
        let model = self.model.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("Model lock was poisoned by an earlier panic");
            poisoned.into_inner()
        });

        if model.input_size() != features.as_slice().len() {
            return Err(DigitError::ModelMismatch {
                expected: features.as_slice().len(),
                actual:   model.input_size(),
            });
        }

        let input = self.batcher.images([features]);
        model
            .forward_probabilities(input)
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| DigitError::Inference(format!("cannot read probabilities: {e:?}")))
    }
}

impl DigitClassifier for Inferencer {
    fn classify(&self, features: &FeatureVector) -> Result<PredictionResult, DigitError> {
        let probabilities = self.probabilities(features)?;
        let result = PredictionResult::from_probabilities(probabilities)?;
        tracing::debug!(
            "Predicted {} with p={:.4}",
            result.predicted_class,
            result.confidence()
        );
        Ok(result)
    }
}
