// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer programs against these two seams:
//
//   DigitSource     → where labelled images come from
//                     (MNIST IDX files, or an in-memory set in tests)
//   DigitClassifier → what turns a FeatureVector into a prediction
//                     (the loaded Burn model, or a stub in tests)

use anyhow::Result;

use crate::domain::{
    error::DigitError,
    features::{DatasetSplits, FeatureVector},
    prediction::PredictionResult,
};

// ─── DigitSource ──────────────────────────────────────────────────────────────
/// Any component that can provide the train and test partitions.
pub trait DigitSource {
    fn load_splits(&self) -> Result<DatasetSplits>;
}

// ─── DigitClassifier ──────────────────────────────────────────────────────────
/// A loaded, read-only model that can score one input.
///
/// Shared across concurrent requests, so implementations must be
/// `Send + Sync` and must not mutate weights.
pub trait DigitClassifier: Send + Sync {
    fn classify(&self, features: &FeatureVector) -> Result<PredictionResult, DigitError>;
}
