// ============================================================
// Layer 2 — PredictUseCase
// ============================================================
// The serving error boundary. One call takes uploaded image
// bytes all the way to a response payload:
//
//   bytes → Preprocessor::from_upload → DigitClassifier::classify
//
// Every failure on that path, panics included, becomes the
// same generic payload. The error kind only decides the log
// level: client faults at warn, everything else at error.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    panic::{self, AssertUnwindSafe},
    path::Path,
    sync::Arc,
};

use crate::data::preprocessor::Preprocessor;
use crate::domain::{error::DigitError, prediction::PredictionResult, traits::DigitClassifier};
use crate::infra::artifact::ModelStore;
use crate::ml::inferencer::Inferencer;

pub const SUCCESS_MESSAGE: &str = "Prediction successful";
pub const FAILURE_MESSAGE: &str = "An error occurred";

/// JSON body returned for every prediction request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PredictResponse {
    Success {
        message:       String,
        prediction:    usize,
        probabilities: Vec<f32>,
    },
    Failure {
        message: String,
    },
}

impl PredictResponse {
    pub fn success(result: PredictionResult) -> Self {
        PredictResponse::Success {
            message:       SUCCESS_MESSAGE.to_string(),
            prediction:    result.predicted_class,
            probabilities: result.probabilities,
        }
    }

    pub fn failure() -> Self {
        PredictResponse::Failure { message: FAILURE_MESSAGE.to_string() }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PredictResponse::Success { .. })
    }
}

pub struct PredictUseCase {
    classifier:   Arc<dyn DigitClassifier>,
    preprocessor: Preprocessor,
}

impl PredictUseCase {
    pub fn new(classifier: Arc<dyn DigitClassifier>) -> Self {
        Self { classifier, preprocessor: Preprocessor::new() }
    }

    /// Load the saved model once and wrap it for serving.
    pub fn from_model_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let inferencer = Inferencer::from_store(&ModelStore::new(dir.as_ref()))?;
        Ok(Self::new(Arc::new(inferencer)))
    }

    /// Transform then classify, with typed errors.
    pub fn classify_bytes(&self, bytes: &[u8]) -> Result<PredictionResult, DigitError> {
        let features = self.preprocessor.from_upload(bytes)?;
        self.classifier.classify(&features)
    }

    /// Never fails: any error or panic is logged and becomes the
    /// failure payload.
    pub fn respond(&self, bytes: &[u8]) -> PredictResponse {
        match panic::catch_unwind(AssertUnwindSafe(|| self.classify_bytes(bytes))) {
            Ok(Ok(result)) => {
                tracing::info!("Predicted digit {}", result.predicted_class);
                PredictResponse::success(result)
            }
            Ok(Err(e)) if e.is_client_fault() => {
                tracing::warn!("Rejected upload of {} bytes: {e}", bytes.len());
                PredictResponse::failure()
            }
            Ok(Err(e)) => {
                tracing::error!("Prediction failed: {e}");
                PredictResponse::failure()
            }
            Err(_) => {
                tracing::error!("Prediction panicked");
                PredictResponse::failure()
            }
        }
    }
}
