// ============================================================
// Layer 3 — Error Taxonomy
// ============================================================
// Typed errors for every failure the core can produce.
// The application and CLI layers wrap these in anyhow, but the
// serving boundary matches on them to decide how to log.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DigitError {
    /// Input dimensionality disagrees with what the model expects.
    /// Never padded or truncated to fit.
    #[error("shape mismatch: expected {expected} features, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// Uploaded bytes are not a decodable image.
    #[error("cannot decode image: {0}")]
    DecodeFailure(String),

    /// Grayscale, invert, resize, pad or normalize failed.
    #[error("image transform failed: {0}")]
    TransformFailure(String),

    /// The loaded model's input or output width disagrees with the
    /// 784-feature, 10-class contract. Always an artifact problem.
    #[error("model mismatch: expected {expected} values, model has {actual}")]
    ModelMismatch { expected: usize, actual: usize },

    #[error("label {0} is outside 0..=9")]
    InvalidLabel(u8),

    #[error("invalid hyperparameters: {0}")]
    InvalidHyperparameters(String),

    /// The forward pass itself failed (backend or tensor read-back).
    #[error("inference failed: {0}")]
    Inference(String),
}

impl DigitError {
    /// True when the failure was caused by what the client sent rather
    /// than by the model or the process. Used for log levels only;
    /// the response payload is the same either way.
    pub fn is_client_fault(&self) -> bool {
        matches!(
            self,
            DigitError::DecodeFailure(_)
                | DigitError::TransformFailure(_)
                | DigitError::ShapeMismatch { .. }
        )
    }
}
