// ============================================================
// Layer 3 — Hyperparameters
// ============================================================
// Everything that shapes a training run. Fixed once the run
// starts: the trainer only ever borrows it.

use serde::{Deserialize, Serialize};

use crate::domain::error::DigitError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hyperparameters {
    /// Width of both hidden dense layers
    pub hidden_units: usize,

    /// Probability of zeroing an activation during training
    pub dropout: f64,

    /// Full passes over the training set; 0 leaves the weights untouched
    pub epochs: usize,

    /// Examples per optimizer step
    pub batch_size: usize,

    /// Adam step size
    pub learning_rate: f64,

    /// Seeds weight init, shuffling and dropout masks
    pub seed: u64,
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Self {
            hidden_units:  256,
            dropout:       0.45,
            epochs:        20,
            batch_size:    128,
            learning_rate: 1e-3,
            seed:          0,
        }
    }
}

impl Hyperparameters {
    pub fn validate(&self) -> Result<(), DigitError> {
        if self.hidden_units == 0 {
            return Err(DigitError::InvalidHyperparameters(
                "hidden_units must be positive".into(),
            ));
        }
        if self.batch_size == 0 {
            return Err(DigitError::InvalidHyperparameters(
                "batch_size must be positive".into(),
            ));
        }
        if !(0.0..1.0).contains(&self.dropout) {
            return Err(DigitError::InvalidHyperparameters(format!(
                "dropout must be in [0, 1), got {}",
                self.dropout
            )));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(DigitError::InvalidHyperparameters(format!(
                "learning rate must be positive, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }
}
