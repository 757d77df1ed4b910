// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load MNIST train/test splits  (Layer 4 - data)
//   Step 2: Feature transform both splits (Layer 4 - data)
//   Step 3: Build the seeded model        (Layer 5 - ml)
//   Step 4: Run the training loop         (Layer 5 - ml)
//   Step 5: Evaluate on the test split    (Layer 5 - ml)
//   Step 6: Optionally save artifact +
//           metrics.csv                   (Layer 6 - infra)
//
// Reference: Burn Book §5 (Training)

use anyhow::{Context, Result};
use burn::{data::dataset::Dataset, module::AutodiffModule};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::data::{dataset::DigitDataset, loader::MnistLoader, preprocessor::Preprocessor};
use crate::domain::{hyperparameters::Hyperparameters, traits::DigitSource};
use crate::infra::{artifact::ModelStore, metrics::{EpochMetrics, MetricsLogger}};
use crate::ml::{
    evaluator::{evaluate, Evaluation},
    model::{DigitMlp, DigitMlpConfig},
    trainer::train,
    TrainBackend,
};

// ─── Training Configuration ──────────────────────────────────────────────────
// Everything a training run needs. Serialisable so a run can be
// described in JSON as well as on the command line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub data_dir:        String,
    pub save_dir:        String,
    pub hyperparameters: Hyperparameters,
    pub save_model:      bool,
    pub quiet:           bool,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_dir:        "data".to_string(),
            save_dir:        "trained_models".to_string(),
            hyperparameters: Hyperparameters::default(),
            save_model:      false,
            quiet:           false,
        }
    }
}

/// What a finished run produced.
#[derive(Debug, Clone)]
pub struct TrainReport {
    pub evaluation: Evaluation,
    pub history:    Vec<EpochMetrics>,
    /// Set when the model was saved
    pub artifact:   Option<PathBuf>,
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Train on the MNIST files under `data_dir`.
    pub fn execute(&self) -> Result<TrainReport> {
        let loader = MnistLoader::new(&self.config.data_dir);
        self.execute_with(&loader)
    }

    /// Train on any source of labelled images.
    pub fn execute_with(&self, source: &dyn DigitSource) -> Result<TrainReport> {
        let cfg = &self.config;
        let hp  = &cfg.hyperparameters;
        hp.validate()?;

        // ── Step 1: Load splits ──────────────────────────────────────────────
        let splits = source.load_splits()?;

        // ── Step 2: Feature transform ────────────────────────────────────────
        let preprocessor = Preprocessor::new();
        let train_set = DigitDataset::from_images(&splits.train, &preprocessor)
            .context("Cannot transform training images")?;
        let test_set = DigitDataset::from_images(&splits.test, &preprocessor)
            .context("Cannot transform test images")?;
        tracing::info!(
            "Prepared {} training and {} test samples",
            train_set.len(),
            test_set.len()
        );

        // ── Step 3: Build model ──────────────────────────────────────────────
        let device = Default::default();
        let model_cfg = DigitMlpConfig::new(hp.hidden_units, hp.dropout);
        let model: DigitMlp<TrainBackend> = model_cfg.init(hp.seed, &device);

        // ── Step 4: Train ────────────────────────────────────────────────────
        let outcome = train(model, &train_set, hp, &device, cfg.quiet)?;

        // ── Step 5: Evaluate with dropout off ────────────────────────────────
        let model = outcome.model.valid();
        let evaluation = evaluate(&model, &test_set, &device)?;
        tracing::info!(
            "Test accuracy: {:.2}% ({}/{})",
            evaluation.accuracy_percent(),
            evaluation.correct,
            evaluation.total
        );

        // ── Step 6: Persist ──────────────────────────────────────────────────
        let artifact = if cfg.save_model {
            let store = ModelStore::new(&cfg.save_dir);
            let path  = store.save(&model, &model_cfg)?;
            let metrics = MetricsLogger::new(&cfg.save_dir)?;
            metrics.log_all(&outcome.history)?;
            tracing::info!("Metrics written to '{}'", metrics.csv_path().display());
            Some(path)
        } else {
            None
        };

        Ok(TrainReport { evaluation, history: outcome.history, artifact })
    }
}
