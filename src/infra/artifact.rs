// ============================================================
// Layer 6 — Model Artifact Store
// ============================================================
// Persists a trained DigitMlp as one self-describing file:
//
//   trained_models/
//     digit_mlp.mpk   ← architecture + every weight and bias
//     metrics.csv     ← per-epoch training history (MetricsLogger)
//
// The record carries the architecture next to the weights, so
// loading needs nothing but the directory: the config is
// rebuilt from the record, a model of that shape is created,
// then the weights are loaded into it.
//
// NamedMpkFileRecorder with FullPrecisionSettings keeps f32
// weights bit-exact, so a reloaded model predicts exactly what
// the saved one did. Adam's moment estimates are not stored.
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{bail, Context, Result};
use burn::{
    prelude::*,
    record::{FullPrecisionSettings, NamedMpkFileRecorder, Record, Recorder},
};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::ml::model::{DigitMlp, DigitMlpConfig, DigitMlpRecord};

/// File stem of the artifact; the recorder appends `.mpk`.
pub const ARTIFACT_STEM: &str = "digit_mlp";

/// Bumped whenever the record layout changes.
pub const FORMAT_VERSION: usize = 1;

type ArtifactRecorder = NamedMpkFileRecorder<FullPrecisionSettings>;

#[derive(Record)]
pub struct DigitArtifactRecord<B: Backend> {
    pub format_version: usize,
    pub input_size:     usize,
    pub hidden_units:   usize,
    pub dropout:        f64,
    pub num_classes:    usize,
    pub model:          DigitMlpRecord<B>,
}

/// Reads and writes the model artifact under one directory.
#[derive(Debug, Clone)]
pub struct ModelStore {
    dir: PathBuf,
}

impl ModelStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path of the artifact file, extension included.
    pub fn artifact_path(&self) -> PathBuf {
        self.dir.join(format!("{ARTIFACT_STEM}.mpk"))
    }

    pub fn exists(&self) -> bool {
        self.artifact_path().is_file()
    }

    /// Write `model` and its architecture. Returns the artifact path.
    pub fn save<B: Backend>(&self, model: &DigitMlp<B>, config: &DigitMlpConfig) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create model directory '{}'", self.dir.display()))?;

        let record = DigitArtifactRecord {
            format_version: FORMAT_VERSION,
            input_size:     config.input_size,
            hidden_units:   config.hidden_units,
            dropout:        config.dropout,
            num_classes:    config.num_classes,
            model:          model.clone().into_record(),
        };
        if self.exists() {
            tracing::info!("Replacing existing model in '{}'", self.dir.display());
        }
        self.write_record(record)?;

        let path = self.artifact_path();
        tracing::info!("Saved model to '{}'", path.display());
        Ok(path)
    }

    /// Rebuild the saved model on `device`, along with its config.
    pub fn load<B: Backend>(&self, device: &B::Device) -> Result<(DigitMlp<B>, DigitMlpConfig)> {
        let path = self.artifact_path();
        if !path.is_file() {
            bail!(
                "No model at '{}'. Run 'train --save-model' first.",
                path.display()
            );
        }

        let record: DigitArtifactRecord<B> = ArtifactRecorder::new()
            .load(self.dir.join(ARTIFACT_STEM), device)
            .with_context(|| format!("Cannot read model artifact '{}'", path.display()))?;

        if record.format_version != FORMAT_VERSION {
            bail!(
                "Model artifact '{}' has format version {}, expected {}",
                path.display(),
                record.format_version,
                FORMAT_VERSION
            );
        }

        let config = DigitMlpConfig::new(record.hidden_units, record.dropout)
            .with_input_size(record.input_size)
            .with_num_classes(record.num_classes);

        // The seed is irrelevant: every parameter is overwritten below.
        let model = config.init::<B>(0, device).load_record(record.model);

        tracing::debug!(
            "Loaded '{}': input={}, hidden={}, classes={}",
            path.display(),
            config.input_size,
            config.hidden_units,
            config.num_classes
        );
        Ok((model, config))
    }

    fn write_record<B: Backend>(&self, record: DigitArtifactRecord<B>) -> Result<()> {
        let stem = self.dir.join(ARTIFACT_STEM);
        ArtifactRecorder::new()
            .record(record, stem.clone())
            .with_context(|| format!("Failed to write model artifact '{}'", stem.display()))
    }
}
