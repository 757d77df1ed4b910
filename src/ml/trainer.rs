// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Mini-batch training with Adam on one-hot cross-entropy.
//
//   - Training runs on an AutodiffBackend so dropout is live
//     and gradients are tracked
//   - Burn's DataLoader shuffles with the run's seed and draws
//     a new order each epoch, so two runs with the same seed see
//     the same batches
//   - No validation split and no early stopping: every epoch
//     runs, then the caller evaluates on the test set
//   - epochs = 0 returns the model untouched
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::{bail, Result};
use burn::{
    data::{dataloader::DataLoaderBuilder, dataset::Dataset},
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::data::{batcher::DigitBatcher, dataset::DigitDataset};
use crate::domain::{error::DigitError, features::FEATURE_LEN, hyperparameters::Hyperparameters};
use crate::infra::metrics::EpochMetrics;
use crate::ml::{evaluator::count_correct, model::DigitMlp};

/// The trained weights plus one metrics row per epoch.
#[derive(Debug)]
pub struct TrainingOutcome<B: AutodiffBackend> {
    pub model:   DigitMlp<B>,
    pub history: Vec<EpochMetrics>,
}

pub fn train<B: AutodiffBackend>(
    model:   DigitMlp<B>,
    dataset: &DigitDataset,
    hp:      &Hyperparameters,
    device:  &B::Device,
    quiet:   bool,
) -> Result<TrainingOutcome<B>> {
    hp.validate()?;

    // Checked before the optimiser exists, so a mismatch can never
    // leave behind a half-updated model.
    if model.input_size() != FEATURE_LEN {
        return Err(DigitError::ShapeMismatch {
            expected: model.input_size(),
            actual:   FEATURE_LEN,
        }
        .into());
    }
    if hp.epochs > 0 && dataset.is_empty() {
        bail!("Training set is empty");
    }

    // Dropout masks come from the backend RNG.
    B::seed(hp.seed);

    // ── Adam optimiser ────────────────────────────────────────────────────────
    // m = β1*m + (1-β1)*g        (mean)
    // v = β2*v + (1-β2)*g²       (variance)
    // θ = θ - lr * m / (√v + ε)  (update)
    let mut optim = AdamConfig::new().with_epsilon(1e-7).init();

    // ── Training data loader (AutodiffBackend) ────────────────────────────────
    let train_loader = DataLoaderBuilder::new(DigitBatcher::<B>::new(device.clone()))
        .batch_size(hp.batch_size)
        .shuffle(hp.seed)
        .build(dataset.clone());

    let mut model   = model;
    let mut history = Vec::with_capacity(hp.epochs);

    tracing::info!(
        "Training {} samples: epochs={}, batch_size={}, lr={}",
        dataset.len(), hp.epochs, hp.batch_size, hp.learning_rate
    );

    for epoch in 1..=hp.epochs {
        let mut loss_sum = 0.0f64;
        let mut batches  = 0usize;
        let mut correct  = 0usize;
        let mut seen     = 0usize;

        for batch in train_loader.iter() {
            let (loss, logits) = model.forward_loss(batch.images, batch.targets);

            loss_sum += loss.clone().into_scalar().elem::<f64>();
            correct  += count_correct(logits, &batch.labels)?;
            seen     += batch.labels.len();
            batches  += 1;

            // Backward pass + Adam update
            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(hp.learning_rate, model, grads);
        }

        let metrics = EpochMetrics::new(
            epoch,
            loss_sum / batches.max(1) as f64,
            correct as f64 / seen.max(1) as f64,
        );

        if !quiet {
            println!(
                "Epoch {:>3}/{} | loss={:.4} | accuracy={:.2}%",
                epoch, hp.epochs, metrics.train_loss, metrics.train_accuracy * 100.0,
            );
        }
        tracing::debug!("Epoch {} done after {} batches", epoch, batches);
        history.push(metrics);
    }

    tracing::info!("Training complete!");
    Ok(TrainingOutcome { model, history })
}
