// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All Burn modules, the training loop and inference live here.
// Layers above only see DigitMlp through the trainer, the
// evaluator and the DigitClassifier trait.
//
//   model.rs      — 784 → Dense+ReLU → Dropout → Dense+ReLU → 10
//   trainer.rs    — Adam, one-hot cross-entropy, seeded shuffles
//   evaluator.rs  — batched arg-max accuracy on a held-out set
//   inferencer.rs — the loaded model behind DigitClassifier
//
// Backend: NdArray on the CPU by default, Wgpu with the `wgpu`
// cargo feature. Training wraps it in Autodiff.
//
// Reference: Burn Book §3 (Building Blocks)

/// The digit MLP and its config
pub mod model;

/// Mini-batch training loop
pub mod trainer;

/// Test-set accuracy
pub mod evaluator;

/// Single-image inference for serving
pub mod inferencer;

#[cfg(feature = "wgpu")]
pub type InferBackend = burn::backend::Wgpu;

#[cfg(not(feature = "wgpu"))]
pub type InferBackend = burn::backend::NdArray;

pub type TrainBackend = burn::backend::Autodiff<InferBackend>;

/// Dropout draws from the backend's process-wide RNG, so tests that
/// train with dropout > 0 hold this lock to keep their masks seeded.
#[cfg(test)]
pub(crate) static BACKEND_RNG: std::sync::Mutex<()> = std::sync::Mutex::new(());
