// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between raw pixels and tensor batches.
//
//   MNIST IDX files            uploaded image bytes
//       │                             │
//       ▼                             │
//   MnistLoader  → LabeledImage       │
//       │                             │
//       ▼                             ▼
//   Preprocessor (feature transform, one shared final step)
//       │                             │
//       ▼                             ▼
//   DigitDataset                  FeatureVector → Inferencer
//       │
//       ▼
//   DigitBatcher → DigitBatch tensors → trainer / evaluator

/// Reads MNIST IDX files from a local directory
pub mod loader;

/// The feature transform for dataset and uploaded images
pub mod preprocessor;

/// Transformed samples behind Burn's Dataset trait
pub mod dataset;

/// Stacks samples into Burn tensors
pub mod batcher;
