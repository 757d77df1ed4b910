// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types and traits that define what the system is
// about: feature vectors, labels, hyperparameters, predictions
// and the errors that can happen while producing them.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O or network calls
//   - Only plain Rust structs, enums, and traits
//
// Everything that crosses the train/serve boundary is defined
// here once, so both halves of the system agree on it.

/// Error taxonomy shared by training and serving
pub mod error;

/// FeatureVector, Label and the 28x28 geometry constants
pub mod features;

/// Training hyperparameters and their validation
pub mod hyperparameters;

/// PredictionResult and arg-max
pub mod prediction;

/// Core abstractions (traits) that other layers implement
pub mod traits;
