// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// File-system concerns shared by training and serving:
//
//   artifact.rs — ModelStore: writes and reads digit_mlp.mpk,
//                 the architecture plus all weights, with
//                 Burn's full-precision MessagePack recorder
//
//   metrics.rs  — per-epoch loss/accuracy appended to
//                 metrics.csv beside the artifact
//
// Reference: Burn Book §5 (Checkpointing)

/// Model artifact saving and loading
pub mod artifact;

/// Training metrics CSV logger
pub mod metrics;
