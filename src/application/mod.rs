// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Workflow coordination only: no tensor code, no clap types,
// no HTTP types. The CLI and the HTTP router both call into
// these two use cases.
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// Load → transform → train → evaluate → save
pub mod train_use_case;

// Upload bytes → transform → classify → response payload
pub mod predict_use_case;
