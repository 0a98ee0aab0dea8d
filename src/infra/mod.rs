// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Filesystem concerns that sit next to the model core:
//
//   checkpoint.rs — Saving and loading model weights
//                   Records networks with Burn's BinBytesRecorder
//                   into the name-derived checkpoint layout, and
//                   keeps metadata.json / config.json beside them
//                   so a checkpoint can rebuild its architecture.
//
//   metrics.rs    — Score logging
//                   Appends cross-entropy / perplexity rows to a
//                   CSV in the model's plot directory.
//
// Reference: Rust Book §9 (Error Handling with anyhow)
//            Burn Book §5 (Checkpointing)

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Score CSV logger
pub mod metrics;
