// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types shared by every other layer:
//   - the error taxonomy
//   - the closed set of model kinds (registry keys)
//   - checkpoint path conventions
//   - the device selection policy
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//
// Reference: Rust Book §5 (Structs), §6 (Enums)

/// LmError — the error type of the model core
pub mod error;

/// ModelKind — registry keys
pub mod model_kind;

/// CheckpointPaths — name-derived filesystem layout
pub mod paths;

/// DeviceKind — CPU or accelerator
pub mod device;
