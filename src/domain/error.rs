// ============================================================
// Layer 3 — Error Taxonomy
// ============================================================
// Every fallible operation in the domain and ml layers returns
// LmError. The application and CLI layers wrap it in anyhow
// with extra context, the same way they wrap I/O errors.
//
// Variants map onto the three failure families of the model
// core, plus weight encoding. File and JSON errors stay in
// anyhow at the infra layer:
//
//   Validation   — bad constructor input (empty name, zero vocab)
//   Shape        — tensor dimensions that do not line up
//   UnknownModel — registry lookup for a key outside the table
//   Sampling     — a next-token distribution that cannot be drawn from
//   Checkpoint   — recorder encode/decode failures
//
// Reference: Rust Book §9 (Recoverable Errors with Result)
//            thiserror crate documentation

use thiserror::Error;

/// Errors raised by model construction, loss, sampling and the registry.
#[derive(Debug, Error)]
pub enum LmError {
    /// Constructor or config input outside its valid range
    #[error("validation error: {0}")]
    Validation(String),

    /// Tensor dimensions that disagree with each other
    #[error("shape error: {0}")]
    Shape(String),

    /// Registry key that is not one of the known model kinds
    #[error("unknown model '{key}', expected one of: {known}")]
    UnknownModel { key: String, known: String },

    /// Probability row that cannot back a categorical draw
    #[error("sampling error: {0}")]
    Sampling(String),

    /// Weights could not be encoded or decoded
    #[error("checkpoint error: {0}")]
    Checkpoint(String),
}

impl LmError {
    pub fn shape(msg: impl Into<String>) -> Self {
        LmError::Shape(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        LmError::Validation(msg.into())
    }
}
