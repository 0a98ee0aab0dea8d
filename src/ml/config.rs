// ============================================================
// Layer 5 — Model Configuration
// ============================================================
// One config struct covers every model family. Fields a family
// does not use are simply ignored by its builder (the bigram
// table only reads vocab_size, for example).
//
// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
//
// The same struct is written to config.json and embedded in
// each checkpoint's metadata.json so a checkpoint can always
// be rebuilt with the architecture it was saved from.

use burn::prelude::*;

use crate::domain::{error::LmError, model_kind::ModelKind};

#[derive(Config, Debug)]
pub struct LmConfig {
    /// Registry key of the model family
    pub model:      ModelKind,
    /// Instance name; drives every checkpoint path
    pub name:       String,
    pub vocab_size: usize,
    /// Hidden / embedding width
    #[config(default = 64)]
    pub d_model:    usize,
    #[config(default = 4)]
    pub num_heads:  usize,
    #[config(default = 2)]
    pub num_layers: usize,
    #[config(default = 256)]
    pub d_ff:       usize,
    /// Longest context the transformer attends over
    #[config(default = 32)]
    pub block_size: usize,
    #[config(default = 0.1)]
    pub dropout:    f64,
}

impl LmConfig {
    /// Reject hyperparameters the chosen family cannot be built with.
    pub fn validate(&self) -> Result<(), LmError> {
        if self.name.trim().is_empty() {
            return Err(LmError::validation("model name must not be empty"));
        }
        if self.vocab_size == 0 {
            return Err(LmError::validation("vocab_size must be positive"));
        }
        if !(0.0..1.0).contains(&self.dropout) {
            return Err(LmError::validation(format!(
                "dropout must be in [0, 1), got {}", self.dropout
            )));
        }

        match self.model {
            ModelKind::Base | ModelKind::Bigram => {}
            ModelKind::Lstm | ModelKind::Gru => {
                if self.d_model == 0 {
                    return Err(LmError::validation("d_model must be positive"));
                }
            }
            ModelKind::Transformer => {
                if self.d_model == 0 || self.num_heads == 0 || self.d_ff == 0 {
                    return Err(LmError::validation(
                        "d_model, num_heads and d_ff must be positive",
                    ));
                }
                if self.d_model % self.num_heads != 0 {
                    return Err(LmError::validation(format!(
                        "d_model ({}) must be divisible by num_heads ({})",
                        self.d_model, self.num_heads
                    )));
                }
                if self.num_layers == 0 || self.block_size == 0 {
                    return Err(LmError::validation(
                        "num_layers and block_size must be positive",
                    ));
                }
            }
        }
        Ok(())
    }
}
