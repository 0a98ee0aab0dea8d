// ============================================================
// Layer 3 — Model Kinds
// ============================================================
// The closed set of model families the project knows about.
// The string keys are the ones written into config.json and
// accepted on the command line; serde and FromStr both use
// exactly these spellings.
//
// Adding a family means adding a variant here and a build arm
// in ml::registry — there is no runtime registration.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::domain::error::LmError;

/// One entry of the model registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelKind {
    #[serde(rename = "BaseLM")]
    Base,
    #[serde(rename = "BigramLM")]
    Bigram,
    #[serde(rename = "LSTMLM")]
    Lstm,
    #[serde(rename = "GRULM")]
    Gru,
    #[serde(rename = "TransformerLM")]
    Transformer,
}

impl ModelKind {
    /// Every kind, in registry order
    pub const ALL: [ModelKind; 5] = [
        ModelKind::Base,
        ModelKind::Bigram,
        ModelKind::Lstm,
        ModelKind::Gru,
        ModelKind::Transformer,
    ];

    /// The registry key for this kind
    pub fn key(self) -> &'static str {
        match self {
            ModelKind::Base        => "BaseLM",
            ModelKind::Bigram      => "BigramLM",
            ModelKind::Lstm        => "LSTMLM",
            ModelKind::Gru         => "GRULM",
            ModelKind::Transformer => "TransformerLM",
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            ModelKind::Base        => "shared base (loss, sampling, paths); not instantiable",
            ModelKind::Bigram      => "token -> next-token logits lookup table",
            ModelKind::Lstm        => "embedding + LSTM + linear head",
            ModelKind::Gru         => "embedding + GRU + linear head",
            ModelKind::Transformer => "causal self-attention decoder",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ModelKind {
    type Err = LmError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        ModelKind::ALL
            .into_iter()
            .find(|kind| kind.key() == key)
            .ok_or_else(|| LmError::UnknownModel {
                key:   key.to_string(),
                known: ModelKind::ALL.map(ModelKind::key).join(", "),
            })
    }
}
