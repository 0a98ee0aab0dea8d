// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the subcommands and all their configurable flags:
//
//   models   — list the registry
//   paths    — show where a model's files live
//   init     — build a fresh model and save it
//   generate — sample tokens from a saved model
//   score    — measure a saved model's loss on a sequence
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for missing args
//   - type conversion (string → usize, f64, ModelKind, etc.)
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};

use crate::domain::model_kind::ModelKind;
use crate::ml::{config::LmConfig, registry::ModelRegistry};

/// The top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List every registered model key
    Models,

    /// Print the checkpoint, metadata, plot and config paths for a model name
    Paths(PathsArgs),

    /// Build a freshly initialised model and save its checkpoint
    Init(InitArgs),

    /// Extend a prompt of token ids by sampling from a saved model
    Generate(GenerateArgs),

    /// Mean next-token cross-entropy of a token sequence under a saved model
    Score(ScoreArgs),
}

#[derive(Args, Debug)]
pub struct PathsArgs {
    /// Model instance name
    #[arg(long)]
    pub name: String,
}

/// All arguments for the `init` command.
/// Each field becomes a --flag on the command line.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Registry key: BigramLM, LSTMLM, GRULM or TransformerLM
    #[arg(long, value_parser = parse_model_kind)]
    pub model: ModelKind,

    /// Model instance name — every checkpoint path is derived from it
    #[arg(long)]
    pub name: String,

    /// Total number of distinct token ids
    #[arg(long)]
    pub vocab_size: usize,

    /// Hidden width (embedding / recurrent state / d_model)
    #[arg(long, default_value_t = 64)]
    pub d_model: usize,

    /// Attention heads (transformer only; must divide d_model)
    #[arg(long, default_value_t = 4)]
    pub num_heads: usize,

    /// Decoder blocks (transformer only)
    #[arg(long, default_value_t = 2)]
    pub num_layers: usize,

    /// Feed-forward inner width (transformer only)
    #[arg(long, default_value_t = 256)]
    pub d_ff: usize,

    /// Longest context the transformer attends over
    #[arg(long, default_value_t = 32)]
    pub block_size: usize,

    /// Dropout probability
    #[arg(long, default_value_t = 0.1)]
    pub dropout: f64,

    /// Replace an existing checkpoint with the same name
    #[arg(long)]
    pub overwrite: bool,
}

/// Convert CLI InitArgs into the ml-layer LmConfig.
/// The application layer never sees clap types.
impl From<&InitArgs> for LmConfig {
    fn from(a: &InitArgs) -> Self {
        LmConfig::new(a.model, a.name.clone(), a.vocab_size)
            .with_d_model(a.d_model)
            .with_num_heads(a.num_heads)
            .with_num_layers(a.num_layers)
            .with_d_ff(a.d_ff)
            .with_block_size(a.block_size)
            .with_dropout(a.dropout)
    }
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Name of a model saved with `init`
    #[arg(long)]
    pub name: String,

    /// Comma-separated prompt token ids
    #[arg(long, value_delimiter = ',', default_value = "0")]
    pub prompt: Vec<u32>,

    /// Number of tokens to sample after the prompt
    #[arg(long, default_value_t = 20)]
    pub max_new_tokens: usize,

    /// Seed for reproducible sampling
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Args, Debug)]
pub struct ScoreArgs {
    /// Name of a model saved with `init`
    #[arg(long)]
    pub name: String,

    /// Comma-separated token ids (at least two)
    #[arg(long, value_delimiter = ',', required = true)]
    pub tokens: Vec<u32>,
}

fn parse_model_kind(key: &str) -> Result<ModelKind, String> {
    ModelRegistry::resolve(key).map_err(|e| e.to_string())
}
