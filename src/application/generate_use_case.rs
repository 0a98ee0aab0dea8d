// ============================================================
// Layer 2 — GenerateUseCase
// ============================================================
// Loads a saved model and extends a prompt of token ids by
// sampling from the model one token at a time.
//
//   Step 1: Rebuild + load the model  (Layer 6 - infra)
//   Step 2: Validate the prompt ids   (against vocab_size)
//   Step 3: Sample new tokens         (Layer 5 - ml)
//
// Without a seed every run draws different tokens; with one
// the output is reproducible on the same backend.

use anyhow::Result;
use burn::prelude::*;
use rand::{rngs::StdRng, SeedableRng};
use std::path::PathBuf;

use crate::application::{token_row, token_values};
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::backend::BackendTask;

pub struct GenerateUseCase {
    pub root:           PathBuf,
    pub name:           String,
    pub prompt:         Vec<u32>,
    pub max_new_tokens: usize,
    pub seed:           Option<u64>,
}

impl BackendTask for GenerateUseCase {
    /// Prompt followed by the sampled tokens
    type Output = Vec<u32>;

    fn run<B: Backend>(self, device: B::Device) -> Result<Vec<u32>> {
        let ckpt  = CheckpointManager::new(&self.root, &self.name);
        let model = ckpt.load_model::<B>(&device)?;

        let base  = model.base();
        let input = token_row::<B>(&self.prompt, base.vocab_size(), base.device())?;

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None       => StdRng::from_entropy(),
        };

        tracing::info!(
            "Generating {} tokens from a {}-token prompt with '{}'",
            self.max_new_tokens, self.prompt.len(), self.name
        );
        let output = model.generate(input, self.max_new_tokens, &mut rng)?;
        token_values(output)
    }
}
