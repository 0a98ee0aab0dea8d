// ============================================================
// Layer 5 — Bigram Model
// ============================================================
// The smallest possible language model: each token looks up a
// row of next-token logits directly. The embedding table is
// [vocab, vocab], so no other layer is needed.

use burn::{
    nn::{Embedding, EmbeddingConfig},
    prelude::*,
};

use crate::ml::network::Network;

#[derive(Module, Debug)]
pub struct BigramLm<B: Backend> {
    pub token_logits: Embedding<B>,
}

impl<B: Backend> BigramLm<B> {
    pub fn new(vocab_size: usize, device: &B::Device) -> Self {
        Self {
            token_logits: EmbeddingConfig::new(vocab_size, vocab_size).init(device),
        }
    }
}

impl<B: Backend> Network<B> for BigramLm<B> {
    fn forward(&self, input_ids: Tensor<B, 2, Int>) -> Tensor<B, 3> {
        self.token_logits.forward(input_ids)
    }
}
