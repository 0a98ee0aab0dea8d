// ============================================================
// Layer 5 — Recurrent Models (LSTM, GRU)
// ============================================================
// Both families share the same shape:
//
//   token ids [B, T]
//       │  Embedding(vocab → d_model)
//       ▼
//   [B, T, d_model]
//       │  Lstm / Gru (batch-first, zero initial state)
//       ▼
//   [B, T, d_model]
//       │  Dropout → Linear(d_model → vocab)
//       ▼
//   logits [B, T, vocab]
//
// The recurrent state is not carried between calls; generation
// re-runs the full prefix each step.
//
// Reference: Hochreiter & Schmidhuber (1997) LSTM
//            Cho et al. (2014) GRU

use burn::{
    nn::{
        gru::{Gru, GruConfig},
        lstm::{Lstm, LstmConfig},
        Dropout, DropoutConfig,
        Embedding, EmbeddingConfig,
        Linear, LinearConfig,
    },
    prelude::*,
};

use crate::ml::{config::LmConfig, network::Network};

// ─── LSTM ─────────────────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct LstmLm<B: Backend> {
    pub embedding: Embedding<B>,
    pub lstm:      Lstm<B>,
    pub dropout:   Dropout,
    pub lm_head:   Linear<B>,
}

impl<B: Backend> LstmLm<B> {
    pub fn new(cfg: &LmConfig, device: &B::Device) -> Self {
        Self {
            embedding: EmbeddingConfig::new(cfg.vocab_size, cfg.d_model).init(device),
            lstm:      LstmConfig::new(cfg.d_model, cfg.d_model, true).init(device),
            dropout:   DropoutConfig::new(cfg.dropout).init(),
            lm_head:   LinearConfig::new(cfg.d_model, cfg.vocab_size).init(device),
        }
    }
}

impl<B: Backend> Network<B> for LstmLm<B> {
    fn forward(&self, input_ids: Tensor<B, 2, Int>) -> Tensor<B, 3> {
        let x = self.embedding.forward(input_ids);
        let (hidden, _state) = self.lstm.forward(x, None);
        self.lm_head.forward(self.dropout.forward(hidden))
    }
}

// ─── GRU ──────────────────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct GruLm<B: Backend> {
    pub embedding: Embedding<B>,
    pub gru:       Gru<B>,
    pub dropout:   Dropout,
    pub lm_head:   Linear<B>,
}

impl<B: Backend> GruLm<B> {
    pub fn new(cfg: &LmConfig, device: &B::Device) -> Self {
        Self {
            embedding: EmbeddingConfig::new(cfg.vocab_size, cfg.d_model).init(device),
            gru:       GruConfig::new(cfg.d_model, cfg.d_model, true).init(device),
            dropout:   DropoutConfig::new(cfg.dropout).init(),
            lm_head:   LinearConfig::new(cfg.d_model, cfg.vocab_size).init(device),
        }
    }
}

impl<B: Backend> Network<B> for GruLm<B> {
    fn forward(&self, input_ids: Tensor<B, 2, Int>) -> Tensor<B, 3> {
        let x = self.embedding.forward(input_ids);
        let hidden = self.gru.forward(x, None);
        self.lm_head.forward(self.dropout.forward(hidden))
    }
}
