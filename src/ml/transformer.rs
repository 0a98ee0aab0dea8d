// ============================================================
// Layer 5 — Transformer Language Model
// ============================================================
// Decoder-only transformer for next-token prediction:
//   • Token embeddings
//   • Learned positional embeddings (up to block_size)
//   • N causal self-attention blocks (post-norm, GELU FFN)
//   • Final layer norm
//   • Linear head onto the vocabulary
//
// The attention mask is autoregressive: position t only sees
// positions ≤ t, so logits at t are a prediction for t+1.
//
// Reference: Vaswani et al. (2017) Attention Is All You Need
//            Radford et al. (2019) GPT-2

use burn::{
    nn::{
        attention::{generate_autoregressive_mask, MhaInput, MultiHeadAttention, MultiHeadAttentionConfig},
        Dropout, DropoutConfig,
        Embedding, EmbeddingConfig,
        LayerNorm, LayerNormConfig,
        Linear, LinearConfig,
    },
    prelude::*,
    tensor::activation::gelu,
};

use crate::ml::{config::LmConfig, network::Network};

#[derive(Module, Debug)]
pub struct DecoderBlock<B: Backend> {
    pub self_attn:   MultiHeadAttention<B>,
    pub ffn_linear1: Linear<B>,
    pub ffn_linear2: Linear<B>,
    pub norm1:       LayerNorm<B>,
    pub norm2:       LayerNorm<B>,
    pub dropout:     Dropout,
}

impl<B: Backend> DecoderBlock<B> {
    fn new(cfg: &LmConfig, device: &B::Device) -> Self {
        Self {
            self_attn:   MultiHeadAttentionConfig::new(cfg.d_model, cfg.num_heads)
                .with_dropout(cfg.dropout)
                .init(device),
            ffn_linear1: LinearConfig::new(cfg.d_model, cfg.d_ff).init(device),
            ffn_linear2: LinearConfig::new(cfg.d_ff, cfg.d_model).init(device),
            norm1:       LayerNormConfig::new(cfg.d_model).init(device),
            norm2:       LayerNormConfig::new(cfg.d_model).init(device),
            dropout:     DropoutConfig::new(cfg.dropout).init(),
        }
    }

    pub fn forward(&self, x: Tensor<B, 3>, mask: Tensor<B, 3, Bool>) -> Tensor<B, 3> {
        let attn_output = self.self_attn
            .forward(MhaInput::self_attn(x.clone()).mask_attn(mask))
            .context;
        let x = self.norm1.forward(x + self.dropout.forward(attn_output));
        let ffn_out = self.ffn_linear2.forward(gelu(self.ffn_linear1.forward(x.clone())));
        self.norm2.forward(x + self.dropout.forward(ffn_out))
    }
}

#[derive(Module, Debug)]
pub struct TransformerLm<B: Backend> {
    pub token_embedding:    Embedding<B>,
    pub position_embedding: Embedding<B>,
    pub layers:             Vec<DecoderBlock<B>>,
    pub final_norm:         LayerNorm<B>,
    pub lm_head:            Linear<B>,
    pub dropout:            Dropout,
    pub block_size:         usize,
}

impl<B: Backend> TransformerLm<B> {
    pub fn new(cfg: &LmConfig, device: &B::Device) -> Self {
        let layers = (0..cfg.num_layers)
            .map(|_| DecoderBlock::new(cfg, device))
            .collect();
        Self {
            token_embedding:    EmbeddingConfig::new(cfg.vocab_size, cfg.d_model).init(device),
            position_embedding: EmbeddingConfig::new(cfg.block_size, cfg.d_model).init(device),
            layers,
            final_norm:         LayerNormConfig::new(cfg.d_model).init(device),
            lm_head:            LinearConfig::new(cfg.d_model, cfg.vocab_size).init(device),
            dropout:            DropoutConfig::new(cfg.dropout).init(),
            block_size:         cfg.block_size,
        }
    }
}

impl<B: Backend> Network<B> for TransformerLm<B> {
    /// input_ids: [batch, seq_len ≤ block_size] → logits: [batch, seq_len, vocab]
    fn forward(&self, input_ids: Tensor<B, 2, Int>) -> Tensor<B, 3> {
        let [batch_size, seq_len] = input_ids.dims();
        let device = input_ids.device();

        let tok_emb = self.token_embedding.forward(input_ids);

        let positions = Tensor::<B, 1, Int>::arange(0..seq_len as i64, &device)
            .unsqueeze::<2>()
            .expand([batch_size, seq_len]);
        let pos_emb = self.position_embedding.forward(positions);

        let mask = generate_autoregressive_mask::<B>(batch_size, seq_len, &device);

        let mut x = self.dropout.forward(tok_emb + pos_emb);
        for layer in &self.layers {
            x = layer.forward(x, mask.clone());
        }
        let x = self.final_norm.forward(x); // [batch, seq_len, d_model]

        self.lm_head.forward(x)
    }

    fn context_window(&self) -> Option<usize> {
        Some(self.block_size)
    }
}
