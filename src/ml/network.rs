// ============================================================
// Layer 5 — Network Capability
// ============================================================
// The one thing every architecture must provide: map token ids
// [B, T] to next-token logits [B, T, vocab]. Loss, sampling
// and checkpoint paths live in ModelBase; a network knows
// nothing about them.
//
// AnyNetwork is the closed sum over the families the registry
// can build. It dispatches statically — no trait objects.

use burn::prelude::*;

use crate::domain::model_kind::ModelKind;
use crate::ml::{
    bigram::BigramLm,
    recurrent::{GruLm, LstmLm},
    transformer::TransformerLm,
};

/// A forward pass from token ids to logits.
pub trait Network<B: Backend> {
    /// input_ids: [B, T] → logits: [B, T, vocab]
    fn forward(&self, input_ids: Tensor<B, 2, Int>) -> Tensor<B, 3>;

    /// Longest sequence the network accepts, if it has a limit
    fn context_window(&self) -> Option<usize> {
        None
    }
}

/// One network of any registered family.
#[derive(Debug, Clone)]
pub enum AnyNetwork<B: Backend> {
    Bigram(BigramLm<B>),
    Lstm(LstmLm<B>),
    Gru(GruLm<B>),
    Transformer(TransformerLm<B>),
}

impl<B: Backend> AnyNetwork<B> {
    pub fn kind(&self) -> ModelKind {
        match self {
            AnyNetwork::Bigram(_)      => ModelKind::Bigram,
            AnyNetwork::Lstm(_)        => ModelKind::Lstm,
            AnyNetwork::Gru(_)         => ModelKind::Gru,
            AnyNetwork::Transformer(_) => ModelKind::Transformer,
        }
    }

    /// Total number of trainable scalars
    pub fn num_params(&self) -> usize {
        match self {
            AnyNetwork::Bigram(m)      => m.num_params(),
            AnyNetwork::Lstm(m)        => m.num_params(),
            AnyNetwork::Gru(m)         => m.num_params(),
            AnyNetwork::Transformer(m) => m.num_params(),
        }
    }
}

impl<B: Backend> Network<B> for AnyNetwork<B> {
    fn forward(&self, input_ids: Tensor<B, 2, Int>) -> Tensor<B, 3> {
        match self {
            AnyNetwork::Bigram(m)      => m.forward(input_ids),
            AnyNetwork::Lstm(m)        => m.forward(input_ids),
            AnyNetwork::Gru(m)         => m.forward(input_ids),
            AnyNetwork::Transformer(m) => m.forward(input_ids),
        }
    }

    fn context_window(&self) -> Option<usize> {
        match self {
            AnyNetwork::Transformer(m) => Network::context_window(m),
            _ => None,
        }
    }
}
