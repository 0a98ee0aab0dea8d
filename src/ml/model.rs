// ============================================================
// Layer 5 — Language Model (base + network)
// ============================================================
// A LanguageModel is the composition of:
//   - a ModelBase   (name, vocab, device, paths, loss, sampling)
//   - an AnyNetwork (the architecture's forward pass)
//   - the LmConfig it was built from (needed to rebuild it)
//
// Every operation here is the base's shared behaviour wrapped
// around the network's forward pass:
//
//   forward       — network only, with a context-length check
//   forward_loss  — forward + ModelBase::compute_loss
//   generate      — forward + ModelBase::new_token, repeated

use burn::prelude::*;
use rand::Rng;

use crate::domain::{error::LmError, model_kind::ModelKind};
use crate::ml::{
    base::{LossOutput, ModelBase},
    config::LmConfig,
    network::{AnyNetwork, Network},
};

#[derive(Debug, Clone)]
pub struct LanguageModel<B: Backend> {
    base:    ModelBase<B>,
    config:  LmConfig,
    network: AnyNetwork<B>,
}

impl<B: Backend> LanguageModel<B> {
    /// Build a freshly initialised model of the family named in `config.model`.
    pub fn from_config(config: LmConfig, device: B::Device) -> Result<Self, LmError> {
        let kind    = config.model;
        let network = kind.build::<B>(&config, &device)?;
        let base    = ModelBase::new(config.vocab_size, config.name.clone(), device)?;

        tracing::info!(
            "Initialised {} '{}' (vocab={}, params={})",
            kind, base.name(), base.vocab_size(), network.num_params()
        );
        Ok(Self { base, config, network })
    }

    /// Replace the network, e.g. with one whose weights came from a checkpoint.
    pub fn with_network(mut self, network: AnyNetwork<B>) -> Result<Self, LmError> {
        if network.kind() != self.network.kind() {
            return Err(LmError::Checkpoint(format!(
                "expected a {} network, got {}",
                self.network.kind(), network.kind()
            )));
        }
        self.network = network;
        Ok(self)
    }

    pub fn base(&self) -> &ModelBase<B> {
        &self.base
    }

    pub fn config(&self) -> &LmConfig {
        &self.config
    }

    pub fn network(&self) -> &AnyNetwork<B> {
        &self.network
    }

    pub fn kind(&self) -> ModelKind {
        self.network.kind()
    }

    /// input_ids: [B, T] → logits: [B, T, vocab]
    pub fn forward(&self, input_ids: Tensor<B, 2, Int>) -> Result<Tensor<B, 3>, LmError> {
        let [_, seq_len] = input_ids.dims();
        if let Some(window) = self.network.context_window() {
            if seq_len > window {
                return Err(LmError::shape(format!(
                    "sequence length {seq_len} exceeds the context window of {window}"
                )));
            }
        }
        Ok(self.network.forward(input_ids))
    }

    /// Forward pass followed by the shared loss computation.
    pub fn forward_loss(
        &self,
        input_ids: Tensor<B, 2, Int>,
        targets:   Option<Tensor<B, 2, Int>>,
    ) -> Result<LossOutput<B>, LmError> {
        let logits = self.forward(input_ids.clone())?;
        self.base.compute_loss(&input_ids, logits, targets)
    }

    /// Extend every row of `input_ids` by `max_new_tokens` sampled tokens.
    ///
    /// Networks with a context window only see the trailing
    /// `window` tokens of the running sequence.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        input_ids:      Tensor<B, 2, Int>,
        max_new_tokens: usize,
        rng:            &mut R,
    ) -> Result<Tensor<B, 2, Int>, LmError> {
        let [batch, prompt_len] = input_ids.dims();
        if prompt_len == 0 {
            return Err(LmError::shape("generation needs at least one prompt token"));
        }

        let mut idx = input_ids;
        for _ in 0..max_new_tokens {
            let [_, seq_len] = idx.dims();
            let context = match self.network.context_window() {
                Some(window) if seq_len > window => {
                    idx.clone().slice([0..batch, seq_len - window..seq_len])
                }
                _ => idx.clone(),
            };

            let logits = self.forward(context)?;
            let next   = self.base.new_token(logits, rng)?;
            idx = Tensor::cat(vec![idx, next], 1);
        }

        tracing::debug!("Generated {} tokens for {} rows", max_new_tokens, batch);
        Ok(idx)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use rand::{rngs::StdRng, SeedableRng};

    type TB = NdArray;

    fn model(kind: ModelKind) -> LanguageModel<TB> {
        let cfg = LmConfig::new(kind, "unit".to_string(), 9)
            .with_d_model(8)
            .with_num_heads(2)
            .with_num_layers(1)
            .with_d_ff(16)
            .with_block_size(4)
            .with_dropout(0.0);
        LanguageModel::from_config(cfg, Default::default()).unwrap()
    }

    fn ids(values: Vec<i64>, shape: [usize; 2]) -> Tensor<TB, 2, Int> {
        Tensor::from_data(TensorData::new(values, shape), &Default::default())
    }

    #[test]
    fn test_base_lm_cannot_be_instantiated() {
        let cfg = LmConfig::new(ModelKind::Base, "base".to_string(), 9);
        let built = LanguageModel::<TB>::from_config(cfg, Default::default());
        assert!(matches!(built, Err(LmError::Validation(_))));
    }

    #[test]
    fn test_forward_loss_with_and_without_targets() {
        let m = model(ModelKind::Gru);
        let input = ids(vec![0, 1, 2, 3, 4, 5], [2, 3]);

        let none = m.forward_loss(input.clone(), None).unwrap();
        assert!(none.loss.is_none());
        assert_eq!(none.logits.dims(), [2, 3, 9]);

        let some = m.forward_loss(input, Some(ids(vec![1, 2, 3, 4, 5, 6], [2, 3]))).unwrap();
        let loss = some.loss.unwrap().into_scalar().elem::<f32>();
        assert!(loss.is_finite() && loss > 0.0);
    }

    #[test]
    fn test_generate_appends_requested_tokens() {
        let mut rng = StdRng::seed_from_u64(3);
        for kind in [ModelKind::Bigram, ModelKind::Lstm, ModelKind::Gru] {
            let m   = model(kind);
            let out = m.generate(ids(vec![1, 2], [2, 1]), 5, &mut rng).unwrap();
            assert_eq!(out.dims(), [2, 6], "{kind}");

            let values = out.into_data().convert::<i64>().to_vec::<i64>().unwrap();
            assert!(values.iter().all(|&t| (0..9).contains(&t)));
            // prompt is preserved
            assert_eq!(values[0], 1);
            assert_eq!(values[6], 2);
        }
    }

    #[test]
    fn test_transformer_crops_context_when_generating() {
        let m = model(ModelKind::Transformer);
        let mut rng = StdRng::seed_from_u64(11);
        // block_size is 4; generate well past it
        let out = m.generate(ids(vec![0, 1, 2], [1, 3]), 6, &mut rng).unwrap();
        assert_eq!(out.dims(), [1, 9]);
    }

    #[test]
    fn test_transformer_forward_rejects_long_input() {
        let m = model(ModelKind::Transformer);
        let too_long = ids(vec![0; 5], [1, 5]);
        assert!(matches!(m.forward(too_long), Err(LmError::Shape(_))));
    }

    #[test]
    fn test_generate_is_reproducible_with_seed() {
        let m = model(ModelKind::Bigram);
        let a = m.generate(ids(vec![4], [1, 1]), 8, &mut StdRng::seed_from_u64(5)).unwrap();
        let b = m.generate(ids(vec![4], [1, 1]), 8, &mut StdRng::seed_from_u64(5)).unwrap();
        assert_eq!(
            a.into_data().convert::<i64>().to_vec::<i64>().unwrap(),
            b.into_data().convert::<i64>().to_vec::<i64>().unwrap(),
        );
    }

    #[test]
    fn test_with_network_rejects_other_family() {
        let m     = model(ModelKind::Lstm);
        let other = model(ModelKind::Gru).network().clone();
        assert!(m.with_network(other).is_err());
    }

    #[test]
    fn test_paths_follow_name() {
        let m = model(ModelKind::Bigram);
        assert_eq!(m.base().paths().plot_dir, std::path::Path::new("plots/unit"));
    }
}
