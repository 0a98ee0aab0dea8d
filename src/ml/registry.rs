// ============================================================
// Layer 5 — Model Registry
// ============================================================
// A closed, load-time-fixed table from registry key to model
// constructor. Callers pick a family by its string key (from
// the CLI or a saved config.json) and never name a concrete
// network type themselves.
//
//   "BaseLM"        → shared base only (cannot be built)
//   "BigramLM"      → BigramLm
//   "LSTMLM"        → LstmLm
//   "GRULM"         → GruLm
//   "TransformerLM" → TransformerLm

use burn::prelude::*;

use crate::domain::{error::LmError, model_kind::ModelKind};
use crate::ml::{
    bigram::BigramLm,
    config::LmConfig,
    network::AnyNetwork,
    recurrent::{GruLm, LstmLm},
    transformer::TransformerLm,
};

/// Static lookup from key to model kind. Has no mutation operations.
pub struct ModelRegistry;

impl ModelRegistry {
    /// Look up a registry key. Unknown keys fail with `LmError::UnknownModel`.
    pub fn resolve(key: &str) -> Result<ModelKind, LmError> {
        key.parse()
    }

    /// All registered keys, in registry order
    pub fn keys() -> impl Iterator<Item = &'static str> {
        ModelKind::ALL.into_iter().map(ModelKind::key)
    }
}

impl ModelKind {
    /// The constructor behind a registry entry.
    /// Builds a freshly initialised network for `cfg` on `device`.
    pub fn build<B: Backend>(self, cfg: &LmConfig, device: &B::Device) -> Result<AnyNetwork<B>, LmError> {
        cfg.validate()?;

        let network = match self {
            ModelKind::Base => {
                return Err(LmError::validation(
                    "BaseLM only provides shared behaviour; choose a concrete model",
                ));
            }
            ModelKind::Bigram      => AnyNetwork::Bigram(BigramLm::new(cfg.vocab_size, device)),
            ModelKind::Lstm        => AnyNetwork::Lstm(LstmLm::new(cfg, device)),
            ModelKind::Gru         => AnyNetwork::Gru(GruLm::new(cfg, device)),
            ModelKind::Transformer => AnyNetwork::Transformer(TransformerLm::new(cfg, device)),
        };

        tracing::debug!("Built {} with {} parameters", self, network.num_params());
        Ok(network)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::network::Network;
    use burn::backend::NdArray;

    type TB = NdArray;

    fn small_config(kind: ModelKind) -> LmConfig {
        LmConfig::new(kind, "reg-test".to_string(), 11)
            .with_d_model(8)
            .with_num_heads(2)
            .with_num_layers(1)
            .with_d_ff(16)
            .with_block_size(6)
    }

    #[test]
    fn test_resolve_bigram() {
        let kind = ModelRegistry::resolve("BigramLM").unwrap();
        assert_eq!(kind, ModelKind::Bigram);

        let net = kind.build::<TB>(&small_config(kind), &Default::default()).unwrap();
        assert!(matches!(net, AnyNetwork::Bigram(_)));
    }

    #[test]
    fn test_resolve_unknown_key() {
        let err = ModelRegistry::resolve("unknown_key").unwrap_err();
        assert!(matches!(err, LmError::UnknownModel { .. }));
    }

    #[test]
    fn test_keys_in_order() {
        let keys: Vec<_> = ModelRegistry::keys().collect();
        assert_eq!(keys, ["BaseLM", "BigramLM", "LSTMLM", "GRULM", "TransformerLM"]);
    }

    #[test]
    fn test_base_resolves_but_cannot_be_built() {
        let kind = ModelRegistry::resolve("BaseLM").unwrap();
        let built = kind.build::<TB>(&small_config(kind), &Default::default());
        assert!(matches!(built, Err(LmError::Validation(_))));
    }

    #[test]
    fn test_every_concrete_kind_produces_vocab_logits() {
        let device = Default::default();
        let input = Tensor::<TB, 2, Int>::from_data(
            TensorData::new(vec![1i64, 2, 3, 4, 5, 6, 7, 8], [2, 4]),
            &device,
        );

        for kind in ModelKind::ALL.into_iter().filter(|&k| k != ModelKind::Base) {
            let net = kind.build::<TB>(&small_config(kind), &device).unwrap();
            assert_eq!(net.kind(), kind);
            assert!(net.num_params() > 0);
            let logits = net.forward(input.clone());
            assert_eq!(logits.dims(), [2, 4, 11], "{kind}");
        }
    }

    #[test]
    fn test_invalid_config_is_rejected_before_building() {
        let cfg = small_config(ModelKind::Transformer).with_num_heads(3);
        let built = ModelKind::Transformer.build::<TB>(&cfg, &Default::default());
        assert!(matches!(built, Err(LmError::Validation(_))));
    }
}
