// ============================================================
// Layer 5 — Shared Model Base
// ============================================================
// State and behaviour every model family shares, independent
// of its architecture:
//
//   ModelBase::new   — validates inputs, derives checkpoint paths
//   compute_loss     — mean cross-entropy over (B*T) positions
//   new_token        — draws the next token from the last step
//
// Concrete models hold a ModelBase next to their network
// (see ml::model::LanguageModel) instead of inheriting from it.
//
// Shape conventions used throughout:
//   B = batch size, T = sequence length, C = vocabulary size
//   input_ids: [B, T] Int    logits: [B, T, C]    targets: [B, T] Int
//
// Reference: Burn Book §3 (Building Blocks), §5 (Loss)

use burn::{
    nn::loss::CrossEntropyLossConfig,
    prelude::*,
    tensor::activation::softmax,
};
use rand::{
    distributions::{Distribution, WeightedIndex},
    Rng,
};

use crate::domain::{error::LmError, paths::CheckpointPaths};

/// Identity, vocabulary size, device and paths of one model instance.
/// Immutable after construction.
#[derive(Debug, Clone)]
pub struct ModelBase<B: Backend> {
    name:       String,
    vocab_size: usize,
    device:     B::Device,
    paths:      CheckpointPaths,
}

/// Result of `compute_loss`.
/// `loss` is `None` (not zero) when no targets were given.
#[derive(Debug, Clone)]
pub struct LossOutput<B: Backend> {
    /// The logits, unchanged: [B, T, C]
    pub logits: Tensor<B, 3>,
    /// Mean cross-entropy, shape [1]
    pub loss:   Option<Tensor<B, 1>>,
}

impl<B: Backend> ModelBase<B> {
    /// Build the shared base. No I/O happens here — paths are computed, not created.
    pub fn new(vocab_size: usize, name: impl Into<String>, device: B::Device) -> Result<Self, LmError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(LmError::validation("model name must not be empty"));
        }
        if vocab_size == 0 {
            return Err(LmError::validation("vocab_size must be positive"));
        }

        let paths = CheckpointPaths::for_model(&name);
        tracing::debug!("Model '{}' checkpoints at '{}'", name, paths.ckpt_path.display());

        Ok(Self { name, vocab_size, device, paths })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    pub fn device(&self) -> &B::Device {
        &self.device
    }

    pub fn paths(&self) -> &CheckpointPaths {
        &self.paths
    }

    /// Cross-entropy between `logits` and `targets`, if targets are given.
    ///
    /// `input_ids` only supplies the expected (B, T). Both the logits'
    /// leading dims and the targets must match it. With targets present
    /// the loss is `-mean(log softmax(logits)[i, targets[i]])` over all
    /// B*T positions.
    pub fn compute_loss(
        &self,
        input_ids: &Tensor<B, 2, Int>,
        logits:    Tensor<B, 3>,
        targets:   Option<Tensor<B, 2, Int>>,
    ) -> Result<LossOutput<B>, LmError> {
        let [batch, seq_len] = input_ids.dims();
        let [l_batch, l_seq, vocab] = logits.dims();

        if [l_batch, l_seq] != [batch, seq_len] {
            return Err(LmError::shape(format!(
                "logits lead with [{l_batch}, {l_seq}] but input_ids are [{batch}, {seq_len}]"
            )));
        }

        let Some(targets) = targets else {
            return Ok(LossOutput { logits, loss: None });
        };

        let t_dims = targets.dims();
        if t_dims != [batch, seq_len] {
            return Err(LmError::shape(format!(
                "targets are {t_dims:?} but input_ids are [{batch}, {seq_len}]"
            )));
        }
        if batch * seq_len == 0 {
            return Err(LmError::shape("cannot compute loss over zero positions"));
        }

        let lo = targets.clone().min().into_scalar().elem::<i64>();
        let hi = targets.clone().max().into_scalar().elem::<i64>();
        if lo < 0 || hi >= vocab as i64 {
            return Err(LmError::validation(format!(
                "target ids must lie in [0, {vocab}), got range [{lo}, {hi}]"
            )));
        }

        // (B,T,C) -> (B*T,C): one prediction per token position
        let flat_logits  = logits.clone().reshape([batch * seq_len, vocab]);
        let flat_targets = targets.reshape([batch * seq_len]);

        let ce   = CrossEntropyLossConfig::new().init(&flat_logits.device());
        let loss = ce.forward(flat_logits, flat_targets);

        Ok(LossOutput { logits, loss: Some(loss) })
    }

    /// Draw one token per batch row from the softmax of the last time step.
    ///
    /// Sampling is categorical, not argmax. Pass a seeded `rng` for
    /// reproducible draws. Output: [B, 1] Int.
    pub fn new_token<R: Rng + ?Sized>(
        &self,
        logits: Tensor<B, 3>,
        rng:    &mut R,
    ) -> Result<Tensor<B, 2, Int>, LmError> {
        let device = logits.device();
        let [batch, _, vocab] = logits.dims();

        let probs = last_step_probs(logits)?;

        let mut next = Vec::with_capacity(batch);
        for row in probs.chunks(vocab) {
            let dist = WeightedIndex::new(row)
                .map_err(|e| LmError::Sampling(format!("{e}")))?;
            next.push(dist.sample(rng) as i64);
        }

        Ok(Tensor::from_data(TensorData::new(next, [batch, 1]), &device))
    }
}

/// Softmax over the vocabulary at position T-1, flattened row-major to B*C values.
pub fn last_step_probs<B: Backend>(logits: Tensor<B, 3>) -> Result<Vec<f32>, LmError> {
    let [batch, seq_len, vocab] = logits.dims();
    if seq_len == 0 || vocab == 0 {
        return Err(LmError::shape(format!(
            "cannot sample from logits of shape [{batch}, {seq_len}, {vocab}]"
        )));
    }

    let last  = logits
        .slice([0..batch, seq_len - 1..seq_len, 0..vocab])
        .reshape([batch, vocab]);
    let probs = softmax(last, 1);

    probs
        .into_data()
        .convert::<f32>()
        .to_vec::<f32>()
        .map_err(|e| LmError::Sampling(format!("{e:?}")))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use rand::{rngs::StdRng, SeedableRng};

    type TB = NdArray;

    fn base(vocab: usize) -> ModelBase<TB> {
        ModelBase::new(vocab, "test", Default::default()).unwrap()
    }

    fn logits(values: Vec<f32>, shape: [usize; 3]) -> Tensor<TB, 3> {
        Tensor::from_data(TensorData::new(values, shape), &Default::default())
    }

    fn ids(values: Vec<i64>, shape: [usize; 2]) -> Tensor<TB, 2, Int> {
        Tensor::from_data(TensorData::new(values, shape), &Default::default())
    }

    fn int_values(t: Tensor<TB, 2, Int>) -> Vec<i64> {
        t.into_data().convert::<i64>().to_vec::<i64>().unwrap()
    }

    #[test]
    fn test_demo_paths() {
        let b: ModelBase<TB> = ModelBase::new(100, "demo", Default::default()).unwrap();
        assert_eq!(b.paths().ckpt_path, std::path::Path::new("checkpoints/demo/checkpoint_1/checkpoint.pt"));
        assert_eq!(b.paths().meta_path, std::path::Path::new("checkpoints/demo/checkpoint_1/metadata.json"));
        assert_eq!(b.vocab_size(), 100);
        assert_eq!(b.name(), "demo");
    }

    #[test]
    fn test_rejects_invalid_inputs() {
        let empty = ModelBase::<TB>::new(10, "", Default::default());
        assert!(matches!(empty, Err(LmError::Validation(_))));
        let zero = ModelBase::<TB>::new(0, "x", Default::default());
        assert!(matches!(zero, Err(LmError::Validation(_))));
    }

    #[test]
    fn test_no_targets_means_no_loss() {
        let b = base(5);
        let input = ids(vec![0; 6], [2, 3]);
        let values: Vec<f32> = (0..30).map(|i| i as f32 * 0.1).collect();
        let out = b.compute_loss(&input, logits(values.clone(), [2, 3, 5]), None).unwrap();

        assert!(out.loss.is_none());
        assert_eq!(out.logits.dims(), [2, 3, 5]);
        let back = out.logits.into_data().to_vec::<f32>().unwrap();
        assert_eq!(back, values);
    }

    #[test]
    fn test_loss_matches_manual_cross_entropy() {
        // B=2, T=3, C=5, every target is class 2
        let b = base(5);
        let input   = ids(vec![0; 6], [2, 3]);
        let targets = ids(vec![2; 6], [2, 3]);
        let values: Vec<f32> = (0..30).map(|i| ((i * 7) % 11) as f32 * 0.3 - 1.0).collect();

        let out  = b.compute_loss(&input, logits(values.clone(), [2, 3, 5]), Some(targets)).unwrap();
        let loss = out.loss.unwrap().into_scalar().elem::<f32>();

        let expected: f32 = values
            .chunks(5)
            .map(|row| {
                let max = row.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
                let lse = row.iter().map(|v| (v - max).exp()).sum::<f32>().ln() + max;
                lse - row[2]
            })
            .sum::<f32>() / 6.0;

        assert!((loss - expected).abs() < 1e-4, "loss={loss} expected={expected}");
    }

    #[test]
    fn test_uniform_logits_give_log_vocab() {
        let b = base(8);
        let input   = ids(vec![0; 4], [1, 4]);
        let targets = ids(vec![1, 3, 5, 7], [1, 4]);
        let out = b.compute_loss(&input, logits(vec![0.0; 32], [1, 4, 8]), Some(targets)).unwrap();
        let loss = out.loss.unwrap().into_scalar().elem::<f32>();
        assert!((loss - (8.0f32).ln()).abs() < 1e-5);
    }

    #[test]
    fn test_loss_shape_errors() {
        let b = base(5);
        let input = ids(vec![0; 6], [2, 3]);

        // logits for a different batch
        let wrong_logits = b.compute_loss(&input, logits(vec![0.0; 15], [1, 3, 5]), None);
        assert!(matches!(wrong_logits, Err(LmError::Shape(_))));

        // targets of the wrong size
        let wrong_targets = b.compute_loss(
            &input,
            logits(vec![0.0; 30], [2, 3, 5]),
            Some(ids(vec![0; 4], [2, 2])),
        );
        assert!(matches!(wrong_targets, Err(LmError::Shape(_))));

        // no positions at all
        let empty = b.compute_loss(
            &ids(vec![], [1, 0]),
            logits(vec![], [1, 0, 5]),
            Some(ids(vec![], [1, 0])),
        );
        assert!(matches!(empty, Err(LmError::Shape(_))));

        // without targets an empty sequence is still passed through
        let passthrough = b.compute_loss(&ids(vec![], [1, 0]), logits(vec![], [1, 0, 5]), None);
        assert!(passthrough.unwrap().loss.is_none());
    }

    #[test]
    fn test_target_outside_vocab_is_an_error() {
        let b = base(5);
        let input = ids(vec![0, 1], [1, 2]);

        let too_high = b.compute_loss(&input, logits(vec![0.0; 10], [1, 2, 5]), Some(ids(vec![1, 7], [1, 2])));
        assert!(matches!(too_high, Err(LmError::Validation(_))));

        let at_vocab = b.compute_loss(&input, logits(vec![0.0; 10], [1, 2, 5]), Some(ids(vec![5, 0], [1, 2])));
        assert!(matches!(at_vocab, Err(LmError::Validation(_))));

        let negative = b.compute_loss(&input, logits(vec![0.0; 10], [1, 2, 5]), Some(ids(vec![-1, 0], [1, 2])));
        assert!(matches!(negative, Err(LmError::Validation(_))));

        // the last valid id is accepted
        let edge = b.compute_loss(&input, logits(vec![0.0; 10], [1, 2, 5]), Some(ids(vec![4, 0], [1, 2])));
        assert!(edge.unwrap().loss.is_some());
    }

    #[test]
    fn test_new_token_shape_and_range() {
        let b = base(7);
        let mut rng = StdRng::seed_from_u64(7);
        let values: Vec<f32> = (0..4 * 3 * 7).map(|i| (i % 5) as f32).collect();

        let next = b.new_token(logits(values, [4, 3, 7]), &mut rng).unwrap();
        assert_eq!(next.dims(), [4, 1]);
        assert!(int_values(next).iter().all(|&t| (0..7).contains(&t)));
    }

    #[test]
    fn test_new_token_uses_last_step_only() {
        // earlier steps put all mass on token 0, the last step on token 3
        let b = base(4);
        let mut rng = StdRng::seed_from_u64(1);
        let mut values = vec![50.0, 0.0, 0.0, 0.0, 50.0, 0.0, 0.0, 0.0];
        values.extend([0.0, 0.0, 0.0, 50.0]);

        for _ in 0..20 {
            let next = b.new_token(logits(values.clone(), [1, 3, 4]), &mut rng).unwrap();
            assert_eq!(int_values(next), vec![3]);
        }
    }

    #[test]
    fn test_seeded_sampling_is_reproducible() {
        let b = base(10);
        let values: Vec<f32> = (0..8 * 2 * 10).map(|i| ((i * 13) % 17) as f32 * 0.2).collect();

        let mut r1 = StdRng::seed_from_u64(99);
        let mut r2 = StdRng::seed_from_u64(99);
        let a = b.new_token(logits(values.clone(), [8, 2, 10]), &mut r1).unwrap();
        let c = b.new_token(logits(values, [8, 2, 10]), &mut r2).unwrap();
        assert_eq!(int_values(a), int_values(c));
    }

    #[test]
    fn test_empirical_frequencies_follow_softmax() {
        let b = base(3);
        let mut rng = StdRng::seed_from_u64(2024);
        let target = [0.6f32, 0.3, 0.1];
        let row: Vec<f32> = target.iter().map(|p| p.ln()).collect();

        let batch = 250;
        let mut counts = [0usize; 3];
        for _ in 0..40 {
            let values: Vec<f32> = row.iter().cloned().cycle().take(batch * 3).collect();
            let next = b.new_token(logits(values, [batch, 1, 3]), &mut rng).unwrap();
            for t in int_values(next) {
                counts[t as usize] += 1;
            }
        }

        let total = (batch * 40) as f32;
        for (count, p) in counts.iter().zip(target) {
            let freq = *count as f32 / total;
            assert!((freq - p).abs() < 0.02, "freq={freq} p={p}");
        }
    }

    #[test]
    fn test_empty_sequence_cannot_be_sampled() {
        let b = base(3);
        let mut rng = StdRng::seed_from_u64(0);
        let empty = Tensor::<TB, 3>::zeros([2, 0, 3], &Default::default());
        assert!(matches!(b.new_token(empty, &mut rng), Err(LmError::Shape(_))));
    }

    #[test]
    fn test_nan_logits_fail_sampling() {
        let b = base(2);
        let mut rng = StdRng::seed_from_u64(0);
        let bad = logits(vec![f32::NAN, f32::NAN], [1, 1, 2]);
        assert!(matches!(b.new_token(bad, &mut rng), Err(LmError::Sampling(_))));
    }
}
