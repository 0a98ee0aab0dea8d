// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates the other layers to accomplish one
// user-facing goal each:
//
//   init_use_case.rs     — build a fresh model, save checkpoint
//   generate_use_case.rs — load a checkpoint, sample tokens
//   score_use_case.rs    — load a checkpoint, measure loss
//
// Rules for this layer:
//   - No ML math or model code here
//   - No printing here (that's Layer 1)
//   - Only workflow coordination
//
// Every use case implements ml::backend::BackendTask so the
// CLI can run it on whichever device was selected.

use anyhow::{ensure, Result};
use burn::prelude::*;

/// Fresh-model initialisation workflow
pub mod init_use_case;

/// Autoregressive sampling workflow
pub mod generate_use_case;

/// Cross-entropy scoring workflow
pub mod score_use_case;

/// Turn a token id slice into a [1, len] Int tensor, checking every id is in the vocabulary.
pub(crate) fn token_row<B: Backend>(
    tokens:     &[u32],
    vocab_size: usize,
    device:     &B::Device,
) -> Result<Tensor<B, 2, Int>> {
    ensure!(!tokens.is_empty(), "token sequence must not be empty");
    if let Some(bad) = tokens.iter().find(|&&t| t as usize >= vocab_size) {
        anyhow::bail!("token id {bad} is outside the vocabulary (size {vocab_size})");
    }

    let values: Vec<i64> = tokens.iter().map(|&t| t as i64).collect();
    Ok(Tensor::from_data(TensorData::new(values, [1, tokens.len()]), device))
}

/// Read a [B, T] Int tensor back into plain token ids.
pub(crate) fn token_values<B: Backend>(t: Tensor<B, 2, Int>) -> Result<Vec<u32>> {
    let values = t
        .into_data()
        .convert::<i64>()
        .to_vec::<i64>()
        .map_err(|e| anyhow::anyhow!("Cannot read token tensor: {e:?}"))?;
    Ok(values.into_iter().map(|v| v as u32).collect())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    #[test]
    fn test_token_row_shape() {
        let t = token_row::<NdArray>(&[1, 2, 3], 4, &Default::default()).unwrap();
        assert_eq!(t.dims(), [1, 3]);
        assert_eq!(token_values(t).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_token_row_rejects_out_of_vocab() {
        assert!(token_row::<NdArray>(&[0, 4], 4, &Default::default()).is_err());
        assert!(token_row::<NdArray>(&[], 4, &Default::default()).is_err());
    }
}
