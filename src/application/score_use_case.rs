// ============================================================
// Layer 2 — ScoreUseCase
// ============================================================
// Measures how well a saved model predicts a token sequence:
// inputs are tokens[..n-1], targets are tokens[1..], and the
// loss is the mean next-token cross-entropy.
//
// Sequences longer than the model's context window are cut
// into consecutive windows; each window's mean loss is
// weighted by its length so the result is the mean over every
// predicted position.
//
// Each run is appended to plots/<name>/scores.csv.

use anyhow::{ensure, Context, Result};
use burn::prelude::*;
use std::path::PathBuf;

use crate::application::token_row;
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::{ScoreLogger, ScoreRecord},
};
use crate::ml::{backend::BackendTask, network::Network};

/// Outcome of a scoring run
#[derive(Debug, Clone)]
pub struct ScoreReport {
    /// Number of predicted positions
    pub tokens:     usize,
    pub loss:       f64,
    pub perplexity: f64,
}

pub struct ScoreUseCase {
    pub root:   PathBuf,
    pub name:   String,
    pub tokens: Vec<u32>,
}

impl BackendTask for ScoreUseCase {
    type Output = ScoreReport;

    fn run<B: Backend>(self, device: B::Device) -> Result<ScoreReport> {
        ensure!(self.tokens.len() >= 2, "scoring needs at least two tokens");

        let ckpt  = CheckpointManager::new(&self.root, &self.name);
        let model = ckpt.load_model::<B>(&device)?;
        let vocab  = model.base().vocab_size();
        let device = model.base().device();

        let predicted = self.tokens.len() - 1;
        let window    = model.network().context_window().unwrap_or(predicted).max(1);

        let mut weighted_sum = 0.0f64;
        let mut start        = 0usize;
        while start < predicted {
            let end     = (start + window).min(predicted);
            let inputs  = token_row::<B>(&self.tokens[start..end], vocab, device)?;
            let targets = token_row::<B>(&self.tokens[start + 1..end + 1], vocab, device)?;

            let out  = model.forward_loss(inputs, Some(targets))?;
            let loss = out.loss.context("loss missing although targets were given")?;
            weighted_sum += loss.into_scalar().elem::<f64>() * (end - start) as f64;

            start = end;
        }

        let record = ScoreRecord::now(predicted, weighted_sum / predicted as f64);
        ScoreLogger::new(ckpt.plot_dir())?.log(&record)?;

        tracing::info!("Scored {} positions: loss={:.4}", predicted, record.loss);
        Ok(ScoreReport {
            tokens:     record.tokens,
            loss:       record.loss,
            perplexity: record.perplexity(),
        })
    }
}
