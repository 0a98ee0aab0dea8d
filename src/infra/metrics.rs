// ============================================================
// Layer 6 — Score Logger
// ============================================================
// Records every `score` run of a model to a CSV file in the
// model's plot directory, so loss over time can be plotted.
//
// Columns:
//   - timestamp:  seconds since the Unix epoch
//   - tokens:     number of predicted positions (B*T)
//   - loss:       mean next-token cross-entropy
//   - perplexity: exp(loss)
//
// Output file: plots/<name>/scores.csv
//
// Example CSV output:
//   timestamp,tokens,loss,perplexity
//   1760880000,63,4.605170,100.000000

use anyhow::Result;
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

/// One scored token sequence
#[derive(Debug, Clone)]
pub struct ScoreRecord {
    pub timestamp: u64,
    pub tokens:    usize,
    pub loss:      f64,
}

impl ScoreRecord {
    /// Stamp a new record with the current time
    pub fn now(tokens: usize, loss: f64) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self { timestamp, tokens, loss }
    }

    pub fn perplexity(&self) -> f64 {
        self.loss.exp()
    }
}

/// Appends score records to `<dir>/scores.csv`.
pub struct ScoreLogger {
    csv_path: PathBuf,
}

impl ScoreLogger {
    /// Create the directory and write the CSV header if the file is new.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let csv_path = dir.join("scores.csv");
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "timestamp,tokens,loss,perplexity")?;
            tracing::debug!("Created scores CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Append one row.
    pub fn log(&self, r: &ScoreRecord) -> Result<()> {
        let mut f = OpenOptions::new().append(true).open(&self.csv_path)?;
        writeln!(f, "{},{},{:.6},{:.6}", r.timestamp, r.tokens, r.loss, r.perplexity())?;

        tracing::debug!("Logged score: tokens={}, loss={:.4}", r.tokens, r.loss);
        Ok(())
    }
}
