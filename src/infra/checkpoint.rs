// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores language models in the name-derived
// layout computed by CheckpointPaths.
//
// What gets saved per checkpoint:
//   1. checkpoint.pt   — weights, Burn BinBytesRecorder bytes
//                        (full precision) written verbatim
//   2. metadata.json   — model kind, name, vocab, param count
//                        and the full LmConfig
//   3. config.json     — the LmConfig of the last saved model,
//                        at the top of the root directory
//
// Why save the config twice?
//   metadata.json belongs to one model and is what loading
//   uses to rebuild the exact architecture. config.json is a
//   single shared file that always reflects the latest save.
//
// Why BinBytesRecorder instead of a file recorder?
//   File recorders replace the extension of the target path.
//   Recording to bytes and writing them ourselves keeps the
//   file name exactly checkpoint.pt.
//
// File layout (relative to the root):
//   checkpoints/<name>/checkpoint_1/checkpoint.pt
//   checkpoints/<name>/checkpoint_1/metadata.json
//   plots/<name>/
//   config.json
//
// Reference: Burn Book §5 (Records and Checkpointing)
//            Rust Book §9 (Error Handling)

use anyhow::{ensure, Context, Result};
use burn::{
    prelude::*,
    record::{BinBytesRecorder, FullPrecisionSettings, Recorder},
};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::domain::{error::LmError, model_kind::ModelKind, paths::CheckpointPaths};
use crate::ml::{config::LmConfig, model::LanguageModel, network::AnyNetwork};

type WeightsRecorder = BinBytesRecorder<FullPrecisionSettings>;

/// Everything needed to rebuild a model before loading its weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointMetadata {
    pub model:      ModelKind,
    pub name:       String,
    pub vocab_size: usize,
    pub num_params: usize,
    pub config:     LmConfig,
}

/// Reads and writes the checkpoint files of one named model.
pub struct CheckpointManager {
    /// Directory the relative layout is resolved against
    root:  PathBuf,
    name:  String,
    paths: CheckpointPaths,
}

impl CheckpointManager {
    /// Create a manager for `name` under `root`. No I/O happens here.
    pub fn new(root: impl Into<PathBuf>, name: &str) -> Self {
        Self {
            root:  root.into(),
            name:  name.to_string(),
            paths: CheckpointPaths::for_model(name),
        }
    }

    pub fn weights_path(&self) -> PathBuf {
        self.root.join(&self.paths.ckpt_path)
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.root.join(&self.paths.meta_path)
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(&self.paths.cfg_path)
    }

    pub fn plot_dir(&self) -> PathBuf {
        self.root.join(&self.paths.plot_dir)
    }

    /// True when both weights and metadata are on disk
    pub fn has_checkpoint(&self) -> bool {
        self.weights_path().is_file() && self.metadata_path().is_file()
    }

    /// Write weights, metadata.json and config.json for `model`.
    /// Creates the checkpoint and plot directories if missing.
    pub fn save_model<B: Backend>(&self, model: &LanguageModel<B>) -> Result<()> {
        let ckpt_dir = self.root.join(&self.paths.ckpt_dir);
        fs::create_dir_all(&ckpt_dir)
            .with_context(|| format!("Cannot create '{}'", ckpt_dir.display()))?;
        fs::create_dir_all(self.plot_dir())
            .with_context(|| format!("Cannot create '{}'", self.plot_dir().display()))?;

        // ── Weights ──────────────────────────────────────────────────────────
        let bytes = encode_network(model.network())?;
        let weights_path = self.weights_path();
        fs::write(&weights_path, &bytes)
            .with_context(|| format!("Failed to save checkpoint to '{}'", weights_path.display()))?;

        // ── Metadata ─────────────────────────────────────────────────────────
        let metadata = CheckpointMetadata {
            model:      model.kind(),
            name:       model.base().name().to_string(),
            vocab_size: model.base().vocab_size(),
            num_params: model.network().num_params(),
            config:     model.config().clone(),
        };
        let meta_path = self.metadata_path();
        fs::write(&meta_path, serde_json::to_string_pretty(&metadata)?)
            .with_context(|| format!("Cannot write metadata to '{}'", meta_path.display()))?;

        // ── Shared config ────────────────────────────────────────────────────
        self.save_config(model.config())?;

        tracing::info!(
            "Saved {} '{}' ({} bytes) to '{}'",
            metadata.model, metadata.name, bytes.len(), weights_path.display()
        );
        Ok(())
    }

    /// Write `cfg` to the shared config.json.
    pub fn save_config(&self, cfg: &LmConfig) -> Result<()> {
        let path = self.config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).ok();
        }
        cfg.save(&path)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;
        tracing::debug!("Saved model config to '{}'", path.display());
        Ok(())
    }

    /// Read the shared config.json.
    pub fn load_config(&self) -> Result<LmConfig> {
        let path = self.config_path();
        LmConfig::load(&path).map_err(|e| {
            anyhow::anyhow!("Cannot read config from '{}': {:?}", path.display(), e)
        })
    }

    /// Read this model's metadata.json.
    pub fn load_metadata(&self) -> Result<CheckpointMetadata> {
        let path = self.metadata_path();
        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read metadata from '{}'. Have you run 'init' first?",
                path.display()
            )
        })?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Rebuild the model described by metadata.json and load its weights.
    pub fn load_model<B: Backend>(&self, device: &B::Device) -> Result<LanguageModel<B>> {
        let metadata = self.load_metadata()?;
        tracing::info!(
            "Loading {} '{}' from checkpoint (vocab={}, params={})",
            metadata.model, metadata.name, metadata.vocab_size, metadata.num_params
        );

        // a directory copied under another name would rebuild with foreign paths
        ensure!(
            metadata.name == self.name && metadata.config.name == self.name,
            "Checkpoint at '{}' belongs to '{}' (config '{}'), not '{}'",
            self.metadata_path().display(), metadata.name, metadata.config.name, self.name
        );
        ensure!(
            metadata.model == metadata.config.model,
            "Metadata in '{}' records a {} but its config describes a {}",
            self.metadata_path().display(), metadata.model, metadata.config.model
        );

        let model = LanguageModel::<B>::from_config(metadata.config, device.clone())?;

        let weights_path = self.weights_path();
        let bytes = fs::read(&weights_path).with_context(|| {
            format!(
                "Cannot load checkpoint '{}'. Have you run 'init' first?",
                weights_path.display()
            )
        })?;

        let network = decode_network(model.network().clone(), bytes, device)?;
        Ok(model.with_network(network)?)
    }
}

// ─── Weight (de)serialisation ─────────────────────────────────────────────────
fn encode_network<B: Backend>(network: &AnyNetwork<B>) -> Result<Vec<u8>, LmError> {
    match network {
        AnyNetwork::Bigram(m)      => encode(m),
        AnyNetwork::Lstm(m)        => encode(m),
        AnyNetwork::Gru(m)         => encode(m),
        AnyNetwork::Transformer(m) => encode(m),
    }
}

/// Load `bytes` into `network`, which must already have the saved architecture.
fn decode_network<B: Backend>(
    network: AnyNetwork<B>,
    bytes:   Vec<u8>,
    device:  &B::Device,
) -> Result<AnyNetwork<B>, LmError> {
    Ok(match network {
        AnyNetwork::Bigram(m)      => AnyNetwork::Bigram(decode(m, bytes, device)?),
        AnyNetwork::Lstm(m)        => AnyNetwork::Lstm(decode(m, bytes, device)?),
        AnyNetwork::Gru(m)         => AnyNetwork::Gru(decode(m, bytes, device)?),
        AnyNetwork::Transformer(m) => AnyNetwork::Transformer(decode(m, bytes, device)?),
    })
}

fn encode<B: Backend, M: Module<B>>(module: &M) -> Result<Vec<u8>, LmError> {
    <WeightsRecorder as Recorder<B>>::record(&WeightsRecorder::default(), module.clone().into_record(), ())
        .map_err(|e| LmError::Checkpoint(format!("{e:?}")))
}

fn decode<B: Backend, M: Module<B>>(module: M, bytes: Vec<u8>, device: &B::Device) -> Result<M, LmError> {
    let record = <WeightsRecorder as Recorder<B>>::load(&WeightsRecorder::default(), bytes, device)
        .map_err(|e| LmError::Checkpoint(format!("{e:?}")))?;
    Ok(module.load_record(record))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::network::Network;
    use burn::backend::NdArray;

    type TB = NdArray;

    fn config(kind: ModelKind, name: &str) -> LmConfig {
        LmConfig::new(kind, name.to_string(), 12)
            .with_d_model(8)
            .with_num_heads(2)
            .with_num_layers(1)
            .with_d_ff(16)
            .with_block_size(5)
            .with_dropout(0.0)
    }

    fn logits_of(model: &LanguageModel<TB>) -> Vec<f32> {
        let input = Tensor::<TB, 2, Int>::from_data(
            TensorData::new(vec![0i64, 3, 7, 11], [1, 4]),
            &Default::default(),
        );
        model.network().forward(input).into_data().convert::<f32>().to_vec::<f32>().unwrap()
    }

    #[test]
    fn test_save_writes_expected_layout() {
        let dir   = tempfile::tempdir().unwrap();
        let model = LanguageModel::<TB>::from_config(config(ModelKind::Bigram, "demo"), Default::default()).unwrap();
        let ckpt  = CheckpointManager::new(dir.path(), "demo");

        assert!(!ckpt.has_checkpoint());
        ckpt.save_model(&model).unwrap();

        assert!(dir.path().join("checkpoints/demo/checkpoint_1/checkpoint.pt").is_file());
        assert!(dir.path().join("checkpoints/demo/checkpoint_1/metadata.json").is_file());
        assert!(dir.path().join("plots/demo").is_dir());
        assert!(dir.path().join("config.json").is_file());
        assert!(ckpt.has_checkpoint());

        let meta = ckpt.load_metadata().unwrap();
        assert_eq!(meta.model, ModelKind::Bigram);
        assert_eq!(meta.name, "demo");
        assert_eq!(meta.vocab_size, 12);
        assert_eq!(meta.num_params, 12 * 12);

        let cfg = ckpt.load_config().unwrap();
        assert_eq!(cfg.name, "demo");
        assert_eq!(cfg.model, ModelKind::Bigram);
    }

    #[test]
    fn test_reload_reproduces_logits() {
        let dir = tempfile::tempdir().unwrap();
        for kind in [ModelKind::Bigram, ModelKind::Lstm, ModelKind::Gru, ModelKind::Transformer] {
            let name  = format!("reload-{}", kind.key());
            let model = LanguageModel::<TB>::from_config(config(kind, &name), Default::default()).unwrap();
            let ckpt  = CheckpointManager::new(dir.path(), &name);
            ckpt.save_model(&model).unwrap();

            let loaded = ckpt.load_model::<TB>(&Default::default()).unwrap();
            assert_eq!(loaded.kind(), kind);

            let before = logits_of(&model);
            let after  = logits_of(&loaded);
            assert_eq!(before.len(), after.len());
            for (a, b) in before.iter().zip(&after) {
                assert!((a - b).abs() < 1e-6, "{kind}: {a} != {b}");
            }
        }
    }

    #[test]
    fn test_missing_checkpoint_is_an_error() {
        let dir  = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path(), "nobody");
        assert!(ckpt.load_model::<TB>(&Default::default()).is_err());
        assert!(ckpt.load_metadata().is_err());
    }

    #[test]
    fn test_checkpoint_copied_under_other_name_is_rejected() {
        let dir   = tempfile::tempdir().unwrap();
        let model = LanguageModel::<TB>::from_config(config(ModelKind::Bigram, "orig"), Default::default()).unwrap();
        CheckpointManager::new(dir.path(), "orig").save_model(&model).unwrap();

        let from = dir.path().join("checkpoints/orig");
        let to   = dir.path().join("checkpoints/copy/checkpoint_1");
        fs::create_dir_all(&to).unwrap();
        for file in ["checkpoint.pt", "metadata.json"] {
            fs::copy(from.join("checkpoint_1").join(file), to.join(file)).unwrap();
        }

        let copy = CheckpointManager::new(dir.path(), "copy");
        assert!(copy.has_checkpoint());
        let err = copy.load_model::<TB>(&Default::default()).unwrap_err();
        assert!(err.to_string().contains("belongs to 'orig'"), "{err}");
    }

    #[test]
    fn test_metadata_kind_must_match_config() {
        let dir   = tempfile::tempdir().unwrap();
        let model = LanguageModel::<TB>::from_config(config(ModelKind::Lstm, "mixed"), Default::default()).unwrap();
        let ckpt  = CheckpointManager::new(dir.path(), "mixed");
        ckpt.save_model(&model).unwrap();

        let mut meta = ckpt.load_metadata().unwrap();
        meta.model = ModelKind::Gru;
        fs::write(ckpt.metadata_path(), serde_json::to_string_pretty(&meta).unwrap()).unwrap();

        let err = ckpt.load_model::<TB>(&Default::default()).unwrap_err();
        assert!(err.to_string().contains("records a GRULM"), "{err}");
    }

    #[test]
    fn test_config_json_tracks_latest_save() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["first", "second"] {
            let model = LanguageModel::<TB>::from_config(config(ModelKind::Gru, name), Default::default()).unwrap();
            CheckpointManager::new(dir.path(), name).save_model(&model).unwrap();
        }
        let cfg = CheckpointManager::new(dir.path(), "first").load_config().unwrap();
        assert_eq!(cfg.name, "second");
    }
}
