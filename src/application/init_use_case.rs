// ============================================================
// Layer 2 — InitUseCase
// ============================================================
// Builds a freshly initialised model from an LmConfig and
// writes it to the checkpoint layout:
//
//   Step 1: Validate the config         (Layer 5 - ml)
//   Step 2: Build the network           (Layer 5 - ml registry)
//   Step 3: Refuse to clobber a checkpoint unless asked
//   Step 4: Save weights/metadata/config (Layer 6 - infra)

use anyhow::{bail, Result};
use burn::prelude::*;
use std::path::PathBuf;

use crate::domain::model_kind::ModelKind;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::{backend::BackendTask, config::LmConfig, model::LanguageModel};

/// What `init` produced
#[derive(Debug, Clone)]
pub struct InitReport {
    pub model:        ModelKind,
    pub name:         String,
    pub num_params:   usize,
    pub weights_path: PathBuf,
}

pub struct InitUseCase {
    config:    LmConfig,
    root:      PathBuf,
    overwrite: bool,
}

impl InitUseCase {
    pub fn new(config: LmConfig, root: impl Into<PathBuf>, overwrite: bool) -> Self {
        Self { config, root: root.into(), overwrite }
    }
}

impl BackendTask for InitUseCase {
    type Output = InitReport;

    fn run<B: Backend>(self, device: B::Device) -> Result<InitReport> {
        self.config.validate()?;

        let ckpt = CheckpointManager::new(&self.root, &self.config.name);
        if ckpt.has_checkpoint() && !self.overwrite {
            bail!(
                "A checkpoint for '{}' already exists at '{}'. Pass --overwrite to replace it.",
                self.config.name,
                ckpt.weights_path().display()
            );
        }

        let model = LanguageModel::<B>::from_config(self.config, device)?;
        ckpt.save_model(&model)?;

        Ok(InitReport {
            model:        model.kind(),
            name:         model.base().name().to_string(),
            num_params:   model.network().num_params(),
            weights_path: ckpt.weights_path(),
        })
    }
}
