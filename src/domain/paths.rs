// ============================================================
// Layer 3 — Checkpoint Path Conventions
// ============================================================
// Every model instance derives its on-disk locations from its
// name alone. Nothing here touches the filesystem; the paths
// are computed once and handed to whichever component does
// the actual reading and writing (see infra::checkpoint).
//
// Layout, relative to the working root:
//
//   checkpoints/<name>/checkpoint_1/checkpoint.pt   ← weights
//   checkpoints/<name>/checkpoint_1/metadata.json   ← metadata
//   plots/<name>/                                   ← plot output
//   config.json                                     ← last config
//
// Reference: Rust Book §5 (Structs)
//            std::path::PathBuf documentation

use std::path::PathBuf;

const CHECKPOINTS_DIR: &str = "checkpoints";
const PLOTS_DIR:       &str = "plots";
const CHECKPOINT_SLOT: &str = "checkpoint_1";
const WEIGHTS_FILE:    &str = "checkpoint.pt";
const METADATA_FILE:   &str = "metadata.json";
const CONFIG_FILE:     &str = "config.json";

/// The filesystem locations derived from a model name.
/// Pure function of the name: two instances with the same name
/// share every path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointPaths {
    /// checkpoints/<name>
    pub dir_path:  PathBuf,
    /// checkpoints/<name>/checkpoint_1
    pub ckpt_dir:  PathBuf,
    /// checkpoints/<name>/checkpoint_1/checkpoint.pt
    pub ckpt_path: PathBuf,
    /// checkpoints/<name>/checkpoint_1/metadata.json
    pub meta_path: PathBuf,
    /// plots/<name>
    pub plot_dir:  PathBuf,
    /// config.json
    pub cfg_path:  PathBuf,
}

impl CheckpointPaths {
    /// Derive all paths for `name`. The name is used verbatim.
    pub fn for_model(name: &str) -> Self {
        let dir_path = PathBuf::from(CHECKPOINTS_DIR).join(name);
        let ckpt_dir = dir_path.join(CHECKPOINT_SLOT);
        Self {
            ckpt_path: ckpt_dir.join(WEIGHTS_FILE),
            meta_path: ckpt_dir.join(METADATA_FILE),
            plot_dir:  PathBuf::from(PLOTS_DIR).join(name),
            cfg_path:  PathBuf::from(CONFIG_FILE),
            dir_path,
            ckpt_dir,
        }
    }
}
