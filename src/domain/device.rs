// ============================================================
// Layer 3 — Device Selection Policy
// ============================================================
// The device is chosen once at process start (from the CLI)
// and passed down explicitly. Models never probe for hardware
// on their own, which keeps construction pure and lets tests
// pin everything to the CPU backend.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which class of hardware to run the models on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    /// NdArray backend on the host CPU
    #[default]
    Cpu,
    /// Wgpu backend on the default GPU adapter
    Accelerator,
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceKind::Cpu         => write!(f, "cpu"),
            DeviceKind::Accelerator => write!(f, "accelerator"),
        }
    }
}
