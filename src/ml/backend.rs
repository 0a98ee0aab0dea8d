// ============================================================
// Layer 5 — Backend Selection
// ============================================================
// Maps the DeviceKind chosen at process start onto a concrete
// Burn backend and device, then runs a task generic over it.
//
//   DeviceKind::Cpu         → NdArray (NdArrayDevice::Cpu)
//   DeviceKind::Accelerator → Wgpu    (WgpuDevice::default())
//
// Use cases implement BackendTask instead of hard-coding a
// backend type alias, so the same code runs on either device.

use anyhow::Result;
use burn::prelude::*;

use crate::domain::device::DeviceKind;

pub type CpuBackend = burn::backend::NdArray;
pub type GpuBackend = burn::backend::Wgpu;

/// A unit of work that can run on any Burn backend.
pub trait BackendTask {
    type Output;

    fn run<B: Backend>(self, device: B::Device) -> Result<Self::Output>;
}

/// Run `task` on the backend selected by `kind`.
pub fn dispatch<T: BackendTask>(kind: DeviceKind, task: T) -> Result<T::Output> {
    match kind {
        DeviceKind::Cpu => {
            let device = burn::backend::ndarray::NdArrayDevice::Cpu;
            tracing::info!("Using CPU device: {:?}", device);
            task.run::<CpuBackend>(device)
        }
        DeviceKind::Accelerator => {
            let device = burn::backend::wgpu::WgpuDevice::default();
            tracing::info!("Using WGPU device: {:?}", device);
            task.run::<GpuBackend>(device)
        }
    }
}
