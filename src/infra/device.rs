// ============================================================
// Layer 6 — Device Selection
// ============================================================
// Burn picks the compute device through the backend *type*, so
// "which device" becomes "which backend do we monomorphise on".
// The preference is resolved once, before any model is built:
//
//   auto → wgpu when compiled with the `wgpu` feature and an
//          adapter answers, else ndarray
//   wgpu → wgpu (falls back to ndarray without the feature or
//          without an adapter)
//   cpu  → ndarray, no adapter lookup

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DevicePreference {
    #[default]
    Auto,
    Wgpu,
    Cpu,
}

/// The backend a run actually executes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComputeBackend {
    Wgpu,
    NdArray,
}

impl std::fmt::Display for ComputeBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Wgpu    => write!(f, "wgpu"),
            Self::NdArray => write!(f, "ndarray (CPU)"),
        }
    }
}

impl DevicePreference {
    pub fn resolve(self) -> ComputeBackend {
        self.resolve_with(wgpu_adapter_available)
    }

    /// `accelerator_available` is only called when wgpu is a candidate.
    fn resolve_with(self, accelerator_available: impl FnOnce() -> bool) -> ComputeBackend {
        let backend = match self {
            Self::Cpu => ComputeBackend::NdArray,
            Self::Auto | Self::Wgpu => {
                if !cfg!(feature = "wgpu") {
                    if self == Self::Wgpu {
                        tracing::warn!("wgpu requested but not compiled with the 'wgpu' feature");
                        tracing::warn!("Falling back to CPU");
                    }
                    ComputeBackend::NdArray
                } else if accelerator_available() {
                    ComputeBackend::Wgpu
                } else {
                    tracing::warn!("No wgpu adapter available, falling back to CPU");
                    ComputeBackend::NdArray
                }
            }
        };
        tracing::info!("Using device: {}", backend);
        backend
    }
}

/// Build a one-element tensor on the default wgpu device.
///
/// cubecl panics (rather than returning an error) when no adapter
/// exists, so the attempt runs under `catch_unwind`.
#[cfg(feature = "wgpu")]
fn wgpu_adapter_available() -> bool {
    use burn::{backend::Wgpu, tensor::Tensor};

    std::panic::catch_unwind(|| {
        Tensor::<Wgpu, 1>::zeros([1], &Default::default()).into_data();
    })
    .is_ok()
}

#[cfg(not(feature = "wgpu"))]
fn wgpu_adapter_available() -> bool {
    false
}
