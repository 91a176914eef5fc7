//! Accelerator detection for the sync model.
//!
//! The scoring model runs on a CUDA device when one is present and falls back
//! to the CPU otherwise. Behaviour is identical on both paths; only speed
//! differs. Detection happens once, before the model is loaded, and the
//! result is passed to the loader explicitly.

use std::fmt;
use std::process::{Command, Stdio};
use std::str::FromStr;

/// The compute device the sync model will be loaded on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Device {
    /// A CUDA-capable GPU is available.
    Accelerated,
    /// No accelerator; the model runs on the CPU.
    Fallback,
}

impl Device {
    /// Value passed to the model process' `--device` flag.
    #[must_use]
    pub fn as_model_arg(self) -> &'static str {
        match self {
            Device::Accelerated => "cuda",
            Device::Fallback => "cpu",
        }
    }

    /// Detects the best available device on this host.
    #[must_use]
    pub fn detect() -> Self {
        if is_accelerator_available() {
            Device::Accelerated
        } else {
            Device::Fallback
        }
    }

    /// Logs which device will be used.
    pub fn log_capabilities(&self) {
        match self {
            Device::Accelerated => log::info!("Sync model device: CUDA"),
            Device::Fallback => {
                log::warn!("CUDA not available; scoring on CPU will be very slow")
            }
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Accelerated => write!(f, "GPU (CUDA)"),
            Device::Fallback => write!(f, "CPU"),
        }
    }
}

/// Operator preference for the model device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DevicePreference {
    /// Use the accelerator when one is detected.
    #[default]
    Auto,
    /// Force the accelerator.
    Accelerated,
    /// Force the CPU path.
    Fallback,
}

impl DevicePreference {
    /// Turns the preference into a concrete device, probing only for `Auto`.
    #[must_use]
    pub fn resolve(self) -> Device {
        match self {
            DevicePreference::Auto => Device::detect(),
            DevicePreference::Accelerated => Device::Accelerated,
            DevicePreference::Fallback => Device::Fallback,
        }
    }
}

impl FromStr for DevicePreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(DevicePreference::Auto),
            "accelerated" | "gpu" | "cuda" => Ok(DevicePreference::Accelerated),
            "fallback" | "cpu" => Ok(DevicePreference::Fallback),
            other => Err(format!(
                "unknown device '{other}' (expected auto, accelerated or fallback)"
            )),
        }
    }
}

/// Checks for a usable NVIDIA GPU by asking `nvidia-smi` to list devices.
#[must_use]
pub fn is_accelerator_available() -> bool {
    match Command::new("nvidia-smi")
        .arg("-L")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
    {
        Ok(status) => status.success(),
        Err(e) => {
            log::debug!("nvidia-smi not runnable: {e}");
            false
        }
    }
}
