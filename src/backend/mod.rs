pub mod alsa;
pub mod command;
pub mod macos;
pub mod pipewire;
pub mod pulse;

#[cfg(windows)]
pub mod windows;

// Mock implementation for testing
#[cfg(any(test, feature = "test-mocks"))]
pub mod mock;

pub use alsa::AlsaBackend;
pub use macos::MacScriptBackend;
pub use pipewire::PipeWireBackend;
pub use pulse::PulseBackend;

#[cfg(windows)]
pub use windows::WindowsBackend;

#[cfg(any(test, feature = "test-mocks"))]
pub use mock::MockBackend;

use std::fmt;

use crate::error::{Result, VolumeError};

/// Upper bound of the volume percentage range.
pub const MAX_VOLUME: u8 = 100;

/// Trait for a per-platform volume adapter - abstracts the native volume
/// mechanism (COM interface, scripting bridge, or mixer CLI tool).
///
/// Every call is synchronous and potentially slow (process spawn or COM
/// marshaling); callers must not assume sub-millisecond latency.
pub trait VolumeBackend: Send + Sync {
    /// Read the current master volume as a percentage in [0, 100]
    fn get_volume(&self) -> Result<u8>;

    /// Write the master volume; the input must already be in [0, 100]
    /// (re-validated defensively, never clamped)
    fn set_volume(&self, volume: u8) -> Result<()>;

    /// Read the current mute state
    fn is_muted(&self) -> Result<bool>;

    /// Write the mute state
    fn set_mute(&self, mute: bool) -> Result<()>;

    /// Human-readable name of the active output device, best-effort;
    /// absence is not an error
    fn device_name(&self) -> Option<String>;

    /// Static identity string of this adapter
    fn name(&self) -> &'static str;
}

impl<B: VolumeBackend + ?Sized> VolumeBackend for Box<B> {
    fn get_volume(&self) -> Result<u8> {
        (**self).get_volume()
    }

    fn set_volume(&self, volume: u8) -> Result<()> {
        (**self).set_volume(volume)
    }

    fn is_muted(&self) -> Result<bool> {
        (**self).is_muted()
    }

    fn set_mute(&self, mute: bool) -> Result<()> {
        (**self).set_mute(mute)
    }

    fn device_name(&self) -> Option<String> {
        (**self).device_name()
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Tag identifying which backend adapter the platform selector chose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Windows,
    MacOs,
    PipeWire,
    PulseAudio,
    Alsa,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BackendKind::Windows => "Windows Core Audio",
            BackendKind::MacOs => "macOS CoreAudio",
            BackendKind::PipeWire => "PipeWire",
            BackendKind::PulseAudio => "PulseAudio",
            BackendKind::Alsa => "ALSA",
        };
        write!(f, "{name}")
    }
}

/// Defensive range check shared by every adapter's write path.
pub(crate) fn ensure_volume_range(volume: u8) -> Result<()> {
    if volume > MAX_VOLUME {
        return Err(VolumeError::InvalidArgument(format!(
            "volume {volume}% is outside the 0-100 range"
        )));
    }
    Ok(())
}
