//! Runtime platform detection and backend selection.
//!
//! Windows and macOS map to their single native adapter. Linux hosts can
//! run several audio servers side by side, so selection probes the
//! available CLI tools in a fixed order (PipeWire, PulseAudio, ALSA) and
//! the first confirmed match wins. Selection is stateless and never
//! retried automatically; callers that want a retry re-invoke it.

use std::process::Stdio;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::backend::{BackendKind, VolumeBackend};
use crate::error::{Result, VolumeError};

#[cfg(target_os = "linux")]
use crate::backend::{AlsaBackend, PipeWireBackend, PulseBackend};

/// Upper bound on each individual probe, so a hung or missing binary
/// cannot stall startup.
const PROBE_TIMEOUT: Duration = Duration::from_secs(1);

/// Requested backend, from config or the command line. Only meaningful on
/// Linux; Windows and macOS have exactly one adapter each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendPreference {
    /// Probe the host and pick the best match
    #[default]
    Auto,
    Pipewire,
    Pulseaudio,
    Alsa,
}

/// The outcome of platform selection: the chosen adapter plus a tag that
/// identifies it, so callers can report or assert on the choice without
/// downcasting.
pub struct SelectedBackend {
    pub kind: BackendKind,
    pub adapter: Box<dyn VolumeBackend>,
}

/// Probe the host and produce exactly one backend adapter, or fail.
pub async fn select_backend(preference: BackendPreference) -> Result<SelectedBackend> {
    #[cfg(windows)]
    {
        let _ = preference;
        let adapter = crate::backend::WindowsBackend::new()?;
        info!("selected Windows Core Audio backend");
        Ok(SelectedBackend {
            kind: BackendKind::Windows,
            adapter: Box::new(adapter),
        })
    }

    #[cfg(target_os = "macos")]
    {
        let _ = preference;
        info!("selected macOS scripting-bridge backend");
        Ok(SelectedBackend {
            kind: BackendKind::MacOs,
            adapter: Box::new(crate::backend::MacScriptBackend::new()),
        })
    }

    #[cfg(target_os = "linux")]
    {
        select_linux_backend(preference).await
    }

    #[cfg(not(any(windows, target_os = "macos", target_os = "linux")))]
    {
        let _ = preference;
        Err(VolumeError::UnsupportedPlatform(
            std::env::consts::OS.to_string(),
        ))
    }
}

/// Transient snapshot of what the Linux probes found. Not retained after a
/// backend is chosen.
#[derive(Debug, Default, Clone)]
struct SelectionProbe {
    has_wpctl: bool,
    has_pactl: bool,
    has_amixer: bool,
    /// `Server Name:` reported by `pactl info`, if the query succeeded.
    server_name: Option<String>,
}

/// Ordered first-match-wins classification over a probe snapshot.
///
/// PipeWire ships a pactl-compatible shim, so tool presence alone would
/// always misclassify PipeWire hosts as PulseAudio. The server identity
/// reported by the compatibility query is the deciding vote in both
/// branches: PipeWire requires a positive match, PulseAudio requires the
/// identity to explicitly not be PipeWire.
fn classify_linux(probe: &SelectionProbe) -> Option<BackendKind> {
    let server = probe
        .server_name
        .as_deref()
        .unwrap_or("")
        .to_ascii_lowercase();
    let reports_pipewire = server.contains("pipewire");

    if probe.has_wpctl && reports_pipewire {
        return Some(BackendKind::PipeWire);
    }
    if probe.has_pactl && server.contains("pulseaudio") && !reports_pipewire {
        return Some(BackendKind::PulseAudio);
    }
    if probe.has_amixer {
        return Some(BackendKind::Alsa);
    }
    None
}

#[cfg(target_os = "linux")]
async fn select_linux_backend(preference: BackendPreference) -> Result<SelectedBackend> {
    match preference {
        BackendPreference::Auto => {}
        BackendPreference::Pipewire => {
            return forced_backend("wpctl", BackendKind::PipeWire).await;
        }
        BackendPreference::Pulseaudio => {
            return forced_backend("pactl", BackendKind::PulseAudio).await;
        }
        BackendPreference::Alsa => {
            return forced_backend("amixer", BackendKind::Alsa).await;
        }
    }

    let probe = SelectionProbe {
        has_wpctl: tool_responds("wpctl").await,
        has_pactl: tool_responds("pactl").await,
        has_amixer: tool_responds("amixer").await,
        server_name: pulse_server_name().await,
    };
    debug!(?probe, "linux audio probe complete");

    let kind = classify_linux(&probe).ok_or(VolumeError::NoAudioSystemDetected)?;
    info!("selected {kind} backend");
    Ok(instantiate_linux(kind))
}

/// Honor a forced preference: the tool is still probed for presence, but
/// identity confirmation is skipped.
#[cfg(target_os = "linux")]
async fn forced_backend(tool: &str, kind: BackendKind) -> Result<SelectedBackend> {
    if !tool_responds(tool).await {
        warn!("{kind} backend was requested but {tool} is not responding");
        return Err(VolumeError::NoAudioSystemDetected);
    }
    info!("selected {kind} backend (forced)");
    Ok(instantiate_linux(kind))
}

#[cfg(target_os = "linux")]
fn instantiate_linux(kind: BackendKind) -> SelectedBackend {
    let adapter: Box<dyn VolumeBackend> = match kind {
        BackendKind::PipeWire => Box::new(PipeWireBackend::new()),
        BackendKind::PulseAudio => Box::new(PulseBackend::new()),
        _ => Box::new(AlsaBackend::new()),
    };
    SelectedBackend { kind, adapter }
}

/// Check that a CLI tool exists and answers within the probe timeout.
async fn tool_responds(tool: &str) -> bool {
    let probe = tokio::process::Command::new(tool)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match timeout(PROBE_TIMEOUT, probe).await {
        Ok(Ok(status)) => status.success(),
        Ok(Err(e)) => {
            debug!("{tool} probe failed: {e}");
            false
        }
        Err(_) => {
            warn!("{tool} probe timed out after {PROBE_TIMEOUT:?}");
            false
        }
    }
}

/// Query the PulseAudio-compatibility layer for its server identity.
///
/// Deliberately a second, separate query after the tool-presence probe:
/// the identity string is what distinguishes genuine PulseAudio from
/// PipeWire's compatibility shim.
async fn pulse_server_name() -> Option<String> {
    let query = tokio::process::Command::new("pactl").arg("info").output();

    let output = match timeout(PROBE_TIMEOUT, query).await {
        Ok(Ok(output)) if output.status.success() => output,
        Ok(_) => return None,
        Err(_) => {
            warn!("pactl info query timed out after {PROBE_TIMEOUT:?}");
            return None;
        }
    };

    let stdout = String::from_utf8_lossy(&output.stdout);
    stdout
        .lines()
        .find_map(|line| line.strip_prefix("Server Name:"))
        .map(|name| name.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probe(
        has_wpctl: bool,
        has_pactl: bool,
        has_amixer: bool,
        server_name: Option<&str>,
    ) -> SelectionProbe {
        SelectionProbe {
            has_wpctl,
            has_pactl,
            has_amixer,
            server_name: server_name.map(str::to_string),
        }
    }

    #[test]
    fn pipewire_host_is_not_misclassified_as_pulseaudio() {
        // Both tools present, compatibility layer reports PipeWire
        let result = classify_linux(&probe(
            true,
            true,
            true,
            Some("PulseAudio (on PipeWire 1.0.5)"),
        ));
        assert_eq!(result, Some(BackendKind::PipeWire));
    }

    #[test]
    fn genuine_pulseaudio_is_selected() {
        let result = classify_linux(&probe(false, true, true, Some("pulseaudio")));
        assert_eq!(result, Some(BackendKind::PulseAudio));
    }

    #[test]
    fn pipewire_identity_without_wpctl_falls_through() {
        // pactl shim present but the native CLI is missing: neither
        // PipeWire (no tool) nor PulseAudio (identity says PipeWire)
        let result = classify_linux(&probe(
            false,
            true,
            true,
            Some("PulseAudio (on PipeWire 1.0.5)"),
        ));
        assert_eq!(result, Some(BackendKind::Alsa));
    }

    #[test]
    fn bare_alsa_host_uses_amixer() {
        let result = classify_linux(&probe(false, false, true, None));
        assert_eq!(result, Some(BackendKind::Alsa));
    }

    #[test]
    fn host_without_audio_tools_detects_nothing() {
        let result = classify_linux(&probe(false, false, false, None));
        assert_eq!(result, None);
    }

    #[test]
    fn pactl_without_identity_confirmation_is_not_pulseaudio() {
        // Tool answers but the identity query failed: refuse to guess
        let result = classify_linux(&probe(false, true, false, None));
        assert_eq!(result, None);
    }
}
