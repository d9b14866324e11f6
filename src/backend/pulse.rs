//! PulseAudio backend driving `pactl` against the default sink.
//!
//! Also speaks to PipeWire's pipewire-pulse compatibility shim, but the
//! platform selector deliberately prefers the native PipeWire backend on
//! such systems (see `selector`).

use super::command::{run_tool, run_tool_opt};
use super::{VolumeBackend, ensure_volume_range};
use crate::error::{Result, VolumeError};

const PULSE_TOOL: &str = "pactl";
const DEFAULT_SINK: &str = "@DEFAULT_SINK@";

pub struct PulseBackend;

impl PulseBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PulseBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl VolumeBackend for PulseBackend {
    fn get_volume(&self) -> Result<u8> {
        let output = run_tool(PULSE_TOOL, &["get-sink-volume", DEFAULT_SINK])?;
        parse_volume(&output)
    }

    fn set_volume(&self, volume: u8) -> Result<()> {
        ensure_volume_range(volume)?;
        let level = format!("{volume}%");
        run_tool(PULSE_TOOL, &["set-sink-volume", DEFAULT_SINK, &level])?;
        Ok(())
    }

    fn is_muted(&self) -> Result<bool> {
        let output = run_tool(PULSE_TOOL, &["get-sink-mute", DEFAULT_SINK])?;
        parse_mute(&output)
    }

    fn set_mute(&self, mute: bool) -> Result<()> {
        let flag = if mute { "1" } else { "0" };
        run_tool(PULSE_TOOL, &["set-sink-mute", DEFAULT_SINK, flag])?;
        Ok(())
    }

    fn device_name(&self) -> Option<String> {
        run_tool_opt(PULSE_TOOL, &["get-default-sink"])
            .map(|out| out.trim().to_string())
            .filter(|name| !name.is_empty())
    }

    fn name(&self) -> &'static str {
        "PulseAudio (pactl)"
    }
}

/// Extract the first channel percentage from `pactl get-sink-volume` output,
/// e.g. `Volume: front-left: 32768 /  50% / -18.06 dB, ...`.
///
/// Boosted sinks can report more than 100%; reads are capped so the
/// facade's volume range holds.
fn parse_volume(output: &str) -> Result<u8> {
    output
        .split_whitespace()
        .find_map(|token| {
            token
                .strip_suffix('%')
                .and_then(|t| t.parse::<u16>().ok())
                .map(|v| v.min(u16::from(super::MAX_VOLUME)) as u8)
        })
        .ok_or_else(|| {
            VolumeError::BackendProtocol(format!(
                "no volume percentage in pactl output: {}",
                output.trim()
            ))
        })
}

/// Parse `Mute: yes` / `Mute: no`.
fn parse_mute(output: &str) -> Result<bool> {
    match output.trim().strip_prefix("Mute:").map(str::trim) {
        Some("yes") => Ok(true),
        Some("no") => Ok(false),
        _ => Err(VolumeError::BackendProtocol(format!(
            "unexpected pactl mute output: {}",
            output.trim()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sink_volume() {
        let output = "Volume: front-left: 32768 /  50% / -18.06 dB,   front-right: 32768 /  50% / -18.06 dB\n";
        assert_eq!(parse_volume(output).unwrap(), 50);
    }

    #[test]
    fn caps_boosted_sinks_at_full() {
        let output = "Volume: front-left: 98304 / 150% / 10.57 dB,   front-right: 98304 / 150% / 10.57 dB\n";
        assert_eq!(parse_volume(output).unwrap(), 100);
    }

    #[test]
    fn parses_mute_states() {
        assert!(parse_mute("Mute: yes\n").unwrap());
        assert!(!parse_mute("Mute: no\n").unwrap());
    }

    #[test]
    fn unexpected_mute_output_is_a_protocol_error() {
        let err = parse_mute("No valid command specified.").unwrap_err();
        assert!(matches!(err, VolumeError::BackendProtocol(_)));
    }
}
