//! ALSA backend driving `amixer` against the Master simple control.
//!
//! Last-resort Linux backend: used when neither PipeWire nor PulseAudio is
//! running. `amixer` reports per-channel lines like
//! `Front Left: Playback 32768 [50%] [on]`; the first percentage/switch
//! tokens are taken as the master state.

use super::command::run_tool;
use super::{VolumeBackend, ensure_volume_range};
use crate::error::{Result, VolumeError};

const MIXER_TOOL: &str = "amixer";
const MIXER_CONTROL: &str = "Master";

pub struct AlsaBackend;

impl AlsaBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AlsaBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl VolumeBackend for AlsaBackend {
    fn get_volume(&self) -> Result<u8> {
        let output = run_tool(MIXER_TOOL, &["get", MIXER_CONTROL])?;
        parse_volume(&output)
    }

    fn set_volume(&self, volume: u8) -> Result<()> {
        ensure_volume_range(volume)?;
        let level = format!("{volume}%");
        run_tool(MIXER_TOOL, &["set", MIXER_CONTROL, &level])?;
        Ok(())
    }

    fn is_muted(&self) -> Result<bool> {
        let output = run_tool(MIXER_TOOL, &["get", MIXER_CONTROL])?;
        parse_mute(&output)
    }

    fn set_mute(&self, mute: bool) -> Result<()> {
        let verb = if mute { "mute" } else { "unmute" };
        run_tool(MIXER_TOOL, &["set", MIXER_CONTROL, verb])?;
        Ok(())
    }

    fn device_name(&self) -> Option<String> {
        // The simple mixer interface has no sink description to report.
        None
    }

    fn name(&self) -> &'static str {
        "ALSA (amixer)"
    }
}

/// Extract the first `[NN%]` token from `amixer get` output.
fn parse_volume(output: &str) -> Result<u8> {
    output
        .split_whitespace()
        .find_map(|token| {
            token
                .strip_prefix('[')
                .and_then(|t| t.strip_suffix("%]"))
                .and_then(|t| t.parse::<u8>().ok())
        })
        .ok_or_else(|| {
            VolumeError::BackendProtocol(format!(
                "no volume percentage in amixer output: {}",
                output.trim()
            ))
        })
}

/// Extract the first `[on]`/`[off]` switch token from `amixer get` output.
fn parse_mute(output: &str) -> Result<bool> {
    output
        .split_whitespace()
        .find_map(|token| match token {
            "[on]" => Some(false),
            "[off]" => Some(true),
            _ => None,
        })
        .ok_or_else(|| {
            VolumeError::BackendProtocol(format!(
                "no playback switch in amixer output: {}",
                output.trim()
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Simple mixer control 'Master',0
  Capabilities: pvolume pswitch pswitch-joined
  Playback channels: Front Left - Front Right
  Limits: Playback 0 - 65536
  Mono:
  Front Left: Playback 32768 [50%] [on]
  Front Right: Playback 32768 [50%] [on]
";

    #[test]
    fn parses_volume_percentage() {
        assert_eq!(parse_volume(SAMPLE).unwrap(), 50);
    }

    #[test]
    fn parses_unmuted_switch() {
        assert!(!parse_mute(SAMPLE).unwrap());
    }

    #[test]
    fn parses_muted_switch() {
        let muted = SAMPLE.replace("[on]", "[off]");
        assert!(parse_mute(&muted).unwrap());
    }

    #[test]
    fn garbage_output_is_a_protocol_error() {
        let err = parse_volume("amixer: Unable to find simple control").unwrap_err();
        assert!(matches!(err, VolumeError::BackendProtocol(_)));
    }
}
