//! PipeWire backend driving `wpctl` against the default audio sink.

use super::command::{run_tool, run_tool_opt};
use super::{MAX_VOLUME, VolumeBackend, ensure_volume_range};
use crate::error::{Result, VolumeError};

const PIPEWIRE_TOOL: &str = "wpctl";
const DEFAULT_SINK: &str = "@DEFAULT_AUDIO_SINK@";

pub struct PipeWireBackend;

impl PipeWireBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PipeWireBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl VolumeBackend for PipeWireBackend {
    fn get_volume(&self) -> Result<u8> {
        let output = run_tool(PIPEWIRE_TOOL, &["get-volume", DEFAULT_SINK])?;
        parse_volume(&output)
    }

    fn set_volume(&self, volume: u8) -> Result<()> {
        ensure_volume_range(volume)?;
        let level = format!("{volume}%");
        run_tool(PIPEWIRE_TOOL, &["set-volume", DEFAULT_SINK, &level])?;
        Ok(())
    }

    fn is_muted(&self) -> Result<bool> {
        let output = run_tool(PIPEWIRE_TOOL, &["get-volume", DEFAULT_SINK])?;
        Ok(output.contains("[MUTED]"))
    }

    fn set_mute(&self, mute: bool) -> Result<()> {
        let flag = if mute { "1" } else { "0" };
        run_tool(PIPEWIRE_TOOL, &["set-mute", DEFAULT_SINK, flag])?;
        Ok(())
    }

    fn device_name(&self) -> Option<String> {
        let output = run_tool_opt(PIPEWIRE_TOOL, &["inspect", DEFAULT_SINK])?;
        parse_node_description(&output)
    }

    fn name(&self) -> &'static str {
        "PipeWire (wpctl)"
    }
}

/// Parse `Volume: 0.50` / `Volume: 0.50 [MUTED]` into a percentage.
///
/// Boosted sinks can report fractions above 1.0; reads are capped at 100%
/// so the facade's volume range holds.
fn parse_volume(output: &str) -> Result<u8> {
    let fraction = output
        .trim()
        .strip_prefix("Volume:")
        .and_then(|rest| rest.split_whitespace().next())
        .and_then(|token| token.parse::<f64>().ok())
        .ok_or_else(|| {
            VolumeError::BackendProtocol(format!(
                "unexpected wpctl volume output: {}",
                output.trim()
            ))
        })?;

    let percent = (fraction * 100.0).round();
    Ok(percent.clamp(0.0, f64::from(MAX_VOLUME)) as u8)
}

/// Pull `node.description = "..."` out of `wpctl inspect` output.
fn parse_node_description(output: &str) -> Option<String> {
    output
        .lines()
        .find(|line| line.contains("node.description"))
        .and_then(|line| line.split('"').nth(1))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_volume() {
        assert_eq!(parse_volume("Volume: 0.50\n").unwrap(), 50);
        assert_eq!(parse_volume("Volume: 1.00\n").unwrap(), 100);
        assert_eq!(parse_volume("Volume: 0.00\n").unwrap(), 0);
    }

    #[test]
    fn parses_muted_volume() {
        assert_eq!(parse_volume("Volume: 0.35 [MUTED]\n").unwrap(), 35);
    }

    #[test]
    fn caps_boosted_sinks_at_full() {
        assert_eq!(parse_volume("Volume: 1.25\n").unwrap(), 100);
    }

    #[test]
    fn unexpected_output_is_a_protocol_error() {
        let err = parse_volume("Object '@DEFAULT_AUDIO_SINK@' not found\n").unwrap_err();
        assert!(matches!(err, VolumeError::BackendProtocol(_)));
    }

    #[test]
    fn extracts_node_description() {
        let output = "\
 id 43, type PipeWire:Interface:Node
    device.api = \"alsa\"
    node.description = \"Built-in Audio Analog Stereo\"
    node.name = \"alsa_output.pci-0000_00_1f.3.analog-stereo\"
";
        assert_eq!(
            parse_node_description(output).unwrap(),
            "Built-in Audio Analog Stereo"
        );
    }
}
