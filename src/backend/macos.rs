//! macOS backend driving the AppleScript bridge via `osascript`.
//!
//! The scripting bridge ships with every supported macOS version, so no
//! probing is needed before instantiating this adapter.

use super::command::run_tool;
use super::{VolumeBackend, ensure_volume_range};
use crate::error::{Result, VolumeError};

const SCRIPT_TOOL: &str = "osascript";

pub struct MacScriptBackend;

impl MacScriptBackend {
    pub fn new() -> Self {
        Self
    }

    fn run_script(&self, script: &str) -> Result<String> {
        run_tool(SCRIPT_TOOL, &["-e", script])
    }
}

impl Default for MacScriptBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl VolumeBackend for MacScriptBackend {
    fn get_volume(&self) -> Result<u8> {
        let output = self.run_script("output volume of (get volume settings)")?;
        parse_volume(&output)
    }

    fn set_volume(&self, volume: u8) -> Result<()> {
        ensure_volume_range(volume)?;
        self.run_script(&format!("set volume output volume {volume}"))?;
        Ok(())
    }

    fn is_muted(&self) -> Result<bool> {
        let output = self.run_script("output muted of (get volume settings)")?;
        parse_mute(&output)
    }

    fn set_mute(&self, mute: bool) -> Result<()> {
        self.run_script(&format!("set volume output muted {mute}"))?;
        Ok(())
    }

    fn device_name(&self) -> Option<String> {
        // The scripting bridge exposes volume settings only, not the
        // active output device.
        None
    }

    fn name(&self) -> &'static str {
        "macOS CoreAudio (osascript)"
    }
}

fn parse_volume(output: &str) -> Result<u8> {
    output.trim().parse::<u8>().map_err(|_| {
        VolumeError::BackendProtocol(format!(
            "unexpected osascript volume output: {}",
            output.trim()
        ))
    })
}

fn parse_mute(output: &str) -> Result<bool> {
    match output.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        // "missing value" on outputs without a mute switch
        other => Err(VolumeError::BackendProtocol(format!(
            "unexpected osascript mute output: {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_volume_output() {
        assert_eq!(parse_volume("50\n").unwrap(), 50);
        assert_eq!(parse_volume("0\n").unwrap(), 0);
    }

    #[test]
    fn parses_mute_output() {
        assert!(parse_mute("true\n").unwrap());
        assert!(!parse_mute("false\n").unwrap());
    }

    #[test]
    fn missing_value_is_a_protocol_error() {
        let err = parse_mute("missing value\n").unwrap_err();
        assert!(matches!(err, VolumeError::BackendProtocol(_)));
    }
}
