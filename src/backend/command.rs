use std::process::Command;

use tracing::debug;

use crate::error::{Result, VolumeError};

/// Run a mixer CLI tool and return its stdout.
///
/// Spawn failures and non-zero exits both map to `BackendUnavailable`; the
/// command-line backends have no way to distinguish a missing binary from a
/// dead audio server, and neither is retryable here.
pub(crate) fn run_tool(tool: &str, args: &[&str]) -> Result<String> {
    debug!("running {tool} {}", args.join(" "));

    let output = Command::new(tool).args(args).output().map_err(|e| {
        VolumeError::BackendUnavailable(format!("failed to run {tool}: {e}"))
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(VolumeError::BackendUnavailable(format!(
            "{tool} exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Run a mixer CLI tool for a best-effort query, swallowing failures.
pub(crate) fn run_tool_opt(tool: &str, args: &[&str]) -> Option<String> {
    run_tool(tool, args).ok()
}
