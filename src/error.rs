use thiserror::Error;

/// Error taxonomy for the volume control facade.
///
/// `InvalidArgument` is always raised before any backend interaction.
/// The selection-time variants (`PlatformInit`, `UnsupportedPlatform`,
/// `NoAudioSystemDetected`) are fatal to construction and never raised by
/// a running controller.
#[derive(Debug, Error)]
pub enum VolumeError {
    /// Caller-supplied value outside the contract (volume out of [0, 100],
    /// zero step, non-positive duration).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The underlying OS mechanism could not be reached (process spawn
    /// failure, non-zero exit status, COM activation failure).
    #[error("audio backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Backend output could not be parsed into the expected shape.
    #[error("unexpected backend output: {0}")]
    BackendProtocol(String),

    /// Native audio subsystem initialization failed during selection.
    #[error("platform audio initialization failed: {0}")]
    PlatformInit(String),

    /// The host OS family has no backend adapter.
    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(String),

    /// No supported audio server or mixer tool was found on the host.
    #[error("no supported audio system detected")]
    NoAudioSystemDetected,
}

pub type Result<T> = std::result::Result<T, VolumeError>;
