//! The uniform volume controller.
//!
//! Wraps a single backend adapter and layers the backend-agnostic
//! behavior on top: range validation, increment/decrement clamping, mute
//! toggling, and the smooth volume transition with cancellation and
//! single-flight mutual exclusion.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::backend::{MAX_VOLUME, VolumeBackend};
use crate::error::{Result, VolumeError};
use crate::selector::{BackendPreference, select_backend};

/// Number of interpolation steps in a smooth transition, independent of
/// its duration.
pub const TRANSITION_STEPS: u32 = 20;

/// Volume controller parameterized over a backend adapter for dependency
/// injection. The controller exclusively owns its adapter and never talks
/// to the OS except through it.
pub struct VolumeController<B: VolumeBackend> {
    backend: B,
    /// Serializes transition-vs-transition access to the backend's write
    /// path. Held for the duration of a transition session.
    transition_gate: tokio::sync::Mutex<()>,
    /// Supersession token of the in-flight transition, if any, keyed by a
    /// session id so a finished session never clears its successor's slot.
    active_session: Mutex<Option<(u64, CancellationToken)>>,
    session_ids: AtomicU64,
}

impl<B: VolumeBackend> VolumeController<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            transition_gate: tokio::sync::Mutex::new(()),
            active_session: Mutex::new(None),
            session_ids: AtomicU64::new(0),
        }
    }

    /// Read the current volume percentage
    pub fn volume(&self) -> Result<u8> {
        self.backend.get_volume()
    }

    /// Set the volume to an exact percentage in [0, 100]
    pub fn set_volume(&self, volume: u8) -> Result<()> {
        if volume > MAX_VOLUME {
            return Err(VolumeError::InvalidArgument(format!(
                "volume {volume}% is outside the 0-100 range"
            )));
        }
        self.backend.set_volume(volume)
    }

    /// Raise the volume by `step` percent, clamped at 100.
    ///
    /// Read-then-write: not atomic against concurrent external volume
    /// changes, last write wins. Returns the new volume.
    pub fn increase_volume(&self, step: u8) -> Result<u8> {
        if step == 0 {
            return Err(VolumeError::InvalidArgument(
                "volume step must be positive".to_string(),
            ));
        }
        let current = self.backend.get_volume()?;
        let next = current.saturating_add(step).min(MAX_VOLUME);
        self.backend.set_volume(next)?;
        debug!("volume raised {current}% -> {next}%");
        Ok(next)
    }

    /// Lower the volume by `step` percent, clamped at 0. Returns the new
    /// volume.
    pub fn decrease_volume(&self, step: u8) -> Result<u8> {
        if step == 0 {
            return Err(VolumeError::InvalidArgument(
                "volume step must be positive".to_string(),
            ));
        }
        let current = self.backend.get_volume()?;
        let next = current.saturating_sub(step);
        self.backend.set_volume(next)?;
        debug!("volume lowered {current}% -> {next}%");
        Ok(next)
    }

    /// Read the current mute state
    pub fn is_muted(&self) -> Result<bool> {
        self.backend.is_muted()
    }

    pub fn mute(&self) -> Result<()> {
        self.backend.set_mute(true)
    }

    pub fn unmute(&self) -> Result<()> {
        self.backend.set_mute(false)
    }

    /// Flip the mute state and return the new one.
    ///
    /// Read-then-write, not atomic against concurrent external changes.
    pub fn toggle_mute(&self) -> Result<bool> {
        let next = !self.backend.is_muted()?;
        self.backend.set_mute(next)?;
        Ok(next)
    }

    /// Static identity of the wrapped backend adapter
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Name of the active output device, when the backend can report one
    pub fn current_device(&self) -> Option<String> {
        self.backend.device_name()
    }

    /// Fade the volume to `target` over `duration`, in 20 eased steps.
    ///
    /// At most one transition runs per controller: a new call cancels the
    /// in-flight session's supersession token before waiting on the gate,
    /// so supersession is prompt rather than queued behind a full-length
    /// fade. The caller-supplied `cancel` token and the internal
    /// supersession token are honored identically at every step and every
    /// delay; cancellation ends the fade mid-flight and is not an error.
    ///
    /// Fading to the current volume is an idempotent no-op: it returns
    /// immediately without writing to the backend. Backend errors during a
    /// step abort the transition and propagate.
    pub async fn set_volume_smooth(
        &self,
        target: u8,
        duration: Duration,
        cancel: CancellationToken,
    ) -> Result<()> {
        if target > MAX_VOLUME {
            return Err(VolumeError::InvalidArgument(format!(
                "target volume {target}% is outside the 0-100 range"
            )));
        }
        if duration.is_zero() {
            return Err(VolumeError::InvalidArgument(
                "transition duration must be positive".to_string(),
            ));
        }

        let start = self.backend.get_volume()?;
        if start == target {
            debug!("already at {target}%, skipping transition");
            return Ok(());
        }

        let supersede = CancellationToken::new();
        let session_id = self.session_ids.fetch_add(1, Ordering::Relaxed);
        {
            let mut active = self.active_session.lock().unwrap();
            if let Some((prev_id, prev)) = active.replace((session_id, supersede.clone())) {
                debug!("superseding transition session {prev_id}");
                prev.cancel();
            }
        }

        let _gate = self.transition_gate.lock().await;
        let result = self
            .run_transition(start, target, duration, &cancel, &supersede)
            .await;

        let mut active = self.active_session.lock().unwrap();
        if active.as_ref().map(|(id, _)| *id) == Some(session_id) {
            *active = None;
        }
        drop(active);

        result
    }

    async fn run_transition(
        &self,
        start: u8,
        target: u8,
        duration: Duration,
        cancel: &CancellationToken,
        supersede: &CancellationToken,
    ) -> Result<()> {
        let step_delay = duration / TRANSITION_STEPS;
        let span = f64::from(target) - f64::from(start);
        debug!("transitioning {start}% -> {target}% over {duration:?}");

        for step in 1..=TRANSITION_STEPS {
            if cancel.is_cancelled() || supersede.is_cancelled() {
                debug!("transition cancelled before step {step}");
                return Ok(());
            }

            // Cubic ease-out: most of the change lands early, the fade
            // settles as it approaches the target.
            let progress = f64::from(step) / f64::from(TRANSITION_STEPS);
            let eased = 1.0 - (1.0 - progress).powi(3);
            let level = (f64::from(start) + eased * span).round() as u8;
            self.backend.set_volume(level)?;

            tokio::select! {
                _ = tokio::time::sleep(step_delay) => {}
                _ = cancel.cancelled() => {
                    debug!("transition cancelled during step {step}");
                    return Ok(());
                }
                _ = supersede.cancelled() => {
                    debug!("transition superseded during step {step}");
                    return Ok(());
                }
            }
        }

        // Force the exact target to correct rounding drift across steps
        self.backend.set_volume(target)?;
        info!("volume transition complete at {target}%");
        Ok(())
    }
}

// Convenience constructor for production use with the platform-selected
// backend
impl VolumeController<Box<dyn VolumeBackend>> {
    pub async fn for_current_platform() -> Result<Self> {
        let selected = select_backend(BackendPreference::Auto).await?;
        Ok(Self::new(selected.adapter))
    }
}
