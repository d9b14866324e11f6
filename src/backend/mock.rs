use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::{VolumeBackend, ensure_volume_range};
use crate::error::{Result, VolumeError};

/// Mock volume backend for testing - provides controllable state, call
/// recording, and failure injection.
#[derive(Clone)]
pub struct MockBackend {
    pub volume: Arc<Mutex<u8>>,
    pub muted: Arc<Mutex<bool>>,
    pub device: Arc<Mutex<Option<String>>>,
    pub set_volume_calls: Arc<Mutex<Vec<u8>>>,
    pub set_mute_calls: Arc<Mutex<Vec<bool>>>,
    pub read_calls: Arc<AtomicUsize>,
    pub should_fail_reads: Arc<AtomicBool>,
    pub should_fail_writes: Arc<AtomicBool>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::with_volume(50)
    }

    /// Create a mock starting at a specific volume
    pub fn with_volume(volume: u8) -> Self {
        Self {
            volume: Arc::new(Mutex::new(volume)),
            muted: Arc::new(Mutex::new(false)),
            device: Arc::new(Mutex::new(Some("Mock Output".to_string()))),
            set_volume_calls: Arc::new(Mutex::new(Vec::new())),
            set_mute_calls: Arc::new(Mutex::new(Vec::new())),
            read_calls: Arc::new(AtomicUsize::new(0)),
            should_fail_reads: Arc::new(AtomicBool::new(false)),
            should_fail_writes: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Current volume held by the mock
    pub fn current_volume(&self) -> u8 {
        *self.volume.lock().unwrap()
    }

    /// Current mute state held by the mock
    pub fn currently_muted(&self) -> bool {
        *self.muted.lock().unwrap()
    }

    /// All volume levels written through the adapter, in order
    pub fn recorded_volumes(&self) -> Vec<u8> {
        self.set_volume_calls.lock().unwrap().clone()
    }

    /// Number of volume writes that were made
    pub fn write_count(&self) -> usize {
        self.set_volume_calls.lock().unwrap().len()
    }

    /// Number of volume/mute reads that were made
    pub fn read_count(&self) -> usize {
        self.read_calls.load(Ordering::Relaxed)
    }

    /// Clear the recorded call history
    pub fn clear_call_history(&self) {
        self.set_volume_calls.lock().unwrap().clear();
        self.set_mute_calls.lock().unwrap().clear();
        self.read_calls.store(0, Ordering::Relaxed);
    }

    /// Configure the mock to fail read operations
    pub fn set_read_failure(&self, should_fail: bool) {
        self.should_fail_reads.store(should_fail, Ordering::Relaxed);
    }

    /// Configure the mock to fail write operations
    pub fn set_write_failure(&self, should_fail: bool) {
        self.should_fail_writes.store(should_fail, Ordering::Relaxed);
    }

    /// Set the device name the mock reports
    pub fn set_device_name(&self, name: Option<&str>) {
        *self.device.lock().unwrap() = name.map(str::to_string);
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl VolumeBackend for MockBackend {
    fn get_volume(&self) -> Result<u8> {
        self.read_calls.fetch_add(1, Ordering::Relaxed);
        if self.should_fail_reads.load(Ordering::Relaxed) {
            return Err(VolumeError::BackendUnavailable(
                "mock read failure".to_string(),
            ));
        }
        Ok(*self.volume.lock().unwrap())
    }

    fn set_volume(&self, volume: u8) -> Result<()> {
        ensure_volume_range(volume)?;
        if self.should_fail_writes.load(Ordering::Relaxed) {
            return Err(VolumeError::BackendUnavailable(
                "mock write failure".to_string(),
            ));
        }
        self.set_volume_calls.lock().unwrap().push(volume);
        *self.volume.lock().unwrap() = volume;
        Ok(())
    }

    fn is_muted(&self) -> Result<bool> {
        self.read_calls.fetch_add(1, Ordering::Relaxed);
        if self.should_fail_reads.load(Ordering::Relaxed) {
            return Err(VolumeError::BackendUnavailable(
                "mock read failure".to_string(),
            ));
        }
        Ok(*self.muted.lock().unwrap())
    }

    fn set_mute(&self, mute: bool) -> Result<()> {
        if self.should_fail_writes.load(Ordering::Relaxed) {
            return Err(VolumeError::BackendUnavailable(
                "mock write failure".to_string(),
            ));
        }
        self.set_mute_calls.lock().unwrap().push(mute);
        *self.muted.lock().unwrap() = mute;
        Ok(())
    }

    fn device_name(&self) -> Option<String> {
        self.device.lock().unwrap().clone()
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
