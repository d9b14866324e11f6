//! Windows backend driving the Core Audio endpoint-volume COM interface.

use std::sync::Mutex;

use tracing::debug;

use windows::Win32::Devices::FunctionDiscovery::PKEY_Device_FriendlyName;
use windows::Win32::Media::Audio::Endpoints::IAudioEndpointVolume;
use windows::Win32::Media::Audio::{IMMDeviceEnumerator, MMDeviceEnumerator, eConsole, eRender};
use windows::Win32::System::Com::{
    CLSCTX_ALL, COINIT_MULTITHREADED, CoCreateInstance, CoInitializeEx, CoUninitialize, STGM_READ,
};
use windows::Win32::System::Variant::VT_LPWSTR;

use super::{VolumeBackend, ensure_volume_range};
use crate::error::{Result, VolumeError};

/// Process-wide COM initialization count.
///
/// COM has process-wide initialization semantics: the first adapter to come
/// up initializes it, the last one to drop tears it down. Guarded by its
/// own lock so concurrent adapter construction stays balanced.
static COM_REFS: Mutex<u32> = Mutex::new(0);

struct ComGuard;

impl ComGuard {
    fn acquire() -> Result<Self> {
        let mut refs = COM_REFS.lock().unwrap();
        if *refs == 0 {
            // S_FALSE (already initialized on this thread) is a success
            // HRESULT and balances against CoUninitialize like S_OK does.
            unsafe { CoInitializeEx(None, COINIT_MULTITHREADED) }
                .ok()
                .map_err(|e| {
                    VolumeError::PlatformInit(format!("COM initialization failed: {e}"))
                })?;
        }
        *refs += 1;
        Ok(Self)
    }
}

impl Drop for ComGuard {
    fn drop(&mut self) {
        let mut refs = COM_REFS.lock().unwrap();
        *refs -= 1;
        if *refs == 0 {
            unsafe { CoUninitialize() };
        }
    }
}

pub struct WindowsBackend {
    endpoint_volume: IAudioEndpointVolume,
    device_name: Option<String>,
    _com: ComGuard,
}

// SAFETY: the endpoint-volume interface is safe to call from any thread
// once COM is initialized with COINIT_MULTITHREADED, and the guard keeps
// COM alive for the lifetime of the interface pointer.
unsafe impl Send for WindowsBackend {}
unsafe impl Sync for WindowsBackend {}

impl WindowsBackend {
    /// Activate the endpoint-volume interface of the default render device.
    ///
    /// Failure here means the native audio subsystem is unavailable and is
    /// fatal to platform selection.
    pub fn new() -> Result<Self> {
        let com = ComGuard::acquire()?;

        unsafe {
            let enumerator: IMMDeviceEnumerator =
                CoCreateInstance(&MMDeviceEnumerator, None, CLSCTX_ALL).map_err(|e| {
                    VolumeError::PlatformInit(format!("MMDeviceEnumerator: {e}"))
                })?;

            let device = enumerator
                .GetDefaultAudioEndpoint(eRender, eConsole)
                .map_err(|e| {
                    VolumeError::PlatformInit(format!("GetDefaultAudioEndpoint: {e}"))
                })?;

            // Query the friendly name from the property store, best-effort
            let device_name = match device.OpenPropertyStore(STGM_READ) {
                Ok(store) => match store.GetValue(&PKEY_Device_FriendlyName) {
                    Ok(prop) => {
                        if prop.Anonymous.Anonymous.vt == VT_LPWSTR {
                            prop.Anonymous.Anonymous.Anonymous.pwszVal.to_string().ok()
                        } else {
                            None
                        }
                    }
                    Err(_) => None,
                },
                Err(_) => None,
            };

            let endpoint_volume: IAudioEndpointVolume =
                device.Activate(CLSCTX_ALL, None).map_err(|e| {
                    VolumeError::PlatformInit(format!("IAudioEndpointVolume: {e}"))
                })?;

            debug!("endpoint volume activated for default render device");

            Ok(Self {
                endpoint_volume,
                device_name,
                _com: com,
            })
        }
    }
}

impl VolumeBackend for WindowsBackend {
    fn get_volume(&self) -> Result<u8> {
        let scalar = unsafe { self.endpoint_volume.GetMasterVolumeLevelScalar() }
            .map_err(|e| VolumeError::BackendUnavailable(format!("GetMasterVolumeLevelScalar: {e}")))?;
        Ok((f64::from(scalar) * 100.0).round() as u8)
    }

    fn set_volume(&self, volume: u8) -> Result<()> {
        ensure_volume_range(volume)?;
        let scalar = f32::from(volume) / 100.0;
        unsafe {
            self.endpoint_volume
                .SetMasterVolumeLevelScalar(scalar, std::ptr::null())
        }
        .map_err(|e| VolumeError::BackendUnavailable(format!("SetMasterVolumeLevelScalar: {e}")))
    }

    fn is_muted(&self) -> Result<bool> {
        let muted = unsafe { self.endpoint_volume.GetMute() }
            .map_err(|e| VolumeError::BackendUnavailable(format!("GetMute: {e}")))?;
        Ok(muted.as_bool())
    }

    fn set_mute(&self, mute: bool) -> Result<()> {
        unsafe { self.endpoint_volume.SetMute(mute, std::ptr::null()) }
            .map_err(|e| VolumeError::BackendUnavailable(format!("SetMute: {e}")))
    }

    fn device_name(&self) -> Option<String> {
        self.device_name.clone()
    }

    fn name(&self) -> &'static str {
        "Windows Core Audio (COM)"
    }
}
