pub mod backend;
pub mod config;
pub mod controller;
pub mod error;
pub mod selector;

pub use backend::{BackendKind, MAX_VOLUME, VolumeBackend};
pub use config::Config;
pub use controller::{TRANSITION_STEPS, VolumeController};
pub use error::{Result, VolumeError};
pub use selector::{BackendPreference, SelectedBackend, select_backend};
