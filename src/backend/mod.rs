//! Input, window and mixer backends
//!
//! The macro engine only talks to the [`Backend`] trait. Two implementations
//! ship with the crate:
//! - [`SystemBackend`]: drives the host through `xdotool`, `wmctrl`,
//!   compositor CLIs, `playerctl` and `amixer`
//! - [`DryRunBackend`]: logs every call and touches nothing

mod apps;
mod dry_run;
mod keys;
mod mixer;
mod system;
pub mod volume;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use dry_run::DryRunBackend;
pub use system::{SystemBackend, SystemBackendConfig};

use crate::{Error, Result};

/// Mixer device a volume operation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Device {
    /// Output (speakers, headphones)
    Playback,
    /// Input (microphone)
    Capture,
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Playback => write!(f, "playback"),
            Self::Capture => write!(f, "capture"),
        }
    }
}

/// Media player transport command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaCommand {
    Play,
    Pause,
    Toggle,
    Next,
    Previous,
}

impl fmt::Display for MediaCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Play => write!(f, "play"),
            Self::Pause => write!(f, "pause"),
            Self::Toggle => write!(f, "toggle"),
            Self::Next => write!(f, "next"),
            Self::Previous => write!(f, "previous"),
        }
    }
}

/// Capability interface the macro engine calls, one method per effect
///
/// Implementations are shared by every connection and must do their own
/// locking if the underlying device handles need it.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Launch `name` with `args`
    async fn app_open(&self, name: &str, args: &[&str]) -> Result<()>;

    /// Close the windows of `name`
    async fn app_close(&self, name: &str) -> Result<()>;

    /// Focus a window of `name`
    async fn app_switch(&self, name: &str) -> Result<()>;

    /// Whether a process named `name` is running
    async fn app_running(&self, name: &str) -> Result<bool>;

    /// Press (and hold) a key combination such as `Ctrl+Shift+t`
    async fn key_press(&self, combo: &str) -> Result<()>;

    /// Release a key combination
    async fn key_release(&self, combo: &str) -> Result<()>;

    /// Press and release a key combination
    async fn key_click(&self, combo: &str) -> Result<()>;

    /// Type `text` character by character
    async fn key_type(&self, text: &str) -> Result<()>;

    /// Send a transport command to the active media player
    async fn media(&self, command: MediaCommand) -> Result<()>;

    /// Raise volume by `percent` of the device range
    async fn volume_inc(&self, device: Device, percent: i64) -> Result<()>;

    /// Lower volume by `percent` of the device range
    async fn volume_dec(&self, device: Device, percent: i64) -> Result<()>;

    /// Set volume to `percent` of the device range
    async fn volume_set(&self, device: Device, percent: i64) -> Result<()>;

    /// Mute the device
    async fn volume_mute(&self, device: Device) -> Result<()>;

    /// Unmute the device
    async fn volume_unmute(&self, device: Device) -> Result<()>;

    /// Flip the device's mute switch
    async fn volume_toggle(&self, device: Device) -> Result<()>;
}

/// Which backend the server drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    /// Real input injection and mixer control
    #[default]
    System,
    /// Log only
    DryRun,
}

impl FromStr for BackendKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "system" => Ok(Self::System),
            "dry-run" | "dry_run" | "dryrun" => Ok(Self::DryRun),
            other => Err(Error::Config(format!("unknown backend: {other}"))),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::System => write!(f, "system"),
            Self::DryRun => write!(f, "dry-run"),
        }
    }
}
