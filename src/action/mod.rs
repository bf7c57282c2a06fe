//! Typed actions: one opcode plus its positional arguments
//!
//! Validation is purely structural (argument count and kind per slot, as
//! declared by [`Opcode::shape`]). A step whose arguments don't fit performs
//! no side effect at all.

mod opcode;
mod shape;

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use opcode::Opcode;
pub use shape::{Arg, ArgKind, Bound, Shape};

use crate::backend::{Backend, Device, MediaCommand};
use crate::{Error, Result};

/// A single macro step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawAction", into = "RawAction")]
pub struct Action {
    opcode: Opcode,
    args: Vec<Arg>,
    /// Name as written in the macro file, kept only when it was not recognised
    unknown_name: Option<String>,
}

/// On-disk form of a step: `{"action": "key_click", "args": ["Super+Return"]}`
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawAction {
    action: String,
    #[serde(default)]
    args: Vec<Arg>,
}

impl From<RawAction> for Action {
    fn from(raw: RawAction) -> Self {
        Self::from_name(&raw.action, raw.args)
    }
}

impl From<Action> for RawAction {
    fn from(action: Action) -> Self {
        Self {
            action: action
                .unknown_name
                .unwrap_or_else(|| action.opcode.name().to_string()),
            args: action.args,
        }
    }
}

impl Action {
    /// Create an action for a known opcode
    #[must_use]
    pub const fn new(opcode: Opcode, args: Vec<Arg>) -> Self {
        Self {
            opcode,
            args,
            unknown_name: None,
        }
    }

    /// Create an action from its macro-file name
    ///
    /// Unrecognised names become [`Opcode::Nop`] and are reported when run.
    #[must_use]
    pub fn from_name(name: &str, args: Vec<Arg>) -> Self {
        match Opcode::from_name(name) {
            Some(opcode) => Self::new(opcode, args),
            None => {
                tracing::warn!(action = %name, "unknown action, loading as nop");
                Self {
                    opcode: Opcode::Nop,
                    args,
                    unknown_name: Some(name.to_string()),
                }
            }
        }
    }

    fn unknown(&self) -> Error {
        Error::UnknownOpcode(
            self.unknown_name
                .clone()
                .unwrap_or_else(|| Opcode::Nop.name().to_string()),
        )
    }

    #[must_use]
    pub const fn opcode(&self) -> Opcode {
        self.opcode
    }

    #[must_use]
    pub fn args(&self) -> &[Arg] {
        &self.args
    }

    /// Check the arguments against the opcode's shape
    ///
    /// A step loaded from an unrecognised name is never valid, and a `wait`
    /// duration must not be negative.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] or [`Error::UnknownOpcode`]
    pub fn validate(&self) -> Result<()> {
        if self.opcode == Opcode::Nop {
            return Err(self.unknown());
        }
        self.opcode
            .shape()
            .check(&self.args)
            .map_err(|reason| Error::validation(self.opcode, reason))?;

        if self.opcode == Opcode::Wait
            && let Some(millis) = self.args.first().and_then(Arg::as_int)
            && millis < 0
        {
            return Err(Error::validation(
                self.opcode,
                "duration must not be negative",
            ));
        }
        Ok(())
    }

    /// Whether the arguments fit the opcode's shape
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Perform the action against `backend`
    ///
    /// Arguments are checked before anything else, so an invalid step never
    /// reaches the backend.
    ///
    /// # Errors
    ///
    /// Returns the validation, unknown-action or backend error; the caller
    /// decides whether to continue
    pub async fn execute(&self, backend: &dyn Backend) -> Result<()> {
        self.validate()?;

        let args = self
            .opcode
            .shape()
            .bind(&self.args)
            .map_err(|reason| Error::validation(self.opcode, reason))?;

        tracing::debug!(opcode = %self.opcode, args = ?self.args, "executing action");

        match self.opcode {
            Opcode::Nop => Err(self.unknown()),

            Opcode::AppOpen => backend.app_open(args.text(0), &args.texts_from(1)).await,
            Opcode::AppOpenIfClosed => {
                let name = args.text(0);
                if backend.app_running(name).await? {
                    tracing::debug!(app = %name, "already running, not opening");
                    Ok(())
                } else {
                    backend.app_open(name, &args.texts_from(1)).await
                }
            }
            Opcode::AppClose => backend.app_close(args.text(0)).await,
            Opcode::AppCloseIfOpen => {
                let name = args.text(0);
                if backend.app_running(name).await? {
                    backend.app_close(name).await
                } else {
                    tracing::debug!(app = %name, "not running, nothing to close");
                    Ok(())
                }
            }
            Opcode::AppSwitch => backend.app_switch(args.text(0)).await,
            Opcode::AppSwitchOrOpen => {
                let name = args.text(0);
                if backend.app_running(name).await? {
                    backend.app_switch(name).await
                } else {
                    backend.app_open(name, &args.texts_from(1)).await
                }
            }

            Opcode::KeyPress => backend.key_press(args.text(0)).await,
            Opcode::KeyRelease => backend.key_release(args.text(0)).await,
            Opcode::KeyClick => backend.key_click(args.text(0)).await,
            Opcode::KeyType => backend.key_type(args.text(0)).await,

            Opcode::MediaPlay => backend.media(MediaCommand::Play).await,
            Opcode::MediaPause => backend.media(MediaCommand::Pause).await,
            Opcode::MediaToggle => backend.media(MediaCommand::Toggle).await,
            Opcode::MediaNext => backend.media(MediaCommand::Next).await,
            Opcode::MediaPrev => backend.media(MediaCommand::Previous).await,

            Opcode::VolumeInc => backend.volume_inc(Device::Playback, args.int(0)).await,
            Opcode::VolumeDec => backend.volume_dec(Device::Playback, args.int(0)).await,
            Opcode::VolumeSet => backend.volume_set(Device::Playback, args.int(0)).await,
            Opcode::VolumeMute => backend.volume_mute(Device::Playback).await,
            Opcode::VolumeUnmute => backend.volume_unmute(Device::Playback).await,
            Opcode::VolumeToggle => backend.volume_toggle(Device::Playback).await,

            Opcode::CaptureInc => backend.volume_inc(Device::Capture, args.int(0)).await,
            Opcode::CaptureDec => backend.volume_dec(Device::Capture, args.int(0)).await,
            Opcode::CaptureSet => backend.volume_set(Device::Capture, args.int(0)).await,
            Opcode::CaptureMute => backend.volume_mute(Device::Capture).await,
            Opcode::CaptureUnmute => backend.volume_unmute(Device::Capture).await,
            Opcode::CaptureToggle => backend.volume_toggle(Device::Capture).await,

            Opcode::Wait => {
                // Non-negative after validate()
                let millis = args.int(0).unsigned_abs();
                tokio::time::sleep(Duration::from_millis(millis)).await;
                Ok(())
            }
        }
    }
}
