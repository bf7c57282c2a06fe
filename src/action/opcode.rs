//! Opcode table
//!
//! Every remote-triggerable operation has one `Opcode`. The name used in macro
//! files and the argument shape both live here, so adding an operation means
//! adding a variant, a name and a shape.

use std::fmt;

use super::shape::{ArgKind, Shape};

/// Kind of operation an [`Action`](super::Action) performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// Placeholder for an action name that was not recognised at load time
    Nop,

    // Application control
    AppOpen,
    AppOpenIfClosed,
    AppClose,
    AppCloseIfOpen,
    AppSwitch,
    AppSwitchOrOpen,

    // Keyboard
    KeyPress,
    KeyRelease,
    KeyClick,
    KeyType,

    // Media players
    MediaPlay,
    MediaPause,
    MediaToggle,
    MediaNext,
    MediaPrev,

    // Playback volume
    VolumeInc,
    VolumeDec,
    VolumeSet,
    VolumeMute,
    VolumeUnmute,
    VolumeToggle,

    // Capture volume
    CaptureInc,
    CaptureDec,
    CaptureSet,
    CaptureMute,
    CaptureUnmute,
    CaptureToggle,

    // Control
    Wait,
}

use ArgKind::{Int, Str};

impl Opcode {
    /// Every opcode, `Nop` included
    pub const ALL: [Self; 29] = [
        Self::Nop,
        Self::AppOpen,
        Self::AppOpenIfClosed,
        Self::AppClose,
        Self::AppCloseIfOpen,
        Self::AppSwitch,
        Self::AppSwitchOrOpen,
        Self::KeyPress,
        Self::KeyRelease,
        Self::KeyClick,
        Self::KeyType,
        Self::MediaPlay,
        Self::MediaPause,
        Self::MediaToggle,
        Self::MediaNext,
        Self::MediaPrev,
        Self::VolumeInc,
        Self::VolumeDec,
        Self::VolumeSet,
        Self::VolumeMute,
        Self::VolumeUnmute,
        Self::VolumeToggle,
        Self::CaptureInc,
        Self::CaptureDec,
        Self::CaptureSet,
        Self::CaptureMute,
        Self::CaptureUnmute,
        Self::CaptureToggle,
        Self::Wait,
    ];

    /// Name used for this opcode in macro files
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Nop => "nop",
            Self::AppOpen => "app_open",
            Self::AppOpenIfClosed => "app_open_if_closed",
            Self::AppClose => "app_close",
            Self::AppCloseIfOpen => "app_close_if_open",
            Self::AppSwitch => "app_switch",
            Self::AppSwitchOrOpen => "app_switch_or_open",
            Self::KeyPress => "key_press",
            Self::KeyRelease => "key_release",
            Self::KeyClick => "key_click",
            Self::KeyType => "key_type",
            Self::MediaPlay => "media_play",
            Self::MediaPause => "media_pause",
            Self::MediaToggle => "media_toggle",
            Self::MediaNext => "media_next",
            Self::MediaPrev => "media_prev",
            Self::VolumeInc => "volume_inc",
            Self::VolumeDec => "volume_dec",
            Self::VolumeSet => "volume_set",
            Self::VolumeMute => "volume_mute",
            Self::VolumeUnmute => "volume_unmute",
            Self::VolumeToggle => "volume_toggle",
            Self::CaptureInc => "capture_inc",
            Self::CaptureDec => "capture_dec",
            Self::CaptureSet => "capture_set",
            Self::CaptureMute => "capture_mute",
            Self::CaptureUnmute => "capture_unmute",
            Self::CaptureToggle => "capture_toggle",
            Self::Wait => "wait",
        }
    }

    /// Argument shape this opcode requires
    #[must_use]
    pub const fn shape(self) -> Shape {
        match self {
            Self::AppOpen | Self::AppOpenIfClosed | Self::AppSwitchOrOpen => {
                Shape::variadic(&[Str], Str)
            }
            Self::AppClose
            | Self::AppCloseIfOpen
            | Self::AppSwitch
            | Self::KeyPress
            | Self::KeyRelease
            | Self::KeyClick
            | Self::KeyType => Shape::exact(&[Str]),
            Self::VolumeInc
            | Self::VolumeDec
            | Self::VolumeSet
            | Self::CaptureInc
            | Self::CaptureDec
            | Self::CaptureSet
            | Self::Wait => Shape::exact(&[Int]),
            Self::Nop
            | Self::MediaPlay
            | Self::MediaPause
            | Self::MediaToggle
            | Self::MediaNext
            | Self::MediaPrev
            | Self::VolumeMute
            | Self::VolumeUnmute
            | Self::VolumeToggle
            | Self::CaptureMute
            | Self::CaptureUnmute
            | Self::CaptureToggle => Shape::exact(&[]),
        }
    }

    /// Look up an opcode by its macro-file name
    ///
    /// `nop` is not addressable by name; unknown names return `None`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .filter(|op| *op != Self::Nop)
            .find(|op| op.name() == name)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
