//! Key combination parsing
//!
//! Combinations are written `Mod+Mod+Key`, e.g. `Ctrl+Shift+t` or
//! `Super+Return`. Everything before the last `+` must be a modifier; the
//! last token is an X keysym name or one of the media key aliases.

use crate::{Error, Result};

/// A parsed key combination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Combo {
    modifiers: Vec<&'static str>,
    key: String,
}

fn modifier(name: &str) -> Option<&'static str> {
    match name.to_ascii_lowercase().as_str() {
        "alt" => Some("alt"),
        "ctrl" | "control" => Some("ctrl"),
        "shift" => Some("shift"),
        "super" | "meta" | "win" => Some("super"),
        _ => None,
    }
}

fn key_alias(name: &str) -> Option<&'static str> {
    match name {
        "VolumeUp" => Some("XF86AudioRaiseVolume"),
        "VolumeDown" => Some("XF86AudioLowerVolume"),
        "VolumeMute" => Some("XF86AudioMute"),
        "MicMute" => Some("XF86AudioMicMute"),
        "PlayPause" => Some("XF86AudioPlay"),
        "NextTrack" => Some("XF86AudioNext"),
        "PrevTrack" => Some("XF86AudioPrev"),
        _ => None,
    }
}

impl Combo {
    /// Parse a `Mod+Key` combination
    pub fn parse(combo: &str) -> Result<Self> {
        let tokens: Vec<&str> = combo.split('+').map(str::trim).collect();
        let Some((key, mods)) = tokens.split_last() else {
            return Err(Error::Backend(format!("invalid key combination: {combo}")));
        };

        if key.is_empty() {
            return Err(Error::Backend(format!("invalid key combination: {combo}")));
        }

        let modifiers = mods
            .iter()
            .map(|m| modifier(m).ok_or_else(|| Error::Backend(format!("unknown modifier: {m}"))))
            .collect::<Result<Vec<_>>>()?;

        let key = key_alias(key).map_or_else(|| (*key).to_string(), ToString::to_string);

        Ok(Self { modifiers, key })
    }

    /// Render for `xdotool key`/`keydown`/`keyup`
    #[must_use]
    pub fn to_xdotool(&self) -> String {
        let mut parts: Vec<&str> = self.modifiers.iter().copied().collect();
        parts.push(self.key.as_str());
        parts.join("+")
    }
}
