//! ALSA mixer access through `amixer`

use super::Device;
use super::system::run;
use super::volume::Range;
use crate::{Error, Result};

/// Range and current level of one mixer control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MixerState {
    pub range: Range,
    pub level: i64,
}

/// Playback and capture simple controls
#[derive(Debug, Clone)]
pub struct Mixer {
    playback: String,
    capture: String,
}

impl Mixer {
    pub const fn new(playback: String, capture: String) -> Self {
        Self { playback, capture }
    }

    fn control(&self, device: Device) -> &str {
        match device {
            Device::Playback => &self.playback,
            Device::Capture => &self.capture,
        }
    }

    /// Read range and level (first channel) of `device`
    pub async fn state(&self, device: Device) -> Result<MixerState> {
        let control = self.control(device);
        let output = run("amixer", &["get", control]).await?;
        parse_state(&output, device)
            .ok_or_else(|| Error::Backend(format!("cannot read {device} level of {control}")))
    }

    /// Write a raw level to every channel of `device`
    pub async fn set_level(&self, device: Device, level: i64) -> Result<()> {
        // amixer reads a leading '-' as an option; ALSA limits below-range
        // levels to the control minimum on its own
        let level = level.max(0).to_string();
        run("amixer", &["-q", "sset", self.control(device), level.as_str()]).await?;
        Ok(())
    }

    /// Set the mute switch: `Some(true)` on, `Some(false)` muted, `None` toggled
    pub async fn switch(&self, device: Device, on: Option<bool>) -> Result<()> {
        let verb = switch_verb(device, on);
        run("amixer", &["-q", "sset", self.control(device), verb]).await?;
        Ok(())
    }
}

/// `amixer` switch keyword for `device`
const fn switch_verb(device: Device, on: Option<bool>) -> &'static str {
    match (device, on) {
        (Device::Playback, Some(true)) => "unmute",
        (Device::Playback, Some(false)) => "mute",
        (Device::Capture, Some(true)) => "cap",
        (Device::Capture, Some(false)) => "nocap",
        (_, None) => "toggle",
    }
}

/// Parse `amixer get <control>` output
fn parse_state(output: &str, device: Device) -> Option<MixerState> {
    let direction = match device {
        Device::Playback => "Playback",
        Device::Capture => "Capture",
    };

    let mut range = None;
    let mut level = None;

    for line in output.lines().map(str::trim) {
        if let Some(limits) = line.strip_prefix("Limits:") {
            // "Limits: Playback 0 - 65536" or "Limits: 0 - 31"
            let limits = limits.trim();
            let limits = limits.strip_prefix(direction).unwrap_or(limits);
            if let Some((min, max)) = limits.split_once(" - ")
                && let (Ok(min), Ok(max)) = (min.trim().parse(), max.trim().parse())
            {
                range = Some(Range::new(min, max));
            }
        } else if level.is_none()
            && let Some((_, rest)) = line.split_once(&format!(": {direction} "))
        {
            // "Front Left: Playback 39321 [60%] [on]"
            level = rest.split_whitespace().next().and_then(|v| v.parse().ok());
        }
    }

    Some(MixerState {
        range: range?,
        level: level?,
    })
}
