//! Window management command selection

use std::fmt;

/// Display server / compositor the backend is running under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayServer {
    X11,
    Sway,
    Hyprland,
    /// Some other Wayland compositor
    Wayland,
}

impl DisplayServer {
    /// Detect from the session environment
    #[must_use]
    pub fn detect() -> Self {
        Self::from_env(|key| std::env::var_os(key).is_some())
    }

    /// Detect using `is_set` to test for environment variables
    pub fn from_env(is_set: impl Fn(&str) -> bool) -> Self {
        if !is_set("WAYLAND_DISPLAY") {
            Self::X11
        } else if is_set("SWAYSOCK") {
            Self::Sway
        } else if is_set("HYPRLAND_INSTANCE_SIGNATURE") {
            Self::Hyprland
        } else {
            Self::Wayland
        }
    }

    /// Tools used for window actions under this display server
    #[must_use]
    pub const fn window_tools(self) -> &'static [&'static str] {
        match self {
            Self::X11 => &["wmctrl"],
            Self::Sway => &["swaymsg", "pkill"],
            Self::Hyprland => &["hyprctl", "pkill"],
            Self::Wayland => &["pkill"],
        }
    }
}

impl fmt::Display for DisplayServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X11 => write!(f, "x11"),
            Self::Sway => write!(f, "sway"),
            Self::Hyprland => write!(f, "hyprland"),
            Self::Wayland => write!(f, "wayland"),
        }
    }
}

/// Command that closes the windows of `name`
pub fn close_command(display: DisplayServer, name: &str) -> (&'static str, Vec<String>) {
    match display {
        DisplayServer::X11 => (
            "xdotool",
            vec![
                "search".into(),
                "--class".into(),
                name.into(),
                "windowclose".into(),
            ],
        ),
        DisplayServer::Sway | DisplayServer::Hyprland | DisplayServer::Wayland => {
            ("pkill", vec!["-x".into(), name.into()])
        }
    }
}

/// Commands that focus a window of `target`, tried in order until one succeeds
///
/// On Hyprland `target` must already be the exact window class.
pub fn switch_commands(display: DisplayServer, target: &str) -> Vec<(&'static str, Vec<String>)> {
    match display {
        DisplayServer::X11 => vec![
            (
                "xdotool",
                vec![
                    "search".into(),
                    "--class".into(),
                    target.into(),
                    "windowactivate".into(),
                ],
            ),
            ("wmctrl", vec!["-x".into(), "-a".into(), target.into()]),
        ],
        DisplayServer::Sway => vec![(
            "swaymsg",
            vec![format!("[app_id=\"{target}\"]"), "focus".into()],
        )],
        DisplayServer::Hyprland => vec![(
            "hyprctl",
            vec![
                "dispatch".into(),
                "focuswindow".into(),
                format!("class:{target}"),
            ],
        )],
        DisplayServer::Wayland => Vec::new(),
    }
}

/// Find the first window class in `hyprctl clients` output containing `partial`
pub fn hyprland_class(clients: &str, partial: &str) -> Option<String> {
    clients
        .lines()
        .filter_map(|line| line.trim().strip_prefix("class: "))
        .map(str::trim)
        .find(|class| class.contains(partial))
        .map(ToString::to_string)
}
