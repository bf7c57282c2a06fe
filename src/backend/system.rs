//! Backend that drives the host through command-line tools

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;

use super::apps::{self, DisplayServer};
use super::keys::Combo;
use super::mixer::Mixer;
use super::volume;
use super::{Backend, Device, MediaCommand};
use crate::{Error, Result};

/// Upper bound on how long a helper tool may run
const TOOL_TIMEOUT: Duration = Duration::from_secs(5);

/// Settings for [`SystemBackend`]
#[derive(Debug, Clone)]
pub struct SystemBackendConfig {
    /// `amixer` simple control used for playback volume
    pub playback_control: String,

    /// `amixer` simple control used for capture volume
    pub capture_control: String,
}

impl Default for SystemBackendConfig {
    fn default() -> Self {
        Self {
            playback_control: "Master".to_string(),
            capture_control: "Capture".to_string(),
        }
    }
}

/// Drives keyboard, windows, media players and the mixer via external tools
///
/// - keyboard: `xdotool`
/// - windows: `xdotool`/`wmctrl` on X11, `swaymsg`/`hyprctl`/`pkill` on Wayland
/// - media: `playerctl`
/// - volume: `amixer`
#[derive(Debug, Clone)]
pub struct SystemBackend {
    display: DisplayServer,
    mixer: Mixer,
}

impl SystemBackend {
    /// Create a backend for the display server found in the environment
    #[must_use]
    pub fn new(config: SystemBackendConfig) -> Self {
        let display_server = DisplayServer::detect();
        tracing::info!(
            display = %display_server,
            playback = %config.playback_control,
            capture = %config.capture_control,
            "system backend initialized"
        );
        Self {
            display: display_server,
            mixer: Mixer::new(config.playback_control, config.capture_control),
        }
    }

    /// Log which helper tools are missing from `PATH`
    pub fn report_missing_tools(&self) {
        let mut wanted = vec!["xdotool", "playerctl", "amixer", "pgrep"];
        wanted.extend(self.display.window_tools());
        for tool in wanted {
            if which::which(tool).is_err() {
                tracing::warn!(%tool, "helper tool not found in PATH, related actions will fail");
            }
        }
    }

    async fn set_level(
        &self,
        device: Device,
        adjust: impl FnOnce(volume::Range, i64) -> i64 + Send,
    ) -> Result<()> {
        let state = self.mixer.state(device).await?;
        let level = adjust(state.range, state.level);
        tracing::debug!(%device, from = state.level, to = level, "setting mixer level");
        self.mixer.set_level(device, level).await
    }
}

impl Default for SystemBackend {
    fn default() -> Self {
        Self::new(SystemBackendConfig::default())
    }
}

/// Resolve `tool` on `PATH`
fn locate(tool: &str) -> Result<std::path::PathBuf> {
    which::which(tool).map_err(|_| Error::Backend(format!("{tool} not found in PATH")))
}

/// Run `tool` to completion and return its stdout
pub(super) async fn run(tool: &str, args: &[&str]) -> Result<String> {
    let program = locate(tool)?;
    tracing::debug!(%tool, ?args, "running helper");

    let output = timeout(
        TOOL_TIMEOUT,
        Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output(),
    )
    .await
    .map_err(|_| Error::Backend(format!("{tool} timed out after {TOOL_TIMEOUT:?}")))?
    .map_err(|e| Error::Backend(format!("failed to run {tool}: {e}")))?;

    if !output.status.success() {
        let code = output.status.code().unwrap_or(-1);
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::Backend(format!(
            "{tool} exited with code {code}: {}",
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Start `program` without waiting for it to exit
pub(super) fn spawn_detached(program: &str, args: &[&str]) -> Result<()> {
    let path = locate(program)?;
    tracing::debug!(%program, ?args, "spawning");

    let mut child = Command::new(path)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| Error::Backend(format!("failed to launch {program}: {e}")))?;

    // Reap the child in the background so it never lingers as a zombie
    let name = program.to_string();
    tokio::spawn(async move {
        match child.wait().await {
            Ok(status) => tracing::debug!(program = %name, %status, "launched program exited"),
            Err(e) => tracing::warn!(program = %name, error = %e, "failed to wait on launched program"),
        }
    });

    Ok(())
}

#[async_trait]
impl Backend for SystemBackend {
    async fn app_open(&self, name: &str, args: &[&str]) -> Result<()> {
        spawn_detached(name, args)
    }

    async fn app_close(&self, name: &str) -> Result<()> {
        let (tool, args) = apps::close_command(self.display, name);
        run(tool, &args.iter().map(String::as_str).collect::<Vec<_>>()).await?;
        Ok(())
    }

    async fn app_switch(&self, name: &str) -> Result<()> {
        let target = if self.display == DisplayServer::Hyprland {
            let clients = run("hyprctl", &["clients"]).await?;
            apps::hyprland_class(&clients, name).ok_or_else(|| {
                Error::Backend(format!("no window matching {name}"))
            })?
        } else {
            name.to_string()
        };

        let mut last_err = None;
        for (tool, args) in apps::switch_commands(self.display, &target) {
            let args: Vec<&str> = args.iter().map(String::as_str).collect();
            match run(tool, &args).await {
                Ok(_) => return Ok(()),
                Err(e) => {
                    tracing::debug!(%tool, error = %e, "window switch attempt failed");
                    last_err = Some(e);
                }
            }
        }
        Err(last_err.unwrap_or_else(|| Error::Backend(format!("cannot switch to {name}"))))
    }

    async fn app_running(&self, name: &str) -> Result<bool> {
        let program = locate("pgrep")?;
        let status = timeout(
            TOOL_TIMEOUT,
            Command::new(program)
                .args(["-x", name])
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status(),
        )
        .await
        .map_err(|_| Error::Backend("pgrep timed out".to_string()))?
        .map_err(|e| Error::Backend(format!("failed to run pgrep: {e}")))?;

        // pgrep exits 1 when nothing matched
        match status.code() {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            _ => Err(Error::Backend(format!("pgrep failed: {status}"))),
        }
    }

    async fn key_press(&self, combo: &str) -> Result<()> {
        let combo = Combo::parse(combo)?;
        let keys = combo.to_xdotool();
        run("xdotool", &["keydown", keys.as_str()]).await?;
        Ok(())
    }

    async fn key_release(&self, combo: &str) -> Result<()> {
        let combo = Combo::parse(combo)?;
        let keys = combo.to_xdotool();
        run("xdotool", &["keyup", keys.as_str()]).await?;
        Ok(())
    }

    async fn key_click(&self, combo: &str) -> Result<()> {
        let combo = Combo::parse(combo)?;
        let keys = combo.to_xdotool();
        run("xdotool", &["key", "--clearmodifiers", keys.as_str()]).await?;
        Ok(())
    }

    async fn key_type(&self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Err(Error::Backend("nothing to type".to_string()));
        }
        run("xdotool", &["type", "--", text]).await?;
        Ok(())
    }

    async fn media(&self, command: MediaCommand) -> Result<()> {
        let verb = match command {
            MediaCommand::Play => "play",
            MediaCommand::Pause => "pause",
            MediaCommand::Toggle => "play-pause",
            MediaCommand::Next => "next",
            MediaCommand::Previous => "previous",
        };
        run("playerctl", &[verb]).await?;
        Ok(())
    }

    async fn volume_inc(&self, device: Device, percent: i64) -> Result<()> {
        self.set_level(device, |range, level| volume::raised(range, level, percent))
            .await
    }

    async fn volume_dec(&self, device: Device, percent: i64) -> Result<()> {
        self.set_level(device, |range, level| volume::lowered(range, level, percent))
            .await
    }

    async fn volume_set(&self, device: Device, percent: i64) -> Result<()> {
        self.set_level(device, |range, _| volume::absolute(range, percent))
            .await
    }

    async fn volume_mute(&self, device: Device) -> Result<()> {
        self.mixer.switch(device, Some(false)).await
    }

    async fn volume_unmute(&self, device: Device) -> Result<()> {
        self.mixer.switch(device, Some(true)).await
    }

    async fn volume_toggle(&self, device: Device) -> Result<()> {
        self.mixer.switch(device, None).await
    }
}
