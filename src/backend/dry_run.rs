//! Backend that only logs

use async_trait::async_trait;

use super::{Backend, Device, MediaCommand};
use crate::Result;

/// Logs each call at `info` and performs nothing
///
/// Useful for trying out a deck on a machine without X11/Wayland tooling.
/// Reports every application as not running.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunBackend;

#[async_trait]
impl Backend for DryRunBackend {
    async fn app_open(&self, name: &str, args: &[&str]) -> Result<()> {
        tracing::info!(app = %name, ?args, "dry-run: app_open");
        Ok(())
    }

    async fn app_close(&self, name: &str) -> Result<()> {
        tracing::info!(app = %name, "dry-run: app_close");
        Ok(())
    }

    async fn app_switch(&self, name: &str) -> Result<()> {
        tracing::info!(app = %name, "dry-run: app_switch");
        Ok(())
    }

    async fn app_running(&self, name: &str) -> Result<bool> {
        tracing::info!(app = %name, "dry-run: app_running");
        Ok(false)
    }

    async fn key_press(&self, combo: &str) -> Result<()> {
        tracing::info!(%combo, "dry-run: key_press");
        Ok(())
    }

    async fn key_release(&self, combo: &str) -> Result<()> {
        tracing::info!(%combo, "dry-run: key_release");
        Ok(())
    }

    async fn key_click(&self, combo: &str) -> Result<()> {
        tracing::info!(%combo, "dry-run: key_click");
        Ok(())
    }

    async fn key_type(&self, text: &str) -> Result<()> {
        tracing::info!(len = text.chars().count(), "dry-run: key_type");
        Ok(())
    }

    async fn media(&self, command: MediaCommand) -> Result<()> {
        tracing::info!(%command, "dry-run: media");
        Ok(())
    }

    async fn volume_inc(&self, device: Device, percent: i64) -> Result<()> {
        tracing::info!(%device, percent, "dry-run: volume_inc");
        Ok(())
    }

    async fn volume_dec(&self, device: Device, percent: i64) -> Result<()> {
        tracing::info!(%device, percent, "dry-run: volume_dec");
        Ok(())
    }

    async fn volume_set(&self, device: Device, percent: i64) -> Result<()> {
        tracing::info!(%device, percent, "dry-run: volume_set");
        Ok(())
    }

    async fn volume_mute(&self, device: Device) -> Result<()> {
        tracing::info!(%device, "dry-run: volume_mute");
        Ok(())
    }

    async fn volume_unmute(&self, device: Device) -> Result<()> {
        tracing::info!(%device, "dry-run: volume_unmute");
        Ok(())
    }

    async fn volume_toggle(&self, device: Device) -> Result<()> {
        tracing::info!(%device, "dry-run: volume_toggle");
        Ok(())
    }
}
