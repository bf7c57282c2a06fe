//! Shared test utilities

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use macrodeck::{
    Action, Arg, Backend, Device, Dispatcher, Macro, MacroRegistry, MediaCommand, Opcode, Result,
};
use secrecy::SecretString;

/// One recorded backend call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    AppOpen(String, Vec<String>),
    AppClose(String),
    AppSwitch(String),
    AppRunning(String),
    KeyPress(String),
    KeyRelease(String),
    KeyClick(String),
    KeyType(String),
    Media(MediaCommand),
    VolumeInc(Device, i64),
    VolumeDec(Device, i64),
    VolumeSet(Device, i64),
    VolumeMute(Device),
    VolumeUnmute(Device),
    VolumeToggle(Device),
}

/// Backend that records every call and never touches the host
#[derive(Debug, Default)]
pub struct RecordingBackend {
    calls: Mutex<Vec<Call>>,
    running: Vec<String>,
}

impl RecordingBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `apps` as running from `app_running`
    #[must_use]
    pub fn with_running(apps: &[&str]) -> Self {
        Self {
            calls: Mutex::default(),
            running: apps.iter().map(ToString::to_string).collect(),
        }
    }

    /// Calls made so far, in order
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Backend for RecordingBackend {
    async fn app_open(&self, name: &str, args: &[&str]) -> Result<()> {
        self.record(Call::AppOpen(
            name.to_string(),
            args.iter().map(ToString::to_string).collect(),
        ));
        Ok(())
    }

    async fn app_close(&self, name: &str) -> Result<()> {
        self.record(Call::AppClose(name.to_string()));
        Ok(())
    }

    async fn app_switch(&self, name: &str) -> Result<()> {
        self.record(Call::AppSwitch(name.to_string()));
        Ok(())
    }

    async fn app_running(&self, name: &str) -> Result<bool> {
        self.record(Call::AppRunning(name.to_string()));
        Ok(self.running.iter().any(|app| app == name))
    }

    async fn key_press(&self, combo: &str) -> Result<()> {
        self.record(Call::KeyPress(combo.to_string()));
        Ok(())
    }

    async fn key_release(&self, combo: &str) -> Result<()> {
        self.record(Call::KeyRelease(combo.to_string()));
        Ok(())
    }

    async fn key_click(&self, combo: &str) -> Result<()> {
        self.record(Call::KeyClick(combo.to_string()));
        Ok(())
    }

    async fn key_type(&self, text: &str) -> Result<()> {
        self.record(Call::KeyType(text.to_string()));
        Ok(())
    }

    async fn media(&self, command: MediaCommand) -> Result<()> {
        self.record(Call::Media(command));
        Ok(())
    }

    async fn volume_inc(&self, device: Device, percent: i64) -> Result<()> {
        self.record(Call::VolumeInc(device, percent));
        Ok(())
    }

    async fn volume_dec(&self, device: Device, percent: i64) -> Result<()> {
        self.record(Call::VolumeDec(device, percent));
        Ok(())
    }

    async fn volume_set(&self, device: Device, percent: i64) -> Result<()> {
        self.record(Call::VolumeSet(device, percent));
        Ok(())
    }

    async fn volume_mute(&self, device: Device) -> Result<()> {
        self.record(Call::VolumeMute(device));
        Ok(())
    }

    async fn volume_unmute(&self, device: Device) -> Result<()> {
        self.record(Call::VolumeUnmute(device));
        Ok(())
    }

    async fn volume_toggle(&self, device: Device) -> Result<()> {
        self.record(Call::VolumeToggle(device));
        Ok(())
    }
}

/// Registry with `volume_up` = `[volume_inc 10]`
#[must_use]
pub fn volume_up_registry() -> MacroRegistry {
    let mut registry = MacroRegistry::new();
    registry.insert(
        "volume_up",
        Macro::new(vec![Action::new(Opcode::VolumeInc, vec![Arg::Int(10)])]),
    );
    registry
}

/// Dispatcher over `registry` and `backend`
pub fn dispatcher(
    registry: MacroRegistry,
    backend: Arc<RecordingBackend>,
    password: Option<&str>,
) -> Dispatcher {
    Dispatcher::new(
        Arc::new(registry),
        backend,
        password.map(|p| SecretString::from(p.to_string())),
        r#"{"buttons":[{"label":"Vol+","macro":"volume_up"}]}"#,
    )
}
