//! Configuration management for the macro deck server

pub mod file;

use std::path::PathBuf;

use secrecy::SecretString;

use crate::backend::{BackendKind, SystemBackendConfig};
use crate::{Error, Result};

use file::MacrodeckConfigFile;

/// Default listen port
pub const DEFAULT_PORT: u16 = 5000;

/// Default bind address
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Macro deck server configuration
#[derive(Debug)]
pub struct Config {
    /// Address to bind
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Shared secret; `None` means clients need no authentication
    pub password: Option<SecretString>,

    /// Directory holding `config.json` and `macros/`
    pub deck_dir: PathBuf,

    /// Path to static files directory (web UI)
    pub static_dir: Option<PathBuf>,

    /// Backend driving the host
    pub backend: BackendKind,

    /// Mixer controls used by the system backend
    pub system: SystemBackendConfig,
}

/// Values given on the command line
///
/// These win over the environment, the TOML file and the defaults.
#[derive(Debug, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub password: Option<String>,
    pub deck_dir: Option<PathBuf>,
    pub static_dir: Option<PathBuf>,
    pub backend: Option<BackendKind>,
}

/// Return `~/.config/macrodeck`
pub fn config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("macrodeck"))
}

impl Config {
    /// Load configuration (cli > env > toml > default)
    ///
    /// # Errors
    ///
    /// Returns error if a backend name is not recognised or no deck
    /// directory can be determined
    pub fn load(overrides: ConfigOverrides) -> Result<Self> {
        let fc = file::load_config_file();
        Self::resolve(overrides, fc, |key| std::env::var(key).ok())
    }

    /// Merge overrides, environment (via `env`) and the config file
    ///
    /// # Errors
    ///
    /// See [`Config::load`]
    pub fn resolve(
        overrides: ConfigOverrides,
        fc: MacrodeckConfigFile,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let host = overrides
            .host
            .or_else(|| env("MACRODECK_HOST"))
            .or(fc.server.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = overrides
            .port
            .or_else(|| env("MACRODECK_PORT").and_then(|s| s.parse().ok()))
            .or(fc.server.port)
            .unwrap_or(DEFAULT_PORT);

        // An empty password disables authentication
        let password = overrides
            .password
            .or_else(|| env("MACRODECK_PASSWORD"))
            .or(fc.server.password)
            .filter(|p| !p.is_empty())
            .map(SecretString::from);

        let deck_dir = overrides
            .deck_dir
            .or_else(|| env("MACRODECK_DECK_DIR").map(PathBuf::from))
            .or_else(|| fc.deck.dir.map(PathBuf::from))
            .or_else(config_dir)
            .ok_or_else(|| {
                Error::Config("cannot determine deck directory, set MACRODECK_DECK_DIR".to_string())
            })?;

        let static_dir = overrides
            .static_dir
            .or_else(|| env("MACRODECK_STATIC_DIR").map(PathBuf::from))
            .or_else(|| fc.server.static_dir.map(PathBuf::from));

        let backend = match overrides.backend {
            Some(kind) => kind,
            None => env("MACRODECK_BACKEND")
                .or(fc.backend.kind)
                .map(|s| s.parse::<BackendKind>())
                .transpose()?
                .unwrap_or_default(),
        };

        let defaults = SystemBackendConfig::default();
        let system = SystemBackendConfig {
            playback_control: env("MACRODECK_PLAYBACK_CONTROL")
                .or(fc.backend.playback_control)
                .unwrap_or(defaults.playback_control),
            capture_control: env("MACRODECK_CAPTURE_CONTROL")
                .or(fc.backend.capture_control)
                .unwrap_or(defaults.capture_control),
        };

        Ok(Self {
            host,
            port,
            password,
            deck_dir,
            static_dir,
            backend,
            system,
        })
    }

    /// `host:port` to bind
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn file_from(toml_text: &str) -> MacrodeckConfigFile {
        toml::from_str(toml_text).unwrap()
    }

    #[test]
    fn defaults_apply() {
        let config = Config::resolve(
            ConfigOverrides {
                deck_dir: Some(PathBuf::from("/deck")),
                ..Default::default()
            },
            MacrodeckConfigFile::default(),
            env_from(&[]),
        )
        .unwrap();

        assert_eq!(config.bind_addr(), "0.0.0.0:5000");
        assert!(config.password.is_none());
        assert!(config.static_dir.is_none());
        assert_eq!(config.backend, BackendKind::System);
        assert_eq!(config.system.playback_control, "Master");
        assert_eq!(config.system.capture_control, "Capture");
    }

    #[test]
    fn env_beats_file_and_cli_beats_env() {
        let fc = file_from(
            r#"
            [server]
            port = 6000
            host = "127.0.0.1"

            [deck]
            dir = "/from/file"
            "#,
        );
        let env = env_from(&[("MACRODECK_PORT", "7000"), ("MACRODECK_DECK_DIR", "/from/env")]);
        let config = Config::resolve(
            ConfigOverrides {
                deck_dir: Some(PathBuf::from("/from/cli")),
                ..Default::default()
            },
            fc,
            env,
        )
        .unwrap();

        assert_eq!(config.port, 7000);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.deck_dir, PathBuf::from("/from/cli"));
    }

    #[test]
    fn empty_password_disables_auth() {
        let config = Config::resolve(
            ConfigOverrides {
                password: Some(String::new()),
                deck_dir: Some(PathBuf::from("/deck")),
                ..Default::default()
            },
            MacrodeckConfigFile::default(),
            env_from(&[]),
        )
        .unwrap();
        assert!(config.password.is_none());

        let config = Config::resolve(
            ConfigOverrides {
                deck_dir: Some(PathBuf::from("/deck")),
                ..Default::default()
            },
            file_from("[server]\npassword = \"abc\"\n"),
            env_from(&[]),
        )
        .unwrap();
        assert_eq!(config.password.unwrap().expose_secret(), "abc");
    }

    #[test]
    fn backend_from_file_and_bad_name() {
        let overrides = || ConfigOverrides {
            deck_dir: Some(PathBuf::from("/deck")),
            ..Default::default()
        };

        let config = Config::resolve(
            overrides(),
            file_from("[backend]\nkind = \"dry-run\"\nplayback_control = \"PCM\"\n"),
            env_from(&[]),
        )
        .unwrap();
        assert_eq!(config.backend, BackendKind::DryRun);
        assert_eq!(config.system.playback_control, "PCM");

        let err = Config::resolve(
            overrides(),
            MacrodeckConfigFile::default(),
            env_from(&[("MACRODECK_BACKEND", "uinput")]),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
