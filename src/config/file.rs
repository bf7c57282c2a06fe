//! TOML configuration file loading
//!
//! Supports `~/.config/macrodeck/server.toml` as a persistent config source.
//! Every field is optional; the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct MacrodeckConfigFile {
    /// Listener and authentication
    #[serde(default)]
    pub server: ServerFileConfig,

    /// Deck location
    #[serde(default)]
    pub deck: DeckFileConfig,

    /// Backend selection and mixer controls
    #[serde(default)]
    pub backend: BackendFileConfig,
}

/// Server configuration
#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    /// Bind address (e.g. "0.0.0.0")
    pub host: Option<String>,

    /// Listen port
    pub port: Option<u16>,

    /// Shared secret clients must send before any command
    pub password: Option<String>,

    /// Directory with the web UI
    pub static_dir: Option<String>,
}

/// Deck configuration
#[derive(Debug, Default, Deserialize)]
pub struct DeckFileConfig {
    /// Directory holding `config.json` and `macros/`
    pub dir: Option<String>,
}

/// Backend configuration
#[derive(Debug, Default, Deserialize)]
pub struct BackendFileConfig {
    /// "system" or "dry-run"
    pub kind: Option<String>,

    /// `amixer` control for playback volume
    pub playback_control: Option<String>,

    /// `amixer` control for capture volume
    pub capture_control: Option<String>,
}

/// Load the TOML config file from the standard path
///
/// Returns `MacrodeckConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> MacrodeckConfigFile {
    config_file_path().map_or_else(MacrodeckConfigFile::default, |path| load_from(&path))
}

/// Load a TOML config file from `path`, falling back to defaults
pub fn load_from(path: &Path) -> MacrodeckConfigFile {
    if !path.exists() {
        return MacrodeckConfigFile::default();
    }

    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                MacrodeckConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            MacrodeckConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/macrodeck/server.toml`
pub fn config_file_path() -> Option<PathBuf> {
    super::config_dir().map(|d| d.join("server.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_partial_file() {
        let file: MacrodeckConfigFile = toml::from_str(
            r#"
            [server]
            port = 5050
            password = "hunter2"

            [backend]
            kind = "dry-run"
            "#,
        )
        .unwrap();

        assert_eq!(file.server.port, Some(5050));
        assert_eq!(file.server.password.as_deref(), Some("hunter2"));
        assert_eq!(file.server.host, None);
        assert_eq!(file.backend.kind.as_deref(), Some("dry-run"));
        assert_eq!(file.deck.dir, None);
    }

    #[test]
    fn unparsable_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.toml");
        std::fs::write(&path, "[server\nport = ").unwrap();

        let file = load_from(&path);
        assert_eq!(file.server.port, None);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let file = load_from(&dir.path().join("absent.toml"));
        assert!(file.backend.kind.is_none());
    }
}
