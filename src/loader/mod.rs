//! Deck loading
//!
//! A deck directory contains:
//! - `config.json`: one layout object or an array of them; each layout's
//!   `buttons[].macro` names a macro
//! - `macros/<name>.json`: the steps of one macro
//!
//! A broken or missing macro file only skips that macro. A missing or
//! unparsable `config.json` fails the whole load.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::macros::{Macro, MacroRegistry};
use crate::{Error, Result};

/// Layout file name inside the deck directory
pub const CONFIG_FILE: &str = "config.json";

/// Macro directory name inside the deck directory
pub const MACROS_DIR: &str = "macros";

/// Result of loading a deck
#[derive(Debug)]
pub struct Deck {
    pub registry: MacroRegistry,
    /// Compact JSON of `config.json`, sent verbatim on `get-config`
    pub config_blob: String,
    /// Referenced macros that could not be loaded
    pub skipped: Vec<String>,
}

/// Load the layout and every macro it references from `deck_dir`
///
/// # Errors
///
/// Returns [`Error::Load`] if `config.json` is missing or not valid JSON
pub fn load_deck(deck_dir: &Path) -> Result<Deck> {
    let config_path = deck_dir.join(CONFIG_FILE);
    let text = std::fs::read_to_string(&config_path).map_err(|e| {
        Error::Load(format!("cannot read {}: {e}", config_path.display()))
    })?;
    let layout: Value = serde_json::from_str(&text).map_err(|e| {
        Error::Load(format!("cannot parse {}: {e}", config_path.display()))
    })?;
    tracing::info!(path = %config_path.display(), "loaded deck layout");

    let config_blob = serde_json::to_string(&layout)?;

    let mut registry = MacroRegistry::new();
    let mut skipped = Vec::new();

    for name in referenced_macros(&layout) {
        match load_macro(deck_dir, &name) {
            Ok(r#macro) => {
                tracing::info!(macro_name = %name, steps = r#macro.len(), "loaded macro");
                registry.insert(name, r#macro);
            }
            Err(e) => {
                tracing::warn!(macro_name = %name, error = %e, "failed to load macro, skipping");
                skipped.push(name);
            }
        }
    }

    Ok(Deck {
        registry,
        config_blob,
        skipped,
    })
}

/// Macro names referenced by `buttons[].macro`, deduplicated
///
/// `layout` may be a single layout object or an array of layouts.
#[must_use]
pub fn referenced_macros(layout: &Value) -> BTreeSet<String> {
    let layouts: Vec<&Value> = match layout {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };

    let mut names = BTreeSet::new();
    for layout in layouts {
        let Some(buttons) = layout.get("buttons").and_then(Value::as_array) else {
            continue;
        };
        for button in buttons {
            if !button.is_object() {
                tracing::warn!(button = %button, "invalid button format, skipping");
                continue;
            }
            if let Some(name) = button.get("macro").and_then(Value::as_str) {
                names.insert(name.to_string());
            }
        }
    }
    names
}

/// Path of the file holding macro `name`
///
/// # Errors
///
/// Returns [`Error::Load`] if `name` is empty or could escape the macro
/// directory
pub fn macro_path(deck_dir: &Path, name: &str) -> Result<PathBuf> {
    if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
        return Err(Error::Load(format!("invalid macro name: {name:?}")));
    }
    Ok(deck_dir.join(MACROS_DIR).join(format!("{name}.json")))
}

/// Load one macro file
///
/// # Errors
///
/// Returns an error if the name is rejected, the file cannot be read, or it
/// is not a JSON array of steps
pub fn load_macro(deck_dir: &Path, name: &str) -> Result<Macro> {
    let path = macro_path(deck_dir, name)?;
    let text = std::fs::read_to_string(&path)
        .map_err(|e| Error::Load(format!("cannot read {}: {e}", path.display())))?;
    let r#macro: Macro = serde_json::from_str(&text)?;
    Ok(r#macro)
}
