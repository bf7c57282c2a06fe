//! Error types for the macro deck

use thiserror::Error;

use crate::action::Opcode;

/// Result type alias for macro deck operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the macro deck
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Action arguments do not match the opcode's shape
    #[error("invalid arguments for {opcode}: {reason}")]
    Validation {
        /// Opcode whose shape was violated
        opcode: Opcode,
        /// What was wrong with the argument list
        reason: String,
    },

    /// Action name did not match any known opcode when the macro was loaded
    #[error("unknown action: {0}")]
    UnknownOpcode(String),

    /// Requested macro is not in the registry
    #[error("invalid macro: {0}")]
    MacroNotFound(String),

    /// Authentication failed
    #[error("auth error: {0}")]
    Auth(String),

    /// Input, window or mixer backend failed
    #[error("backend error: {0}")]
    Backend(String),

    /// Deck (layout or macro file) could not be loaded
    #[error("load error: {0}")]
    Load(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Build a validation error for `opcode`
    pub fn validation(opcode: Opcode, reason: impl Into<String>) -> Self {
        Self::Validation {
            opcode,
            reason: reason.into(),
        }
    }

    /// Whether this error came from argument validation
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}
