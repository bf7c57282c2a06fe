//! Macrodeck - remote macro deck
//!
//! A phone or browser connects over a WebSocket, optionally authenticates
//! with a shared password, and triggers named macros: ordered lists of
//! keyboard, window, media and volume actions executed on this machine.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                 Transport (server)                   │
//! │      /ws  │  /health  │  static web UI              │
//! └────────────────────┬────────────────────────────────┘
//!                      │ text frames
//! ┌────────────────────▼────────────────────────────────┐
//! │   Dispatcher  │  Session  │  MacroRegistry          │
//! └────────────────────┬────────────────────────────────┘
//!                      │ Macro::run -> Action::execute
//! ┌────────────────────▼────────────────────────────────┐
//! │                Backend (trait)                       │
//! │   SystemBackend (xdotool, amixer, ...) │ DryRun     │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod action;
pub mod backend;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod loader;
pub mod macros;
pub mod server;
pub mod session;

pub use action::{Action, Arg, ArgKind, Opcode, Shape};
pub use backend::{Backend, BackendKind, Device, DryRunBackend, MediaCommand, SystemBackend};
pub use config::{Config, ConfigOverrides};
pub use dispatch::{Command, Dispatch, Dispatcher, Outgoing};
pub use error::{Error, Result};
pub use loader::{Deck, load_deck};
pub use macros::{Macro, MacroRegistry, RunReport};
pub use server::DeckServer;
pub use session::{AuthState, Session, SessionTable};
