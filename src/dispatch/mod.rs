//! Text-frame protocol: authentication and command routing
//!
//! Client to server:
//! - `auth:<secret>` (only while unauthenticated)
//! - `get-config`
//! - `run-macro:<name>`
//!
//! Server to client:
//! - `auth-required` / `auth-not-required` on open
//! - `auth-success` / `auth-fail` (the latter followed by a close)
//! - `config:<json>`
//!
//! `run-macro` has no reply. Lookup and step failures are logged only.

use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};

use crate::backend::Backend;
use crate::macros::MacroRegistry;
use crate::session::{AuthState, Session, SessionTable};
use crate::Error;

/// A parsed client frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    Auth(&'a str),
    GetConfig,
    RunMacro(&'a str),
    /// Anything else; never acted on
    Unknown,
}

impl<'a> Command<'a> {
    /// Parse a text frame
    #[must_use]
    pub fn parse(text: &'a str) -> Self {
        if let Some(secret) = text.strip_prefix("auth:") {
            Self::Auth(secret)
        } else if let Some(name) = text.strip_prefix("run-macro:")
            && !name.is_empty()
        {
            Self::RunMacro(name)
        } else if text == "get-config" {
            Self::GetConfig
        } else {
            Self::Unknown
        }
    }
}

/// A server frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outgoing {
    AuthRequired,
    AuthNotRequired,
    AuthSuccess,
    AuthFail,
    /// Deck layout, already serialized
    Config(Arc<str>),
}

impl fmt::Display for Outgoing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AuthRequired => write!(f, "auth-required"),
            Self::AuthNotRequired => write!(f, "auth-not-required"),
            Self::AuthSuccess => write!(f, "auth-success"),
            Self::AuthFail => write!(f, "auth-fail"),
            Self::Config(blob) => write!(f, "config:{blob}"),
        }
    }
}

/// What the transport should do after a frame was handled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Send nothing
    Ignore,
    /// Send a frame and keep the connection
    Reply(Outgoing),
    /// Send a frame, then close the connection
    ReplyAndClose(Outgoing),
}

/// Routes client frames for every connection
///
/// Holds the read-only registry and the shared backend. Session state lives
/// with each connection and is passed in by the transport.
pub struct Dispatcher {
    registry: Arc<MacroRegistry>,
    backend: Arc<dyn Backend>,
    password: Option<SecretString>,
    config_blob: Arc<str>,
    sessions: SessionTable,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("macros", &self.registry.len())
            .field("auth_required", &self.auth_required())
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Create a dispatcher
    ///
    /// An empty `password` counts as no password.
    pub fn new(
        registry: Arc<MacroRegistry>,
        backend: Arc<dyn Backend>,
        password: Option<SecretString>,
        config_blob: impl Into<Arc<str>>,
    ) -> Self {
        let password = password.filter(|p| !p.expose_secret().is_empty());
        Self {
            registry,
            backend,
            password,
            config_blob: config_blob.into(),
            sessions: SessionTable::new(),
        }
    }

    #[must_use]
    pub const fn auth_required(&self) -> bool {
        self.password.is_some()
    }

    #[must_use]
    pub fn registry(&self) -> &MacroRegistry {
        &self.registry
    }

    #[must_use]
    pub const fn sessions(&self) -> &SessionTable {
        &self.sessions
    }

    /// Start a session and return the greeting frame
    pub async fn on_open(&self, remote_addr: SocketAddr) -> (Session, Outgoing) {
        let (state, greeting) = if self.auth_required() {
            (AuthState::Unauthenticated, Outgoing::AuthRequired)
        } else {
            (AuthState::Authenticated, Outgoing::AuthNotRequired)
        };

        let session = Session::new(remote_addr, state);
        self.sessions.insert(&session).await;

        tracing::info!(
            session_id = %session.id(),
            remote = %remote_addr,
            auth = %state,
            "connection opened"
        );

        (session, greeting)
    }

    /// Handle one text frame
    ///
    /// `run-macro` runs the whole macro before returning.
    pub async fn on_message(&self, session: &mut Session, text: &str) -> Dispatch {
        if session.is_closed() {
            return Dispatch::Ignore;
        }

        let command = Command::parse(text);

        if !session.is_authenticated() {
            return match command {
                Command::Auth(secret) => self.authenticate(session, secret).await,
                _ => {
                    tracing::debug!(session_id = %session.id(), "ignoring frame before auth");
                    Dispatch::Ignore
                }
            };
        }

        match command {
            Command::GetConfig => {
                tracing::debug!(session_id = %session.id(), "sending config");
                Dispatch::Reply(Outgoing::Config(Arc::clone(&self.config_blob)))
            }
            Command::RunMacro(name) => {
                self.run_macro(session, name).await;
                Dispatch::Ignore
            }
            Command::Auth(_) | Command::Unknown => {
                tracing::debug!(session_id = %session.id(), frame = %text, "ignoring frame");
                Dispatch::Ignore
            }
        }
    }

    /// Discard a session
    pub async fn on_close(&self, session: &Session) {
        self.sessions.remove(session.id()).await;
        tracing::info!(
            session_id = %session.id(),
            remote = %session.remote_addr(),
            "connection closed"
        );
    }

    async fn authenticate(&self, session: &mut Session, secret: &str) -> Dispatch {
        let matches = self
            .password
            .as_ref()
            .is_some_and(|p| {
                constant_time_eq(p.expose_secret().as_bytes(), secret.as_bytes())
            });

        if matches {
            session.authenticate();
            self.sessions.mark_authenticated(session.id()).await;
            tracing::info!(session_id = %session.id(), remote = %session.remote_addr(), "authenticated");
            Dispatch::Reply(Outgoing::AuthSuccess)
        } else {
            session.close();
            let error = Error::Auth("wrong password".to_string());
            tracing::warn!(session_id = %session.id(), remote = %session.remote_addr(), %error, "closing connection");
            Dispatch::ReplyAndClose(Outgoing::AuthFail)
        }
    }

    async fn run_macro(&self, session: &Session, name: &str) {
        let Some(r#macro) = self.registry.lookup(name) else {
            let error = Error::MacroNotFound(name.to_string());
            tracing::warn!(session_id = %session.id(), %error, "run-macro failed");
            return;
        };

        tracing::info!(session_id = %session.id(), macro_name = %name, steps = r#macro.len(), "running macro");
        let report = r#macro.run(self.backend.as_ref()).await;

        if report.is_clean() {
            tracing::info!(session_id = %session.id(), macro_name = %name, "macro finished");
        } else {
            tracing::warn!(
                session_id = %session.id(),
                macro_name = %name,
                failed = report.failures.len(),
                executed = report.executed,
                "macro finished with failures"
            );
        }
    }
}

/// Byte comparison whose running time does not depend on where the inputs differ
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b) {
        diff |= x ^ y;
    }
    diff == 0
}
