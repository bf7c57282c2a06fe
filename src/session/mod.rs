//! Per-connection session state

use std::collections::HashMap;
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Authentication state of a session
///
/// The only transition is `Unauthenticated -> Authenticated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthState {
    Unauthenticated,
    Authenticated,
}

impl fmt::Display for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthenticated => write!(f, "unauthenticated"),
            Self::Authenticated => write!(f, "authenticated"),
        }
    }
}

/// State of one client connection
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    remote_addr: SocketAddr,
    auth: AuthState,
    connected_at: DateTime<Utc>,
    closed: bool,
}

impl Session {
    /// Start a session for a client at `remote_addr`
    #[must_use]
    pub fn new(remote_addr: SocketAddr, auth: AuthState) -> Self {
        Self {
            id: Uuid::new_v4(),
            remote_addr,
            auth,
            connected_at: Utc::now(),
            closed: false,
        }
    }

    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub const fn remote_addr(&self) -> SocketAddr {
        self.remote_addr
    }

    #[must_use]
    pub const fn auth_state(&self) -> AuthState {
        self.auth
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.auth == AuthState::Authenticated
    }

    #[must_use]
    pub const fn connected_at(&self) -> DateTime<Utc> {
        self.connected_at
    }

    /// Whether the session was terminated and must not handle more frames
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    pub(crate) const fn authenticate(&mut self) {
        self.auth = AuthState::Authenticated;
    }

    pub(crate) const fn close(&mut self) {
        self.closed = true;
    }
}

/// Snapshot of an open session kept in the [`SessionTable`]
#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub id: Uuid,
    pub remote_addr: SocketAddr,
    pub auth: AuthState,
    pub connected_at: DateTime<Utc>,
}

impl From<&Session> for SessionInfo {
    fn from(session: &Session) -> Self {
        Self {
            id: session.id,
            remote_addr: session.remote_addr,
            auth: session.auth,
            connected_at: session.connected_at,
        }
    }
}

/// Open sessions shared between connection tasks
#[derive(Debug, Clone, Default)]
pub struct SessionTable {
    inner: Arc<RwLock<HashMap<Uuid, SessionInfo>>>,
}

impl SessionTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a newly opened session
    pub async fn insert(&self, session: &Session) {
        self.inner
            .write()
            .await
            .insert(session.id(), SessionInfo::from(session));
    }

    /// Mirror a successful authentication
    pub async fn mark_authenticated(&self, id: Uuid) {
        if let Some(info) = self.inner.write().await.get_mut(&id) {
            info.auth = AuthState::Authenticated;
        }
    }

    /// Forget a closed session
    pub async fn remove(&self, id: Uuid) -> Option<SessionInfo> {
        self.inner.write().await.remove(&id)
    }

    pub async fn get(&self, id: Uuid) -> Option<SessionInfo> {
        self.inner.read().await.get(&id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}
