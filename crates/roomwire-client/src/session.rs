//! Session lifecycle and identity.
//!
//! One session per connected user. Identity is an explicit value owned here
//! and injected where needed; there is no process-wide singleton. The
//! session is created by a connect request and destroyed when the transport
//! closes.

/// Connection lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No transport. The initial state, and the state after transport close.
    Disconnected,
    /// Connect requested; waiting for the transport to report connected.
    Connecting,
    /// Transport is up and identity has been announced.
    Connected,
}

/// Session state: identity plus connection lifecycle.
///
/// Identity is set once per session at connect time and immutable for the
/// session's lifetime. A new session after a transport close may carry a
/// new identity.
#[derive(Debug, Clone)]
pub struct Session {
    identity: Option<String>,
    state: ConnectionState,
}

impl Session {
    /// Create a disconnected session with no identity.
    pub fn new() -> Self {
        Self { identity: None, state: ConnectionState::Disconnected }
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// The identity announced (or to be announced) on this session.
    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    /// Begin connecting with the given identity.
    ///
    /// Returns `false` without touching state if a connect is already in
    /// flight or established; retry and backoff belong to the transport,
    /// so a second connect request is a silent no-op.
    pub fn begin_connect(&mut self, nick: &str) -> bool {
        if self.state != ConnectionState::Disconnected {
            return false;
        }

        self.identity = Some(nick.to_owned());
        self.state = ConnectionState::Connecting;
        true
    }

    /// The transport reported connected.
    ///
    /// Returns the identity to announce, or `None` if no connect was in
    /// flight (a driver bug, left to the caller to surface).
    pub fn transport_up(&mut self) -> Option<&str> {
        if self.state != ConnectionState::Connecting {
            return None;
        }

        self.state = ConnectionState::Connected;
        self.identity.as_deref()
    }

    /// The transport closed. The session is over.
    pub fn transport_down(&mut self) {
        self.state = ConnectionState::Disconnected;
        self.identity = None;
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
