//! Client events and actions.
//!
//! Events flow in, actions flow out. The caller owns all I/O: it feeds
//! transport lifecycle and decoded server events alongside user intents,
//! and executes whatever actions come back.

use roomwire_proto::{ClientEmit, RoomEvent, ServerEvent};

use crate::router::Room;

/// Events fed into the client state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    /// User intent: open a session under this identity.
    ///
    /// Idempotent: a second connect while connecting or connected is a
    /// silent no-op (the transport owns reconnection).
    Connect {
        /// Identity to announce once the transport is up.
        nick: String,
    },

    /// The transport reported connected.
    TransportUp,

    /// The transport closed. Destroys the session and all room state.
    TransportDown {
        /// Transport-supplied reason, for logging only.
        reason: String,
    },

    /// User intent: subscribe to a room.
    Join {
        /// Room name to join.
        room: String,
    },

    /// User intent: post a statement. Gated on the statement ack.
    SendStatement {
        /// Target room.
        room: String,
        /// Validated non-empty statement text.
        message: String,
    },

    /// User intent: change a room's topic. Not gated.
    SetTopic {
        /// Target room.
        room: String,
        /// The new topic.
        topic: String,
    },

    /// User intent: unsubscribe from a room.
    Leave {
        /// Room name to leave.
        room: String,
    },

    /// A decoded server event from the transport.
    Server(ServerEvent),
}

/// Actions produced by the client for the caller to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientAction {
    /// Emit a named event to the server.
    Emit(ClientEmit),

    /// A room finished its join handshake and should become the active
    /// room. Always delivered before any event for that room.
    RoomReady {
        /// The materialized room, topic exactly as the server sent it.
        room: Room,
    },

    /// Deliver a room event to the presentation layer, unmodified, in
    /// receipt order (backlog strictly before live).
    DeliverEvent {
        /// Room the event was routed to.
        room: String,
        /// The event.
        event: RoomEvent,
    },

    /// The statement send gate changed. `busy: true` means block further
    /// sends; `busy: false` means the pending send completed.
    SendGateChanged {
        /// Whether a send is now outstanding.
        busy: bool,
    },

    /// A server-reported error, passed through uninterpreted.
    SurfaceError {
        /// The server-supplied reason.
        reason: String,
    },

    /// A protocol-level notice for the log.
    Log {
        /// The notice text.
        message: String,
    },
}
