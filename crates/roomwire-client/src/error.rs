//! Client error types.

use thiserror::Error;

use crate::gate::ActionKind;

/// Errors from client operations.
///
/// Every variant except [`ClientError::InvalidState`] is a synchronous,
/// recoverable rejection: the machine did not transition and the caller may
/// retry later. Transport errors never appear here; the server's `error`
/// events are surfaced as actions, not returned as errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The operation needs an established session.
    #[error("not connected")]
    NotConnected,

    /// Room is not subscribed.
    #[error("room not subscribed: {room}")]
    RoomNotFound {
        /// The room name that was not found.
        room: String,
    },

    /// Room is already subscribed; join is idempotent.
    #[error("already subscribed to room: {room}")]
    RoomAlreadySubscribed {
        /// The room name that is already live.
        room: String,
    },

    /// A join for this room is already in flight.
    ///
    /// Duplicate in-flight joins of the same room are rejected rather than
    /// coalesced; each join request must resolve exactly once.
    #[error("join already pending for room: {room}")]
    JoinPending {
        /// The room name with an unresolved join.
        room: String,
    },

    /// An action of this kind is already awaiting its acknowledgement.
    #[error("busy: a {kind} is already outstanding")]
    Busy {
        /// The gated action kind.
        kind: ActionKind,
    },

    /// The machine received an event that contradicts its state.
    #[error("invalid state: {reason}")]
    InvalidState {
        /// Description of the contradiction.
        reason: String,
    },
}

impl ClientError {
    /// Returns true if this error is fatal (unrecoverable).
    ///
    /// Fatal errors indicate a driver bug or protocol violation. Everything
    /// else is a rejection the caller recovers from by retrying later or
    /// surfacing "please wait" to the user.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::InvalidState { .. } => true,

            Self::NotConnected
            | Self::RoomNotFound { .. }
            | Self::RoomAlreadySubscribed { .. }
            | Self::JoinPending { .. }
            | Self::Busy { .. } => false,
        }
    }
}
