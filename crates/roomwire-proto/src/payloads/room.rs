//! Room-scoped payload types.
//!
//! Join/leave handshakes, statements, and topic changes.

use serde::{Deserialize, Serialize};

use crate::event::RoomEvent;

/// Room metadata as the server reports it.
///
/// `topic` is the raw server-side value and may be empty. Substituting a
/// placeholder for an empty topic is a presentation concern, not a protocol
/// one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomInfo {
    /// Unique room name (the key for the room's event channel).
    pub slug: String,
    /// Current topic, possibly the empty string.
    #[serde(default)]
    pub topic: String,
}

/// Join request (`join`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinRoom {
    /// Room to subscribe to. Created server-side if it does not exist.
    pub room: String,
}

/// Join acknowledgement (`room_joined`)
///
/// Resolves one join request. `backlog` is the room's recent history,
/// oldest first; it is replayed to the room listener exactly once and not
/// retained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomJoined {
    /// The room that was joined.
    pub room: RoomInfo,
    /// Recent events, oldest first.
    #[serde(default)]
    pub backlog: Vec<RoomEvent>,
    /// Human-readable confirmation text.
    #[serde(default)]
    pub reason: String,
}

/// Statement send (`statement`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    /// Room to post into.
    pub room: String,
    /// Statement text. Callers supply validated non-empty strings.
    pub message: String,
}

/// Topic change request (`topic`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetTopic {
    /// Room whose topic to change.
    pub room: String,
    /// The new topic.
    pub topic: String,
}

/// Topic change acknowledgement (`topic_changed`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicChanged {
    /// The room with its updated topic.
    pub room: RoomInfo,
    /// Human-readable confirmation text.
    #[serde(default)]
    pub reason: String,
}

/// Leave request (`leave`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRoom {
    /// Room to unsubscribe from.
    pub room: String,
}

/// Leave acknowledgement (`room_left`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomLeft {
    /// The room that was left.
    pub room: RoomInfo,
    /// Human-readable confirmation text.
    #[serde(default)]
    pub reason: String,
}
