//! Room event model.
//!
//! An event is an immutable record of something that happened in a room.
//! Events are totally ordered per room by arrival order from the server;
//! the client never reorders them.

use serde::{Deserialize, Serialize};

/// Discriminator for the shape of a room event.
///
/// The set is open-ended: kinds this client does not know about are carried
/// through untouched as [`EventKind::Other`] so the router can stay a pure
/// pass-through.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventKind {
    /// A user said something (`user` + `message`).
    Statement,
    /// The room topic was changed (`topic` carries the new value).
    TopicSet,
    /// A user joined the room.
    UserJoined,
    /// A user left the room.
    UserLeft,
    /// A kind this client does not interpret.
    Other(String),
}

impl From<String> for EventKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "statement" => Self::Statement,
            "topic_set" => Self::TopicSet,
            "user_joined" => Self::UserJoined,
            "user_left" => Self::UserLeft,
            _ => Self::Other(s),
        }
    }
}

impl From<EventKind> for String {
    fn from(kind: EventKind) -> Self {
        match kind {
            EventKind::Statement => "statement".to_owned(),
            EventKind::TopicSet => "topic_set".to_owned(),
            EventKind::UserJoined => "user_joined".to_owned(),
            EventKind::UserLeft => "user_left".to_owned(),
            EventKind::Other(s) => s,
        }
    }
}

/// A single event in a room.
///
/// The payload shape is kind-specific: `message` carries the statement text
/// for [`EventKind::Statement`] and a human-readable notice for the others;
/// `topic` is populated only on [`EventKind::TopicSet`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomEvent {
    /// Room the event belongs to.
    pub room: String,
    /// What happened.
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// User the event originates from.
    pub user: String,
    /// Statement text or human-readable notice.
    pub message: String,
    /// Server-formatted wall-clock timestamp. Opaque to the client;
    /// ordering comes from arrival order, not from this field.
    pub timestamp: String,
    /// New topic, present only on topic changes.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub topic: Option<String>,
}

impl RoomEvent {
    /// Shorthand for constructing a statement event.
    pub fn statement(room: &str, user: &str, message: &str, timestamp: &str) -> Self {
        Self {
            room: room.to_owned(),
            kind: EventKind::Statement,
            user: user.to_owned(),
            message: message.to_owned(),
            timestamp: timestamp.to_owned(),
            topic: None,
        }
    }
}
