//! Named-event framing.
//!
//! Every message on the transport is a [`WireFrame`]: an event name plus a
//! CBOR payload. [`ClientEmit`] and [`ServerEvent`] give the two directions
//! typed shapes; the dynamic `"{room}_event"` channels collapse into the
//! single tagged [`ServerEvent::RoomEvent`] variant here, so no consumer
//! ever registers a listener per room.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    event::RoomEvent,
    payloads::{
        Acknowledgement, ErrorReply, JoinRoom, LeaveRoom, Nick, RoomJoined, RoomLeft, SetTopic,
        Statement, TopicChanged,
    },
};

/// Wire event names.
///
/// These strings are the contract with the server; renaming one is a
/// protocol break.
pub mod names {
    /// Identity announcement (out).
    pub const NICK: &str = "nick";
    /// Identity acknowledgement (in).
    pub const NICK_SET: &str = "nick_set";
    /// Join request (out).
    pub const JOIN: &str = "join";
    /// Join acknowledgement (in).
    pub const ROOM_JOINED: &str = "room_joined";
    /// Statement send (out).
    pub const STATEMENT: &str = "statement";
    /// Statement acknowledgement (in).
    pub const STATEMENT_OK: &str = "statement_ok";
    /// Topic change request (out).
    pub const TOPIC: &str = "topic";
    /// Topic change acknowledgement (in).
    pub const TOPIC_CHANGED: &str = "topic_changed";
    /// Leave request (out).
    pub const LEAVE: &str = "leave";
    /// Leave acknowledgement (in).
    pub const ROOM_LEFT: &str = "room_left";
    /// Server-reported error (in).
    pub const ERROR: &str = "error";

    /// Suffix of per-room live event channels.
    pub const ROOM_CHANNEL_SUFFIX: &str = "_event";
}

/// Derive the live event channel name for a room.
///
/// Stable and reversible; [`parse_room_channel`] is the inverse.
pub fn room_channel(room: &str) -> String {
    format!("{room}{}", names::ROOM_CHANNEL_SUFFIX)
}

/// Recover the room name from a live event channel name.
///
/// Returns `None` for names that are not room channels.
pub fn parse_room_channel(name: &str) -> Option<&str> {
    name.strip_suffix(names::ROOM_CHANNEL_SUFFIX).filter(|room| !room.is_empty())
}

/// Errors from framing and event dispatch.
#[derive(Debug, Error)]
pub enum WireError {
    /// CBOR encoding failed.
    #[error("encode failed: {reason}")]
    Encode {
        /// Description of the encoder failure.
        reason: String,
    },

    /// CBOR decoding failed.
    #[error("decode failed: {reason}")]
    Decode {
        /// Description of the decoder failure.
        reason: String,
    },

    /// Event name is not part of the vocabulary.
    #[error("unknown event: {name}")]
    UnknownEvent {
        /// The unrecognized event name.
        name: String,
    },

    /// Payload did not match the shape the event name requires.
    #[error("malformed payload for {name}: {reason}")]
    Payload {
        /// Event name the payload arrived under.
        name: String,
        /// Description of the shape mismatch.
        reason: String,
    },
}

/// One message on the transport: an event name plus its CBOR payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireFrame {
    /// Event name.
    pub name: String,
    /// Payload as a CBOR value.
    pub payload: ciborium::Value,
}

impl WireFrame {
    /// Build a frame from an event name and a serializable payload.
    pub fn new<T: Serialize>(name: &str, payload: &T) -> Result<Self, WireError> {
        let payload = ciborium::Value::serialized(payload)
            .map_err(|e| WireError::Encode { reason: e.to_string() })?;
        Ok(Self { name: name.to_owned(), payload })
    }

    /// Encode the frame as CBOR into `buf`.
    pub fn encode(&self, buf: &mut Vec<u8>) -> Result<(), WireError> {
        ciborium::ser::into_writer(self, buf)
            .map_err(|e| WireError::Encode { reason: e.to_string() })
    }

    /// Decode a frame from CBOR bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, WireError> {
        ciborium::de::from_reader(bytes).map_err(|e| WireError::Decode { reason: e.to_string() })
    }

    fn payload_as<T: for<'de> Deserialize<'de>>(&self) -> Result<T, WireError> {
        self.payload
            .clone()
            .deserialized()
            .map_err(|e| WireError::Payload { name: self.name.clone(), reason: e.to_string() })
    }
}

/// Events the client emits to the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEmit {
    /// Announce identity after connect.
    Nick(Nick),
    /// Request to subscribe to a room.
    Join(JoinRoom),
    /// Post a statement.
    Statement(Statement),
    /// Change a room topic.
    Topic(SetTopic),
    /// Unsubscribe from a room.
    Leave(LeaveRoom),
}

impl ClientEmit {
    /// The wire event name for this emission.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Nick(_) => names::NICK,
            Self::Join(_) => names::JOIN,
            Self::Statement(_) => names::STATEMENT,
            Self::Topic(_) => names::TOPIC,
            Self::Leave(_) => names::LEAVE,
        }
    }

    /// Convert to a wire frame.
    pub fn to_frame(&self) -> Result<WireFrame, WireError> {
        match self {
            Self::Nick(p) => WireFrame::new(names::NICK, p),
            Self::Join(p) => WireFrame::new(names::JOIN, p),
            Self::Statement(p) => WireFrame::new(names::STATEMENT, p),
            Self::Topic(p) => WireFrame::new(names::TOPIC, p),
            Self::Leave(p) => WireFrame::new(names::LEAVE, p),
        }
    }
}

/// Events the server delivers to the client.
///
/// The single subscription point: per-room channels are already resolved
/// into [`ServerEvent::RoomEvent`], tagged with the room the channel name
/// encodes.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    /// Identity acknowledgement.
    NickSet(Acknowledgement),
    /// Join acknowledgement with room metadata and backlog.
    RoomJoined(RoomJoined),
    /// Live event on a room channel.
    RoomEvent {
        /// Room name recovered from the channel name.
        room: String,
        /// The event, untouched.
        event: RoomEvent,
    },
    /// Statement acknowledgement (pure completion signal).
    StatementOk(Acknowledgement),
    /// Topic change acknowledgement.
    TopicChanged(TopicChanged),
    /// Leave acknowledgement.
    RoomLeft(RoomLeft),
    /// Server-reported error, surfaced but never interpreted.
    Error(ErrorReply),
}

impl ServerEvent {
    /// Resolve a received frame into a typed server event.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::UnknownEvent`] for names outside the vocabulary
    /// and [`WireError::Payload`] when the payload does not match the shape
    /// the name requires.
    pub fn from_frame(frame: &WireFrame) -> Result<Self, WireError> {
        match frame.name.as_str() {
            names::NICK_SET => Ok(Self::NickSet(frame.payload_as()?)),
            names::ROOM_JOINED => Ok(Self::RoomJoined(frame.payload_as()?)),
            names::STATEMENT_OK => Ok(Self::StatementOk(frame.payload_as()?)),
            names::TOPIC_CHANGED => Ok(Self::TopicChanged(frame.payload_as()?)),
            names::ROOM_LEFT => Ok(Self::RoomLeft(frame.payload_as()?)),
            names::ERROR => Ok(Self::Error(frame.payload_as()?)),
            name => match parse_room_channel(name) {
                Some(room) => {
                    Ok(Self::RoomEvent { room: room.to_owned(), event: frame.payload_as()? })
                },
                None => Err(WireError::UnknownEvent { name: name.to_owned() }),
            },
        }
    }
}
