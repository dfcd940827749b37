//! Wire vocabulary for the roomwire chat protocol.
//!
//! The server speaks named events over a persistent bidirectional channel.
//! This crate defines the event names, their payload types, and the framing
//! used to move them over a byte transport.
//!
//! # Room event channels
//!
//! Live room traffic arrives on channels named `"{room}_event"`. Rather than
//! registering a raw listener per room, [`ServerEvent::from_frame`] parses
//! the channel name at a single subscription point and yields the tagged
//! variant [`ServerEvent::RoomEvent`] keyed by room name. Consumers dispatch
//! on that key internally.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod event;
pub mod payloads;
mod wire;

pub use event::{EventKind, RoomEvent};
pub use payloads::{
    Acknowledgement, ErrorReply, JoinRoom, LeaveRoom, Nick, RoomInfo, RoomJoined, RoomLeft,
    SetTopic, Statement, TopicChanged,
};
pub use wire::{ClientEmit, ServerEvent, WireError, WireFrame, names, parse_room_channel, room_channel};
