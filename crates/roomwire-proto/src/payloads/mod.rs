//! Payload types for named wire events.
//!
//! One struct per event name; see [`crate::names`] for the name-to-payload
//! mapping. All payloads are CBOR-encoded on the wire.

mod room;
mod session;

pub use room::{JoinRoom, LeaveRoom, RoomInfo, RoomJoined, RoomLeft, SetTopic, Statement, TopicChanged};
pub use session::{Acknowledgement, ErrorReply, Nick};
