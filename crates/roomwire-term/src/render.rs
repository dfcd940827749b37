//! Presentation formatting.
//!
//! Raw protocol state stays untouched in the core; every display
//! substitution (like the empty-topic placeholder) lives here.

use roomwire_client::{ClientError, Room};
use roomwire_proto::{EventKind, RoomEvent};

/// Placeholder shown for a room whose topic is the empty string.
pub const NO_TOPIC: &str = "(No topic set.)";

/// Display form of a topic string.
pub fn topic_display(topic: &str) -> &str {
    if topic.is_empty() { NO_TOPIC } else { topic }
}

/// Header line printed when a room becomes ready.
pub fn room_header(room: &Room) -> String {
    format!("--- joined {} --- topic: {}", room.name, topic_display(&room.topic))
}

/// One line for a delivered room event.
///
/// Statements read as speech; everything else (joins, leaves, topic
/// changes, kinds this client predates) carries a server-composed message
/// and is shown as an announcement.
pub fn event_line(event: &RoomEvent) -> String {
    match event.kind {
        EventKind::Statement => {
            format!("[{}] [{}] <{}> {}", event.timestamp, event.room, event.user, event.message)
        },
        _ => format!("[{}] [{}] * {}", event.timestamp, event.room, event.message),
    }
}

/// Line for a server-reported error.
pub fn error_line(reason: &str) -> String {
    format!("!! {reason}")
}

/// Line for a synchronous rejection the user can act on.
pub fn rejection_line(err: &ClientError) -> String {
    match err {
        ClientError::Busy { .. } => {
            "-- please wait: the previous message has not been acknowledged yet".to_owned()
        },
        other => format!("-- {other}"),
    }
}
