//! Per-room event routing.
//!
//! The router holds the set of live rooms, keyed by room name. Events
//! arrive already tagged with their room (the wire layer resolved the
//! channel name); routing is a map lookup, no filtering, no buffering, no
//! reordering. A room exists here only after its join handshake resolved,
//! so the router can never see a half-joined room.

use std::collections::HashMap;

use roomwire_proto::{EventKind, RoomEvent};

/// A live room subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    /// Unique room name.
    pub name: String,
    /// Current topic, exactly as the server supplied it (possibly empty).
    pub topic: String,
    /// Whether the room's listener is installed.
    pub subscribed: bool,
}

impl Room {
    /// Create a subscribed room from join-handshake metadata.
    pub fn new(name: &str, topic: &str) -> Self {
        Self { name: name.to_owned(), topic: topic.to_owned(), subscribed: true }
    }
}

/// Dispatches tagged room events to the room they belong to.
#[derive(Debug, Clone, Default)]
pub struct RoomRouter {
    rooms: HashMap<String, Room>,
}

impl RoomRouter {
    /// Create an empty router.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a room has a listener installed.
    pub fn is_subscribed(&self, name: &str) -> bool {
        self.rooms.contains_key(name)
    }

    /// Look up a room by name.
    pub fn room(&self, name: &str) -> Option<&Room> {
        self.rooms.get(name)
    }

    /// Number of live rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Install the listener for a room.
    ///
    /// Must happen before backlog replay begins so no live event can race
    /// past the listener.
    pub fn subscribe(&mut self, room: Room) {
        self.rooms.insert(room.name.clone(), room);
    }

    /// Remove a room's listener.
    ///
    /// Safe on a room with no listener (returns `false`, changes nothing);
    /// rooms may be abandoned without a leave handshake.
    pub fn unsubscribe(&mut self, name: &str) -> bool {
        self.rooms.remove(name).is_some()
    }

    /// Route one event to its room.
    ///
    /// Returns `true` if the room is subscribed and the event should be
    /// delivered. Topic changes refresh the room's stored topic; the event
    /// itself still passes through untouched.
    pub fn route(&mut self, room: &str, event: &RoomEvent) -> bool {
        let Some(state) = self.rooms.get_mut(room) else {
            return false;
        };

        if event.kind == EventKind::TopicSet {
            if let Some(topic) = &event.topic {
                state.topic.clone_from(topic);
            }
        }

        true
    }

    /// Update a room's topic from a topic-change acknowledgement.
    ///
    /// No-op for rooms without a listener.
    pub fn refresh_topic(&mut self, name: &str, topic: &str) {
        if let Some(room) = self.rooms.get_mut(name) {
            room.topic = topic.to_owned();
        }
    }

    /// Drop all rooms. Used on session teardown.
    pub fn clear(&mut self) {
        self.rooms.clear();
    }
}
