//! Scripted-session test harness.
//!
//! A [`Harness`] drives one [`Client`] with scripted server events and
//! keeps the full ordered action trace. Tests end with oracle functions
//! over the trace that verify global properties: rooms become ready before
//! any of their events, events never cross rooms, and at most one gated
//! send is ever in flight.

use roomwire_client::{Client, ClientAction, ClientEmit, ClientError, ClientEvent};
use roomwire_proto::{
    Acknowledgement, ErrorReply, RoomEvent, RoomInfo, RoomJoined, ServerEvent, TopicChanged,
};

/// A client plus the ordered trace of every action it produced.
pub struct Harness {
    /// The state machine under test.
    pub client: Client,
    trace: Vec<ClientAction>,
}

impl Harness {
    /// Fresh client with no connect requested.
    pub fn detached() -> Self {
        Self { client: Client::new(), trace: Vec::new() }
    }

    /// Fresh client, already connected as `nick`.
    ///
    /// # Panics
    ///
    /// Panics if the connect handshake is rejected, which no fresh client
    /// does.
    #[allow(clippy::unwrap_used)]
    pub fn connected(nick: &str) -> Self {
        let mut harness = Self { client: Client::new(), trace: Vec::new() };
        harness.feed(ClientEvent::Connect { nick: nick.to_owned() }).unwrap();
        harness.feed(ClientEvent::TransportUp).unwrap();
        harness
    }

    /// Feed one event, appending its actions to the trace.
    pub fn feed(&mut self, event: ClientEvent) -> Result<(), ClientError> {
        let actions = self.client.handle(event)?;
        self.trace.extend(actions);
        Ok(())
    }

    /// Run the full join handshake for `room`.
    ///
    /// # Panics
    ///
    /// Panics if either side of the handshake is rejected.
    #[allow(clippy::unwrap_used)]
    pub fn join(&mut self, room: &str, topic: &str, backlog: Vec<RoomEvent>) {
        self.feed(ClientEvent::Join { room: room.to_owned() }).unwrap();
        self.feed(room_joined(room, topic, backlog)).unwrap();
    }

    /// The ordered action trace so far.
    pub fn trace(&self) -> &[ClientAction] {
        &self.trace
    }

    /// Everything the client asked the transport to send, in order.
    pub fn emitted(&self) -> Vec<&ClientEmit> {
        self.trace
            .iter()
            .filter_map(|a| match a {
                ClientAction::Emit(emit) => Some(emit),
                _ => None,
            })
            .collect()
    }

    /// Events delivered for `room`, in delivery order.
    pub fn delivered(&self, room: &str) -> Vec<&RoomEvent> {
        self.trace
            .iter()
            .filter_map(|a| match a {
                ClientAction::DeliverEvent { room: r, event } if r == room => Some(event),
                _ => None,
            })
            .collect()
    }

    /// Errors surfaced to the user, in order.
    pub fn surfaced(&self) -> Vec<&str> {
        self.trace
            .iter()
            .filter_map(|a| match a {
                ClientAction::SurfaceError { reason } => Some(reason.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// Scripted `room_joined` acknowledgement.
pub fn room_joined(room: &str, topic: &str, backlog: Vec<RoomEvent>) -> ClientEvent {
    ClientEvent::Server(ServerEvent::RoomJoined(RoomJoined {
        room: RoomInfo { slug: room.to_owned(), topic: topic.to_owned() },
        backlog,
        reason: format!("You are now in {room}."),
    }))
}

/// Scripted live event on a room channel.
pub fn live_event(event: RoomEvent) -> ClientEvent {
    ClientEvent::Server(ServerEvent::RoomEvent { room: event.room.clone(), event })
}

/// Scripted `statement_ok` acknowledgement.
pub fn statement_ok() -> ClientEvent {
    ClientEvent::Server(ServerEvent::StatementOk(Acknowledgement { reason: String::new() }))
}

/// Scripted `topic_changed` acknowledgement.
pub fn topic_changed(room: &str, topic: &str) -> ClientEvent {
    ClientEvent::Server(ServerEvent::TopicChanged(TopicChanged {
        room: RoomInfo { slug: room.to_owned(), topic: topic.to_owned() },
        reason: format!("Topic of {room} changed."),
    }))
}

/// Scripted server-side error.
pub fn server_error(reason: &str) -> ClientEvent {
    ClientEvent::Server(ServerEvent::Error(ErrorReply { reason: reason.to_owned() }))
}

/// Oracle: every room's `RoomReady` precedes its first delivered event.
///
/// # Panics
///
/// Panics with the offending room name when the ordering is violated.
pub fn verify_ready_precedes_events(trace: &[ClientAction]) {
    let mut ready = std::collections::HashSet::new();
    for action in trace {
        match action {
            ClientAction::RoomReady { room } => {
                ready.insert(room.name.clone());
            },
            ClientAction::DeliverEvent { room, .. } => {
                assert!(ready.contains(room), "event for {room} delivered before RoomReady");
            },
            _ => {},
        }
    }
}

/// Oracle: delivered events carry the room they were delivered to.
///
/// # Panics
///
/// Panics when an event crossed rooms.
pub fn verify_room_isolation(trace: &[ClientAction]) {
    for action in trace {
        if let ClientAction::DeliverEvent { room, event } = action {
            assert_eq!(
                &event.room, room,
                "event from {} delivered to {room}",
                event.room
            );
        }
    }
}

/// Oracle: gated sends never overlap. A second statement may only be
/// emitted after the gate reported idle again.
///
/// # Panics
///
/// Panics when two statement emissions overlap.
pub fn verify_single_inflight_send(trace: &[ClientAction]) {
    let mut busy = false;
    for action in trace {
        match action {
            ClientAction::Emit(ClientEmit::Statement(_)) => {
                assert!(!busy, "statement emitted while a send was outstanding");
            },
            ClientAction::SendGateChanged { busy: now } => busy = *now,
            _ => {},
        }
    }
}
