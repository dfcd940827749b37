//! Client state machine.
//!
//! The `Client` is the top-level state machine that owns the session, the
//! room router, the pending-join set, and the send gate, and sequences them
//! against server acknowledgements.

use roomwire_proto::{
    Acknowledgement, ClientEmit, ErrorReply, JoinRoom, LeaveRoom, Nick, RoomJoined, RoomLeft,
    ServerEvent, SetTopic, Statement, TopicChanged,
};

use crate::{
    error::ClientError,
    event::{ClientAction, ClientEvent},
    gate::{ActionGate, ActionKind},
    router::{Room, RoomRouter},
    session::{ConnectionState, Session},
};

/// Client state machine.
///
/// Single-threaded and event-driven: every transition is a reaction to one
/// [`ClientEvent`], and every side effect leaves as a [`ClientAction`] for
/// the caller to execute. There is no cancellation and no timeout; a join
/// or gated send whose acknowledgement never arrives stays pending until
/// the transport closes.
pub struct Client {
    /// Session lifecycle and identity.
    session: Session,

    /// Live room subscriptions.
    router: RoomRouter,

    /// Rooms with a join request in flight, in request order.
    pending_joins: Vec<String>,

    /// Acknowledgement gate for outbound actions.
    gate: ActionGate,
}

impl Client {
    /// Create a disconnected client.
    pub fn new() -> Self {
        Self {
            session: Session::new(),
            router: RoomRouter::new(),
            pending_joins: Vec::new(),
            gate: ActionGate::new(),
        }
    }

    /// Current connection state.
    pub fn connection_state(&self) -> ConnectionState {
        self.session.state()
    }

    /// The session identity, if a connect has been requested.
    pub fn identity(&self) -> Option<&str> {
        self.session.identity()
    }

    /// Whether a room's join handshake has resolved.
    pub fn is_subscribed(&self, room: &str) -> bool {
        self.router.is_subscribed(room)
    }

    /// Look up a live room.
    pub fn room(&self, name: &str) -> Option<&Room> {
        self.router.room(name)
    }

    /// Number of live rooms.
    pub fn room_count(&self) -> usize {
        self.router.room_count()
    }

    /// Whether a join for this room is in flight.
    pub fn join_pending(&self, room: &str) -> bool {
        self.pending_joins.iter().any(|r| r == room)
    }

    /// Whether an action of this kind is awaiting its acknowledgement.
    pub fn is_busy(&self, kind: ActionKind) -> bool {
        self.gate.is_busy(kind)
    }

    /// Process an event and return resulting actions.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` for synchronous rejections (see
    /// [`ClientError::is_fatal`]); the machine does not transition on error.
    pub fn handle(&mut self, event: ClientEvent) -> Result<Vec<ClientAction>, ClientError> {
        match event {
            ClientEvent::Connect { nick } => self.handle_connect(&nick),
            ClientEvent::TransportUp => self.handle_transport_up(),
            ClientEvent::TransportDown { reason } => Ok(self.handle_transport_down(&reason)),
            ClientEvent::Join { room } => self.handle_join(room),
            ClientEvent::SendStatement { room, message } => self.handle_send(room, message),
            ClientEvent::SetTopic { room, topic } => self.handle_set_topic(room, topic),
            ClientEvent::Leave { room } => self.handle_leave(&room),
            ClientEvent::Server(event) => self.handle_server(event),
        }
    }

    /// Handle a connect request.
    fn handle_connect(&mut self, nick: &str) -> Result<Vec<ClientAction>, ClientError> {
        if self.session.begin_connect(nick) {
            Ok(vec![ClientAction::Log { message: format!("connecting as {nick}") }])
        } else {
            // Already connecting or connected. The transport owns
            // reconnection, so this is a silent no-op.
            tracing::debug!(nick, "connect ignored: session already active");
            Ok(vec![])
        }
    }

    /// Handle the transport coming up: announce identity.
    fn handle_transport_up(&mut self) -> Result<Vec<ClientAction>, ClientError> {
        match self.session.transport_up() {
            Some(nick) => {
                Ok(vec![ClientAction::Emit(ClientEmit::Nick(Nick { nick: nick.to_owned() }))])
            },
            None => Err(ClientError::InvalidState {
                reason: "transport reported connected with no connect in flight".to_owned(),
            }),
        }
    }

    /// Handle the transport closing: the session and everything scoped to
    /// it is gone. Pending joins and the send gate can never resolve now.
    fn handle_transport_down(&mut self, reason: &str) -> Vec<ClientAction> {
        self.session.transport_down();
        self.router.clear();
        self.pending_joins.clear();

        let mut actions = Vec::new();
        if self.gate.is_busy(ActionKind::Statement) {
            self.gate.reset();
            actions.push(ClientAction::SendGateChanged { busy: false });
        }
        actions.push(ClientAction::Log { message: format!("transport closed: {reason}") });
        actions
    }

    /// Handle a join request.
    fn handle_join(&mut self, room: String) -> Result<Vec<ClientAction>, ClientError> {
        if self.session.state() != ConnectionState::Connected {
            return Err(ClientError::NotConnected);
        }
        if self.router.is_subscribed(&room) {
            return Err(ClientError::RoomAlreadySubscribed { room });
        }
        if self.join_pending(&room) {
            // Duplicate in-flight joins race for the same acknowledgement;
            // reject rather than coalesce.
            return Err(ClientError::JoinPending { room });
        }

        self.pending_joins.push(room.clone());
        Ok(vec![ClientAction::Emit(ClientEmit::Join(JoinRoom { room }))])
    }

    /// Handle a gated statement send.
    fn handle_send(
        &mut self,
        room: String,
        message: String,
    ) -> Result<Vec<ClientAction>, ClientError> {
        if self.session.state() != ConnectionState::Connected {
            return Err(ClientError::NotConnected);
        }
        if !self.router.is_subscribed(&room) {
            return Err(ClientError::RoomNotFound { room });
        }
        if !self.gate.arm(ActionKind::Statement) {
            return Err(ClientError::Busy { kind: ActionKind::Statement });
        }

        Ok(vec![
            ClientAction::Emit(ClientEmit::Statement(Statement { room, message })),
            ClientAction::SendGateChanged { busy: true },
        ])
    }

    /// Handle a topic change request. Not gated; the acknowledgement only
    /// refreshes local state.
    fn handle_set_topic(
        &mut self,
        room: String,
        topic: String,
    ) -> Result<Vec<ClientAction>, ClientError> {
        if self.session.state() != ConnectionState::Connected {
            return Err(ClientError::NotConnected);
        }
        if !self.router.is_subscribed(&room) {
            return Err(ClientError::RoomNotFound { room });
        }

        Ok(vec![ClientAction::Emit(ClientEmit::Topic(SetTopic { room, topic }))])
    }

    /// Handle leaving a room. Leaving a room with no listener is a no-op;
    /// rooms may be abandoned without a leave handshake.
    fn handle_leave(&mut self, room: &str) -> Result<Vec<ClientAction>, ClientError> {
        if !self.router.unsubscribe(room) {
            tracing::debug!(room, "leave ignored: room not subscribed");
            return Ok(vec![]);
        }

        Ok(vec![ClientAction::Emit(ClientEmit::Leave(LeaveRoom { room: room.to_owned() }))])
    }

    /// Dispatch a decoded server event.
    fn handle_server(&mut self, event: ServerEvent) -> Result<Vec<ClientAction>, ClientError> {
        match event {
            ServerEvent::NickSet(ack) => Ok(Self::handle_nick_set(&ack)),
            ServerEvent::RoomJoined(joined) => Ok(self.handle_room_joined(joined)),
            ServerEvent::RoomEvent { room, event } => Ok(self.handle_room_event(room, event)),
            ServerEvent::StatementOk(_) => Ok(self.handle_statement_ok()),
            ServerEvent::TopicChanged(changed) => Ok(self.handle_topic_changed(&changed)),
            ServerEvent::RoomLeft(left) => Ok(Self::handle_room_left(&left)),
            ServerEvent::Error(err) => Ok(Self::handle_error(err)),
        }
    }

    /// Identity acknowledgement: informational only.
    fn handle_nick_set(ack: &Acknowledgement) -> Vec<ClientAction> {
        vec![ClientAction::Log { message: format!("identity acknowledged: {}", ack.reason) }]
    }

    /// Join acknowledgement: materialize the room, install its listener,
    /// then replay the backlog through it, oldest first.
    ///
    /// The listener is installed before the first backlog event is queued,
    /// so a live event arriving on the next `handle` call cannot be
    /// dropped; `RoomReady` leads the action list, so the presentation
    /// layer sees the room before any event for it.
    fn handle_room_joined(&mut self, joined: RoomJoined) -> Vec<ClientAction> {
        let slug = joined.room.slug;
        let Some(position) = self.pending_joins.iter().position(|r| *r == slug) else {
            tracing::debug!(room = %slug, "room_joined ignored: no join in flight");
            return vec![];
        };
        self.pending_joins.remove(position);

        let room = Room::new(&slug, &joined.room.topic);
        self.router.subscribe(room.clone());

        let mut actions = Vec::with_capacity(joined.backlog.len() + 1);
        actions.push(ClientAction::RoomReady { room });
        for event in joined.backlog {
            // Replay through the router so a topic change in the backlog
            // refreshes room state exactly as a live one would.
            self.router.route(&slug, &event);
            actions.push(ClientAction::DeliverEvent { room: slug.clone(), event });
        }
        actions
    }

    /// Live room event: forward unmodified if the room is subscribed.
    fn handle_room_event(
        &mut self,
        room: String,
        event: roomwire_proto::RoomEvent,
    ) -> Vec<ClientAction> {
        if self.router.route(&room, &event) {
            vec![ClientAction::DeliverEvent { room, event }]
        } else {
            tracing::debug!(room, "room event dropped: no listener");
            vec![]
        }
    }

    /// Statement acknowledgement: a pure completion signal for the gate.
    fn handle_statement_ok(&mut self) -> Vec<ClientAction> {
        if self.gate.acknowledge(ActionKind::Statement) {
            vec![ClientAction::SendGateChanged { busy: false }]
        } else {
            tracing::debug!("statement_ok ignored: no send outstanding");
            vec![]
        }
    }

    /// Topic change acknowledgement: refresh local room state.
    fn handle_topic_changed(&mut self, changed: &TopicChanged) -> Vec<ClientAction> {
        self.router.refresh_topic(&changed.room.slug, &changed.room.topic);
        vec![]
    }

    /// Leave acknowledgement: the listener was already removed on request.
    fn handle_room_left(left: &RoomLeft) -> Vec<ClientAction> {
        vec![ClientAction::Log { message: format!("left room {}", left.room.slug) }]
    }

    /// Server-reported error: surface, never interpret.
    fn handle_error(err: ErrorReply) -> Vec<ClientAction> {
        vec![ClientAction::SurfaceError { reason: err.reason }]
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use roomwire_proto::{EventKind, RoomEvent, RoomInfo};

    use super::*;

    /// Drive a client to Connected as `nick`.
    fn connected(nick: &str) -> Client {
        let mut client = Client::new();
        client.handle(ClientEvent::Connect { nick: nick.to_owned() }).unwrap();
        client.handle(ClientEvent::TransportUp).unwrap();
        client
    }

    /// Build the join acknowledgement for `room`.
    fn joined(room: &str, topic: &str, backlog: Vec<RoomEvent>) -> ClientEvent {
        ClientEvent::Server(ServerEvent::RoomJoined(RoomJoined {
            room: RoomInfo { slug: room.to_owned(), topic: topic.to_owned() },
            backlog,
            reason: String::new(),
        }))
    }

    /// Drive a client through a full join of `room`.
    fn join(client: &mut Client, room: &str) {
        client.handle(ClientEvent::Join { room: room.to_owned() }).unwrap();
        client.handle(joined(room, "", vec![])).unwrap();
    }

    #[test]
    fn transport_up_announces_identity() {
        let mut client = Client::new();
        client.handle(ClientEvent::Connect { nick: "alice".to_owned() }).unwrap();

        let actions = client.handle(ClientEvent::TransportUp).unwrap();
        assert_eq!(
            actions,
            vec![ClientAction::Emit(ClientEmit::Nick(Nick { nick: "alice".to_owned() }))]
        );
        assert_eq!(client.connection_state(), ConnectionState::Connected);
    }

    #[test]
    fn second_connect_is_silent_noop() {
        let mut client = connected("alice");

        let actions = client.handle(ClientEvent::Connect { nick: "bob".to_owned() }).unwrap();
        assert!(actions.is_empty());
        assert_eq!(client.identity(), Some("alice"));
    }

    #[test]
    fn transport_up_without_connect_is_fatal() {
        let mut client = Client::new();
        let result = client.handle(ClientEvent::TransportUp);
        assert!(matches!(result, Err(ClientError::InvalidState { .. })));
        assert!(result.unwrap_err().is_fatal());
    }

    #[test]
    fn join_requires_connection() {
        let mut client = Client::new();
        let result = client.handle(ClientEvent::Join { room: "general".to_owned() });
        assert!(matches!(result, Err(ClientError::NotConnected)));
    }

    #[test]
    fn join_emits_request_and_tracks_pending() {
        let mut client = connected("alice");

        let actions = client.handle(ClientEvent::Join { room: "general".to_owned() }).unwrap();
        assert_eq!(
            actions,
            vec![ClientAction::Emit(ClientEmit::Join(JoinRoom { room: "general".to_owned() }))]
        );
        assert!(client.join_pending("general"));
        assert!(!client.is_subscribed("general"));
    }

    #[test]
    fn duplicate_in_flight_join_is_rejected() {
        let mut client = connected("alice");
        client.handle(ClientEvent::Join { room: "general".to_owned() }).unwrap();

        let result = client.handle(ClientEvent::Join { room: "general".to_owned() });
        assert!(matches!(result, Err(ClientError::JoinPending { .. })));
    }

    #[test]
    fn concurrent_joins_of_distinct_rooms_are_independent() {
        let mut client = connected("alice");
        client.handle(ClientEvent::Join { room: "a".to_owned() }).unwrap();
        client.handle(ClientEvent::Join { room: "b".to_owned() }).unwrap();

        // Acks may resolve in any order; each resolves its own join.
        client.handle(joined("b", "", vec![])).unwrap();
        assert!(client.is_subscribed("b"));
        assert!(client.join_pending("a"));

        client.handle(joined("a", "", vec![])).unwrap();
        assert!(client.is_subscribed("a"));
        assert!(!client.join_pending("a"));
    }

    #[test]
    fn rejoining_a_live_room_is_rejected() {
        let mut client = connected("alice");
        join(&mut client, "general");

        let result = client.handle(ClientEvent::Join { room: "general".to_owned() });
        assert!(matches!(result, Err(ClientError::RoomAlreadySubscribed { .. })));
    }

    #[test]
    fn room_ready_precedes_backlog_replay_in_order() {
        let mut client = connected("alice");
        client.handle(ClientEvent::Join { room: "general".to_owned() }).unwrap();

        let backlog = vec![
            RoomEvent::statement("general", "alice", "first", "t1"),
            RoomEvent::statement("general", "bob", "second", "t2"),
        ];
        let actions = client.handle(joined("general", "", backlog.clone())).unwrap();

        assert_eq!(actions.len(), 3);
        assert!(matches!(&actions[0], ClientAction::RoomReady { room } if room.name == "general"));
        assert_eq!(
            actions[1],
            ClientAction::DeliverEvent { room: "general".to_owned(), event: backlog[0].clone() }
        );
        assert_eq!(
            actions[2],
            ClientAction::DeliverEvent { room: "general".to_owned(), event: backlog[1].clone() }
        );
    }

    #[test]
    fn room_topic_keeps_raw_server_string() {
        let mut client = connected("alice");
        client.handle(ClientEvent::Join { room: "lobby".to_owned() }).unwrap();
        client.handle(joined("lobby", "", vec![])).unwrap();

        // The empty string survives; "(No topic set.)" is presentation-only.
        assert_eq!(client.room("lobby").map(|r| r.topic.as_str()), Some(""));
    }

    #[test]
    fn stray_join_ack_is_ignored() {
        let mut client = connected("alice");

        let actions = client.handle(joined("general", "", vec![])).unwrap();
        assert!(actions.is_empty());
        assert!(!client.is_subscribed("general"));
    }

    #[test]
    fn live_event_reaches_only_its_room() {
        let mut client = connected("alice");
        join(&mut client, "a");
        join(&mut client, "b");

        let event = RoomEvent::statement("a", "alice", "hi", "t1");
        let actions = client
            .handle(ClientEvent::Server(ServerEvent::RoomEvent {
                room: "a".to_owned(),
                event: event.clone(),
            }))
            .unwrap();

        assert_eq!(actions, vec![ClientAction::DeliverEvent { room: "a".to_owned(), event }]);
    }

    #[test]
    fn event_for_unsubscribed_room_is_dropped() {
        let mut client = connected("alice");

        let event = RoomEvent::statement("ghost", "alice", "hi", "t1");
        let actions = client
            .handle(ClientEvent::Server(ServerEvent::RoomEvent { room: "ghost".to_owned(), event }))
            .unwrap();
        assert!(actions.is_empty());
    }

    #[test]
    fn second_send_before_ack_is_busy() {
        let mut client = connected("alice");
        join(&mut client, "general");

        let first = client
            .handle(ClientEvent::SendStatement {
                room: "general".to_owned(),
                message: "hi".to_owned(),
            })
            .unwrap();
        assert_eq!(first.len(), 2);
        assert!(matches!(first[0], ClientAction::Emit(ClientEmit::Statement(_))));
        assert_eq!(first[1], ClientAction::SendGateChanged { busy: true });

        // No second emission reaches the transport.
        let second = client.handle(ClientEvent::SendStatement {
            room: "general".to_owned(),
            message: "again".to_owned(),
        });
        assert!(matches!(second, Err(ClientError::Busy { kind: ActionKind::Statement })));
    }

    #[test]
    fn ack_resets_gate_and_next_send_succeeds() {
        let mut client = connected("alice");
        join(&mut client, "general");

        client
            .handle(ClientEvent::SendStatement {
                room: "general".to_owned(),
                message: "hi".to_owned(),
            })
            .unwrap();

        let actions = client
            .handle(ClientEvent::Server(ServerEvent::StatementOk(Acknowledgement {
                reason: String::new(),
            })))
            .unwrap();
        assert_eq!(actions, vec![ClientAction::SendGateChanged { busy: false }]);

        let again = client.handle(ClientEvent::SendStatement {
            room: "general".to_owned(),
            message: "again".to_owned(),
        });
        assert!(again.is_ok());
        assert!(client.is_busy(ActionKind::Statement));
    }

    #[test]
    fn stray_statement_ack_is_ignored() {
        let mut client = connected("alice");

        let actions = client
            .handle(ClientEvent::Server(ServerEvent::StatementOk(Acknowledgement {
                reason: String::new(),
            })))
            .unwrap();
        assert!(actions.is_empty());
    }

    #[test]
    fn send_to_unknown_room_fails() {
        let mut client = connected("alice");

        let result = client.handle(ClientEvent::SendStatement {
            room: "ghost".to_owned(),
            message: "hi".to_owned(),
        });
        assert!(matches!(result, Err(ClientError::RoomNotFound { .. })));
        assert!(!client.is_busy(ActionKind::Statement));
    }

    #[test]
    fn topic_change_is_not_gated() {
        let mut client = connected("alice");
        join(&mut client, "general");

        for topic in ["one", "two"] {
            let actions = client
                .handle(ClientEvent::SetTopic {
                    room: "general".to_owned(),
                    topic: topic.to_owned(),
                })
                .unwrap();
            assert!(matches!(actions[0], ClientAction::Emit(ClientEmit::Topic(_))));
        }
    }

    #[test]
    fn topic_changed_ack_refreshes_room() {
        let mut client = connected("alice");
        join(&mut client, "general");

        client
            .handle(ClientEvent::Server(ServerEvent::TopicChanged(TopicChanged {
                room: RoomInfo { slug: "general".to_owned(), topic: "rust".to_owned() },
                reason: String::new(),
            })))
            .unwrap();

        assert_eq!(client.room("general").map(|r| r.topic.as_str()), Some("rust"));
    }

    #[test]
    fn leave_removes_listener_and_emits() {
        let mut client = connected("alice");
        join(&mut client, "general");

        let actions = client.handle(ClientEvent::Leave { room: "general".to_owned() }).unwrap();
        assert_eq!(
            actions,
            vec![ClientAction::Emit(ClientEmit::Leave(LeaveRoom { room: "general".to_owned() }))]
        );
        assert!(!client.is_subscribed("general"));

        // Abandoned room: later events are dropped, not misrouted.
        let event = RoomEvent::statement("general", "bob", "gone?", "t1");
        let actions = client
            .handle(ClientEvent::Server(ServerEvent::RoomEvent {
                room: "general".to_owned(),
                event,
            }))
            .unwrap();
        assert!(actions.is_empty());
    }

    #[test]
    fn leave_of_unknown_room_is_noop() {
        let mut client = connected("alice");
        let actions = client.handle(ClientEvent::Leave { room: "ghost".to_owned() }).unwrap();
        assert!(actions.is_empty());
    }

    #[test]
    fn server_error_is_surfaced_not_interpreted() {
        let mut client = connected("alice");

        let actions = client
            .handle(ClientEvent::Server(ServerEvent::Error(ErrorReply {
                reason: "Room ghost does not exist.".to_owned(),
            })))
            .unwrap();
        assert_eq!(
            actions,
            vec![ClientAction::SurfaceError { reason: "Room ghost does not exist.".to_owned() }]
        );
    }

    #[test]
    fn transport_down_destroys_session_state() {
        let mut client = connected("alice");
        join(&mut client, "general");
        client
            .handle(ClientEvent::SendStatement {
                room: "general".to_owned(),
                message: "hi".to_owned(),
            })
            .unwrap();
        client.handle(ClientEvent::Join { room: "other".to_owned() }).unwrap();

        let actions = client
            .handle(ClientEvent::TransportDown { reason: "connection reset".to_owned() })
            .unwrap();

        // The stuck gate is released so the presentation layer unblocks.
        assert!(actions.contains(&ClientAction::SendGateChanged { busy: false }));
        assert_eq!(client.connection_state(), ConnectionState::Disconnected);
        assert_eq!(client.room_count(), 0);
        assert!(!client.join_pending("other"));
        assert!(!client.is_busy(ActionKind::Statement));
    }

    #[test]
    fn backlog_topic_set_refreshes_room_state() {
        let mut client = connected("alice");
        client.handle(ClientEvent::Join { room: "general".to_owned() }).unwrap();

        let backlog = vec![RoomEvent {
            room: "general".to_owned(),
            kind: EventKind::TopicSet,
            user: "bob".to_owned(),
            message: "bob set the topic to \"rust\".".to_owned(),
            timestamp: "t1".to_owned(),
            topic: Some("rust".to_owned()),
        }];
        client.handle(joined("general", "", backlog)).unwrap();

        assert_eq!(client.room("general").map(|r| r.topic.as_str()), Some("rust"));
    }

    #[test]
    fn unknown_event_kind_passes_through() {
        let mut client = connected("alice");
        join(&mut client, "general");

        let event = RoomEvent {
            room: "general".to_owned(),
            kind: EventKind::Other("reaction_added".to_owned()),
            user: "bob".to_owned(),
            message: ":+1:".to_owned(),
            timestamp: "t1".to_owned(),
            topic: None,
        };
        let actions = client
            .handle(ClientEvent::Server(ServerEvent::RoomEvent {
                room: "general".to_owned(),
                event: event.clone(),
            }))
            .unwrap();

        assert_eq!(actions, vec![ClientAction::DeliverEvent { room: "general".to_owned(), event }]);
    }
}
