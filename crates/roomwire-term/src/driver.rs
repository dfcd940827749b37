//! Terminal event loop.
//!
//! Bridges three worlds with one `select!` loop: stdin lines become
//! [`ClientEvent`]s, received frames become [`ClientEvent::Server`] events,
//! and the actions the state machine returns are executed against the
//! transport and the terminal.

use std::io::Write;

use roomwire_client::{Client, ClientAction, ClientEvent};
use roomwire_proto::ServerEvent;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::{TermError, render, transport::Transport};

/// A parsed stdin line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/join <room>`: subscribe and switch to a room.
    Join(String),
    /// `/topic <text>`: set the active room's topic.
    Topic(String),
    /// `/switch <room>`: change which room plain text goes to.
    Switch(String),
    /// `/leave`: leave the active room.
    Leave,
    /// `/quit`: shut down.
    Quit,
    /// Plain text: a statement for the active room.
    Say(String),
    /// Blank line or unrecognized slash command.
    Nothing,
}

/// Parse one stdin line into a command.
pub fn parse_command(line: &str) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Nothing;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Command::Say(line.to_owned());
    };

    let (verb, arg) = match rest.split_once(char::is_whitespace) {
        Some((verb, arg)) => (verb, arg.trim()),
        None => (rest, ""),
    };
    match (verb, arg) {
        ("join", room) if !room.is_empty() => Command::Join(room.to_owned()),
        ("topic", text) if !text.is_empty() => Command::Topic(text.to_owned()),
        ("switch", room) if !room.is_empty() => Command::Switch(room.to_owned()),
        ("leave", _) => Command::Leave,
        ("quit", _) => Command::Quit,
        _ => Command::Nothing,
    }
}

/// Runs the client against a transport and the terminal.
pub struct Driver<T: Transport> {
    client: Client,
    transport: T,
    /// Room that plain text statements go to.
    active: Option<String>,
    out: std::io::Stdout,
}

impl<T: Transport> Driver<T> {
    /// Wrap a connected transport.
    pub fn new(transport: T) -> Self {
        Self { client: Client::new(), transport, active: None, out: std::io::stdout() }
    }

    /// Run until `/quit`, stdin EOF, or the connection drops.
    pub async fn run(mut self, nick: &str) -> Result<(), TermError> {
        let actions = self.client.handle(ClientEvent::Connect { nick: nick.to_owned() })?;
        self.apply(actions).await?;
        let actions = self.client.handle(ClientEvent::TransportUp)?;
        self.apply(actions).await?;

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    if !self.handle_line(&line).await? {
                        break;
                    }
                },
                frame = self.transport.recv() => {
                    match frame {
                        Ok(Some(frame)) => self.handle_frame(&frame).await?,
                        Ok(None) => {
                            self.handle_disconnect("server closed the connection").await?;
                            break;
                        },
                        Err(e) => {
                            self.handle_disconnect(&e.to_string()).await?;
                            return Err(e.into());
                        },
                    }
                },
            }
        }
        Ok(())
    }

    /// Process one stdin line. Returns `false` to shut down.
    async fn handle_line(&mut self, line: &str) -> Result<bool, TermError> {
        let event = match parse_command(line) {
            Command::Quit => return Ok(false),
            Command::Nothing => return Ok(true),
            Command::Switch(room) => {
                if self.client.is_subscribed(&room) {
                    self.active = Some(room);
                } else {
                    self.print(&render::error_line(&format!("not in room {room}")))?;
                }
                return Ok(true);
            },
            Command::Join(room) => ClientEvent::Join { room },
            Command::Topic(topic) => {
                let Some(room) = self.active.clone() else {
                    self.print(&render::error_line("join a room first"))?;
                    return Ok(true);
                };
                ClientEvent::SetTopic { room, topic }
            },
            Command::Leave => {
                let Some(room) = self.active.take() else {
                    self.print(&render::error_line("join a room first"))?;
                    return Ok(true);
                };
                ClientEvent::Leave { room }
            },
            Command::Say(message) => {
                let Some(room) = self.active.clone() else {
                    self.print(&render::error_line("join a room first"))?;
                    return Ok(true);
                };
                ClientEvent::SendStatement { room, message }
            },
        };
        self.dispatch(event).await?;
        Ok(true)
    }

    /// Decode and process one received frame.
    async fn handle_frame(&mut self, frame: &roomwire_proto::WireFrame) -> Result<(), TermError> {
        match ServerEvent::from_frame(frame) {
            Ok(event) => self.dispatch(ClientEvent::Server(event)).await,
            Err(e) => {
                // A peer speaking a newer vocabulary is not fatal.
                tracing::warn!(name = %frame.name, error = %e, "ignoring undecodable frame");
                Ok(())
            },
        }
    }

    /// Tear down session state after the connection is gone.
    async fn handle_disconnect(&mut self, reason: &str) -> Result<(), TermError> {
        self.active = None;
        let actions =
            self.client.handle(ClientEvent::TransportDown { reason: reason.to_owned() })?;
        self.apply(actions).await
    }

    /// Feed one event to the state machine; render recoverable rejections.
    async fn dispatch(&mut self, event: ClientEvent) -> Result<(), TermError> {
        match self.client.handle(event) {
            Ok(actions) => self.apply(actions).await,
            Err(e) if !e.is_fatal() => {
                self.print(&render::rejection_line(&e))?;
                Ok(())
            },
            Err(e) => Err(e.into()),
        }
    }

    /// Execute the actions one transition produced, in order.
    async fn apply(&mut self, actions: Vec<ClientAction>) -> Result<(), TermError> {
        for action in actions {
            match action {
                ClientAction::Emit(emit) => {
                    let frame = emit.to_frame().map_err(crate::TransportError::from)?;
                    self.transport.send(&frame).await?;
                },
                ClientAction::RoomReady { room } => {
                    self.print(&render::room_header(&room))?;
                    self.active = Some(room.name);
                },
                ClientAction::DeliverEvent { event, .. } => {
                    self.print(&render::event_line(&event))?;
                },
                ClientAction::SendGateChanged { busy } => {
                    tracing::debug!(busy, "send gate changed");
                },
                ClientAction::SurfaceError { reason } => {
                    self.print(&render::error_line(&reason))?;
                },
                ClientAction::Log { message } => {
                    tracing::info!("{message}");
                },
            }
        }
        Ok(())
    }

    fn print(&mut self, line: &str) -> std::io::Result<()> {
        writeln!(self.out, "{line}")
    }
}
