//! Client
//!
//! Action-based client state machine for the roomwire chat protocol. Manages
//! the session lifecycle, room subscriptions with backlog replay, live event
//! routing, and acknowledgement-gated sends.
//!
//! # Architecture
//!
//! The client is a pure state machine that:
//! - Receives events from the caller (user intents, transport lifecycle,
//!   decoded server events)
//! - Produces actions for the caller to execute (emit frames, deliver events
//!   to the presentation layer, flip the send gate)
//! - Performs no I/O and spawns nothing; all work is a reaction to one
//!   `handle` call
//!
//! Suspension between an emitted request and its paired acknowledgement is
//! held as pending state inside the machine; continuation happens on the
//! `handle` call that carries the paired server event.
//!
//! # Components
//!
//! - [`Client`]: top-level state machine
//! - [`Session`]: connection lifecycle and identity
//! - [`RoomRouter`]: per-room event dispatch with ordering fidelity
//! - [`ActionGate`]: at-most-one outstanding action per [`ActionKind`]
//! - [`ClientEvent`] / [`ClientAction`]: the machine's inputs and outputs

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod client;
mod error;
mod event;
mod gate;
mod router;
mod session;

pub use client::Client;
pub use error::ClientError;
pub use event::{ClientAction, ClientEvent};
pub use gate::{ActionGate, ActionKind};
pub use roomwire_proto::{ClientEmit, EventKind, RoomEvent, ServerEvent};
pub use router::{Room, RoomRouter};
pub use session::{ConnectionState, Session};
