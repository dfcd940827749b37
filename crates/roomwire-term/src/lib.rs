//! Terminal chat client.
//!
//! Connects the pure [`roomwire_client::Client`] state machine to a real
//! TCP transport and a line-oriented terminal: stdin lines become client
//! events, decoded frames become server events, and the resulting actions
//! are executed against the socket and the screen.

pub mod driver;
pub mod render;
pub mod transport;

mod error;

pub use driver::Driver;
pub use error::TermError;
pub use transport::{TcpTransport, Transport, TransportError};
