//! Top-level errors for the terminal client.

use roomwire_client::ClientError;
use thiserror::Error;

use crate::transport::TransportError;

/// Anything that tears the terminal client down.
///
/// Recoverable client rejections (busy gate, unknown room) are rendered to
/// the user instead of escalating here; only fatal conditions are wrapped.
#[derive(Debug, Error)]
pub enum TermError {
    /// The transport failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The state machine hit an unrecoverable condition.
    #[error("client error: {0}")]
    Client(#[from] ClientError),

    /// Terminal I/O failed.
    #[error("terminal I/O error: {0}")]
    Io(#[from] std::io::Error),
}
