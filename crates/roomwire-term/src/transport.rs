//! Frame transport.
//!
//! Wire format: each [`WireFrame`] is CBOR-encoded and prefixed with its
//! length as a big-endian `u32`. The [`Transport`] trait keeps the driver
//! generic so tests can substitute an in-memory peer.

use bytes::{Buf, BufMut, BytesMut};
use roomwire_proto::{WireError, WireFrame};
use thiserror::Error;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
};

/// Upper bound on a single frame's payload, in bytes.
///
/// A backlog-carrying `room_joined` is the largest legitimate frame; one
/// megabyte leaves generous headroom while bounding memory per read.
pub const MAX_FRAME_LEN: usize = 1024 * 1024;

/// Errors from the frame transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Socket I/O failed.
    #[error("I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Frame encoding or decoding failed.
    #[error(transparent)]
    Wire(#[from] WireError),

    /// A frame declared a length beyond [`MAX_FRAME_LEN`].
    #[error("frame of {len} bytes exceeds the {MAX_FRAME_LEN} byte limit")]
    Oversize {
        /// Declared payload length.
        len: usize,
    },
}

/// A bidirectional, ordered frame channel.
pub trait Transport {
    /// Send one frame.
    fn send(
        &mut self,
        frame: &WireFrame,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Receive the next frame, or `None` on clean shutdown by the peer.
    fn recv(&mut self) -> impl Future<Output = Result<Option<WireFrame>, TransportError>> + Send;
}

/// Length-prefix a frame for the wire.
pub(crate) fn encode_frame(frame: &WireFrame) -> Result<BytesMut, TransportError> {
    let mut payload = Vec::new();
    frame.encode(&mut payload)?;
    if payload.len() > MAX_FRAME_LEN {
        return Err(TransportError::Oversize { len: payload.len() });
    }

    let mut out = BytesMut::with_capacity(payload.len() + 4);
    #[allow(clippy::cast_possible_truncation)] // bounded by MAX_FRAME_LEN
    out.put_u32(payload.len() as u32);
    out.put_slice(&payload);
    Ok(out)
}

/// Extract one frame from the front of `buf`, if a complete one has
/// accumulated. Consumes the frame's bytes on success.
pub(crate) fn decode_frame(buf: &mut BytesMut) -> Result<Option<WireFrame>, TransportError> {
    if buf.len() < 4 {
        return Ok(None);
    }

    let mut prefix = [0u8; 4];
    prefix.copy_from_slice(&buf[..4]);
    let len = u32::from_be_bytes(prefix) as usize;
    if len > MAX_FRAME_LEN {
        return Err(TransportError::Oversize { len });
    }
    if buf.len() < 4 + len {
        return Ok(None);
    }

    buf.advance(4);
    let payload = buf.split_to(len);
    Ok(Some(WireFrame::decode(&payload)?))
}

/// [`Transport`] over a TCP stream.
pub struct TcpTransport {
    stream: TcpStream,
    read_buf: BytesMut,
}

impl TcpTransport {
    /// Connect to the server.
    pub async fn connect(addr: &str) -> Result<Self, TransportError> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        Ok(Self { stream, read_buf: BytesMut::with_capacity(8 * 1024) })
    }
}

impl Transport for TcpTransport {
    async fn send(&mut self, frame: &WireFrame) -> Result<(), TransportError> {
        let encoded = encode_frame(frame)?;
        self.stream.write_all(&encoded).await?;
        Ok(())
    }

    async fn recv(&mut self) -> Result<Option<WireFrame>, TransportError> {
        loop {
            if let Some(frame) = decode_frame(&mut self.read_buf)? {
                return Ok(Some(frame));
            }

            let n = self.stream.read_buf(&mut self.read_buf).await?;
            if n == 0 {
                if self.read_buf.is_empty() {
                    return Ok(None);
                }
                return Err(TransportError::Io(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "peer closed mid-frame",
                )));
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use roomwire_proto::{ClientEmit, Nick, names};

    use super::*;

    fn nick_frame(nick: &str) -> WireFrame {
        ClientEmit::Nick(Nick { nick: nick.to_owned() }).to_frame().unwrap()
    }

    #[test]
    fn encoded_frame_decodes_back() {
        let frame = nick_frame("alice");
        let mut buf = encode_frame(&frame).unwrap();

        let decoded = decode_frame(&mut buf).unwrap().unwrap();
        assert_eq!(decoded.name, names::NICK);
        assert!(buf.is_empty());
    }

    #[test]
    fn partial_frame_yields_nothing_until_complete() {
        let frame = nick_frame("alice");
        let encoded = encode_frame(&frame).unwrap();

        let mut buf = BytesMut::new();
        for chunk in encoded.chunks(3) {
            assert!(decode_frame(&mut buf).unwrap().is_none());
            buf.extend_from_slice(chunk);
        }
        assert!(decode_frame(&mut buf).unwrap().is_some());
    }

    #[test]
    fn back_to_back_frames_come_out_in_order() {
        let mut buf = BytesMut::new();
        buf.extend_from_slice(&encode_frame(&nick_frame("alice")).unwrap());
        buf.extend_from_slice(&encode_frame(&nick_frame("bob")).unwrap());

        let first = decode_frame(&mut buf).unwrap().unwrap();
        let second = decode_frame(&mut buf).unwrap().unwrap();
        assert_ne!(first.payload, second.payload);
        assert!(decode_frame(&mut buf).unwrap().is_none());
    }

    #[test]
    fn oversize_length_prefix_is_rejected() {
        let mut buf = BytesMut::new();
        #[allow(clippy::cast_possible_truncation)]
        buf.put_u32((MAX_FRAME_LEN + 1) as u32);
        buf.put_slice(b"junk");

        assert!(matches!(decode_frame(&mut buf), Err(TransportError::Oversize { .. })));
    }
}
