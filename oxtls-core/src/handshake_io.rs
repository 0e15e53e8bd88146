//! Handshake message framing.
//!
//! Handshake messages travel inside handshake-typed records with their
//! own four-byte header: one type byte and a 24-bit big-endian length.
//! Messages may span record boundaries and several may share one
//! record, so parsing works over an accumulating buffer and reports
//! "incomplete" instead of failing when bytes are still in flight.

use crate::error::{Error, Result};
use crate::protocol::HandshakeType;
use bytes::{Buf, BufMut, BytesMut};

/// Handshake header size in bytes.
pub const HANDSHAKE_HEADER_SIZE: usize = 4;

/// Largest handshake message body the engine accepts.
///
/// Generous for every legitimate message while keeping a hostile
/// 16 MB length field from committing the peer's memory.
pub const MAX_HANDSHAKE_SIZE: usize = 65536;

/// One framed handshake message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeMessage {
    /// Message type.
    pub msg_type: HandshakeType,

    /// Body bytes, header excluded.
    pub payload: Vec<u8>,
}

impl HandshakeMessage {
    /// Create a message.
    pub fn new(msg_type: HandshakeType, payload: Vec<u8>) -> Self {
        Self { msg_type, payload }
    }

    /// Encode with the four-byte header.
    pub fn encode(&self) -> Result<Vec<u8>> {
        if self.payload.len() > MAX_HANDSHAKE_SIZE {
            return Err(Error::InvalidMessage("handshake message too large".into()));
        }

        let mut buf = BytesMut::with_capacity(HANDSHAKE_HEADER_SIZE + self.payload.len());
        buf.put_u8(self.msg_type.to_u8());
        let len = self.payload.len();
        buf.put_u8(((len >> 16) & 0xFF) as u8);
        buf.put_u8(((len >> 8) & 0xFF) as u8);
        buf.put_u8((len & 0xFF) as u8);
        buf.put_slice(&self.payload);
        Ok(buf.to_vec())
    }

    /// Try to parse one message from the front of `data`.
    ///
    /// Returns `None` while the buffer holds less than a full message.
    /// On success the second element is the number of bytes consumed.
    pub fn parse(data: &[u8]) -> Result<Option<(HandshakeMessage, usize)>> {
        if data.len() < HANDSHAKE_HEADER_SIZE {
            return Ok(None);
        }

        let mut header = &data[..HANDSHAKE_HEADER_SIZE];
        let type_byte = header.get_u8();
        let msg_type = HandshakeType::from_u8(type_byte).ok_or_else(|| {
            Error::InvalidMessage(format!("unknown handshake type {}", type_byte))
        })?;
        let length = ((header.get_u8() as usize) << 16)
            | ((header.get_u8() as usize) << 8)
            | header.get_u8() as usize;

        if length > MAX_HANDSHAKE_SIZE {
            return Err(Error::InvalidMessage("handshake message too large".into()));
        }
        if data.len() < HANDSHAKE_HEADER_SIZE + length {
            return Ok(None);
        }

        let payload = data[HANDSHAKE_HEADER_SIZE..HANDSHAKE_HEADER_SIZE + length].to_vec();
        Ok(Some((
            HandshakeMessage { msg_type, payload },
            HANDSHAKE_HEADER_SIZE + length,
        )))
    }
}

/// Accumulates handshake-typed fragments and yields whole messages.
///
/// This is the resume point after a blocking transport: fragments are
/// appended as records arrive, and a message is surfaced (and consumed)
/// only once it is complete, so nothing upstream ever processes or
/// hashes a message twice.
#[derive(Debug, Default)]
pub struct HandshakeBuffer {
    buffer: Vec<u8>,
}

impl HandshakeBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the fragment of one handshake record.
    pub fn push_fragment(&mut self, fragment: &[u8]) {
        self.buffer.extend_from_slice(fragment);
    }

    /// Take the next complete message, if one is buffered.
    ///
    /// The returned raw bytes include the header, ready for transcript
    /// hashing.
    pub fn next_message(&mut self) -> Result<Option<(HandshakeMessage, Vec<u8>)>> {
        match HandshakeMessage::parse(&self.buffer)? {
            Some((message, consumed)) => {
                let raw: Vec<u8> = self.buffer.drain(..consumed).collect();
                Ok(Some((message, raw)))
            }
            None => Ok(None),
        }
    }

    /// Type byte of the next message, complete or not.
    pub fn peek_type(&self) -> Option<HandshakeType> {
        self.buffer.first().and_then(|b| HandshakeType::from_u8(*b))
    }

    /// Bytes waiting for completion.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Whether a partial message is pending.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Discard everything buffered.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}
