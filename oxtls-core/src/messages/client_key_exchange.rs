//! ClientKeyExchange message.

use crate::error::{Error, Result};
use bytes::{Buf, BufMut, BytesMut};

/// ClientKeyExchange message.
///
/// One opaque two-byte-length-prefixed vector whose meaning follows the
/// negotiated key exchange: the RSA-encrypted premaster secret when the
/// key exchange produces an RSA premaster, the client's DH public value
/// Yc when it produces a DH public value. The capability flags decide;
/// the codec carries bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientKeyExchange {
    /// Encrypted premaster or client DH public value.
    pub exchange_data: Vec<u8>,
}

impl ClientKeyExchange {
    /// Create a ClientKeyExchange.
    pub fn new(exchange_data: Vec<u8>) -> Self {
        Self { exchange_data }
    }

    /// Encode to bytes.
    pub fn encode(&self) -> Result<Vec<u8>> {
        if self.exchange_data.is_empty() || self.exchange_data.len() > 0xFFFF {
            return Err(Error::InvalidMessage(
                "key exchange data size out of range".into(),
            ));
        }
        let mut buf = BytesMut::with_capacity(2 + self.exchange_data.len());
        buf.put_u16(self.exchange_data.len() as u16);
        buf.put_slice(&self.exchange_data);
        Ok(buf.to_vec())
    }

    /// Decode from bytes.
    pub fn decode(mut data: &[u8]) -> Result<Self> {
        if data.len() < 2 {
            return Err(Error::InvalidMessage("ClientKeyExchange too short".into()));
        }
        let len = data.get_u16() as usize;
        if len == 0 || data.len() != len {
            return Err(Error::InvalidMessage(
                "key exchange data length mismatch".into(),
            ));
        }
        Ok(Self {
            exchange_data: data.to_vec(),
        })
    }
}
