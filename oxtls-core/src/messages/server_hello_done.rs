//! ServerHelloDone message.

use crate::error::{Error, Result};

/// ServerHelloDone: ends the server's first flight, empty body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ServerHelloDone;

impl ServerHelloDone {
    /// Encode to bytes.
    pub fn encode(&self) -> Vec<u8> {
        Vec::new()
    }

    /// Decode from bytes.
    pub fn decode(data: &[u8]) -> Result<Self> {
        if !data.is_empty() {
            return Err(Error::InvalidMessage("ServerHelloDone must be empty".into()));
        }
        Ok(Self)
    }
}
