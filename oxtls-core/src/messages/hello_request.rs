//! HelloRequest message.

use crate::error::{Error, Result};

/// HelloRequest: the server's renegotiation nudge, empty body.
///
/// Never enters the transcript; a handshake's hashes start with the
/// ClientHello it provokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HelloRequest;

impl HelloRequest {
    /// Encode to bytes.
    pub fn encode(&self) -> Vec<u8> {
        Vec::new()
    }

    /// Decode from bytes.
    pub fn decode(data: &[u8]) -> Result<Self> {
        if !data.is_empty() {
            return Err(Error::InvalidMessage("HelloRequest must be empty".into()));
        }
        Ok(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_body() {
        assert!(HelloRequest.encode().is_empty());
        assert!(HelloRequest::decode(&[]).is_ok());
        assert!(HelloRequest::decode(&[1]).is_err());
    }
}
