//! Finished message.

use crate::error::{Error, Result};
use crate::protocol::VERIFY_DATA_SIZE;

/// Finished message: 12 bytes of PRF output over the transcript.
///
/// The first message protected under the new keys in either direction.
/// Comparison against the locally computed value happens in the
/// handshake, in constant time; equality here exists for tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finished {
    /// Verify data (12 bytes).
    pub verify_data: Vec<u8>,
}

impl Finished {
    /// Create a Finished message.
    pub fn new(verify_data: Vec<u8>) -> Self {
        Self { verify_data }
    }

    /// Encode to bytes.
    pub fn encode(&self) -> Result<Vec<u8>> {
        if self.verify_data.len() != VERIFY_DATA_SIZE {
            return Err(Error::InvalidMessage(format!(
                "verify data must be {} bytes",
                VERIFY_DATA_SIZE
            )));
        }
        Ok(self.verify_data.clone())
    }

    /// Decode from bytes.
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() != VERIFY_DATA_SIZE {
            return Err(Error::InvalidMessage(format!(
                "verify data must be {} bytes",
                VERIFY_DATA_SIZE
            )));
        }
        Ok(Self {
            verify_data: data.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_round_trip() {
        let msg = Finished::new((0..12).collect());
        let encoded = msg.encode().unwrap();
        assert_eq!(encoded.len(), VERIFY_DATA_SIZE);
        assert_eq!(Finished::decode(&encoded).unwrap(), msg);
    }

    #[test]
    fn test_rejects_wrong_size() {
        assert!(Finished::decode(&[0; 11]).is_err());
        assert!(Finished::decode(&[0; 13]).is_err());
        assert!(Finished::new(vec![0; 36]).encode().is_err());
    }
}
