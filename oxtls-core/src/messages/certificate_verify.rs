//! CertificateVerify message.

use crate::error::{Error, Result};
use bytes::{Buf, BufMut, BytesMut};

/// CertificateVerify message.
///
/// Carries the client's signature over the transcript digests taken
/// just before this message, proving possession of the certificate's
/// private key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateVerify {
    /// Signature over the handshake transcript digests.
    pub signature: Vec<u8>,
}

impl CertificateVerify {
    /// Create a CertificateVerify.
    pub fn new(signature: Vec<u8>) -> Self {
        Self { signature }
    }

    /// Encode to bytes.
    pub fn encode(&self) -> Result<Vec<u8>> {
        if self.signature.is_empty() || self.signature.len() > 0xFFFF {
            return Err(Error::InvalidMessage("signature size out of range".into()));
        }
        let mut buf = BytesMut::with_capacity(2 + self.signature.len());
        buf.put_u16(self.signature.len() as u16);
        buf.put_slice(&self.signature);
        Ok(buf.to_vec())
    }

    /// Decode from bytes.
    pub fn decode(mut data: &[u8]) -> Result<Self> {
        if data.len() < 2 {
            return Err(Error::InvalidMessage("CertificateVerify too short".into()));
        }
        let len = data.get_u16() as usize;
        if len == 0 || data.len() != len {
            return Err(Error::InvalidMessage("signature length mismatch".into()));
        }
        Ok(Self {
            signature: data.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_round_trip() {
        let msg = CertificateVerify::new(vec![0x99; 64]);
        let decoded = CertificateVerify::decode(&msg.encode().unwrap()).unwrap();
        assert_eq!(decoded, msg);
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(CertificateVerify::decode(&[]).is_err());
        assert!(CertificateVerify::decode(&[0, 0]).is_err());
        assert!(CertificateVerify::decode(&[0, 3, 1, 2]).is_err());
    }
}
