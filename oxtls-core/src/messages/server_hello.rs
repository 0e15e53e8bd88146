//! ServerHello message.

use crate::error::{Error, Result};
use crate::protocol::{RANDOM_SIZE, SESSION_ID_MAX_SIZE};
use crate::registry::CipherSuiteId;
use bytes::{Buf, BufMut, BytesMut};

/// ServerHello message.
///
/// ```text
/// struct {
///     ProtocolVersion server_version;
///     Random random;
///     SessionID session_id;
///     CipherSuite cipher_suite;
///     CompressionMethod compression_method;
/// } ServerHello;
/// ```
///
/// Version and compression travel raw; the client validates the
/// server's choice against what it offered, which is a handshake rule
/// rather than a framing rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerHello {
    /// Chosen protocol version, raw (major, minor).
    pub server_version: (u8, u8),

    /// Server random (32 bytes).
    pub random: [u8; 32],

    /// Session ID for this session; echoes the client's on resumption.
    pub session_id: Vec<u8>,

    /// Chosen cipher suite.
    pub cipher_suite: CipherSuiteId,

    /// Chosen compression method wire number.
    pub compression_method: u8,
}

impl ServerHello {
    /// Create a ServerHello.
    pub fn new(
        server_version: (u8, u8),
        random: [u8; 32],
        session_id: Vec<u8>,
        cipher_suite: CipherSuiteId,
        compression_method: u8,
    ) -> Self {
        Self {
            server_version,
            random,
            session_id,
            cipher_suite,
            compression_method,
        }
    }

    /// Encode to bytes.
    pub fn encode(&self) -> Result<Vec<u8>> {
        if self.session_id.len() > SESSION_ID_MAX_SIZE {
            return Err(Error::InvalidMessage("session ID too long".into()));
        }

        let mut buf = BytesMut::new();
        buf.put_u8(self.server_version.0);
        buf.put_u8(self.server_version.1);
        buf.put_slice(&self.random);
        buf.put_u8(self.session_id.len() as u8);
        buf.put_slice(&self.session_id);
        buf.put_slice(&self.cipher_suite.to_bytes());
        buf.put_u8(self.compression_method);
        Ok(buf.to_vec())
    }

    /// Decode from bytes.
    pub fn decode(mut data: &[u8]) -> Result<Self> {
        // 2 version + 32 random + 1 sid len + 2 suite + 1 compression
        if data.len() < 38 {
            return Err(Error::InvalidMessage("ServerHello too short".into()));
        }

        let server_version = (data.get_u8(), data.get_u8());

        let mut random = [0u8; RANDOM_SIZE];
        data.copy_to_slice(&mut random);

        let session_id_len = data.get_u8() as usize;
        if session_id_len > SESSION_ID_MAX_SIZE {
            return Err(Error::InvalidMessage("session ID too long".into()));
        }
        if data.len() < session_id_len + 3 {
            return Err(Error::InvalidMessage("ServerHello truncated".into()));
        }
        let session_id = data[..session_id_len].to_vec();
        data.advance(session_id_len);

        let cipher_suite = CipherSuiteId::new(data.get_u8(), data.get_u8());
        let compression_method = data.get_u8();

        if !data.is_empty() {
            return Err(Error::InvalidMessage("trailing bytes in ServerHello".into()));
        }

        Ok(Self {
            server_version,
            random,
            session_id,
            cipher_suite,
            compression_method,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_round_trip() {
        let hello = ServerHello::new(
            (3, 1),
            [0x11; 32],
            vec![9; 32],
            CipherSuiteId::new(0x00, 0x35),
            0,
        );
        let decoded = ServerHello::decode(&hello.encode().unwrap()).unwrap();
        assert_eq!(decoded, hello);
    }

    #[test]
    fn test_empty_session_id() {
        let hello = ServerHello::new((3, 0), [0; 32], Vec::new(), CipherSuiteId::new(0, 4), 0);
        let encoded = hello.encode().unwrap();
        assert_eq!(encoded.len(), 38);
        assert_eq!(encoded[34], 0);

        let decoded = ServerHello::decode(&encoded).unwrap();
        assert!(decoded.session_id.is_empty());
    }

    #[test]
    fn test_rejects_truncated_and_trailing() {
        let encoded = ServerHello::new(
            (3, 1),
            [0; 32],
            vec![1, 2],
            CipherSuiteId::new(0, 0x2F),
            0,
        )
        .encode()
        .unwrap();

        assert!(ServerHello::decode(&encoded[..encoded.len() - 1]).is_err());

        let mut trailing = encoded;
        trailing.push(7);
        assert!(ServerHello::decode(&trailing).is_err());
    }

    #[test]
    fn test_oversized_session_id_rejected() {
        let hello = ServerHello::new((3, 1), [0; 32], vec![0; 33], CipherSuiteId::new(0, 4), 0);
        assert!(hello.encode().is_err());
    }
}
