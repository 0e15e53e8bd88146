//! ClientHello message.

use crate::error::{Error, Result};
use crate::protocol::{RANDOM_SIZE, SESSION_ID_MAX_SIZE};
use crate::registry::CipherSuiteId;
use bytes::{Buf, BufMut, BytesMut};

/// ClientHello message.
///
/// ```text
/// struct {
///     ProtocolVersion client_version;
///     Random random;
///     opaque session_id<0..32>;
///     CipherSuite cipher_suites<2..2^16-1>;
///     CompressionMethod compression_methods<1..2^8-1>;
/// } ClientHello;
/// ```
///
/// The version is kept as raw wire bytes: the server must be able to
/// read a hello offering a version it does not speak in order to
/// negotiate down (or refuse with the right alert), so the codec never
/// insists the bytes match a registry entry. Suite IDs are likewise
/// carried verbatim; unknown ones simply never match the local tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientHello {
    /// Offered protocol version, raw (major, minor).
    pub client_version: (u8, u8),

    /// Client random (32 bytes).
    pub random: [u8; 32],

    /// Session ID offered for resumption; empty for a fresh session.
    pub session_id: Vec<u8>,

    /// Offered cipher suites, most preferred first.
    pub cipher_suites: Vec<CipherSuiteId>,

    /// Offered compression methods as wire numbers, most preferred first.
    pub compression_methods: Vec<u8>,
}

impl ClientHello {
    /// Create a ClientHello.
    pub fn new(
        client_version: (u8, u8),
        random: [u8; 32],
        cipher_suites: Vec<CipherSuiteId>,
        compression_methods: Vec<u8>,
    ) -> Self {
        Self {
            client_version,
            random,
            session_id: Vec::new(),
            cipher_suites,
            compression_methods,
        }
    }

    /// Set the session ID offered for resumption.
    pub fn with_session_id(mut self, session_id: Vec<u8>) -> Self {
        self.session_id = session_id;
        self
    }

    /// Encode to bytes.
    pub fn encode(&self) -> Result<Vec<u8>> {
        if self.session_id.len() > SESSION_ID_MAX_SIZE {
            return Err(Error::InvalidMessage("session ID too long".into()));
        }
        if self.cipher_suites.is_empty() {
            return Err(Error::InvalidMessage("no cipher suites to offer".into()));
        }
        let suites_len = self.cipher_suites.len() * 2;
        if suites_len > 0xFFFF {
            return Err(Error::InvalidMessage("too many cipher suites".into()));
        }
        if self.compression_methods.is_empty() || self.compression_methods.len() > 255 {
            return Err(Error::InvalidMessage(
                "invalid compression method count".into(),
            ));
        }

        let mut buf = BytesMut::new();
        buf.put_u8(self.client_version.0);
        buf.put_u8(self.client_version.1);
        buf.put_slice(&self.random);
        buf.put_u8(self.session_id.len() as u8);
        buf.put_slice(&self.session_id);
        buf.put_u16(suites_len as u16);
        for suite in &self.cipher_suites {
            buf.put_slice(&suite.to_bytes());
        }
        buf.put_u8(self.compression_methods.len() as u8);
        buf.put_slice(&self.compression_methods);
        Ok(buf.to_vec())
    }

    /// Decode from bytes.
    pub fn decode(mut data: &[u8]) -> Result<Self> {
        // 2 version + 32 random + 1 sid len + 2 suites len + 2 one suite
        // + 1 compression len + 1 one method
        if data.len() < 41 {
            return Err(Error::InvalidMessage("ClientHello too short".into()));
        }

        let client_version = (data.get_u8(), data.get_u8());

        let mut random = [0u8; RANDOM_SIZE];
        data.copy_to_slice(&mut random);

        let session_id_len = data.get_u8() as usize;
        if session_id_len > SESSION_ID_MAX_SIZE {
            return Err(Error::InvalidMessage("session ID too long".into()));
        }
        if data.len() < session_id_len {
            return Err(Error::InvalidMessage("incomplete session ID".into()));
        }
        let session_id = data[..session_id_len].to_vec();
        data.advance(session_id_len);

        if data.len() < 2 {
            return Err(Error::InvalidMessage("missing cipher suite length".into()));
        }
        let suites_len = data.get_u16() as usize;
        if suites_len < 2 || suites_len % 2 != 0 {
            return Err(Error::InvalidMessage("invalid cipher suite length".into()));
        }
        if data.len() < suites_len {
            return Err(Error::InvalidMessage("incomplete cipher suites".into()));
        }
        let mut cipher_suites = Vec::with_capacity(suites_len / 2);
        for _ in 0..suites_len / 2 {
            let b0 = data.get_u8();
            let b1 = data.get_u8();
            cipher_suites.push(CipherSuiteId::new(b0, b1));
        }

        if data.is_empty() {
            return Err(Error::InvalidMessage(
                "missing compression method length".into(),
            ));
        }
        let compression_len = data.get_u8() as usize;
        if compression_len == 0 || data.len() < compression_len {
            return Err(Error::InvalidMessage("invalid compression methods".into()));
        }
        let compression_methods = data[..compression_len].to_vec();
        data.advance(compression_len);

        if !data.is_empty() {
            return Err(Error::InvalidMessage("trailing bytes in ClientHello".into()));
        }

        Ok(Self {
            client_version,
            random,
            session_id,
            cipher_suites,
            compression_methods,
        })
    }
}
