//! Certificate message.

use crate::error::{Error, Result};
use bytes::{Buf, BufMut, BytesMut};

/// Certificate message: a chain of opaque DER blobs, leaf first.
///
/// ```text
/// opaque ASN.1Cert<1..2^24-1>;
/// struct {
///     ASN.1Cert certificate_list<0..2^24-1>;
/// } Certificate;
/// ```
///
/// The engine never parses the blobs; they pass through to the peer and
/// to the provider's public-key operations. An empty list is the
/// client's "no certificate" answer to a CertificateRequest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    /// Certificate chain, leaf first.
    pub certificate_list: Vec<Vec<u8>>,
}

impl Certificate {
    /// Create a Certificate message.
    pub fn new(certificate_list: Vec<Vec<u8>>) -> Self {
        Self { certificate_list }
    }

    /// The empty "no certificate" message.
    pub fn empty() -> Self {
        Self {
            certificate_list: Vec::new(),
        }
    }

    /// Encode to bytes.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut list = BytesMut::new();
        for cert in &self.certificate_list {
            if cert.is_empty() || cert.len() > 0xFFFFFF {
                return Err(Error::InvalidMessage("certificate size out of range".into()));
            }
            list.put_uint(cert.len() as u64, 3);
            list.put_slice(cert);
        }
        if list.len() > 0xFFFFFF {
            return Err(Error::InvalidMessage("certificate list too large".into()));
        }

        let mut buf = BytesMut::with_capacity(3 + list.len());
        buf.put_uint(list.len() as u64, 3);
        buf.put_slice(&list);
        Ok(buf.to_vec())
    }

    /// Decode from bytes.
    pub fn decode(mut data: &[u8]) -> Result<Self> {
        if data.len() < 3 {
            return Err(Error::InvalidMessage("Certificate too short".into()));
        }
        let list_len = data.get_uint(3) as usize;
        if data.len() != list_len {
            return Err(Error::InvalidMessage(
                "certificate list length mismatch".into(),
            ));
        }

        let mut certificate_list = Vec::new();
        while !data.is_empty() {
            if data.len() < 3 {
                return Err(Error::InvalidMessage("truncated certificate entry".into()));
            }
            let cert_len = data.get_uint(3) as usize;
            if cert_len == 0 || data.len() < cert_len {
                return Err(Error::InvalidMessage("invalid certificate entry".into()));
            }
            certificate_list.push(data[..cert_len].to_vec());
            data.advance(cert_len);
        }

        Ok(Self { certificate_list })
    }
}
