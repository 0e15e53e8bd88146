//! CertificateRequest message.

use crate::error::{Error, Result};
use bytes::{Buf, BufMut, BytesMut};

/// Certificate type asking for RSA signing certificates.
pub const CERT_TYPE_RSA_SIGN: u8 = 1;

/// Certificate type asking for DSS signing certificates.
pub const CERT_TYPE_DSS_SIGN: u8 = 2;

/// CertificateRequest message.
///
/// ```text
/// struct {
///     ClientCertificateType certificate_types<1..2^8-1>;
///     DistinguishedName certificate_authorities<3..2^16-1>;
/// } CertificateRequest;
/// ```
///
/// Authority names are opaque DER blobs, like everything X.509 here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateRequest {
    /// Acceptable certificate types.
    pub certificate_types: Vec<u8>,

    /// Acceptable certificate authorities as encoded names.
    pub certificate_authorities: Vec<Vec<u8>>,
}

impl CertificateRequest {
    /// Create a CertificateRequest.
    pub fn new(certificate_types: Vec<u8>, certificate_authorities: Vec<Vec<u8>>) -> Self {
        Self {
            certificate_types,
            certificate_authorities,
        }
    }

    /// Encode to bytes.
    pub fn encode(&self) -> Result<Vec<u8>> {
        if self.certificate_types.is_empty() || self.certificate_types.len() > 255 {
            return Err(Error::InvalidMessage(
                "certificate type count out of range".into(),
            ));
        }

        let mut names = BytesMut::new();
        for authority in &self.certificate_authorities {
            if authority.is_empty() || authority.len() > 0xFFFF {
                return Err(Error::InvalidMessage("authority name out of range".into()));
            }
            names.put_u16(authority.len() as u16);
            names.put_slice(authority);
        }
        if names.len() > 0xFFFF {
            return Err(Error::InvalidMessage("authority list too large".into()));
        }

        let mut buf = BytesMut::new();
        buf.put_u8(self.certificate_types.len() as u8);
        buf.put_slice(&self.certificate_types);
        buf.put_u16(names.len() as u16);
        buf.put_slice(&names);
        Ok(buf.to_vec())
    }

    /// Decode from bytes.
    pub fn decode(mut data: &[u8]) -> Result<Self> {
        if data.is_empty() {
            return Err(Error::InvalidMessage("CertificateRequest too short".into()));
        }
        let types_len = data.get_u8() as usize;
        if types_len == 0 || data.len() < types_len {
            return Err(Error::InvalidMessage("invalid certificate types".into()));
        }
        let certificate_types = data[..types_len].to_vec();
        data.advance(types_len);

        if data.len() < 2 {
            return Err(Error::InvalidMessage("missing authority list length".into()));
        }
        let names_len = data.get_u16() as usize;
        if data.len() != names_len {
            return Err(Error::InvalidMessage(
                "authority list length mismatch".into(),
            ));
        }

        let mut certificate_authorities = Vec::new();
        while !data.is_empty() {
            if data.len() < 2 {
                return Err(Error::InvalidMessage("truncated authority name".into()));
            }
            let name_len = data.get_u16() as usize;
            if name_len == 0 || data.len() < name_len {
                return Err(Error::InvalidMessage("invalid authority name".into()));
            }
            certificate_authorities.push(data[..name_len].to_vec());
            data.advance(name_len);
        }

        Ok(Self {
            certificate_types,
            certificate_authorities,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_round_trip() {
        let msg = CertificateRequest::new(
            vec![CERT_TYPE_RSA_SIGN, CERT_TYPE_DSS_SIGN],
            vec![vec![0x30, 0x10, 0xAA], vec![0x30, 0x05]],
        );
        let decoded = CertificateRequest::decode(&msg.encode().unwrap()).unwrap();
        assert_eq!(decoded, msg);
    }

    #[test]
    fn test_no_authorities() {
        let msg = CertificateRequest::new(vec![CERT_TYPE_RSA_SIGN], Vec::new());
        let encoded = msg.encode().unwrap();
        assert_eq!(encoded, vec![1, CERT_TYPE_RSA_SIGN, 0, 0]);

        let decoded = CertificateRequest::decode(&encoded).unwrap();
        assert!(decoded.certificate_authorities.is_empty());
    }

    #[test]
    fn test_rejects_malformed() {
        // No certificate types.
        assert!(CertificateRequest::decode(&[0, 0, 0]).is_err());
        // Authority list length mismatch.
        assert!(CertificateRequest::decode(&[1, 1, 0, 5, 0, 1, 0xAA]).is_err());
        // Empty message.
        assert!(CertificateRequest::decode(&[]).is_err());
    }
}
