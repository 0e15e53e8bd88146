//! Record framing.
//!
//! Every byte on the wire travels inside a record with a five-byte
//! header: content type, protocol major, protocol minor, and a two-byte
//! big-endian length. Plaintext fragments are capped at 2^14 bytes;
//! protection may grow a fragment by at most 2048 bytes (MAC plus
//! padding), and anything longer is rejected before it reaches the
//! crypto.

use crate::error::{Error, Result};
use crate::protocol::ContentType;
use crate::registry::TlsVersion;

/// Record header size in bytes.
pub const RECORD_HEADER_SIZE: usize = 5;

/// Maximum plaintext fragment size.
pub const MAX_FRAGMENT_SIZE: usize = 16384;

/// Maximum protected fragment size.
pub const MAX_CIPHERTEXT_SIZE: usize = MAX_FRAGMENT_SIZE + 2048;

/// One TLS record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Content type.
    pub content_type: ContentType,

    /// Protocol version in the header.
    pub version: TlsVersion,

    /// Fragment bytes.
    pub fragment: Vec<u8>,
}

impl Record {
    /// Create a record.
    pub fn new(content_type: ContentType, version: TlsVersion, fragment: Vec<u8>) -> Self {
        Self {
            content_type,
            version,
            fragment,
        }
    }

    /// Encoded size, header included.
    pub fn len(&self) -> usize {
        RECORD_HEADER_SIZE + self.fragment.len()
    }

    /// Whether the fragment is empty.
    pub fn is_empty(&self) -> bool {
        self.fragment.is_empty()
    }

    /// Encode the record, header first.
    pub fn encode(&self) -> Result<Vec<u8>> {
        if self.fragment.len() > MAX_CIPHERTEXT_SIZE {
            return Err(Error::RecordOverflow);
        }
        let (major, minor) = self
            .version
            .wire()
            .ok_or_else(|| Error::InternalError("unregistered protocol version".into()))?;

        let mut buf = Vec::with_capacity(self.len());
        buf.push(self.content_type.to_u8());
        buf.push(major);
        buf.push(minor);
        buf.extend_from_slice(&(self.fragment.len() as u16).to_be_bytes());
        buf.extend_from_slice(&self.fragment);
        Ok(buf)
    }

    /// Try to parse one record from the front of `data`.
    ///
    /// Returns `None` when the buffer holds less than a full record;
    /// the caller keeps the bytes and retries after the next read. On
    /// success the second element is the number of bytes consumed.
    pub fn parse(data: &[u8]) -> Result<Option<(Record, usize)>> {
        if data.len() < RECORD_HEADER_SIZE {
            return Ok(None);
        }

        let content_type = ContentType::from_u8(data[0])
            .ok_or_else(|| Error::InvalidMessage(format!("unknown content type {}", data[0])))?;
        let version = TlsVersion::from_wire(data[1], data[2])
            .ok_or(Error::VersionNotSupported(data[1], data[2]))?;
        let length = u16::from_be_bytes([data[3], data[4]]) as usize;

        if length > MAX_CIPHERTEXT_SIZE {
            return Err(Error::RecordOverflow);
        }
        if data.len() < RECORD_HEADER_SIZE + length {
            return Ok(None);
        }

        let fragment = data[RECORD_HEADER_SIZE..RECORD_HEADER_SIZE + length].to_vec();
        Ok(Some((
            Record {
                content_type,
                version,
                fragment,
            },
            RECORD_HEADER_SIZE + length,
        )))
    }
}

/// Split `data` into plaintext records no larger than the fragment cap.
///
/// Empty input produces no records.
pub fn fragment_data(
    content_type: ContentType,
    version: TlsVersion,
    data: &[u8],
) -> Vec<Record> {
    data.chunks(MAX_FRAGMENT_SIZE)
        .map(|chunk| Record::new(content_type, version, chunk.to_vec()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_encode_parse_round_trip() {
        let record = Record::new(
            ContentType::Handshake,
            TlsVersion::Tls1,
            vec![1, 2, 3, 4],
        );

        let encoded = record.encode().unwrap();
        assert_eq!(encoded.len(), RECORD_HEADER_SIZE + 4);
        assert_eq!(&encoded[..5], &[22, 3, 1, 0, 4]);

        let (parsed, consumed) = Record::parse(&encoded).unwrap().unwrap();
        assert_eq!(consumed, encoded.len());
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_ssl3_header_version() {
        let record = Record::new(ContentType::Alert, TlsVersion::Ssl3, vec![2, 40]);
        let encoded = record.encode().unwrap();
        assert_eq!(&encoded[..5], &[21, 3, 0, 0, 2]);
    }

    #[test]
    fn test_parse_incomplete() {
        let record = Record::new(ContentType::Handshake, TlsVersion::Tls1, vec![0; 32]);
        let encoded = record.encode().unwrap();

        assert!(Record::parse(&encoded[..3]).unwrap().is_none());
        assert!(Record::parse(&encoded[..encoded.len() - 1]).unwrap().is_none());
    }

    #[test]
    fn test_parse_trailing_bytes_left() {
        let a = Record::new(ContentType::Handshake, TlsVersion::Tls1, vec![1]);
        let b = Record::new(ContentType::ApplicationData, TlsVersion::Tls1, vec![2]);

        let mut wire = a.encode().unwrap();
        wire.extend_from_slice(&b.encode().unwrap());

        let (first, consumed) = Record::parse(&wire).unwrap().unwrap();
        assert_eq!(first, a);
        let (second, _) = Record::parse(&wire[consumed..]).unwrap().unwrap();
        assert_eq!(second, b);
    }

    #[test]
    fn test_unknown_content_type_rejected() {
        let err = Record::parse(&[99, 3, 1, 0, 0]).unwrap_err();
        assert!(matches!(err, Error::InvalidMessage(_)));
    }

    #[test]
    fn test_unknown_version_rejected() {
        let err = Record::parse(&[22, 3, 3, 0, 0]).unwrap_err();
        assert_eq!(err, Error::VersionNotSupported(3, 3));
    }

    #[test]
    fn test_oversized_length_rejected() {
        let len = (MAX_CIPHERTEXT_SIZE + 1) as u16;
        let mut header = vec![23, 3, 1];
        header.extend_from_slice(&len.to_be_bytes());
        let err = Record::parse(&header).unwrap_err();
        assert_eq!(err, Error::RecordOverflow);

        let record = Record::new(
            ContentType::ApplicationData,
            TlsVersion::Tls1,
            vec![0; MAX_CIPHERTEXT_SIZE + 1],
        );
        assert_eq!(record.encode().unwrap_err(), Error::RecordOverflow);
    }

    #[test]
    fn test_fragmentation() {
        let data = vec![0u8; MAX_FRAGMENT_SIZE + 100];
        let records = fragment_data(ContentType::ApplicationData, TlsVersion::Tls1, &data);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].fragment.len(), MAX_FRAGMENT_SIZE);
        assert_eq!(records[1].fragment.len(), 100);

        assert!(fragment_data(ContentType::ApplicationData, TlsVersion::Tls1, &[]).is_empty());
    }
}
