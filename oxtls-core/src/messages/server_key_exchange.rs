//! ServerKeyExchange message.

use crate::error::{Error, Result};
use bytes::{Buf, BufMut, BytesMut};

/// Ephemeral Diffie-Hellman group and server public value.
///
/// ```text
/// struct {
///     opaque dh_p<1..2^16-1>;
///     opaque dh_g<1..2^16-1>;
///     opaque dh_Ys<1..2^16-1>;
/// } ServerDHParams;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerDhParams {
    /// Prime modulus, big-endian.
    pub prime: Vec<u8>,

    /// Generator, big-endian.
    pub generator: Vec<u8>,

    /// Server public value Ys, big-endian.
    pub public: Vec<u8>,
}

/// ServerKeyExchange message.
///
/// Sent when the negotiated key exchange delivers a DH public value.
/// The signature covers the hellos' randoms and the params; it is
/// absent for anonymous key exchange and present (two-byte length
/// prefixed) otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerKeyExchange {
    /// DH group and public value.
    pub params: ServerDhParams,

    /// Signature over the randoms and params; `None` when anonymous.
    pub signature: Option<Vec<u8>>,
}

fn put_vector(buf: &mut BytesMut, data: &[u8]) -> Result<()> {
    if data.is_empty() || data.len() > 0xFFFF {
        return Err(Error::InvalidMessage("DH integer size out of range".into()));
    }
    buf.put_u16(data.len() as u16);
    buf.put_slice(data);
    Ok(())
}

fn get_vector(data: &mut &[u8]) -> Result<Vec<u8>> {
    if data.len() < 2 {
        return Err(Error::InvalidMessage("truncated length prefix".into()));
    }
    let len = data.get_u16() as usize;
    if len == 0 || data.len() < len {
        return Err(Error::InvalidMessage("truncated vector".into()));
    }
    let out = data[..len].to_vec();
    data.advance(len);
    Ok(out)
}

impl ServerKeyExchange {
    /// Create an unsigned (anonymous) ServerKeyExchange.
    pub fn anonymous(params: ServerDhParams) -> Self {
        Self {
            params,
            signature: None,
        }
    }

    /// Create a signed ServerKeyExchange.
    pub fn signed(params: ServerDhParams, signature: Vec<u8>) -> Self {
        Self {
            params,
            signature: Some(signature),
        }
    }

    /// The byte span the signature covers, excluding the randoms.
    ///
    /// Callers prepend the client and server randoms before signing or
    /// verifying.
    pub fn signed_params(&self) -> Result<Vec<u8>> {
        let mut buf = BytesMut::new();
        put_vector(&mut buf, &self.params.prime)?;
        put_vector(&mut buf, &self.params.generator)?;
        put_vector(&mut buf, &self.params.public)?;
        Ok(buf.to_vec())
    }

    /// Encode to bytes.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut buf = BytesMut::new();
        put_vector(&mut buf, &self.params.prime)?;
        put_vector(&mut buf, &self.params.generator)?;
        put_vector(&mut buf, &self.params.public)?;
        if let Some(signature) = &self.signature {
            put_vector(&mut buf, signature)?;
        }
        Ok(buf.to_vec())
    }

    /// Decode from bytes.
    ///
    /// `signed` states whether the negotiated key exchange requires a
    /// signature; the wire format alone cannot distinguish a signed
    /// message from an anonymous one.
    pub fn decode(mut data: &[u8], signed: bool) -> Result<Self> {
        let prime = get_vector(&mut data)?;
        let generator = get_vector(&mut data)?;
        let public = get_vector(&mut data)?;

        let signature = if signed {
            Some(get_vector(&mut data)?)
        } else {
            None
        };

        if !data.is_empty() {
            return Err(Error::InvalidMessage(
                "trailing bytes in ServerKeyExchange".into(),
            ));
        }

        Ok(Self {
            params: ServerDhParams {
                prime,
                generator,
                public,
            },
            signature,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> ServerDhParams {
        ServerDhParams {
            prime: vec![0xFF; 64],
            generator: vec![2],
            public: vec![0x42; 64],
        }
    }

    #[test]
    fn test_anonymous_round_trip() {
        let msg = ServerKeyExchange::anonymous(params());
        let encoded = msg.encode().unwrap();
        let decoded = ServerKeyExchange::decode(&encoded, false).unwrap();
        assert_eq!(decoded, msg);
        assert!(decoded.signature.is_none());
    }

    #[test]
    fn test_signed_round_trip() {
        let msg = ServerKeyExchange::signed(params(), vec![7; 48]);
        let encoded = msg.encode().unwrap();
        let decoded = ServerKeyExchange::decode(&encoded, true).unwrap();
        assert_eq!(decoded, msg);
    }

    #[test]
    fn test_signed_params_excludes_signature() {
        let anon = ServerKeyExchange::anonymous(params());
        let signed = ServerKeyExchange::signed(params(), vec![7; 48]);
        assert_eq!(anon.signed_params().unwrap(), signed.signed_params().unwrap());
        assert_eq!(anon.signed_params().unwrap(), anon.encode().unwrap());
    }

    #[test]
    fn test_signature_expectation_enforced() {
        let anon_wire = ServerKeyExchange::anonymous(params()).encode().unwrap();
        // Expecting a signature where none follows.
        assert!(ServerKeyExchange::decode(&anon_wire, true).is_err());

        let signed_wire = ServerKeyExchange::signed(params(), vec![7; 48])
            .encode()
            .unwrap();
        // Signature bytes left over when none was expected.
        assert!(ServerKeyExchange::decode(&signed_wire, false).is_err());
    }

    #[test]
    fn test_rejects_empty_integer() {
        let msg = ServerKeyExchange::anonymous(ServerDhParams {
            prime: Vec::new(),
            generator: vec![2],
            public: vec![1],
        });
        assert!(msg.encode().is_err());
        assert!(ServerKeyExchange::decode(&[0, 0, 0, 1, 2], false).is_err());
    }
}
