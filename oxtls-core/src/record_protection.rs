//! Record protection.
//!
//! A [`ConnectionState`] holds everything one direction needs to
//! protect or unprotect records: the keyed cipher context, the MAC
//! secret, the compression context and the 64-bit sequence number.
//! Outgoing fragments are compressed, authenticated, padded and
//! encrypted, in that order; incoming fragments run the inverse.
//!
//! Every failure on the inbound crypto path collapses into
//! [`Error::BadRecordMac`]: whether the padding was wrong, the MAC did
//! not match or the cipher refused the fragment is deliberately not
//! distinguishable from the outside.

use crate::compression::CompressionContext;
use crate::error::{Error, Result};
use crate::protocol::ContentType;
use crate::record::MAX_CIPHERTEXT_SIZE;
use crate::registry::{BulkCipherAlgorithm, CompressionMethod, MacAlgorithm, TlsVersion};
use oxtls_crypto::{BulkCipher, CryptoProvider};
use zeroize::Zeroizing;

/// Directional record protection state.
///
/// Superseded, never mutated, on a cipher change: the handshake builds
/// a fresh pending state and swaps it in when ChangeCipherSpec takes
/// effect on that direction. The sequence number therefore restarts at
/// zero with every key change.
pub struct ConnectionState {
    cipher: Option<Box<dyn BulkCipher>>,
    mac_algorithm: Option<oxtls_crypto::HashAlgorithm>,
    mac_secret: Zeroizing<Vec<u8>>,
    compression: CompressionContext,
    sequence_number: u64,
}

impl core::fmt::Debug for ConnectionState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ConnectionState")
            .field("cipher", &self.cipher.as_ref().map(|c| c.algorithm()))
            .field("mac_algorithm", &self.mac_algorithm)
            .field("compression", &self.compression.method())
            .field("sequence_number", &self.sequence_number)
            .finish()
    }
}

impl ConnectionState {
    /// The unprotected state both directions start in: null cipher,
    /// null MAC, null compression.
    pub fn plaintext() -> Self {
        Self {
            cipher: None,
            mac_algorithm: None,
            mac_secret: Zeroizing::new(Vec::new()),
            compression: CompressionContext::Null,
            sequence_number: 0,
        }
    }

    /// Build a keyed state for one direction.
    pub fn new(
        provider: &dyn CryptoProvider,
        cipher_algorithm: BulkCipherAlgorithm,
        mac_algorithm: MacAlgorithm,
        compression: CompressionMethod,
        cipher_key: &[u8],
        iv: &[u8],
        mac_secret: &[u8],
    ) -> Result<Self> {
        let cipher = match cipher_algorithm.to_provider() {
            Some(algorithm) => Some(provider.cipher(algorithm, cipher_key, iv)?),
            None => None,
        };

        Ok(Self {
            cipher,
            mac_algorithm: mac_algorithm.to_provider(),
            mac_secret: Zeroizing::new(mac_secret.to_vec()),
            compression: CompressionContext::new(compression)?,
            sequence_number: 0,
        })
    }

    /// Sequence number of the next record on this direction.
    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    fn bump_sequence(&mut self) -> Result<()> {
        self.sequence_number = self.sequence_number.checked_add(1).ok_or_else(|| {
            Error::ResourceExhausted("record sequence number space exhausted".into())
        })?;
        Ok(())
    }

    /// MAC header: sequence number, content type, version, length.
    fn mac_header(
        &self,
        content_type: ContentType,
        version: TlsVersion,
        length: usize,
    ) -> Result<[u8; 13]> {
        let (major, minor) = version
            .wire()
            .ok_or_else(|| Error::InternalError("unregistered protocol version".into()))?;

        let mut header = [0u8; 13];
        header[..8].copy_from_slice(&self.sequence_number.to_be_bytes());
        header[8] = content_type.to_u8();
        header[9] = major;
        header[10] = minor;
        header[11..13].copy_from_slice(&(length as u16).to_be_bytes());
        Ok(header)
    }

    fn compute_mac(
        &self,
        provider: &dyn CryptoProvider,
        content_type: ContentType,
        version: TlsVersion,
        fragment: &[u8],
    ) -> Result<Option<Box<dyn oxtls_crypto::Hmac>>> {
        let algorithm = match self.mac_algorithm {
            Some(a) => a,
            None => return Ok(None),
        };
        let header = self.mac_header(content_type, version, fragment.len())?;
        let mut hmac = provider.hmac(algorithm, &self.mac_secret)?;
        hmac.update(&header);
        hmac.update(fragment);
        Ok(Some(hmac))
    }

    /// Protect one outgoing fragment: compress, MAC, pad, encrypt.
    pub fn protect(
        &mut self,
        provider: &dyn CryptoProvider,
        content_type: ContentType,
        version: TlsVersion,
        fragment: &[u8],
    ) -> Result<Vec<u8>> {
        let compressed = self.compression.compress(fragment)?;

        let mut content = compressed;
        if let Some(hmac) = self.compute_mac(provider, content_type, version, &content)? {
            content.extend_from_slice(&hmac.finalize());
        }

        let protected = match &mut self.cipher {
            Some(cipher) => {
                let block = cipher.algorithm().block_size();
                if block > 1 {
                    apply_padding(&mut content, block);
                }
                cipher.encrypt(&content)?
            }
            None => content,
        };

        if protected.len() > MAX_CIPHERTEXT_SIZE {
            return Err(Error::RecordOverflow);
        }

        self.bump_sequence()?;
        Ok(protected)
    }

    /// Unprotect one incoming fragment: decrypt, unpad, verify MAC,
    /// decompress.
    pub fn unprotect(
        &mut self,
        provider: &dyn CryptoProvider,
        content_type: ContentType,
        version: TlsVersion,
        fragment: &[u8],
    ) -> Result<Vec<u8>> {
        let mac_size = self.mac_algorithm.map(|a| a.output_size()).unwrap_or(0);

        let mut content = match &mut self.cipher {
            Some(cipher) => {
                let block = cipher.algorithm().block_size();
                if block > 1 && (fragment.is_empty() || fragment.len() % block != 0) {
                    return Err(Error::BadRecordMac);
                }
                let plaintext = cipher.decrypt(fragment).map_err(|_| Error::BadRecordMac)?;
                if block > 1 {
                    strip_padding(plaintext, mac_size)?
                } else {
                    plaintext
                }
            }
            None => fragment.to_vec(),
        };

        if content.len() < mac_size {
            return Err(Error::BadRecordMac);
        }
        let received_mac = content.split_off(content.len() - mac_size);

        if let Some(hmac) = self.compute_mac(provider, content_type, version, &content)? {
            if !hmac.verify(&received_mac) {
                tracing::debug!(sequence = self.sequence_number, "record MAC mismatch");
                return Err(Error::BadRecordMac);
            }
        }

        let decompressed = self.compression.decompress(&content)?;

        self.bump_sequence()?;
        Ok(decompressed)
    }
}

/// Append CBC padding: `pad_len + 1` trailing bytes, each holding
/// `pad_len`, bringing the length to a block multiple.
fn apply_padding(content: &mut Vec<u8>, block: usize) {
    let pad_len = block - 1 - (content.len() % block);
    content.resize(content.len() + pad_len + 1, pad_len as u8);
}

/// Strip and check CBC padding. Every padding byte must equal the
/// length byte; any deviation reports the same generic failure as a
/// MAC mismatch.
fn strip_padding(mut plaintext: Vec<u8>, mac_size: usize) -> Result<Vec<u8>> {
    let total = plaintext.len();
    if total == 0 {
        return Err(Error::BadRecordMac);
    }

    let pad_len = plaintext[total - 1] as usize;
    if total < pad_len + 1 + mac_size {
        return Err(Error::BadRecordMac);
    }

    let pad_start = total - pad_len - 1;
    if plaintext[pad_start..].iter().any(|&b| b != pad_len as u8) {
        return Err(Error::BadRecordMac);
    }

    plaintext.truncate(pad_start);
    Ok(plaintext)
}
