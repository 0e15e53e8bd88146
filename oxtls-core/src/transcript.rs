//! Handshake transcript accumulation.
//!
//! Both endpoints hash the concatenation of every handshake message
//! (header included, HelloRequest and ChangeCipherSpec excluded) to
//! produce the Finished verify data and the CertificateVerify input.
//! The raw bytes are retained rather than streamed into digest
//! contexts: a message is appended exactly once, when it has been
//! fully generated or fully received, so a transport that blocks
//! mid-message never leaves a half-hashed transcript behind.

use crate::error::Result;
use oxtls_crypto::{CryptoProvider, HashAlgorithm};

/// Concatenated MD5 and SHA-1 digests of the transcript, 36 bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptDigests {
    /// MD5 digest, 16 bytes.
    pub md5: Vec<u8>,

    /// SHA-1 digest, 20 bytes.
    pub sha1: Vec<u8>,
}

impl TranscriptDigests {
    /// The MD5 digest followed by the SHA-1 digest.
    pub fn concat(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.md5.len() + self.sha1.len());
        out.extend_from_slice(&self.md5);
        out.extend_from_slice(&self.sha1);
        out
    }
}

/// Running handshake transcript.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<u8>,
}

impl Transcript {
    /// Create an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one complete handshake message, header included.
    pub fn extend(&mut self, raw: &[u8]) {
        self.messages.extend_from_slice(raw);
    }

    /// Bytes accumulated so far.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether no message has been appended yet.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Digest the current transcript with both handshake hashes.
    pub fn digests(&self, provider: &dyn CryptoProvider) -> Result<TranscriptDigests> {
        let mut md5 = provider.hash(HashAlgorithm::Md5)?;
        md5.update(&self.messages);

        let mut sha1 = provider.hash(HashAlgorithm::Sha1)?;
        sha1.update(&self.messages);

        Ok(TranscriptDigests {
            md5: md5.finalize(),
            sha1: sha1.finalize(),
        })
    }

    /// Drop everything accumulated; used when a renegotiation starts a
    /// fresh handshake on an established session.
    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxtls_crypto_mock::MockProvider;

    #[test]
    fn test_transcript_accumulates() {
        let provider = MockProvider::new();
        let mut t = Transcript::new();
        assert!(t.is_empty());

        t.extend(&[1, 0, 0, 1, 0xAA]);
        t.extend(&[2, 0, 0, 1, 0xBB]);
        assert_eq!(t.len(), 10);

        let digests = t.digests(&provider).unwrap();
        assert_eq!(digests.md5.len(), 16);
        assert_eq!(digests.sha1.len(), 20);
        assert_eq!(digests.concat().len(), 36);
    }

    #[test]
    fn test_same_bytes_same_digests() {
        let provider = MockProvider::new();

        let mut a = Transcript::new();
        a.extend(b"hello");
        a.extend(b"world");

        let mut b = Transcript::new();
        b.extend(b"helloworld");

        assert_eq!(
            a.digests(&provider).unwrap(),
            b.digests(&provider).unwrap()
        );
    }

    #[test]
    fn test_digest_order_matters() {
        let provider = MockProvider::new();

        let mut a = Transcript::new();
        a.extend(b"one");
        a.extend(b"two");

        let mut b = Transcript::new();
        b.extend(b"two");
        b.extend(b"one");

        assert_ne!(
            a.digests(&provider).unwrap(),
            b.digests(&provider).unwrap()
        );
    }

    #[test]
    fn test_clear_resets() {
        let provider = MockProvider::new();
        let mut t = Transcript::new();
        t.extend(b"stale handshake");
        t.clear();
        assert!(t.is_empty());

        let empty = Transcript::new();
        assert_eq!(
            t.digests(&provider).unwrap(),
            empty.digests(&provider).unwrap()
        );
    }
}
