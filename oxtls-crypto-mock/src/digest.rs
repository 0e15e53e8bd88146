//! Mock hash, HMAC and PRF built on the shared mixer.

use oxtls_crypto::{Error, Hash, HashAlgorithm, Hmac, Prf, Result};

use crate::mix::squeeze;

/// Buffering mock hash. Output length matches the real algorithm so the
/// engine's size arithmetic is exercised for real.
pub struct MockHash {
    algorithm: HashAlgorithm,
    buffer: Vec<u8>,
}

impl std::fmt::Debug for MockHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockHash")
            .field("algorithm", &self.algorithm)
            .field("buffered", &self.buffer.len())
            .finish()
    }
}

impl MockHash {
    pub(crate) fn new(algorithm: HashAlgorithm) -> Self {
        Self {
            algorithm,
            buffer: Vec::new(),
        }
    }
}

impl Hash for MockHash {
    fn update(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        squeeze(
            &[b"hash", self.algorithm.name().as_bytes(), &self.buffer],
            self.algorithm.output_size(),
        )
    }

    fn output_size(&self) -> usize {
        self.algorithm.output_size()
    }

    fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }
}

/// Buffering mock HMAC.
pub struct MockHmac {
    algorithm: HashAlgorithm,
    key: Vec<u8>,
    buffer: Vec<u8>,
}

impl std::fmt::Debug for MockHmac {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockHmac")
            .field("algorithm", &self.algorithm)
            .field("buffered", &self.buffer.len())
            .finish()
    }
}

impl MockHmac {
    pub(crate) fn new(algorithm: HashAlgorithm, key: &[u8]) -> Self {
        Self {
            algorithm,
            key: key.to_vec(),
            buffer: Vec::new(),
        }
    }
}

impl Hmac for MockHmac {
    fn update(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        squeeze(
            &[
                b"hmac",
                self.algorithm.name().as_bytes(),
                &self.key,
                &self.buffer,
            ],
            self.algorithm.output_size(),
        )
    }

    fn output_size(&self) -> usize {
        self.algorithm.output_size()
    }

    fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }
}

/// Mock PRF. Label separation works the same way as in the real PRF, so
/// "master secret" and "key expansion" derivations never collide.
#[derive(Debug, Default)]
pub struct MockPrf;

impl Prf for MockPrf {
    fn derive(
        &self,
        secret: &[u8],
        label: &[u8],
        seed: &[u8],
        output_len: usize,
    ) -> Result<Vec<u8>> {
        if output_len == 0 {
            return Err(Error::InvalidLength);
        }
        Ok(squeeze(&[b"prf", secret, label, seed], output_len))
    }
}
