//! # Mock cryptography provider for oxtls
//!
//! A deterministic, intentionally **non-cryptographic** implementation of
//! the [`oxtls_crypto`] provider interface. Every primitive is built from
//! one FNV-based mixing function: ciphers XOR a mixer keystream, digests
//! and the PRF squeeze the mixer, DH agreement is XOR over reflective
//! keypairs.
//!
//! The point is that both ends of a loopback handshake using this provider
//! derive matching keys, authenticate each other's Finished messages and
//! detect tampering, all without pulling real cryptography into the test
//! suite. Nothing here keeps secrets from an adversary.
//!
//! ```rust
//! use oxtls_crypto::{CryptoProvider, HashAlgorithm};
//! use oxtls_crypto_mock::MockProvider;
//!
//! let provider = MockProvider::new();
//! let mut hash = provider.hash(HashAlgorithm::Sha1).unwrap();
//! hash.update(b"transcript bytes");
//! assert_eq!(hash.finalize().len(), 20);
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    unreachable_pub,
    unused_qualifications,
    missing_debug_implementations
)]

mod cipher;
mod digest;
mod mix;
mod pk;
mod random;

pub use cipher::MockCipher;
pub use digest::{MockHash, MockHmac, MockPrf};
pub use pk::{MockDh, MockRsa};
pub use random::MockRandom;

use oxtls_crypto::{
    BulkCipher, CipherAlgorithm, CryptoProvider, DiffieHellman, Hash, HashAlgorithm, Hmac, Prf,
    Random, Result, Rsa,
};

/// The mock provider.
///
/// Cheap to construct and clone-free to share; handshake tests usually
/// create one and pass `&provider` to both peers.
#[derive(Debug)]
pub struct MockProvider {
    random: MockRandom,
    dh: MockDh,
    rsa: MockRsa,
    prf: MockPrf,
}

impl MockProvider {
    /// Provider with the default RNG seed.
    pub fn new() -> Self {
        Self::with_seed(0)
    }

    /// Provider with an explicit RNG seed.
    pub fn with_seed(seed: u64) -> Self {
        let random = MockRandom::with_seed(seed);
        Self {
            dh: MockDh::new(random.clone()),
            rsa: MockRsa,
            prf: MockPrf,
            random,
        }
    }

    /// Produce a matching (certificate, private key) blob pair.
    ///
    /// The mock RSA needs the public and private blobs to be identical, so
    /// this returns two copies of one random blob. Tests feed them to the
    /// server credential configuration.
    pub fn generate_credentials(&self) -> Result<(Vec<u8>, Vec<u8>)> {
        let blob = self.random.generate(48)?;
        Ok((blob.clone(), blob))
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl CryptoProvider for MockProvider {
    fn cipher(
        &self,
        algorithm: CipherAlgorithm,
        key: &[u8],
        iv: &[u8],
    ) -> Result<Box<dyn BulkCipher>> {
        Ok(Box::new(MockCipher::new(algorithm, key, iv)?))
    }

    fn hash(&self, algorithm: HashAlgorithm) -> Result<Box<dyn Hash>> {
        Ok(Box::new(MockHash::new(algorithm)))
    }

    fn hmac(&self, algorithm: HashAlgorithm, key: &[u8]) -> Result<Box<dyn Hmac>> {
        Ok(Box::new(MockHmac::new(algorithm, key)))
    }

    fn prf(&self) -> &dyn Prf {
        &self.prf
    }

    fn dh(&self) -> &dyn DiffieHellman {
        &self.dh
    }

    fn rsa(&self) -> &dyn Rsa {
        &self.rsa
    }

    fn random(&self) -> &dyn Random {
        &self.random
    }
}
