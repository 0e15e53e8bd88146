//! # oxtls cryptographic provider interface
//!
//! This crate defines the cryptographic abstraction layer for oxtls. The
//! protocol engine consumes primitives exclusively through these traits;
//! it ships no algorithm implementations of its own.
//!
//! ## Architecture
//!
//! ```text
//! CryptoProvider (main trait)
//! ├── BulkCipher (record ciphers: ARCFOUR, 3DES/RIJNDAEL/TWOFISH in CBC)
//! ├── Hash (MD5, SHA-1 transcript digests)
//! ├── Hmac (record authentication)
//! ├── Prf (TLS PRF for all key derivation)
//! ├── DiffieHellman (DH premaster agreement over explicit groups)
//! ├── Rsa (premaster key transport, transcript signatures)
//! └── Random (hello randoms, session IDs, ephemeral keys)
//! ```
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use oxtls_crypto::{CipherAlgorithm, CryptoProvider, Error};
//!
//! fn example(provider: &dyn CryptoProvider) -> Result<(), Error> {
//!     let mut cipher =
//!         provider.cipher(CipherAlgorithm::Rijndael128Cbc, &key, &iv)?;
//!     let ciphertext = cipher.encrypt(&padded_fragment)?;
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    unreachable_pub,
    unused_qualifications,
    missing_debug_implementations
)]

pub mod cipher;
pub mod dh;
pub mod error;
pub mod hash;
pub mod hmac;
pub mod prf;
pub mod random;
pub mod rsa;

pub use cipher::{BulkCipher, CipherAlgorithm};
pub use dh::{DhKeyPair, DhParams, DiffieHellman};
pub use error::{Error, Result};
pub use hash::{Hash, HashAlgorithm};
pub use hmac::Hmac;
pub use prf::Prf;
pub use random::Random;
pub use rsa::Rsa;

/// The main cryptographic provider trait.
///
/// Implementations supply every primitive the protocol engine needs. The
/// trait is object-safe; the engine passes `&dyn CryptoProvider` through
/// its handshake and record paths.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` so one provider can serve
/// many sessions.
pub trait CryptoProvider: Send + Sync {
    /// Create a bulk cipher context keyed for one direction.
    ///
    /// # Arguments
    ///
    /// * `algorithm` - The cipher to instantiate
    /// * `key` - Session key, `algorithm.key_size()` bytes
    /// * `iv` - Initial IV, `algorithm.iv_size()` bytes (empty for stream
    ///   ciphers)
    ///
    /// # Errors
    ///
    /// Returns an error if the algorithm is unsupported or the key/IV
    /// sizes do not match.
    fn cipher(
        &self,
        algorithm: CipherAlgorithm,
        key: &[u8],
        iv: &[u8],
    ) -> Result<Box<dyn BulkCipher>>;

    /// Get a hash function instance.
    fn hash(&self, algorithm: HashAlgorithm) -> Result<Box<dyn Hash>>;

    /// Get an HMAC instance keyed with `key`.
    fn hmac(&self, algorithm: HashAlgorithm, key: &[u8]) -> Result<Box<dyn Hmac>>;

    /// Get the TLS pseudo-random function.
    fn prf(&self) -> &dyn Prf;

    /// Get the Diffie-Hellman implementation.
    fn dh(&self) -> &dyn DiffieHellman;

    /// Get the RSA implementation.
    fn rsa(&self) -> &dyn Rsa;

    /// Get the random number generator.
    fn random(&self) -> &dyn Random;

    /// Check whether the provider supports a specific bulk cipher.
    ///
    /// Lets the engine skip offering suites a provider cannot key. The
    /// default probes with an all-zero key of the right size.
    fn supports_cipher(&self, algorithm: CipherAlgorithm) -> bool {
        let key = vec![0u8; algorithm.key_size()];
        let iv = vec![0u8; algorithm.iv_size()];
        self.cipher(algorithm, &key, &iv).is_ok()
    }
}
