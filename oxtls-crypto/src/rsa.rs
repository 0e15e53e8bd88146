//! RSA operations on opaque key material.
//!
//! Certificate parsing is out of scope for the engine, so keys cross this
//! boundary as opaque blobs in whatever encoding the provider understands.
//! The engine never looks inside them; it only moves them between the
//! credential configuration, the wire, and these calls.

use crate::Result;
use zeroize::Zeroizing;

/// RSA key transport and signatures.
///
/// Covers the two RSA uses in an SSL 3.0 / TLS 1.0 handshake: encrypting
/// the premaster secret to the server's certified key (PKCS#1 v1.5 key
/// transport), and signing transcript digests for CertificateVerify and
/// signed ServerKeyExchange messages.
pub trait Rsa: Send + Sync {
    /// Encrypt `plaintext` to the peer's public key.
    fn encrypt(&self, public_key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>>;

    /// Decrypt `ciphertext` with our private key.
    ///
    /// # Errors
    ///
    /// Any malformed padding or wrong-key condition must collapse into
    /// [`crate::Error::DecryptionFailed`] with no further detail; the
    /// engine relies on that to keep decryption failures
    /// indistinguishable.
    fn decrypt(&self, private_key: &[u8], ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>>;

    /// Sign a digest with our private key.
    fn sign(&self, private_key: &[u8], digest: &[u8]) -> Result<Vec<u8>>;

    /// Verify a signature over `digest` against the peer's public key.
    fn verify(&self, public_key: &[u8], digest: &[u8], signature: &[u8]) -> bool;
}
