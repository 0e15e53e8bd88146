//! Pseudo-random function interface.

use crate::Result;

/// The TLS pseudo-random function.
///
/// All key derivation flows through this single expansion primitive
/// (RFC 2246 section 5): the master secret from the premaster, the key
/// block from the master secret, and the Finished verify data from the
/// transcript digests. Providers implement the split-secret
/// P_MD5 XOR P_SHA1 construction; the engine only supplies secret, label,
/// seed and the wanted output length.
pub trait Prf: Send + Sync {
    /// Expand `secret` under `label` and `seed` to `output_len` bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if `output_len` is zero or beyond the provider's
    /// expansion range.
    fn derive(&self, secret: &[u8], label: &[u8], seed: &[u8], output_len: usize)
        -> Result<Vec<u8>>;
}
