//! Diffie-Hellman key agreement interface.

use crate::Result;
use zeroize::Zeroizing;

/// Explicit Diffie-Hellman group parameters.
///
/// The server chooses the group and ships it in the ServerKeyExchange
/// message, so parameters are plain big-endian byte strings rather than
/// named groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DhParams {
    /// The prime modulus `p`.
    pub prime: Vec<u8>,
    /// The generator `g`.
    pub generator: Vec<u8>,
}

/// A generated Diffie-Hellman keypair.
///
/// The private value is wiped on drop.
#[derive(Debug)]
pub struct DhKeyPair {
    /// Public value `g^x mod p`, big-endian.
    pub public: Vec<u8>,
    /// Private exponent `x`.
    pub private: Zeroizing<Vec<u8>>,
}

/// Diffie-Hellman trait.
///
/// Used by the DH family of key exchanges (anonymous, fixed and
/// ephemeral) to produce the premaster secret.
pub trait DiffieHellman: Send + Sync {
    /// Generate a fresh keypair for the given group.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters do not describe a usable group.
    fn generate(&self, params: &DhParams) -> Result<DhKeyPair>;

    /// Compute the shared secret from the peer's public value and our
    /// private exponent.
    ///
    /// The result is the premaster secret for DH key exchanges. It is
    /// returned wiped-on-drop; callers must not copy it into unwiped
    /// buffers.
    fn compute(
        &self,
        params: &DhParams,
        peer_public: &[u8],
        private: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>>;
}
