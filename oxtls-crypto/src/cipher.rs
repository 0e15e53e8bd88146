//! Bulk cipher interface.
//!
//! Record protection in SSL 3.0 / TLS 1.0 uses either a stream cipher or a
//! block cipher in CBC mode. A [`BulkCipher`] context is created once per
//! connection state with the session key and initial IV, and then processes
//! record fragments in order: stream ciphers carry their keystream position
//! across calls, CBC ciphers chain the last ciphertext block as the next IV.

use crate::Result;

/// Bulk cipher algorithms a provider may implement.
///
/// `NULL` ciphering is handled by the protocol engine itself (a connection
/// state without a cipher context), so it does not appear here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CipherAlgorithm {
    /// ARCFOUR (RC4-compatible) stream cipher, 128-bit key.
    Arcfour128,
    /// Triple DES in CBC mode, 168-bit key (24 key bytes).
    TripleDesEdeCbc,
    /// Rijndael (AES) with 128-bit key in CBC mode.
    Rijndael128Cbc,
    /// Rijndael (AES) with 256-bit key in CBC mode.
    Rijndael256Cbc,
    /// Twofish with 128-bit key in CBC mode.
    Twofish128Cbc,
}

impl CipherAlgorithm {
    /// Key size in bytes.
    pub const fn key_size(self) -> usize {
        match self {
            CipherAlgorithm::Arcfour128 => 16,
            CipherAlgorithm::TripleDesEdeCbc => 24,
            CipherAlgorithm::Rijndael128Cbc => 16,
            CipherAlgorithm::Rijndael256Cbc => 32,
            CipherAlgorithm::Twofish128Cbc => 16,
        }
    }

    /// IV size in bytes; zero for stream ciphers.
    pub const fn iv_size(self) -> usize {
        match self {
            CipherAlgorithm::Arcfour128 => 0,
            CipherAlgorithm::TripleDesEdeCbc => 8,
            CipherAlgorithm::Rijndael128Cbc => 16,
            CipherAlgorithm::Rijndael256Cbc => 16,
            CipherAlgorithm::Twofish128Cbc => 16,
        }
    }

    /// Cipher block size in bytes; 1 for stream ciphers.
    pub const fn block_size(self) -> usize {
        match self {
            CipherAlgorithm::Arcfour128 => 1,
            CipherAlgorithm::TripleDesEdeCbc => 8,
            CipherAlgorithm::Rijndael128Cbc => 16,
            CipherAlgorithm::Rijndael256Cbc => 16,
            CipherAlgorithm::Twofish128Cbc => 16,
        }
    }

    /// Whether this is a block cipher (CBC mode, needs padding).
    pub const fn is_block(self) -> bool {
        self.block_size() > 1
    }

    /// Get the algorithm name.
    pub const fn name(self) -> &'static str {
        match self {
            CipherAlgorithm::Arcfour128 => "ARCFOUR-128",
            CipherAlgorithm::TripleDesEdeCbc => "3DES-EDE-CBC",
            CipherAlgorithm::Rijndael128Cbc => "RIJNDAEL-128-CBC",
            CipherAlgorithm::Rijndael256Cbc => "RIJNDAEL-256-CBC",
            CipherAlgorithm::Twofish128Cbc => "TWOFISH-128-CBC",
        }
    }
}

/// A stateful bulk cipher context bound to one direction of a connection.
///
/// Implementations must preserve chaining state between calls: the engine
/// feeds whole record fragments in transmission order and never re-submits
/// data. For block ciphers the input length is always a multiple of the
/// block size (the record layer pads before encrypting).
pub trait BulkCipher: Send {
    /// Encrypt a fragment, returning the ciphertext.
    fn encrypt(&mut self, plaintext: &[u8]) -> Result<Vec<u8>>;

    /// Decrypt a fragment, returning the plaintext.
    fn decrypt(&mut self, ciphertext: &[u8]) -> Result<Vec<u8>>;

    /// The algorithm this context implements.
    fn algorithm(&self) -> CipherAlgorithm;
}
