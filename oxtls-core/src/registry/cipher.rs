//! Bulk cipher registry.

use super::canonical_name;

/// Bulk cipher algorithm identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BulkCipherAlgorithm {
    /// No encryption (1)
    Null = 1,

    /// ARCFOUR stream cipher, 128-bit key (2)
    Arcfour = 2,

    /// Triple DES EDE in CBC mode (3)
    TripleDes = 3,

    /// Rijndael with 128-bit key in CBC mode (4)
    Rijndael = 4,

    /// Twofish with 128-bit key in CBC mode (5)
    Twofish = 5,

    /// Rijndael with 256-bit key in CBC mode (6)
    Rijndael256 = 6,
}

struct CipherEntry {
    algorithm: BulkCipherAlgorithm,
    name: &'static str,
    block_size: usize,
    key_size: usize,
    is_block: bool,
    iv_size: usize,
}

/// One row per cipher; attribute values line up with what the record
/// layer and key schedule assume about each algorithm.
const CIPHER_TABLE: &[CipherEntry] = &[
    CipherEntry {
        algorithm: BulkCipherAlgorithm::TripleDes,
        name: "3DES_EDE_CBC",
        block_size: 8,
        key_size: 24,
        is_block: true,
        iv_size: 8,
    },
    CipherEntry {
        algorithm: BulkCipherAlgorithm::Rijndael,
        name: "RIJNDAEL_128_CBC",
        block_size: 16,
        key_size: 16,
        is_block: true,
        iv_size: 16,
    },
    CipherEntry {
        algorithm: BulkCipherAlgorithm::Rijndael256,
        name: "RIJNDAEL_256_CBC",
        block_size: 16,
        key_size: 32,
        is_block: true,
        iv_size: 16,
    },
    CipherEntry {
        algorithm: BulkCipherAlgorithm::Twofish,
        name: "TWOFISH_128_CBC",
        block_size: 16,
        key_size: 16,
        is_block: true,
        iv_size: 16,
    },
    CipherEntry {
        algorithm: BulkCipherAlgorithm::Arcfour,
        name: "ARCFOUR_128",
        block_size: 1,
        key_size: 16,
        is_block: false,
        iv_size: 0,
    },
    CipherEntry {
        algorithm: BulkCipherAlgorithm::Null,
        name: "NULL",
        block_size: 1,
        key_size: 0,
        is_block: false,
        iv_size: 0,
    },
];

impl BulkCipherAlgorithm {
    /// Create from the numeric identifier.
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(BulkCipherAlgorithm::Null),
            2 => Some(BulkCipherAlgorithm::Arcfour),
            3 => Some(BulkCipherAlgorithm::TripleDes),
            4 => Some(BulkCipherAlgorithm::Rijndael),
            5 => Some(BulkCipherAlgorithm::Twofish),
            6 => Some(BulkCipherAlgorithm::Rijndael256),
            _ => None,
        }
    }

    /// Convert to the numeric identifier.
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    fn entry(self) -> Option<&'static CipherEntry> {
        CIPHER_TABLE.iter().find(|e| e.algorithm == self)
    }

    /// Whether the identifier is registered.
    pub fn is_valid(self) -> bool {
        self.entry().is_some()
    }

    /// Cipher block size in bytes; 1 for stream ciphers.
    pub fn block_size(self) -> Option<usize> {
        self.entry().map(|e| e.block_size)
    }

    /// Key material size in bytes.
    pub fn key_size(self) -> Option<usize> {
        self.entry().map(|e| e.key_size)
    }

    /// IV size in bytes; 0 for stream ciphers.
    pub fn iv_size(self) -> Option<usize> {
        self.entry().map(|e| e.iv_size)
    }

    /// Whether this is a block cipher needing CBC padding.
    pub fn is_block(self) -> Option<bool> {
        self.entry().map(|e| e.is_block)
    }

    /// Registered display name.
    pub fn name(self) -> Option<&'static str> {
        self.entry().map(|e| e.name)
    }

    /// Canonical (lowercase, hyphenated) name.
    pub fn canonical(self) -> Option<String> {
        self.name().map(canonical_name)
    }

    /// Look an algorithm up by its canonical name.
    pub fn from_canonical(name: &str) -> Option<Self> {
        CIPHER_TABLE
            .iter()
            .find(|e| canonical_name(e.name) == name)
            .map(|e| e.algorithm)
    }

    /// Number of registered ciphers.
    pub fn count() -> usize {
        CIPHER_TABLE.len()
    }

    /// Iterate over all registered ciphers in table order.
    pub fn all() -> impl Iterator<Item = BulkCipherAlgorithm> {
        CIPHER_TABLE.iter().map(|e| e.algorithm)
    }

    /// The provider-facing algorithm, `None` for the null cipher.
    pub fn to_provider(self) -> Option<oxtls_crypto::CipherAlgorithm> {
        match self {
            BulkCipherAlgorithm::Null => None,
            BulkCipherAlgorithm::Arcfour => Some(oxtls_crypto::CipherAlgorithm::Arcfour128),
            BulkCipherAlgorithm::TripleDes => Some(oxtls_crypto::CipherAlgorithm::TripleDesEdeCbc),
            BulkCipherAlgorithm::Rijndael => Some(oxtls_crypto::CipherAlgorithm::Rijndael128Cbc),
            BulkCipherAlgorithm::Rijndael256 => Some(oxtls_crypto::CipherAlgorithm::Rijndael256Cbc),
            BulkCipherAlgorithm::Twofish => Some(oxtls_crypto::CipherAlgorithm::Twofish128Cbc),
        }
    }
}
