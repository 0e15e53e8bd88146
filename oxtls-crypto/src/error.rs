//! Error types for the cryptographic provider.

use std::fmt;

/// Result type for cryptographic operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during cryptographic operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The requested algorithm is not supported by this provider.
    UnsupportedAlgorithm(String),

    /// Invalid key size for the algorithm.
    InvalidKeySize {
        /// Expected key size in bytes
        expected: usize,
        /// Actual key size in bytes
        actual: usize,
    },

    /// Invalid IV size for the algorithm.
    InvalidIvSize {
        /// Expected IV size in bytes
        expected: usize,
        /// Actual IV size in bytes
        actual: usize,
    },

    /// Input length is not a multiple of the cipher block size.
    InvalidBlockLength,

    /// Invalid public key.
    InvalidPublicKey,

    /// Invalid private key.
    InvalidPrivateKey,

    /// Invalid Diffie-Hellman group parameters.
    InvalidDhParams,

    /// Key exchange failed.
    KeyExchangeFailed,

    /// Encryption failed.
    EncryptionFailed,

    /// Decryption failed.
    DecryptionFailed,

    /// Signature generation failed.
    SigningFailed,

    /// Random number generation failed.
    RandomFailed,

    /// Requested output length is out of range for the operation.
    InvalidLength,

    /// Internal provider error.
    Internal(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnsupportedAlgorithm(alg) => write!(f, "unsupported algorithm: {}", alg),
            Error::InvalidKeySize { expected, actual } => {
                write!(f, "invalid key size: expected {}, got {}", expected, actual)
            }
            Error::InvalidIvSize { expected, actual } => {
                write!(f, "invalid IV size: expected {}, got {}", expected, actual)
            }
            Error::InvalidBlockLength => write!(f, "input is not a multiple of the block size"),
            Error::InvalidPublicKey => write!(f, "invalid public key"),
            Error::InvalidPrivateKey => write!(f, "invalid private key"),
            Error::InvalidDhParams => write!(f, "invalid Diffie-Hellman parameters"),
            Error::KeyExchangeFailed => write!(f, "key exchange failed"),
            Error::EncryptionFailed => write!(f, "encryption failed"),
            Error::DecryptionFailed => write!(f, "decryption failed"),
            Error::SigningFailed => write!(f, "signature generation failed"),
            Error::RandomFailed => write!(f, "random number generation failed"),
            Error::InvalidLength => write!(f, "requested length out of range"),
            Error::Internal(msg) => write!(f, "internal provider error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}
