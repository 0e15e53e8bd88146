//! Error types for the protocol engine.

use core::fmt;

/// Result type for protocol operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors that can occur in the protocol engine.
///
/// The variants fall into distinct classes with different handling:
/// configuration errors are rejected at the call site and leave state
/// untouched; protocol violations fail the handshake with a specific
/// alert; [`Error::BadRecordMac`] is the single indication for every
/// record-path crypto failure; [`Error::WouldBlock`] is non-fatal and
/// means "call again once the transport is ready".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Invalid configuration
    InvalidConfig(String),

    /// Handshake failure (no acceptable parameters)
    HandshakeFailure(String),

    /// A message arrived in a state that does not expect it
    UnexpectedMessage(String),

    /// Invalid message format
    InvalidMessage(String),

    /// Peer offered a protocol version outside the supported table
    VersionNotSupported(u8, u8),

    /// Record decryption or MAC verification failed
    BadRecordMac,

    /// Record larger than the protocol allows
    RecordOverflow,

    /// Decompression produced an error or overflowed
    DecompressionFailure,

    /// Finished or signature verification failed
    VerifyFailed(String),

    /// Cryptographic provider error outside the record path
    CryptoError(String),

    /// Fatal alert received from peer
    AlertReceived(AlertDescription),

    /// Peer closed the session with close_notify
    SessionClosed,

    /// Peer asked for renegotiation; call handshake to comply
    RehandshakeRequested,

    /// The transport cannot make progress right now; retry later
    WouldBlock,

    /// I/O error reported by the transport
    IoError(String),

    /// An internal buffer or table limit was exceeded
    ResourceExhausted(String),

    /// Unsupported feature
    UnsupportedFeature(String),

    /// Internal error
    InternalError(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            Error::HandshakeFailure(msg) => write!(f, "Handshake failure: {}", msg),
            Error::UnexpectedMessage(msg) => write!(f, "Unexpected message: {}", msg),
            Error::InvalidMessage(msg) => write!(f, "Invalid message: {}", msg),
            Error::VersionNotSupported(major, minor) => {
                write!(f, "Protocol version {}.{} not supported", major, minor)
            }
            Error::BadRecordMac => write!(f, "Bad record MAC"),
            Error::RecordOverflow => write!(f, "Record overflow"),
            Error::DecompressionFailure => write!(f, "Decompression failure"),
            Error::VerifyFailed(msg) => write!(f, "Verification failed: {}", msg),
            Error::CryptoError(msg) => write!(f, "Cryptographic error: {}", msg),
            Error::AlertReceived(desc) => write!(f, "Alert received: {:?}", desc),
            Error::SessionClosed => write!(f, "Session closed by peer"),
            Error::RehandshakeRequested => write!(f, "Peer requested renegotiation"),
            Error::WouldBlock => write!(f, "Operation would block"),
            Error::IoError(msg) => write!(f, "I/O error: {}", msg),
            Error::ResourceExhausted(msg) => write!(f, "Resource limit exceeded: {}", msg),
            Error::UnsupportedFeature(msg) => write!(f, "Unsupported feature: {}", msg),
            Error::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<oxtls_crypto::Error> for Error {
    fn from(e: oxtls_crypto::Error) -> Self {
        Error::CryptoError(e.to_string())
    }
}

impl Error {
    /// The alert this error translates to when it fails a handshake.
    ///
    /// Only the state machine consults this; helper layers return the
    /// error untranslated. `None` means the failure is local (I/O,
    /// configuration) and nothing is owed to the peer.
    pub fn to_alert(&self) -> Option<AlertDescription> {
        match self {
            Error::HandshakeFailure(_) => Some(AlertDescription::HandshakeFailure),
            Error::UnexpectedMessage(_) => Some(AlertDescription::UnexpectedMessage),
            Error::InvalidMessage(_) => Some(AlertDescription::DecodeError),
            Error::VersionNotSupported(_, _) => Some(AlertDescription::ProtocolVersion),
            Error::BadRecordMac => Some(AlertDescription::BadRecordMac),
            Error::RecordOverflow => Some(AlertDescription::RecordOverflow),
            Error::DecompressionFailure => Some(AlertDescription::DecompressionFailure),
            Error::VerifyFailed(_) => Some(AlertDescription::DecryptError),
            Error::CryptoError(_) | Error::InternalError(_) | Error::ResourceExhausted(_) => {
                Some(AlertDescription::InternalError)
            }
            _ => None,
        }
    }

    /// Whether the caller may retry the failed call unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::WouldBlock)
    }
}

/// TLS alert descriptions with their SSL 3.0 / TLS 1.0 numeric values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AlertDescription {
    /// Close notify
    CloseNotify = 0,

    /// Unexpected message
    UnexpectedMessage = 10,

    /// Bad record MAC
    BadRecordMac = 20,

    /// Decryption failed
    DecryptionFailed = 21,

    /// Record overflow
    RecordOverflow = 22,

    /// Decompression failure
    DecompressionFailure = 30,

    /// Handshake failure
    HandshakeFailure = 40,

    /// Bad certificate
    BadCertificate = 42,

    /// Unsupported certificate
    UnsupportedCertificate = 43,

    /// Certificate revoked
    CertificateRevoked = 44,

    /// Certificate expired
    CertificateExpired = 45,

    /// Certificate unknown
    CertificateUnknown = 46,

    /// Illegal parameter
    IllegalParameter = 47,

    /// Unknown CA
    UnknownCa = 48,

    /// Access denied
    AccessDenied = 49,

    /// Decode error
    DecodeError = 50,

    /// Decrypt error
    DecryptError = 51,

    /// Export restriction
    ExportRestriction = 60,

    /// Protocol version
    ProtocolVersion = 70,

    /// Insufficient security
    InsufficientSecurity = 71,

    /// Internal error
    InternalError = 80,

    /// User canceled
    UserCanceled = 90,

    /// No renegotiation
    NoRenegotiation = 100,
}

impl AlertDescription {
    /// Convert from wire format (u8).
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(AlertDescription::CloseNotify),
            10 => Some(AlertDescription::UnexpectedMessage),
            20 => Some(AlertDescription::BadRecordMac),
            21 => Some(AlertDescription::DecryptionFailed),
            22 => Some(AlertDescription::RecordOverflow),
            30 => Some(AlertDescription::DecompressionFailure),
            40 => Some(AlertDescription::HandshakeFailure),
            42 => Some(AlertDescription::BadCertificate),
            43 => Some(AlertDescription::UnsupportedCertificate),
            44 => Some(AlertDescription::CertificateRevoked),
            45 => Some(AlertDescription::CertificateExpired),
            46 => Some(AlertDescription::CertificateUnknown),
            47 => Some(AlertDescription::IllegalParameter),
            48 => Some(AlertDescription::UnknownCa),
            49 => Some(AlertDescription::AccessDenied),
            50 => Some(AlertDescription::DecodeError),
            51 => Some(AlertDescription::DecryptError),
            60 => Some(AlertDescription::ExportRestriction),
            70 => Some(AlertDescription::ProtocolVersion),
            71 => Some(AlertDescription::InsufficientSecurity),
            80 => Some(AlertDescription::InternalError),
            90 => Some(AlertDescription::UserCanceled),
            100 => Some(AlertDescription::NoRenegotiation),
            _ => None,
        }
    }

    /// Convert to wire format (u8).
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    /// Check if this alert description is always fatal.
    ///
    /// Close notify, user canceled and no renegotiation may travel at
    /// warning level; everything else ends the session.
    pub const fn is_fatal(self) -> bool {
        !matches!(
            self,
            AlertDescription::CloseNotify
                | AlertDescription::UserCanceled
                | AlertDescription::NoRenegotiation
        )
    }
}
