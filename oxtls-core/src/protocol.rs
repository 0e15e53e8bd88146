//! Protocol constants and wire-level types.

/// TLS record content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ContentType {
    /// Change cipher spec (20)
    ChangeCipherSpec = 20,

    /// Alert (21)
    Alert = 21,

    /// Handshake (22)
    Handshake = 22,

    /// Application data (23)
    ApplicationData = 23,
}

impl ContentType {
    /// Create from wire format (u8).
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            20 => Some(ContentType::ChangeCipherSpec),
            21 => Some(ContentType::Alert),
            22 => Some(ContentType::Handshake),
            23 => Some(ContentType::ApplicationData),
            _ => None,
        }
    }

    /// Convert to wire format (u8).
    pub const fn to_u8(self) -> u8 {
        self as u8
    }
}

/// Handshake message type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum HandshakeType {
    /// Hello request (0) - server asks the client to renegotiate
    HelloRequest = 0,

    /// Client hello (1)
    ClientHello = 1,

    /// Server hello (2)
    ServerHello = 2,

    /// Certificate (11)
    Certificate = 11,

    /// Server key exchange (12)
    ServerKeyExchange = 12,

    /// Certificate request (13)
    CertificateRequest = 13,

    /// Server hello done (14)
    ServerHelloDone = 14,

    /// Certificate verify (15)
    CertificateVerify = 15,

    /// Client key exchange (16)
    ClientKeyExchange = 16,

    /// Finished (20)
    Finished = 20,
}

impl HandshakeType {
    /// Create from wire format (u8).
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(HandshakeType::HelloRequest),
            1 => Some(HandshakeType::ClientHello),
            2 => Some(HandshakeType::ServerHello),
            11 => Some(HandshakeType::Certificate),
            12 => Some(HandshakeType::ServerKeyExchange),
            13 => Some(HandshakeType::CertificateRequest),
            14 => Some(HandshakeType::ServerHelloDone),
            15 => Some(HandshakeType::CertificateVerify),
            16 => Some(HandshakeType::ClientKeyExchange),
            20 => Some(HandshakeType::Finished),
            _ => None,
        }
    }

    /// Convert to wire format (u8).
    pub const fn to_u8(self) -> u8 {
        self as u8
    }
}

/// The single valid payload byte of a ChangeCipherSpec message.
pub const CHANGE_CIPHER_SPEC_TYPE: u8 = 1;

/// Size of the hello random values, in bytes.
pub const RANDOM_SIZE: usize = 32;

/// Maximum session ID size, in bytes.
pub const SESSION_ID_MAX_SIZE: usize = 32;

/// Size of the master secret, in bytes.
pub const MASTER_SECRET_SIZE: usize = 48;

/// Size of the premaster secret for RSA key exchange, in bytes.
pub const RSA_PREMASTER_SIZE: usize = 48;

/// Size of the Finished verify data, in bytes.
pub const VERIFY_DATA_SIZE: usize = 12;
