//! Key exchange registry.
//!
//! Each key exchange declares a capability set instead of an opaque
//! identity. The handshake state machine consults the flags to decide
//! which messages to send and expect; it never branches on the
//! algorithm identifier itself. Adding a key exchange means adding a
//! table row, not touching the state machine.

use super::canonical_name;

/// Key exchange algorithm identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum KxAlgorithm {
    /// RSA key transport (1)
    Rsa = 1,

    /// Ephemeral Diffie-Hellman signed with DSS (2)
    DheDss = 2,

    /// Ephemeral Diffie-Hellman signed with RSA (3)
    DheRsa = 3,

    /// Static Diffie-Hellman with DSS certificate (4)
    DhDss = 4,

    /// Static Diffie-Hellman with RSA certificate (5)
    DhRsa = 5,

    /// Anonymous Diffie-Hellman (6)
    DhAnon = 6,

    /// SRP (7)
    Srp = 7,
}

/// What a key exchange needs from the handshake.
///
/// Exactly one of `rsa_premaster` and `dh_public_value` holds for a
/// negotiable exchange; an entry with neither has no way to produce a
/// premaster secret and negotiating it fails the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KxCapabilities {
    /// Server must present a certificate.
    pub server_certificate: bool,

    /// Server may request a certificate from the client.
    pub client_certificate: bool,

    /// Premaster secret travels RSA-encrypted in ClientKeyExchange.
    pub rsa_premaster: bool,

    /// Premaster secret is agreed via DH public values
    /// (ServerKeyExchange carries the group, ClientKeyExchange the
    /// client public).
    pub dh_public_value: bool,

    /// A client certificate is proven with CertificateVerify.
    pub certificate_verify: bool,
}

struct KxEntry {
    algorithm: KxAlgorithm,
    name: &'static str,
    capabilities: KxCapabilities,
}

/// Static Diffie-Hellman would take its premaster from certificate
/// contents the engine treats as opaque, so those rows carry neither
/// premaster capability and fail at negotiation, same as SRP.
const KX_TABLE: &[KxEntry] = &[
    KxEntry {
        algorithm: KxAlgorithm::DhAnon,
        name: "DH_ANON",
        capabilities: KxCapabilities {
            server_certificate: false,
            client_certificate: false,
            rsa_premaster: false,
            dh_public_value: true,
            certificate_verify: false,
        },
    },
    KxEntry {
        algorithm: KxAlgorithm::Rsa,
        name: "RSA",
        capabilities: KxCapabilities {
            server_certificate: true,
            client_certificate: true,
            rsa_premaster: true,
            dh_public_value: false,
            certificate_verify: true,
        },
    },
    KxEntry {
        algorithm: KxAlgorithm::DheDss,
        name: "DHE_DSS",
        capabilities: KxCapabilities {
            server_certificate: true,
            client_certificate: true,
            rsa_premaster: false,
            dh_public_value: true,
            certificate_verify: true,
        },
    },
    KxEntry {
        algorithm: KxAlgorithm::DheRsa,
        name: "DHE_RSA",
        capabilities: KxCapabilities {
            server_certificate: true,
            client_certificate: true,
            rsa_premaster: false,
            dh_public_value: true,
            certificate_verify: true,
        },
    },
    KxEntry {
        algorithm: KxAlgorithm::DhDss,
        name: "DH_DSS",
        capabilities: KxCapabilities {
            server_certificate: true,
            client_certificate: true,
            rsa_premaster: false,
            dh_public_value: false,
            certificate_verify: false,
        },
    },
    KxEntry {
        algorithm: KxAlgorithm::DhRsa,
        name: "DH_RSA",
        capabilities: KxCapabilities {
            server_certificate: true,
            client_certificate: true,
            rsa_premaster: false,
            dh_public_value: false,
            certificate_verify: false,
        },
    },
    KxEntry {
        algorithm: KxAlgorithm::Srp,
        name: "SRP",
        capabilities: KxCapabilities {
            server_certificate: false,
            client_certificate: false,
            rsa_premaster: false,
            dh_public_value: false,
            certificate_verify: false,
        },
    },
];

impl KxAlgorithm {
    /// Create from the numeric identifier.
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(KxAlgorithm::Rsa),
            2 => Some(KxAlgorithm::DheDss),
            3 => Some(KxAlgorithm::DheRsa),
            4 => Some(KxAlgorithm::DhDss),
            5 => Some(KxAlgorithm::DhRsa),
            6 => Some(KxAlgorithm::DhAnon),
            7 => Some(KxAlgorithm::Srp),
            _ => None,
        }
    }

    /// Convert to the numeric identifier.
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    fn entry(self) -> Option<&'static KxEntry> {
        KX_TABLE.iter().find(|e| e.algorithm == self)
    }

    /// Whether the identifier is registered.
    pub fn is_valid(self) -> bool {
        self.entry().is_some()
    }

    /// The declared capability set.
    pub fn capabilities(self) -> Option<KxCapabilities> {
        self.entry().map(|e| e.capabilities)
    }

    /// Whether negotiating this exchange can yield a premaster secret.
    pub fn is_negotiable(self) -> bool {
        self.capabilities()
            .map(|c| c.rsa_premaster || c.dh_public_value)
            .unwrap_or(false)
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
        KX_TABLE
            .iter()
            .find(|e| canonical_name(e.name) == name)
            .map(|e| e.algorithm)
    }

    /// Number of registered key exchanges.
    pub fn count() -> usize {
        KX_TABLE.len()
    }

    /// Iterate over all registered key exchanges in table order.
    pub fn all() -> impl Iterator<Item = KxAlgorithm> {
        KX_TABLE.iter().map(|e| e.algorithm)
    }
}
