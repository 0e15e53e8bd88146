//! Protocol version registry.

use super::canonical_name;

/// Protocol version identifiers.
///
/// Identifiers are internal; the wire carries only the major/minor
/// pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TlsVersion {
    /// TLS 1.0 (0)
    Tls1 = 0,

    /// SSL 3.0 (1)
    Ssl3 = 1,
}

struct VersionEntry {
    version: TlsVersion,
    name: &'static str,
    major: u8,
    minor: u8,
    supported: bool,
}

const VERSION_TABLE: &[VersionEntry] = &[
    VersionEntry {
        version: TlsVersion::Ssl3,
        name: "SSL3",
        major: 3,
        minor: 0,
        supported: true,
    },
    VersionEntry {
        version: TlsVersion::Tls1,
        name: "TLS1",
        major: 3,
        minor: 1,
        supported: true,
    },
];

impl TlsVersion {
    /// Create from the numeric identifier.
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(TlsVersion::Tls1),
            1 => Some(TlsVersion::Ssl3),
            _ => None,
        }
    }

    /// Convert to the numeric identifier.
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    fn entry(self) -> Option<&'static VersionEntry> {
        VERSION_TABLE.iter().find(|e| e.version == self)
    }

    /// Whether the identifier is registered.
    pub fn is_valid(self) -> bool {
        self.entry().is_some()
    }

    /// Whether this build negotiates the version.
    pub fn is_supported(self) -> bool {
        self.entry().map(|e| e.supported).unwrap_or(false)
    }

    /// Wire major number.
    pub fn major(self) -> Option<u8> {
        self.entry().map(|e| e.major)
    }

    /// Wire minor number.
    pub fn minor(self) -> Option<u8> {
        self.entry().map(|e| e.minor)
    }

    /// The (major, minor) pair sent on the wire.
    pub fn wire(self) -> Option<(u8, u8)> {
        self.entry().map(|e| (e.major, e.minor))
    }

    /// Look a version up by its wire pair.
    pub fn from_wire(major: u8, minor: u8) -> Option<Self> {
        VERSION_TABLE
            .iter()
            .find(|e| e.major == major && e.minor == minor)
            .map(|e| e.version)
    }

    /// Registered display name.
    pub fn name(self) -> Option<&'static str> {
        self.entry().map(|e| e.name)
    }

    /// Canonical (lowercase, hyphenated) name.
    pub fn canonical(self) -> Option<String> {
        self.name().map(canonical_name)
    }

    /// Number of registered versions.
    pub fn count() -> usize {
        VERSION_TABLE.len()
    }

    /// Iterate over all registered versions, lowest wire pair first.
    pub fn all() -> impl Iterator<Item = TlsVersion> {
        VERSION_TABLE.iter().map(|e| e.version)
    }

    /// The highest supported version.
    pub fn highest_supported() -> TlsVersion {
        let mut best = TlsVersion::Ssl3;
        for entry in VERSION_TABLE.iter().filter(|e| e.supported) {
            if (entry.major, entry.minor) >= best.wire().unwrap_or((0, 0)) {
                best = entry.version;
            }
        }
        best
    }

    /// Order versions by their wire pair.
    pub fn cmp_wire(self, other: TlsVersion) -> core::cmp::Ordering {
        self.wire()
            .unwrap_or((0, 0))
            .cmp(&other.wire().unwrap_or((0, 0)))
    }
}
