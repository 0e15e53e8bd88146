//! Compression method registry.

use super::canonical_name;

/// Compression method identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CompressionMethod {
    /// No compression (1)
    Null = 1,

    /// Zlib/DEFLATE (2)
    Zlib = 2,
}

struct CompressionEntry {
    method: CompressionMethod,
    name: &'static str,
    wire_number: u8,
}

const COMPRESSION_TABLE: &[CompressionEntry] = &[
    CompressionEntry {
        method: CompressionMethod::Null,
        name: "NULL",
        wire_number: 0,
    },
    #[cfg(feature = "zlib")]
    CompressionEntry {
        method: CompressionMethod::Zlib,
        name: "ZLIB",
        wire_number: 224,
    },
];

impl CompressionMethod {
    /// Create from the numeric identifier.
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(CompressionMethod::Null),
            2 => Some(CompressionMethod::Zlib),
            _ => None,
        }
    }

    /// Convert to the numeric identifier.
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    fn entry(self) -> Option<&'static CompressionEntry> {
        COMPRESSION_TABLE.iter().find(|e| e.method == self)
    }

    /// Whether the method is registered and usable in this build.
    pub fn is_valid(self) -> bool {
        self.entry().is_some()
    }

    /// The byte this method uses on the wire.
    ///
    /// Wire numbers and registry identifiers are distinct namespaces;
    /// hello messages carry only wire numbers.
    pub fn wire_number(self) -> Option<u8> {
        self.entry().map(|e| e.wire_number)
    }

    /// Look a method up by its wire number.
    pub fn from_wire_number(value: u8) -> Option<Self> {
        COMPRESSION_TABLE
            .iter()
            .find(|e| e.wire_number == value)
            .map(|e| e.method)
    }

    /// Registered display name.
    pub fn name(self) -> Option<&'static str> {
        self.entry().map(|e| e.name)
    }

    /// Canonical (lowercase, hyphenated) name.
    pub fn canonical(self) -> Option<String> {
        self.name().map(canonical_name)
    }

    /// Look a method up by its canonical name.
    pub fn from_canonical(name: &str) -> Option<Self> {
        COMPRESSION_TABLE
            .iter()
            .find(|e| canonical_name(e.name) == name)
            .map(|e| e.method)
    }

    /// Number of registered methods.
    pub fn count() -> usize {
        COMPRESSION_TABLE.len()
    }

    /// Iterate over all registered methods in table order.
    pub fn all() -> impl Iterator<Item = CompressionMethod> {
        COMPRESSION_TABLE.iter().map(|e| e.method)
    }
}
