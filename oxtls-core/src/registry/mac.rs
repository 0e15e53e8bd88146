//! MAC digest registry.

use super::canonical_name;

/// MAC algorithm identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MacAlgorithm {
    /// No MAC (1)
    Null = 1,

    /// HMAC-MD5 (2)
    Md5 = 2,

    /// HMAC-SHA1 (3)
    Sha = 3,
}

struct MacEntry {
    algorithm: MacAlgorithm,
    name: &'static str,
    digest_size: usize,
}

const MAC_TABLE: &[MacEntry] = &[
    MacEntry {
        algorithm: MacAlgorithm::Sha,
        name: "SHA",
        digest_size: 20,
    },
    MacEntry {
        algorithm: MacAlgorithm::Md5,
        name: "MD5",
        digest_size: 16,
    },
    MacEntry {
        algorithm: MacAlgorithm::Null,
        name: "NULL",
        digest_size: 0,
    },
];

impl MacAlgorithm {
    /// Create from the numeric identifier.
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(MacAlgorithm::Null),
            2 => Some(MacAlgorithm::Md5),
            3 => Some(MacAlgorithm::Sha),
            _ => None,
        }
    }

    /// Convert to the numeric identifier.
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    fn entry(self) -> Option<&'static MacEntry> {
        MAC_TABLE.iter().find(|e| e.algorithm == self)
    }

    /// Whether the identifier is registered.
    pub fn is_valid(self) -> bool {
        self.entry().is_some()
    }

    /// MAC output size in bytes; 0 for the null MAC.
    ///
    /// This is also the per-direction MAC key size carved out of the
    /// key block.
    pub fn digest_size(self) -> Option<usize> {
        self.entry().map(|e| e.digest_size)
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
        MAC_TABLE
            .iter()
            .find(|e| canonical_name(e.name) == name)
            .map(|e| e.algorithm)
    }

    /// Number of registered MACs.
    pub fn count() -> usize {
        MAC_TABLE.len()
    }

    /// Iterate over all registered MACs in table order.
    pub fn all() -> impl Iterator<Item = MacAlgorithm> {
        MAC_TABLE.iter().map(|e| e.algorithm)
    }

    /// The provider-facing hash, `None` for the null MAC.
    pub fn to_provider(self) -> Option<oxtls_crypto::HashAlgorithm> {
        match self {
            MacAlgorithm::Null => None,
            MacAlgorithm::Md5 => Some(oxtls_crypto::HashAlgorithm::Md5),
            MacAlgorithm::Sha => Some(oxtls_crypto::HashAlgorithm::Sha1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mac_attributes() {
        assert_eq!(MacAlgorithm::Sha.digest_size(), Some(20));
        assert_eq!(MacAlgorithm::Md5.digest_size(), Some(16));
        assert_eq!(MacAlgorithm::Null.digest_size(), Some(0));
    }

    #[test]
    fn test_mac_id_round_trip() {
        for alg in MacAlgorithm::all() {
            assert_eq!(MacAlgorithm::from_u8(alg.to_u8()), Some(alg));
            assert!(alg.is_valid());
        }
        assert_eq!(MacAlgorithm::from_u8(0), None);
        assert_eq!(MacAlgorithm::from_u8(4), None);
        assert_eq!(MacAlgorithm::count(), 3);
    }

    #[test]
    fn test_mac_canonical_names() {
        assert_eq!(MacAlgorithm::Sha.canonical().unwrap(), "sha");
        assert_eq!(MacAlgorithm::from_canonical("md5"), Some(MacAlgorithm::Md5));
        assert_eq!(MacAlgorithm::from_canonical("sha256"), None);
    }

    #[test]
    fn test_provider_mapping() {
        assert_eq!(MacAlgorithm::Null.to_provider(), None);
        for alg in MacAlgorithm::all() {
            if let Some(p) = alg.to_provider() {
                assert_eq!(alg.digest_size(), Some(p.output_size()));
            }
        }
    }
}
