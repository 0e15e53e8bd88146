//! Cipher suite registry.
//!
//! A cipher suite is a named (key exchange, bulk cipher, MAC) triple
//! with a two-byte wire identifier. The table below is the complete set
//! the engine knows; negotiation never invents combinations outside it.
//! Identifiers with a 0xF6 first byte sit in private wire space.

use super::canonical_name;
use super::cipher::BulkCipherAlgorithm;
use super::kx::KxAlgorithm;
use super::mac::MacAlgorithm;

/// Two-byte cipher suite wire identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CipherSuiteId(pub [u8; 2]);

/// A registered cipher suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CipherSuite {
    id: CipherSuiteId,
    name: &'static str,
    cipher: BulkCipherAlgorithm,
    kx: KxAlgorithm,
    mac: MacAlgorithm,
}

macro_rules! suite {
    ($b0:expr, $b1:expr, $name:expr, $cipher:ident, $kx:ident, $mac:ident) => {
        CipherSuite {
            id: CipherSuiteId([$b0, $b1]),
            name: $name,
            cipher: BulkCipherAlgorithm::$cipher,
            kx: KxAlgorithm::$kx,
            mac: MacAlgorithm::$mac,
        }
    };
}

/// Every suite the engine knows, grouped by key exchange. Table order
/// is the enumeration order the selector scores; it carries no
/// preference of its own.
const SUITE_TABLE: &[CipherSuite] = &[
    // DH_anon
    suite!(0x00, 0x18, "DH_ANON_ARCFOUR_MD5", Arcfour, DhAnon, Md5),
    suite!(0x00, 0x1B, "DH_ANON_3DES_EDE_CBC_SHA", TripleDes, DhAnon, Sha),
    suite!(0x00, 0x34, "DH_ANON_RIJNDAEL_128_CBC_SHA", Rijndael, DhAnon, Sha),
    suite!(0x00, 0x3A, "DH_ANON_RIJNDAEL_256_CBC_SHA", Rijndael256, DhAnon, Sha),
    suite!(0xF6, 0x50, "DH_ANON_TWOFISH_128_CBC_SHA", Twofish, DhAnon, Sha),
    // SRP
    suite!(0xF6, 0x61, "SRP_ARCFOUR_MD5", Arcfour, Srp, Md5),
    suite!(0xF6, 0x60, "SRP_3DES_EDE_CBC_SHA", TripleDes, Srp, Sha),
    suite!(0xF6, 0x62, "SRP_RIJNDAEL_128_CBC_SHA", Rijndael, Srp, Sha),
    suite!(0xF6, 0x63, "SRP_RIJNDAEL_256_CBC_SHA", Rijndael256, Srp, Sha),
    suite!(0xF6, 0x64, "SRP_TWOFISH_128_CBC_SHA", Twofish, Srp, Sha),
    // DH_DSS
    suite!(0x00, 0x0D, "DH_DSS_3DES_EDE_CBC_SHA", TripleDes, DhDss, Sha),
    suite!(0x00, 0x30, "DH_DSS_RIJNDAEL_128_CBC_SHA", Rijndael, DhDss, Sha),
    suite!(0x00, 0x36, "DH_DSS_RIJNDAEL_256_CBC_SHA", Rijndael256, DhDss, Sha),
    suite!(0xF6, 0x52, "DH_DSS_TWOFISH_128_CBC_SHA", Twofish, DhDss, Sha),
    // DH_RSA
    suite!(0x00, 0x10, "DH_RSA_3DES_EDE_CBC_SHA", TripleDes, DhRsa, Sha),
    suite!(0x00, 0x31, "DH_RSA_RIJNDAEL_128_CBC_SHA", Rijndael, DhRsa, Sha),
    suite!(0x00, 0x37, "DH_RSA_RIJNDAEL_256_CBC_SHA", Rijndael256, DhRsa, Sha),
    suite!(0xF6, 0x53, "DH_RSA_TWOFISH_128_CBC_SHA", Twofish, DhRsa, Sha),
    // DHE_DSS
    suite!(0xF6, 0x54, "DHE_DSS_TWOFISH_128_CBC_SHA", Twofish, DheDss, Sha),
    suite!(0x00, 0x13, "DHE_DSS_3DES_EDE_CBC_SHA", TripleDes, DheDss, Sha),
    suite!(0x00, 0x32, "DHE_DSS_RIJNDAEL_128_CBC_SHA", Rijndael, DheDss, Sha),
    suite!(0x00, 0x38, "DHE_DSS_RIJNDAEL_256_CBC_SHA", Rijndael256, DheDss, Sha),
    // DHE_RSA
    suite!(0xF6, 0x55, "DHE_RSA_TWOFISH_128_CBC_SHA", Twofish, DheRsa, Sha),
    suite!(0x00, 0x16, "DHE_RSA_3DES_EDE_CBC_SHA", TripleDes, DheRsa, Sha),
    suite!(0x00, 0x33, "DHE_RSA_RIJNDAEL_128_CBC_SHA", Rijndael, DheRsa, Sha),
    suite!(0x00, 0x39, "DHE_RSA_RIJNDAEL_256_CBC_SHA", Rijndael256, DheRsa, Sha),
    // RSA
    suite!(0x00, 0x05, "RSA_ARCFOUR_SHA", Arcfour, Rsa, Sha),
    suite!(0x00, 0x04, "RSA_ARCFOUR_MD5", Arcfour, Rsa, Md5),
    suite!(0x00, 0x0A, "RSA_3DES_EDE_CBC_SHA", TripleDes, Rsa, Sha),
    suite!(0x00, 0x2F, "RSA_RIJNDAEL_128_CBC_SHA", Rijndael, Rsa, Sha),
    suite!(0x00, 0x35, "RSA_RIJNDAEL_256_CBC_SHA", Rijndael256, Rsa, Sha),
    suite!(0xF6, 0x51, "RSA_TWOFISH_128_CBC_SHA", Twofish, Rsa, Sha),
];

impl CipherSuiteId {
    /// Create from the two wire bytes.
    pub const fn new(b0: u8, b1: u8) -> Self {
        CipherSuiteId([b0, b1])
    }

    /// The two wire bytes.
    pub const fn to_bytes(self) -> [u8; 2] {
        self.0
    }

    /// Whether the identifier is registered.
    pub fn is_valid(self) -> bool {
        self.lookup().is_some()
    }

    /// Look the identifier up in the suite table.
    pub fn lookup(self) -> Option<&'static CipherSuite> {
        SUITE_TABLE.iter().find(|s| s.id == self)
    }

    /// Bulk cipher of the suite, if registered.
    pub fn cipher(self) -> Option<BulkCipherAlgorithm> {
        self.lookup().map(|s| s.cipher)
    }

    /// Key exchange of the suite, if registered.
    pub fn kx(self) -> Option<KxAlgorithm> {
        self.lookup().map(|s| s.kx)
    }

    /// MAC of the suite, if registered.
    pub fn mac(self) -> Option<MacAlgorithm> {
        self.lookup().map(|s| s.mac)
    }

    /// Registered display name.
    pub fn name(self) -> Option<&'static str> {
        self.lookup().map(|s| s.name)
    }

    /// Canonical (lowercase, hyphenated) name.
    pub fn canonical(self) -> Option<String> {
        self.name().map(canonical_name)
    }
}

impl core::fmt::Display for CipherSuiteId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{}", canonical_name(name)),
            None => write!(f, "unknown({:#04x},{:#04x})", self.0[0], self.0[1]),
        }
    }
}

impl CipherSuite {
    /// The two-byte wire identifier.
    pub const fn id(&self) -> CipherSuiteId {
        self.id
    }

    /// Registered display name.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Canonical (lowercase, hyphenated) name.
    pub fn canonical(&self) -> String {
        canonical_name(self.name)
    }

    /// Bulk cipher component.
    pub const fn cipher(&self) -> BulkCipherAlgorithm {
        self.cipher
    }

    /// Key exchange component.
    pub const fn kx(&self) -> KxAlgorithm {
        self.kx
    }

    /// MAC component.
    pub const fn mac(&self) -> MacAlgorithm {
        self.mac
    }

    /// Look a suite up by its canonical name.
    pub fn from_canonical(name: &str) -> Option<&'static CipherSuite> {
        SUITE_TABLE.iter().find(|s| canonical_name(s.name) == name)
    }

    /// Number of registered suites.
    pub fn count() -> usize {
        SUITE_TABLE.len()
    }

    /// Iterate over all registered suites in table order.
    pub fn all() -> impl Iterator<Item = &'static CipherSuite> {
        SUITE_TABLE.iter()
    }
}
