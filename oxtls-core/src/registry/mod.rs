//! Algorithm registry.
//!
//! Immutable tables describing every algorithm the engine knows: bulk
//! ciphers, MACs, compression methods, key exchanges, protocol versions
//! and the cipher-suite combinations over them. The tables are consulted
//! at runtime and never mutated; "supported" is a property of an entry,
//! not of any global state.
//!
//! Lookups are total: an identifier missing from its table makes
//! `is_valid` return `false` and attribute getters return `None`. Nothing
//! in here panics on unknown input.
//!
//! Display names follow one convention across all categories: the stored
//! name is uppercase with underscores, and [`canonical_name`] lowercases
//! it and turns underscores into hyphens (`RIJNDAEL_128_CBC` becomes
//! `rijndael-128-cbc`). Canonical names are for logs and configuration
//! files; wire identifiers are always the numeric IDs.

mod cipher;
mod compression;
mod kx;
mod mac;
mod suites;
mod version;

pub use cipher::BulkCipherAlgorithm;
pub use compression::CompressionMethod;
pub use kx::{KxAlgorithm, KxCapabilities};
pub use mac::MacAlgorithm;
pub use suites::{CipherSuite, CipherSuiteId};
pub use version::TlsVersion;

/// Derive the canonical display form of a registry name.
///
/// Lowercases and replaces `_` with `-`. Purely cosmetic; never used for
/// table lookups on the wire path.
pub fn canonical_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '_' => '-',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}
