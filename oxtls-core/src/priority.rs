//! Per-session algorithm preference lists.
//!
//! The application supplies one ordered list per category before the
//! handshake; index 0 is the most preferred entry and absence means the
//! algorithm is unacceptable. The selector folds the three suite-facing
//! lists into one composite score per suite (see
//! [`crate::selector`]); the compression list orders the wire bytes the
//! hello messages advertise.
//!
//! Setters validate the whole replacement list before touching the
//! stored one, so a rejected call leaves the previous configuration
//! intact.

use crate::error::{Error, Result};
use crate::registry::{BulkCipherAlgorithm, CompressionMethod, KxAlgorithm, MacAlgorithm};

/// Largest number of entries a single priority list may hold.
///
/// The composite suite score packs the three category indexes into
/// decimal digit groups; an index of 10 or more would carry into the
/// next group and break the documented kx > cipher > mac precedence.
pub const PRIORITY_LIST_MAX: usize = 10;

/// One category's ordered preference list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityList<A> {
    order: Vec<A>,
}

// Manual impl: the derive would demand `A: Default`, which the
// algorithm id enums do not implement.
impl<A> Default for PriorityList<A> {
    fn default() -> Self {
        Self { order: Vec::new() }
    }
}

impl<A: Copy + PartialEq> PriorityList<A> {
    /// An empty list; every lookup reports "unacceptable".
    pub fn new() -> Self {
        Self { order: Vec::new() }
    }

    fn build(ids: &[A], valid: impl Fn(A) -> bool) -> Result<Self> {
        if ids.len() > PRIORITY_LIST_MAX {
            return Err(Error::InvalidConfig(format!(
                "priority list holds at most {} entries",
                PRIORITY_LIST_MAX
            )));
        }
        for (i, &id) in ids.iter().enumerate() {
            if !valid(id) {
                return Err(Error::InvalidConfig(
                    "unknown algorithm in priority list".into(),
                ));
            }
            if ids[..i].contains(&id) {
                return Err(Error::InvalidConfig(
                    "duplicate algorithm in priority list".into(),
                ));
            }
        }
        Ok(Self {
            order: ids.to_vec(),
        })
    }

    /// Position of `id` in the list, `None` if absent.
    pub fn priority(&self, id: A) -> Option<usize> {
        self.order.iter().position(|&a| a == id)
    }

    /// Number of configured entries.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether nothing is configured for this category.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterate in preference order.
    pub fn iter(&self) -> impl Iterator<Item = A> + '_ {
        self.order.iter().copied()
    }
}

/// The four per-session preference lists.
///
/// Starts empty; an empty category rejects every suite touching it, so
/// a session without configured priorities cannot negotiate anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Priorities {
    cipher: PriorityList<BulkCipherAlgorithm>,
    mac: PriorityList<MacAlgorithm>,
    kx: PriorityList<KxAlgorithm>,
    compression: PriorityList<CompressionMethod>,
}

impl Priorities {
    /// All categories empty.
    pub fn new() -> Self {
        Self::default()
    }

    /// A conservative default ordering covering the common suites.
    pub fn recommended() -> Self {
        let mut p = Self::new();
        // The tables are static, so these cannot fail validation.
        let _ = p.set_cipher(&[
            BulkCipherAlgorithm::Rijndael,
            BulkCipherAlgorithm::Rijndael256,
            BulkCipherAlgorithm::Twofish,
            BulkCipherAlgorithm::TripleDes,
            BulkCipherAlgorithm::Arcfour,
        ]);
        let _ = p.set_mac(&[MacAlgorithm::Sha, MacAlgorithm::Md5]);
        let _ = p.set_kx(&[
            KxAlgorithm::Rsa,
            KxAlgorithm::DheRsa,
            KxAlgorithm::DheDss,
        ]);
        let _ = p.set_compression(&[CompressionMethod::Null]);
        p
    }

    /// Replace the bulk cipher preference list.
    pub fn set_cipher(&mut self, order: &[BulkCipherAlgorithm]) -> Result<()> {
        self.cipher = PriorityList::build(order, |a| a.is_valid())?;
        Ok(())
    }

    /// Replace the MAC preference list.
    pub fn set_mac(&mut self, order: &[MacAlgorithm]) -> Result<()> {
        self.mac = PriorityList::build(order, |a| a.is_valid())?;
        Ok(())
    }

    /// Replace the key exchange preference list.
    pub fn set_kx(&mut self, order: &[KxAlgorithm]) -> Result<()> {
        self.kx = PriorityList::build(order, |a| a.is_valid())?;
        Ok(())
    }

    /// Replace the compression preference list.
    pub fn set_compression(&mut self, order: &[CompressionMethod]) -> Result<()> {
        self.compression = PriorityList::build(order, |m| m.is_valid())?;
        Ok(())
    }

    /// Preference index of a bulk cipher.
    pub fn cipher_priority(&self, id: BulkCipherAlgorithm) -> Option<usize> {
        self.cipher.priority(id)
    }

    /// Preference index of a MAC.
    pub fn mac_priority(&self, id: MacAlgorithm) -> Option<usize> {
        self.mac.priority(id)
    }

    /// Preference index of a key exchange.
    pub fn kx_priority(&self, id: KxAlgorithm) -> Option<usize> {
        self.kx.priority(id)
    }

    /// Preference index of a compression method.
    pub fn compression_priority(&self, id: CompressionMethod) -> Option<usize> {
        self.compression.priority(id)
    }

    /// The compression list in preference order.
    pub fn compression_order(&self) -> impl Iterator<Item = CompressionMethod> + '_ {
        self.compression.iter()
    }
}
