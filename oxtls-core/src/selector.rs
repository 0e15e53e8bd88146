//! Cipher suite selection.
//!
//! The selector turns the static suite table plus a session's
//! [`Priorities`] into the ranked list of suites that session may
//! negotiate. Scoring packs the three category indexes into one
//! number:
//!
//! ```text
//! score = (kx_priority + 1) * 100 + (cipher_priority + 1) * 10 + mac_priority
//! ```
//!
//! with a missing priority entering as -1. Lower scores win, so the
//! key exchange index dominates, the cipher index breaks kx ties and
//! the MAC index breaks the rest. The ranked list is then stripped of
//! every suite with a missing priority in any category; the unranked
//! enumeration applies the same filter without sorting.
//!
//! An empty result is a normal outcome, not an error: it means this
//! configuration can negotiate nothing and the handshake will fail
//! with handshake_failure.

use crate::priority::Priorities;
use crate::registry::{CipherSuite, CipherSuiteId};

/// Composite preference score of one suite under the given priorities.
fn score(priorities: &Priorities, suite: &CipherSuite) -> i32 {
    let kx = priorities
        .kx_priority(suite.kx())
        .map(|p| p as i32)
        .unwrap_or(-1);
    let cipher = priorities
        .cipher_priority(suite.cipher())
        .map(|p| p as i32)
        .unwrap_or(-1);
    let mac = priorities
        .mac_priority(suite.mac())
        .map(|p| p as i32)
        .unwrap_or(-1);

    (kx + 1) * 100 + (cipher + 1) * 10 + mac
}

fn acceptable(priorities: &Priorities, suite: &CipherSuite) -> bool {
    priorities.kx_priority(suite.kx()).is_some()
        && priorities.cipher_priority(suite.cipher()).is_some()
        && priorities.mac_priority(suite.mac()).is_some()
}

/// Enumerate the acceptable suites ranked most-preferred first.
pub fn ranked_suites(priorities: &Priorities) -> Vec<CipherSuiteId> {
    let mut suites: Vec<&CipherSuite> = CipherSuite::all().collect();
    suites.sort_by_key(|s| score(priorities, s));

    let ranked: Vec<CipherSuiteId> = suites
        .into_iter()
        .filter(|s| acceptable(priorities, s))
        .map(|s| s.id())
        .collect();

    tracing::debug!(
        count = ranked.len(),
        "ranked cipher suites for negotiation"
    );
    ranked
}

/// Enumerate the acceptable suites in table order, unranked.
pub fn supported_suites(priorities: &Priorities) -> Vec<CipherSuiteId> {
    CipherSuite::all()
        .filter(|s| acceptable(priorities, s))
        .map(|s| s.id())
        .collect()
}

/// The compression wire bytes to advertise, in preference order.
pub fn compression_wire_numbers(priorities: &Priorities) -> Vec<u8> {
    priorities
        .compression_order()
        .filter_map(|m| m.wire_number())
        .collect()
}
