//! Server-side session caching for abbreviated handshakes.
//!
//! The engine stores a [`SecurityParameters`] snapshot under its
//! session ID when a resumable full handshake completes, and looks the
//! ID up again when a client offers it. Expiry is enforced by the
//! handshake against [`Config::expire_time`](crate::Config); the store
//! itself only holds entries.

use std::collections::HashMap;
use std::time::Duration;

use crate::session::SecurityParameters;

/// Resumption window applied when the configuration does not override
/// it.
pub const DEFAULT_EXPIRE_TIME: Duration = Duration::from_secs(3600);

/// Default capacity of [`InMemorySessionStore`].
pub const DEFAULT_MAX_SESSIONS: usize = 50;

/// Backing storage for resumable sessions.
///
/// Implementations are keyed by the server-assigned session ID and
/// must be prepared for lookups of IDs they never stored.
pub trait SessionStore: Send {
    /// Insert or replace the entry for `session_id`.
    fn store(&mut self, session_id: &[u8], parameters: SecurityParameters);

    /// Fetch a copy of the entry for `session_id`.
    fn lookup(&self, session_id: &[u8]) -> Option<SecurityParameters>;

    /// Drop the entry for `session_id`, if present.
    fn remove(&mut self, session_id: &[u8]);
}

/// A bounded in-process session store.
///
/// When full, storing a new ID evicts the entry whose original
/// handshake is oldest.
pub struct InMemorySessionStore {
    entries: HashMap<Vec<u8>, SecurityParameters>,
    max_entries: usize,
}

impl std::fmt::Debug for InMemorySessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemorySessionStore")
            .field("entries", &self.entries.len())
            .field("max_entries", &self.max_entries)
            .finish()
    }
}

impl InMemorySessionStore {
    /// A store bounded at [`DEFAULT_MAX_SESSIONS`] entries.
    pub fn new() -> Self {
        Self::with_max_entries(DEFAULT_MAX_SESSIONS)
    }

    /// A store holding at most `max_entries` sessions. A zero bound
    /// stores nothing.
    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            max_entries,
        }
    }

    /// Number of cached sessions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no sessions.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, parameters)| parameters.created_at)
            .map(|(id, _)| id.clone());
        if let Some(id) = oldest {
            tracing::debug!(id_len = id.len(), "evicting oldest cached session");
            self.entries.remove(&id);
        }
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for InMemorySessionStore {
    fn store(&mut self, session_id: &[u8], parameters: SecurityParameters) {
        if self.max_entries == 0 {
            return;
        }
        if !self.entries.contains_key(session_id) && self.entries.len() >= self.max_entries {
            self.evict_oldest();
        }
        tracing::debug!(entries = self.entries.len() + 1, "cached session");
        self.entries.insert(session_id.to_vec(), parameters);
    }

    fn lookup(&self, session_id: &[u8]) -> Option<SecurityParameters> {
        self.entries.get(session_id).cloned()
    }

    fn remove(&mut self, session_id: &[u8]) {
        self.entries.remove(session_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{CipherSuiteId, CompressionMethod, TlsVersion};
    use crate::session::Role;
    use std::time::SystemTime;
    use zeroize::Zeroizing;

    fn parameters(id: u8, created_at: SystemTime) -> SecurityParameters {
        SecurityParameters {
            role: Role::Server,
            version: TlsVersion::Tls1,
            cipher_suite: CipherSuiteId::new(0x00, 0x34),
            compression: CompressionMethod::Null,
            master_secret: Zeroizing::new(vec![id; 48]),
            client_random: [id; 32],
            server_random: [id; 32],
            session_id: vec![id; 32],
            created_at,
        }
    }

    #[test]
    fn test_store_and_lookup() {
        let mut store = InMemorySessionStore::new();
        let now = SystemTime::now();
        store.store(&[1; 32], parameters(1, now));

        let found = store.lookup(&[1; 32]).unwrap();
        assert_eq!(found.master_secret.as_slice(), &[1; 48]);
        assert!(store.lookup(&[2; 32]).is_none());
    }

    #[test]
    fn test_remove_discards_entry() {
        let mut store = InMemorySessionStore::new();
        store.store(&[7; 32], parameters(7, SystemTime::now()));
        assert_eq!(store.len(), 1);

        store.remove(&[7; 32]);
        assert!(store.is_empty());
        assert!(store.lookup(&[7; 32]).is_none());
    }

    #[test]
    fn test_eviction_drops_oldest_session() {
        let mut store = InMemorySessionStore::with_max_entries(2);
        let base = SystemTime::now();
        store.store(&[1; 32], parameters(1, base - Duration::from_secs(30)));
        store.store(&[2; 32], parameters(2, base - Duration::from_secs(10)));
        store.store(&[3; 32], parameters(3, base));

        assert_eq!(store.len(), 2);
        assert!(store.lookup(&[1; 32]).is_none());
        assert!(store.lookup(&[2; 32]).is_some());
        assert!(store.lookup(&[3; 32]).is_some());
    }

    #[test]
    fn test_overwrite_does_not_evict() {
        let mut store = InMemorySessionStore::with_max_entries(2);
        let base = SystemTime::now();
        store.store(&[1; 32], parameters(1, base - Duration::from_secs(30)));
        store.store(&[2; 32], parameters(2, base - Duration::from_secs(10)));
        store.store(&[1; 32], parameters(9, base));

        assert_eq!(store.len(), 2);
        let refreshed = store.lookup(&[1; 32]).unwrap();
        assert_eq!(refreshed.master_secret.as_slice(), &[9; 48]);
        assert!(store.lookup(&[2; 32]).is_some());
    }

    #[test]
    fn test_zero_capacity_stores_nothing() {
        let mut store = InMemorySessionStore::with_max_entries(0);
        store.store(&[1; 32], parameters(1, SystemTime::now()));
        assert!(store.is_empty());
    }
}
