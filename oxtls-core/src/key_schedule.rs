//! Key derivation pipeline.
//!
//! Two PRF invocations stand between the premaster secret and the
//! record keys. The first folds the premaster and both hello randoms
//! into the 48-byte master secret; the second expands the master
//! secret into the key block, with the randoms in the opposite order.
//! The key block is then cut into six slices in a fixed order: client
//! MAC secret, server MAC secret, client write key, server write key,
//! client write IV, server write IV. Slice sizes come from the
//! negotiated suite's registry entries, so the same code serves every
//! cipher/MAC combination.
//!
//! The Finished verify data is a third PRF call over the transcript
//! digests; client and server use different labels so the two
//! directions can never be confused.

use crate::error::{Error, Result};
use crate::protocol::{MASTER_SECRET_SIZE, RANDOM_SIZE, VERIFY_DATA_SIZE};
use crate::registry::CipherSuiteId;
use crate::session::Role;
use crate::transcript::TranscriptDigests;
use oxtls_crypto::CryptoProvider;
use zeroize::Zeroizing;

const MASTER_SECRET_LABEL: &[u8] = b"master secret";
const KEY_EXPANSION_LABEL: &[u8] = b"key expansion";
const CLIENT_FINISHED_LABEL: &[u8] = b"client finished";
const SERVER_FINISHED_LABEL: &[u8] = b"server finished";

/// The six key-block slices, in derivation order.
pub struct KeyMaterial {
    /// MAC secret protecting client-to-server records.
    pub client_write_mac_secret: Zeroizing<Vec<u8>>,

    /// MAC secret protecting server-to-client records.
    pub server_write_mac_secret: Zeroizing<Vec<u8>>,

    /// Cipher key for client-to-server records.
    pub client_write_key: Zeroizing<Vec<u8>>,

    /// Cipher key for server-to-client records.
    pub server_write_key: Zeroizing<Vec<u8>>,

    /// Initial IV for client-to-server records.
    pub client_write_iv: Zeroizing<Vec<u8>>,

    /// Initial IV for server-to-client records.
    pub server_write_iv: Zeroizing<Vec<u8>>,
}

impl core::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("mac_secret_len", &self.client_write_mac_secret.len())
            .field("key_len", &self.client_write_key.len())
            .field("iv_len", &self.client_write_iv.len())
            .finish()
    }
}

fn check_random(random: &[u8], which: &str) -> Result<()> {
    if random.len() != RANDOM_SIZE {
        return Err(Error::InternalError(format!(
            "{} random must be {} bytes, got {}",
            which,
            RANDOM_SIZE,
            random.len()
        )));
    }
    Ok(())
}

fn check_master(master_secret: &[u8]) -> Result<()> {
    if master_secret.len() != MASTER_SECRET_SIZE {
        return Err(Error::InternalError(format!(
            "master secret must be {} bytes, got {}",
            MASTER_SECRET_SIZE,
            master_secret.len()
        )));
    }
    Ok(())
}

/// Derive the 48-byte master secret from the premaster secret.
///
/// Seed order is client random then server random.
pub fn compute_master_secret(
    provider: &dyn CryptoProvider,
    premaster: &[u8],
    client_random: &[u8],
    server_random: &[u8],
) -> Result<Zeroizing<Vec<u8>>> {
    check_random(client_random, "client")?;
    check_random(server_random, "server")?;
    if premaster.is_empty() {
        return Err(Error::InternalError("empty premaster secret".into()));
    }

    let mut seed = Vec::with_capacity(RANDOM_SIZE * 2);
    seed.extend_from_slice(client_random);
    seed.extend_from_slice(server_random);

    let master = provider
        .prf()
        .derive(premaster, MASTER_SECRET_LABEL, &seed, MASTER_SECRET_SIZE)?;
    Ok(Zeroizing::new(master))
}

/// Expand the master secret into `total_len` key-block bytes.
///
/// Seed order reverses to server random then client random.
pub fn compute_key_block(
    provider: &dyn CryptoProvider,
    master_secret: &[u8],
    client_random: &[u8],
    server_random: &[u8],
    total_len: usize,
) -> Result<Zeroizing<Vec<u8>>> {
    check_master(master_secret)?;
    check_random(client_random, "client")?;
    check_random(server_random, "server")?;

    let mut seed = Vec::with_capacity(RANDOM_SIZE * 2);
    seed.extend_from_slice(server_random);
    seed.extend_from_slice(client_random);

    let block = provider
        .prf()
        .derive(master_secret, KEY_EXPANSION_LABEL, &seed, total_len)?;
    Ok(Zeroizing::new(block))
}

/// Derive the full directional key material for a negotiated suite.
pub fn derive_key_material(
    provider: &dyn CryptoProvider,
    master_secret: &[u8],
    client_random: &[u8],
    server_random: &[u8],
    suite: CipherSuiteId,
) -> Result<KeyMaterial> {
    let cipher = suite
        .cipher()
        .ok_or_else(|| Error::InternalError(format!("unregistered suite {}", suite)))?;
    let mac = suite
        .mac()
        .ok_or_else(|| Error::InternalError(format!("unregistered suite {}", suite)))?;

    let mac_size = mac
        .digest_size()
        .ok_or_else(|| Error::InternalError("unregistered MAC".into()))?;
    let key_size = cipher
        .key_size()
        .ok_or_else(|| Error::InternalError("unregistered cipher".into()))?;
    let iv_size = cipher
        .iv_size()
        .ok_or_else(|| Error::InternalError("unregistered cipher".into()))?;

    let total = 2 * (mac_size + key_size + iv_size);
    let block = compute_key_block(
        provider,
        master_secret,
        client_random,
        server_random,
        total,
    )?;

    let mut offset = 0;
    let mut take = |len: usize| {
        let slice = Zeroizing::new(block[offset..offset + len].to_vec());
        offset += len;
        slice
    };

    Ok(KeyMaterial {
        client_write_mac_secret: take(mac_size),
        server_write_mac_secret: take(mac_size),
        client_write_key: take(key_size),
        server_write_key: take(key_size),
        client_write_iv: take(iv_size),
        server_write_iv: take(iv_size),
    })
}

/// Compute the 12-byte Finished verify data for one role.
pub fn compute_verify_data(
    provider: &dyn CryptoProvider,
    master_secret: &[u8],
    digests: &TranscriptDigests,
    role: Role,
) -> Result<Vec<u8>> {
    check_master(master_secret)?;

    let label = match role {
        Role::Client => CLIENT_FINISHED_LABEL,
        Role::Server => SERVER_FINISHED_LABEL,
    };

    Ok(provider
        .prf()
        .derive(master_secret, label, &digests.concat(), VERIFY_DATA_SIZE)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxtls_crypto_mock::MockProvider;

    fn fixed_randoms() -> ([u8; 32], [u8; 32]) {
        ([0x11; 32], [0x22; 32])
    }

    #[test]
    fn test_master_secret_is_48_bytes_and_deterministic() {
        let provider = MockProvider::new();
        let (client, server) = fixed_randoms();
        let premaster = [0x55u8; 48];

        let a = compute_master_secret(&provider, &premaster, &client, &server).unwrap();
        let b = compute_master_secret(&provider, &premaster, &client, &server).unwrap();
        assert_eq!(a.len(), MASTER_SECRET_SIZE);
        assert_eq!(*a, *b);
    }

    #[test]
    fn test_master_secret_depends_on_random_order() {
        let provider = MockProvider::new();
        let (client, server) = fixed_randoms();
        let premaster = [0x55u8; 48];

        let forward = compute_master_secret(&provider, &premaster, &client, &server).unwrap();
        let swapped = compute_master_secret(&provider, &premaster, &server, &client).unwrap();
        assert_ne!(*forward, *swapped);
    }

    #[test]
    fn test_key_block_determinism() {
        let provider = MockProvider::new();
        let (client, server) = fixed_randoms();
        let master = [0x77u8; 48];

        let a = compute_key_block(&provider, &master, &client, &server, 104).unwrap();
        let b = compute_key_block(&provider, &master, &client, &server, 104).unwrap();
        assert_eq!(*a, *b);
        assert_eq!(a.len(), 104);
    }

    #[test]
    fn test_key_block_slicing_offsets() {
        // SHA MAC (20) + 16-byte key + 16-byte IV: slices must sit at
        // [0,20) [20,40) [40,56) [56,72) [72,88) [88,104).
        let provider = MockProvider::new();
        let (client, server) = fixed_randoms();
        let master = [0x77u8; 48];
        let suite = CipherSuiteId::new(0x00, 0x2F); // RSA_RIJNDAEL_128_CBC_SHA

        let block = compute_key_block(&provider, &master, &client, &server, 104).unwrap();
        let keys = derive_key_material(&provider, &master, &client, &server, suite).unwrap();

        assert_eq!(*keys.client_write_mac_secret, block[0..20]);
        assert_eq!(*keys.server_write_mac_secret, block[20..40]);
        assert_eq!(*keys.client_write_key, block[40..56]);
        assert_eq!(*keys.server_write_key, block[56..72]);
        assert_eq!(*keys.client_write_iv, block[72..88]);
        assert_eq!(*keys.server_write_iv, block[88..104]);
    }

    #[test]
    fn test_key_block_seed_is_reversed() {
        let provider = MockProvider::new();
        let (client, server) = fixed_randoms();
        let master = [0x77u8; 48];

        // Expanding with swapped randoms must match the reversal the
        // key block applies internally.
        let block = compute_key_block(&provider, &master, &client, &server, 64).unwrap();
        let manual = provider
            .prf()
            .derive(
                &master,
                b"key expansion",
                &[server.as_slice(), client.as_slice()].concat(),
                64,
            )
            .unwrap();
        assert_eq!(*block, manual);
    }

    #[test]
    fn test_verify_data_role_labels_differ() {
        let provider = MockProvider::new();
        let master = [0x99u8; 48];
        let digests = TranscriptDigests {
            md5: vec![1; 16],
            sha1: vec![2; 20],
        };

        let client = compute_verify_data(&provider, &master, &digests, Role::Client).unwrap();
        let server = compute_verify_data(&provider, &master, &digests, Role::Server).unwrap();
        assert_eq!(client.len(), VERIFY_DATA_SIZE);
        assert_eq!(server.len(), VERIFY_DATA_SIZE);
        assert_ne!(client, server);
    }

    #[test]
    fn test_bad_input_sizes_rejected() {
        let provider = MockProvider::new();
        let (client, server) = fixed_randoms();

        assert!(compute_master_secret(&provider, &[1, 2, 3], &client[..16], &server).is_err());
        assert!(compute_key_block(&provider, &[0u8; 40], &client, &server, 104).is_err());
        assert!(compute_master_secret(&provider, &[], &client, &server).is_err());
    }

    #[test]
    fn test_stream_cipher_key_material_has_empty_iv() {
        let provider = MockProvider::new();
        let (client, server) = fixed_randoms();
        let master = [0x42u8; 48];
        let suite = CipherSuiteId::new(0x00, 0x04); // RSA_ARCFOUR_MD5

        let keys = derive_key_material(&provider, &master, &client, &server, suite).unwrap();
        assert_eq!(keys.client_write_mac_secret.len(), 16);
        assert_eq!(keys.client_write_key.len(), 16);
        assert!(keys.client_write_iv.is_empty());
        assert!(keys.server_write_iv.is_empty());
    }
}
