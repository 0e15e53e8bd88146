//! Deterministic byte mixing shared by every mock primitive.
//!
//! A 64-bit FNV-1a state absorbs length-framed input parts, then gets
//! squeezed block by block into output of any length. No cryptographic
//! properties whatsoever; collisions are merely unlikely enough for tests.

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fnv_absorb(mut state: u64, data: &[u8]) -> u64 {
    for &b in data {
        state ^= u64::from(b);
        state = state.wrapping_mul(FNV_PRIME);
    }
    state
}

/// Mix the given parts and squeeze `out_len` bytes.
///
/// Parts are framed with their lengths so `["ab", "c"]` and `["a", "bc"]`
/// mix differently.
pub(crate) fn squeeze(parts: &[&[u8]], out_len: usize) -> Vec<u8> {
    let mut state = FNV_OFFSET;
    for part in parts {
        state = fnv_absorb(state, &(part.len() as u64).to_be_bytes());
        state = fnv_absorb(state, part);
    }

    let mut out = Vec::with_capacity(out_len);
    let mut counter: u64 = 0;
    while out.len() < out_len {
        let block = fnv_absorb(state, &counter.to_be_bytes());
        // A second round so single-bit input changes spread visibly.
        let block = fnv_absorb(block, &block.to_be_bytes());
        let bytes = block.to_be_bytes();
        let take = usize::min(8, out_len - out.len());
        out.extend_from_slice(&bytes[..take]);
        counter += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_squeeze_deterministic() {
        let a = squeeze(&[b"secret", b"label"], 48);
        let b = squeeze(&[b"secret", b"label"], 48);
        assert_eq!(a, b);
        assert_eq!(a.len(), 48);
    }

    #[test]
    fn test_squeeze_framing() {
        let joined = squeeze(&[b"ab", b"c"], 16);
        let split = squeeze(&[b"a", b"bc"], 16);
        assert_ne!(joined, split);
    }

    #[test]
    fn test_squeeze_length_extension_consistent() {
        let short = squeeze(&[b"x"], 8);
        let long = squeeze(&[b"x"], 24);
        assert_eq!(short, long[..8]);
    }
}
