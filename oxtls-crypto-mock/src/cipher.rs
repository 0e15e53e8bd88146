//! Mock bulk cipher: XOR against a position-keyed keystream.

use oxtls_crypto::{BulkCipher, CipherAlgorithm, Error, Result};

use crate::mix::squeeze;

const STREAM_BLOCK: usize = 32;

/// XOR keystream cipher context.
///
/// The keystream is squeezed from (key, iv, block counter), so both ends
/// stay in sync as long as they process fragments in the same order, which
/// is exactly what record protection guarantees. Encrypt and decrypt are
/// the same operation.
pub struct MockCipher {
    algorithm: CipherAlgorithm,
    key: Vec<u8>,
    iv: Vec<u8>,
    pos: u64,
}

impl std::fmt::Debug for MockCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockCipher")
            .field("algorithm", &self.algorithm)
            .field("pos", &self.pos)
            .finish()
    }
}

impl MockCipher {
    pub(crate) fn new(algorithm: CipherAlgorithm, key: &[u8], iv: &[u8]) -> Result<Self> {
        if key.len() != algorithm.key_size() {
            return Err(Error::InvalidKeySize {
                expected: algorithm.key_size(),
                actual: key.len(),
            });
        }
        if iv.len() != algorithm.iv_size() {
            return Err(Error::InvalidIvSize {
                expected: algorithm.iv_size(),
                actual: iv.len(),
            });
        }
        Ok(Self {
            algorithm,
            key: key.to_vec(),
            iv: iv.to_vec(),
            pos: 0,
        })
    }

    fn xor_in_place(&mut self, data: &mut [u8]) {
        for b in data.iter_mut() {
            let block_index = self.pos / STREAM_BLOCK as u64;
            let offset = (self.pos % STREAM_BLOCK as u64) as usize;
            let block = squeeze(
                &[b"cipher", &self.key, &self.iv, &block_index.to_be_bytes()],
                STREAM_BLOCK,
            );
            *b ^= block[offset];
            self.pos += 1;
        }
    }
}

impl BulkCipher for MockCipher {
    fn encrypt(&mut self, plaintext: &[u8]) -> Result<Vec<u8>> {
        if self.algorithm.is_block() && plaintext.len() % self.algorithm.block_size() != 0 {
            return Err(Error::InvalidBlockLength);
        }
        let mut out = plaintext.to_vec();
        self.xor_in_place(&mut out);
        Ok(out)
    }

    fn decrypt(&mut self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        if self.algorithm.is_block() && ciphertext.len() % self.algorithm.block_size() != 0 {
            return Err(Error::InvalidBlockLength);
        }
        let mut out = ciphertext.to_vec();
        self.xor_in_place(&mut out);
        Ok(out)
    }

    fn algorithm(&self) -> CipherAlgorithm {
        self.algorithm
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_across_fragments() {
        let key = vec![7u8; 16];
        let mut enc = MockCipher::new(CipherAlgorithm::Arcfour128, &key, &[]).unwrap();
        let mut dec = MockCipher::new(CipherAlgorithm::Arcfour128, &key, &[]).unwrap();

        let c1 = enc.encrypt(b"first fragment").unwrap();
        let c2 = enc.encrypt(b"second fragment").unwrap();
        assert_eq!(dec.decrypt(&c1).unwrap(), b"first fragment");
        assert_eq!(dec.decrypt(&c2).unwrap(), b"second fragment");
    }

    #[test]
    fn test_block_cipher_rejects_ragged_input() {
        let key = vec![1u8; 16];
        let iv = vec![2u8; 16];
        let mut c = MockCipher::new(CipherAlgorithm::Rijndael128Cbc, &key, &iv).unwrap();
        assert_eq!(c.encrypt(&[0u8; 15]), Err(Error::InvalidBlockLength));
        assert!(c.encrypt(&[0u8; 16]).is_ok());
    }

    #[test]
    fn test_key_size_checked() {
        let err = MockCipher::new(CipherAlgorithm::TripleDesEdeCbc, &[0u8; 16], &[0u8; 8]);
        assert_eq!(
            err.err(),
            Some(Error::InvalidKeySize {
                expected: 24,
                actual: 16
            })
        );
    }
}
