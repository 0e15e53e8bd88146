//! Mock public-key operations.
//!
//! Keypairs are "reflective": the public value equals the private value,
//! which lets both sides of a handshake agree without any arithmetic.
//! [`MockProvider::generate_credentials`](crate::MockProvider::generate_credentials)
//! hands out matching blob pairs for the certificate slot.

use oxtls_crypto::{DhKeyPair, DhParams, DiffieHellman, Error, Random, Result, Rsa};
use zeroize::Zeroizing;

use crate::mix::squeeze;
use crate::random::MockRandom;

const DH_SECRET_LEN: usize = 32;

/// XOR-agreement mock DH.
///
/// `compute(peer_public, private)` is plain byte-wise XOR. With reflective
/// keypairs both peers XOR the same two values, so the shared secrets
/// match.
#[derive(Debug)]
pub struct MockDh {
    random: MockRandom,
}

impl MockDh {
    pub(crate) fn new(random: MockRandom) -> Self {
        Self { random }
    }
}

impl DiffieHellman for MockDh {
    fn generate(&self, params: &DhParams) -> Result<DhKeyPair> {
        if params.prime.is_empty() || params.generator.is_empty() {
            return Err(Error::InvalidDhParams);
        }
        let secret = self.random.generate(DH_SECRET_LEN)?;
        Ok(DhKeyPair {
            public: secret.clone(),
            private: Zeroizing::new(secret),
        })
    }

    fn compute(
        &self,
        params: &DhParams,
        peer_public: &[u8],
        private: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>> {
        if params.prime.is_empty() || params.generator.is_empty() {
            return Err(Error::InvalidDhParams);
        }
        if peer_public.len() != private.len() {
            return Err(Error::KeyExchangeFailed);
        }
        let shared = peer_public
            .iter()
            .zip(private.iter())
            .map(|(a, b)| a ^ b)
            .collect();
        Ok(Zeroizing::new(shared))
    }
}

/// XOR key-transport and mixer-signature mock RSA.
#[derive(Debug, Default)]
pub struct MockRsa;

const SIGNATURE_LEN: usize = 32;

impl MockRsa {
    fn transport_pad(key: &[u8], data: &[u8]) -> Vec<u8> {
        let pad = squeeze(&[b"rsa-transport", key], data.len());
        data.iter().zip(pad.iter()).map(|(a, b)| a ^ b).collect()
    }
}

impl Rsa for MockRsa {
    fn encrypt(&self, public_key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
        if public_key.is_empty() {
            return Err(Error::InvalidPublicKey);
        }
        Ok(Self::transport_pad(public_key, plaintext))
    }

    fn decrypt(&self, private_key: &[u8], ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        if private_key.is_empty() {
            return Err(Error::InvalidPrivateKey);
        }
        Ok(Zeroizing::new(Self::transport_pad(private_key, ciphertext)))
    }

    fn sign(&self, private_key: &[u8], digest: &[u8]) -> Result<Vec<u8>> {
        if private_key.is_empty() {
            return Err(Error::InvalidPrivateKey);
        }
        Ok(squeeze(&[b"rsa-sign", private_key, digest], SIGNATURE_LEN))
    }

    fn verify(&self, public_key: &[u8], digest: &[u8], signature: &[u8]) -> bool {
        squeeze(&[b"rsa-sign", public_key, digest], SIGNATURE_LEN) == signature
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> DhParams {
        DhParams {
            prime: vec![0xff; 16],
            generator: vec![2],
        }
    }

    #[test]
    fn test_dh_agreement() {
        let dh = MockDh::new(MockRandom::with_seed(9));
        let alice = dh.generate(&params()).unwrap();
        let bob = dh.generate(&params()).unwrap();
        assert_ne!(alice.public, bob.public);

        let s1 = dh.compute(&params(), &bob.public, &alice.private).unwrap();
        let s2 = dh.compute(&params(), &alice.public, &bob.private).unwrap();
        assert_eq!(*s1, *s2);
    }

    #[test]
    fn test_rsa_transport_round_trip() {
        let rsa = MockRsa;
        let key = b"reflective-key-blob".to_vec();
        let ct = rsa.encrypt(&key, b"premaster").unwrap();
        assert_ne!(&ct, b"premaster");
        assert_eq!(&*rsa.decrypt(&key, &ct).unwrap(), b"premaster");
    }

    #[test]
    fn test_rsa_signatures() {
        let rsa = MockRsa;
        let key = b"signing-key".to_vec();
        let sig = rsa.sign(&key, b"digest").unwrap();
        assert!(rsa.verify(&key, b"digest", &sig));
        assert!(!rsa.verify(&key, b"other digest", &sig));
        assert!(!rsa.verify(b"wrong key", b"digest", &sig));
    }
}
