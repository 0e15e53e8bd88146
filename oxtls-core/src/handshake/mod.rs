//! Handshake state machines.
//!
//! [`ClientHandshake`] and [`ServerHandshake`] consume complete
//! handshake messages and push framed responses onto an outbound queue;
//! they never touch a transport. The session layer drives them: it
//! reassembles messages from records, feeds them in, drains the queue
//! and installs the key material they derive. Any processing error
//! leaves the machine in [`HandshakeState::Failed`], from which nothing
//! is accepted.

pub mod client;
pub mod server;

pub use client::ClientHandshake;
pub use server::ServerHandshake;

use subtle::ConstantTimeEq;

use crate::error::Result;
use crate::handshake_io::HandshakeMessage;
use crate::key_schedule::{self, KeyMaterial};
use crate::messages::Finished;
use crate::protocol::HandshakeType;
use crate::registry::{CipherSuiteId, CompressionMethod};
use crate::session::Role;
use crate::transcript::Transcript;
use oxtls_crypto::{CryptoProvider, HashAlgorithm};

/// Where a handshake currently stands.
///
/// Both roles share the one enum; each uses the subset of states its
/// message order visits. `Failed` is terminal and is entered from any
/// state the moment a message is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeState {
    /// Nothing sent or received yet.
    Idle,
    /// ClientHello is out, ServerHello awaited.
    HelloSent,
    /// Hello exchange done, server flight in progress.
    HelloReceived,
    /// Premaster exchanged, master secret derived.
    KeyExchange,
    /// Client certificate signature checked.
    CertificateVerify,
    /// Own ChangeCipherSpec queued.
    CcsSent,
    /// Peer's ChangeCipherSpec applied.
    CcsReceived,
    /// Peer's Finished verified.
    Finished,
    /// Handshake complete; application data may flow.
    Established,
    /// A message was rejected; the handshake is dead.
    Failed,
}

/// One item waiting to leave the handshake machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandshakeSend {
    /// A framed handshake message, header included.
    Message(Vec<u8>),
    /// The cipher change marker. The session switches its write state
    /// to the pending one immediately after this record goes out.
    ChangeCipherSpec,
}

/// Negotiated algorithms and keys waiting for ChangeCipherSpec.
///
/// Produced once per handshake as soon as the key block is derived. The
/// session splits it into two directional states and activates each at
/// its own cipher-change boundary.
#[derive(Debug)]
pub struct PendingCrypto {
    /// The negotiated cipher suite.
    pub suite: CipherSuiteId,
    /// The negotiated compression method.
    pub compression: CompressionMethod,
    /// Directional keys from the key block.
    pub keys: KeyMaterial,
}

/// Compare Finished verify data in constant time.
pub(crate) fn verify_data_matches(expected: &[u8], received: &[u8]) -> bool {
    expected.len() == received.len() && bool::from(expected.ct_eq(received))
}

/// Digest signed in ServerKeyExchange: MD5 and SHA-1 over both randoms
/// and the encoded DH parameters, concatenated.
pub(crate) fn key_exchange_digest(
    provider: &dyn CryptoProvider,
    client_random: &[u8],
    server_random: &[u8],
    params: &[u8],
) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(36);
    for algorithm in [HashAlgorithm::Md5, HashAlgorithm::Sha1] {
        let mut hash = provider.hash(algorithm)?;
        hash.update(client_random);
        hash.update(server_random);
        hash.update(params);
        out.extend_from_slice(&hash.finalize());
    }
    Ok(out)
}

/// Build a Finished message for `role` over the transcript so far.
///
/// The caller must not have added its own Finished to the transcript
/// yet; verify data never covers the message that carries it.
pub(crate) fn finished_message(
    provider: &dyn CryptoProvider,
    master_secret: &[u8],
    transcript: &Transcript,
    role: Role,
) -> Result<HandshakeMessage> {
    let digests = transcript.digests(provider)?;
    let verify_data = key_schedule::compute_verify_data(provider, master_secret, &digests, role)?;
    let payload = Finished::new(verify_data).encode()?;
    Ok(HandshakeMessage::new(HandshakeType::Finished, payload))
}

/// Verify data the peer's Finished must carry at this point.
pub(crate) fn expected_verify_data(
    provider: &dyn CryptoProvider,
    master_secret: &[u8],
    transcript: &Transcript,
    role: Role,
) -> Result<Vec<u8>> {
    let digests = transcript.digests(provider)?;
    key_schedule::compute_verify_data(provider, master_secret, &digests, role)
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxtls_crypto_mock::MockProvider;

    #[test]
    fn test_verify_data_comparison() {
        assert!(verify_data_matches(&[1, 2, 3], &[1, 2, 3]));
        assert!(!verify_data_matches(&[1, 2, 3], &[1, 2, 4]));
        assert!(!verify_data_matches(&[1, 2, 3], &[1, 2]));
        assert!(verify_data_matches(&[], &[]));
    }

    #[test]
    fn test_key_exchange_digest_is_md5_then_sha1() {
        let provider = MockProvider::new();
        let digest = key_exchange_digest(&provider, &[1; 32], &[2; 32], &[3, 4, 5]).unwrap();
        assert_eq!(digest.len(), 36);

        let again = key_exchange_digest(&provider, &[1; 32], &[2; 32], &[3, 4, 5]).unwrap();
        assert_eq!(digest, again);

        let different = key_exchange_digest(&provider, &[1; 32], &[2; 32], &[3, 4, 6]).unwrap();
        assert_ne!(digest, different);
    }
}
