//! Server side of the handshake.

use std::time::SystemTime;

use zeroize::Zeroizing;

use crate::error::{Error, Result};
use crate::handshake::{
    expected_verify_data, finished_message, key_exchange_digest, verify_data_matches,
    HandshakeSend, HandshakeState, PendingCrypto,
};
use crate::handshake_io::HandshakeMessage;
use crate::key_schedule;
use crate::messages::{
    Certificate, CertificateRequest, CertificateVerify, ClientHello, ClientKeyExchange, Finished,
    ServerDhParams, ServerHello, ServerHelloDone, ServerKeyExchange, CERT_TYPE_DSS_SIGN,
    CERT_TYPE_RSA_SIGN,
};
use crate::protocol::{HandshakeType, RANDOM_SIZE, RSA_PREMASTER_SIZE, SESSION_ID_MAX_SIZE};
use crate::registry::{CipherSuiteId, CompressionMethod, KxCapabilities, TlsVersion};
use crate::selector;
use crate::session::{Config, Role, SecurityParameters};
use crate::transcript::Transcript;
use oxtls_crypto::DhParams;

/// Server handshake state machine.
///
/// Sits idle until the ClientHello arrives, then produces the whole
/// server flight at once. Resumption is decided while processing the
/// hello: a fresh session ID in the configured store, still inside the
/// expiry window and compatible with the offer, short-circuits into the
/// abbreviated exchange.
pub struct ServerHandshake {
    state: HandshakeState,
    outbound: Vec<HandshakeSend>,
    pending_crypto: Option<PendingCrypto>,
    transcript: Transcript,

    client_random: [u8; RANDOM_SIZE],
    server_random: [u8; RANDOM_SIZE],
    client_offered_version: (u8, u8),

    version: Option<TlsVersion>,
    suite: Option<CipherSuiteId>,
    compression: Option<CompressionMethod>,
    session_id: Vec<u8>,
    resumed: bool,
    resumed_created_at: Option<SystemTime>,

    dh_group: Option<DhParams>,
    dh_private: Option<Zeroizing<Vec<u8>>>,
    certificate_request_sent: bool,
    client_certificates: Option<Vec<Vec<u8>>>,

    master_secret: Option<Zeroizing<Vec<u8>>>,
    parameters: Option<SecurityParameters>,
}

impl core::fmt::Debug for ServerHandshake {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ServerHandshake")
            .field("state", &self.state)
            .field("version", &self.version)
            .field("suite", &self.suite)
            .field("resumed", &self.resumed)
            .finish()
    }
}

/// Highest enabled version at or below the client's offer.
fn select_version(config: &Config, offer: (u8, u8)) -> Result<TlsVersion> {
    config
        .versions
        .iter()
        .copied()
        .filter(|v| v.wire().map(|w| w <= offer).unwrap_or(false))
        .max_by(|a, b| a.cmp_wire(*b))
        .ok_or(Error::VersionNotSupported(offer.0, offer.1))
}

impl ServerHandshake {
    /// Create an idle server handshake.
    pub fn new() -> Self {
        Self {
            state: HandshakeState::Idle,
            outbound: Vec::new(),
            pending_crypto: None,
            transcript: Transcript::new(),
            client_random: [0; RANDOM_SIZE],
            server_random: [0; RANDOM_SIZE],
            client_offered_version: (0, 0),
            version: None,
            suite: None,
            compression: None,
            session_id: Vec::new(),
            resumed: false,
            resumed_created_at: None,
            dh_group: None,
            dh_private: None,
            certificate_request_sent: false,
            client_certificates: None,
            master_secret: None,
            parameters: None,
        }
    }

    /// Current state.
    pub fn state(&self) -> HandshakeState {
        self.state
    }

    /// Whether the handshake has completed.
    pub fn is_established(&self) -> bool {
        self.state == HandshakeState::Established
    }

    /// The negotiated version, once the hello exchange is done.
    pub fn version(&self) -> Option<TlsVersion> {
        self.version
    }

    /// Negotiated parameters, available once established.
    pub fn security_parameters(&self) -> Option<&SecurityParameters> {
        self.parameters.as_ref()
    }

    /// Whether the handshake resumed a stored session.
    pub fn was_resumed(&self) -> bool {
        self.resumed
    }

    /// Drain the queued outbound items in send order.
    pub fn take_outbound(&mut self) -> Vec<HandshakeSend> {
        std::mem::take(&mut self.outbound)
    }

    /// Take the derived key material, once per handshake.
    pub fn take_pending_crypto(&mut self) -> Option<PendingCrypto> {
        self.pending_crypto.take()
    }

    /// Process one complete inbound handshake message.
    ///
    /// `raw` is the framed encoding, header included; it feeds the
    /// transcript. Any error is terminal.
    pub fn handle_message(
        &mut self,
        config: &Config,
        message: HandshakeMessage,
        raw: &[u8],
    ) -> Result<()> {
        match self.dispatch(config, message, raw) {
            Ok(()) => Ok(()),
            Err(error) => {
                self.state = HandshakeState::Failed;
                Err(error)
            }
        }
    }

    /// Apply the peer's ChangeCipherSpec.
    pub fn handle_change_cipher_spec(&mut self) -> Result<()> {
        let valid = match self.state {
            HandshakeState::KeyExchange => !self.certificate_verify_expected(),
            HandshakeState::CertificateVerify => true,
            HandshakeState::CcsSent => self.resumed,
            _ => false,
        };
        if !valid {
            let state = self.state;
            self.state = HandshakeState::Failed;
            return Err(Error::UnexpectedMessage(format!(
                "ChangeCipherSpec in state {:?}",
                state
            )));
        }
        self.state = HandshakeState::CcsReceived;
        Ok(())
    }

    fn dispatch(&mut self, config: &Config, message: HandshakeMessage, raw: &[u8]) -> Result<()> {
        match (self.state, message.msg_type) {
            (HandshakeState::Idle, HandshakeType::ClientHello) => {
                self.process_client_hello(config, &message.payload, raw)
            }
            (HandshakeState::HelloReceived, HandshakeType::Certificate) => {
                self.process_client_certificate(&message.payload, raw)
            }
            (HandshakeState::HelloReceived, HandshakeType::ClientKeyExchange) => {
                self.process_client_key_exchange(config, &message.payload, raw)
            }
            (HandshakeState::KeyExchange, HandshakeType::CertificateVerify) => {
                self.process_certificate_verify(config, &message.payload, raw)
            }
            (HandshakeState::CcsReceived, HandshakeType::Finished) => {
                self.process_finished(config, &message.payload, raw)
            }
            (state, msg_type) => Err(Error::UnexpectedMessage(format!(
                "{:?} in state {:?}",
                msg_type, state
            ))),
        }
    }

    fn process_client_hello(&mut self, config: &Config, payload: &[u8], raw: &[u8]) -> Result<()> {
        let hello = ClientHello::decode(payload)?;
        self.transcript.extend(raw);

        self.client_random = hello.random;
        self.client_offered_version = hello.client_version;

        let version = select_version(config, hello.client_version)?;
        self.version = Some(version);

        let stored = self.lookup_resumable(config, &hello, version);
        if let Some(stored) = stored {
            return self.resume_session(config, stored);
        }
        self.send_server_flight(config, &hello)
    }

    /// Find a stored session this hello can resume, expiring stale ones.
    fn lookup_resumable(
        &self,
        config: &Config,
        hello: &ClientHello,
        version: TlsVersion,
    ) -> Option<SecurityParameters> {
        if !config.resumable || hello.session_id.is_empty() {
            return None;
        }
        let store = config.session_store.as_ref()?;
        let mut guard = store.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let stored = guard.lookup(&hello.session_id)?;
        if stored.is_expired(config.expire_time) {
            guard.remove(&hello.session_id);
            tracing::debug!("stored session expired; continuing with a full handshake");
            return None;
        }

        let compression_offered = stored
            .compression
            .wire_number()
            .map(|w| hello.compression_methods.contains(&w))
            .unwrap_or(false);
        if stored.version != version
            || !hello.cipher_suites.contains(&stored.cipher_suite)
            || !compression_offered
        {
            tracing::debug!("stored session no longer matches the offer");
            return None;
        }
        Some(stored)
    }

    fn resume_session(&mut self, config: &Config, stored: SecurityParameters) -> Result<()> {
        let provider = config.provider.as_ref();
        provider.random().fill(&mut self.server_random)?;

        self.suite = Some(stored.cipher_suite);
        self.compression = Some(stored.compression);
        self.session_id = stored.session_id.clone();
        self.resumed = true;
        self.resumed_created_at = Some(stored.created_at);

        let wire_version = stored
            .version
            .wire()
            .ok_or_else(|| Error::InternalError("unregistered protocol version".into()))?;
        let compression_wire = stored
            .compression
            .wire_number()
            .ok_or_else(|| Error::InternalError("unregistered compression method".into()))?;

        let hello = ServerHello::new(
            wire_version,
            self.server_random,
            self.session_id.clone(),
            stored.cipher_suite,
            compression_wire,
        );
        self.queue_message(HandshakeMessage::new(
            HandshakeType::ServerHello,
            hello.encode()?,
        ))?;

        self.master_secret = Some(stored.master_secret.clone());
        self.derive_pending_crypto(config)?;
        self.outbound.push(HandshakeSend::ChangeCipherSpec);

        let master = self
            .master_secret
            .as_ref()
            .ok_or_else(|| Error::InternalError("master secret missing".into()))?;
        let finished = finished_message(provider, master, &self.transcript, Role::Server)?;
        self.queue_message(finished)?;
        self.state = HandshakeState::CcsSent;

        tracing::info!(
            suite = %stored.cipher_suite,
            "resuming session from store"
        );
        Ok(())
    }

    fn send_server_flight(&mut self, config: &Config, hello: &ClientHello) -> Result<()> {
        let provider = config.provider.as_ref();
        let version = self
            .version
            .ok_or_else(|| Error::InternalError("no negotiated version".into()))?;

        let ranked = selector::ranked_suites(&config.priorities);
        let suite = ranked
            .into_iter()
            .find(|s| hello.cipher_suites.contains(s))
            .ok_or_else(|| Error::HandshakeFailure("no cipher suite in common".into()))?;
        let capabilities = suite
            .kx()
            .and_then(|k| k.capabilities())
            .ok_or_else(|| Error::InternalError("ranked suite lost its registry entry".into()))?;

        let compression_wire = selector::compression_wire_numbers(&config.priorities)
            .into_iter()
            .find(|w| hello.compression_methods.contains(w))
            .ok_or_else(|| Error::HandshakeFailure("no compression method in common".into()))?;
        let compression = CompressionMethod::from_wire_number(compression_wire)
            .ok_or_else(|| Error::InternalError("enabled compression lost its entry".into()))?;

        self.suite = Some(suite);
        self.compression = Some(compression);

        provider.random().fill(&mut self.server_random)?;
        self.session_id = if config.resumable && config.session_store.is_some() {
            let mut id = vec![0u8; SESSION_ID_MAX_SIZE];
            provider.random().fill(&mut id)?;
            id
        } else {
            Vec::new()
        };

        let wire_version = version
            .wire()
            .ok_or_else(|| Error::InternalError("unregistered protocol version".into()))?;
        let server_hello = ServerHello::new(
            wire_version,
            self.server_random,
            self.session_id.clone(),
            suite,
            compression_wire,
        );
        self.queue_message(HandshakeMessage::new(
            HandshakeType::ServerHello,
            server_hello.encode()?,
        ))?;

        if capabilities.server_certificate {
            if config.certificate_chain.is_empty() {
                return Err(Error::HandshakeFailure(
                    "key exchange requires server credentials".into(),
                ));
            }
            let certificate = Certificate::new(config.certificate_chain.clone());
            self.queue_message(HandshakeMessage::new(
                HandshakeType::Certificate,
                certificate.encode()?,
            ))?;
        }

        if capabilities.dh_public_value {
            let group = config.dh_params.clone().ok_or_else(|| {
                Error::HandshakeFailure("no Diffie-Hellman parameters configured".into())
            })?;
            let keypair = provider.dh().generate(&group)?;
            let served = ServerDhParams {
                prime: group.prime.clone(),
                generator: group.generator.clone(),
                public: keypair.public.clone(),
            };

            let exchange = if capabilities.server_certificate {
                let unsigned = ServerKeyExchange::anonymous(served);
                let digest = key_exchange_digest(
                    provider,
                    &self.client_random,
                    &self.server_random,
                    &unsigned.signed_params()?,
                )?;
                let key = config.private_key.as_ref().ok_or_else(|| {
                    Error::HandshakeFailure("server credentials incomplete".into())
                })?;
                let signature = provider.rsa().sign(key, &digest)?;
                ServerKeyExchange::signed(unsigned.params, signature)
            } else {
                ServerKeyExchange::anonymous(served)
            };
            self.queue_message(HandshakeMessage::new(
                HandshakeType::ServerKeyExchange,
                exchange.encode()?,
            ))?;

            self.dh_group = Some(group);
            self.dh_private = Some(keypair.private);
        }

        if capabilities.client_certificate && config.request_client_certificate {
            let request =
                CertificateRequest::new(vec![CERT_TYPE_RSA_SIGN, CERT_TYPE_DSS_SIGN], Vec::new());
            self.queue_message(HandshakeMessage::new(
                HandshakeType::CertificateRequest,
                request.encode()?,
            ))?;
            self.certificate_request_sent = true;
        }

        self.queue_message(HandshakeMessage::new(
            HandshakeType::ServerHelloDone,
            ServerHelloDone.encode(),
        ))?;
        self.state = HandshakeState::HelloReceived;

        tracing::debug!(
            version = ?version,
            suite = %suite,
            "sent server flight"
        );
        Ok(())
    }

    fn process_client_certificate(&mut self, payload: &[u8], raw: &[u8]) -> Result<()> {
        if !self.certificate_request_sent {
            return Err(Error::UnexpectedMessage(
                "Certificate without a CertificateRequest".into(),
            ));
        }
        if self.client_certificates.is_some() {
            return Err(Error::UnexpectedMessage("second Certificate".into()));
        }

        let certificate = Certificate::decode(payload)?;
        self.transcript.extend(raw);
        if certificate.certificate_list.is_empty() {
            tracing::debug!("client declined to send a certificate");
        }
        self.client_certificates = Some(certificate.certificate_list);
        Ok(())
    }

    fn process_client_key_exchange(
        &mut self,
        config: &Config,
        payload: &[u8],
        raw: &[u8],
    ) -> Result<()> {
        if self.certificate_request_sent && self.client_certificates.is_none() {
            return Err(Error::UnexpectedMessage(
                "ClientKeyExchange before the requested Certificate".into(),
            ));
        }

        let exchange = ClientKeyExchange::decode(payload)?;
        self.transcript.extend(raw);

        let capabilities = self.capabilities()?;
        let provider = config.provider.as_ref();

        let premaster: Zeroizing<Vec<u8>> = if capabilities.rsa_premaster {
            self.rsa_premaster(config, &exchange.exchange_data)?
        } else if capabilities.dh_public_value {
            let private = self
                .dh_private
                .take()
                .ok_or_else(|| Error::InternalError("DH private value missing".into()))?;
            let group = self
                .dh_group
                .take()
                .ok_or_else(|| Error::InternalError("DH group missing".into()))?;
            provider
                .dh()
                .compute(&group, &exchange.exchange_data, &private)?
        } else {
            return Err(Error::HandshakeFailure(
                "negotiated key exchange cannot deliver a premaster secret".into(),
            ));
        };

        let master = key_schedule::compute_master_secret(
            provider,
            &premaster,
            &self.client_random,
            &self.server_random,
        )?;
        self.master_secret = Some(master);
        self.derive_pending_crypto(config)?;
        self.state = HandshakeState::KeyExchange;
        Ok(())
    }

    /// Recover the premaster from an RSA ClientKeyExchange.
    ///
    /// A premaster that fails to decrypt, has the wrong length or
    /// carries the wrong version is replaced with random bytes; the
    /// mismatch surfaces at Finished, never here.
    fn rsa_premaster(&self, config: &Config, ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        let provider = config.provider.as_ref();
        let key = config
            .private_key
            .as_ref()
            .ok_or_else(|| Error::InternalError("server credentials missing".into()))?;

        let (major, minor) = self.client_offered_version;
        match provider.rsa().decrypt(key, ciphertext) {
            Ok(premaster)
                if premaster.len() == RSA_PREMASTER_SIZE
                    && premaster[0] == major
                    && premaster[1] == minor =>
            {
                Ok(premaster)
            }
            _ => {
                tracing::debug!("premaster rejected, substituting random bytes");
                let mut premaster = Zeroizing::new(vec![0u8; RSA_PREMASTER_SIZE]);
                premaster[0] = major;
                premaster[1] = minor;
                provider.random().fill(&mut premaster[2..])?;
                Ok(premaster)
            }
        }
    }

    fn process_certificate_verify(
        &mut self,
        config: &Config,
        payload: &[u8],
        raw: &[u8],
    ) -> Result<()> {
        if !self.certificate_verify_expected() {
            return Err(Error::UnexpectedMessage(
                "CertificateVerify without a verifiable certificate".into(),
            ));
        }

        let verify = CertificateVerify::decode(payload)?;
        let leaf = self
            .client_certificates
            .as_ref()
            .and_then(|c| c.first())
            .ok_or_else(|| Error::InternalError("client certificate missing".into()))?;

        let provider = config.provider.as_ref();
        let digests = self.transcript.digests(provider)?;
        if !provider.rsa().verify(leaf, &digests.concat(), &verify.signature) {
            return Err(Error::VerifyFailed("client certificate signature".into()));
        }

        self.transcript.extend(raw);
        self.state = HandshakeState::CertificateVerify;
        Ok(())
    }

    fn process_finished(&mut self, config: &Config, payload: &[u8], raw: &[u8]) -> Result<()> {
        let provider = config.provider.as_ref();
        let finished = Finished::decode(payload)?;
        let master = self
            .master_secret
            .as_ref()
            .ok_or_else(|| Error::InternalError("master secret missing".into()))?;

        let expected = expected_verify_data(provider, master, &self.transcript, Role::Client)?;
        if !verify_data_matches(&expected, &finished.verify_data) {
            return Err(Error::VerifyFailed("client finished verify data".into()));
        }
        self.transcript.extend(raw);
        self.state = HandshakeState::Finished;

        if !self.resumed {
            self.outbound.push(HandshakeSend::ChangeCipherSpec);
            let finished = finished_message(provider, master, &self.transcript, Role::Server)?;
            self.queue_message(finished)?;
        }

        self.finalize();
        Ok(())
    }

    fn certificate_verify_expected(&self) -> bool {
        let has_certificate = self
            .client_certificates
            .as_ref()
            .map(|c| !c.is_empty())
            .unwrap_or(false);
        let verify_capable = self
            .capabilities()
            .map(|c| c.certificate_verify)
            .unwrap_or(false);
        self.certificate_request_sent && has_certificate && verify_capable
    }

    fn capabilities(&self) -> Result<KxCapabilities> {
        self.suite
            .and_then(|s| s.kx())
            .and_then(|k| k.capabilities())
            .ok_or_else(|| Error::InternalError("negotiated suite lost its registry entry".into()))
    }

    fn derive_pending_crypto(&mut self, config: &Config) -> Result<()> {
        let suite = self
            .suite
            .ok_or_else(|| Error::InternalError("no negotiated suite".into()))?;
        let compression = self
            .compression
            .ok_or_else(|| Error::InternalError("no negotiated compression".into()))?;
        let master = self
            .master_secret
            .as_ref()
            .ok_or_else(|| Error::InternalError("master secret missing".into()))?;

        let keys = key_schedule::derive_key_material(
            config.provider.as_ref(),
            master,
            &self.client_random,
            &self.server_random,
            suite,
        )?;
        self.pending_crypto = Some(PendingCrypto {
            suite,
            compression,
            keys,
        });
        Ok(())
    }

    fn queue_message(&mut self, message: HandshakeMessage) -> Result<()> {
        let framed = message.encode()?;
        self.transcript.extend(&framed);
        self.outbound.push(HandshakeSend::Message(framed));
        Ok(())
    }

    fn finalize(&mut self) {
        let (version, suite, compression, master) = match (
            self.version,
            self.suite,
            self.compression,
            self.master_secret.as_ref(),
        ) {
            (Some(v), Some(s), Some(c), Some(m)) => (v, s, c, m),
            _ => {
                self.state = HandshakeState::Failed;
                return;
            }
        };

        let created_at = match self.resumed_created_at {
            Some(at) if self.resumed => at,
            _ => SystemTime::now(),
        };

        self.parameters = Some(SecurityParameters {
            role: Role::Server,
            version,
            cipher_suite: suite,
            compression,
            master_secret: master.clone(),
            client_random: self.client_random,
            server_random: self.server_random,
            session_id: self.session_id.clone(),
            created_at,
        });
        self.state = HandshakeState::Established;

        tracing::info!(
            version = ?version,
            suite = %suite,
            resumed = self.resumed,
            "server handshake established"
        );
    }
}

impl Default for ServerHandshake {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AlertDescription;
    use crate::handshake::ClientHandshake;
    use crate::priority::Priorities;
    use crate::registry::{BulkCipherAlgorithm, KxAlgorithm, MacAlgorithm};
    use crate::session::Config;
    use oxtls_crypto_mock::MockProvider;
    use std::sync::Arc;

    fn anon_config() -> Config {
        let mut priorities = Priorities::new();
        priorities.set_kx(&[KxAlgorithm::DhAnon]).unwrap();
        priorities
            .set_cipher(&[BulkCipherAlgorithm::Rijndael])
            .unwrap();
        priorities.set_mac(&[MacAlgorithm::Sha]).unwrap();
        priorities
            .set_compression(&[CompressionMethod::Null])
            .unwrap();

        Config::builder(Arc::new(MockProvider::new()))
            .priorities(priorities)
            .dh_params(DhParams {
                prime: vec![0xff; 64],
                generator: vec![2],
            })
            .build()
            .unwrap()
    }

    fn client_hello_message(config: &Config) -> (HandshakeMessage, Vec<u8>) {
        let suites = selector::ranked_suites(&config.priorities);
        let hello = ClientHello::new((3, 1), [7; RANDOM_SIZE], suites, vec![0]);
        let message = HandshakeMessage::new(HandshakeType::ClientHello, hello.encode().unwrap());
        let raw = message.encode().unwrap();
        (message, raw)
    }

    #[test]
    fn test_client_hello_produces_full_flight() {
        let config = anon_config();
        let mut server = ServerHandshake::new();

        let (message, raw) = client_hello_message(&config);
        server.handle_message(&config, message, &raw).unwrap();

        assert_eq!(server.state(), HandshakeState::HelloReceived);
        assert_eq!(server.version(), Some(TlsVersion::Tls1));

        let flight = server.take_outbound();
        let types: Vec<u8> = flight
            .iter()
            .map(|item| match item {
                HandshakeSend::Message(framed) => framed[0],
                HandshakeSend::ChangeCipherSpec => panic!("no cipher change in this flight"),
            })
            .collect();
        // Anonymous key exchange: ServerHello, ServerKeyExchange, done.
        assert_eq!(
            types,
            vec![
                HandshakeType::ServerHello.to_u8(),
                HandshakeType::ServerKeyExchange.to_u8(),
                HandshakeType::ServerHelloDone.to_u8(),
            ]
        );
    }

    #[test]
    fn test_version_negotiates_downward() {
        let config = anon_config();
        let mut server = ServerHandshake::new();

        let suites = selector::ranked_suites(&config.priorities);
        let hello = ClientHello::new((3, 5), [7; RANDOM_SIZE], suites, vec![0]);
        let message = HandshakeMessage::new(HandshakeType::ClientHello, hello.encode().unwrap());
        let raw = message.encode().unwrap();

        server.handle_message(&config, message, &raw).unwrap();
        assert_eq!(server.version(), Some(TlsVersion::Tls1));
    }

    #[test]
    fn test_version_below_floor_is_rejected() {
        let config = anon_config();
        let mut server = ServerHandshake::new();

        let suites = selector::ranked_suites(&config.priorities);
        let hello = ClientHello::new((2, 0), [7; RANDOM_SIZE], suites, vec![0]);
        let message = HandshakeMessage::new(HandshakeType::ClientHello, hello.encode().unwrap());
        let raw = message.encode().unwrap();

        let err = server.handle_message(&config, message, &raw).unwrap_err();
        assert_eq!(err, Error::VersionNotSupported(2, 0));
        assert_eq!(server.state(), HandshakeState::Failed);
    }

    #[test]
    fn test_no_common_suite_fails() {
        let config = anon_config();
        let mut server = ServerHandshake::new();

        let foreign = CipherSuiteId::new(0x00, 0x0A);
        let hello = ClientHello::new((3, 1), [7; RANDOM_SIZE], vec![foreign], vec![0]);
        let message = HandshakeMessage::new(HandshakeType::ClientHello, hello.encode().unwrap());
        let raw = message.encode().unwrap();

        let err = server.handle_message(&config, message, &raw).unwrap_err();
        assert!(matches!(err, Error::HandshakeFailure(_)));
        assert_eq!(server.state(), HandshakeState::Failed);
    }

    #[test]
    fn test_finished_in_idle_is_rejected() {
        let config = anon_config();
        let mut server = ServerHandshake::new();

        let message = HandshakeMessage::new(HandshakeType::Finished, vec![0; 12]);
        let raw = message.encode().unwrap();
        let err = server.handle_message(&config, message, &raw).unwrap_err();

        assert!(matches!(err, Error::UnexpectedMessage(_)));
        assert_eq!(server.state(), HandshakeState::Failed);
    }

    #[test]
    fn test_forged_client_finished_is_rejected() {
        let config = anon_config();
        let mut client = ClientHandshake::new();
        let mut server = ServerHandshake::new();

        client.prepare(&config).unwrap();
        for item in client.take_outbound() {
            let framed = match item {
                HandshakeSend::Message(framed) => framed,
                HandshakeSend::ChangeCipherSpec => panic!("no cipher change in the first flight"),
            };
            let (message, _) = HandshakeMessage::parse(&framed).unwrap().unwrap();
            server.handle_message(&config, message, &framed).unwrap();
        }
        for item in server.take_outbound() {
            let framed = match item {
                HandshakeSend::Message(framed) => framed,
                HandshakeSend::ChangeCipherSpec => panic!("no cipher change in the server flight"),
            };
            let (message, _) = HandshakeMessage::parse(&framed).unwrap().unwrap();
            client.handle_message(&config, message, &framed).unwrap();
        }

        // Client flight: ClientKeyExchange, ChangeCipherSpec, Finished.
        let mut flight = client.take_outbound().into_iter();
        let cke = match flight.next() {
            Some(HandshakeSend::Message(framed)) => framed,
            other => panic!("expected ClientKeyExchange, got {:?}", other),
        };
        let (message, _) = HandshakeMessage::parse(&cke).unwrap().unwrap();
        server.handle_message(&config, message, &cke).unwrap();

        assert!(matches!(flight.next(), Some(HandshakeSend::ChangeCipherSpec)));
        server.handle_change_cipher_spec().unwrap();

        let mut finished = match flight.next() {
            Some(HandshakeSend::Message(framed)) => framed,
            other => panic!("expected Finished, got {:?}", other),
        };
        let last = finished.len() - 1;
        finished[last] ^= 0x01;
        let (message, _) = HandshakeMessage::parse(&finished).unwrap().unwrap();

        let err = server.handle_message(&config, message, &finished).unwrap_err();
        assert!(matches!(err, Error::VerifyFailed(_)));
        assert_eq!(err.to_alert(), Some(AlertDescription::DecryptError));
        assert_eq!(server.state(), HandshakeState::Failed);
    }
}
