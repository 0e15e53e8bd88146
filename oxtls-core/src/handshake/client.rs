//! Client side of the handshake.

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
    Certificate, CertificateRequest, CertificateVerify, ClientHello, ClientKeyExchange,
    ServerDhParams, ServerHello, ServerHelloDone, ServerKeyExchange,
};
use crate::protocol::{HandshakeType, RANDOM_SIZE, RSA_PREMASTER_SIZE};
use crate::registry::{CipherSuiteId, CompressionMethod, KxCapabilities, TlsVersion};
use crate::selector;
use crate::session::{Config, Role, SecurityParameters};
use crate::transcript::Transcript;
use oxtls_crypto::DhParams;

/// Client handshake state machine.
///
/// Created fresh for every handshake, initial or renegotiated. Drive it
/// with [`prepare`](Self::prepare) to emit the ClientHello, then feed
/// every inbound handshake message through
/// [`handle_message`](Self::handle_message) and drain
/// [`take_outbound`](Self::take_outbound) between messages.
pub struct ClientHandshake {
    state: HandshakeState,
    outbound: Vec<HandshakeSend>,
    pending_crypto: Option<PendingCrypto>,
    transcript: Transcript,

    client_random: [u8; RANDOM_SIZE],
    server_random: [u8; RANDOM_SIZE],
    offered_version: TlsVersion,
    offered_suites: Vec<CipherSuiteId>,
    offered_compressions: Vec<u8>,
    resume_source: Option<SecurityParameters>,

    version: Option<TlsVersion>,
    suite: Option<CipherSuiteId>,
    compression: Option<CompressionMethod>,
    session_id: Vec<u8>,
    resumed: bool,

    server_certificates: Vec<Vec<u8>>,
    server_dh: Option<ServerDhParams>,
    certificate_requested: bool,
    sent_client_certificate: bool,

    master_secret: Option<Zeroizing<Vec<u8>>>,
    parameters: Option<SecurityParameters>,
}

impl core::fmt::Debug for ClientHandshake {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ClientHandshake")
            .field("state", &self.state)
            .field("version", &self.version)
            .field("suite", &self.suite)
            .field("resumed", &self.resumed)
            .finish()
    }
}

impl ClientHandshake {
    /// Create an idle client handshake.
    pub fn new() -> Self {
        Self {
            state: HandshakeState::Idle,
            outbound: Vec::new(),
            pending_crypto: None,
            transcript: Transcript::new(),
            client_random: [0; RANDOM_SIZE],
            server_random: [0; RANDOM_SIZE],
            offered_version: TlsVersion::highest_supported(),
            offered_suites: Vec::new(),
            offered_compressions: Vec::new(),
            resume_source: None,
            version: None,
            suite: None,
            compression: None,
            session_id: Vec::new(),
            resumed: false,
            server_certificates: Vec::new(),
            server_dh: None,
            certificate_requested: false,
            sent_client_certificate: false,
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

    /// The version the server chose, once ServerHello is in.
    pub fn version(&self) -> Option<TlsVersion> {
        self.version
    }

    /// Negotiated parameters, available once established.
    pub fn security_parameters(&self) -> Option<&SecurityParameters> {
        self.parameters.as_ref()
    }

    /// Whether the server resumed the offered session.
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

    /// Emit the ClientHello if nothing has happened yet.
    pub fn prepare(&mut self, config: &Config) -> Result<()> {
        if self.state != HandshakeState::Idle {
            return Ok(());
        }
        match self.send_client_hello(config) {
            Ok(()) => Ok(()),
            Err(error) => {
                self.state = HandshakeState::Failed;
                Err(error)
            }
        }
    }

    /// Process one complete inbound handshake message.
    ///
    /// `raw` is the framed encoding, header included, exactly as it
    /// arrived; it feeds the transcript. Any error is terminal.
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
        let valid = self.state == HandshakeState::CcsSent
            || (self.state == HandshakeState::HelloReceived && self.resumed);
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
            (HandshakeState::HelloSent, HandshakeType::ServerHello) => {
                self.process_server_hello(config, &message.payload, raw)
            }
            (HandshakeState::HelloReceived, HandshakeType::Certificate) => {
                self.process_certificate(&message.payload, raw)
            }
            (HandshakeState::HelloReceived, HandshakeType::ServerKeyExchange) => {
                self.process_server_key_exchange(config, &message.payload, raw)
            }
            (HandshakeState::HelloReceived, HandshakeType::CertificateRequest) => {
                self.process_certificate_request(&message.payload, raw)
            }
            (HandshakeState::HelloReceived, HandshakeType::ServerHelloDone) => {
                self.process_server_hello_done(config, &message.payload, raw)
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

    fn send_client_hello(&mut self, config: &Config) -> Result<()> {
        let provider = config.provider.as_ref();
        let version = config.highest_version()?;

        provider.random().fill(&mut self.client_random)?;

        let suites = selector::ranked_suites(&config.priorities);
        if suites.is_empty() {
            return Err(Error::HandshakeFailure(
                "no cipher suites enabled".into(),
            ));
        }
        let compressions = selector::compression_wire_numbers(&config.priorities);
        if compressions.is_empty() {
            return Err(Error::HandshakeFailure(
                "no compression methods enabled".into(),
            ));
        }

        let wire_version = version
            .wire()
            .ok_or_else(|| Error::InternalError("unregistered protocol version".into()))?;
        let mut hello = ClientHello::new(
            wire_version,
            self.client_random,
            suites.clone(),
            compressions.clone(),
        );

        // Offer the cached session for resumption when it is still
        // fresh and its suite is still enabled.
        if let Some(source) = config.resume_session.as_ref() {
            if !source.session_id.is_empty()
                && !source.is_expired(config.expire_time)
                && config.versions.contains(&source.version)
                && suites.contains(&source.cipher_suite)
            {
                hello = hello.with_session_id(source.session_id.clone());
                self.resume_source = Some(source.clone());
            }
        }

        self.offered_version = version;
        self.offered_suites = suites;
        self.offered_compressions = compressions;

        let message = HandshakeMessage::new(HandshakeType::ClientHello, hello.encode()?);
        self.queue_message(message)?;
        self.state = HandshakeState::HelloSent;

        tracing::debug!(
            version = ?version,
            suites = self.offered_suites.len(),
            resuming = self.resume_source.is_some(),
            "sent ClientHello"
        );
        Ok(())
    }

    fn process_server_hello(&mut self, config: &Config, payload: &[u8], raw: &[u8]) -> Result<()> {
        let hello = ServerHello::decode(payload)?;
        self.transcript.extend(raw);

        let (major, minor) = hello.server_version;
        let version = TlsVersion::from_wire(major, minor)
            .ok_or(Error::VersionNotSupported(major, minor))?;
        if !config.versions.contains(&version) {
            return Err(Error::VersionNotSupported(major, minor));
        }
        if version.cmp_wire(self.offered_version) == core::cmp::Ordering::Greater {
            return Err(Error::VersionNotSupported(major, minor));
        }

        if !self.offered_suites.contains(&hello.cipher_suite) {
            return Err(Error::HandshakeFailure(format!(
                "server chose unoffered suite {}",
                hello.cipher_suite
            )));
        }
        if !self.offered_compressions.contains(&hello.compression_method) {
            return Err(Error::HandshakeFailure(format!(
                "server chose unoffered compression {}",
                hello.compression_method
            )));
        }
        let compression = CompressionMethod::from_wire_number(hello.compression_method)
            .ok_or_else(|| Error::InternalError("offered compression lost its entry".into()))?;

        self.version = Some(version);
        self.suite = Some(hello.cipher_suite);
        self.compression = Some(compression);
        self.server_random = hello.random;
        self.session_id = hello.session_id.clone();

        // A server echoing the offered session ID is resuming it; the
        // abbreviated flight continues with its ChangeCipherSpec.
        if let Some(source) = self.resume_source.as_ref() {
            if !hello.session_id.is_empty() && hello.session_id == source.session_id {
                if hello.cipher_suite != source.cipher_suite
                    || version != source.version
                    || compression != source.compression
                {
                    return Err(Error::HandshakeFailure(
                        "server resumed a session with different parameters".into(),
                    ));
                }
                self.resumed = true;
                self.master_secret = Some(source.master_secret.clone());
                self.derive_pending_crypto(config)?;
                self.state = HandshakeState::HelloReceived;
                tracing::info!(session_id_len = hello.session_id.len(), "resuming session");
                return Ok(());
            }
        }

        self.state = HandshakeState::HelloReceived;
        tracing::debug!(
            version = ?version,
            suite = %hello.cipher_suite,
            "accepted ServerHello"
        );
        Ok(())
    }

    fn process_certificate(&mut self, payload: &[u8], raw: &[u8]) -> Result<()> {
        let capabilities = self.capabilities()?;
        if !capabilities.server_certificate {
            return Err(Error::UnexpectedMessage(
                "Certificate for an anonymous key exchange".into(),
            ));
        }
        if !self.server_certificates.is_empty() {
            return Err(Error::UnexpectedMessage("second Certificate".into()));
        }

        let certificate = Certificate::decode(payload)?;
        if certificate.certificate_list.is_empty() {
            return Err(Error::HandshakeFailure("server sent no certificate".into()));
        }
        self.transcript.extend(raw);
        self.server_certificates = certificate.certificate_list;
        Ok(())
    }

    fn process_server_key_exchange(
        &mut self,
        config: &Config,
        payload: &[u8],
        raw: &[u8],
    ) -> Result<()> {
        let capabilities = self.capabilities()?;
        if !capabilities.dh_public_value {
            return Err(Error::UnexpectedMessage(
                "ServerKeyExchange for a key exchange without one".into(),
            ));
        }
        if self.server_dh.is_some() {
            return Err(Error::UnexpectedMessage("second ServerKeyExchange".into()));
        }

        let signed = capabilities.server_certificate;
        if signed && self.server_certificates.is_empty() {
            return Err(Error::UnexpectedMessage(
                "ServerKeyExchange before Certificate".into(),
            ));
        }

        let exchange = ServerKeyExchange::decode(payload, signed)?;
        if signed {
            let signature = exchange
                .signature
                .as_ref()
                .ok_or_else(|| Error::InvalidMessage("missing key exchange signature".into()))?;
            let digest = key_exchange_digest(
                config.provider.as_ref(),
                &self.client_random,
                &self.server_random,
                &exchange.signed_params()?,
            )?;
            let leaf = &self.server_certificates[0];
            if !config.provider.rsa().verify(leaf, &digest, signature) {
                return Err(Error::VerifyFailed(
                    "server key exchange signature".into(),
                ));
            }
        }

        self.transcript.extend(raw);
        self.server_dh = Some(exchange.params);
        Ok(())
    }

    fn process_certificate_request(&mut self, payload: &[u8], raw: &[u8]) -> Result<()> {
        let capabilities = self.capabilities()?;
        if !capabilities.client_certificate {
            return Err(Error::UnexpectedMessage(
                "CertificateRequest for a key exchange without client certificates".into(),
            ));
        }
        if self.certificate_requested {
            return Err(Error::UnexpectedMessage("second CertificateRequest".into()));
        }

        CertificateRequest::decode(payload)?;
        self.transcript.extend(raw);
        self.certificate_requested = true;
        Ok(())
    }

    fn process_server_hello_done(
        &mut self,
        config: &Config,
        payload: &[u8],
        raw: &[u8],
    ) -> Result<()> {
        ServerHelloDone::decode(payload)?;
        let capabilities = self.capabilities()?;
        if capabilities.server_certificate && self.server_certificates.is_empty() {
            return Err(Error::HandshakeFailure(
                "ServerHelloDone without a certificate".into(),
            ));
        }
        if capabilities.dh_public_value && self.server_dh.is_none() {
            return Err(Error::HandshakeFailure(
                "ServerHelloDone without a key exchange".into(),
            ));
        }
        self.transcript.extend(raw);

        let provider = config.provider.as_ref();

        if self.certificate_requested {
            let chain = config.certificate_chain.clone();
            self.sent_client_certificate = !chain.is_empty();
            let certificate = Certificate::new(chain);
            self.queue_message(HandshakeMessage::new(
                HandshakeType::Certificate,
                certificate.encode()?,
            ))?;
        }

        let premaster = self.send_client_key_exchange(config, capabilities)?;

        let master = key_schedule::compute_master_secret(
            provider,
            &premaster,
            &self.client_random,
            &self.server_random,
        )?;
        self.master_secret = Some(master);
        self.state = HandshakeState::KeyExchange;

        if self.sent_client_certificate && capabilities.certificate_verify {
            let key = config.private_key.as_ref().ok_or_else(|| {
                Error::HandshakeFailure("client certificate without a private key".into())
            })?;
            let digests = self.transcript.digests(provider)?;
            let signature = provider.rsa().sign(key, &digests.concat())?;
            let verify = CertificateVerify::new(signature);
            self.queue_message(HandshakeMessage::new(
                HandshakeType::CertificateVerify,
                verify.encode()?,
            ))?;
            self.state = HandshakeState::CertificateVerify;
        }

        self.derive_pending_crypto(config)?;
        self.outbound.push(HandshakeSend::ChangeCipherSpec);

        let master = self
            .master_secret
            .as_ref()
            .ok_or_else(|| Error::InternalError("master secret missing".into()))?;
        let finished = finished_message(provider, master, &self.transcript, Role::Client)?;
        self.queue_message(finished)?;
        self.state = HandshakeState::CcsSent;

        tracing::debug!("sent client flight");
        Ok(())
    }

    /// Build the ClientKeyExchange and return the premaster secret.
    fn send_client_key_exchange(
        &mut self,
        config: &Config,
        capabilities: KxCapabilities,
    ) -> Result<Zeroizing<Vec<u8>>> {
        let provider = config.provider.as_ref();

        if capabilities.rsa_premaster {
            let leaf = self
                .server_certificates
                .first()
                .ok_or_else(|| Error::HandshakeFailure("server sent no certificate".into()))?;

            let mut premaster = Zeroizing::new(vec![0u8; RSA_PREMASTER_SIZE]);
            let (major, minor) = self
                .offered_version
                .wire()
                .ok_or_else(|| Error::InternalError("unregistered protocol version".into()))?;
            premaster[0] = major;
            premaster[1] = minor;
            provider.random().fill(&mut premaster[2..])?;

            let encrypted = provider.rsa().encrypt(leaf, &premaster)?;
            let exchange = ClientKeyExchange::new(encrypted);
            self.queue_message(HandshakeMessage::new(
                HandshakeType::ClientKeyExchange,
                exchange.encode()?,
            ))?;
            return Ok(premaster);
        }

        if capabilities.dh_public_value {
            let server_dh = self
                .server_dh
                .take()
                .ok_or_else(|| Error::InternalError("server DH parameters missing".into()))?;
            let params = DhParams {
                prime: server_dh.prime,
                generator: server_dh.generator,
            };
            let keypair = provider.dh().generate(&params)?;
            let premaster = provider
                .dh()
                .compute(&params, &server_dh.public, &keypair.private)?;

            let exchange = ClientKeyExchange::new(keypair.public);
            self.queue_message(HandshakeMessage::new(
                HandshakeType::ClientKeyExchange,
                exchange.encode()?,
            ))?;
            return Ok(premaster);
        }

        Err(Error::HandshakeFailure(
            "negotiated key exchange cannot deliver a premaster secret".into(),
        ))
    }

    fn process_finished(&mut self, config: &Config, payload: &[u8], raw: &[u8]) -> Result<()> {
        let provider = config.provider.as_ref();
        let finished = crate::messages::Finished::decode(payload)?;
        let master = self
            .master_secret
            .as_ref()
            .ok_or_else(|| Error::InternalError("master secret missing".into()))?;

        let expected = expected_verify_data(provider, master, &self.transcript, Role::Server)?;
        if !verify_data_matches(&expected, &finished.verify_data) {
            return Err(Error::VerifyFailed("server finished verify data".into()));
        }
        self.transcript.extend(raw);
        self.state = HandshakeState::Finished;

        if self.resumed {
            // Abbreviated handshake: the server finished first, our
            // cipher change and Finished close the exchange.
            self.outbound.push(HandshakeSend::ChangeCipherSpec);
            let finished = finished_message(provider, master, &self.transcript, Role::Client)?;
            self.queue_message(finished)?;
        }

        self.finalize();
        Ok(())
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

        let created_at = match self.resume_source.as_ref() {
            Some(source) if self.resumed => source.created_at,
            _ => SystemTime::now(),
        };

        self.parameters = Some(SecurityParameters {
            role: Role::Client,
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
            "client handshake established"
        );
    }
}

impl Default for ClientHandshake {
    fn default() -> Self {
        Self::new()
    }
}
