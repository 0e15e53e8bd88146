//! Sessions: configuration, the established-state record, and the
//! engine that drives a handshake machine over a transport.
//!
//! A [`Session`] owns one [`Transport`] and four record-protection
//! slots: the active read and write states and the pending pair built
//! from freshly derived key material. ChangeCipherSpec swaps a pending
//! state in, one direction at a time. All outbound records pass through
//! a send queue, so a transport that returns
//! [`Error::WouldBlock`](crate::Error::WouldBlock) mid-flight loses
//! nothing; the next call picks up where the last one stopped.

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use zeroize::Zeroizing;

use crate::alert::Alert;
use crate::error::{AlertDescription, Error, Result};
use crate::handshake::{
    ClientHandshake, HandshakeSend, HandshakeState, PendingCrypto, ServerHandshake,
};
use crate::handshake_io::{HandshakeBuffer, HandshakeMessage};
use crate::messages::HelloRequest;
use crate::priority::Priorities;
use crate::protocol::{ContentType, HandshakeType, CHANGE_CIPHER_SPEC_TYPE};
use crate::record::{fragment_data, Record, MAX_CIPHERTEXT_SIZE, RECORD_HEADER_SIZE};
use crate::record_protection::ConnectionState;
use crate::registry::{CipherSuiteId, CompressionMethod, TlsVersion};
use crate::session_store::{SessionStore, DEFAULT_EXPIRE_TIME};
use crate::transport::Transport;
use oxtls_crypto::{CryptoProvider, DhParams};

/// Which end of the connection this session is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// The connecting side; it speaks first.
    Client,
    /// The accepting side.
    Server,
}

/// Everything negotiated by a completed handshake.
///
/// This is what a session store persists and what a client hands back
/// to offer resumption. `Debug` never prints the master secret.
#[derive(Clone)]
pub struct SecurityParameters {
    /// Role this end played.
    pub role: Role,
    /// Negotiated protocol version.
    pub version: TlsVersion,
    /// Negotiated cipher suite.
    pub cipher_suite: CipherSuiteId,
    /// Negotiated compression method.
    pub compression: CompressionMethod,
    /// The 48-byte master secret, wiped on drop.
    pub master_secret: Zeroizing<Vec<u8>>,
    /// Client hello random.
    pub client_random: [u8; 32],
    /// Server hello random.
    pub server_random: [u8; 32],
    /// Session ID assigned by the server; empty when not resumable.
    pub session_id: Vec<u8>,
    /// When the original full handshake completed.
    pub created_at: SystemTime,
}

impl SecurityParameters {
    /// Time since the original handshake.
    pub fn age(&self) -> Duration {
        SystemTime::now()
            .duration_since(self.created_at)
            .unwrap_or(Duration::ZERO)
    }

    /// Whether the session has outlived the resumption window.
    pub fn is_expired(&self, window: Duration) -> bool {
        self.age() > window
    }
}

impl fmt::Debug for SecurityParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityParameters")
            .field("role", &self.role)
            .field("version", &self.version)
            .field("cipher_suite", &self.cipher_suite)
            .field("compression", &self.compression)
            .field("master_secret", &"<redacted>")
            .field("session_id_len", &self.session_id.len())
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Session configuration shared by clients and servers.
///
/// Built once through [`Config::builder`] and handed to
/// [`Session::client`] or [`Session::server`]. Credentials are opaque
/// byte blobs; only the configured [`CryptoProvider`] interprets them.
#[derive(Clone)]
pub struct Config {
    pub(crate) provider: Arc<dyn CryptoProvider>,
    pub(crate) priorities: Priorities,
    pub(crate) versions: Vec<TlsVersion>,
    pub(crate) certificate_chain: Vec<Vec<u8>>,
    pub(crate) private_key: Option<Zeroizing<Vec<u8>>>,
    pub(crate) dh_params: Option<DhParams>,
    pub(crate) session_store: Option<Arc<Mutex<dyn SessionStore>>>,
    pub(crate) expire_time: Duration,
    pub(crate) request_client_certificate: bool,
    pub(crate) resumable: bool,
    pub(crate) resume_session: Option<SecurityParameters>,
}

impl Config {
    /// Start building a configuration around a crypto provider.
    pub fn builder(provider: Arc<dyn CryptoProvider>) -> ConfigBuilder {
        ConfigBuilder {
            provider,
            priorities: Priorities::recommended(),
            versions: vec![TlsVersion::Tls1, TlsVersion::Ssl3],
            certificate_chain: Vec::new(),
            private_key: None,
            dh_params: None,
            session_store: None,
            expire_time: DEFAULT_EXPIRE_TIME,
            request_client_certificate: false,
            resumable: true,
            resume_session: None,
        }
    }

    /// The configured priorities.
    pub fn priorities(&self) -> &Priorities {
        &self.priorities
    }

    pub(crate) fn highest_version(&self) -> Result<TlsVersion> {
        self.versions
            .iter()
            .copied()
            .max_by(|a, b| a.cmp_wire(*b))
            .ok_or_else(|| Error::InvalidConfig("no protocol versions enabled".into()))
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("versions", &self.versions)
            .field("certificates", &self.certificate_chain.len())
            .field("has_private_key", &self.private_key.is_some())
            .field("has_dh_params", &self.dh_params.is_some())
            .field("has_session_store", &self.session_store.is_some())
            .field("expire_time", &self.expire_time)
            .field("request_client_certificate", &self.request_client_certificate)
            .field("resumable", &self.resumable)
            .finish()
    }
}

/// Builder for [`Config`].
pub struct ConfigBuilder {
    provider: Arc<dyn CryptoProvider>,
    priorities: Priorities,
    versions: Vec<TlsVersion>,
    certificate_chain: Vec<Vec<u8>>,
    private_key: Option<Zeroizing<Vec<u8>>>,
    dh_params: Option<DhParams>,
    session_store: Option<Arc<Mutex<dyn SessionStore>>>,
    expire_time: Duration,
    request_client_certificate: bool,
    resumable: bool,
    resume_session: Option<SecurityParameters>,
}

impl fmt::Debug for ConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigBuilder")
            .field("versions", &self.versions)
            .field("certificates", &self.certificate_chain.len())
            .field("resumable", &self.resumable)
            .finish()
    }
}

impl ConfigBuilder {
    /// Replace the default priorities.
    pub fn priorities(mut self, priorities: Priorities) -> Self {
        self.priorities = priorities;
        self
    }

    /// Restrict the enabled protocol versions.
    pub fn versions(mut self, versions: &[TlsVersion]) -> Self {
        self.versions = versions.to_vec();
        self
    }

    /// Set the certificate chain, leaf first.
    pub fn certificate_chain(mut self, chain: Vec<Vec<u8>>) -> Self {
        self.certificate_chain = chain;
        self
    }

    /// Set the private key matching the leaf certificate.
    pub fn private_key(mut self, key: Vec<u8>) -> Self {
        self.private_key = Some(Zeroizing::new(key));
        self
    }

    /// Set the Diffie-Hellman group served in ServerKeyExchange.
    pub fn dh_params(mut self, params: DhParams) -> Self {
        self.dh_params = Some(params);
        self
    }

    /// Attach a session store for server-side resumption.
    pub fn session_store(mut self, store: Arc<Mutex<dyn SessionStore>>) -> Self {
        self.session_store = Some(store);
        self
    }

    /// Override the resumption expiry window.
    pub fn expire_time(mut self, window: Duration) -> Self {
        self.expire_time = window;
        self
    }

    /// Ask connecting clients for a certificate.
    pub fn request_client_certificate(mut self, request: bool) -> Self {
        self.request_client_certificate = request;
        self
    }

    /// Allow or forbid issuing and resuming session IDs.
    pub fn resumable(mut self, resumable: bool) -> Self {
        self.resumable = resumable;
        self
    }

    /// Offer a previously established session for resumption.
    pub fn resume_session(mut self, parameters: SecurityParameters) -> Self {
        self.resume_session = Some(parameters);
        self
    }

    /// Validate and build the configuration.
    pub fn build(self) -> Result<Config> {
        if self.versions.is_empty() {
            return Err(Error::InvalidConfig("no protocol versions enabled".into()));
        }
        for version in &self.versions {
            if !version.is_supported() {
                return Err(Error::InvalidConfig(format!(
                    "version {:?} is not supported",
                    version
                )));
            }
        }
        if !self.certificate_chain.is_empty() && self.private_key.is_none() {
            return Err(Error::InvalidConfig(
                "certificate chain configured without a private key".into(),
            ));
        }
        if self.certificate_chain.iter().any(|c| c.is_empty()) {
            return Err(Error::InvalidConfig(
                "empty certificate in chain".into(),
            ));
        }

        Ok(Config {
            provider: self.provider,
            priorities: self.priorities,
            versions: self.versions,
            certificate_chain: self.certificate_chain,
            private_key: self.private_key,
            dh_params: self.dh_params,
            session_store: self.session_store,
            expire_time: self.expire_time,
            request_client_certificate: self.request_client_certificate,
            resumable: self.resumable,
            resume_session: self.resume_session,
        })
    }
}

enum RoleHandshake {
    Client(ClientHandshake),
    Server(ServerHandshake),
}

impl RoleHandshake {
    fn prepare(&mut self, config: &Config) -> Result<()> {
        match self {
            RoleHandshake::Client(handshake) => handshake.prepare(config),
            RoleHandshake::Server(_) => Ok(()),
        }
    }

    fn handle_message(
        &mut self,
        config: &Config,
        message: HandshakeMessage,
        raw: &[u8],
    ) -> Result<()> {
        match self {
            RoleHandshake::Client(handshake) => handshake.handle_message(config, message, raw),
            RoleHandshake::Server(handshake) => handshake.handle_message(config, message, raw),
        }
    }

    fn handle_change_cipher_spec(&mut self) -> Result<()> {
        match self {
            RoleHandshake::Client(handshake) => handshake.handle_change_cipher_spec(),
            RoleHandshake::Server(handshake) => handshake.handle_change_cipher_spec(),
        }
    }

    fn take_outbound(&mut self) -> Vec<HandshakeSend> {
        match self {
            RoleHandshake::Client(handshake) => handshake.take_outbound(),
            RoleHandshake::Server(handshake) => handshake.take_outbound(),
        }
    }

    fn take_pending_crypto(&mut self) -> Option<PendingCrypto> {
        match self {
            RoleHandshake::Client(handshake) => handshake.take_pending_crypto(),
            RoleHandshake::Server(handshake) => handshake.take_pending_crypto(),
        }
    }

    fn version(&self) -> Option<TlsVersion> {
        match self {
            RoleHandshake::Client(handshake) => handshake.version(),
            RoleHandshake::Server(handshake) => handshake.version(),
        }
    }

    fn state(&self) -> HandshakeState {
        match self {
            RoleHandshake::Client(handshake) => handshake.state(),
            RoleHandshake::Server(handshake) => handshake.state(),
        }
    }

    fn is_established(&self) -> bool {
        match self {
            RoleHandshake::Client(handshake) => handshake.is_established(),
            RoleHandshake::Server(handshake) => handshake.is_established(),
        }
    }

    fn security_parameters(&self) -> Option<&SecurityParameters> {
        match self {
            RoleHandshake::Client(handshake) => handshake.security_parameters(),
            RoleHandshake::Server(handshake) => handshake.security_parameters(),
        }
    }

    fn was_resumed(&self) -> bool {
        match self {
            RoleHandshake::Client(handshake) => handshake.was_resumed(),
            RoleHandshake::Server(handshake) => handshake.was_resumed(),
        }
    }
}

/// One TLS session over a transport.
///
/// Call [`handshake`](Self::handshake) until it returns `Ok`, then
/// exchange data with [`send`](Self::send) and [`recv`](Self::recv).
/// Calls that cannot make progress on a non-blocking transport return
/// [`Error::WouldBlock`] and may be repeated; everything already
/// queued or negotiated is retained across retries.
pub struct Session<T: Transport> {
    config: Config,
    role: Role,
    transport: T,

    read_buffer: Vec<u8>,
    send_buffer: Vec<u8>,
    handshake_buffer: HandshakeBuffer,
    app_data: Vec<u8>,

    read_state: ConnectionState,
    write_state: ConnectionState,
    pending_read: Option<ConnectionState>,
    pending_write: Option<ConnectionState>,

    handshake: Option<RoleHandshake>,
    parameters: Option<SecurityParameters>,
    record_version: TlsVersion,
    rehandshake_requested: bool,

    sent_close: bool,
    received_close: bool,
    failed: Option<Error>,
}

impl<T: Transport> fmt::Debug for Session<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("role", &self.role)
            .field("established", &self.is_established())
            .field("handshake_active", &self.handshake.is_some())
            .field("record_version", &self.record_version)
            .field("sent_close", &self.sent_close)
            .field("received_close", &self.received_close)
            .field("failed", &self.failed)
            .finish()
    }
}

impl<T: Transport> Session<T> {
    /// Create a client session.
    pub fn client(config: Config, transport: T) -> Result<Self> {
        Self::new(Role::Client, config, transport)
    }

    /// Create a server session.
    pub fn server(config: Config, transport: T) -> Result<Self> {
        Self::new(Role::Server, config, transport)
    }

    fn new(role: Role, config: Config, transport: T) -> Result<Self> {
        let record_version = config.highest_version()?;
        Ok(Self {
            config,
            role,
            transport,
            read_buffer: Vec::new(),
            send_buffer: Vec::new(),
            handshake_buffer: HandshakeBuffer::new(),
            app_data: Vec::new(),
            read_state: ConnectionState::plaintext(),
            write_state: ConnectionState::plaintext(),
            pending_read: None,
            pending_write: None,
            handshake: None,
            parameters: None,
            record_version,
            rehandshake_requested: false,
            sent_close: false,
            received_close: false,
            failed: None,
        })
    }

    /// This end's role.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Whether a handshake has completed and none is in progress.
    pub fn is_established(&self) -> bool {
        self.parameters.is_some() && self.handshake.is_none()
    }

    /// Parameters of the established session.
    pub fn security_parameters(&self) -> Option<&SecurityParameters> {
        self.parameters.as_ref()
    }

    /// The negotiated protocol version.
    pub fn version(&self) -> Option<TlsVersion> {
        self.parameters.as_ref().map(|p| p.version)
    }

    /// The negotiated cipher suite.
    pub fn cipher_suite(&self) -> Option<CipherSuiteId> {
        self.parameters.as_ref().map(|p| p.cipher_suite)
    }

    /// Run the handshake to completion.
    ///
    /// Idempotent once established. After
    /// [`Error::RehandshakeRequested`] surfaces from
    /// [`recv`](Self::recv), calling this runs the new handshake.
    pub fn handshake(&mut self) -> Result<()> {
        self.check_open()?;

        if self.handshake.is_none() {
            if self.parameters.is_some() && !self.rehandshake_requested {
                return Ok(());
            }
            self.handshake = Some(match self.role {
                Role::Client => RoleHandshake::Client(ClientHandshake::new()),
                Role::Server => RoleHandshake::Server(ServerHandshake::new()),
            });
            tracing::debug!(role = ?self.role, "handshake started");
        }

        match self.advance_handshake() {
            Ok(()) => Ok(()),
            Err(error) if error.is_retryable() => Err(error),
            Err(error) => Err(self.fail(error)),
        }
    }

    /// Ask the peer to renegotiate, then run the new handshake.
    ///
    /// A server sends HelloRequest and waits for the fresh ClientHello;
    /// a client simply opens a new handshake. Records keep flowing
    /// under the current keys until each direction's ChangeCipherSpec.
    pub fn rehandshake(&mut self) -> Result<()> {
        self.check_open()?;
        if self.parameters.is_none() {
            return Err(Error::InvalidConfig("session is not established".into()));
        }

        if self.handshake.is_none() && !self.rehandshake_requested {
            if self.role == Role::Server {
                let request =
                    HandshakeMessage::new(HandshakeType::HelloRequest, HelloRequest.encode());
                let framed = request.encode()?;
                self.protect_and_queue(ContentType::Handshake, &framed)?;
            }
            self.rehandshake_requested = true;
        }
        self.handshake()
    }

    /// Send application data.
    ///
    /// Returns the number of bytes accepted, which is always the whole
    /// buffer: once records are queued the data will reach the wire on
    /// a later flush even if the transport blocks now.
    pub fn send(&mut self, data: &[u8]) -> Result<usize> {
        self.check_open()?;
        if self.handshake.is_some() {
            return Err(Error::RehandshakeRequested);
        }
        if self.parameters.is_none() {
            return Err(Error::InvalidConfig("session is not established".into()));
        }
        if data.is_empty() {
            return Ok(0);
        }

        self.flush()?;
        if let Err(error) = self.protect_and_queue(ContentType::ApplicationData, data) {
            return Err(self.fail(error));
        }
        match self.flush() {
            Ok(()) => Ok(data.len()),
            Err(error) if error.is_retryable() => Ok(data.len()),
            Err(error) => Err(self.fail(error)),
        }
    }

    /// Receive up to `max_len` bytes of application data.
    ///
    /// An empty result means the peer closed the session cleanly. A
    /// peer-initiated renegotiation surfaces as
    /// [`Error::RehandshakeRequested`]; call
    /// [`handshake`](Self::handshake) to run it.
    pub fn recv(&mut self, max_len: usize) -> Result<Vec<u8>> {
        if let Some(error) = &self.failed {
            return Err(error.clone());
        }
        if max_len == 0 {
            return Ok(Vec::new());
        }

        loop {
            if !self.app_data.is_empty() {
                let take = self.app_data.len().min(max_len);
                return Ok(self.app_data.drain(..take).collect());
            }
            if self.received_close {
                return Ok(Vec::new());
            }
            if self.handshake.is_some() {
                return Err(Error::RehandshakeRequested);
            }
            if self.parameters.is_none() {
                return Err(Error::InvalidConfig("session is not established".into()));
            }
            if let Err(error) = self.surface_renegotiation() {
                if matches!(error, Error::RehandshakeRequested) {
                    return Err(error);
                }
                return Err(self.fail(error));
            }

            let (content_type, plaintext) = match self.read_record() {
                Ok(record) => record,
                Err(error) if error.is_retryable() => return Err(error),
                Err(error) => return Err(self.fail(error)),
            };

            match content_type {
                ContentType::ApplicationData => {
                    self.app_data.extend_from_slice(&plaintext);
                }
                ContentType::Handshake => {
                    self.handshake_buffer.push_fragment(&plaintext);
                }
                ContentType::Alert => match self.process_alert(&plaintext) {
                    Ok(()) => {}
                    Err(Error::SessionClosed) => return Ok(Vec::new()),
                    Err(error) => return Err(self.fail(error)),
                },
                ContentType::ChangeCipherSpec => {
                    return Err(self.fail(Error::UnexpectedMessage(
                        "ChangeCipherSpec outside a handshake".into(),
                    )));
                }
            }
        }
    }

    /// Send close_notify and flush it.
    pub fn close(&mut self) -> Result<()> {
        if let Some(error) = &self.failed {
            return Err(error.clone());
        }
        if !self.sent_close {
            let alert = Alert::close_notify();
            if let Err(error) = self.protect_and_queue(ContentType::Alert, &alert.encode()) {
                return Err(self.fail(error));
            }
            self.sent_close = true;
            tracing::debug!("sent close_notify");
        }
        self.flush()
    }

    fn check_open(&self) -> Result<()> {
        if let Some(error) = &self.failed {
            return Err(error.clone());
        }
        if self.sent_close || self.received_close {
            return Err(Error::SessionClosed);
        }
        Ok(())
    }

    /// Record a terminal failure, telling the peer when an alert fits.
    fn fail(&mut self, error: Error) -> Error {
        if self.failed.is_none() {
            if let Some(description) = error.to_alert() {
                let alert = Alert::fatal(description);
                if self
                    .protect_and_queue(ContentType::Alert, &alert.encode())
                    .is_ok()
                {
                    let _ = self.flush();
                }
            }
            self.handshake = None;
            self.pending_read = None;
            self.pending_write = None;
            self.handshake_buffer.clear();
            self.failed = Some(error.clone());
            tracing::warn!(%error, "session failed");
        }
        error
    }

    fn advance_handshake(&mut self) -> Result<()> {
        loop {
            match self.handshake.as_mut() {
                Some(driver) => driver.prepare(&self.config)?,
                None => {
                    return Err(Error::InternalError("no handshake in progress".into()));
                }
            }
            self.install_pending_crypto()?;
            self.drain_handshake_messages()?;

            if let Some(version) = self.handshake.as_ref().and_then(|d| d.version()) {
                self.record_version = version;
            }

            self.pump_handshake_outbound()?;
            self.flush()?;

            let established = self
                .handshake
                .as_ref()
                .map(|d| d.is_established())
                .unwrap_or(false);
            if established {
                return self.finish_handshake();
            }

            let (content_type, plaintext) = self.read_record()?;
            self.dispatch_handshake_record(content_type, plaintext)?;
        }
    }

    /// Feed buffered handshake messages to the driver.
    ///
    /// HelloRequest is dropped here: mid-handshake it is meaningless,
    /// and it never enters the transcript.
    fn drain_handshake_messages(&mut self) -> Result<()> {
        loop {
            let (message, raw) = match self.handshake_buffer.next_message()? {
                Some(item) => item,
                None => return Ok(()),
            };
            if message.msg_type == HandshakeType::HelloRequest {
                tracing::debug!("ignoring HelloRequest during a handshake");
                continue;
            }
            match self.handshake.as_mut() {
                Some(driver) => driver.handle_message(&self.config, message, &raw)?,
                None => {
                    return Err(Error::InternalError(
                        "handshake message without a handshake".into(),
                    ));
                }
            }
            self.install_pending_crypto()?;
        }
    }

    /// Split freshly derived key material into the two pending states.
    fn install_pending_crypto(&mut self) -> Result<()> {
        let pending = match self.handshake.as_mut().and_then(|d| d.take_pending_crypto()) {
            Some(pending) => pending,
            None => return Ok(()),
        };

        let cipher = pending
            .suite
            .cipher()
            .ok_or_else(|| Error::InternalError("negotiated suite lost its cipher".into()))?;
        let mac = pending
            .suite
            .mac()
            .ok_or_else(|| Error::InternalError("negotiated suite lost its MAC".into()))?;

        let provider = self.config.provider.as_ref();
        let keys = &pending.keys;

        let client_state = ConnectionState::new(
            provider,
            cipher,
            mac,
            pending.compression,
            &keys.client_write_key,
            &keys.client_write_iv,
            &keys.client_write_mac_secret,
        )?;
        let server_state = ConnectionState::new(
            provider,
            cipher,
            mac,
            pending.compression,
            &keys.server_write_key,
            &keys.server_write_iv,
            &keys.server_write_mac_secret,
        )?;

        let (write, read) = match self.role {
            Role::Client => (client_state, server_state),
            Role::Server => (server_state, client_state),
        };
        self.pending_write = Some(write);
        self.pending_read = Some(read);
        tracing::debug!(suite = %pending.suite, "pending cipher states installed");
        Ok(())
    }

    /// Protect and queue everything the driver wants sent.
    fn pump_handshake_outbound(&mut self) -> Result<()> {
        let items = match self.handshake.as_mut() {
            Some(driver) => driver.take_outbound(),
            None => return Ok(()),
        };
        for item in items {
            match item {
                HandshakeSend::Message(framed) => {
                    self.protect_and_queue(ContentType::Handshake, &framed)?;
                }
                HandshakeSend::ChangeCipherSpec => {
                    self.protect_and_queue(
                        ContentType::ChangeCipherSpec,
                        &[CHANGE_CIPHER_SPEC_TYPE],
                    )?;
                    let pending = self.pending_write.take().ok_or_else(|| {
                        Error::InternalError("ChangeCipherSpec without pending keys".into())
                    })?;
                    self.write_state = pending;
                    tracing::debug!("write direction switched to new keys");
                }
            }
        }
        Ok(())
    }

    fn dispatch_handshake_record(
        &mut self,
        content_type: ContentType,
        plaintext: Vec<u8>,
    ) -> Result<()> {
        match content_type {
            ContentType::Handshake => {
                self.handshake_buffer.push_fragment(&plaintext);
                Ok(())
            }
            ContentType::ChangeCipherSpec => {
                if plaintext.len() != 1 || plaintext[0] != CHANGE_CIPHER_SPEC_TYPE {
                    return Err(Error::InvalidMessage("malformed ChangeCipherSpec".into()));
                }
                match self.handshake.as_mut() {
                    Some(driver) => driver.handle_change_cipher_spec()?,
                    None => {
                        return Err(Error::UnexpectedMessage(
                            "ChangeCipherSpec outside a handshake".into(),
                        ));
                    }
                }
                let pending = self.pending_read.take().ok_or_else(|| {
                    Error::UnexpectedMessage("ChangeCipherSpec before key material".into())
                })?;
                self.read_state = pending;
                tracing::debug!("read direction switched to new keys");
                Ok(())
            }
            ContentType::Alert => self.process_alert(&plaintext),
            ContentType::ApplicationData => {
                // Legal mid-renegotiation: the old epoch is still live.
                if self.parameters.is_some() {
                    self.app_data.extend_from_slice(&plaintext);
                    Ok(())
                } else {
                    Err(Error::UnexpectedMessage(
                        "application data before the first handshake".into(),
                    ))
                }
            }
        }
    }

    fn finish_handshake(&mut self) -> Result<()> {
        let driver = self
            .handshake
            .take()
            .ok_or_else(|| Error::InternalError("no handshake to finish".into()))?;
        let resumed = driver.was_resumed();
        let parameters = driver
            .security_parameters()
            .cloned()
            .ok_or_else(|| Error::InternalError("established without parameters".into()))?;

        self.record_version = parameters.version;
        self.rehandshake_requested = false;

        if self.role == Role::Server
            && !resumed
            && self.config.resumable
            && !parameters.session_id.is_empty()
        {
            if let Some(store) = self.config.session_store.as_ref() {
                let mut guard = store.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                guard.store(&parameters.session_id, parameters.clone());
                tracing::debug!("session stored for resumption");
            }
        }

        self.parameters = Some(parameters);
        Ok(())
    }

    /// Surface renegotiation bytes that arrived between handshakes.
    fn surface_renegotiation(&mut self) -> Result<()> {
        if self.handshake_buffer.is_empty() {
            return Ok(());
        }
        match (self.role, self.handshake_buffer.peek_type()) {
            (Role::Client, Some(HandshakeType::HelloRequest)) => {
                while let Some((message, _raw)) = self.handshake_buffer.next_message()? {
                    if message.msg_type != HandshakeType::HelloRequest {
                        return Err(Error::UnexpectedMessage(format!(
                            "{:?} outside a handshake",
                            message.msg_type
                        )));
                    }
                }
                self.rehandshake_requested = true;
                tracing::info!("peer requested renegotiation");
                Err(Error::RehandshakeRequested)
            }
            // The ClientHello stays buffered; the next handshake run
            // consumes it.
            (Role::Server, Some(HandshakeType::ClientHello)) => {
                self.rehandshake_requested = true;
                tracing::info!("peer opened a renegotiation");
                Err(Error::RehandshakeRequested)
            }
            (_, Some(other)) => Err(Error::UnexpectedMessage(format!(
                "{:?} outside a handshake",
                other
            ))),
            (_, None) => Err(Error::InvalidMessage(
                "unknown handshake message type".into(),
            )),
        }
    }

    fn process_alert(&mut self, plaintext: &[u8]) -> Result<()> {
        let alert = Alert::decode(plaintext)?;
        if alert.description == AlertDescription::CloseNotify {
            tracing::debug!("peer sent close_notify");
            self.received_close = true;
            if !self.sent_close {
                let reply = Alert::close_notify();
                if self
                    .protect_and_queue(ContentType::Alert, &reply.encode())
                    .is_ok()
                {
                    let _ = self.flush();
                }
                self.sent_close = true;
            }
            return Err(Error::SessionClosed);
        }
        if alert.is_fatal() {
            return Err(Error::AlertReceived(alert.description));
        }
        tracing::warn!(description = ?alert.description, "ignoring warning alert");
        Ok(())
    }

    /// Protect `data` and append the records to the send queue.
    fn protect_and_queue(&mut self, content_type: ContentType, data: &[u8]) -> Result<()> {
        let provider = self.config.provider.as_ref();
        for record in fragment_data(content_type, self.record_version, data) {
            let protected = self.write_state.protect(
                provider,
                record.content_type,
                record.version,
                &record.fragment,
            )?;
            let encoded = Record::new(record.content_type, record.version, protected).encode()?;
            self.send_buffer.extend_from_slice(&encoded);
        }
        Ok(())
    }

    /// Push queued bytes into the transport until empty or blocked.
    fn flush(&mut self) -> Result<()> {
        while !self.send_buffer.is_empty() {
            let written = self.transport.send(&self.send_buffer)?;
            if written == 0 {
                return Err(Error::IoError("transport accepted no bytes".into()));
            }
            self.send_buffer.drain(..written);
        }
        Ok(())
    }

    /// Read, reassemble and unprotect one record.
    fn read_record(&mut self) -> Result<(ContentType, Vec<u8>)> {
        loop {
            if let Some((record, consumed)) = Record::parse(&self.read_buffer)? {
                self.read_buffer.drain(..consumed);
                let provider = self.config.provider.as_ref();
                let plaintext = self.read_state.unprotect(
                    provider,
                    record.content_type,
                    record.version,
                    &record.fragment,
                )?;
                return Ok((record.content_type, plaintext));
            }

            let chunk = self
                .transport
                .recv(RECORD_HEADER_SIZE + MAX_CIPHERTEXT_SIZE)?;
            if chunk.is_empty() {
                return Err(Error::IoError("connection closed by peer".into()));
            }
            self.read_buffer.extend_from_slice(&chunk);
        }
    }
}
