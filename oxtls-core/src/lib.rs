//! # oxtls protocol engine
//!
//! An SSL 3.0 / TLS 1.0 protocol implementation built around pluggable
//! cryptography. The engine owns the wire protocol end to end and
//! consumes primitives exclusively through the [`oxtls_crypto`] traits:
//!
//! - Record layer: fragmentation, compression, MAC-then-encrypt
//! - Handshake state machines for both roles, full and abbreviated
//! - Cipher suite registry and priority-driven negotiation
//! - Key schedule from premaster secret to directional record keys
//! - Session resumption against a pluggable store
//! - Alert mapping and fatal-failure bookkeeping
//!
//! ## Architecture
//!
//! ```text
//! Session<T: Transport>           per-connection driver
//! ├── ClientHandshake /           sans-io message state machines
//! │   ServerHandshake
//! ├── ConnectionState x4          active + pending record protection,
//! │                               one per direction
//! ├── HandshakeBuffer             reassembly across record boundaries
//! └── Config                      priorities, credentials, versions,
//!                                 session store
//! ```
//!
//! The handshake machines never touch the transport. They consume
//! framed messages, queue outbound items and hand derived key material
//! to the session, which owns all record protection and I/O. Anything
//! that can block returns [`Error::WouldBlock`] and is safe to retry.
//!
//! ## Example
//!
//! ```rust,ignore
//! use oxtls_core::{Config, Session};
//!
//! let config = Config::builder(provider).build()?;
//! let mut session = Session::client(config, transport)?;
//! session.handshake()?;
//! session.send(b"ping")?;
//! let reply = session.recv(1024)?;
//! ```
//!
//! ## Feature Flags
//!
//! - `zlib`: enable the ZLIB record compression method

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub,
    unused_qualifications
)]

pub use oxtls_crypto;

pub mod alert;
pub mod compression;
pub mod error;
pub mod handshake;
pub mod handshake_io;
pub mod key_schedule;
pub mod messages;
pub mod priority;
pub mod protocol;
pub mod record;
pub mod record_protection;
pub mod registry;
pub mod selector;
pub mod session;
pub mod session_store;
pub mod transcript;
pub mod transport;

pub use alert::{Alert, AlertLevel};
pub use error::{AlertDescription, Error, Result};
pub use priority::Priorities;
pub use protocol::{ContentType, HandshakeType};
pub use registry::{
    BulkCipherAlgorithm, CipherSuiteId, CompressionMethod, KxAlgorithm, MacAlgorithm, TlsVersion,
};
pub use session::{Config, ConfigBuilder, Role, SecurityParameters, Session};
pub use session_store::{InMemorySessionStore, SessionStore, DEFAULT_EXPIRE_TIME};
pub use transport::{MemoryTransport, Transport};
