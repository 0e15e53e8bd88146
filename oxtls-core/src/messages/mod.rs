//! Handshake message codecs.
//!
//! One type per message, each with strict `encode`/`decode`. Decoding
//! validates every length field before reading and never panics; what a
//! message *means* in the current handshake state is the state
//! machine's business, not the codec's.

pub mod certificate;
pub mod certificate_request;
pub mod certificate_verify;
pub mod client_hello;
pub mod client_key_exchange;
pub mod finished;
pub mod hello_request;
pub mod server_hello;
pub mod server_hello_done;
pub mod server_key_exchange;

pub use certificate::Certificate;
pub use certificate_request::{CertificateRequest, CERT_TYPE_DSS_SIGN, CERT_TYPE_RSA_SIGN};
pub use certificate_verify::CertificateVerify;
pub use client_hello::ClientHello;
pub use client_key_exchange::ClientKeyExchange;
pub use finished::Finished;
pub use hello_request::HelloRequest;
pub use server_hello::ServerHello;
pub use server_hello_done::ServerHelloDone;
pub use server_key_exchange::{ServerDhParams, ServerKeyExchange};
