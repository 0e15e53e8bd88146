//! Full Handshake Integration Tests
//!
//! Loopback handshakes between a client and a server session over an
//! in-memory transport, covering:
//! - Anonymous, RSA and ephemeral-DH key exchanges
//! - Stream and block cipher record protection after the handshake
//! - Version negotiation, including the SSL 3.0 floor
//! - Negotiation failures and their alert round trips
//! - Retry behavior on a transport that blocks

use std::sync::Arc;

use oxtls_core::{
    BulkCipherAlgorithm, CompressionMethod, Config, Error, KxAlgorithm, MacAlgorithm,
    MemoryTransport, Priorities, Role, Session, TlsVersion,
};
use oxtls_crypto::DhParams;
use oxtls_crypto_mock::MockProvider;

fn priorities(
    kx: &[KxAlgorithm],
    ciphers: &[BulkCipherAlgorithm],
    macs: &[MacAlgorithm],
) -> Priorities {
    let mut priorities = Priorities::new();
    priorities.set_kx(kx).unwrap();
    priorities.set_cipher(ciphers).unwrap();
    priorities.set_mac(macs).unwrap();
    priorities
        .set_compression(&[CompressionMethod::Null])
        .unwrap();
    priorities
}

fn dh_group() -> DhParams {
    DhParams {
        prime: vec![0xFF; 64],
        generator: vec![2],
    }
}

/// Pump both sessions until both handshakes complete.
fn drive(client: &mut Session<MemoryTransport>, server: &mut Session<MemoryTransport>) {
    for _ in 0..64 {
        let client_done = match client.handshake() {
            Ok(()) => true,
            Err(Error::WouldBlock) => false,
            Err(error) => panic!("client handshake failed: {}", error),
        };
        let server_done = match server.handshake() {
            Ok(()) => true,
            Err(Error::WouldBlock) => false,
            Err(error) => panic!("server handshake failed: {}", error),
        };
        if client_done && server_done {
            return;
        }
    }
    panic!("handshake did not converge");
}

/// Send `payload` from one session and read it back on the other.
fn exchange(
    from: &mut Session<MemoryTransport>,
    to: &mut Session<MemoryTransport>,
    payload: &[u8],
) {
    assert_eq!(from.send(payload).unwrap(), payload.len());

    let mut received = Vec::new();
    for _ in 0..100 {
        if received.len() >= payload.len() {
            break;
        }
        match to.recv(payload.len() - received.len()) {
            Ok(chunk) => {
                assert!(!chunk.is_empty(), "peer closed before payload arrived");
                received.extend_from_slice(&chunk);
            }
            Err(error) => panic!("recv failed: {}", error),
        }
    }
    assert_eq!(received, payload);
}

fn anonymous_pair() -> (Session<MemoryTransport>, Session<MemoryTransport>) {
    let provider = Arc::new(MockProvider::new());
    let suite_priorities = priorities(
        &[KxAlgorithm::DhAnon],
        &[BulkCipherAlgorithm::Rijndael],
        &[MacAlgorithm::Sha],
    );

    let client_config = Config::builder(provider.clone())
        .priorities(suite_priorities.clone())
        .build()
        .unwrap();
    let server_config = Config::builder(provider)
        .priorities(suite_priorities)
        .dh_params(dh_group())
        .resumable(false)
        .build()
        .unwrap();

    let (client_end, server_end) = MemoryTransport::pair();
    (
        Session::client(client_config, client_end).unwrap(),
        Session::server(server_config, server_end).unwrap(),
    )
}

/// Test an anonymous Diffie-Hellman handshake end to end.
#[test]
fn test_anonymous_dh_handshake() {
    let (mut client, mut server) = anonymous_pair();
    drive(&mut client, &mut server);

    assert!(client.is_established());
    assert!(server.is_established());
    assert_eq!(client.version(), Some(TlsVersion::Tls1));
    assert_eq!(server.version(), Some(TlsVersion::Tls1));

    let suite = client.cipher_suite().unwrap();
    assert_eq!(suite, server.cipher_suite().unwrap());
    assert_eq!(suite.kx(), Some(KxAlgorithm::DhAnon));
    assert_eq!(suite.cipher(), Some(BulkCipherAlgorithm::Rijndael));

    let client_params = client.security_parameters().unwrap();
    assert_eq!(client_params.role, Role::Client);
    assert_eq!(
        server.security_parameters().unwrap().role,
        Role::Server
    );

    exchange(&mut client, &mut server, b"hello over anonymous DH");
    exchange(&mut server, &mut client, b"and back again");
}

/// Test RSA key transport with server credentials.
#[test]
fn test_rsa_key_transport_handshake() {
    let provider = Arc::new(MockProvider::new());
    let (certificate, private_key) = provider.generate_credentials().unwrap();
    let suite_priorities = priorities(
        &[KxAlgorithm::Rsa],
        &[BulkCipherAlgorithm::Rijndael, BulkCipherAlgorithm::TripleDes],
        &[MacAlgorithm::Sha],
    );

    let client_config = Config::builder(provider.clone())
        .priorities(suite_priorities.clone())
        .build()
        .unwrap();
    let server_config = Config::builder(provider)
        .priorities(suite_priorities)
        .certificate_chain(vec![certificate])
        .private_key(private_key)
        .resumable(false)
        .build()
        .unwrap();

    let (client_end, server_end) = MemoryTransport::pair();
    let mut client = Session::client(client_config, client_end).unwrap();
    let mut server = Session::server(server_config, server_end).unwrap();

    drive(&mut client, &mut server);

    assert_eq!(client.cipher_suite().unwrap().kx(), Some(KxAlgorithm::Rsa));
    exchange(&mut client, &mut server, b"premaster went by key transport");
    exchange(&mut server, &mut client, b"acknowledged");
}

/// Test ephemeral DH with an RSA-signed ServerKeyExchange.
#[test]
fn test_dhe_rsa_handshake() {
    let provider = Arc::new(MockProvider::new());
    let (certificate, private_key) = provider.generate_credentials().unwrap();
    let suite_priorities = priorities(
        &[KxAlgorithm::DheRsa],
        &[BulkCipherAlgorithm::Rijndael256],
        &[MacAlgorithm::Sha],
    );

    let client_config = Config::builder(provider.clone())
        .priorities(suite_priorities.clone())
        .build()
        .unwrap();
    let server_config = Config::builder(provider)
        .priorities(suite_priorities)
        .certificate_chain(vec![certificate])
        .private_key(private_key)
        .dh_params(dh_group())
        .resumable(false)
        .build()
        .unwrap();

    let (client_end, server_end) = MemoryTransport::pair();
    let mut client = Session::client(client_config, client_end).unwrap();
    let mut server = Session::server(server_config, server_end).unwrap();

    drive(&mut client, &mut server);

    let suite = client.cipher_suite().unwrap();
    assert_eq!(suite.kx(), Some(KxAlgorithm::DheRsa));
    assert_eq!(suite.cipher(), Some(BulkCipherAlgorithm::Rijndael256));
    exchange(&mut client, &mut server, b"signed ephemeral exchange");
}

/// Test a stream cipher suite; no padding on the record path.
#[test]
fn test_arcfour_md5_handshake() {
    let provider = Arc::new(MockProvider::new());
    let suite_priorities = priorities(
        &[KxAlgorithm::DhAnon],
        &[BulkCipherAlgorithm::Arcfour],
        &[MacAlgorithm::Md5],
    );

    let client_config = Config::builder(provider.clone())
        .priorities(suite_priorities.clone())
        .build()
        .unwrap();
    let server_config = Config::builder(provider)
        .priorities(suite_priorities)
        .dh_params(dh_group())
        .resumable(false)
        .build()
        .unwrap();

    let (client_end, server_end) = MemoryTransport::pair();
    let mut client = Session::client(client_config, client_end).unwrap();
    let mut server = Session::server(server_config, server_end).unwrap();

    drive(&mut client, &mut server);

    let suite = client.cipher_suite().unwrap();
    assert_eq!(suite.cipher(), Some(BulkCipherAlgorithm::Arcfour));
    assert_eq!(suite.mac(), Some(MacAlgorithm::Md5));
    exchange(&mut client, &mut server, b"stream cipher traffic");
}

/// Test that two SSL 3.0-only peers settle on SSL 3.0.
#[test]
fn test_ssl3_only_session() {
    let provider = Arc::new(MockProvider::new());
    let suite_priorities = priorities(
        &[KxAlgorithm::DhAnon],
        &[BulkCipherAlgorithm::TripleDes],
        &[MacAlgorithm::Sha],
    );

    let client_config = Config::builder(provider.clone())
        .priorities(suite_priorities.clone())
        .versions(&[TlsVersion::Ssl3])
        .build()
        .unwrap();
    let server_config = Config::builder(provider)
        .priorities(suite_priorities)
        .versions(&[TlsVersion::Ssl3])
        .dh_params(dh_group())
        .resumable(false)
        .build()
        .unwrap();

    let (client_end, server_end) = MemoryTransport::pair();
    let mut client = Session::client(client_config, client_end).unwrap();
    let mut server = Session::server(server_config, server_end).unwrap();

    drive(&mut client, &mut server);

    assert_eq!(client.version(), Some(TlsVersion::Ssl3));
    assert_eq!(server.version(), Some(TlsVersion::Ssl3));
    exchange(&mut client, &mut server, b"ssl3 record");
}

/// Test that a TLS 1.0 client meets an SSL 3.0 server at SSL 3.0.
#[test]
fn test_version_negotiates_down_to_server_maximum() {
    let provider = Arc::new(MockProvider::new());
    let suite_priorities = priorities(
        &[KxAlgorithm::DhAnon],
        &[BulkCipherAlgorithm::Rijndael],
        &[MacAlgorithm::Sha],
    );

    let client_config = Config::builder(provider.clone())
        .priorities(suite_priorities.clone())
        .versions(&[TlsVersion::Tls1, TlsVersion::Ssl3])
        .build()
        .unwrap();
    let server_config = Config::builder(provider)
        .priorities(suite_priorities)
        .versions(&[TlsVersion::Ssl3])
        .dh_params(dh_group())
        .resumable(false)
        .build()
        .unwrap();

    let (client_end, server_end) = MemoryTransport::pair();
    let mut client = Session::client(client_config, client_end).unwrap();
    let mut server = Session::server(server_config, server_end).unwrap();

    drive(&mut client, &mut server);

    assert_eq!(client.version(), Some(TlsVersion::Ssl3));
    assert_eq!(server.version(), Some(TlsVersion::Ssl3));
}

/// Test that disjoint suite preferences abort the handshake with a
/// fatal alert on both ends.
#[test]
fn test_no_common_suite_fails_both_sides() {
    let provider = Arc::new(MockProvider::new());
    let client_config = Config::builder(provider.clone())
        .priorities(priorities(
            &[KxAlgorithm::DhAnon],
            &[BulkCipherAlgorithm::Rijndael],
            &[MacAlgorithm::Sha],
        ))
        .build()
        .unwrap();
    let (certificate, private_key) = provider.generate_credentials().unwrap();
    let server_config = Config::builder(provider)
        .priorities(priorities(
            &[KxAlgorithm::Rsa],
            &[BulkCipherAlgorithm::Arcfour],
            &[MacAlgorithm::Md5],
        ))
        .certificate_chain(vec![certificate])
        .private_key(private_key)
        .build()
        .unwrap();

    let (client_end, server_end) = MemoryTransport::pair();
    let mut client = Session::client(client_config, client_end).unwrap();
    let mut server = Session::server(server_config, server_end).unwrap();

    assert!(matches!(client.handshake(), Err(Error::WouldBlock)));
    let server_error = server.handshake().unwrap_err();
    assert!(matches!(server_error, Error::HandshakeFailure(_)));

    // The fatal alert reaches the client on its next pass.
    let client_error = client.handshake().unwrap_err();
    assert!(matches!(client_error, Error::AlertReceived(_)));
    assert!(!client.is_established());
    assert!(!server.is_established());
}

/// Test that a static DH suite negotiates but cannot produce a
/// premaster secret, failing the key exchange step.
#[test]
fn test_static_dh_suite_cannot_complete() {
    let provider = Arc::new(MockProvider::new());
    let (certificate, private_key) = provider.generate_credentials().unwrap();
    let suite_priorities = priorities(
        &[KxAlgorithm::DhRsa],
        &[BulkCipherAlgorithm::Rijndael],
        &[MacAlgorithm::Sha],
    );

    let client_config = Config::builder(provider.clone())
        .priorities(suite_priorities.clone())
        .build()
        .unwrap();
    let server_config = Config::builder(provider)
        .priorities(suite_priorities)
        .certificate_chain(vec![certificate])
        .private_key(private_key)
        .build()
        .unwrap();

    let (client_end, server_end) = MemoryTransport::pair();
    let mut client = Session::client(client_config, client_end).unwrap();
    let mut server = Session::server(server_config, server_end).unwrap();

    let mut failure = None;
    for _ in 0..16 {
        match client.handshake() {
            Ok(()) => break,
            Err(Error::WouldBlock) => {}
            Err(error) => {
                failure = Some(error);
                break;
            }
        }
        match server.handshake() {
            Ok(()) => {}
            Err(Error::WouldBlock) => {}
            Err(error) => {
                failure = Some(error);
                break;
            }
        }
    }

    assert!(matches!(failure, Some(Error::HandshakeFailure(_))));
}

/// Test that repeated handshake calls without peer progress stay
/// retryable and do not duplicate the ClientHello.
#[test]
fn test_client_handshake_retries_are_idempotent() {
    let (mut client, mut server) = anonymous_pair();

    for _ in 0..3 {
        assert!(matches!(client.handshake(), Err(Error::WouldBlock)));
    }

    // A duplicated hello would make the server reject the second copy.
    drive(&mut client, &mut server);
    assert!(client.is_established());
}

/// Test that sessions reject traffic before the handshake has run.
#[test]
fn test_traffic_before_handshake_is_rejected() {
    let (mut client, _server) = anonymous_pair();

    assert!(matches!(
        client.send(b"too early"),
        Err(Error::InvalidConfig(_))
    ));
    assert!(matches!(client.recv(64), Err(Error::InvalidConfig(_))));
}

/// Test that a client with empty priorities cannot even offer.
#[test]
fn test_empty_priorities_fail_immediately() {
    let provider = Arc::new(MockProvider::new());
    let config = Config::builder(provider)
        .priorities(Priorities::new())
        .build()
        .unwrap();

    let (end, _peer) = MemoryTransport::pair();
    let mut client = Session::client(config, end).unwrap();

    assert!(matches!(
        client.handshake(),
        Err(Error::HandshakeFailure(_))
    ));
}
