//! Encrypted Communication Tests
//!
//! Application data over established sessions:
//! - Round trips in both directions under the negotiated keys
//! - Fragmentation of payloads larger than one record
//! - recv length capping and buffered delivery
//! - close_notify exchange and post-close behavior

use std::sync::Arc;

use oxtls_core::{
    BulkCipherAlgorithm, CompressionMethod, Config, Error, KxAlgorithm, MacAlgorithm,
    MemoryTransport, Priorities, Session,
};
use oxtls_crypto::DhParams;
use oxtls_crypto_mock::MockProvider;

fn established_pair() -> (Session<MemoryTransport>, Session<MemoryTransport>) {
    let provider = Arc::new(MockProvider::new());
    let mut priorities = Priorities::new();
    priorities.set_kx(&[KxAlgorithm::DhAnon]).unwrap();
    priorities
        .set_cipher(&[BulkCipherAlgorithm::Rijndael])
        .unwrap();
    priorities.set_mac(&[MacAlgorithm::Sha]).unwrap();
    priorities
        .set_compression(&[CompressionMethod::Null])
        .unwrap();

    let client_config = Config::builder(provider.clone())
        .priorities(priorities.clone())
        .build()
        .unwrap();
    let server_config = Config::builder(provider)
        .priorities(priorities)
        .dh_params(DhParams {
            prime: vec![0xFF; 64],
            generator: vec![2],
        })
        .resumable(false)
        .build()
        .unwrap();

    let (client_end, server_end) = MemoryTransport::pair();
    let mut client = Session::client(client_config, client_end).unwrap();
    let mut server = Session::server(server_config, server_end).unwrap();

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
            return (client, server);
        }
    }
    panic!("handshake did not converge");
}

fn recv_exact(session: &mut Session<MemoryTransport>, len: usize) -> Vec<u8> {
    let mut collected = Vec::new();
    for _ in 0..200 {
        if collected.len() >= len {
            break;
        }
        let chunk = session.recv(len - collected.len()).unwrap();
        assert!(!chunk.is_empty(), "peer closed before payload arrived");
        collected.extend_from_slice(&chunk);
    }
    collected
}

/// Test several application data round trips in both directions.
#[test]
fn test_bidirectional_application_data() {
    let (mut client, mut server) = established_pair();

    for round in 0u8..5 {
        let request = vec![round; 64];
        assert_eq!(client.send(&request).unwrap(), request.len());
        assert_eq!(recv_exact(&mut server, request.len()), request);

        let response = vec![round ^ 0xFF; 48];
        assert_eq!(server.send(&response).unwrap(), response.len());
        assert_eq!(recv_exact(&mut client, response.len()), response);
    }
}

/// Test that a payload larger than one record fragments and reassembles.
#[test]
fn test_large_payload_fragments_across_records() {
    let (mut client, mut server) = established_pair();

    let payload: Vec<u8> = (0..70_000u32).map(|i| (i % 251) as u8).collect();
    assert_eq!(client.send(&payload).unwrap(), payload.len());

    let received = recv_exact(&mut server, payload.len());
    assert_eq!(received, payload);
}

/// Test that recv never returns more than asked and keeps the rest.
#[test]
fn test_recv_respects_max_len() {
    let (mut client, mut server) = established_pair();

    client.send(&[7u8; 100]).unwrap();

    let first = server.recv(10).unwrap();
    assert_eq!(first.len(), 10);

    let rest = recv_exact(&mut server, 90);
    assert_eq!(rest, vec![7u8; 90]);
}

/// Test that empty sends are accepted and produce nothing.
#[test]
fn test_empty_send_is_a_noop() {
    let (mut client, mut server) = established_pair();

    assert_eq!(client.send(&[]).unwrap(), 0);
    assert!(matches!(server.recv(16), Err(Error::WouldBlock)));
}

/// Test the close_notify exchange and the state it leaves behind.
#[test]
fn test_close_notify_round_trip() {
    let (mut client, mut server) = established_pair();

    client.close().unwrap();

    // The server reads end-of-session and answers with its own alert.
    assert_eq!(server.recv(64).unwrap(), Vec::<u8>::new());
    assert_eq!(client.recv(64).unwrap(), Vec::<u8>::new());

    assert!(matches!(client.send(b"late"), Err(Error::SessionClosed)));
    assert!(matches!(server.send(b"late"), Err(Error::SessionClosed)));

    // Repeated reads keep reporting the clean close.
    assert_eq!(server.recv(64).unwrap(), Vec::<u8>::new());
}

/// Test that close is idempotent.
#[test]
fn test_close_twice_is_harmless() {
    let (mut client, _server) = established_pair();

    client.close().unwrap();
    client.close().unwrap();
}

/// Test that data sent before closing is still readable by the peer.
#[test]
fn test_data_before_close_is_delivered() {
    let (mut client, mut server) = established_pair();

    client.send(b"parting words").unwrap();
    client.close().unwrap();

    assert_eq!(recv_exact(&mut server, 13), b"parting words".to_vec());
    assert_eq!(server.recv(64).unwrap(), Vec::<u8>::new());
}
