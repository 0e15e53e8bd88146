//! Record layer throughput benchmarks.
//!
//! This suite measures application data transfer over an established
//! loopback session:
//! - Send path (fragmentation, MAC, encryption, record framing)
//! - Full round trip (send plus receive on the peer)
//! - Stream versus block cipher protection cost

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use oxtls_core::{
    BulkCipherAlgorithm, CompressionMethod, Config, Error, KxAlgorithm, MacAlgorithm,
    MemoryTransport, Priorities, Session,
};
use oxtls_crypto::DhParams;
use oxtls_crypto_mock::MockProvider;

const PAYLOAD_SIZES: [usize; 3] = [1024, 16_384, 65_536];

fn priorities(cipher: BulkCipherAlgorithm, mac: MacAlgorithm) -> Priorities {
    let mut priorities = Priorities::new();
    priorities.set_kx(&[KxAlgorithm::DhAnon]).unwrap();
    priorities.set_cipher(&[cipher]).unwrap();
    priorities.set_mac(&[mac]).unwrap();
    priorities
        .set_compression(&[CompressionMethod::Null])
        .unwrap();
    priorities
}

fn established_pair(
    cipher: BulkCipherAlgorithm,
    mac: MacAlgorithm,
) -> (Session<MemoryTransport>, Session<MemoryTransport>) {
    let provider = Arc::new(MockProvider::new());
    let client_config = Config::builder(provider.clone())
        .priorities(priorities(cipher, mac))
        .build()
        .unwrap();
    let server_config = Config::builder(provider)
        .priorities(priorities(cipher, mac))
        .dh_params(DhParams {
            prime: vec![0xFF; 64],
            generator: vec![2],
        })
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

fn drain(session: &mut Session<MemoryTransport>, expected: usize) -> usize {
    let mut received = 0;
    while received < expected {
        match session.recv(expected - received) {
            Ok(chunk) if chunk.is_empty() => panic!("peer closed mid-transfer"),
            Ok(chunk) => received += chunk.len(),
            Err(Error::WouldBlock) => panic!("transfer stalled at {} bytes", received),
            Err(error) => panic!("recv failed: {}", error),
        }
    }
    received
}

/// Benchmark the send path alone. The peer drains between iterations so
/// the pipe never grows without bound.
fn benchmark_send(c: &mut Criterion) {
    let mut group = c.benchmark_group("send");

    for size in PAYLOAD_SIZES {
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let (mut client, mut server) = established_pair(
                BulkCipherAlgorithm::Rijndael,
                MacAlgorithm::Sha,
            );
            let payload = vec![0x5A; size];
            b.iter(|| {
                let written = client.send(black_box(&payload)).unwrap();
                drain(&mut server, written);
                black_box(written)
            });
        });
    }

    group.finish();
}

/// Benchmark a full round trip: client sends, server echoes, client drains.
fn benchmark_round_trip(c: &mut Criterion) {
    let mut group = c.benchmark_group("round_trip");

    for size in PAYLOAD_SIZES {
        group.throughput(Throughput::Bytes(2 * size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let (mut client, mut server) = established_pair(
                BulkCipherAlgorithm::Rijndael,
                MacAlgorithm::Sha,
            );
            let payload = vec![0xC3; size];
            b.iter(|| {
                client.send(&payload).unwrap();
                drain(&mut server, size);
                server.send(&payload).unwrap();
                black_box(drain(&mut client, size))
            });
        });
    }

    group.finish();
}

/// Compare protection cost across cipher and MAC pairings at one size.
fn benchmark_cipher_suites(c: &mut Criterion) {
    let mut group = c.benchmark_group("cipher_suites");
    group.throughput(Throughput::Bytes(16_384));

    let pairings = [
        ("arcfour_md5", BulkCipherAlgorithm::Arcfour, MacAlgorithm::Md5),
        ("3des_sha", BulkCipherAlgorithm::TripleDes, MacAlgorithm::Sha),
        ("rijndael_sha", BulkCipherAlgorithm::Rijndael, MacAlgorithm::Sha),
        (
            "rijndael256_sha",
            BulkCipherAlgorithm::Rijndael256,
            MacAlgorithm::Sha,
        ),
        ("twofish_sha", BulkCipherAlgorithm::Twofish, MacAlgorithm::Sha),
    ];

    for (name, cipher, mac) in pairings {
        group.bench_function(name, |b| {
            let (mut client, mut server) = established_pair(cipher, mac);
            let payload = vec![0x7E; 16_384];
            b.iter(|| {
                client.send(&payload).unwrap();
                black_box(drain(&mut server, payload.len()))
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_send,
    benchmark_round_trip,
    benchmark_cipher_suites
);
criterion_main!(benches);
