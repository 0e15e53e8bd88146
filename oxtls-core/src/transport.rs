//! Transport abstraction.
//!
//! The engine never touches sockets. It pushes and pulls raw bytes
//! through this trait and treats [`Error::WouldBlock`] as "stop, keep
//! your state, call again later"; everything needed to resume lives in
//! the session's buffers, not in the transport.

use crate::error::{Error, Result};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// A byte transport connecting two endpoints.
pub trait Transport: Send {
    /// Send bytes, returning how many were accepted.
    ///
    /// May accept fewer than `data.len()` bytes; may return
    /// [`Error::WouldBlock`] to accept none right now.
    fn send(&mut self, data: &[u8]) -> Result<usize>;

    /// Receive up to `max_len` bytes.
    ///
    /// Returns [`Error::WouldBlock`] when nothing is available yet and
    /// an empty vector once the peer has closed its sending side.
    fn recv(&mut self, max_len: usize) -> Result<Vec<u8>>;
}

#[derive(Debug, Default)]
struct Pipe {
    data: VecDeque<u8>,
    closed: bool,
}

/// In-memory duplex transport; [`pair`](MemoryTransport::pair) yields
/// the two connected ends.
///
/// An empty inbound pipe reads as [`Error::WouldBlock`] until the peer
/// end closes, which turns further reads into clean end-of-stream.
#[derive(Debug)]
pub struct MemoryTransport {
    inbound: Arc<Mutex<Pipe>>,
    outbound: Arc<Mutex<Pipe>>,
}

impl MemoryTransport {
    /// Create two connected transport ends.
    pub fn pair() -> (MemoryTransport, MemoryTransport) {
        let a = Arc::new(Mutex::new(Pipe::default()));
        let b = Arc::new(Mutex::new(Pipe::default()));
        (
            MemoryTransport {
                inbound: Arc::clone(&a),
                outbound: Arc::clone(&b),
            },
            MemoryTransport {
                inbound: b,
                outbound: a,
            },
        )
    }

    /// Close the sending side; the peer reads end-of-stream after
    /// draining what is buffered.
    pub fn close(&mut self) {
        if let Ok(mut pipe) = self.outbound.lock() {
            pipe.closed = true;
        }
    }

    /// Bytes waiting to be read by this end.
    pub fn pending(&self) -> usize {
        self.inbound.lock().map(|p| p.data.len()).unwrap_or(0)
    }
}

impl Transport for MemoryTransport {
    fn send(&mut self, data: &[u8]) -> Result<usize> {
        let mut pipe = self
            .outbound
            .lock()
            .map_err(|_| Error::IoError("transport lock poisoned".into()))?;
        if pipe.closed {
            return Err(Error::IoError("transport closed".into()));
        }
        pipe.data.extend(data);
        Ok(data.len())
    }

    fn recv(&mut self, max_len: usize) -> Result<Vec<u8>> {
        let mut pipe = self
            .inbound
            .lock()
            .map_err(|_| Error::IoError("transport lock poisoned".into()))?;
        if pipe.data.is_empty() {
            if pipe.closed {
                return Ok(Vec::new());
            }
            return Err(Error::WouldBlock);
        }

        let take = max_len.min(pipe.data.len());
        Ok(pipe.data.drain(..take).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_round_trip() {
        let (mut a, mut b) = MemoryTransport::pair();

        assert_eq!(a.send(b"ping").unwrap(), 4);
        assert_eq!(b.recv(1024).unwrap(), b"ping");

        assert_eq!(b.send(b"pong").unwrap(), 4);
        assert_eq!(a.recv(1024).unwrap(), b"pong");
    }

    #[test]
    fn test_empty_pipe_would_block() {
        let (mut a, _b) = MemoryTransport::pair();
        assert_eq!(a.recv(16).unwrap_err(), Error::WouldBlock);
    }

    #[test]
    fn test_partial_reads() {
        let (mut a, mut b) = MemoryTransport::pair();
        a.send(&[1, 2, 3, 4, 5]).unwrap();

        assert_eq!(b.recv(2).unwrap(), vec![1, 2]);
        assert_eq!(b.recv(2).unwrap(), vec![3, 4]);
        assert_eq!(b.recv(2).unwrap(), vec![5]);
        assert_eq!(b.recv(2).unwrap_err(), Error::WouldBlock);
    }

    #[test]
    fn test_close_drains_then_eof() {
        let (mut a, mut b) = MemoryTransport::pair();
        a.send(b"last words").unwrap();
        a.close();

        assert_eq!(b.recv(1024).unwrap(), b"last words");
        assert_eq!(b.recv(1024).unwrap(), Vec::<u8>::new());
        assert!(a.send(b"too late").is_err());
    }
}
