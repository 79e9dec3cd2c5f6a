use crate::errors::{ClientError, ClientResult};

use std::io::{self, Read, Write};
use std::net::{Ipv4Addr, Shutdown, SocketAddrV4, TcpStream};
use std::os::fd::{AsFd, BorrowedFd};

/// The TCP connection to the host
///
/// Thin synchronous wrappers around the socket. A zero-length receive is
/// reported as `Ok(0)` and left for the caller to treat as orderly closure;
/// every other failure becomes a fatal `ClientError`.
#[derive(Debug)]
pub struct Connector {
    stream: TcpStream,
    peer: SocketAddrV4,
    closed: bool,
}

impl Connector {
    /// Create a stream socket and connect it to `ip:port`
    pub fn connect(ip: Ipv4Addr, port: u16) -> ClientResult<Self> {
        let peer = SocketAddrV4::new(ip, port);
        let stream = TcpStream::connect(peer).map_err(|source| ClientError::Connect {
            addr: peer.to_string(),
            source,
        })?;

        tracing::info!(%peer, "connected");
        Ok(Self::from_stream(stream, peer))
    }

    fn from_stream(stream: TcpStream, peer: SocketAddrV4) -> Self {
        Self {
            stream,
            peer,
            closed: false,
        }
    }

    pub fn peer(&self) -> SocketAddrV4 {
        self.peer
    }

    /// Send every byte or fail
    pub fn send(&mut self, bytes: &[u8]) -> ClientResult<()> {
        self.stream.write_all(bytes).map_err(ClientError::Send)
    }

    /// Read up to `buf.len()` bytes; `Ok(0)` means the host closed
    pub fn receive(&mut self, buf: &mut [u8]) -> ClientResult<usize> {
        loop {
            match self.stream.read(buf) {
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(ClientError::Receive(e)),
            }
        }
    }

    /// Fill `buf` completely; `Ok(false)` if the host closed first
    pub fn receive_exact(&mut self, buf: &mut [u8]) -> ClientResult<bool> {
        match self.stream.read_exact(buf) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(false),
            Err(e) => Err(ClientError::Receive(e)),
        }
    }

    /// Shut the socket down; later calls do nothing
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Err(e) = self.stream.shutdown(Shutdown::Both) {
            // Already gone when the host hung up first
            tracing::debug!(error = %e, "socket shutdown");
        }
    }
}

impl AsFd for Connector {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.stream.as_fd()
    }
}
