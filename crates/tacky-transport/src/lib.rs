//! Transport abstraction layer for Tacky.
//!
//! Provides the [`Transport`] and [`Connection`] traits that abstract over
//! how lines reach the server, plus [`TcpLineTransport`], a plain TCP
//! listener speaking newline-delimited text.

#![allow(async_fn_in_trait)]

mod error;
mod tcp;

pub use error::TransportError;
pub use tcp::{MAX_LINE_BYTES, TcpLineConnection, TcpLineTransport};

use std::fmt;

/// Opaque identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Accepts new incoming connections.
pub trait Transport: Send + Sync + 'static {
    /// The connection type produced by this transport.
    type Connection: Connection;
    /// The error type for transport operations.
    type Error: std::error::Error + Send + Sync;

    /// Waits for and accepts the next incoming connection.
    async fn accept(&mut self) -> Result<Self::Connection, Self::Error>;

    /// Returns the local address the transport is bound to.
    fn local_addr(&self) -> std::io::Result<std::net::SocketAddr>;
}

/// A single connection that reads and writes text lines.
///
/// Reading and writing are independent: one task may sit in
/// [`recv_line`](Self::recv_line) while another calls
/// [`send_line`](Self::send_line) on the same connection.
pub trait Connection: Send + Sync + 'static {
    /// The error type for connection operations.
    type Error: std::error::Error + Send + Sync;

    /// Writes `line` verbatim and flushes. The caller supplies the
    /// terminator.
    async fn send_line(&self, line: &str) -> Result<(), Self::Error>;

    /// Receives the next line, without its `\n` or `\r\n` terminator.
    /// Bytes that aren't valid UTF-8 are replaced, not rejected.
    ///
    /// Returns `Ok(None)` when the peer closed the stream.
    async fn recv_line(&self) -> Result<Option<String>, Self::Error>;

    /// Shuts down the write side of the connection.
    async fn close(&self) -> Result<(), Self::Error>;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;
}
