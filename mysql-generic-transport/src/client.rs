//! The capability set every transport backend provides.

use crate::error::{ConnectError, ReadError, WriteError};
use async_trait::async_trait;
use std::fmt;
use std::net::SocketAddr;

/// Byte stream client used by the MySQL protocol layer.
///
/// Every backend implements this trait, and protocol code is written against
/// it and never against a backend type. Implementations are single owner:
/// share one between tasks through [`SharedClient`](crate::SharedClient).
#[async_trait]
pub trait NetClient: Send {
    /// Opens a connection to `host:port`.
    ///
    /// # Errors
    /// Returns `ConnectError` if already connected, if no socket is free,
    /// or if the host cannot be reached.
    async fn connect(&mut self, host: &str, port: u16) -> Result<Connected, ConnectError>;

    /// Writes all of `bytes` and returns the number written.
    ///
    /// # Errors
    /// Returns `WriteError` if not connected or the write fails.
    async fn write(&mut self, bytes: &[u8]) -> Result<usize, WriteError>;

    /// Reads into `buffer`. `Ok(0)` means the peer closed the connection.
    ///
    /// # Errors
    /// Returns `ReadError` if not connected or the read fails.
    async fn read(&mut self, buffer: &mut [u8]) -> Result<usize, ReadError>;

    /// Closes the connection. Calling it again is a no-op.
    async fn close(&mut self);

    /// Returns true while a connection is open.
    fn is_connected(&self) -> bool;
}

#[async_trait]
impl<C: NetClient + ?Sized> NetClient for Box<C> {
    async fn connect(&mut self, host: &str, port: u16) -> Result<Connected, ConnectError> {
        (**self).connect(host, port).await
    }

    async fn write(&mut self, bytes: &[u8]) -> Result<usize, WriteError> {
        (**self).write(bytes).await
    }

    async fn read(&mut self, buffer: &mut [u8]) -> Result<usize, ReadError> {
        (**self).read(buffer).await
    }

    async fn close(&mut self) {
        (**self).close().await;
    }

    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }
}

/// Read half of a split connection.
#[async_trait]
pub trait NetReader: Send {
    /// Reads into `buffer`. `Ok(0)` means the peer closed the connection.
    ///
    /// # Errors
    /// Returns `ReadError` if the read fails.
    async fn read(&mut self, buffer: &mut [u8]) -> Result<usize, ReadError>;
}

/// Write half of a split connection.
#[async_trait]
pub trait NetWriter: Send {
    /// Writes all of `bytes` and returns the number written.
    ///
    /// # Errors
    /// Returns `WriteError` if the write fails.
    async fn write(&mut self, bytes: &[u8]) -> Result<usize, WriteError>;

    /// Shuts down the write direction.
    async fn close(&mut self);
}

/// A client whose open connection can be driven from two tasks at once.
pub trait SplitClient: NetClient {
    /// Read half type.
    type Reader: NetReader + 'static;
    /// Write half type.
    type Writer: NetWriter + 'static;

    /// Moves the open connection out of the client as a read half and a
    /// write half. The client is left disconnected. Returns `None` if no
    /// connection is open.
    ///
    /// Backend resources such as the socket slot are released once both
    /// halves are dropped.
    fn split(&mut self) -> Option<(Self::Reader, Self::Writer)>;
}

/// A successfully opened connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connected {
    /// Host as passed to `connect`.
    pub host: String,
    /// Port as passed to `connect`.
    pub port: u16,
    /// Resolved peer address, if the transport has one.
    pub peer_addr: Option<SocketAddr>,
}

impl fmt::Display for Connected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.peer_addr {
            Some(addr) => write!(f, "{}:{} ({addr})", self.host, self.port),
            None => write!(f, "{}:{}", self.host, self.port),
        }
    }
}

/// Per-client settings.
///
/// Buffer overrides are clamped to what the backend chip provides.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Enable TCP_NODELAY.
    pub tcp_nodelay: bool,
    /// Largest chunk handed to the socket per write, `None` for the chip TX buffer.
    pub tx_chunk: Option<usize>,
    /// Largest single read, `None` for the chip RX buffer.
    pub rx_chunk: Option<usize>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            tcp_nodelay: true,
            tx_chunk: None,
            rx_chunk: None,
        }
    }
}

impl ClientConfig {
    /// Creates a config with TCP_NODELAY enabled and chip sized buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets TCP_NODELAY option.
    #[must_use]
    pub fn tcp_nodelay(mut self, enabled: bool) -> Self {
        self.tcp_nodelay = enabled;
        self
    }

    /// Sets the write chunk size.
    #[must_use]
    pub fn tx_chunk(mut self, size: usize) -> Self {
        self.tx_chunk = Some(size);
        self
    }

    /// Sets the read chunk size.
    #[must_use]
    pub fn rx_chunk(mut self, size: usize) -> Self {
        self.rx_chunk = Some(size);
        self
    }

    /// Write chunk size for a chip with a `limit` byte TX buffer. Never 0.
    #[must_use]
    pub fn effective_tx(&self, limit: usize) -> usize {
        self.tx_chunk.map_or(limit, |n| n.min(limit)).max(1)
    }

    /// Read size for a chip with a `limit` byte RX buffer. Never 0.
    #[must_use]
    pub fn effective_rx(&self, limit: usize) -> usize {
        self.rx_chunk.map_or(limit, |n| n.min(limit)).max(1)
    }
}

/// Rejects hosts and ports no backend can connect to.
pub(crate) fn validate_target(host: &str, port: u16) -> Result<(), ConnectError> {
    if host.trim().is_empty() {
        return Err(ConnectError::invalid_host("empty host"));
    }
    if port == 0 {
        return Err(ConnectError::invalid_host(format!("{host}: port 0")));
    }
    Ok(())
}
