//! In-memory transport for testing protocol code without a network.
//!
//! A [`LoopbackNetwork`] maps `(host, port)` to listeners. Clients created
//! from the same network connect to those listeners over in-memory duplex
//! pipes.

use crate::client::{Connected, NetClient, NetReader, NetWriter, SplitClient, validate_target};
use crate::error::{ConnectError, ReadError, WriteError};
use crate::socket::write_chunked;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::io;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream, ReadHalf, WriteHalf};
use tokio::sync::mpsc;

type Address = (String, u16);

/// Default capacity of each direction of a loopback pipe.
pub const DEFAULT_PIPE_CAPACITY: usize = 2048;

/// Registry of in-memory listeners.
#[derive(Clone)]
pub struct LoopbackNetwork {
    listeners: Arc<Mutex<HashMap<Address, mpsc::UnboundedSender<DuplexStream>>>>,
    pipe_capacity: usize,
}

impl LoopbackNetwork {
    /// Creates an empty network.
    #[must_use]
    pub fn new() -> Self {
        Self::with_pipe_capacity(DEFAULT_PIPE_CAPACITY)
    }

    /// Creates an empty network whose pipes buffer `capacity` bytes per direction.
    #[must_use]
    pub fn with_pipe_capacity(capacity: usize) -> Self {
        Self {
            listeners: Arc::new(Mutex::new(HashMap::new())),
            pipe_capacity: capacity.max(1),
        }
    }

    /// Starts listening on `host:port`.
    ///
    /// # Errors
    /// Returns `AddrInUse` if a listener already holds the address.
    pub fn listen(&self, host: &str, port: u16) -> io::Result<LoopbackListener> {
        let addr = (host.to_string(), port);
        let mut listeners = self.listeners.lock();

        if listeners.get(&addr).is_some_and(|tx| !tx.is_closed()) {
            return Err(io::Error::new(
                io::ErrorKind::AddrInUse,
                format!("{host}:{port} already in use"),
            ));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        listeners.insert(addr.clone(), tx);

        Ok(LoopbackListener {
            addr,
            incoming: rx,
            network: self.clone(),
        })
    }

    /// Creates a disconnected client on this network.
    #[must_use]
    pub fn client(&self) -> LoopbackClient {
        LoopbackClient {
            network: self.clone(),
            stream: None,
        }
    }

    fn dial(&self, host: &str, port: u16) -> io::Result<DuplexStream> {
        let refused = || {
            io::Error::new(
                io::ErrorKind::ConnectionRefused,
                format!("nothing listening on {host}:{port}"),
            )
        };

        let tx = self
            .listeners
            .lock()
            .get(&(host.to_string(), port))
            .cloned()
            .ok_or_else(refused)?;

        let (client, server) = tokio::io::duplex(self.pipe_capacity);
        tx.send(server).map_err(|_| refused())?;
        Ok(client)
    }
}

impl Default for LoopbackNetwork {
    fn default() -> Self {
        Self::new()
    }
}

/// Accepts connections made to one loopback address.
pub struct LoopbackListener {
    addr: Address,
    incoming: mpsc::UnboundedReceiver<DuplexStream>,
    network: LoopbackNetwork,
}

impl LoopbackListener {
    /// Waits for the next connection and returns the server end of it.
    pub async fn accept(&mut self) -> Option<DuplexStream> {
        self.incoming.recv().await
    }

    /// Returns the host this listener is bound to.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.addr.0
    }

    /// Returns the port this listener is bound to.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.addr.1
    }
}

impl Drop for LoopbackListener {
    fn drop(&mut self) {
        self.network.listeners.lock().remove(&self.addr);
    }
}

/// [`NetClient`] over an in-memory pipe.
pub struct LoopbackClient {
    network: LoopbackNetwork,
    stream: Option<DuplexStream>,
}

#[async_trait]
impl NetClient for LoopbackClient {
    async fn connect(&mut self, host: &str, port: u16) -> Result<Connected, ConnectError> {
        if self.stream.is_some() {
            return Err(ConnectError::AlreadyConnected);
        }
        validate_target(host, port)?;

        self.stream = Some(self.network.dial(host, port)?);
        tracing::debug!(host, port, "loopback connected");

        Ok(Connected {
            host: host.to_string(),
            port,
            peer_addr: None,
        })
    }

    async fn write(&mut self, bytes: &[u8]) -> Result<usize, WriteError> {
        let chunk = self.network.pipe_capacity;
        let stream = self.stream.as_mut().ok_or(WriteError::NotConnected)?;

        let result = write_chunked(stream, bytes, chunk).await;
        if result.is_err() {
            self.stream = None;
        }
        result
    }

    async fn read(&mut self, buffer: &mut [u8]) -> Result<usize, ReadError> {
        let stream = self.stream.as_mut().ok_or(ReadError::NotConnected)?;
        if buffer.is_empty() {
            return Ok(0);
        }

        match stream.read(buffer).await {
            Ok(0) => {
                self.stream = None;
                Ok(0)
            }
            Ok(n) => Ok(n),
            Err(e) => {
                self.stream = None;
                Err(ReadError::Io(e))
            }
        }
    }

    async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.shutdown().await {
                tracing::debug!("loopback shutdown failed: {}", e);
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }
}

impl SplitClient for LoopbackClient {
    type Reader = LoopbackReader;
    type Writer = LoopbackWriter;

    fn split(&mut self) -> Option<(LoopbackReader, LoopbackWriter)> {
        let (read_half, write_half) = tokio::io::split(self.stream.take()?);
        Some((
            LoopbackReader { half: read_half },
            LoopbackWriter {
                half: write_half,
                chunk: self.network.pipe_capacity,
            },
        ))
    }
}

/// Read half of a split [`LoopbackClient`].
pub struct LoopbackReader {
    half: ReadHalf<DuplexStream>,
}

#[async_trait]
impl NetReader for LoopbackReader {
    async fn read(&mut self, buffer: &mut [u8]) -> Result<usize, ReadError> {
        if buffer.is_empty() {
            return Ok(0);
        }
        Ok(self.half.read(buffer).await?)
    }
}

/// Write half of a split [`LoopbackClient`].
pub struct LoopbackWriter {
    half: WriteHalf<DuplexStream>,
    chunk: usize,
}

#[async_trait]
impl NetWriter for LoopbackWriter {
    async fn write(&mut self, bytes: &[u8]) -> Result<usize, WriteError> {
        write_chunked(&mut self.half, bytes, self.chunk).await
    }

    async fn close(&mut self) {
        if let Err(e) = self.half.shutdown().await {
            tracing::debug!("loopback shutdown failed: {}", e);
        }
    }
}
