//! TCP client shared by the chip backends.
//!
//! A backend is a [`ChipProfile`]: the chip's socket count, its per-socket
//! buffer sizes and any socket tuning. [`SocketClient`] runs the profile
//! over a tokio `TcpStream`.

use crate::client::{
    ClientConfig, Connected, NetClient, NetReader, NetWriter, SplitClient, validate_target,
};
use crate::error::{ConnectError, ReadError, WriteError};
use crate::selection::Backend;
use async_trait::async_trait;
use std::io;
use std::marker::PhantomData;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};

/// Hardware characteristics of a transport backend.
pub trait ChipProfile: Send + Sync + 'static {
    /// Backend this profile implements.
    const BACKEND: Backend;
    /// Chip name, used in logs and errors.
    const CHIP: &'static str;
    /// Number of sockets the chip can hold open at once.
    const MAX_SOCKETS: usize;
    /// Per-socket transmit buffer in bytes.
    const TX_BUFFER: usize;
    /// Per-socket receive buffer in bytes.
    const RX_BUFFER: usize;

    /// Socket slots shared by every client of this chip.
    fn sockets() -> &'static SocketPool;

    /// Applies chip specific socket options to a fresh connection.
    ///
    /// # Errors
    /// Returns IO error if an option cannot be set.
    fn configure(stream: &TcpStream, config: &ClientConfig) -> io::Result<()> {
        stream.set_nodelay(config.tcp_nodelay)
    }
}

/// Counts the hardware sockets in use.
#[derive(Debug, Default)]
pub struct SocketPool {
    in_use: AtomicUsize,
}

impl SocketPool {
    /// Creates an empty pool.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            in_use: AtomicUsize::new(0),
        }
    }

    /// Claims a socket if fewer than `max` are in use.
    pub fn try_acquire(&'static self, max: usize) -> Option<SocketSlot> {
        self.in_use
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < max).then_some(n + 1)
            })
            .ok()
            .map(|_| SocketSlot { pool: self })
    }

    /// Returns the number of sockets in use.
    #[must_use]
    pub fn in_use(&self) -> usize {
        self.in_use.load(Ordering::Acquire)
    }
}

/// A claimed socket, released on drop.
#[derive(Debug)]
pub struct SocketSlot {
    pool: &'static SocketPool,
}

impl Drop for SocketSlot {
    fn drop(&mut self) {
        self.pool.in_use.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Writes `bytes` in pieces of at most `chunk` bytes.
///
/// On failure the error carries the number of pieces' bytes fully accepted
/// before it.
pub(crate) async fn write_chunked<W>(
    stream: &mut W,
    bytes: &[u8],
    chunk: usize,
) -> Result<usize, WriteError>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut written = 0;
    for part in bytes.chunks(chunk.max(1)) {
        stream
            .write_all(part)
            .await
            .map_err(|e| WriteError::from_io(e, written))?;
        written += part.len();
    }
    Ok(written)
}

struct Connection {
    stream: TcpStream,
    peer_addr: Option<SocketAddr>,
    slot: SocketSlot,
}

/// TCP client bound to one chip profile.
pub struct SocketClient<P: ChipProfile> {
    config: ClientConfig,
    conn: Option<Connection>,
    _profile: PhantomData<fn() -> P>,
}

impl<P: ChipProfile> SocketClient<P> {
    /// Creates a disconnected client.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            conn: None,
            _profile: PhantomData,
        }
    }

    /// Returns the client configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the chip name.
    #[must_use]
    pub fn chip(&self) -> &'static str {
        P::CHIP
    }

    /// Returns the peer address while connected.
    #[must_use]
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.conn.as_ref().and_then(|c| c.peer_addr)
    }

    /// Bytes handed to the socket per write.
    #[must_use]
    pub fn tx_chunk(&self) -> usize {
        self.config.effective_tx(P::TX_BUFFER)
    }

    /// Largest single read.
    #[must_use]
    pub fn rx_chunk(&self) -> usize {
        self.config.effective_rx(P::RX_BUFFER)
    }

    fn drop_connection(&mut self, reason: &str) {
        if let Some(conn) = self.conn.take() {
            tracing::debug!(chip = P::CHIP, peer = ?conn.peer_addr, "connection dropped: {}", reason);
        }
    }
}

impl<P: ChipProfile> Default for SocketClient<P> {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}

impl<P: ChipProfile> std::fmt::Debug for SocketClient<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SocketClient")
            .field("chip", &P::CHIP)
            .field("config", &self.config)
            .field("peer_addr", &self.peer_addr())
            .finish()
    }
}

#[async_trait]
impl<P: ChipProfile> NetClient for SocketClient<P> {
    async fn connect(&mut self, host: &str, port: u16) -> Result<Connected, ConnectError> {
        if self.conn.is_some() {
            return Err(ConnectError::AlreadyConnected);
        }
        validate_target(host, port)?;

        let slot = P::sockets().try_acquire(P::MAX_SOCKETS).ok_or(
            ConnectError::NoSocketAvailable {
                chip: P::CHIP,
                max: P::MAX_SOCKETS,
            },
        )?;

        let addrs: Vec<SocketAddr> = tokio::net::lookup_host((host, port))
            .await
            .map_err(|e| ConnectError::resolve(host, e))?
            .collect();
        if addrs.is_empty() {
            return Err(ConnectError::resolve(
                host,
                io::Error::new(io::ErrorKind::NotFound, "no addresses found"),
            ));
        }

        let stream = TcpStream::connect(&addrs[..]).await.map_err(|e| {
            tracing::warn!(chip = P::CHIP, host, port, "connect failed: {}", e);
            ConnectError::Io(e)
        })?;
        P::configure(&stream, &self.config)?;

        let peer_addr = stream.peer_addr().ok();
        tracing::debug!(chip = P::CHIP, host, port, peer = ?peer_addr, "connected");

        self.conn = Some(Connection {
            stream,
            peer_addr,
            slot,
        });

        Ok(Connected {
            host: host.to_string(),
            port,
            peer_addr,
        })
    }

    async fn write(&mut self, bytes: &[u8]) -> Result<usize, WriteError> {
        let chunk = self.tx_chunk();
        let conn = self.conn.as_mut().ok_or(WriteError::NotConnected)?;

        match write_chunked(&mut conn.stream, bytes, chunk).await {
            Ok(written) => {
                tracing::trace!(chip = P::CHIP, bytes = written, "write");
                Ok(written)
            }
            Err(err) => {
                self.drop_connection("write failed");
                Err(err)
            }
        }
    }

    async fn read(&mut self, buffer: &mut [u8]) -> Result<usize, ReadError> {
        let limit = self.rx_chunk().min(buffer.len());
        let conn = self.conn.as_mut().ok_or(ReadError::NotConnected)?;
        if limit == 0 {
            return Ok(0);
        }

        let result = conn.stream.read(&mut buffer[..limit]).await;
        match result {
            Ok(0) => {
                self.drop_connection("closed by peer");
                Ok(0)
            }
            Ok(n) => {
                tracing::trace!(chip = P::CHIP, bytes = n, "read");
                Ok(n)
            }
            Err(e) => {
                self.drop_connection("read failed");
                Err(ReadError::Io(e))
            }
        }
    }

    async fn close(&mut self) {
        if let Some(mut conn) = self.conn.take() {
            if let Err(e) = conn.stream.shutdown().await {
                tracing::debug!(chip = P::CHIP, "shutdown failed: {}", e);
            }
            tracing::debug!(chip = P::CHIP, peer = ?conn.peer_addr, "closed");
        }
    }

    fn is_connected(&self) -> bool {
        self.conn.is_some()
    }
}

impl<P: ChipProfile> SplitClient for SocketClient<P> {
    type Reader = SocketReader<P>;
    type Writer = SocketWriter<P>;

    fn split(&mut self) -> Option<(SocketReader<P>, SocketWriter<P>)> {
        let rx_chunk = self.rx_chunk();
        let tx_chunk = self.tx_chunk();
        let conn = self.conn.take()?;
        let (read_half, write_half) = conn.stream.into_split();
        let slot = Arc::new(conn.slot);

        tracing::trace!(chip = P::CHIP, peer = ?conn.peer_addr, "split");
        Some((
            SocketReader {
                half: read_half,
                rx_chunk,
                _slot: Arc::clone(&slot),
                _profile: PhantomData,
            },
            SocketWriter {
                half: write_half,
                tx_chunk,
                _slot: slot,
                _profile: PhantomData,
            },
        ))
    }
}

/// Read half of a split [`SocketClient`] connection.
pub struct SocketReader<P: ChipProfile> {
    half: OwnedReadHalf,
    rx_chunk: usize,
    _slot: Arc<SocketSlot>,
    _profile: PhantomData<fn() -> P>,
}

#[async_trait]
impl<P: ChipProfile> NetReader for SocketReader<P> {
    async fn read(&mut self, buffer: &mut [u8]) -> Result<usize, ReadError> {
        let limit = self.rx_chunk.min(buffer.len());
        if limit == 0 {
            return Ok(0);
        }

        let n = self.half.read(&mut buffer[..limit]).await?;
        tracing::trace!(chip = P::CHIP, bytes = n, "read");
        Ok(n)
    }
}

/// Write half of a split [`SocketClient`] connection.
pub struct SocketWriter<P: ChipProfile> {
    half: OwnedWriteHalf,
    tx_chunk: usize,
    _slot: Arc<SocketSlot>,
    _profile: PhantomData<fn() -> P>,
}

#[async_trait]
impl<P: ChipProfile> NetWriter for SocketWriter<P> {
    async fn write(&mut self, bytes: &[u8]) -> Result<usize, WriteError> {
        let written = write_chunked(&mut self.half, bytes, self.tx_chunk).await?;
        tracing::trace!(chip = P::CHIP, bytes = written, "write");
        Ok(written)
    }

    async fn close(&mut self) {
        if let Err(e) = self.half.shutdown().await {
            tracing::debug!(chip = P::CHIP, "shutdown failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use socket2::SockRef;
    use std::time::Duration;
    use tokio::net::TcpListener;

    struct Roomy;

    impl ChipProfile for Roomy {
        const BACKEND: Backend = Backend::Ethernet;
        const CHIP: &'static str = "roomy";
        const MAX_SOCKETS: usize = 64;
        const TX_BUFFER: usize = 4;
        const RX_BUFFER: usize = 8;

        fn sockets() -> &'static SocketPool {
            static POOL: SocketPool = SocketPool::new();
            &POOL
        }
    }

    struct Single;

    impl ChipProfile for Single {
        const BACKEND: Backend = Backend::Ethernet;
        const CHIP: &'static str = "single";
        const MAX_SOCKETS: usize = 1;
        const TX_BUFFER: usize = 2048;
        const RX_BUFFER: usize = 2048;

        fn sockets() -> &'static SocketPool {
            static POOL: SocketPool = SocketPool::new();
            &POOL
        }
    }

    struct Halved;

    impl ChipProfile for Halved {
        const BACKEND: Backend = Backend::Ethernet;
        const CHIP: &'static str = "halved";
        const MAX_SOCKETS: usize = 1;
        const TX_BUFFER: usize = 2;
        const RX_BUFFER: usize = 2;

        fn sockets() -> &'static SocketPool {
            static POOL: SocketPool = SocketPool::new();
            &POOL
        }
    }

    async fn listener() -> (TcpListener, u16) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        (listener, port)
    }

    /// Accepts one connection and aborts it with an RST.
    async fn reset_after_accept(listener: TcpListener) {
        let (stream, _) = listener.accept().await.unwrap();
        SockRef::from(&stream)
            .set_linger(Some(Duration::ZERO))
            .unwrap();
        drop(stream);
    }

    #[test]
    fn test_socket_pool_limit() {
        static POOL: SocketPool = SocketPool::new();

        let a = POOL.try_acquire(2).unwrap();
        let b = POOL.try_acquire(2).unwrap();
        assert!(POOL.try_acquire(2).is_none());
        assert_eq!(POOL.in_use(), 2);

        drop(a);
        assert_eq!(POOL.in_use(), 1);
        let _c = POOL.try_acquire(2).unwrap();
        drop(b);
        assert_eq!(POOL.in_use(), 1);
    }

    #[tokio::test]
    async fn test_not_connected() {
        let mut client = SocketClient::<Roomy>::default();
        let mut buf = [0u8; 4];

        assert!(!client.is_connected());
        assert!(matches!(client.write(b"x").await, Err(WriteError::NotConnected)));
        assert!(matches!(client.read(&mut buf).await, Err(ReadError::NotConnected)));

        client.close().await;
        assert!(!client.is_connected());
    }

    #[tokio::test]
    async fn test_connect_write_read() {
        let (listener, port) = listener().await;
        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 10];
            stream.read_exact(&mut buf).await.unwrap();
            stream.write_all(&buf).await.unwrap();
        });

        let mut client = SocketClient::<Roomy>::default();
        let connected = client.connect("127.0.0.1", port).await.unwrap();
        assert_eq!(connected.port, port);
        assert_eq!(connected.peer_addr, client.peer_addr());
        assert!(client.is_connected());

        // 10 bytes through a 4 byte TX buffer
        assert_eq!(client.write(b"0123456789").await.unwrap(), 10);

        let mut echoed = Vec::new();
        let mut buf = [0u8; 64];
        while echoed.len() < 10 {
            let n = client.read(&mut buf).await.unwrap();
            assert!(n > 0 && n <= Roomy::RX_BUFFER);
            echoed.extend_from_slice(&buf[..n]);
        }
        assert_eq!(&echoed[..], b"0123456789");

        server.await.unwrap();
        client.close().await;
        assert!(!client.is_connected());
    }

    #[tokio::test]
    async fn test_already_connected() {
        let (listener, port) = listener().await;
        let _server = tokio::spawn(async move {
            let _conn = listener.accept().await.unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(200)).await;
        });

        let mut client = SocketClient::<Roomy>::default();
        client.connect("127.0.0.1", port).await.unwrap();
        assert!(matches!(
            client.connect("127.0.0.1", port).await,
            Err(ConnectError::AlreadyConnected)
        ));
    }

    #[tokio::test]
    async fn test_socket_limit_and_release() {
        let (listener, port) = listener().await;
        let _server = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((stream, _)) = listener.accept().await {
                held.push(stream);
            }
        });

        let mut first = SocketClient::<Single>::default();
        let mut second = SocketClient::<Single>::default();

        first.connect("127.0.0.1", port).await.unwrap();
        let err = second.connect("127.0.0.1", port).await.unwrap_err();
        assert!(matches!(
            err,
            ConnectError::NoSocketAvailable {
                chip: "single",
                max: 1
            }
        ));
        assert!(!second.is_connected());

        first.close().await;
        assert_eq!(Single::sockets().in_use(), 0);
        second.connect("127.0.0.1", port).await.unwrap();

        drop(second);
        assert_eq!(Single::sockets().in_use(), 0);
    }

    #[tokio::test]
    async fn test_peer_close_disconnects() {
        let (listener, port) = listener().await;
        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            drop(stream);
        });

        let mut client = SocketClient::<Roomy>::default();
        client.connect("127.0.0.1", port).await.unwrap();
        server.await.unwrap();

        let mut buf = [0u8; 8];
        assert_eq!(client.read(&mut buf).await.unwrap(), 0);
        assert!(!client.is_connected());
    }

    #[tokio::test]
    async fn test_refused() {
        let (listener, port) = listener().await;
        drop(listener);

        let mut client = SocketClient::<Roomy>::default();
        let err = client.connect("127.0.0.1", port).await.unwrap_err();
        assert!(err.is_refused());
        assert!(!client.is_connected());
    }

    #[tokio::test]
    async fn test_invalid_host() {
        let mut client = SocketClient::<Roomy>::default();
        assert!(matches!(
            client.connect("", 3306).await,
            Err(ConnectError::InvalidHost { .. })
        ));
        assert!(matches!(
            client.connect("127.0.0.1", 0).await,
            Err(ConnectError::InvalidHost { .. })
        ));
    }

    #[tokio::test]
    async fn test_empty_write_and_read() {
        let (listener, port) = listener().await;
        let _server = tokio::spawn(async move {
            let _conn = listener.accept().await.unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(200)).await;
        });

        let mut client = SocketClient::<Roomy>::default();
        client.connect("127.0.0.1", port).await.unwrap();
        assert_eq!(client.write(&[]).await.unwrap(), 0);
        assert_eq!(client.read(&mut []).await.unwrap(), 0);
        assert!(client.is_connected());
    }

    #[test]
    fn test_chunks_follow_config() {
        let client = SocketClient::<Single>::new(ClientConfig::new().tx_chunk(100).rx_chunk(1 << 20));
        assert_eq!(client.tx_chunk(), 100);
        assert_eq!(client.rx_chunk(), 2048);
        assert_eq!(client.chip(), "single");
    }

    #[tokio::test]
    async fn test_read_after_reset_disconnects() {
        let (listener, port) = listener().await;
        let server = tokio::spawn(reset_after_accept(listener));

        let mut client = SocketClient::<Roomy>::default();
        client.connect("127.0.0.1", port).await.unwrap();
        server.await.unwrap();

        let mut buf = [0u8; 8];
        assert!(matches!(client.read(&mut buf).await, Err(ReadError::Io(_))));
        assert!(!client.is_connected());
        assert!(matches!(client.read(&mut buf).await, Err(ReadError::NotConnected)));
    }

    #[tokio::test]
    async fn test_write_after_reset_disconnects() {
        let (listener, port) = listener().await;
        let server = tokio::spawn(reset_after_accept(listener));

        let mut client = SocketClient::<Roomy>::default();
        client.connect("127.0.0.1", port).await.unwrap();
        server.await.unwrap();

        // the first writes may land before the RST arrives
        let mut failure = None;
        for _ in 0..100 {
            match client.write(b"ping").await {
                Ok(_) => tokio::time::sleep(Duration::from_millis(10)).await,
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }

        assert!(matches!(failure, Some(WriteError::Closed { .. })));
        assert!(!client.is_connected());
        assert!(matches!(client.write(b"ping").await, Err(WriteError::NotConnected)));
    }

    #[tokio::test]
    async fn test_split_halves_share_slot() {
        let (listener, port) = listener().await;
        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4];
            stream.read_exact(&mut buf).await.unwrap();
            stream.write_all(&buf).await.unwrap();
        });

        let mut client = SocketClient::<Halved>::default();
        assert!(client.split().is_none());
        client.connect("127.0.0.1", port).await.unwrap();

        let (mut reader, mut writer) = client.split().unwrap();
        assert!(!client.is_connected());
        assert_eq!(Halved::sockets().in_use(), 1);

        assert_eq!(writer.write(b"ping").await.unwrap(), 4);
        let mut buf = [0u8; 4];
        let mut got = 0;
        while got < 4 {
            got += reader.read(&mut buf[got..]).await.unwrap();
        }
        assert_eq!(&buf, b"ping");
        server.await.unwrap();

        writer.close().await;
        drop(writer);
        assert_eq!(Halved::sockets().in_use(), 1);
        drop(reader);
        assert_eq!(Halved::sockets().in_use(), 0);
    }
}
