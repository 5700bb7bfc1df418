//! Client handle for multi-task use.

use crate::client::{Connected, NetClient, NetReader, NetWriter, SplitClient};
use crate::error::{ConnectError, ReadError, WriteError};
use async_trait::async_trait;
use std::io;
use std::sync::Arc;
use tokio::sync::{Mutex, watch};

/// Cloneable handle to one client.
///
/// Once connected, the connection is split into a read half and a write
/// half, each behind its own lock. A task waiting in `read` does not hold
/// up writers, and concurrent writers never interleave within a single
/// `write`. `close` wakes tasks waiting in `read` or `write`, which then
/// fail with `NotConnected`.
pub struct SharedClient<C: SplitClient> {
    inner: Arc<Inner<C>>,
}

struct Inner<C: SplitClient> {
    // held across connect and close
    client: Mutex<C>,
    reader: Mutex<Option<C::Reader>>,
    writer: Mutex<Option<C::Writer>>,
    connected: watch::Sender<bool>,
}

impl<C: SplitClient> SharedClient<C> {
    /// Wraps a client. An open connection is taken over as is.
    #[must_use]
    pub fn new(mut client: C) -> Self {
        let (reader, writer) = client.split().unzip();
        let connected = reader.is_some();
        Self {
            inner: Arc::new(Inner {
                client: Mutex::new(client),
                reader: Mutex::new(reader),
                writer: Mutex::new(writer),
                connected: watch::Sender::new(connected),
            }),
        }
    }

    /// Returns the number of handles to this client.
    #[must_use]
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    fn mark_disconnected(&self) {
        self.inner.connected.send_replace(false);
    }

    async fn closed(&self) {
        let mut state = self.inner.connected.subscribe();
        // the sender lives in `inner`, so this only returns once closed
        if state.wait_for(|open| !*open).await.is_err() {
            tracing::trace!("connection state dropped");
        }
    }
}

impl<C: SplitClient> Clone for SharedClient<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[async_trait]
impl<C: SplitClient> NetClient for SharedClient<C> {
    async fn connect(&mut self, host: &str, port: u16) -> Result<Connected, ConnectError> {
        let mut client = self.inner.client.lock().await;
        if self.is_connected() {
            return Err(ConnectError::AlreadyConnected);
        }

        let connected = client.connect(host, port).await?;
        let (reader, writer) = client.split().ok_or_else(|| {
            ConnectError::Io(io::Error::new(
                io::ErrorKind::NotConnected,
                "connection lost before it could be shared",
            ))
        })?;

        // both halves in place before the state flips
        let mut writer_slot = self.inner.writer.lock().await;
        let mut reader_slot = self.inner.reader.lock().await;
        *writer_slot = Some(writer);
        *reader_slot = Some(reader);
        self.inner.connected.send_replace(true);

        Ok(connected)
    }

    async fn write(&mut self, bytes: &[u8]) -> Result<usize, WriteError> {
        let mut slot = self.inner.writer.lock().await;
        if !self.is_connected() {
            *slot = None;
        }
        let writer = slot.as_mut().ok_or(WriteError::NotConnected)?;

        let result = tokio::select! {
            biased;
            () = self.closed() => Err(WriteError::NotConnected),
            result = writer.write(bytes) => result,
        };
        if result.is_err() {
            *slot = None;
            self.mark_disconnected();
        }
        result
    }

    async fn read(&mut self, buffer: &mut [u8]) -> Result<usize, ReadError> {
        let mut slot = self.inner.reader.lock().await;
        let reader = slot.as_mut().ok_or(ReadError::NotConnected)?;

        let result = tokio::select! {
            biased;
            () = self.closed() => Err(ReadError::NotConnected),
            result = reader.read(buffer) => result,
        };

        match result {
            Ok(n) if n > 0 || buffer.is_empty() => {}
            _ => {
                *slot = None;
                self.mark_disconnected();
            }
        }
        result
    }

    async fn close(&mut self) {
        let mut client = self.inner.client.lock().await;
        self.mark_disconnected();

        if let Some(mut writer) = self.inner.writer.lock().await.take() {
            writer.close().await;
        }
        self.inner.reader.lock().await.take();
        client.close().await;
    }

    fn is_connected(&self) -> bool {
        *self.inner.connected.borrow()
    }
}
