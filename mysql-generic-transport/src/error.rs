//! Error types for transport operations.

use thiserror::Error;

/// Error returned by [`NetClient::connect`](crate::NetClient::connect).
#[derive(Debug, Error)]
pub enum ConnectError {
    /// The client already holds a connection.
    #[error("already connected")]
    AlreadyConnected,

    /// Every hardware socket of the chip is in use.
    #[error("no free socket: all {max} sockets of {chip} are in use")]
    NoSocketAvailable {
        /// Chip the client runs on.
        chip: &'static str,
        /// Number of sockets the chip provides.
        max: usize,
    },

    /// Host or port cannot be used.
    #[error("invalid host: {message}")]
    InvalidHost {
        /// Error message.
        message: String,
    },

    /// Host name lookup failed.
    #[error("failed to resolve {host}: {source}")]
    Resolve {
        /// Host that was looked up.
        host: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// IO error, including a refused connection.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConnectError {
    /// Creates an invalid host error.
    pub fn invalid_host(message: impl Into<String>) -> Self {
        Self::InvalidHost {
            message: message.into(),
        }
    }

    /// Creates a resolve error.
    pub fn resolve(host: impl Into<String>, source: std::io::Error) -> Self {
        Self::Resolve {
            host: host.into(),
            source,
        }
    }

    /// Returns true if the peer actively refused the connection.
    #[must_use]
    pub fn is_refused(&self) -> bool {
        matches!(self, Self::Io(e) if e.kind() == std::io::ErrorKind::ConnectionRefused)
    }
}

/// Error returned by [`NetClient::write`](crate::NetClient::write).
#[derive(Debug, Error)]
pub enum WriteError {
    /// No connection is open.
    #[error("not connected")]
    NotConnected,

    /// The peer stopped accepting data.
    #[error("connection closed after {written} bytes")]
    Closed {
        /// Bytes written before the connection closed.
        written: usize,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WriteError {
    /// Classifies an IO error raised after `written` bytes went out.
    ///
    /// Errors meaning the peer is gone become [`WriteError::Closed`].
    #[must_use]
    pub fn from_io(err: std::io::Error, written: usize) -> Self {
        use std::io::ErrorKind;

        match err.kind() {
            ErrorKind::BrokenPipe | ErrorKind::ConnectionReset | ErrorKind::WriteZero => {
                Self::Closed { written }
            }
            _ => Self::Io(err),
        }
    }
}

/// Error returned by [`NetClient::read`](crate::NetClient::read).
#[derive(Debug, Error)]
pub enum ReadError {
    /// No connection is open.
    #[error("not connected")]
    NotConnected,

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Any transport error, for callers that propagate with `?`.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connect failed.
    #[error("connect failed: {0}")]
    Connect(#[from] ConnectError),

    /// Write failed.
    #[error("write failed: {0}")]
    Write(#[from] WriteError),

    /// Read failed.
    #[error("read failed: {0}")]
    Read(#[from] ReadError),
}

impl TransportError {
    /// Returns true if the error means there is no usable connection.
    #[must_use]
    pub fn is_disconnected(&self) -> bool {
        matches!(
            self,
            Self::Write(WriteError::NotConnected | WriteError::Closed { .. })
                | Self::Read(ReadError::NotConnected)
        )
    }
}
