//! STM32 on-chip Ethernet MAC with a LAN8742A PHY.
//!
//! The board runs LwIP. Its TCP settings (keepalive, socket buffers of four
//! segments) are applied to the host socket through `socket2`.

use crate::client::ClientConfig;
use crate::selection::Backend;
use crate::socket::{ChipProfile, SocketClient, SocketPool};
use socket2::{SockRef, TcpKeepalive};
use std::io;
use std::time::Duration;
use tokio::net::TcpStream;

/// Backend implemented by this module.
pub const BACKEND: Backend = Backend::EthernetLan8742a;

/// Driver library name.
pub const LIBRARY: &str = BACKEND.library();

const TCP_MSS: usize = 1460;

/// LwIP keepalive idle time.
const KEEPALIVE_IDLE: Duration = Duration::from_secs(7200);

/// STM32 + LAN8742A under LwIP.
pub struct Lan8742a;

impl ChipProfile for Lan8742a {
    const BACKEND: Backend = BACKEND;
    const CHIP: &'static str = "LAN8742A";
    const MAX_SOCKETS: usize = 5;
    const TX_BUFFER: usize = 4 * TCP_MSS;
    const RX_BUFFER: usize = 4 * TCP_MSS;

    fn sockets() -> &'static SocketPool {
        static SOCKETS: SocketPool = SocketPool::new();
        &SOCKETS
    }

    fn configure(stream: &TcpStream, config: &ClientConfig) -> io::Result<()> {
        stream.set_nodelay(config.tcp_nodelay)?;

        let socket = SockRef::from(stream);
        socket.set_tcp_keepalive(&TcpKeepalive::new().with_time(KEEPALIVE_IDLE))?;
        socket.set_send_buffer_size(config.effective_tx(Self::TX_BUFFER))?;
        socket.set_recv_buffer_size(config.effective_rx(Self::RX_BUFFER))?;
        Ok(())
    }
}

/// The client handle for this backend.
pub type EthernetClient = SocketClient<Lan8742a>;
