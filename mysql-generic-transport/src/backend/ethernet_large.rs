//! W5500 through `EthernetLarge`, which trades socket count for buffers.

use crate::selection::Backend;
use crate::socket::{ChipProfile, SocketClient, SocketPool};

/// Backend implemented by this module.
pub const BACKEND: Backend = Backend::EthernetLarge;

/// Driver library name.
pub const LIBRARY: &str = BACKEND.library();

/// W5500 with its 16 KiB TX/RX memory split over two sockets.
pub struct W5500Large;

impl ChipProfile for W5500Large {
    const BACKEND: Backend = BACKEND;
    const CHIP: &'static str = "W5500";
    const MAX_SOCKETS: usize = 2;
    const TX_BUFFER: usize = 8 * 1024;
    const RX_BUFFER: usize = 8 * 1024;

    fn sockets() -> &'static SocketPool {
        static SOCKETS: SocketPool = SocketPool::new();
        &SOCKETS
    }
}

/// The client handle for this backend.
pub type EthernetClient = SocketClient<W5500Large>;
