//! W5500 through the `Ethernet2` library.

use crate::selection::Backend;
use crate::socket::{ChipProfile, SocketClient, SocketPool};

/// Backend implemented by this module.
pub const BACKEND: Backend = Backend::Ethernet2;

/// Driver library name.
pub const LIBRARY: &str = BACKEND.library();

/// W5500 with the default eight 2 KiB sockets.
pub struct W5500;

impl ChipProfile for W5500 {
    const BACKEND: Backend = BACKEND;
    const CHIP: &'static str = "W5500";
    const MAX_SOCKETS: usize = 8;
    const TX_BUFFER: usize = 2048;
    const RX_BUFFER: usize = 2048;

    fn sockets() -> &'static SocketPool {
        static SOCKETS: SocketPool = SocketPool::new();
        &SOCKETS
    }
}

/// The client handle for this backend.
pub type EthernetClient = SocketClient<W5500>;
