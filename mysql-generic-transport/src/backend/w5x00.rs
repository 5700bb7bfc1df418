//! WIZnet W5100/W5200/W5500 through the `Ethernet` library.
//!
//! Sized for the W5100, the smallest chip the library drives: four sockets
//! sharing 8 KiB of TX and 8 KiB of RX memory.

use crate::selection::Backend;
use crate::socket::{ChipProfile, SocketClient, SocketPool};

/// Backend implemented by this module.
pub const BACKEND: Backend = Backend::Ethernet;

/// Driver library name.
pub const LIBRARY: &str = BACKEND.library();

/// W5x00 chip family.
pub struct W5x00;

impl ChipProfile for W5x00 {
    const BACKEND: Backend = BACKEND;
    const CHIP: &'static str = "W5x00";
    const MAX_SOCKETS: usize = 4;
    const TX_BUFFER: usize = 2048;
    const RX_BUFFER: usize = 2048;

    fn sockets() -> &'static SocketPool {
        static SOCKETS: SocketPool = SocketPool::new();
        &SOCKETS
    }
}

/// The client handle for this backend.
pub type EthernetClient = SocketClient<W5x00>;
