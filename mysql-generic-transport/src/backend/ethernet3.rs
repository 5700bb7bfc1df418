//! W5500 through the `Ethernet3` library.
//!
//! `Ethernet3` lets the sketch split the chip memory over fewer sockets.
//! The four socket split gives each socket 4 KiB.

use crate::selection::Backend;
use crate::socket::{ChipProfile, SocketClient, SocketPool};

/// Backend implemented by this module.
pub const BACKEND: Backend = Backend::Ethernet3;

/// Driver library name.
pub const LIBRARY: &str = BACKEND.library();

/// W5500 configured for four sockets.
pub struct W5500Split;

impl ChipProfile for W5500Split {
    const BACKEND: Backend = BACKEND;
    const CHIP: &'static str = "W5500";
    const MAX_SOCKETS: usize = 4;
    const TX_BUFFER: usize = 4 * 1024;
    const RX_BUFFER: usize = 4 * 1024;

    fn sockets() -> &'static SocketPool {
        static SOCKETS: SocketPool = SocketPool::new();
        &SOCKETS
    }
}

/// The client handle for this backend.
pub type EthernetClient = SocketClient<W5500Split>;
