//! ESP8266 native Ethernet over its lwIP stack.

use crate::selection::Backend;
use crate::socket::{ChipProfile, SocketClient, SocketPool};

/// Backend implemented by this module.
pub const BACKEND: Backend = Backend::EthernetEsp8266;

/// Driver library name.
pub const LIBRARY: &str = BACKEND.library();

const TCP_MSS: usize = 1460;

/// ESP8266 lwIP: five TCP PCBs, send buffer of two segments.
pub struct Esp8266;

impl ChipProfile for Esp8266 {
    const BACKEND: Backend = BACKEND;
    const CHIP: &'static str = "ESP8266";
    const MAX_SOCKETS: usize = 5;
    const TX_BUFFER: usize = 2 * TCP_MSS;
    const RX_BUFFER: usize = 2 * TCP_MSS;

    fn sockets() -> &'static SocketPool {
        static SOCKETS: SocketPool = SocketPool::new();
        &SOCKETS
    }
}

/// The client handle for this backend.
pub type EthernetClient = SocketClient<Esp8266>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_esp8266_profile() {
        assert_eq!(Esp8266::TX_BUFFER, 2920);
        assert_eq!(EthernetClient::default().chip(), "ESP8266");
    }
}
