//! # mysql-generic
//!
//! Transport plumbing for a MySQL/MariaDB client on boards with WIZnet
//! W5x00, ESP8266 or STM32/LAN8742A Ethernet.
//!
//! The Ethernet backend is picked at build time through cargo features and
//! exposed under one name, [`EthernetClient`]. Protocol code takes the client
//! as an injected [`NetClient`] and never names a backend.
//!
//! ## Quick Start
//!
//! ```ignore
//! use mysql_generic::prelude::*;
//!
//! let mut client = new_client();
//! client.connect("192.168.2.112", 3306).await?;
//! ```
//!
//! ## Backend Features
//!
//! | Feature | Library |
//! |---|---|
//! | `ethernet` (default when none is set) | `Ethernet` (W5100/W5200/W5500) |
//! | `ethernet-large` | `EthernetLarge` |
//! | `ethernet2` | `Ethernet2` |
//! | `ethernet3` | `Ethernet3` |
//! | `ethernet-esp8266` | `Ethernet_ESP8266` |
//! | `ethernet-lan8742a` | `STM32Ethernet` over LwIP |
//! | `custom-ethernet` | file named by `MYSQL_GENERIC_CUSTOM_ETHERNET` |
//!
//! ## Crate Organization
//!
//! - [`transport`] - capability set, backends and selection

pub mod prelude;

/// Network transport layer.
pub mod transport {
    pub use mysql_generic_transport::*;
}

pub use mysql_generic_transport::selected::{boxed_client, new_client, new_client_with};
pub use mysql_generic_transport::{
    Backend, ClientConfig, Connected, EthernetClient, NetClient, SharedClient, TransportError,
};
