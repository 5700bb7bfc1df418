//! # mysql-generic transport
//!
//! Network transport for the mysql-generic MySQL/MariaDB client.
//!
//! Exactly one Ethernet backend is compiled in, chosen by cargo feature in
//! priority order (`ethernet`, `ethernet-large`, `ethernet2`, `ethernet3`,
//! `ethernet-esp8266`, `ethernet-lan8742a`, `custom-ethernet`). With none
//! enabled the build falls back to `ethernet` and prints a warning.
//!
//! This crate provides:
//! - [`NetClient`] - the capability set protocol code is written against
//! - [`selected`] - the chosen backend and the factory for its
//!   [`EthernetClient`]
//! - [`selection`] - the selection algorithm shared with `build.rs`
//! - [`socket`] - the TCP client the chip backends are built on
//! - [`SharedClient`] - a handle for use from several tasks, built on
//!   [`SplitClient`]
//! - `loopback` - an in-memory transport for tests (feature `loopback`)
//!
//! ```ignore
//! use mysql_generic_transport::{NetClient, selected};
//!
//! let mut client = selected::new_client();
//! client.connect("192.168.2.112", 3306).await?;
//! client.write(&packet).await?;
//! ```

pub mod backend;
pub mod client;
pub mod error;
#[cfg(any(test, feature = "loopback"))]
pub mod loopback;
pub mod selected;
pub mod selection;
pub mod shared;
pub mod socket;

pub use backend::EthernetClient;
pub use client::{ClientConfig, Connected, NetClient, NetReader, NetWriter, SplitClient};
pub use error::{ConnectError, ReadError, TransportError, WriteError};
pub use selection::{Backend, Origin, Selection};
pub use shared::SharedClient;
