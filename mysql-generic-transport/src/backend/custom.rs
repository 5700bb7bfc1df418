//! User supplied backend.
//!
//! `build.rs` copies the file named by `MYSQL_GENERIC_CUSTOM_ETHERNET` into
//! `OUT_DIR` and it is included here as a module of its own. The file must
//! define:
//!
//! ```ignore
//! pub const LIBRARY: &str = "Ethernet_XYZ";
//!
//! pub struct EthernetClient { /* ... */ }
//!
//! impl EthernetClient {
//!     pub fn new(config: crate::ClientConfig) -> Self { /* ... */ }
//! }
//!
//! #[async_trait::async_trait]
//! impl crate::NetClient for EthernetClient { /* ... */ }
//! ```
//!
//! A chip driven over TCP can reuse [`SocketClient`](crate::socket::SocketClient)
//! by declaring a [`ChipProfile`](crate::socket::ChipProfile) and aliasing
//! `EthernetClient` to `SocketClient<ThatProfile>`. Implementing
//! [`SplitClient`](crate::SplitClient) as well makes the client usable
//! with [`SharedClient`](crate::SharedClient).

use crate::client::NetClient;
use crate::selection::Backend;

mod user {
    include!(concat!(env!("OUT_DIR"), "/custom_ethernet.rs"));
}

pub use user::{EthernetClient, LIBRARY};

/// Backend implemented by this module.
pub const BACKEND: Backend = Backend::Custom;

const _: fn() = || {
    fn implements_net_client<T: NetClient>() {}
    implements_net_client::<EthernetClient>();
};
