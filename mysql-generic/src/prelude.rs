//! Prelude module for convenient imports.
//!
//! ```ignore
//! use mysql_generic::prelude::*;
//! ```

// Capability set
pub use mysql_generic_transport::{Connected, NetClient, SharedClient};

// Errors
pub use mysql_generic_transport::{
    ConnectError, ReadError, TransportError, WriteError,
};

// Selection and factory
pub use mysql_generic_transport::selected::{
    EthernetClient, SELECTED, boxed_client, new_client, new_client_with,
};
pub use mysql_generic_transport::{Backend, ClientConfig, Origin};
