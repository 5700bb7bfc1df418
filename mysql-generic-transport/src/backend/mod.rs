//! Transport backends.
//!
//! `build.rs` sets `mysql_generic_backend` to exactly one value, so exactly
//! one module below is compiled. Each exports the same names:
//! `EthernetClient`, `BACKEND` and `LIBRARY`.

#[cfg(not(any(
    mysql_generic_backend = "ethernet",
    mysql_generic_backend = "ethernet_large",
    mysql_generic_backend = "ethernet2",
    mysql_generic_backend = "ethernet3",
    mysql_generic_backend = "ethernet_esp8266",
    mysql_generic_backend = "ethernet_lan8742a",
    mysql_generic_backend = "custom"
)))]
compile_error!("no transport backend configured: mysql_generic_backend must be set by build.rs");

#[cfg(mysql_generic_backend = "ethernet")]
pub mod w5x00;
#[cfg(mysql_generic_backend = "ethernet")]
pub use w5x00::{BACKEND, EthernetClient, LIBRARY};

#[cfg(mysql_generic_backend = "ethernet_large")]
pub mod ethernet_large;
#[cfg(mysql_generic_backend = "ethernet_large")]
pub use ethernet_large::{BACKEND, EthernetClient, LIBRARY};

#[cfg(mysql_generic_backend = "ethernet2")]
pub mod ethernet2;
#[cfg(mysql_generic_backend = "ethernet2")]
pub use ethernet2::{BACKEND, EthernetClient, LIBRARY};

#[cfg(mysql_generic_backend = "ethernet3")]
pub mod ethernet3;
#[cfg(mysql_generic_backend = "ethernet3")]
pub use ethernet3::{BACKEND, EthernetClient, LIBRARY};

#[cfg(mysql_generic_backend = "ethernet_esp8266")]
pub mod esp8266;
#[cfg(mysql_generic_backend = "ethernet_esp8266")]
pub use esp8266::{BACKEND, EthernetClient, LIBRARY};

#[cfg(mysql_generic_backend = "ethernet_lan8742a")]
pub mod lan8742a;
#[cfg(mysql_generic_backend = "ethernet_lan8742a")]
pub use lan8742a::{BACKEND, EthernetClient, LIBRARY};

#[cfg(mysql_generic_backend = "custom")]
pub mod custom;
#[cfg(mysql_generic_backend = "custom")]
pub use custom::{BACKEND, EthernetClient, LIBRARY};
