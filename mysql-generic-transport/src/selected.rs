//! The backend chosen for this build and the factory for its client.
//!
//! Protocol code receives the client from [`new_client`] (or
//! [`boxed_client`]) and holds it as a `NetClient`. It never names a
//! backend type and needs no `cfg` of its own.

use crate::backend;
use crate::client::{ClientConfig, NetClient};
use crate::selection::{Backend, Origin, Selection};

pub use crate::backend::{EthernetClient, LIBRARY};

/// Backend compiled into this build.
pub const SELECTED: Backend = backend::BACKEND;

/// Whether [`SELECTED`] was requested or is the fallback.
#[cfg(mysql_generic_fallback)]
pub const ORIGIN: Origin = Origin::Fallback;

/// Whether [`SELECTED`] was requested or is the fallback.
#[cfg(not(mysql_generic_fallback))]
pub const ORIGIN: Origin = Origin::Explicit;

// Set by build.rs under `selection::SHADOWED_ENV`.
const SHADOWED: &str = env!("MYSQL_GENERIC_SHADOWED");

/// Returns the selection made when this crate was built.
#[must_use]
pub fn selection() -> Selection {
    Selection {
        backend: SELECTED,
        origin: ORIGIN,
        shadowed: SHADOWED
            .split(',')
            .filter_map(Backend::from_feature)
            .collect(),
    }
}

/// Returns the diagnostics printed when this crate was built.
#[must_use]
pub fn selection_report() -> Vec<String> {
    selection().diagnostics()
}

/// Creates a client for the selected backend with default settings.
#[must_use]
pub fn new_client() -> EthernetClient {
    new_client_with(ClientConfig::default())
}

/// Creates a client for the selected backend.
#[must_use]
pub fn new_client_with(config: ClientConfig) -> EthernetClient {
    tracing::info!(
        backend = %SELECTED,
        library = LIBRARY,
        fallback = ORIGIN == Origin::Fallback,
        "creating transport client"
    );
    EthernetClient::new(config)
}

/// Creates a client for the selected backend behind `dyn NetClient`.
#[must_use]
pub fn boxed_client() -> Box<dyn NetClient> {
    Box::new(new_client())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn feature_enabled(backend: Backend) -> bool {
        match backend {
            Backend::Ethernet => cfg!(feature = "ethernet"),
            Backend::EthernetLarge => cfg!(feature = "ethernet-large"),
            Backend::Ethernet2 => cfg!(feature = "ethernet2"),
            Backend::Ethernet3 => cfg!(feature = "ethernet3"),
            Backend::EthernetEsp8266 => cfg!(feature = "ethernet-esp8266"),
            Backend::EthernetLan8742a => cfg!(feature = "ethernet-lan8742a"),
            Backend::Custom => cfg!(feature = "custom-ethernet"),
        }
    }

    fn module_of(backend: Backend) -> &'static str {
        match backend {
            Backend::Ethernet => "backend::w5x00",
            Backend::EthernetLarge => "backend::ethernet_large",
            Backend::Ethernet2 => "backend::ethernet2",
            Backend::Ethernet3 => "backend::ethernet3",
            Backend::EthernetEsp8266 => "backend::esp8266",
            Backend::EthernetLan8742a => "backend::lan8742a",
            Backend::Custom => "backend::custom",
        }
    }

    #[test]
    fn test_selection_matches_enabled_features() {
        assert_eq!(selection(), Selection::resolve(feature_enabled));
    }

    #[test]
    fn test_only_selected_backend_compiled() {
        let type_name = std::any::type_name::<EthernetClient>();
        for backend in Backend::PRIORITY {
            assert_eq!(
                type_name.contains(module_of(backend)),
                backend == SELECTED,
                "{type_name} vs {backend:?}"
            );
        }
    }

    #[test]
    fn test_report_names_library() {
        let report = selection_report();
        assert!(report.contains(&format!("Use {} lib", SELECTED.library())));

        let noisy = ORIGIN == Origin::Fallback
            || SELECTED == Backend::Custom
            || !selection().shadowed.is_empty();
        assert_eq!(report.len() > 1, noisy);
    }

    #[test]
    fn test_library_matches_selected_backend() {
        if SELECTED != Backend::Custom {
            assert_eq!(LIBRARY, SELECTED.library());
        }
    }

    #[test]
    fn test_new_client_starts_disconnected() {
        assert!(!new_client().is_connected());
        assert!(!boxed_client().is_connected());
    }

    #[tokio::test]
    async fn test_boxed_client_round_trip() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4];
            stream.read_exact(&mut buf).await.unwrap();
            stream.write_all(b"pong").await.unwrap();
        });

        let mut client = boxed_client();
        client.connect("127.0.0.1", port).await.unwrap();
        assert_eq!(client.write(b"ping").await.unwrap(), 4);

        let mut buf = [0u8; 4];
        let mut got = 0;
        while got < 4 {
            let n = client.read(&mut buf[got..]).await.unwrap();
            assert!(n > 0);
            got += n;
        }
        assert_eq!(&buf, b"pong");

        client.close().await;
        assert!(!client.is_connected());
        server.await.unwrap();
    }
}
