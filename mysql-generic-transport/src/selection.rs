//! Backend selection.
//!
//! Maps the set of enabled backend features to exactly one [`Backend`].
//! This file is compiled twice: once as part of the library and once by
//! `build.rs`, which runs the same algorithm on the `CARGO_FEATURE_*`
//! variables and emits the matching `cfg`. It must only depend on `std`.

use std::fmt;
use std::path::{Path, PathBuf};

/// Environment variable naming the source file of a custom backend.
pub const CUSTOM_SOURCE_ENV: &str = "MYSQL_GENERIC_CUSTOM_ETHERNET";

/// Name of the `cfg` key carrying the selected backend.
pub const BACKEND_CFG: &str = "mysql_generic_backend";

/// Name of the `cfg` flag set when no backend was requested.
pub const FALLBACK_CFG: &str = "mysql_generic_fallback";

/// Compile-time variable listing the shadowed backend features.
pub const SHADOWED_ENV: &str = "MYSQL_GENERIC_SHADOWED";

/// A transport backend that can be compiled into the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// WIZnet W5100/W5200/W5500 through the `Ethernet` library.
    Ethernet,
    /// W5500 with enlarged socket buffers (`EthernetLarge`).
    EthernetLarge,
    /// W5500 through the `Ethernet2` library.
    Ethernet2,
    /// W5500 through the `Ethernet3` library.
    Ethernet3,
    /// ESP8266 native lwIP Ethernet.
    EthernetEsp8266,
    /// STM32 on-chip MAC with a LAN8742A PHY over LwIP.
    EthernetLan8742a,
    /// User supplied backend.
    Custom,
}

impl Backend {
    /// Every backend, in selection priority order.
    pub const PRIORITY: [Backend; 7] = [
        Backend::Ethernet,
        Backend::EthernetLarge,
        Backend::Ethernet2,
        Backend::Ethernet3,
        Backend::EthernetEsp8266,
        Backend::EthernetLan8742a,
        Backend::Custom,
    ];

    /// Backend used when nothing was selected.
    pub const DEFAULT: Backend = Backend::Ethernet;

    /// Cargo feature enabling this backend.
    #[must_use]
    pub const fn feature(self) -> &'static str {
        match self {
            Self::Ethernet => "ethernet",
            Self::EthernetLarge => "ethernet-large",
            Self::Ethernet2 => "ethernet2",
            Self::Ethernet3 => "ethernet3",
            Self::EthernetEsp8266 => "ethernet-esp8266",
            Self::EthernetLan8742a => "ethernet-lan8742a",
            Self::Custom => "custom-ethernet",
        }
    }

    /// Build flag name used by the Arduino library this backend replaces.
    #[must_use]
    pub const fn flag(self) -> &'static str {
        match self {
            Self::Ethernet => "USE_ETHERNET",
            Self::EthernetLarge => "USE_ETHERNET_LARGE",
            Self::Ethernet2 => "USE_ETHERNET2",
            Self::Ethernet3 => "USE_ETHERNET3",
            Self::EthernetEsp8266 => "USE_ETHERNET_ESP8266",
            Self::EthernetLan8742a => "USE_ETHERNET_LAN8742A",
            Self::Custom => "USE_CUSTOM_ETHERNET",
        }
    }

    /// Name of the driver library the backend stands for.
    #[must_use]
    pub const fn library(self) -> &'static str {
        match self {
            Self::Ethernet => "Ethernet",
            Self::EthernetLarge => "EthernetLarge",
            Self::Ethernet2 => "Ethernet2",
            Self::Ethernet3 => "Ethernet3",
            Self::EthernetEsp8266 => "Ethernet_ESP8266",
            Self::EthernetLan8742a => "Ethernet_LAN8742A",
            Self::Custom => "Custom Ethernet",
        }
    }

    /// Value of the `mysql_generic_backend` cfg for this backend.
    #[must_use]
    pub const fn cfg_value(self) -> &'static str {
        match self {
            Self::Ethernet => "ethernet",
            Self::EthernetLarge => "ethernet_large",
            Self::Ethernet2 => "ethernet2",
            Self::Ethernet3 => "ethernet3",
            Self::EthernetEsp8266 => "ethernet_esp8266",
            Self::EthernetLan8742a => "ethernet_lan8742a",
            Self::Custom => "custom",
        }
    }

    /// Environment variable Cargo sets for a build script when the
    /// backend feature is enabled.
    #[must_use]
    pub fn cargo_feature_env(self) -> String {
        format!(
            "CARGO_FEATURE_{}",
            self.feature().to_ascii_uppercase().replace('-', "_")
        )
    }

    /// Parses a cargo feature name.
    #[must_use]
    pub fn from_feature(feature: &str) -> Option<Self> {
        Self::PRIORITY.into_iter().find(|b| b.feature() == feature)
    }

    /// Parses a `mysql_generic_backend` cfg value.
    #[must_use]
    pub fn from_cfg_value(value: &str) -> Option<Self> {
        Self::PRIORITY.into_iter().find(|b| b.cfg_value() == value)
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.library())
    }
}

/// How the backend came to be selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// A backend feature was enabled.
    Explicit,
    /// Nothing was enabled and the default backend was used.
    Fallback,
}

/// Outcome of running the selection over a set of enabled features.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// The backend compiled into the client.
    pub backend: Backend,
    /// Whether the backend was requested or defaulted.
    pub origin: Origin,
    /// Enabled backends that lost to a higher priority one.
    pub shadowed: Vec<Backend>,
}

impl Selection {
    /// Runs the selection. The first enabled backend in
    /// [`Backend::PRIORITY`] order wins; with none enabled the result is
    /// [`Backend::DEFAULT`] with [`Origin::Fallback`].
    pub fn resolve(is_enabled: impl Fn(Backend) -> bool) -> Self {
        let mut enabled = Backend::PRIORITY.into_iter().filter(|b| is_enabled(*b));

        match enabled.next() {
            Some(backend) => Self {
                backend,
                origin: Origin::Explicit,
                shadowed: enabled.collect(),
            },
            None => Self {
                backend: Backend::DEFAULT,
                origin: Origin::Fallback,
                shadowed: Vec::new(),
            },
        }
    }

    /// Runs the selection over a list of cargo feature names.
    /// Names that are not backend features are ignored.
    pub fn from_features<'a>(features: impl IntoIterator<Item = &'a str>) -> Self {
        let requested: Vec<Backend> = features
            .into_iter()
            .filter_map(Backend::from_feature)
            .collect();
        Self::resolve(|b| requested.contains(&b))
    }

    /// Returns true if the default backend was used.
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.origin == Origin::Fallback
    }

    /// Non-fatal build diagnostics for this selection.
    #[must_use]
    pub fn diagnostics(&self) -> Vec<String> {
        let mut out = Vec::new();

        if self.is_fallback() {
            out.push(format!(
                "no transport backend selected, defaulting to {} (enable one of the backend features to choose)",
                self.backend.library()
            ));
        }

        out.push(format!("Use {} lib", self.backend.library()));

        if self.backend == Backend::Custom {
            out.push(format!(
                "custom backend: {CUSTOM_SOURCE_ENV} must name the Rust source defining `EthernetClient`, or the build fails"
            ));
        }

        if !self.shadowed.is_empty() {
            let ignored: Vec<&str> = self.shadowed.iter().map(|b| b.feature()).collect();
            out.push(format!(
                "multiple transport backends enabled, {} wins over {}",
                self.backend.feature(),
                ignored.join(", ")
            ));
        }

        out
    }
}

/// The custom backend was selected but its source cannot be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissingCustomBackend {
    /// The environment variable naming the source is not set.
    Unset,
    /// The named file does not exist.
    NotFound(PathBuf),
}

impl fmt::Display for MissingCustomBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unset => write!(
                f,
                "feature `custom-ethernet` selected but {CUSTOM_SOURCE_ENV} is not set; \
                 point it at the Rust source defining `EthernetClient`"
            ),
            Self::NotFound(path) => write!(
                f,
                "feature `custom-ethernet` selected but {CUSTOM_SOURCE_ENV}={} does not exist",
                path.display()
            ),
        }
    }
}

/// Resolves the custom backend source path.
///
/// Relative paths are taken from `base`, the directory of the crate
/// being built.
///
/// # Errors
/// Returns `MissingCustomBackend` if the path is unset or the file is absent.
pub fn resolve_custom_source(
    value: Option<&str>,
    base: &Path,
) -> Result<PathBuf, MissingCustomBackend> {
    let raw = match value.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => return Err(MissingCustomBackend::Unset),
    };

    let path = Path::new(raw);
    let path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };

    if path.is_file() {
        Ok(path)
    } else {
        Err(MissingCustomBackend::NotFound(path))
    }
}
