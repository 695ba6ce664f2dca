//! Runtime configuration loaded from environment variables.
//!
//! All settings have sensible defaults so quotes resolve with zero
//! configuration.

use parley_shared::constants::DEFAULT_QUOTE_THUMBNAIL_DIMENSION;
use parley_shared::types::ServiceAddress;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteConfig {
    /// Address of the account this device belongs to.  Quotes of our own
    /// messages are never treated as remotely sourced.
    /// Env: `PARLEY_LOCAL_UUID`
    /// Default: unset
    pub local_address: Option<ServiceAddress>,

    /// Longest edge, in pixels, of a quoted-reply thumbnail.
    /// Env: `PARLEY_THUMBNAIL_MAX_DIM`
    /// Default: `200`
    pub thumbnail_max_dimension: u32,
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            local_address: None,
            thumbnail_max_dimension: DEFAULT_QUOTE_THUMBNAIL_DIMENSION,
        }
    }
}

impl QuoteConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_vars<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = get("PARLEY_LOCAL_UUID") {
            match raw.parse::<ServiceAddress>() {
                Ok(address) => config.local_address = Some(address),
                Err(e) => {
                    tracing::warn!(value = %raw, error = %e, "Invalid PARLEY_LOCAL_UUID, ignoring");
                }
            }
        }

        if let Some(raw) = get("PARLEY_THUMBNAIL_MAX_DIM") {
            match raw.trim().parse::<u32>() {
                Ok(dim) if dim > 0 => config.thumbnail_max_dimension = dim,
                _ => {
                    tracing::warn!(value = %raw, "Invalid PARLEY_THUMBNAIL_MAX_DIM, using default");
                }
            }
        }

        config
    }

    pub fn with_local_address(mut self, address: ServiceAddress) -> Self {
        self.local_address = Some(address);
        self
    }

    /// Whether `address` is the local account.
    pub fn is_local(&self, address: &ServiceAddress) -> bool {
        self.local_address
            .as_ref()
            .is_some_and(|local| local.matches(address))
    }
}
