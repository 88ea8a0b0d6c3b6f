//! Configuration Module
//!
//! Defines the cache configuration and the composable options used to build
//! it. Options are applied left-to-right; later options override earlier
//! ones for the same field.

use std::time::Duration;

// == Config ==
/// Cache configuration parameters.
///
/// Immutable once the cache is constructed. Unset fields keep their
/// documented defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Default TTL applied to entries stored with [`Ttl::Default`].
    /// `None` means such entries never expire.
    ///
    /// [`Ttl::Default`]: crate::cache::Ttl::Default
    pub default_expiration: Option<Duration>,
    /// Interval between background cleanup sweeps.
    /// `None` disables the reaper; expiration is then enforced lazily on read.
    pub cleanup_interval: Option<Duration>,
}

impl Config {
    /// Builds a Config by applying the given options in order over the
    /// defaults.
    pub fn from_options(options: impl IntoIterator<Item = CacheOption>) -> Self {
        let mut config = Self::default();
        for option in options {
            option.apply(&mut config);
        }
        config
    }
}

// == Cache Option ==
/// A single configuration modifier.
///
/// Each option mutates one field of the [`Config`]. Options are total: every
/// option is valid against every config, and applying a no-op option changes
/// nothing.
pub struct CacheOption(Box<dyn FnOnce(&mut Config)>);

impl CacheOption {
    fn apply(self, config: &mut Config) {
        (self.0)(config)
    }
}

impl std::fmt::Debug for CacheOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CacheOption")
    }
}

/// Sets the default expiration for entries stored without an explicit TTL.
///
/// A zero duration is the "no default expiration" sentinel: entries stored
/// with the default TTL will never expire.
pub fn with_default_expiration(value: Duration) -> CacheOption {
    CacheOption(Box::new(move |config| {
        config.default_expiration = if value.is_zero() { None } else { Some(value) };
    }))
}

/// Sets the interval between background cleanup sweeps.
///
/// A zero duration disables the reaper entirely; expired entries are then
/// removed only when read.
pub fn with_cleanup_interval(value: Duration) -> CacheOption {
    CacheOption(Box::new(move |config| {
        config.cleanup_interval = if value.is_zero() { None } else { Some(value) };
    }))
}

/// Option that does nothing.
pub fn with_nope() -> CacheOption {
    CacheOption(Box::new(|_| {}))
}
