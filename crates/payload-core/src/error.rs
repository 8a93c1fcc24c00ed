//! Error types for the normalizer
//!
//! Two families:
//! - [`NormalizeError`]: fatal, returned to the caller (only the size bound)
//! - [`Anomaly`]: non-fatal, recorded on the result while a placeholder
//!   buffer is still produced
//!
//! [`AccessError`] is what a structured value raises from a field read or
//! from its serialization hook. [`ConfigError`] covers config loading.

use std::path::PathBuf;

/// Fatal normalization errors
#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    /// Materialized buffer exceeds the configured bound
    #[error("payload too large: {size} bytes exceeds limit of {max} bytes")]
    PayloadTooLarge { size: usize, max: usize },
}

impl NormalizeError {
    /// Create a payload-too-large error
    #[must_use]
    pub fn payload_too_large(size: usize, max: usize) -> Self {
        Self::PayloadTooLarge { size, max }
    }
}

/// Error raised by a structured value while it is being read
///
/// Returned from [`Structured::keys`](crate::Structured::keys),
/// [`Structured::get`](crate::Structured::get) and
/// [`Structured::to_json`](crate::Structured::to_json).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct AccessError {
    message: String,
}

impl AccessError {
    /// Create from any message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The raised message text
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Non-fatal anomaly absorbed during serialization
///
/// `Display` is the text exposed as `ConversionResult.error`. For hook and
/// field-access failures this is exactly the raised message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Anomaly {
    /// The custom serialization hook raised
    #[error("{message}")]
    Hook { type_tag: String, message: String },

    /// Key enumeration or a field read raised
    #[error("{message}")]
    PropertyAccess {
        /// `None` when enumerating keys failed
        key: Option<String>,
        message: String,
    },

    /// A value references one of its own ancestors
    #[error("serialization failed: circular structure at {path}")]
    Circular { path: String },

    /// Nesting deeper than the configured limit
    #[error("serialization failed: nesting exceeds {limit} levels")]
    TooDeep { limit: usize },
}

impl Anomaly {
    /// Hook failure on a value with the given tag
    pub fn hook(type_tag: impl Into<String>, source: &AccessError) -> Self {
        Self::Hook {
            type_tag: type_tag.into(),
            message: source.message().to_string(),
        }
    }

    /// Field access failure; `key` is `None` for key enumeration
    #[must_use]
    pub fn property_access(key: Option<&str>, source: &AccessError) -> Self {
        Self::PropertyAccess {
            key: key.map(str::to_string),
            message: source.message().to_string(),
        }
    }

    /// Whether this anomaly belongs to the serialization family
    /// (hook, cycle, depth) rather than property access
    #[must_use]
    pub fn is_serialization(&self) -> bool {
        !matches!(self, Self::PropertyAccess { .. })
    }
}

impl serde::Serialize for Anomaly {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Errors while loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading a config file
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed TOML
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Value outside its allowed range
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
