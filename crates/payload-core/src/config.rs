//! Normalizer configuration
//!
//! Loaded from TOML or built in code. Every field has a default, so an
//! empty file is a valid configuration.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default maximum buffer length: 50 MiB
pub const DEFAULT_MAX_BYTES: usize = 50 * 1024 * 1024;

/// Default minimum stripped length for a text to be treated as base64
pub const DEFAULT_MIN_BASE64_LEN: usize = 16;

/// Default maximum object nesting
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Hard ceiling on `max_depth`; traversal recurses once per level
pub const MAX_DEPTH_LIMIT: usize = 512;

/// Normalizer settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NormalizerConfig {
    /// Inclusive upper bound on materialized buffers
    pub max_bytes: usize,
    /// Shorter texts are always literal
    pub min_base64_len: usize,
    /// Deeper object graphs become an anomaly
    pub max_depth: usize,
}

impl NormalizerConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With maximum buffer length
    #[inline]
    #[must_use]
    pub fn with_max_bytes(mut self, max: usize) -> Self {
        self.max_bytes = max;
        self
    }

    /// With base64 length threshold
    #[inline]
    #[must_use]
    pub fn with_min_base64_len(mut self, len: usize) -> Self {
        self.min_base64_len = len;
        self
    }

    /// With maximum nesting depth
    #[inline]
    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Parse and validate TOML text
    ///
    /// # Errors
    /// Returns error on malformed TOML, unknown keys, or out-of-range values
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or fails [`Self::from_toml_str`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text =
            std::fs::read_to_string(path).map_err(|e| ConfigError::io_error(path, e))?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), ?config, "loaded normalizer config");
        Ok(config)
    }

    /// Check value ranges
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] for a zero bound, threshold or depth,
    /// or a depth above [`MAX_DEPTH_LIMIT`]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_bytes == 0 {
            return Err(ConfigError::Invalid("max_bytes must be non-zero".to_string()));
        }
        if self.min_base64_len == 0 {
            return Err(ConfigError::Invalid(
                "min_base64_len must be non-zero".to_string(),
            ));
        }
        if self.max_depth == 0 {
            return Err(ConfigError::Invalid("max_depth must be non-zero".to_string()));
        }
        if self.max_depth > MAX_DEPTH_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "max_depth must not exceed {MAX_DEPTH_LIMIT}, got {}",
                self.max_depth
            )));
        }
        Ok(())
    }
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
            min_base64_len: DEFAULT_MIN_BASE64_LEN,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}
