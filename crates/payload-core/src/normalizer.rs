//! Normalizer pipeline
//!
//! dispatch → size guard → base64. Stateless: a [`Normalizer`] holds only
//! its configuration and can be shared across threads.

use crate::config::NormalizerConfig;
use crate::detect::Detector;
use crate::dispatch::{Dispatcher, Materialized};
use crate::error::NormalizeError;
use crate::guard::SizeGuard;
use crate::result::ConversionResult;
use crate::value::Value;

/// Configured normalizer
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    config: NormalizerConfig,
}

impl Normalizer {
    /// Create with configuration
    #[inline]
    #[must_use]
    pub const fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Reduce any value to bytes
    ///
    /// Anomalies in structured values are absorbed into
    /// [`ConversionResult::error`].
    ///
    /// # Errors
    /// Returns [`NormalizeError::PayloadTooLarge`] when the materialized
    /// buffer exceeds `max_bytes`
    pub fn convert_to_binary(
        &self,
        input: impl Into<Value>,
    ) -> Result<ConversionResult, NormalizeError> {
        let value = input.into();
        let kind = value.kind();

        let dispatcher = Dispatcher::new(
            Detector::new(self.config.min_base64_len),
            self.config.max_depth,
        );
        let Materialized { buffer, anomaly } = dispatcher.materialize(value);

        SizeGuard::new(self.config.max_bytes).check(buffer.len())?;

        tracing::debug!(%kind, size = buffer.len(), anomaly = anomaly.is_some(), "normalized value");
        Ok(ConversionResult::new(buffer, anomaly))
    }
}

/// Reduce any value to bytes with the default configuration
///
/// # Errors
/// Returns [`NormalizeError::PayloadTooLarge`] above
/// [`DEFAULT_MAX_BYTES`](crate::DEFAULT_MAX_BYTES)
pub fn convert_to_binary(input: impl Into<Value>) -> Result<ConversionResult, NormalizeError> {
    Normalizer::default().convert_to_binary(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hello_world_bytes() {
        let result = convert_to_binary(b"Hello, World!".to_vec()).unwrap();
        assert_eq!(result.size, 13);
        assert!(result.error.is_none());
        assert_eq!(result.base64, "SGVsbG8sIFdvcmxkIQ==");
    }

    #[test]
    fn absent_value() {
        let result = convert_to_binary(Value::Absent).unwrap();
        assert_eq!(result.size, 0);
        assert_eq!(result.base64, "");
    }

    #[test]
    fn boolean_true() {
        let result = convert_to_binary(true).unwrap();
        assert_eq!(result.as_bytes(), b"true");
    }

    #[test]
    fn size_guard_applies() {
        let normalizer = Normalizer::new(NormalizerConfig::new().with_max_bytes(4));
        assert!(normalizer.convert_to_binary(vec![0u8; 4]).is_ok());
        assert!(matches!(
            normalizer.convert_to_binary(vec![0u8; 5]),
            Err(NormalizeError::PayloadTooLarge { size: 5, max: 4 })
        ));
    }

    #[test]
    fn threshold_comes_from_config() {
        let normalizer = Normalizer::new(NormalizerConfig::new().with_min_base64_len(4));
        let result = normalizer.convert_to_binary("dHJ1").unwrap();
        assert_eq!(result.as_bytes(), b"tru");
    }

    #[test]
    fn normalizer_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Normalizer>();
    }
}
