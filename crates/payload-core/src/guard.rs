//! Maximum buffer length enforcement
//!
//! Checked on the materialized buffer before any base64 text is built, so
//! an oversized payload is never encoded.

use crate::error::NormalizeError;

/// Upper bound on buffer length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeGuard {
    max_bytes: usize,
}

impl SizeGuard {
    /// Create with an inclusive bound
    #[inline]
    #[must_use]
    pub const fn new(max_bytes: usize) -> Self {
        Self { max_bytes }
    }

    /// The configured bound
    #[inline]
    #[must_use]
    pub const fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Accept `len` if it does not exceed the bound
    ///
    /// # Errors
    /// Returns [`NormalizeError::PayloadTooLarge`] when `len > max_bytes`
    pub fn check(&self, len: usize) -> Result<(), NormalizeError> {
        if len > self.max_bytes {
            tracing::warn!(size = len, max = self.max_bytes, "payload exceeds size limit");
            return Err(NormalizeError::payload_too_large(len, self.max_bytes));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_bound_accepted() {
        let guard = SizeGuard::new(10);
        assert!(guard.check(10).is_ok());
        assert!(guard.check(0).is_ok());
    }

    #[test]
    fn one_over_rejected() {
        let guard = SizeGuard::new(10);
        let err = guard.check(11).unwrap_err();
        assert!(matches!(err, NormalizeError::PayloadTooLarge { size: 11, max: 10 }));
        assert!(err.to_string().contains("payload too large"));
    }

    #[test]
    fn zero_bound_only_accepts_empty() {
        let guard = SizeGuard::new(0);
        assert!(guard.check(0).is_ok());
        assert!(guard.check(1).is_err());
    }
}
