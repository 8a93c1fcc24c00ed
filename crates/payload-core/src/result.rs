//! Conversion result

use crate::envelope::OutputEnvelope;
use crate::error::Anomaly;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use serde::Serialize;

/// Normalized buffer plus its base64 text and an optional diagnostic
///
/// # Invariants
/// - `size == buffer.len()`
/// - `base64` is the standard encoding of `buffer`
/// - when `error` is set, `buffer` is a non-empty placeholder
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionResult {
    #[serde(skip)]
    pub buffer: Bytes,
    pub base64: String,
    pub size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Anomaly>,
}

impl ConversionResult {
    /// Build from a buffer that already passed the size guard
    #[must_use]
    pub(crate) fn new(buffer: Bytes, error: Option<Anomaly>) -> Self {
        let base64 = STANDARD.encode(&buffer);
        Self {
            size: buffer.len(),
            buffer,
            base64,
            error,
        }
    }

    /// True when no anomaly was recorded
    #[inline]
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.error.is_none()
    }

    /// Error text, if any
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }

    /// Borrow the buffer
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Project into an envelope, reusing the computed base64 text
    #[must_use]
    pub fn into_envelope(self, content_type: impl Into<String>) -> OutputEnvelope {
        OutputEnvelope {
            binary: self.base64,
            content_type: content_type.into(),
            size: self.size,
        }
    }
}
