//! Output envelope
//!
//! The shape a harness forwards over its transport: base64 text, a
//! caller-declared content type, and the byte length.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Transport-ready projection of a finished buffer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputEnvelope {
    /// Standard base64 of the buffer
    pub binary: String,
    /// Caller-declared label, not validated
    pub content_type: String,
    /// Buffer length in bytes
    pub size: usize,
}

/// Wrap a buffer that has already passed the size guard
#[must_use]
pub fn create_binary_output(buffer: &[u8], content_type: impl Into<String>) -> OutputEnvelope {
    OutputEnvelope {
        binary: STANDARD.encode(buffer),
        content_type: content_type.into(),
        size: buffer.len(),
    }
}
