//! Base64-versus-literal text detection
//!
//! A text is treated as encoded binary only when, after removing all
//! whitespace, it is long enough, canonically padded, made solely of the
//! standard alphabet, and decodes under the strict standard engine. Every
//! other text is literal and maps one character to one byte (code point
//! modulo 256).

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Outcome of classifying a text value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detected {
    /// Decoded base64 payload
    Base64(Vec<u8>),
    /// One byte per character
    Literal(Vec<u8>),
}

impl Detected {
    /// The resulting bytes
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Self::Base64(b) | Self::Literal(b) => b,
        }
    }

    /// Whether the text was decoded as base64
    #[must_use]
    pub fn is_base64(&self) -> bool {
        matches!(self, Self::Base64(_))
    }
}

/// Text heuristic with a minimum stripped length
#[derive(Debug, Clone, Copy)]
pub struct Detector {
    min_len: usize,
}

impl Detector {
    /// Create with the minimum stripped length a base64 candidate must have
    #[must_use]
    pub const fn new(min_len: usize) -> Self {
        Self { min_len }
    }

    /// Classify and convert a text value
    #[must_use]
    pub fn detect(&self, text: &str) -> Detected {
        if text.is_empty() {
            return Detected::Literal(Vec::new());
        }

        let stripped: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        if self.is_candidate(&stripped) {
            if let Ok(decoded) = STANDARD.decode(&stripped) {
                return Detected::Base64(decoded);
            }
        }
        Detected::Literal(latin1_bytes(text))
    }

    fn is_candidate(&self, stripped: &str) -> bool {
        let len = stripped.len();
        if len == 0 || len % 4 != 0 || len < self.min_len {
            return false;
        }
        let body = stripped.trim_end_matches('=');
        len - body.len() <= 2
            && body
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'/')
    }
}

/// Each character's code point modulo 256
#[allow(clippy::cast_possible_truncation)]
fn latin1_bytes(text: &str) -> Vec<u8> {
    text.chars().map(|c| (u32::from(c) % 256) as u8).collect()
}
