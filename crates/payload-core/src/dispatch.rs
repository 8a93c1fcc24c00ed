//! Value classification and materialization
//!
//! One total `match` over [`Value`] decides how bytes are produced. This
//! step never fails; anomalies travel alongside the buffer.

use crate::config::MAX_DEPTH_LIMIT;
use crate::detect::{Detected, Detector};
use crate::error::Anomaly;
use crate::serialize::serialize_object;
use crate::value::Value;
use bytes::Bytes;

/// Buffer produced from a value, before the size guard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Materialized {
    pub buffer: Bytes,
    pub anomaly: Option<Anomaly>,
}

impl Materialized {
    fn clean(buffer: impl Into<Bytes>) -> Self {
        Self {
            buffer: buffer.into(),
            anomaly: None,
        }
    }
}

/// Routes each variant to its byte producer
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher {
    detector: Detector,
    max_depth: usize,
}

impl Dispatcher {
    /// Create with a text detector and an object nesting limit
    ///
    /// The limit is capped at [`MAX_DEPTH_LIMIT`] even when the config was
    /// built without validation.
    #[must_use]
    pub const fn new(detector: Detector, max_depth: usize) -> Self {
        let max_depth = if max_depth > MAX_DEPTH_LIMIT {
            MAX_DEPTH_LIMIT
        } else {
            max_depth
        };
        Self {
            detector,
            max_depth,
        }
    }

    /// Produce bytes for a value
    #[must_use]
    pub fn materialize(&self, value: Value) -> Materialized {
        match value {
            Value::Bytes(bytes) => Materialized::clean(bytes),
            Value::Memory(memory) => Materialized::clean(memory.into_bytes()),
            Value::TypedArray(array) => {
                tracing::debug!(
                    elements = array.len(),
                    width = array.element_width(),
                    "taking typed array byte view"
                );
                Materialized::clean(array.into_bytes())
            }
            Value::Text(text) => {
                let detected = self.detector.detect(&text);
                tracing::debug!(
                    bytes = text.len(),
                    base64 = detected.is_base64(),
                    "classified text"
                );
                match detected {
                    Detected::Base64(bytes) | Detected::Literal(bytes) => {
                        Materialized::clean(bytes)
                    }
                }
            }
            Value::Object(object) => {
                let serialized = serialize_object(&object, self.max_depth);
                Materialized {
                    buffer: Bytes::from(serialized.bytes),
                    anomaly: serialized.anomaly,
                }
            }
            Value::Scalar(scalar) => Materialized::clean(scalar.render().into_bytes()),
            Value::Absent => Materialized::clean(Bytes::new()),
            Value::Token(token) => Materialized::clean(token.render().into_bytes()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{RawMemory, Record, Scalar, Token, TypedArray};
    use std::sync::Arc;

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(Detector::new(16), 32)
    }

    #[test]
    fn bytes_pass_through_without_copy() {
        let input = Bytes::from_static(b"\x00\x01binary");
        let out = dispatcher().materialize(Value::Bytes(input.clone()));
        assert_eq!(out.buffer, input);
        assert_eq!(out.buffer.as_ptr(), input.as_ptr());
        assert!(out.anomaly.is_none());
    }

    #[test]
    fn memory_full_extent() {
        let out = dispatcher().materialize(Value::Memory(RawMemory::zeroed(64)));
        assert_eq!(out.buffer.len(), 64);
        assert!(out.buffer.iter().all(|b| *b == 0));
    }

    #[test]
    fn typed_array_width() {
        let out = dispatcher().materialize(TypedArray::I64(vec![-1, 2]).into());
        assert_eq!(out.buffer.len(), 16);
        assert_eq!(&out.buffer[..8], &(-1i64).to_ne_bytes());
    }

    #[test]
    fn scalars_render_as_text() {
        let out = dispatcher().materialize(Value::Scalar(Scalar::Bool(false)));
        assert_eq!(&out.buffer[..], b"false");
        let out = dispatcher().materialize(Value::from(3.25));
        assert_eq!(&out.buffer[..], b"3.25");
    }

    #[test]
    fn absent_is_empty() {
        let out = dispatcher().materialize(Value::Absent);
        assert!(out.buffer.is_empty());
        assert!(out.anomaly.is_none());
    }

    #[test]
    fn token_renders_symbol() {
        let out = dispatcher().materialize(Token::new("id").into());
        assert_eq!(&out.buffer[..], b"Symbol(id)");
    }

    #[test]
    fn depth_is_capped() {
        let dispatcher = Dispatcher::new(Detector::new(16), 1_000_000);
        assert_eq!(dispatcher.max_depth, MAX_DEPTH_LIMIT);
    }

    #[test]
    fn object_goes_through_fallback() {
        let record = Arc::new(Record::new().field("a", 1));
        let out = dispatcher().materialize(record.into());
        assert_eq!(&out.buffer[..], br#"{"a":1}"#);
    }
}
