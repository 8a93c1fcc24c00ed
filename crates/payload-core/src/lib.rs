//! Payload Normalizer
//!
//! Reduces arbitrary, untyped values produced by executed code to a
//! canonical byte buffer plus its base64 text, ready for transport.
//!
//! # Core Concepts
//!
//! - [`Value`]: closed set of recognized input shapes
//! - [`Structured`]: field-by-field access to composite values, each read
//!   fallible on its own
//! - [`ConversionResult`]: buffer, base64, size and an optional [`Anomaly`]
//! - [`OutputEnvelope`]: `{ binary, contentType, size }` for the transport
//!
//! Only one failure propagates: [`NormalizeError::PayloadTooLarge`]. Hostile
//! or cyclic objects degrade to a placeholder buffer with a diagnostic.
//!
//! # Example
//!
//! ```rust
//! use payload_core::{convert_to_binary, create_binary_output, Record};
//!
//! let result = convert_to_binary(b"Hello, World!".to_vec()).unwrap();
//! assert_eq!(result.base64, "SGVsbG8sIFdvcmxkIQ==");
//!
//! let record = Record::new().field("ok", true);
//! let result = convert_to_binary(payload_core::Value::object(record)).unwrap();
//! let envelope = create_binary_output(result.as_bytes(), "application/json");
//! assert_eq!(envelope.size, 11);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod config;
mod detect;
mod dispatch;
mod envelope;
mod error;
mod guard;
mod normalizer;
mod result;
mod serialize;
mod value;

pub use config::{
    NormalizerConfig, DEFAULT_MAX_BYTES, DEFAULT_MAX_DEPTH, DEFAULT_MIN_BASE64_LEN, MAX_DEPTH_LIMIT,
};
pub use detect::{Detected, Detector};
pub use dispatch::{Dispatcher, Materialized};
pub use envelope::{create_binary_output, OutputEnvelope};
pub use error::{AccessError, Anomaly, ConfigError, NormalizeError};
pub use guard::SizeGuard;
pub use normalizer::{convert_to_binary, Normalizer};
pub use result::ConversionResult;
pub use serialize::{placeholder, serialize_object, Serialized};
pub use value::{
    ElementKind, ObjectKind, RawMemory, Record, Scalar, Sequence, Structured, Token, TypedArray,
    Value, ValueKind,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
