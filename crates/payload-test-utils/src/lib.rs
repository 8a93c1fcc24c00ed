//! Testing utilities for the payload workspace
//!
//! Hostile and structured fixtures shared by integration tests.

#![allow(missing_docs)]

use payload_core::{AccessError, Record, Structured, Value};
use std::sync::Arc;

/// Object whose every field read raises
#[derive(Debug, Clone)]
pub struct ThrowingObject {
    pub keys: Vec<String>,
    pub message: String,
}

impl ThrowingObject {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            keys: vec!["a".to_string(), "b".to_string()],
            message: message.into(),
        }
    }
}

impl Structured for ThrowingObject {
    fn type_tag(&self) -> &str {
        "Throwing"
    }

    fn keys(&self) -> Result<Vec<String>, AccessError> {
        Ok(self.keys.clone())
    }

    fn get(&self, _key: &str) -> Result<Value, AccessError> {
        Err(AccessError::new(self.message.clone()))
    }
}

/// Object that refuses to list its keys
#[derive(Debug, Clone)]
pub struct OpaqueObject {
    pub message: String,
}

impl Structured for OpaqueObject {
    fn type_tag(&self) -> &str {
        "Opaque"
    }

    fn keys(&self) -> Result<Vec<String>, AccessError> {
        Err(AccessError::new(self.message.clone()))
    }

    fn get(&self, key: &str) -> Result<Value, AccessError> {
        Err(AccessError::new(format!("{}: {key}", self.message)))
    }
}

/// Record with a custom serialization hook
#[derive(Debug)]
pub struct HookedObject {
    pub inner: Record,
    pub hook: Result<Value, AccessError>,
}

impl HookedObject {
    /// Hook succeeds with `replacement`
    pub fn returning(replacement: impl Into<Value>) -> Self {
        Self {
            inner: Record::new().field("hidden", "structure"),
            hook: Ok(replacement.into()),
        }
    }

    /// Hook raises `message`
    pub fn raising(message: impl Into<String>) -> Self {
        Self {
            inner: Record::new().field("hidden", "structure"),
            hook: Err(AccessError::new(message)),
        }
    }
}

impl Structured for HookedObject {
    fn type_tag(&self) -> &str {
        "Hooked"
    }

    fn keys(&self) -> Result<Vec<String>, AccessError> {
        self.inner.keys()
    }

    fn get(&self, key: &str) -> Result<Value, AccessError> {
        self.inner.get(key)
    }

    fn to_json(&self) -> Option<Result<Value, AccessError>> {
        Some(self.hook.clone())
    }
}

/// Record containing itself under `key`
pub fn self_referential_record(key: &str) -> Arc<Record> {
    let record = Arc::new(Record::new().field("name", "loop"));
    record.insert(key, Arc::clone(&record));
    record
}

/// Two records referencing each other
pub fn mutual_cycle() -> (Arc<Record>, Arc<Record>) {
    let a = Arc::new(Record::with_tag("A"));
    let b = Arc::new(Record::with_tag("B").field("a", Arc::clone(&a)));
    a.insert("b", Arc::clone(&b));
    (a, b)
}

/// `depth` records nested through `child`, innermost holding `leaf`
pub fn nested_records(depth: usize, leaf: impl Into<Value>) -> Value {
    let mut value = leaf.into();
    for _ in 0..depth {
        value = Value::object(Record::new().field("child", value));
    }
    value
}
