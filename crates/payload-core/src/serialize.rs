//! Serialization fallback for structured values
//!
//! Renders a [`Structured`] value as compact JSON. The traversal never
//! fails: any error raised by a hook or a field read, a cycle, or excessive
//! nesting becomes an [`Anomaly`] and the output is replaced with a
//! placeholder such as `[object Widget]`.
//!
//! Hook semantics follow the usual JSON convention: a value's hook is
//! called once for the slot it occupies, and whatever it returns is
//! rendered without calling that result's own hook again.

use crate::error::Anomaly;
use crate::value::{ObjectKind, Structured, Value};
use std::sync::Arc;

/// Bytes produced by the fallback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Serialized {
    /// JSON text, or the placeholder when `anomaly` is set
    pub bytes: Vec<u8>,
    /// What went wrong, if anything
    pub anomaly: Option<Anomaly>,
}

/// Serialize an object, absorbing every failure
#[must_use]
pub fn serialize_object(object: &Arc<dyn Structured>, max_depth: usize) -> Serialized {
    let mut walker = Walker::new(max_depth);
    match walker.slot(&Value::Object(Arc::clone(object))) {
        Ok(json) => Serialized {
            bytes: json.to_string().into_bytes(),
            anomaly: None,
        },
        Err(anomaly) => {
            tracing::warn!(
                type_tag = object.type_tag(),
                error = %anomaly,
                "serialization fallback substituted placeholder"
            );
            Serialized {
                bytes: placeholder(object.as_ref()).into_bytes(),
                anomaly: Some(anomaly),
            }
        }
    }
}

/// Default textual rendering used when serialization fails
#[must_use]
pub fn placeholder(object: &dyn Structured) -> String {
    let tag = object.type_tag();
    if tag.is_empty() {
        "[object Object]".to_string()
    } else {
        format!("[object {tag}]")
    }
}

struct Walker {
    max_depth: usize,
    /// Identities of the objects currently being rendered
    ancestors: Vec<*const ()>,
    path: Vec<String>,
}

impl Walker {
    fn new(max_depth: usize) -> Self {
        Self {
            max_depth,
            ancestors: Vec::new(),
            path: Vec::new(),
        }
    }

    /// Render the value occupying one slot, applying its hook if any
    fn slot(&mut self, value: &Value) -> Result<serde_json::Value, Anomaly> {
        match value {
            Value::Object(object) => match object.to_json() {
                None => self.enter(object),
                Some(Ok(Value::Object(replacement))) => self.enter(&replacement),
                Some(Ok(replacement)) => Ok(leaf(&replacement)),
                Some(Err(raised)) => Err(Anomaly::hook(object.type_tag(), &raised)),
            },
            other => Ok(leaf(other)),
        }
    }

    fn enter(&mut self, object: &Arc<dyn Structured>) -> Result<serde_json::Value, Anomaly> {
        let identity = Arc::as_ptr(object).cast::<()>();
        if self.ancestors.contains(&identity) {
            return Err(Anomaly::Circular {
                path: self.path_string(),
            });
        }
        if self.ancestors.len() >= self.max_depth {
            return Err(Anomaly::TooDeep {
                limit: self.max_depth,
            });
        }

        self.ancestors.push(identity);
        let rendered = self.fields(object.as_ref());
        self.ancestors.pop();
        rendered
    }

    fn fields(&mut self, object: &dyn Structured) -> Result<serde_json::Value, Anomaly> {
        let keys = object
            .keys()
            .map_err(|raised| Anomaly::property_access(None, &raised))?;

        match object.kind() {
            ObjectKind::Record => {
                let mut map = serde_json::Map::with_capacity(keys.len());
                for key in keys {
                    let rendered = self.field(object, &key)?;
                    map.insert(key, rendered);
                }
                Ok(serde_json::Value::Object(map))
            }
            ObjectKind::Sequence => {
                let mut items = Vec::with_capacity(keys.len());
                for key in keys {
                    items.push(self.field(object, &key)?);
                }
                Ok(serde_json::Value::Array(items))
            }
        }
    }

    fn field(&mut self, object: &dyn Structured, key: &str) -> Result<serde_json::Value, Anomaly> {
        let value = object
            .get(key)
            .map_err(|raised| Anomaly::property_access(Some(key), &raised))?;
        self.path.push(key.to_string());
        let rendered = self.slot(&value);
        self.path.pop();
        rendered
    }

    fn path_string(&self) -> String {
        let mut path = String::from("$");
        for segment in &self.path {
            path.push('.');
            path.push_str(segment);
        }
        path
    }
}

/// Render a non-object value nested inside an object
fn leaf(value: &Value) -> serde_json::Value {
    match value {
        Value::Bytes(bytes) => bytes_json(bytes),
        Value::Memory(memory) => bytes_json(memory.as_slice()),
        Value::TypedArray(array) => array.to_json(),
        Value::Text(text) => serde_json::Value::String(text.clone()),
        Value::Scalar(scalar) => scalar.to_json(),
        Value::Absent | Value::Token(_) | Value::Object(_) => serde_json::Value::Null,
    }
}

fn bytes_json(bytes: &[u8]) -> serde_json::Value {
    serde_json::Value::Array(bytes.iter().map(|b| serde_json::Value::from(*b)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AccessError;
    use crate::value::{Record, Sequence, Token};

    fn run(object: Arc<dyn Structured>) -> Serialized {
        serialize_object(&object, 16)
    }

    fn text(s: &Serialized) -> &str {
        std::str::from_utf8(&s.bytes).unwrap()
    }

    #[derive(Debug)]
    struct Hooked(Result<Value, AccessError>);

    impl Structured for Hooked {
        fn type_tag(&self) -> &str {
            "Hooked"
        }

        fn keys(&self) -> Result<Vec<String>, AccessError> {
            Ok(vec!["raw".to_string()])
        }

        fn get(&self, _key: &str) -> Result<Value, AccessError> {
            Ok(Value::from("raw"))
        }

        fn to_json(&self) -> Option<Result<Value, AccessError>> {
            Some(self.0.clone())
        }
    }

    #[test]
    fn plain_record_renders_in_insertion_order() {
        let record = Record::new()
            .field("z", 1)
            .field("a", "x")
            .field("n", Value::Absent)
            .field("b", true);
        let out = run(Arc::new(record));
        assert!(out.anomaly.is_none());
        assert_eq!(text(&out), r#"{"z":1,"a":"x","n":null,"b":true}"#);
    }

    #[test]
    fn nested_sequence_renders_as_array() {
        let seq: Sequence = vec![Value::from(1.5), Value::from(Token::new("t"))]
            .into_iter()
            .collect();
        let record = Record::new().field("items", Arc::new(seq));
        let out = run(Arc::new(record));
        assert_eq!(text(&out), r#"{"items":[1.5,null]}"#);
    }

    #[test]
    fn nested_bytes_render_as_numbers() {
        let record = Record::new().field("b", vec![1u8, 2, 255]);
        assert_eq!(text(&run(Arc::new(record))), r#"{"b":[1,2,255]}"#);
    }

    #[test]
    fn self_reference_is_circular() {
        let record = Arc::new(Record::with_tag("Node"));
        record.insert("name", "loop");
        record.insert("me", Arc::clone(&record));
        let out = run(record);
        assert_eq!(text(&out), "[object Node]");
        assert!(matches!(out.anomaly, Some(Anomaly::Circular { ref path }) if path == "$.me"));
    }

    #[test]
    fn shared_non_cyclic_reference_is_fine() {
        let shared = Arc::new(Record::new().field("v", 1));
        let record = Record::new()
            .field("left", Arc::clone(&shared))
            .field("right", shared);
        let out = run(Arc::new(record));
        assert!(out.anomaly.is_none());
        assert_eq!(text(&out), r#"{"left":{"v":1},"right":{"v":1}}"#);
    }

    #[test]
    fn hook_replaces_structure() {
        let out = run(Arc::new(Hooked(Ok(Value::from("custom")))));
        assert!(out.anomaly.is_none());
        assert_eq!(text(&out), r#""custom""#);
    }

    #[test]
    fn hook_returning_object_is_traversed() {
        let replacement = Record::new().field("k", 2);
        let out = run(Arc::new(Hooked(Ok(Value::object(replacement)))));
        assert_eq!(text(&out), r#"{"k":2}"#);
    }

    #[test]
    fn hook_failure_uses_placeholder() {
        let out = run(Arc::new(Hooked(Err(AccessError::new("hook blew up")))));
        assert_eq!(text(&out), "[object Hooked]");
        let anomaly = out.anomaly.unwrap();
        assert_eq!(anomaly.to_string(), "hook blew up");
        assert!(matches!(anomaly, Anomaly::Hook { .. }));
    }

    #[test]
    fn nested_hook_failure_fails_whole_value() {
        let record = Record::with_tag("Outer")
            .field("inner", Value::object(Hooked(Err(AccessError::new("inner hook")))));
        let out = run(Arc::new(record));
        assert_eq!(text(&out), "[object Outer]");
        assert_eq!(out.anomaly.unwrap().to_string(), "inner hook");
    }

    #[test]
    fn nested_floats_render_like_top_level() {
        let record = Record::new()
            .field("a", 2.0)
            .field("z", -0.0)
            .field("h", 1.5)
            .field("t", crate::value::TypedArray::F64(vec![3.0, -0.0, 0.25]));
        let out = run(Arc::new(record));
        assert_eq!(text(&out), r#"{"a":2,"z":0,"h":1.5,"t":[3,0,0.25]}"#);
    }

    #[test]
    fn depth_limit() {
        let mut value = Value::from(0);
        for _ in 0..20 {
            value = Value::object(Record::new().field("next", value));
        }
        let Value::Object(object) = value else {
            unreachable!()
        };
        let out = serialize_object(&object, 8);
        assert_eq!(out.anomaly, Some(Anomaly::TooDeep { limit: 8 }));
        assert_eq!(text(&out), "[object Object]");
    }

    #[test]
    fn empty_tag_placeholder() {
        let record = Record::with_tag("");
        assert_eq!(placeholder(&record), "[object Object]");
    }
}
