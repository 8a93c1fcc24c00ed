//! Input value model
//!
//! [`Value`] is the closed set of shapes the normalizer recognizes. Anything
//! without a dedicated variant enters as [`Value::Object`] through the
//! [`Structured`] trait and is handled by the serialization fallback.

use crate::error::AccessError;
use bytes::Bytes;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// An untyped input value
#[derive(Debug, Clone)]
pub enum Value {
    /// Contiguous byte sequence, passed through without copying
    Bytes(Bytes),
    /// Untyped memory block with a known length
    Memory(RawMemory),
    /// Fixed-width numeric elements
    TypedArray(TypedArray),
    /// Text, either literal or base64-encoded binary
    Text(String),
    /// Composite value with named fields
    Object(Arc<dyn Structured>),
    /// Number or boolean
    Scalar(Scalar),
    /// Null / none / undefined
    Absent,
    /// Opaque unique token
    Token(Token),
}

/// Variant label, used in logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Bytes,
    Memory,
    TypedArray,
    Text,
    Object,
    Scalar,
    Absent,
    Token,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Bytes => "bytes",
            Self::Memory => "memory",
            Self::TypedArray => "typed-array",
            Self::Text => "text",
            Self::Object => "object",
            Self::Scalar => "scalar",
            Self::Absent => "absent",
            Self::Token => "token",
        };
        f.write_str(s)
    }
}

impl Value {
    /// Wrap a structured value
    pub fn object<S: Structured + 'static>(value: S) -> Self {
        Self::Object(Arc::new(value))
    }

    /// Variant label
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Bytes(_) => ValueKind::Bytes,
            Self::Memory(_) => ValueKind::Memory,
            Self::TypedArray(_) => ValueKind::TypedArray,
            Self::Text(_) => ValueKind::Text,
            Self::Object(_) => ValueKind::Object,
            Self::Scalar(_) => ValueKind::Scalar,
            Self::Absent => ValueKind::Absent,
            Self::Token(_) => ValueKind::Token,
        }
    }

    /// Check for the absent value
    #[must_use]
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

/// Untyped block of memory
///
/// Unlike [`Value::Bytes`] the block carries no interpretation; the full
/// extent is always taken.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawMemory(Bytes);

impl RawMemory {
    /// Zero-filled block of `len` bytes
    #[must_use]
    pub fn zeroed(len: usize) -> Self {
        Self(Bytes::from(vec![0u8; len]))
    }

    /// Block length in bytes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Full extent as bytes
    #[inline]
    #[must_use]
    pub fn into_bytes(self) -> Bytes {
        self.0
    }

    /// Borrow the block
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for RawMemory {
    fn from(data: Vec<u8>) -> Self {
        Self(Bytes::from(data))
    }
}

impl From<Bytes> for RawMemory {
    fn from(data: Bytes) -> Self {
        Self(data)
    }
}

/// Element type of a [`TypedArray`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    F32,
    U64,
    I64,
    F64,
}

impl ElementKind {
    /// Width of one element in bytes
    #[must_use]
    pub const fn width(self) -> usize {
        match self {
            Self::U8 | Self::I8 => 1,
            Self::U16 | Self::I16 => 2,
            Self::U32 | Self::I32 | Self::F32 => 4,
            Self::U64 | Self::I64 | Self::F64 => 8,
        }
    }
}

/// Sequence of fixed-width numeric elements
#[derive(Debug, Clone, PartialEq)]
pub enum TypedArray {
    U8(Vec<u8>),
    I8(Vec<i8>),
    U16(Vec<u16>),
    I16(Vec<i16>),
    U32(Vec<u32>),
    I32(Vec<i32>),
    F32(Vec<f32>),
    U64(Vec<u64>),
    I64(Vec<i64>),
    F64(Vec<f64>),
}

macro_rules! for_each_elements {
    ($array:expr, $v:ident => $body:expr) => {
        match $array {
            TypedArray::U8($v) => $body,
            TypedArray::I8($v) => $body,
            TypedArray::U16($v) => $body,
            TypedArray::I16($v) => $body,
            TypedArray::U32($v) => $body,
            TypedArray::I32($v) => $body,
            TypedArray::F32($v) => $body,
            TypedArray::U64($v) => $body,
            TypedArray::I64($v) => $body,
            TypedArray::F64($v) => $body,
        }
    };
}

impl TypedArray {
    /// Element type
    #[must_use]
    pub fn element_kind(&self) -> ElementKind {
        match self {
            Self::U8(_) => ElementKind::U8,
            Self::I8(_) => ElementKind::I8,
            Self::U16(_) => ElementKind::U16,
            Self::I16(_) => ElementKind::I16,
            Self::U32(_) => ElementKind::U32,
            Self::I32(_) => ElementKind::I32,
            Self::F32(_) => ElementKind::F32,
            Self::U64(_) => ElementKind::U64,
            Self::I64(_) => ElementKind::I64,
            Self::F64(_) => ElementKind::F64,
        }
    }

    /// Width of one element in bytes
    #[must_use]
    pub fn element_width(&self) -> usize {
        self.element_kind().width()
    }

    /// Element count
    #[must_use]
    pub fn len(&self) -> usize {
        for_each_elements!(self, v => v.len())
    }

    /// Check if empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Byte length (`len * element_width`)
    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.len() * self.element_width()
    }

    /// Native-endian byte layout of the elements
    ///
    /// `U8` arrays hand over their allocation.
    #[must_use]
    pub fn into_bytes(self) -> Bytes {
        match self {
            Self::U8(v) => Bytes::from(v),
            other => {
                let mut out = Vec::with_capacity(other.byte_len());
                for_each_elements!(&other, v => {
                    for x in v {
                        out.extend_from_slice(&x.to_ne_bytes());
                    }
                });
                Bytes::from(out)
            }
        }
    }

    /// Element values as JSON (non-finite floats become `null`)
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let items = match self {
            Self::F32(v) => v.iter().map(|x| float_json(f64::from(*x))).collect(),
            Self::F64(v) => v.iter().map(|x| float_json(*x)).collect(),
            Self::U8(v) => v.iter().map(|x| serde_json::Value::from(*x)).collect(),
            Self::I8(v) => v.iter().map(|x| serde_json::Value::from(*x)).collect(),
            Self::U16(v) => v.iter().map(|x| serde_json::Value::from(*x)).collect(),
            Self::I16(v) => v.iter().map(|x| serde_json::Value::from(*x)).collect(),
            Self::U32(v) => v.iter().map(|x| serde_json::Value::from(*x)).collect(),
            Self::I32(v) => v.iter().map(|x| serde_json::Value::from(*x)).collect(),
            Self::U64(v) => v.iter().map(|x| serde_json::Value::from(*x)).collect(),
            Self::I64(v) => v.iter().map(|x| serde_json::Value::from(*x)).collect(),
        };
        serde_json::Value::Array(items)
    }
}

/// Largest magnitude at which every integral `f64` is exact (2^53)
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

/// JSON number matching [`Scalar::render`]: integral floats become integers,
/// `-0.0` becomes `0`, non-finite values become `null`
#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
fn float_json(x: f64) -> serde_json::Value {
    if x.is_finite() && x.fract() == 0.0 && x.abs() <= MAX_EXACT_INT {
        return serde_json::Value::from(x as i64);
    }
    serde_json::Number::from_f64(x).map_or(serde_json::Value::Null, serde_json::Value::Number)
}

/// Number or boolean
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
}

impl Scalar {
    /// Canonical text rendering
    ///
    /// Integral floats drop the fractional part, `-0.0` renders as `0`,
    /// non-finite floats render as `NaN` / `Infinity` / `-Infinity`.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn render(&self) -> String {
        match *self {
            Self::Bool(b) => b.to_string(),
            Self::Int(i) => i.to_string(),
            Self::UInt(u) => u.to_string(),
            Self::Float(f) if f.is_nan() => "NaN".to_string(),
            Self::Float(f) if f.is_infinite() => {
                let sign = if f > 0.0 { "" } else { "-" };
                format!("{sign}Infinity")
            }
            Self::Float(f) if f == 0.0 => "0".to_string(),
            Self::Float(f) => f.to_string(),
        }
    }

    /// JSON rendering (non-finite floats become `null`)
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match *self {
            Self::Bool(b) => serde_json::Value::Bool(b),
            Self::Int(i) => serde_json::Value::from(i),
            Self::UInt(u) => serde_json::Value::from(u),
            Self::Float(f) => float_json(f),
        }
    }
}

/// Opaque unique token with an optional description
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Token {
    description: Option<String>,
}

impl Token {
    /// Token with a description
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
        }
    }

    /// Token without a description
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// `Symbol(<description>)`
    #[must_use]
    pub fn render(&self) -> String {
        format!("Symbol({})", self.description.as_deref().unwrap_or(""))
    }
}

/// Shape of a structured value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ObjectKind {
    /// Named fields, rendered as a JSON object
    #[default]
    Record,
    /// Index-keyed items, rendered as a JSON array
    Sequence,
}

/// Composite value read field by field
///
/// Every read returns a `Result` so a hostile value can fail any single
/// access without taking down the traversal. Object identity for cycle
/// detection is the address of the `Arc` allocation.
pub trait Structured: fmt::Debug + Send + Sync {
    /// Tag used in the placeholder rendering
    fn type_tag(&self) -> &str {
        "Object"
    }

    /// Record or sequence
    fn kind(&self) -> ObjectKind {
        ObjectKind::Record
    }

    /// Field names in serialization order (indices for sequences)
    ///
    /// # Errors
    /// Returns the raised error if enumeration fails
    fn keys(&self) -> Result<Vec<String>, AccessError>;

    /// Read one field
    ///
    /// # Errors
    /// Returns the raised error if the read fails
    fn get(&self, key: &str) -> Result<Value, AccessError>;

    /// Custom serialization override
    ///
    /// `None` means no override; the value is traversed structurally.
    fn to_json(&self) -> Option<Result<Value, AccessError>> {
        None
    }
}

/// Ordered named fields
///
/// Fields can be inserted through a shared reference, which is what allows
/// a record to contain itself.
#[derive(Debug, Default)]
pub struct Record {
    tag: Option<String>,
    fields: RwLock<Vec<(String, Value)>>,
}

impl Record {
    /// Empty record
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty record with a custom type tag
    pub fn with_tag(tag: impl Into<String>) -> Self {
        Self {
            tag: Some(tag.into()),
            fields: RwLock::new(Vec::new()),
        }
    }

    /// Builder-style insert
    #[must_use]
    pub fn field(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a field, keeping first-insertion order
    pub fn insert(&self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        let mut fields = self.fields.write();
        if let Some(slot) = fields.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            fields.push((key, value));
        }
    }

    /// Field count
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.read().len()
    }

    /// Check if empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.read().is_empty()
    }
}

impl Structured for Record {
    fn type_tag(&self) -> &str {
        self.tag.as_deref().unwrap_or("Object")
    }

    fn keys(&self) -> Result<Vec<String>, AccessError> {
        Ok(self.fields.read().iter().map(|(k, _)| k.clone()).collect())
    }

    fn get(&self, key: &str) -> Result<Value, AccessError> {
        self.fields
            .read()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
            .ok_or_else(|| AccessError::new(format!("no such field: {key}")))
    }
}

/// Ordered items
#[derive(Debug, Default)]
pub struct Sequence {
    items: RwLock<Vec<Value>>,
}

impl Sequence {
    /// Empty sequence
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item
    pub fn push(&self, value: impl Into<Value>) {
        self.items.write().push(value.into());
    }

    /// Item count
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    /// Check if empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}

impl FromIterator<Value> for Sequence {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self {
            items: RwLock::new(iter.into_iter().collect()),
        }
    }
}

impl Structured for Sequence {
    fn type_tag(&self) -> &str {
        "Array"
    }

    fn kind(&self) -> ObjectKind {
        ObjectKind::Sequence
    }

    fn keys(&self) -> Result<Vec<String>, AccessError> {
        Ok((0..self.items.read().len()).map(|i| i.to_string()).collect())
    }

    fn get(&self, key: &str) -> Result<Value, AccessError> {
        let index: usize = key
            .parse()
            .map_err(|_| AccessError::new(format!("invalid index: {key}")))?;
        self.items
            .read()
            .get(index)
            .cloned()
            .ok_or_else(|| AccessError::new(format!("index out of range: {index}")))
    }
}

impl From<Vec<u8>> for Value {
    fn from(data: Vec<u8>) -> Self {
        Self::Bytes(Bytes::from(data))
    }
}

impl From<&[u8]> for Value {
    fn from(data: &[u8]) -> Self {
        Self::Bytes(Bytes::copy_from_slice(data))
    }
}

impl From<Bytes> for Value {
    fn from(data: Bytes) -> Self {
        Self::Bytes(data)
    }
}

impl From<RawMemory> for Value {
    fn from(memory: RawMemory) -> Self {
        Self::Memory(memory)
    }
}

impl From<TypedArray> for Value {
    fn from(array: TypedArray) -> Self {
        Self::TypedArray(array)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<Scalar> for Value {
    fn from(scalar: Scalar) -> Self {
        Self::Scalar(scalar)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Scalar(Scalar::Bool(b))
    }
}

macro_rules! scalar_from {
    ($variant:ident as $target:ty: $($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(n: $t) -> Self {
                    Self::Scalar(Scalar::$variant(<$target>::from(n)))
                }
            }
        )*
    };
}

scalar_from!(Int as i64: i8, i16, i32, i64);
scalar_from!(UInt as u64: u8, u16, u32, u64);
scalar_from!(Float as f64: f32, f64);

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Self::Scalar(u64::try_from(n).map_or(Scalar::UInt(u64::MAX), Scalar::UInt))
    }
}

impl From<isize> for Value {
    fn from(n: isize) -> Self {
        let clamped = i64::try_from(n).unwrap_or(if n < 0 { i64::MIN } else { i64::MAX });
        Self::Scalar(Scalar::Int(clamped))
    }
}

impl From<Token> for Value {
    fn from(token: Token) -> Self {
        Self::Token(token)
    }
}

impl From<Arc<dyn Structured>> for Value {
    fn from(object: Arc<dyn Structured>) -> Self {
        Self::Object(object)
    }
}

impl From<Arc<Record>> for Value {
    fn from(record: Arc<Record>) -> Self {
        Self::Object(record)
    }
}

impl From<Arc<Sequence>> for Value {
    fn from(sequence: Arc<Sequence>) -> Self {
        Self::Object(sequence)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Into::into)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Absent,
            serde_json::Value::Bool(b) => b.into(),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    i.into()
                } else if let Some(u) = n.as_u64() {
                    u.into()
                } else {
                    n.as_f64().map_or(Self::Absent, Into::into)
                }
            }
            serde_json::Value::String(s) => Self::Text(s),
            serde_json::Value::Array(items) => {
                Self::object(items.into_iter().map(Self::from).collect::<Sequence>())
            }
            serde_json::Value::Object(map) => {
                let record = Record::new();
                for (k, v) in map {
                    record.insert(k, Self::from(v));
                }
                Self::object(record)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_array_byte_len() {
        let array = TypedArray::U32(vec![1, 2, 3]);
        assert_eq!(array.len(), 3);
        assert_eq!(array.element_width(), 4);
        assert_eq!(array.byte_len(), 12);
        assert_eq!(array.into_bytes().len(), 12);
    }

    #[test]
    fn typed_array_native_order() {
        let bytes = TypedArray::U16(vec![0x0102]).into_bytes();
        assert_eq!(&bytes[..], &0x0102u16.to_ne_bytes());

        let bytes = TypedArray::F64(vec![1.5]).into_bytes();
        assert_eq!(&bytes[..], &1.5f64.to_ne_bytes());
    }

    #[test]
    fn typed_array_json_elements() {
        let json = TypedArray::F32(vec![1.0, 0.5, f32::NAN]).to_json();
        assert_eq!(json, serde_json::json!([1, 0.5, null]));
        let json = TypedArray::I8(vec![-1, 2]).to_json();
        assert_eq!(json, serde_json::json!([-1, 2]));
    }

    #[test]
    fn scalar_render() {
        assert_eq!(Scalar::Bool(true).render(), "true");
        assert_eq!(Scalar::Bool(false).render(), "false");
        assert_eq!(Scalar::Int(-42).render(), "-42");
        assert_eq!(Scalar::UInt(u64::MAX).render(), "18446744073709551615");
        assert_eq!(Scalar::Float(1.0).render(), "1");
        assert_eq!(Scalar::Float(0.1).render(), "0.1");
        assert_eq!(Scalar::Float(-0.0).render(), "0");
        assert_eq!(Scalar::Float(f64::NAN).render(), "NaN");
        assert_eq!(Scalar::Float(f64::INFINITY).render(), "Infinity");
        assert_eq!(Scalar::Float(f64::NEG_INFINITY).render(), "-Infinity");
    }

    #[test]
    fn scalar_json_matches_render() {
        assert_eq!(Scalar::Float(2.0).to_json(), serde_json::json!(2));
        assert_eq!(Scalar::Float(-0.0).to_json(), serde_json::json!(0));
        assert_eq!(Scalar::Float(1.5).to_json(), serde_json::json!(1.5));
        assert_eq!(Scalar::Float(1e300).to_json(), serde_json::json!(1e300));
        assert_eq!(Scalar::Float(f64::INFINITY).to_json(), serde_json::Value::Null);
        assert_eq!(Scalar::Float(2.0).to_json().to_string(), Scalar::Float(2.0).render());
    }

    #[test]
    fn platform_and_byte_integers_convert() {
        assert!(matches!(Value::from(5u8), Value::Scalar(Scalar::UInt(5))));
        assert!(matches!(Value::from(7usize), Value::Scalar(Scalar::UInt(7))));
        assert!(matches!(Value::from(-3isize), Value::Scalar(Scalar::Int(-3))));
    }

    #[test]
    fn token_render() {
        assert_eq!(Token::new("job").render(), "Symbol(job)");
        assert_eq!(Token::anonymous().render(), "Symbol()");
    }

    #[test]
    fn record_insert_replaces_in_place() {
        let record = Record::new().field("a", 1).field("b", 2);
        record.insert("a", 3);
        assert_eq!(record.keys().unwrap(), vec!["a", "b"]);
        assert!(matches!(record.get("a"), Ok(Value::Scalar(Scalar::Int(3)))));
        assert!(record.get("missing").is_err());
    }

    #[test]
    fn sequence_index_access() {
        let seq: Sequence = vec![Value::from("x"), Value::Absent].into_iter().collect();
        assert_eq!(seq.kind(), ObjectKind::Sequence);
        assert_eq!(seq.keys().unwrap(), vec!["0", "1"]);
        assert!(matches!(seq.get("1"), Ok(Value::Absent)));
        assert!(seq.get("2").is_err());
        assert!(seq.get("x").is_err());
    }

    #[test]
    fn option_maps_to_absent() {
        assert!(Value::from(None::<bool>).is_absent());
        assert_eq!(Value::from(Some(true)).kind(), ValueKind::Scalar);
    }

    #[test]
    fn json_conversion() {
        let value = Value::from(serde_json::json!({"a": [1, "two"], "b": null}));
        let Value::Object(obj) = value else {
            panic!("expected object");
        };
        assert_eq!(obj.keys().unwrap(), vec!["a", "b"]);
        assert!(matches!(obj.get("b"), Ok(Value::Absent)));
        assert!(matches!(obj.get("a"), Ok(Value::Object(_))));
    }
}
