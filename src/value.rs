//! Value Module
//!
//! Values are either text or opaque bytes, and callers get back the variant
//! they stored.
//!
//! ## JSON Shape
//! ```text
//! Text("hi")          →  "hi"
//! Bytes([104, 105])   →  {"type":"Buffer","data":[104,105]}
//! ```
//! The buffer-object shape is what earlier versions of the store wrote for
//! binary values, so files written by them stay readable.

use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// A stored value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ValueRepr", into = "ValueRepr")]
pub enum Value {
    /// UTF-8 text
    Text(String),

    /// Opaque bytes
    Bytes(Bytes),
}

/// Which variant a value is, without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Text,
    Binary,
}

impl Value {
    /// Get the variant of this value
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Text(_) => ValueKind::Text,
            Value::Bytes(_) => ValueKind::Binary,
        }
    }

    /// Whether this is a bytes value
    pub fn is_binary(&self) -> bool {
        matches!(self, Value::Bytes(_))
    }

    /// Get the text, if this is a text value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            Value::Bytes(_) => None,
        }
    }

    /// Raw bytes of either variant (UTF-8 for text)
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Value::Text(s) => s.as_bytes(),
            Value::Bytes(b) => b,
        }
    }

    /// Consume the value into its raw bytes (UTF-8 for text)
    pub fn into_bytes(self) -> Bytes {
        match self {
            Value::Text(s) => Bytes::from(s.into_bytes()),
            Value::Bytes(b) => b,
        }
    }

    /// Length of the raw payload in bytes
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// Whether the raw payload is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Bytes(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Value::Bytes(Bytes::copy_from_slice(b))
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(Bytes::from(b))
    }
}

impl From<Bytes> for Value {
    fn from(b: Bytes) -> Self {
        Value::Bytes(b)
    }
}

// =============================================================================
// JSON Representation
// =============================================================================

/// Wire form of a [`Value`]
#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum ValueRepr {
    Text(String),
    Buffer(BufferObject),
}

/// `{"type":"Buffer","data":[...]}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct BufferObject {
    #[serde(rename = "type")]
    pub(crate) tag: BufferTag,
    pub(crate) data: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) enum BufferTag {
    Buffer,
}

impl BufferObject {
    pub(crate) fn new(data: Vec<u8>) -> Self {
        Self {
            tag: BufferTag::Buffer,
            data,
        }
    }
}

impl From<ValueRepr> for Value {
    fn from(repr: ValueRepr) -> Self {
        match repr {
            ValueRepr::Text(s) => Value::Text(s),
            ValueRepr::Buffer(buf) => Value::Bytes(Bytes::from(buf.data)),
        }
    }
}

impl From<Value> for ValueRepr {
    fn from(value: Value) -> Self {
        match value {
            Value::Text(s) => ValueRepr::Text(s),
            Value::Bytes(b) => ValueRepr::Buffer(BufferObject::new(b.to_vec())),
        }
    }
}
