//! Compressed record
//!
//! A deflated value plus the tag saying whether it started out as bytes.
//! The tag is needed because deflate output looks the same for both.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use bytes::Bytes;
use serde::{Serialize, Serializer};

use crate::codec;
use crate::error::{EmError, Result};
use crate::value::Value;

/// Per-value entry of the compressed JSON store
///
/// Serializes as `{"data":"<base64>","isBuffer":<bool>}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompressedRecord {
    #[serde(serialize_with = "serialize_base64")]
    data: Vec<u8>,

    #[serde(rename = "isBuffer")]
    is_buffer: bool,
}

impl CompressedRecord {
    /// Deflate a value and tag it with its variant
    pub fn compress(value: &Value) -> Result<Self> {
        Ok(Self {
            data: codec::deflate(value.as_bytes())?,
            is_buffer: value.is_binary(),
        })
    }

    /// Wrap an already-deflated payload
    pub(crate) fn from_compressed(data: Vec<u8>, is_buffer: bool) -> Self {
        Self { data, is_buffer }
    }

    /// Inflate and restore the original variant
    pub fn decompress(&self) -> Result<Value> {
        let raw = codec::inflate(&self.data)?;
        if self.is_buffer {
            return Ok(Value::Bytes(Bytes::from(raw)));
        }
        String::from_utf8(raw)
            .map(Value::Text)
            .map_err(|e| EmError::Format(format!("Text record is not valid UTF-8: {}", e)))
    }

    /// The deflated payload
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn is_buffer(&self) -> bool {
        self.is_buffer
    }
}

fn serialize_base64<S: Serializer>(data: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&BASE64.encode(data))
}

/// Decode the base64 text form of `data`
pub(crate) fn decode_base64(text: &str) -> Result<Vec<u8>> {
    BASE64
        .decode(text)
        .map_err(|e| EmError::Format(format!("Invalid base64 payload: {}", e)))
}
