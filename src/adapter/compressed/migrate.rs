//! Entry shapes of the compressed JSON format
//!
//! Every entry read from disk is matched against the shapes written by each
//! format revision and upgraded to a [`CompressedRecord`].
//!
//! ```text
//! rev 2 (current)  {"data": <payload>, "isBuffer": bool}
//! rev 1            {"type":"Buffer","data":[..]} | [..]   deflated, untagged
//! rev 0            "plain text"                           not compressed
//! ```
//!
//! `<payload>` is base64 text when written by this crate; byte arrays and
//! buffer objects are accepted too. A new revision adds a variant here and
//! keeps every existing one.

use serde::Deserialize;

use crate::codec;
use crate::error::{EmError, Result};
use crate::value::BufferObject;

use super::record::{decode_base64, CompressedRecord};

/// A decoded entry, classified by the revision that wrote it
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum StoredEntry {
    /// Already the current two-field shape
    Current(CurrentEntry),

    /// Bare deflated buffer, no type tag
    LegacyBinary(BufferLike),

    /// Bare uncompressed string
    LegacyText(String),
}

#[derive(Debug, Deserialize)]
pub(crate) struct CurrentEntry {
    data: Payload,

    #[serde(rename = "isBuffer")]
    is_buffer: bool,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Payload {
    Base64(String),
    Buffer(BufferLike),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum BufferLike {
    Object(BufferObject),
    Array(Vec<u8>),
}

impl BufferLike {
    fn into_vec(self) -> Vec<u8> {
        match self {
            BufferLike::Object(obj) => obj.data,
            BufferLike::Array(bytes) => bytes,
        }
    }
}

impl StoredEntry {
    /// Classify one decoded JSON value
    pub(crate) fn classify(value: serde_json::Value) -> Result<Self> {
        StoredEntry::deserialize(value)
            .map_err(|e| EmError::Format(format!("entry matches no known format revision: {}", e)))
    }

    /// Upgrade to the current record shape
    pub(crate) fn into_record(self) -> Result<CompressedRecord> {
        match self {
            StoredEntry::Current(entry) => {
                let data = match entry.data {
                    Payload::Base64(text) => decode_base64(&text)?,
                    Payload::Buffer(buf) => buf.into_vec(),
                };
                Ok(CompressedRecord::from_compressed(data, entry.is_buffer))
            }
            StoredEntry::LegacyBinary(buf) => Ok(CompressedRecord::from_compressed(buf.into_vec(), true)),
            StoredEntry::LegacyText(text) => {
                Ok(CompressedRecord::from_compressed(codec::deflate(text.as_bytes())?, false))
            }
        }
    }

    pub(crate) fn is_legacy(&self) -> bool {
        !matches!(self, StoredEntry::Current(_))
    }
}
