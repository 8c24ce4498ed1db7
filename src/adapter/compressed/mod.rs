//! Compressed JSON adapter
//!
//! ## File Format
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ zlib( JSON {                                             │
//! │   "<key>": {"data": base64(zlib(value)), "isBuffer": b}, │
//! │   ...                                                    │
//! │ } )                                                      │
//! └──────────────────────────────────────────────────────────┘
//! ```
//! Two compression layers: each value, then the whole document.
//! Loading accepts every earlier revision of the entry shape, see
//! [`migrate`].

mod migrate;
mod record;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::codec;
use crate::error::{EmError, Result};
use crate::value::Value;

use super::{validate_key, Adapter, AdapterKind};
use migrate::StoredEntry;

pub use record::CompressedRecord;

/// Whole-store compressed JSON with per-value compression and type tags
pub struct CompressedAdapter {
    path: PathBuf,
    store: BTreeMap<String, CompressedRecord>,
}

impl CompressedAdapter {
    /// Create an empty adapter; nothing is read until `deserialize_store`
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            store: BTreeMap::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The stored record for `key`, still compressed
    pub fn record(&self, key: &str) -> Option<&CompressedRecord> {
        self.store.get(key)
    }

    /// Decode a whole document, upgrading entries of older revisions
    ///
    /// Returns the store and the number of entries that needed migrating.
    fn decode_document(&self, raw: &[u8]) -> Result<(BTreeMap<String, CompressedRecord>, usize)> {
        let json = codec::inflate(raw)
            .map_err(|e| EmError::Format(format!("{}: {}", self.path.display(), e)))?;

        let entries: BTreeMap<String, serde_json::Value> = serde_json::from_slice(&json)
            .map_err(|e| EmError::Format(format!("{}: invalid store JSON: {}", self.path.display(), e)))?;

        let mut store = BTreeMap::new();
        let mut migrated = 0;

        for (key, value) in entries {
            let record = StoredEntry::classify(value)
                .and_then(|entry| {
                    if entry.is_legacy() {
                        migrated += 1;
                    }
                    entry.into_record()
                })
                .map_err(|e| EmError::Format(format!("{}: key '{}': {}", self.path.display(), key, e)))?;
            store.insert(key, record);
        }

        Ok((store, migrated))
    }
}

impl Adapter for CompressedAdapter {
    fn kind(&self) -> AdapterKind {
        AdapterKind::CompressedJson
    }

    fn put(&mut self, key: &str, value: Value) -> Result<()> {
        validate_key(key)?;
        let record = CompressedRecord::compress(&value)?;
        self.store.insert(key.to_string(), record);
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Value>> {
        self.store.get(key).map(CompressedRecord::decompress).transpose()
    }

    fn serialize_store(&self) -> Result<()> {
        let json = serde_json::to_vec(&self.store)
            .map_err(|e| EmError::Format(format!("JSON encode failed: {}", e)))?;
        let compressed = codec::deflate(&json)?;
        fs::write(&self.path, compressed)?;
        Ok(())
    }

    fn deserialize_store(&mut self) -> Result<()> {
        let raw = fs::read(&self.path)?;
        let (store, migrated) = self.decode_document(&raw)?;

        if migrated > 0 {
            tracing::info!(
                path = %self.path.display(),
                migrated,
                "Upgraded entries from an earlier format revision"
            );
        }
        tracing::debug!(path = %self.path.display(), entries = store.len(), "Loaded compressed store");

        self.store = store;
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.store.keys().cloned().collect())
    }

    fn size(&self) -> Result<usize> {
        Ok(self.store.len())
    }
}
