//! Plain JSON adapter
//!
//! The whole store as one JSON object: key → string, or key → buffer object
//! for binary values.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{EmError, Result};
use crate::value::Value;

use super::{validate_key, Adapter, AdapterKind};

/// Whole-store JSON file, no compression
pub struct PlainAdapter {
    path: PathBuf,

    /// Ordered so that repeated flushes of the same store are byte-identical
    store: BTreeMap<String, Value>,
}

impl PlainAdapter {
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
}

impl Adapter for PlainAdapter {
    fn kind(&self) -> AdapterKind {
        AdapterKind::Json
    }

    fn put(&mut self, key: &str, value: Value) -> Result<()> {
        validate_key(key)?;
        self.store.insert(key.to_string(), value);
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.store.get(key).cloned())
    }

    fn serialize_store(&self) -> Result<()> {
        let json = serde_json::to_vec(&self.store)
            .map_err(|e| EmError::Format(format!("JSON encode failed: {}", e)))?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    fn deserialize_store(&mut self) -> Result<()> {
        let raw = fs::read(&self.path)?;
        let store: BTreeMap<String, Value> = serde_json::from_slice(&raw).map_err(|e| {
            EmError::Format(format!("{}: invalid store JSON: {}", self.path.display(), e))
        })?;

        tracing::debug!(path = %self.path.display(), entries = store.len(), "Loaded JSON store");
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
