//! File-per-key adapters
//!
//! Both adapters keep one file per key inside a directory:
//! ```text
//! {path}/
//!   ├── <key>      (raw or deflated value)
//!   └── ...
//! ```
//! The file name is the key verbatim. Keys containing path separators or
//! `..` therefore address files outside a single flat directory; callers
//! own that hazard.
//!
//! Every `put` is durable on return, so `serialize_store` and
//! `deserialize_store` have nothing to do.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use bytes::Bytes;

use crate::codec;
use crate::error::{EmError, Result};
use crate::value::{Value, ValueKind};

use super::{validate_key, Adapter, AdapterKind, TypeFidelity};

// =============================================================================
// Shared Directory Handling
// =============================================================================

/// Make sure `path` is a directory
///
/// A regular file at `path` is deleted and replaced by an empty directory.
/// The displaced file is not backed up.
fn prepare_directory(path: &Path) -> Result<()> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => {
            tracing::warn!(
                path = %path.display(),
                "Replacing regular file with a store directory, previous contents are discarded"
            );
            fs::remove_file(path)?;
            fs::create_dir_all(path)?;
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            fs::create_dir_all(path)?;
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Names of the regular files directly inside `dir`
fn list_keys(dir: &Path) -> Result<Vec<String>> {
    let mut keys = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => keys.push(name),
            Err(name) => {
                tracing::debug!(name = ?name, "Skipping non UTF-8 file name");
            }
        }
    }

    Ok(keys)
}

/// Read `{dir}/{key}`; a missing file or a non-file entry is `None`
fn read_entry(dir: &Path, key: &str) -> Result<Option<Vec<u8>>> {
    let path = dir.join(key);
    match fs::read(&path) {
        Ok(data) => Ok(Some(data)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        // Subdirectories are never keys, same as in `list_keys`
        Err(_) if !path.is_file() => Ok(None),
        Err(e) => Err(e.into()),
    }
}

// =============================================================================
// FlatFileAdapter
// =============================================================================

/// One raw file per key
///
/// Whether a value was text or bytes is remembered in memory only. After a
/// restart that knowledge is gone and values read back as bytes.
pub struct FlatFileAdapter {
    dir: PathBuf,

    /// Variant of every value put by this instance (never persisted)
    kinds: HashMap<String, ValueKind>,
}

impl FlatFileAdapter {
    /// Open the directory at `path`, creating it (or replacing a file) as needed
    pub fn open(path: &Path) -> Result<Self> {
        prepare_directory(path)?;
        Ok(Self {
            dir: path.to_path_buf(),
            kinds: HashMap::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Adapter for FlatFileAdapter {
    fn kind(&self) -> AdapterKind {
        AdapterKind::FlatFile
    }

    fn put(&mut self, key: &str, value: Value) -> Result<()> {
        validate_key(key)?;
        fs::write(self.dir.join(key), value.as_bytes())?;
        self.kinds.insert(key.to_string(), value.kind());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Value>> {
        let Some(data) = read_entry(&self.dir, key)? else {
            return Ok(None);
        };

        match self.kinds.get(key) {
            Some(ValueKind::Text) => String::from_utf8(data)
                .map(|s| Some(Value::Text(s)))
                .map_err(|e| EmError::Format(format!("key '{}': text value is not valid UTF-8: {}", key, e))),
            Some(ValueKind::Binary) | None => Ok(Some(Value::Bytes(Bytes::from(data)))),
        }
    }

    fn serialize_store(&self) -> Result<()> {
        Ok(())
    }

    fn deserialize_store(&mut self) -> Result<()> {
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        list_keys(&self.dir)
    }

    fn size(&self) -> Result<usize> {
        Ok(self.keys()?.len())
    }

    fn type_fidelity(&self) -> TypeFidelity {
        TypeFidelity::SessionOnly
    }
}

// =============================================================================
// CompressedFlatFileAdapter
// =============================================================================

/// One deflated file per key
///
/// No type tag is kept: every value reads back as bytes.
pub struct CompressedFlatFileAdapter {
    dir: PathBuf,
}

impl CompressedFlatFileAdapter {
    /// Open the directory at `path`, creating it (or replacing a file) as needed
    pub fn open(path: &Path) -> Result<Self> {
        prepare_directory(path)?;
        Ok(Self {
            dir: path.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Adapter for CompressedFlatFileAdapter {
    fn kind(&self) -> AdapterKind {
        AdapterKind::CompressedFlatFile
    }

    fn put(&mut self, key: &str, value: Value) -> Result<()> {
        validate_key(key)?;
        let compressed = codec::deflate(value.as_bytes())?;
        fs::write(self.dir.join(key), compressed)?;
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Value>> {
        let Some(data) = read_entry(&self.dir, key)? else {
            return Ok(None);
        };
        let raw = codec::inflate(&data).map_err(|e| EmError::Format(format!("key '{}': {}", key, e)))?;
        Ok(Some(Value::Bytes(Bytes::from(raw))))
    }

    fn serialize_store(&self) -> Result<()> {
        Ok(())
    }

    fn deserialize_store(&mut self) -> Result<()> {
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        list_keys(&self.dir)
    }

    fn size(&self) -> Result<usize> {
        Ok(self.keys()?.len())
    }

    fn type_fidelity(&self) -> TypeFidelity {
        TypeFidelity::BytesOnly
    }
}
