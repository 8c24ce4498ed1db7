//! Adapter Module
//!
//! Pluggable persistence strategies behind one capability trait.
//!
//! ## Responsibilities
//! - Own the in-memory store (or the directory standing in for it)
//! - Flush the store to disk and load it back
//! - Keep text and binary values apart where the format allows it
//!
//! ## Variants
//! ```text
//! ┌─────────────────────┬──────────────────────┬──────────────────────┐
//! │ Kind                │ On disk              │ Type fidelity        │
//! ├─────────────────────┼──────────────────────┼──────────────────────┤
//! │ Json                │ one JSON file        │ exact                │
//! │ CompressedJson      │ one deflated file    │ exact (tagged)       │
//! │ FlatFile            │ dir, file per key    │ until restart        │
//! │ CompressedFlatFile  │ dir, deflated files  │ always bytes         │
//! └─────────────────────┴──────────────────────┴──────────────────────┘
//! ```

mod compressed;
mod flat_file;
mod plain;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{EmError, Result};
use crate::value::Value;

pub use compressed::{CompressedAdapter, CompressedRecord};
pub use flat_file::{CompressedFlatFileAdapter, FlatFileAdapter};
pub use plain::PlainAdapter;

/// Capability contract every persistence strategy implements
pub trait Adapter: Send {
    /// Which strategy this is
    fn kind(&self) -> AdapterKind;

    /// Store a value under `key`
    ///
    /// Only the file-per-key adapters touch the disk here.
    fn put(&mut self, key: &str, value: Value) -> Result<()>;

    /// Read a value; `Ok(None)` if the key was never put
    fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Flush the whole store, overwriting whatever was persisted before
    fn serialize_store(&self) -> Result<()>;

    /// Replace the whole in-memory store with what is on disk
    ///
    /// A missing or unreadable file is an error, never an empty store.
    fn deserialize_store(&mut self) -> Result<()>;

    /// All keys, in no particular order
    fn keys(&self) -> Result<Vec<String>>;

    /// Number of distinct keys
    fn size(&self) -> Result<usize>;

    /// How faithfully the text/binary distinction survives
    fn type_fidelity(&self) -> TypeFidelity {
        TypeFidelity::Exact
    }
}

/// Selects the persistence strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AdapterKind {
    /// Whole store as plain JSON
    Json,

    /// Whole store as deflated JSON with per-value compression
    #[default]
    CompressedJson,

    /// Directory with one raw file per key
    FlatFile,

    /// Directory with one deflated file per key
    CompressedFlatFile,
}

impl AdapterKind {
    /// Every kind, in declaration order
    pub const ALL: [AdapterKind; 4] = [
        AdapterKind::Json,
        AdapterKind::CompressedJson,
        AdapterKind::FlatFile,
        AdapterKind::CompressedFlatFile,
    ];

    /// Name accepted by `FromStr` and printed by `Display`
    pub fn name(&self) -> &'static str {
        match self {
            AdapterKind::Json => "json",
            AdapterKind::CompressedJson => "compressed-json",
            AdapterKind::FlatFile => "file",
            AdapterKind::CompressedFlatFile => "compressed-file",
        }
    }
}

impl fmt::Display for AdapterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AdapterKind {
    type Err = EmError;

    fn from_str(s: &str) -> Result<Self> {
        AdapterKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| {
                EmError::Config(format!(
                    "Unknown adapter '{}', expected one of: json, compressed-json, file, compressed-file",
                    s
                ))
            })
    }
}

/// How much type information an adapter keeps
///
/// Anything short of `Exact` is a known format limitation, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeFidelity {
    /// Text and bytes always come back as they went in
    Exact,

    /// Types are remembered in memory only; after a restart values read back as bytes
    SessionOnly,

    /// Every value reads back as bytes
    BytesOnly,
}

/// Build the adapter for `kind` rooted at `path`
pub fn open(kind: AdapterKind, path: &Path) -> Result<Box<dyn Adapter>> {
    let adapter: Box<dyn Adapter> = match kind {
        AdapterKind::Json => Box::new(PlainAdapter::new(path)),
        AdapterKind::CompressedJson => Box::new(CompressedAdapter::new(path)),
        AdapterKind::FlatFile => Box::new(FlatFileAdapter::open(path)?),
        AdapterKind::CompressedFlatFile => Box::new(CompressedFlatFileAdapter::open(path)?),
    };
    Ok(adapter)
}

/// Keys must be non-empty
pub(crate) fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(EmError::InvalidKey("key must not be empty".to_string()));
    }
    Ok(())
}
