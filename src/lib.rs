//! # EmDB
//!
//! An embedded, single-process key-value store:
//! - In-memory map fronted by a swappable persistence adapter
//! - Plain JSON, compressed JSON, and file-per-key formats
//! - Periodic sync plus a final sync on close or process exit
//! - Compressed JSON files from earlier format revisions load transparently
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         EmDb                                │
//! │        put / get / keys / size / sync / open / close        │
//! └──────────┬───────────────────────────────┬──────────────────┘
//!            │                               │
//!            │                   ┌───────────┴───────────┐
//!            │                   │  sync triggers        │
//!            │                   │  - SyncTicker (1s)    │
//!            │                   │  - ExitSignal         │
//!            │                   └───────────┬───────────┘
//!            ▼                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    dyn Adapter (Mutex)                      │
//! ├──────────────┬────────────────┬──────────────┬──────────────┤
//! │  Json        │ CompressedJson │  FlatFile    │ Compressed-  │
//! │              │                │              │ FlatFile     │
//! └──────────────┴────────────────┴──────────────┴──────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use emdb::{AdapterKind, EmDb, Options};
//!
//! let options = Options::builder().adapter(AdapterKind::CompressedJson).build();
//! let mut db = EmDb::new("app.db", options)?;
//! db.open()?;
//! db.put("greeting", "hello")?;
//! db.put("blob", vec![0u8, 1, 2])?;
//! assert_eq!(db.get("greeting")?.unwrap().as_str(), Some("hello"));
//! db.close()?;
//! # Ok::<(), emdb::EmError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod value;
pub mod codec;
pub mod adapter;
pub mod lifecycle;
pub mod store;
pub mod timing;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use adapter::{Adapter, AdapterKind, TypeFidelity};
pub use config::Options;
pub use error::{EmError, Result};
pub use lifecycle::{ExitGuard, ExitSignal, SubscriptionId};
pub use store::{EmDb, State};
pub use value::{Value, ValueKind};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of EmDB
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
