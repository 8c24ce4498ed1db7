//! Store Module
//!
//! The orchestrator that owns one adapter and decides when it syncs.
//!
//! ## Responsibilities
//! - Build the adapter selected in [`Options`]
//! - Route put/get straight to the adapter's in-memory store
//! - Sync on construction, on a timer, on close and on the exit signal
//!
//! ## Lifecycle
//! ```text
//!  new() ──▶ Constructed ──open()──▶ Opened
//!                 │                    │
//!                 └──close()──▶ Closed ◀┘
//! ```

use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, Sender};
use parking_lot::Mutex;

use crate::adapter::{self, Adapter, AdapterKind, TypeFidelity};
use crate::config::Options;
use crate::error::{EmError, Result};
use crate::lifecycle::{ExitSignal, SubscriptionId};
use crate::value::Value;

/// Lifecycle state of a store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Constructed,
    Opened,
    Closed,
}

/// An embedded key-value store
///
/// ## Concurrency Model: one adapter, one lock
///
/// - The adapter sits behind a single `Mutex`
/// - `sync()` holds it for the whole flush or load, so at most one sync
///   touches the store at a time; the timer, `close()` and the exit signal
///   all go through the same entry point
/// - put/get wait for an in-flight sync instead of racing it
///
/// Two stores pointed at the same path are not coordinated; the last sync
/// wins.
///
/// Dropping a store without `close()` performs the same final sync, logging
/// any error instead of returning it.
pub struct EmDb {
    shared: Arc<Shared>,

    /// Running recurring sync, present while `Opened`
    ticker: Option<SyncTicker>,

    exit: Arc<ExitSignal>,

    /// Final-sync hook, removed again on close
    exit_hook: Option<SubscriptionId>,
}

/// State reachable from the ticker thread and the exit hook
struct Shared {
    path: PathBuf,
    options: Options,
    adapter: Mutex<Box<dyn Adapter>>,
    state: Mutex<State>,
}

impl EmDb {
    /// Create a store subscribed to the process-wide exit signal
    ///
    /// On construction:
    /// 1. Build the adapter for `options.adapter`
    /// 2. Sync once (load or flush, see [`EmDb::sync`])
    /// 3. Subscribe to the exit signal for a final sync
    pub fn new(path: impl AsRef<Path>, options: Options) -> Result<Self> {
        Self::with_exit_signal(path, options, ExitSignal::global())
    }

    /// Create a store subscribed to the given exit signal
    pub fn with_exit_signal(path: impl AsRef<Path>, options: Options, exit: Arc<ExitSignal>) -> Result<Self> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(EmError::Config("store path must not be empty".to_string()));
        }

        // Step 1: Build the adapter
        let adapter = adapter::open(options.adapter, path)?;

        match adapter.type_fidelity() {
            TypeFidelity::Exact => {}
            fidelity => tracing::warn!(
                adapter = %options.adapter,
                ?fidelity,
                "Adapter does not preserve the text/binary distinction of values"
            ),
        }

        let shared = Arc::new(Shared {
            path: path.to_path_buf(),
            options,
            adapter: Mutex::new(adapter),
            state: Mutex::new(State::Constructed),
        });

        // Step 2: Initial sync
        shared.sync()?;

        // Step 3: Final sync on exit; the hook must not keep the store alive
        let hook: Weak<Shared> = Arc::downgrade(&shared);
        let exit_hook = exit.subscribe(move || {
            if let Some(shared) = hook.upgrade() {
                shared.sync_on_exit();
            }
        });
        if exit_hook.is_none() {
            tracing::debug!(path = %path.display(), "Exit signal already fired, no final sync scheduled");
        }

        Ok(Self {
            shared,
            ticker: None,
            exit,
            exit_hook,
        })
    }

    /// Start syncing every `options.sync_interval`
    pub fn open(&mut self) -> Result<()> {
        self.shared.log_op("open", None);

        let mut state = self.shared.state.lock();
        if *state != State::Constructed {
            return Err(EmError::State(format!("cannot open a store that is {:?}", *state)));
        }

        let interval = self.shared.options.sync_interval;
        if interval.is_zero() {
            return Err(EmError::Config("sync interval must be greater than zero".to_string()));
        }

        self.ticker = Some(SyncTicker::spawn(Arc::clone(&self.shared), interval)?);
        *state = State::Opened;
        Ok(())
    }

    /// Store a value
    pub fn put(&self, key: &str, value: impl Into<Value>) -> Result<()> {
        self.shared.log_op("put", Some(key));
        self.shared.adapter.lock().put(key, value.into())
    }

    /// Read a value; `Ok(None)` if absent
    pub fn get(&self, key: &str) -> Result<Option<Value>> {
        self.shared.log_op("get", Some(key));
        self.shared.adapter.lock().get(key)
    }

    /// Reconcile memory with disk
    ///
    /// Loads from disk when the store is empty, something exists at the
    /// path and `append_mode` is on. Otherwise flushes memory, overwriting
    /// what was persisted.
    pub fn sync(&self) -> Result<()> {
        self.shared.sync()
    }

    pub fn keys(&self) -> Result<Vec<String>> {
        self.shared.adapter.lock().keys()
    }

    /// Number of distinct keys
    pub fn size(&self) -> Result<usize> {
        self.shared.adapter.lock().size()
    }

    /// Stop the recurring sync and sync one last time
    pub fn close(mut self) -> Result<()> {
        self.shutdown()
    }

    /// Shared by `close()` and `Drop`; a no-op once `Closed`
    fn shutdown(&mut self) -> Result<()> {
        if self.state() == State::Closed {
            return Ok(());
        }
        self.shared.log_op("close", None);

        if let Some(id) = self.exit_hook.take() {
            self.exit.unsubscribe(id);
        }
        // Stop the ticker first so the final sync is the last write
        drop(self.ticker.take());
        *self.shared.state.lock() = State::Closed;

        self.shared.sync()
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn path(&self) -> &Path {
        &self.shared.path
    }

    pub fn options(&self) -> &Options {
        &self.shared.options
    }

    pub fn state(&self) -> State {
        *self.shared.state.lock()
    }

    pub fn adapter_kind(&self) -> AdapterKind {
        self.shared.options.adapter
    }

    pub fn type_fidelity(&self) -> TypeFidelity {
        self.shared.adapter.lock().type_fidelity()
    }
}

impl Drop for EmDb {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            tracing::error!(path = %self.shared.path.display(), error = %e, "Final sync on drop failed");
        }
    }
}

impl Shared {
    fn sync(&self) -> Result<()> {
        self.log_op("sync", None);

        let mut adapter = self.adapter.lock();
        if adapter.size()? == 0 && self.path.exists() && self.options.append_mode {
            tracing::debug!(path = %self.path.display(), "Sync: loading persisted store");
            adapter.deserialize_store()
        } else {
            tracing::debug!(path = %self.path.display(), "Sync: flushing store");
            adapter.serialize_store()
        }
    }

    /// Exit hook; `close()` already wrote the last sync of a closed store
    fn sync_on_exit(&self) {
        if *self.state.lock() == State::Closed {
            return;
        }
        if let Err(e) = self.sync() {
            tracing::error!(path = %self.path.display(), error = %e, "Final sync on exit failed");
        }
    }

    fn log_op(&self, op: &'static str, key: Option<&str>) {
        let path = self.path.display();
        if self.options.verbose {
            tracing::info!(%path, op, key, "EmDb operation");
        } else {
            tracing::trace!(%path, op, key, "EmDb operation");
        }
    }
}

// =============================================================================
// Recurring Sync
// =============================================================================

/// Background thread calling `sync()` on a fixed interval
///
/// Dropping it stops the thread and waits for an in-flight sync to finish.
struct SyncTicker {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl SyncTicker {
    fn spawn(shared: Arc<Shared>, interval: Duration) -> Result<Self> {
        let (stop_tx, stop_rx) = channel::bounded::<()>(0);
        let ticks = channel::tick(interval);

        let handle = thread::Builder::new()
            .name("emdb-sync".to_string())
            .spawn(move || loop {
                crossbeam::select! {
                    recv(ticks) -> _ => {
                        if let Err(e) = shared.sync() {
                            tracing::error!(path = %shared.path.display(), error = %e, "Periodic sync failed");
                        }
                    }
                    // Sender dropped
                    recv(stop_rx) -> _ => break,
                }
            })?;

        Ok(Self {
            stop: Some(stop_tx),
            handle: Some(handle),
        })
    }
}

impl Drop for SyncTicker {
    fn drop(&mut self) {
        drop(self.stop.take());
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("Sync thread panicked");
            }
        }
    }
}
