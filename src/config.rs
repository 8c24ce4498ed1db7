//! Configuration for EmDB
//!
//! Centralized store options with sensible defaults.

use std::time::Duration;

use crate::adapter::AdapterKind;

/// Options for one store instance
#[derive(Debug, Clone)]
pub struct Options {
    // -------------------------------------------------------------------------
    // Persistence
    // -------------------------------------------------------------------------
    /// Persistence strategy
    pub adapter: AdapterKind,

    /// Load existing data on sync when the in-memory store is empty,
    /// instead of overwriting it
    pub append_mode: bool,

    /// Accepted for compatibility with option sets of earlier versions.
    /// Whether existing data is loaded is decided by `append_mode` alone.
    pub append_if_exists: bool,

    // -------------------------------------------------------------------------
    // Sync
    // -------------------------------------------------------------------------
    /// Interval of the recurring sync started by `open()`.
    /// Bounds how much is lost if the process dies without an exit notification.
    pub sync_interval: Duration,

    // -------------------------------------------------------------------------
    // Logging
    // -------------------------------------------------------------------------
    /// Log every put/get/sync at info level instead of trace
    pub verbose: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            adapter: AdapterKind::CompressedJson,
            append_mode: false,
            append_if_exists: true,
            sync_interval: Duration::from_secs(1),
            verbose: false,
        }
    }
}

impl Options {
    /// Create a new options builder
    pub fn builder() -> OptionsBuilder {
        OptionsBuilder::default()
    }
}

/// Builder for Options
#[derive(Default)]
pub struct OptionsBuilder {
    options: Options,
}

impl OptionsBuilder {
    /// Set the persistence strategy
    pub fn adapter(mut self, kind: AdapterKind) -> Self {
        self.options.adapter = kind;
        self
    }

    /// Load existing data instead of overwriting it when memory is empty
    pub fn append_mode(mut self, enabled: bool) -> Self {
        self.options.append_mode = enabled;
        self
    }

    /// Set the compatibility flag; has no effect on loading
    pub fn append_if_exists(mut self, enabled: bool) -> Self {
        self.options.append_if_exists = enabled;
        self
    }

    /// Set the interval of the recurring sync
    pub fn sync_interval(mut self, interval: Duration) -> Self {
        self.options.sync_interval = interval;
        self
    }

    /// Log operations at info level
    pub fn verbose(mut self, enabled: bool) -> Self {
        self.options.verbose = enabled;
        self
    }

    /// Build the options
    pub fn build(self) -> Options {
        self.options
    }
}
