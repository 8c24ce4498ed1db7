//! Exit notification
//!
//! A one-shot "cleanup" event fired near normal process termination.
//! Live stores subscribe to it so their last sync happens even if the
//! process ends while they are still open. Closing or dropping a store
//! removes its hook. Wiring it to OS signals is left to the binary; a forced kill
//! never fires it.
//!
//! ```text
//! main() ── ExitGuard ──drop──▶ ExitSignal::fire() ──▶ hook 1, hook 2, ...
//! ```

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;

type Hook = Box<dyn FnOnce() + Send>;

/// Identifies one registered hook, for [`ExitSignal::unsubscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Injectable one-shot notification source
pub struct ExitSignal {
    fired: AtomicBool,
    next_id: AtomicU64,
    hooks: Mutex<Vec<(SubscriptionId, Hook)>>,
}

impl ExitSignal {
    /// Create a signal that has not fired yet
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            fired: AtomicBool::new(false),
            next_id: AtomicU64::new(0),
            hooks: Mutex::new(Vec::new()),
        })
    }

    /// The process-wide signal
    pub fn global() -> Arc<Self> {
        static GLOBAL: OnceLock<Arc<ExitSignal>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(ExitSignal::new))
    }

    /// Register a hook to run when the signal fires
    ///
    /// Returns `None` (and drops the hook) if the signal already fired.
    pub fn subscribe<F>(&self, hook: F) -> Option<SubscriptionId>
    where
        F: FnOnce() + Send + 'static,
    {
        let mut hooks = self.hooks.lock();
        // Checked under the lock so a concurrent fire() cannot miss the hook
        if self.fired.load(Ordering::SeqCst) {
            return None;
        }
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        hooks.push((id, Box::new(hook)));
        Some(id)
    }

    /// Drop a hook without running it
    ///
    /// Returns `false` if the hook already ran or was removed before.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut hooks = self.hooks.lock();
        let before = hooks.len();
        hooks.retain(|(hook_id, _)| *hook_id != id);
        hooks.len() != before
    }

    /// Fire the signal, running every hook once
    ///
    /// Returns the number of hooks run; later calls run nothing.
    pub fn fire(&self) -> usize {
        let hooks = {
            let mut hooks = self.hooks.lock();
            if self.fired.swap(true, Ordering::SeqCst) {
                return 0;
            }
            std::mem::take(&mut *hooks)
        };

        let count = hooks.len();
        tracing::debug!(hooks = count, "Exit signal fired");
        for (_, hook) in hooks {
            hook();
        }
        count
    }

    pub fn has_fired(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }

    /// Number of hooks waiting for the signal
    pub fn subscriber_count(&self) -> usize {
        self.hooks.lock().len()
    }
}

/// Fires its signal when dropped
///
/// Hold one for the lifetime of `main` so the signal fires on every normal
/// return path, including early returns and unwinding panics.
pub struct ExitGuard {
    signal: Arc<ExitSignal>,
}

impl ExitGuard {
    pub fn new(signal: Arc<ExitSignal>) -> Self {
        Self { signal }
    }

    /// Guard for the process-wide signal
    pub fn global() -> Self {
        Self::new(ExitSignal::global())
    }
}

impl Drop for ExitGuard {
    fn drop(&mut self) {
        self.signal.fire();
    }
}
