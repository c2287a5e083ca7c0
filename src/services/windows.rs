//! Window lifetime registry.
//!
//! The relaunch recovery path must not spawn the replacement process while
//! any window is still up, or the two instances would race for the session
//! files. [`WindowRegistry::wait_all_unloaded`] is that gate.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

/// Tracks which windows are currently loaded.
#[derive(Clone)]
pub struct WindowRegistry {
    windows: Arc<Mutex<HashSet<String>>>,
    count_tx: Arc<watch::Sender<usize>>,
}

impl WindowRegistry {
    pub fn new() -> Self {
        let (count_tx, _) = watch::channel(0usize);
        Self {
            windows: Arc::new(Mutex::new(HashSet::new())),
            count_tx: Arc::new(count_tx),
        }
    }

    /// Record `id` as loaded. Idempotent per id.
    pub fn mark_loaded(&self, id: &str) {
        let mut windows = self.windows.lock().unwrap();
        if windows.insert(id.to_string()) {
            // send_replace stores the value even with no waiter subscribed.
            self.count_tx.send_replace(windows.len());
            tracing::debug!("Window loaded: {} ({} total)", id, windows.len());
        }
    }

    /// Record `id` as unloaded. Idempotent per id.
    pub fn mark_unloaded(&self, id: &str) {
        let mut windows = self.windows.lock().unwrap();
        if windows.remove(id) {
            self.count_tx.send_replace(windows.len());
            tracing::debug!("Window unloaded: {} ({} remain)", id, windows.len());
        }
    }

    pub fn loaded_count(&self) -> usize {
        self.windows.lock().unwrap().len()
    }

    /// Resolve once no window remains loaded.
    ///
    /// Returns immediately when nothing is registered.
    pub async fn wait_all_unloaded(&self) {
        let mut rx = self.count_tx.subscribe();
        loop {
            if *rx.borrow_and_update() == 0 {
                return;
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}

impl Default for WindowRegistry {
    fn default() -> Self {
        Self::new()
    }
}
