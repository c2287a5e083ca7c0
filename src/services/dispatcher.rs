//! UI-thread dispatch and background offloading.
//!
//! The Slint event loop on the main thread owns every window; everything
//! else runs on the tokio runtime. The dispatcher is the one place code
//! crosses between the two worlds, in either direction.

use anyhow::{Context, Result};
use std::future::Future;
use tokio::runtime::Handle;

/// Queues work onto the UI event loop and offloads blocking work to tokio.
#[derive(Clone)]
pub struct Dispatcher {
    tokio: Handle,
}

impl Dispatcher {
    pub fn new(tokio: Handle) -> Self {
        Self { tokio }
    }

    /// Handle to the background runtime.
    pub fn tokio(&self) -> &Handle {
        &self.tokio
    }

    /// Run a closure on the UI thread. Callable from any thread.
    pub fn run_on_ui(f: impl FnOnce() + Send + 'static) -> Result<()> {
        slint::invoke_from_event_loop(f)
            .map_err(|e| anyhow::anyhow!("Event loop is not running: {}", e))
    }

    /// Schedule a future onto the UI event loop. UI-thread only; the future
    /// keeps running after the handle is dropped.
    pub fn spawn_ui<F>(future: F) -> Result<()>
    where
        F: Future<Output = ()> + 'static,
    {
        slint::spawn_local(future)
            .map_err(|e| anyhow::anyhow!("Failed to spawn on the event loop: {}", e))?;
        Ok(())
    }

    /// Run a future on the tokio runtime and await its result.
    ///
    /// This is how UI-thread code performs file and process I/O without
    /// stalling the event loop.
    pub async fn offload<F, T>(&self, future: F) -> Result<T>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        self.tokio
            .spawn(future)
            .await
            .context("Background task panicked")
    }

    /// Fire-and-forget background work.
    pub fn spawn_background<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tokio.spawn(future);
    }
}
