//! RenderDoc capture integration.
//!
//! With capture enabled, preview processes spawned by the editor inherit the
//! environment hook and load the RenderDoc capture layer. Hooks are removed
//! again when the editor shuts down so unrelated child processes stay clean.

use camino::Utf8PathBuf;
use std::env;
use std::sync::atomic::{AtomicBool, Ordering};

/// Environment variable the Vulkan capture layer reads.
const CAPTURE_ENV_VAR: &str = "ENABLE_VULKAN_RENDERDOC_CAPTURE";

/// Well-known RenderDoc library locations per platform.
fn default_library_paths() -> Vec<Utf8PathBuf> {
    if cfg!(target_os = "windows") {
        vec![Utf8PathBuf::from("C:/Program Files/RenderDoc/renderdoc.dll")]
    } else if cfg!(target_os = "macos") {
        vec![Utf8PathBuf::from(
            "/Applications/RenderDoc.app/Contents/lib/librenderdoc.dylib",
        )]
    } else {
        vec![
            Utf8PathBuf::from("/usr/lib/librenderdoc.so"),
            Utf8PathBuf::from("/usr/lib/x86_64-linux-gnu/librenderdoc.so"),
            Utf8PathBuf::from("/usr/local/lib/librenderdoc.so"),
        ]
    }
}

/// Manages RenderDoc capture hooks for preview processes.
#[derive(Debug)]
pub struct RenderDocManager {
    library: Option<Utf8PathBuf>,
    hooked: AtomicBool,
}

impl RenderDocManager {
    /// Locate the RenderDoc library and install the capture hook.
    ///
    /// A missing library is logged, not fatal; captures are simply
    /// unavailable for the rest of the run.
    pub fn initialize() -> Self {
        let library = Self::locate_library();

        match &library {
            Some(path) => tracing::info!("RenderDoc library found at {}", path),
            None => {
                tracing::warn!("RenderDoc requested but no library was found; captures disabled")
            }
        }

        let manager = Self {
            library,
            hooked: AtomicBool::new(false),
        };
        manager.install_hooks();
        manager
    }

    fn locate_library() -> Option<Utf8PathBuf> {
        if let Ok(explicit) = env::var("RENDERDOC_LIB") {
            let path = Utf8PathBuf::from(explicit);
            if path.is_file() {
                return Some(path);
            }
            tracing::warn!("$RENDERDOC_LIB points at {}, which does not exist", path);
        }
        default_library_paths().into_iter().find(|p| p.is_file())
    }

    fn install_hooks(&self) {
        if self.library.is_none() {
            return;
        }
        if !self.hooked.swap(true, Ordering::SeqCst) {
            // Called from main before worker threads exist; nothing else is
            // reading the environment yet.
            unsafe { env::set_var(CAPTURE_ENV_VAR, "1") };
            tracing::info!("RenderDoc capture hooks installed");
        }
    }

    /// Whether a capture library was found.
    pub fn is_available(&self) -> bool {
        self.library.is_some()
    }

    pub fn library(&self) -> Option<&Utf8PathBuf> {
        self.library.as_ref()
    }

    /// Remove the capture hook. Idempotent.
    pub fn remove_hooks(&self) {
        if self.hooked.swap(false, Ordering::SeqCst) {
            // Runs after the event loop and runtime have wound down.
            unsafe { env::remove_var(CAPTURE_ENV_VAR) };
            tracing::info!("RenderDoc capture hooks removed");
        }
    }
}
