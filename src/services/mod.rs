//! Services module - the editor's shared runtime services.
//!
//! Everything the startup flow and the shell windows need is constructed
//! once and handed around through a [`ServiceContainer`]; there is no
//! service lookup by ambient global. The services themselves stay
//! **framework-agnostic** where they can: only the dispatcher and the
//! dialogs know a GUI exists.
//!
//! # Components
//!
//! - [`Dispatcher`]: The bridge between the Slint event loop and the tokio
//!   runtime. UI code offloads file and process I/O through it, background
//!   code queues closures back onto the UI thread.
//! - [`DialogService`]: Native message boxes, confirmations, and the
//!   project-file chooser, async so the event loop keeps pumping.
//! - [`PluginRegistry`]: Editor plugins, their project templates, and
//!   per-session initialization.
//! - [`WindowRegistry`]: Which windows are loaded; gates the relaunch
//!   recovery path until every window has unloaded.
//! - [`toolchain`]: Locates cargo and checks its version. Startup refuses to
//!   continue without a usable build toolchain.
//! - [`RenderDocManager`]: Optional graphics capture hooks, only constructed
//!   when capture was requested on the command line.
//!
//! # Design Philosophy
//!
//! The services layer is designed to be:
//! - **Explicit**: Everything reachable from the container was put there by
//!   `main`; no statics, no registries filled in by side effect
//! - **Async**: Anything that touches disk or spawns processes runs on
//!   tokio via the dispatcher
//! - **Testable**: No hidden dependencies, all inputs are explicit parameters

pub mod dialogs;
pub mod dispatcher;
pub mod plugins;
pub mod renderdoc;
pub mod toolchain;
pub mod windows;

pub use dialogs::DialogService;
pub use dispatcher::Dispatcher;
pub use plugins::{
    AssetPackagesPlugin, EditorCachePlugin, EditorPlugin, PluginError, PluginRegistry,
};
pub use renderdoc::RenderDocManager;
pub use toolchain::{BuildToolchain, MIN_SUPPORTED_VERSION, ToolchainError, find_toolchain};
pub use windows::WindowRegistry;

use crate::i18n::TranslationManager;
use std::sync::{Arc, OnceLock};

/// Everything the startup flow and the shell windows share, built once.
pub struct ServiceContainer {
    pub dispatcher: Dispatcher,
    pub dialogs: DialogService,
    pub plugins: PluginRegistry,
    pub windows: WindowRegistry,
    pub translations: Arc<TranslationManager>,

    /// Present only when capture was requested on the command line.
    pub renderdoc: Option<Arc<RenderDocManager>>,

    toolchain: OnceLock<BuildToolchain>,
}

impl ServiceContainer {
    pub fn new(
        dispatcher: Dispatcher,
        translations: Arc<TranslationManager>,
        renderdoc: Option<Arc<RenderDocManager>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            dispatcher,
            dialogs: DialogService::new(),
            plugins: PluginRegistry::new(),
            windows: WindowRegistry::new(),
            translations,
            renderdoc,
            toolchain: OnceLock::new(),
        })
    }

    /// Record the located build toolchain. Later calls are ignored.
    pub fn set_toolchain(&self, toolchain: BuildToolchain) {
        if self.toolchain.set(toolchain).is_err() {
            tracing::debug!("Build toolchain already recorded");
        }
    }

    /// The build toolchain, once discovery has succeeded.
    pub fn toolchain(&self) -> Option<&BuildToolchain> {
        self.toolchain.get()
    }
}
