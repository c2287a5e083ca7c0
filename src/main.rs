//! Meridian Studio - desktop editor for the Meridian game engine
//!
//! Main entry point for the GUI application.
//!
//! # Overview
//!
//! This binary crate hosts the process-level scaffolding around the editor:
//! - Platform gate (64-bit only, checked before anything else runs)
//! - Logging infrastructure (daily file rotation + console + crash tail)
//! - Settings and recent-project profiles (YAML under the config directory)
//! - Tokio async runtime (4 worker threads for toolchain probes and I/O)
//! - Service container ([`ServiceContainer`] - dispatcher, dialogs,
//!   plugins, windows, translations)
//! - The startup continuation ([`meridian_studio::startup::run`]) scheduled
//!   onto the Slint event loop
//!
//! The application uses a hybrid threading model:
//! - **Main thread**: Runs the Slint event loop, including the startup
//!   continuation and all window state
//! - **Tokio workers**: Handle offloaded operations (toolchain probe,
//!   manifest I/O, template scaffolding)
//!
//! # Execution Flow
//!
//! 1. Refuse to run on a non-64-bit platform (message box, exit code 1)
//! 2. Initialize logging → logs/meridian-studio.<date>
//! 3. Load the editor profile and seed the initial session path from it
//! 4. Parse command-line switches (which override the seed)
//! 5. Build the runtime, state manager, and service container
//! 6. Schedule the startup continuation and run the event loop
//! 7. Tear down capture hooks, log the metrics summary, shut down the
//!    runtime with a 5s timeout
//!
//! Any error escaping the startup path is written to the console and
//! swallowed; the process still exits normally.
//!
//! # Configuration Files
//!
//! Expected under the platform config directory (`MeridianStudio/`):
//! - `Studio Settings.yaml`: language, reload-last-session, startup session
//! - `Studio Internal.yaml`: recent-project list
//! - `crashes/`: crash reports with the recent warning/error tail
//!
//! # Platform
//!
//! Cross-platform via Slint and tokio; 64-bit only.

use std::process;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use meridian_studio::diagnostics::{self, LogTail};
use meridian_studio::i18n::TranslationManager;
use meridian_studio::metrics::MetricsClient;
use meridian_studio::services::{DialogService, Dispatcher, RenderDocManager, ServiceContainer};
use meridian_studio::settings::{self, RecentSessions, SettingsManager};
use meridian_studio::startup::{self, StudioArgs, StudioContext};
use meridian_studio::ui::studio::release_retained;
use meridian_studio::{EDITOR_NAME, StateManager, VERSION};

fn main() {
    // Everything else assumes a 64-bit process; stop here before any
    // subsystem initializes.
    if !startup::platform_supported() {
        DialogService::fatal_message(
            EDITOR_NAME,
            "Meridian Studio requires a 64-bit operating system.",
        );
        process::exit(1);
    }

    if let Err(error) = run() {
        // Startup already tried to surface this to the user; the console
        // write is the last resort before the normal exit path.
        eprintln!("{} failed: {:#}", EDITOR_NAME, error);
    }
}

fn run() -> Result<()> {
    // The tail feeds crash reports with the most recent warnings/errors.
    let tail = LogTail::new();
    let _log_guard = meridian_studio::logging::setup_logging_with_console(
        camino::Utf8Path::new("logs"),
        "meridian-studio",
        false,
        true,
        tail.clone(),
    )?;

    tracing::info!("Starting {} v{}", EDITOR_NAME, VERSION);

    let settings = SettingsManager::new(settings::default_settings_dir())?;
    diagnostics::install_panic_hook(tail, settings.crash_report_dir());

    // Recent list first: the profile may ask to resume the newest entry.
    let recent = RecentSessions::load(&settings).unwrap_or_else(|error| {
        tracing::warn!("Failed to load the recent-project list: {:#}", error);
        RecentSessions::default()
    });
    // A broken profile must not keep the editor from starting.
    let profile = settings.load_editor_profile().unwrap_or_else(|error| {
        tracing::warn!("Failed to load the editor profile: {:#}", error);
        meridian_studio::models::EditorProfile::default()
    });

    let seed = if !profile.startup_session.is_empty() {
        Some(Utf8PathBuf::from(profile.startup_session.clone()))
    } else if profile.reload_last_session {
        recent
            .most_recent_for(VERSION)
            .map(|entry| entry.path().to_path_buf())
    } else {
        None
    };

    let original_args: Vec<String> = std::env::args().skip(1).collect();
    let args = StudioArgs::parse(original_args.iter(), seed)?;
    tracing::info!(
        "Arguments parsed: session={:?}, new_project={}, debug_graphics={}, capture={}",
        args.initial_session,
        args.new_project,
        args.debug_graphics,
        args.capture
    );
    if let Some(effect_log) = &args.effect_log {
        tracing::info!("Compiled effects will be recorded to {}", effect_log);
    }

    let metrics = Arc::new(MetricsClient::default());

    // Capture hooks must exist before any preview process could spawn.
    let renderdoc = args
        .capture
        .then(|| Arc::new(RenderDocManager::initialize()));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(4)
        .thread_name("studio-worker")
        .build()
        .context("Failed to build the tokio runtime")?;
    tracing::info!("Tokio runtime initialized with 4 worker threads");

    let state = StateManager::new();
    let services = ServiceContainer::new(
        Dispatcher::new(runtime.handle().clone()),
        Arc::new(TranslationManager::new()),
        renderdoc.clone(),
    );

    let ctx = StudioContext {
        settings,
        state,
        metrics: Arc::clone(&metrics),
        services,
        language: profile.language,
        args,
        original_args,
    };

    // The whole startup sequence runs as a continuation on the event loop;
    // the loop below blocks until it (or the editor window) quits.
    slint::spawn_local(startup::run(ctx))
        .map_err(|e| anyhow::anyhow!("Failed to schedule startup: {}", e))?;

    let result = slint::run_event_loop_until_quit();

    tracing::info!("Event loop finished, shutting down");
    release_retained();

    if let Some(renderdoc) = renderdoc {
        renderdoc.remove_hooks();
    }
    metrics.log_summary();
    runtime.shutdown_timeout(Duration::from_secs(5));

    tracing::info!("Application shutdown complete");

    result.map_err(|e| anyhow::anyhow!("Event loop error: {}", e))
}
