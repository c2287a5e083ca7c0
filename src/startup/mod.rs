//! Startup orchestration.
//!
//! `main` owns the process-level concerns (platform gate, logging, the
//! background runtime, the event loop). Everything after that lands here:
//! [`run`] is scheduled onto the UI event loop and walks the
//! [`flow::StartupPhase`] machine until the editor window is up or the
//! process is shutting down.
//!
//! # Components
//! - `args`: command-line switch parsing
//! - `flow`: the pure session resolution state machine
//! - [`StudioContext`]: process-lifetime collaborators threaded through
//!   every startup step instead of ambient statics

pub mod args;
pub mod flow;

pub use args::{ArgsError, StudioArgs};
pub use flow::{StartupEvent, StartupPhase, advance, initial_phase};

use std::process::Command;
use std::sync::Arc;

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use rfd::MessageLevel;
use tracing::{error, info, warn};

use crate::i18n::{self, SupportedLanguage};
use crate::metrics::MetricsClient;
use crate::models::{NewSessionParams, SessionOutcome};
use crate::services::{ServiceContainer, find_toolchain};
use crate::services::{AssetPackagesPlugin, EditorCachePlugin};
use crate::session::{self, OpenAttempt, SessionError};
use crate::settings::{RecentSessions, SettingsManager};
use crate::state::StateManager;
use crate::ui::picker::{PickerChoice, ProjectPicker};
use crate::ui::studio::StudioController;

/// Everything startup needs, built once in `main` and moved into the
/// startup continuation.
pub struct StudioContext {
    pub settings: SettingsManager,
    pub state: StateManager,
    pub metrics: Arc<MetricsClient>,
    pub services: Arc<ServiceContainer>,
    pub language: SupportedLanguage,
    pub args: StudioArgs,
    /// Raw arguments the process was started with, replayed on relaunch.
    pub original_args: Vec<String>,
}

/// Whether the process may run with the given pointer width.
///
/// The asset pipeline and the native plugins it loads are built for
/// 64-bit targets only.
pub fn pointer_width_supported(bits: u32) -> bool {
    bits >= 64
}

pub fn platform_supported() -> bool {
    pointer_width_supported(usize::BITS)
}

/// Startup entry point, scheduled onto the UI event loop.
///
/// Never returns an error to the event loop: a failure is logged, echoed
/// to the console on a best-effort basis, and turns into a quit.
pub async fn run(ctx: StudioContext) {
    if let Err(error) = try_run(ctx).await {
        error!("Startup failed: {:#}", error);
        eprintln!("Startup failed: {:#}", error);
        let _ = slint::quit_event_loop();
    }
}

async fn try_run(ctx: StudioContext) -> Result<()> {
    i18n::initialize(&ctx.services.translations, ctx.language);

    // Without a build toolchain the editor cannot compile project code,
    // so there is nothing useful to open. Tell the user and leave.
    match ctx.services.dispatcher.offload(find_toolchain()).await? {
        Ok(toolchain) => ctx.services.set_toolchain(toolchain),
        Err(error) => {
            error!("No usable build toolchain: {}", error);
            let title = ctx.services.translations.tr("toolchain.missing.title");
            let body = format!(
                "{}\n\n{}",
                error,
                ctx.services.translations.tr("toolchain.missing.body")
            );
            ctx.services
                .dialogs
                .message_box(&title, &body, MessageLevel::Error)
                .await;
            slint::quit_event_loop().context("Failed to stop the event loop")?;
            return Ok(());
        }
    }

    ctx.services.plugins.register(Arc::new(AssetPackagesPlugin));
    ctx.services.plugins.register(Arc::new(EditorCachePlugin));

    let mut phase = flow::initial_phase(ctx.args.initial_session.clone());
    info!("Startup begins in phase {:?}", phase);

    loop {
        let event = match &phase {
            StartupPhase::NoPath => StartupEvent::Proceed,

            StartupPhase::TryOpenInitial(path) => {
                let (_, loaded) = open_session(&ctx, path.clone()).await;
                StartupEvent::InitialOpenFinished { loaded }
            }

            StartupPhase::ShowPicker => run_picker(&ctx).await?,

            StartupPhase::CreateNew(params) => {
                let (outcome, session_loaded) = create_session(&ctx, params.clone()).await;
                StartupEvent::OperationFinished {
                    outcome,
                    session_loaded,
                }
            }

            StartupPhase::OpenExisting(path) => {
                let (outcome, session_loaded) = open_session(&ctx, path.clone()).await;
                StartupEvent::OperationFinished {
                    outcome,
                    session_loaded,
                }
            }

            StartupPhase::RelaunchPending => {
                warn!("Partial startup state left behind, scheduling a relaunch");
                ctx.state.set_status("Restarting...");
                ctx.services.windows.wait_all_unloaded().await;
                match spawn_replacement(&ctx.original_args) {
                    Ok(pid) => info!("Replacement editor started (pid {})", pid),
                    Err(error) => error!("Failed to relaunch the editor: {:#}", error),
                }
                ctx.metrics.record_relaunch();
                StartupEvent::RelaunchIssued
            }

            StartupPhase::Ready => break,

            StartupPhase::Exit => {
                info!("Shutting down without a session");
                slint::quit_event_loop().context("Failed to stop the event loop")?;
                return Ok(());
            }
        };

        phase = flow::advance(phase, event);
    }

    let controller = StudioController::new(
        ctx.state.clone(),
        Arc::clone(&ctx.metrics),
        Arc::clone(&ctx.services),
    )?;
    controller.show_and_retain()?;
    info!("Editor window shown");
    Ok(())
}

/// Open the manifest at `path` and bring the session fully up.
///
/// Returns the three-way outcome plus whether a session is now loaded.
/// Failures before any plugin has run are clean: they cancel the open
/// and the picker can be offered again. Failures after that point are
/// partial and force the relaunch path.
async fn open_session(ctx: &StudioContext, path: Utf8PathBuf) -> (SessionOutcome, bool) {
    info!("Opening session: {}", path);
    ctx.state.set_status(format!("Opening {}...", path));

    let probe_path = path.clone();
    let attempt = ctx
        .services
        .dispatcher
        .offload(async move { session::begin_open(&probe_path) })
        .await;

    let (manifest, upgrade) = match attempt {
        Ok(Ok(OpenAttempt::Ready(manifest))) => (manifest, false),
        Ok(Ok(OpenAttempt::NeedsUpgrade(manifest))) => {
            let title = ctx.services.translations.tr("upgrade.title");
            let question = format!(
                "{} was last saved by engine {}. {}",
                manifest.name,
                manifest.engine_version,
                ctx.services.translations.tr("upgrade.question")
            );
            if ctx.services.dialogs.confirm(&title, &question).await {
                (manifest, true)
            } else {
                info!("Upgrade declined, open abandoned: {}", path);
                return (SessionOutcome::Cancelled, false);
            }
        }
        Ok(Err(error)) => {
            // Nothing has been touched yet, so this is a clean failure.
            error!("Cannot open {}: {}", path, error);
            ctx.state.set_status("Failed to open project");
            return (SessionOutcome::Cancelled, false);
        }
        Err(error) => {
            error!("Session probe crashed: {:#}", error);
            return (SessionOutcome::Faulted, false);
        }
    };

    let services = Arc::clone(&ctx.services);
    let open_path = path.clone();
    let result = match ctx
        .services
        .dispatcher
        .offload(async move { session::complete_open(&open_path, manifest, upgrade, &services.plugins) })
        .await
    {
        Ok(result) => result,
        Err(error) => {
            error!("Session open crashed: {:#}", error);
            return (SessionOutcome::Faulted, false);
        }
    };

    let outcome = session::outcome_of(&result);
    match result {
        Ok(editor_session) => {
            ctx.metrics.record_session_opened();
            remember_session(&ctx.settings, &path);
            ctx.state.set_session(Some(editor_session));
            ctx.state.set_status("Ready");
            (outcome, true)
        }
        Err(error) => {
            error!("Failed to open {}: {}", path, error);
            ctx.state.set_status("Failed to open project");
            (outcome, false)
        }
    }
}

/// Instantiate a template, then open the project it produced.
async fn create_session(ctx: &StudioContext, params: NewSessionParams) -> (SessionOutcome, bool) {
    let templates = ctx.services.plugins.session_templates();
    let template = match session::find_template(&templates, &params.template_id) {
        Ok(template) => template.clone(),
        Err(error) => {
            error!("Cannot create project: {}", error);
            return (SessionOutcome::Cancelled, false);
        }
    };

    info!(
        "Creating project {} from template {}",
        params.name, params.template_id
    );
    ctx.state.set_status(format!("Creating {}...", params.name));

    let mut replace = false;
    let manifest_path = loop {
        let template = template.clone();
        let create_params = params.clone();
        let result = ctx
            .services
            .dispatcher
            .offload(async move { session::instantiate_template(&template, &create_params, replace) })
            .await;

        match result {
            Ok(Ok(path)) => break path,
            Ok(Err(SessionError::TargetExists(dir))) => {
                let title = ctx.services.translations.tr("replace.title");
                let question = format!(
                    "{}\n\n{}",
                    dir,
                    ctx.services.translations.tr("replace.question")
                );
                if ctx.services.dialogs.confirm(&title, &question).await {
                    replace = true;
                } else {
                    info!("Creation cancelled, {} kept as it is", dir);
                    return (SessionOutcome::Cancelled, false);
                }
            }
            Ok(Err(error @ (SessionError::InvalidName(_) | SessionError::UnknownTemplate(_)))) => {
                // Rejected before anything was written.
                error!("Cannot create {}: {}", params.name, error);
                ctx.state.set_status("Failed to create project");
                return (SessionOutcome::Cancelled, false);
            }
            Ok(Err(error)) => {
                // The project directory may be half-written.
                error!("Failed to create {}: {}", params.name, error);
                ctx.state.set_status("Failed to create project");
                return (SessionOutcome::Faulted, false);
            }
            Err(error) => {
                error!("Project creation crashed: {:#}", error);
                return (SessionOutcome::Faulted, false);
            }
        }
    };

    ctx.metrics.record_session_created();
    open_session(ctx, manifest_path).await
}

/// Show the project picker and translate its choice into a flow event.
async fn run_picker(ctx: &StudioContext) -> Result<StartupEvent> {
    ctx.metrics.record_picker_shown();
    ctx.state.set_status("Choose a project");

    // The picker lists every recent project, not only those recorded by
    // this editor version.
    let recent = RecentSessions::load(&ctx.settings).unwrap_or_else(|error| {
        warn!("Failed to load the recent-project list: {:#}", error);
        RecentSessions::default()
    });
    let templates = ctx.services.plugins.session_templates();

    let picker = ProjectPicker::new(&templates, recent.entries(), &ctx.services.translations)?;
    let choice = picker.run(&ctx.services).await?;

    Ok(match choice {
        PickerChoice::Template(params) => StartupEvent::TemplateChosen(params),
        PickerChoice::Existing(path) => StartupEvent::ExistingChosen(path),
        PickerChoice::Cancelled => StartupEvent::PickerCancelled,
    })
}

/// Record a successful open in the recent-project list.
///
/// Failures only cost the user a picker entry, so they are logged and
/// swallowed.
fn remember_session(settings: &SettingsManager, path: &Utf8Path) {
    let result = RecentSessions::load(settings).and_then(|mut recent| {
        recent.add(path, crate::VERSION);
        recent.save(settings)
    });
    if let Err(error) = result {
        warn!("Failed to record {} in the recent list: {:#}", path, error);
    }
}

/// Start a fresh editor process with the original arguments.
fn spawn_replacement(args: &[String]) -> Result<u32> {
    let exe = std::env::current_exe().context("Failed to locate the running executable")?;
    let child = Command::new(&exe)
        .args(args)
        .spawn()
        .with_context(|| format!("Failed to start {}", exe.display()))?;
    Ok(child.id())
}
