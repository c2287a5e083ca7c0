// Main editor window controller
//
// Wires the StudioWindow to application state: session details flow in
// through a state subscription running on the UI event loop, and closing
// the window drives activation bookkeeping plus the event-loop quit. The
// controller outlives the startup continuation by parking itself in a
// thread-local slot.

use std::cell::RefCell;
use std::sync::Arc;

use anyhow::{Context, Result};
use slint::{ComponentHandle, ModelRc, SharedString, VecModel};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::metrics::MetricsClient;
use crate::models::EditorSession;
use crate::services::{Dispatcher, ServiceContainer};
use crate::state::{StateChange, StateManager};

use super::StudioWindow;

/// Identifier in the window registry.
const WINDOW_ID: &str = "studio-main";

thread_local! {
    // Keeps the running controller alive for the lifetime of the event
    // loop; dropping the last strong handle would destroy the window.
    static RETAINED: RefCell<Option<StudioController>> = const { RefCell::new(None) };
}

/// Controller for the main editor window.
pub struct StudioController {
    ui: StudioWindow,
    state: StateManager,
    metrics: Arc<MetricsClient>,
    services: Arc<ServiceContainer>,
}

impl StudioController {
    pub fn new(
        state: StateManager,
        metrics: Arc<MetricsClient>,
        services: Arc<ServiceContainer>,
    ) -> Result<Self> {
        let ui = StudioWindow::new().context("Failed to create the editor window")?;

        Self::sync_ui_with_state(&ui, &state);
        Self::setup_close_handling(&ui, &state, &metrics, &services);
        Self::setup_state_subscription(&ui, &state);

        info!("Editor window controller initialized");

        Ok(Self {
            ui,
            state,
            metrics,
            services,
        })
    }

    /// Show the window and park the controller in the thread-local slot.
    pub fn show_and_retain(self) -> Result<()> {
        self.ui.show().context("Failed to show the editor window")?;
        self.services.windows.mark_loaded(WINDOW_ID);
        self.metrics.set_active_state(true);
        self.state.set_active(true);

        RETAINED.with(|slot| *slot.borrow_mut() = Some(self));
        Ok(())
    }

    /// Initialize the window from the current state snapshot.
    fn sync_ui_with_state(ui: &StudioWindow, state: &StateManager) {
        let snapshot = state.snapshot();
        Self::apply_session(ui, snapshot.session.as_ref());
        ui.set_status_message(snapshot.status.into());

        debug!("Editor window synchronized with initial state");
    }

    fn apply_session(ui: &StudioWindow, session: Option<&EditorSession>) {
        match session {
            Some(session) => {
                ui.set_session_name(session.name.as_str().into());
                ui.set_session_path(session.manifest_path.as_str().into());
                ui.set_engine_version(session.engine_version.as_str().into());
                let packages: Vec<SharedString> =
                    session.packages.iter().map(|p| p.as_str().into()).collect();
                ui.set_packages(ModelRc::new(VecModel::from(packages)));
            }
            None => {
                ui.set_session_name("".into());
                ui.set_session_path("".into());
                ui.set_engine_version(crate::VERSION.into());
                ui.set_packages(ModelRc::new(VecModel::from(Vec::<SharedString>::new())));
            }
        }
    }

    /// Closing the editor window ends the process: mark the window
    /// unloaded, stop the activity clock, and quit the event loop.
    fn setup_close_handling(
        ui: &StudioWindow,
        state: &StateManager,
        metrics: &Arc<MetricsClient>,
        services: &Arc<ServiceContainer>,
    ) {
        let state = state.clone();
        let metrics = Arc::clone(metrics);
        let services = Arc::clone(services);

        ui.window().on_close_requested(move || {
            info!("Editor window close requested, shutting down");

            services.windows.mark_unloaded(WINDOW_ID);
            metrics.set_active_state(false);
            state.set_active(false);

            if let Err(error) = slint::quit_event_loop() {
                warn!("Failed to stop the event loop: {}", error);
            }
            slint::CloseRequestResponse::HideWindow
        });
    }

    /// Forward state changes into the window. Runs as a task on the UI
    /// event loop, so it may touch the component directly.
    fn setup_state_subscription(ui: &StudioWindow, state: &StateManager) {
        let ui_weak = ui.as_weak();
        let state = state.clone();
        let mut rx = state.subscribe();

        let spawned = Dispatcher::spawn_ui(async move {
            debug!("Editor state subscription started");

            loop {
                match rx.recv().await {
                    Ok(change) => {
                        let Some(ui) = ui_weak.upgrade() else {
                            break;
                        };
                        match change {
                            StateChange::SessionChanged { .. } => {
                                let snapshot = state.snapshot();
                                Self::apply_session(&ui, snapshot.session.as_ref());
                            }
                            StateChange::StatusChanged { status } => {
                                ui.set_status_message(status.into());
                            }
                            StateChange::ActivationChanged { .. } => {
                                // Reflected in metrics, nothing to draw.
                            }
                        }
                    }
                    Err(RecvError::Closed) => {
                        debug!("State channel closed, subscription ends");
                        break;
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Editor state subscription lagged, {} events skipped", skipped);
                        // Skipped events are gone; rebuild from a snapshot.
                        let Some(ui) = ui_weak.upgrade() else {
                            break;
                        };
                        let snapshot = state.snapshot();
                        Self::apply_session(&ui, snapshot.session.as_ref());
                        ui.set_status_message(snapshot.status.into());
                    }
                }
            }

            debug!("Editor state subscription ended");
        });
        if let Err(error) = spawned {
            warn!("State subscription not started: {:#}", error);
        }
    }
}

/// Drop the retained controller, if any.
///
/// Called after the event loop has stopped, on the thread that ran it,
/// so the window is torn down before the process-level services are.
pub fn release_retained() {
    RETAINED.with(|slot| slot.borrow_mut().take());
}

#[cfg(test)]
mod tests {
    use super::*;

    // Creating the window needs a display; the controller is exercised
    // through manual runs and the startup integration tests.

    #[test]
    fn test_release_retained_on_empty_slot() {
        release_retained();
        release_retained();
    }
}
