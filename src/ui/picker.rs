// Project picker - shown when startup has no session to open
//
// The Slint callbacks forward the user's interaction onto a channel;
// `run` consumes the channel until one definitive choice emerges. The
// browse button reuses the native file dialog service, so the picker
// window itself stays purely declarative.

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use slint::{ComponentHandle, ModelRc, VecModel};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::i18n::TranslationManager;
use crate::models::{MruEntry, NewSessionParams, TemplateDescription};
use crate::services::ServiceContainer;

use super::{ProjectSelectionWindow, RecentItem, TemplateItem};

/// Identifier in the window registry.
const WINDOW_ID: &str = "project-picker";

/// What the picker resolved to.
#[derive(Debug, Clone, PartialEq)]
pub enum PickerChoice {
    /// Create a new project from a template.
    Template(NewSessionParams),

    /// Open this existing project file.
    Existing(Utf8PathBuf),

    /// The user wants neither; shut down.
    Cancelled,
}

/// Raw signals out of the Slint callbacks.
enum PickerSignal {
    Create {
        template_id: String,
        name: String,
        output_dir: String,
    },
    OpenRecent(usize),
    Browse,
    Cancel,
}

/// Controller for the project selection window.
pub struct ProjectPicker {
    window: ProjectSelectionWindow,
    rx: mpsc::UnboundedReceiver<PickerSignal>,
    /// Paths backing the recent-project list, same order as displayed.
    recent: Vec<Utf8PathBuf>,
}

impl ProjectPicker {
    pub fn new(
        templates: &[TemplateDescription],
        recent: &[MruEntry],
        translations: &TranslationManager,
    ) -> Result<Self> {
        let window =
            ProjectSelectionWindow::new().context("Failed to create the project picker")?;

        let template_items: Vec<TemplateItem> = templates
            .iter()
            .map(|t| TemplateItem {
                id: t.id.as_str().into(),
                name: t.name.as_str().into(),
                description: t.description.as_str().into(),
            })
            .collect();
        window.set_templates(ModelRc::new(VecModel::from(template_items)));

        let recent_items: Vec<RecentItem> = recent
            .iter()
            .map(|e| RecentItem {
                path: e.path().as_str().into(),
                version: e.version.as_str().into(),
            })
            .collect();
        window.set_recent_sessions(ModelRc::new(VecModel::from(recent_items)));

        window.set_heading(translations.tr("picker.heading").into());
        window.set_output_directory(default_output_directory().into());

        let (tx, rx) = mpsc::unbounded_channel();

        let signal_tx = tx.clone();
        let ui_weak = window.as_weak();
        let template_ids: Vec<String> = templates.iter().map(|t| t.id.clone()).collect();
        window.on_create_project(move || {
            let Some(ui) = ui_weak.upgrade() else { return };
            let index = ui.get_selected_template();
            let Some(template_id) = usize::try_from(index)
                .ok()
                .and_then(|i| template_ids.get(i).cloned())
            else {
                warn!("Create requested without a template selected");
                return;
            };
            let _ = signal_tx.send(PickerSignal::Create {
                template_id,
                name: ui.get_project_name().to_string(),
                output_dir: ui.get_output_directory().to_string(),
            });
        });

        let signal_tx = tx.clone();
        window.on_open_recent(move |index| {
            let _ = signal_tx.send(PickerSignal::OpenRecent(index.max(0) as usize));
        });

        let signal_tx = tx.clone();
        window.on_browse_existing(move || {
            let _ = signal_tx.send(PickerSignal::Browse);
        });

        let signal_tx = tx.clone();
        window.on_cancel(move || {
            let _ = signal_tx.send(PickerSignal::Cancel);
        });

        // Closing the window counts as a cancel.
        let signal_tx = tx.clone();
        window.window().on_close_requested(move || {
            debug!("Picker window close requested");
            let _ = signal_tx.send(PickerSignal::Cancel);
            slint::CloseRequestResponse::HideWindow
        });

        Ok(Self {
            window,
            rx,
            recent: recent.iter().map(|e| e.path().to_path_buf()).collect(),
        })
    }

    /// Show the window and wait for a definitive choice.
    pub async fn run(mut self, services: &ServiceContainer) -> Result<PickerChoice> {
        self.window
            .show()
            .context("Failed to show the project picker")?;
        services.windows.mark_loaded(WINDOW_ID);

        let choice = loop {
            let Some(signal) = self.rx.recv().await else {
                // All senders hang off the window we still own, so this
                // only happens during teardown.
                break PickerChoice::Cancelled;
            };

            match signal {
                PickerSignal::Create {
                    template_id,
                    name,
                    output_dir,
                } => match create_choice(template_id, &name, &output_dir) {
                    Some(choice) => break choice,
                    None => continue,
                },
                PickerSignal::OpenRecent(index) => match self.recent.get(index) {
                    Some(path) => break PickerChoice::Existing(path.clone()),
                    None => {
                        warn!("Recent-project index {} is out of range", index);
                        continue;
                    }
                },
                PickerSignal::Browse => {
                    let title = services.translations.tr("picker.browse.title");
                    match services.dialogs.pick_project_file(&title).await {
                        Some(path) => break PickerChoice::Existing(path),
                        None => continue,
                    }
                }
                PickerSignal::Cancel => break PickerChoice::Cancelled,
            }
        };

        info!("Picker resolved: {:?}", choice);
        self.window
            .hide()
            .context("Failed to hide the project picker")?;
        services.windows.mark_unloaded(WINDOW_ID);
        Ok(choice)
    }
}

/// Turn raw creation inputs into a choice, rejecting an empty name.
fn create_choice(template_id: String, name: &str, output_dir: &str) -> Option<PickerChoice> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some(PickerChoice::Template(NewSessionParams {
        name: name.to_string(),
        template_id,
        output_dir: Utf8PathBuf::from(output_dir),
    }))
}

/// Suggested location for new projects.
fn default_output_directory() -> String {
    dirs::document_dir()
        .and_then(|dir| Utf8PathBuf::from_path_buf(dir).ok())
        .map(|dir| dir.join("Meridian Projects").into_string())
        .unwrap_or_else(|| "Meridian Projects".to_string())
}
