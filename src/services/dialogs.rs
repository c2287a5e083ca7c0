//! Native dialog wrappers.
//!
//! Message boxes and file choosers go through rfd's async API so the UI
//! event loop keeps pumping while they are up. The one synchronous entry
//! point, [`DialogService::fatal_message`], exists for errors raised before
//! any event loop is running.

use camino::Utf8PathBuf;
use rfd::{
    AsyncFileDialog, AsyncMessageDialog, MessageButtons, MessageDialog, MessageDialogResult,
    MessageLevel,
};

/// Native dialogs used by the startup flow.
#[derive(Debug, Clone, Default)]
pub struct DialogService;

impl DialogService {
    pub fn new() -> Self {
        Self
    }

    /// Show a message and wait for dismissal.
    pub async fn message_box(&self, title: &str, text: &str, level: MessageLevel) {
        AsyncMessageDialog::new()
            .set_level(level)
            .set_title(title)
            .set_description(text)
            .set_buttons(MessageButtons::Ok)
            .show()
            .await;
    }

    /// Yes/no confirmation; `true` on yes.
    pub async fn confirm(&self, title: &str, text: &str) -> bool {
        let result = AsyncMessageDialog::new()
            .set_level(MessageLevel::Warning)
            .set_title(title)
            .set_description(text)
            .set_buttons(MessageButtons::YesNo)
            .show()
            .await;
        matches!(result, MessageDialogResult::Yes)
    }

    /// Modal project-file chooser; `None` when dismissed.
    pub async fn pick_project_file(&self, title: &str) -> Option<Utf8PathBuf> {
        let file = AsyncFileDialog::new()
            .set_title(title)
            .add_filter("Meridian project", &["meridian"])
            .pick_file()
            .await?;
        match Utf8PathBuf::from_path_buf(file.path().to_path_buf()) {
            Ok(path) => Some(path),
            Err(path) => {
                tracing::warn!("Selected path is not valid UTF-8: {}", path.display());
                None
            }
        }
    }

    /// Blocking fatal-error box, for failures before the event loop exists.
    pub fn fatal_message(title: &str, text: &str) {
        MessageDialog::new()
            .set_level(MessageLevel::Error)
            .set_title(title)
            .set_description(text)
            .set_buttons(MessageButtons::Ok)
            .show();
    }
}
