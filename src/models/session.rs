use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// Project manifest stored as `<Name>.meridian` at the project root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectManifest {
    /// Project name shown in window titles and the recent list.
    pub name: String,

    /// Engine version the project was last saved with.
    pub engine_version: String,

    /// Asset package directories, relative to the project root.
    #[serde(default)]
    pub packages: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A project template offered by the new-project picker.
///
/// Templates come from editor plugins; the built-in set lives with the
/// asset-packages plugin.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateDescription {
    /// Stable identifier used to select the template.
    pub id: String,

    /// Display name.
    pub name: String,

    /// One-line description shown next to the name.
    pub description: String,

    /// Package directories the template creates.
    pub packages: Vec<String>,

    /// Starter files written relative to the project root, as
    /// `(relative path, contents)` pairs.
    pub starter_files: Vec<(String, String)>,
}

/// Parameters the picker collects for creating a project.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSessionParams {
    pub name: String,
    pub template_id: String,
    pub output_dir: Utf8PathBuf,
}

/// Outcome of an interactive open or create operation.
///
/// `Cancelled` means the user backed out before anything was touched; the
/// startup flow offers the picker again. `Faulted` means the operation
/// failed after side effects may have happened, leaving plugins or the
/// project directory in an indeterminate state; the only safe recovery is
/// relaunching the process once every window has unloaded. `Completed`
/// with nothing loaded is a plain exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The operation ran to its end, with or without loading a session.
    Completed,

    /// The user declined a prompt before any side effects.
    Cancelled,

    /// The operation failed after side effects may have happened.
    Faulted,
}

impl SessionOutcome {
    /// Whether this outcome forces the relaunch recovery path.
    pub fn requires_relaunch(self) -> bool {
        self == SessionOutcome::Faulted
    }
}

/// A successfully opened project session.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorSession {
    pub name: String,
    pub manifest_path: Utf8PathBuf,
    pub engine_version: String,
    pub packages: Vec<String>,
}
