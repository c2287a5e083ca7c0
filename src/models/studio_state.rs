use crate::models::EditorSession;

/// Snapshot of the studio's observable state.
///
/// Owned by the state manager; GUI code reads snapshots and subscribes to
/// change events instead of holding references into it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudioState {
    /// Currently loaded session, if any.
    pub session: Option<EditorSession>,

    /// One-line status shown in the shell's status bar.
    pub status: String,

    /// Whether the main window currently has the user's attention.
    pub active: bool,
}
