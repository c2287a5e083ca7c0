use crate::i18n::SupportedLanguage;
use camino::Utf8Path;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User-facing editor settings from `Studio Settings.yaml`.
///
/// Every field has a serde default so profiles written by older editor
/// versions keep loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorProfile {
    /// Display language; `MachineDefault` resolves against the desktop
    /// environment at startup.
    #[serde(default)]
    pub language: SupportedLanguage,

    /// Reopen the most recent project when starting without arguments.
    #[serde(default = "default_true")]
    pub reload_last_session: bool,

    /// Project to open on startup, overriding the recent list. Empty means
    /// unset.
    #[serde(default)]
    pub startup_session: String,
}

impl Default for EditorProfile {
    fn default() -> Self {
        Self {
            language: SupportedLanguage::MachineDefault,
            reload_last_session: true,
            startup_session: String::new(),
        }
    }
}

/// Internal bookkeeping from `Studio Internal.yaml`.
///
/// Written by the editor on its own behalf; not meant for hand editing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InternalProfile {
    /// Recently opened projects, newest first.
    #[serde(default)]
    pub recent_sessions: Vec<MruEntry>,
}

/// One entry of the recent-project list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MruEntry {
    /// Path of the project manifest.
    pub path: String,

    /// Editor version that last opened the project. Reopen-on-startup only
    /// considers entries recorded by the running version.
    pub version: String,

    /// When the project was last opened.
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl MruEntry {
    pub fn path(&self) -> &Utf8Path {
        Utf8Path::new(&self.path)
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_editor_profile_defaults() {
        let profile = EditorProfile::default();
        assert_eq!(profile.language, SupportedLanguage::MachineDefault);
        assert!(profile.reload_last_session);
        assert!(profile.startup_session.is_empty());
    }

    #[test]
    fn test_editor_profile_partial_yaml() {
        // A profile written before `startup_session` existed still loads.
        let profile: EditorProfile = serde_yaml_ng::from_str("language: French\n").unwrap();
        assert_eq!(profile.language, SupportedLanguage::French);
        assert!(profile.reload_last_session);
        assert!(profile.startup_session.is_empty());
    }

    #[test]
    fn test_mru_entry_missing_timestamp() {
        let entry: MruEntry =
            serde_yaml_ng::from_str("path: /projects/Game.meridian\nversion: 0.3.0\n").unwrap();
        assert_eq!(entry.path(), Utf8Path::new("/projects/Game.meridian"));
        assert_eq!(entry.version, "0.3.0");
    }
}
