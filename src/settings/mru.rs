//! Most-recently-used project tracking.
//!
//! The list lives in the internal profile and is read by two consumers with
//! different version filters: reopen-on-startup only considers entries
//! recorded by the running editor version, while the project picker shows
//! everything, including projects last touched by older editors.

use crate::models::MruEntry;
use crate::settings::SettingsManager;
use anyhow::Result;
use camino::Utf8Path;
use chrono::Utc;

/// Maximum number of entries kept in the recent-project list.
pub const MAX_RECENT_SESSIONS: usize = 20;

/// Recent-project list, newest first.
#[derive(Debug, Clone, Default)]
pub struct RecentSessions {
    entries: Vec<MruEntry>,
}

impl RecentSessions {
    /// Load the list from the internal profile.
    ///
    /// Entries are re-sorted newest first; hand-edited or merged profiles
    /// may have them out of order.
    pub fn load(settings: &SettingsManager) -> Result<Self> {
        let profile = settings.load_internal_profile()?;
        let mut entries = profile.recent_sessions;
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        tracing::debug!("Loaded {} recent project entries", entries.len());
        Ok(Self { entries })
    }

    /// All entries, newest first.
    pub fn entries(&self) -> &[MruEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Newest entry regardless of which editor version recorded it.
    pub fn most_recent(&self) -> Option<&MruEntry> {
        self.entries.first()
    }

    /// Newest entry recorded by the given editor version.
    pub fn most_recent_for(&self, version: &str) -> Option<&MruEntry> {
        self.entries.iter().find(|e| e.version == version)
    }

    /// Record `path` as just used, moving it to the front.
    ///
    /// An existing entry for the same path is replaced, whatever version
    /// recorded it. The list is capped at [`MAX_RECENT_SESSIONS`].
    pub fn add(&mut self, path: &Utf8Path, version: &str) {
        self.entries.retain(|e| e.path() != path);
        self.entries.insert(
            0,
            MruEntry {
                path: path.to_string(),
                version: version.to_string(),
                timestamp: Utc::now(),
            },
        );
        self.entries.truncate(MAX_RECENT_SESSIONS);
    }

    /// Drop `path` from the list, e.g. when the project no longer exists.
    pub fn remove(&mut self, path: &Utf8Path) {
        self.entries.retain(|e| e.path() != path);
    }

    /// Write the list back through the settings manager.
    pub fn save(&self, settings: &SettingsManager) -> Result<()> {
        let mut profile = settings.load_internal_profile()?;
        profile.recent_sessions = self.entries.clone();
        settings.save_internal_profile(&profile)
    }
}
