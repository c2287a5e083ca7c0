use crate::models::{EditorProfile, InternalProfile};
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

pub mod mru;

pub use mru::{MAX_RECENT_SESSIONS, RecentSessions};

/// Settings manager for loading and saving the studio's YAML profiles.
///
/// Manages two profile files:
/// - Editor profile (`Studio Settings.yaml`): User preferences such as
///   language and session reload behavior
/// - Internal profile (`Studio Internal.yaml`): Editor bookkeeping, mainly
///   the recent-project list; not meant for hand editing
#[derive(Debug, Clone)]
pub struct SettingsManager {
    settings_dir: Utf8PathBuf,
    editor_profile_path: Utf8PathBuf,
    internal_profile_path: Utf8PathBuf,
}

impl SettingsManager {
    /// Create a new SettingsManager rooted at the specified directory.
    ///
    /// # Arguments
    /// * `settings_dir` - Directory containing the profile files
    ///
    /// # Returns
    /// A new SettingsManager instance
    pub fn new<P: AsRef<Utf8Path>>(settings_dir: P) -> Result<Self> {
        let settings_dir = settings_dir.as_ref().to_path_buf();

        // Create settings directory if it doesn't exist
        if !settings_dir.exists() {
            fs::create_dir_all(&settings_dir)
                .with_context(|| format!("Failed to create settings directory: {}", settings_dir))?;
        }

        Ok(Self {
            editor_profile_path: settings_dir.join("Studio Settings.yaml"),
            internal_profile_path: settings_dir.join("Studio Internal.yaml"),
            settings_dir,
        })
    }

    /// Load the editor profile.
    ///
    /// # Returns
    /// The loaded EditorProfile, or defaults if no profile file exists
    pub fn load_editor_profile(&self) -> Result<EditorProfile> {
        // Try Studio Settings.yaml first, fall back to the pre-rename file
        let legacy_path = self.settings_dir.join("GameStudio Settings.yaml");

        let profile_path = if self.editor_profile_path.exists() {
            &self.editor_profile_path
        } else if legacy_path.exists() {
            tracing::info!("Using legacy profile file: {}", legacy_path);
            &legacy_path
        } else {
            tracing::warn!(
                "Editor profile not found at {}, using defaults",
                self.editor_profile_path
            );
            return Ok(EditorProfile::default());
        };

        let file_contents = fs::read_to_string(profile_path)
            .with_context(|| format!("Failed to read editor profile: {}", profile_path))?;

        let profile: EditorProfile = serde_yaml_ng::from_str(&file_contents)
            .with_context(|| format!("Failed to parse editor profile: {}", profile_path))?;

        tracing::info!("Loaded editor profile from {}", profile_path);
        Ok(profile)
    }

    /// Save the editor profile.
    ///
    /// # Arguments
    /// * `profile` - The EditorProfile to save
    pub fn save_editor_profile(&self, profile: &EditorProfile) -> Result<()> {
        let yaml_string = serde_yaml_ng::to_string(profile)
            .context("Failed to serialize editor profile to YAML")?;

        fs::write(&self.editor_profile_path, yaml_string)
            .with_context(|| format!("Failed to write editor profile: {}", self.editor_profile_path))?;

        tracing::info!("Saved editor profile to {}", self.editor_profile_path);
        Ok(())
    }

    /// Load the internal profile.
    ///
    /// # Returns
    /// The loaded InternalProfile, or defaults if no profile file exists
    pub fn load_internal_profile(&self) -> Result<InternalProfile> {
        if !self.internal_profile_path.exists() {
            tracing::debug!(
                "Internal profile not found at {}, using defaults",
                self.internal_profile_path
            );
            return Ok(InternalProfile::default());
        }

        let file_contents = fs::read_to_string(&self.internal_profile_path).with_context(|| {
            format!("Failed to read internal profile: {}", self.internal_profile_path)
        })?;

        let profile: InternalProfile = serde_yaml_ng::from_str(&file_contents).with_context(|| {
            format!("Failed to parse internal profile: {}", self.internal_profile_path)
        })?;

        tracing::info!("Loaded internal profile from {}", self.internal_profile_path);
        Ok(profile)
    }

    /// Save the internal profile.
    ///
    /// # Arguments
    /// * `profile` - The InternalProfile to save
    pub fn save_internal_profile(&self, profile: &InternalProfile) -> Result<()> {
        let yaml_string = serde_yaml_ng::to_string(profile)
            .context("Failed to serialize internal profile to YAML")?;

        fs::write(&self.internal_profile_path, yaml_string).with_context(|| {
            format!("Failed to write internal profile: {}", self.internal_profile_path)
        })?;

        tracing::info!("Saved internal profile to {}", self.internal_profile_path);
        Ok(())
    }

    /// Get the settings directory path.
    pub fn settings_dir(&self) -> &Utf8Path {
        &self.settings_dir
    }

    /// Directory crash reports are written to.
    pub fn crash_report_dir(&self) -> Utf8PathBuf {
        self.settings_dir.join("crashes")
    }
}

/// Default per-user settings directory.
///
/// Falls back to a directory next to the executable's working directory on
/// platforms without a config location.
pub fn default_settings_dir() -> Utf8PathBuf {
    dirs::config_dir()
        .and_then(|dir| Utf8PathBuf::from_path_buf(dir).ok())
        .map(|dir| dir.join("MeridianStudio"))
        .unwrap_or_else(|| Utf8PathBuf::from("MeridianStudio"))
}
