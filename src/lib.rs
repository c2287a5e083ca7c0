// Meridian Studio - desktop editor for the Meridian game engine
//
// This is the library crate containing the startup flow, session services,
// and data structures. The binary crate (main.rs) provides the GUI entry
// point.

pub mod diagnostics;
pub mod i18n;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod session;
pub mod settings;
pub mod startup;
pub mod state;
pub mod ui;

// Re-export commonly used types for convenience
pub use diagnostics::LogTail;
pub use models::{EditorSession, ProjectManifest, SessionOutcome, StudioState};
pub use services::ServiceContainer;
pub use settings::{RecentSessions, SettingsManager};
pub use startup::{StudioArgs, StudioContext};
pub use state::{StateChange, StateManager};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name shown in window titles, dialogs, and crash reports
pub const EDITOR_NAME: &str = "Meridian Studio";
