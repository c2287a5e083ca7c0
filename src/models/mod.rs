//! Data models for Meridian Studio.
//!
//! This module contains the core data structures used throughout the application:
//! - [`EditorProfile`]: User preferences loaded from `Studio Settings.yaml`
//! - [`InternalProfile`]: Editor bookkeeping, mainly the recent-project list, from `Studio Internal.yaml`
//! - [`ProjectManifest`]: The `<Name>.meridian` file describing a project on disk
//! - [`SessionOutcome`]: Tri-state result of an open/create operation, driving the relaunch decision
//! - [`StudioState`]: Runtime state snapshot owned by [`StateManager`](crate::state::StateManager)
//!
//! # Architecture Note
//!
//! The models are designed to be:
//! - **Serializable**: Everything persisted derives `Serialize`/`Deserialize` for YAML storage
//! - **Cloneable**: StudioState is wrapped in `Arc<RwLock<>>` by the state manager for thread-safe access
//! - **Immutable**: State updates go through StateManager's `update()` method to ensure consistency

pub mod session;
pub mod settings;
pub mod studio_state;

pub use session::{
    EditorSession, NewSessionParams, ProjectManifest, SessionOutcome, TemplateDescription,
};
pub use settings::{EditorProfile, InternalProfile, MruEntry};
pub use studio_state::StudioState;
