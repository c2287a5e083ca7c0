// State management module
//
// This module provides the StateManager which wraps StudioState with
// thread-safe access using Arc<RwLock<T>> and emits change events for GUI
// updates.

use crate::models::{EditorSession, StudioState};
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;

/// Change events emitted when state is modified
///
/// These events are emitted to notify interested parties (primarily the GUI)
/// about state changes without requiring them to poll the state.
#[derive(Clone, Debug, PartialEq)]
pub enum StateChange {
    /// A session was loaded, unloaded, or swapped for another one
    SessionChanged {
        loaded: bool,
    },

    /// The status line changed
    StatusChanged {
        status: String,
    },

    /// The main window gained or lost the user's attention
    ActivationChanged {
        active: bool,
    },
}

/// Thread-safe state manager with event emission
///
/// This is the central state management component that:
/// - Provides thread-safe access to [`StudioState`] via `Arc<RwLock<T>>`
/// - Detects state changes and emits [`StateChange`] events
/// - Supports subscribing to state changes via tokio broadcast channels
///
/// # Usage
///
/// Always use `StateManager` instead of accessing [`StudioState`] directly:
/// - [`read()`](Self::read) for reading state without holding locks
/// - [`update()`](Self::update) for mutations with automatic event emission
/// - [`subscribe()`](Self::subscribe) for listening to state changes
pub struct StateManager {
    /// The studio state protected by RwLock for thread-safe access
    state: Arc<RwLock<StudioState>>,

    /// Broadcast channel for emitting state change events
    /// Multiple subscribers can listen for state changes
    state_tx: broadcast::Sender<StateChange>,
}

impl StateManager {
    /// Create a new StateManager with default state
    ///
    /// # Returns
    /// A new StateManager with a broadcast channel buffer of 100 events
    pub fn new() -> Self {
        let (state_tx, _) = broadcast::channel(100);
        Self {
            state: Arc::new(RwLock::new(StudioState::default())),
            state_tx,
        }
    }

    /// Get a read-only snapshot of the current state
    ///
    /// This clones the entire state, so it's safe to use without holding locks.
    /// For checking individual fields, consider using `read()` with a closure.
    pub fn snapshot(&self) -> StudioState {
        self.state.read().unwrap().clone()
    }

    /// Execute a function with read access to the state
    ///
    /// # Example
    /// ```ignore
    /// let has_session = state_manager.read(|state| state.session.is_some());
    /// ```
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&StudioState) -> R,
    {
        let state = self.state.read().unwrap();
        f(&state)
    }

    /// Update the state and emit change events
    ///
    /// This is the primary way to modify state. It:
    /// 1. Captures the old state
    /// 2. Applies the update function
    /// 3. Detects what changed
    /// 4. Emits appropriate events
    ///
    /// # Arguments
    /// * `update_fn` - A function that mutates the state
    ///
    /// # Returns
    /// A vector of StateChange events that were emitted
    pub fn update<F>(&self, update_fn: F) -> Vec<StateChange>
    where
        F: FnOnce(&mut StudioState),
    {
        let mut state = self.state.write().unwrap();
        let old_state = state.clone();

        // Apply the update
        update_fn(&mut state);

        // Detect changes and emit events
        let changes = self.detect_changes(&old_state, &state);

        for change in &changes {
            // Ignore send errors - it's OK if no one is listening
            let _ = self.state_tx.send(change.clone());
        }

        changes
    }

    /// Subscribe to state change events
    ///
    /// Returns a receiver that will get notified of all future state changes.
    /// Multiple subscribers can listen simultaneously.
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.state_tx.subscribe()
    }

    /// Detect what changed between two states and generate events
    ///
    /// This is called internally by `update()` to determine which events to emit.
    fn detect_changes(&self, old: &StudioState, new: &StudioState) -> Vec<StateChange> {
        let mut changes = Vec::new();

        if old.session != new.session {
            changes.push(StateChange::SessionChanged {
                loaded: new.session.is_some(),
            });
        }

        if old.status != new.status {
            changes.push(StateChange::StatusChanged {
                status: new.status.clone(),
            });
        }

        if old.active != new.active {
            changes.push(StateChange::ActivationChanged { active: new.active });
        }

        changes
    }

    // Convenience methods for common state updates

    /// Set or clear the loaded session
    pub fn set_session(&self, session: Option<EditorSession>) -> Vec<StateChange> {
        self.update(move |state| {
            state.session = session;
        })
    }

    /// Set the status line
    pub fn set_status(&self, status: impl Into<String>) -> Vec<StateChange> {
        let status = status.into();
        self.update(move |state| {
            state.status = status;
        })
    }

    /// Record whether the main window has the user's attention
    pub fn set_active(&self, active: bool) -> Vec<StateChange> {
        self.update(move |state| {
            state.active = active;
        })
    }

    /// Get an Arc reference to the state for use in worker threads
    ///
    /// Use this when you need to share state across threads but want
    /// to minimize cloning. Remember to use read/write locks appropriately.
    pub fn state_arc(&self) -> Arc<RwLock<StudioState>> {
        Arc::clone(&self.state)
    }
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new()
    }
}

// Make StateManager cloneable for sharing across threads
impl Clone for StateManager {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            state_tx: self.state_tx.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;

    fn sample_session() -> EditorSession {
        EditorSession {
            name: "SpaceGame".to_string(),
            manifest_path: Utf8PathBuf::from("/projects/SpaceGame/SpaceGame.meridian"),
            engine_version: "0.4.0".to_string(),
            packages: vec!["assets".to_string()],
        }
    }

    #[test]
    fn test_new_state_manager() {
        let manager = StateManager::new();
        let state = manager.snapshot();

        assert!(state.session.is_none());
        assert!(state.status.is_empty());
        assert!(!state.active);
    }

    #[test]
    fn test_update_with_change_detection() {
        let manager = StateManager::new();

        let changes = manager.update(|state| {
            state.session = Some(sample_session());
            state.status = "Ready".to_string();
        });

        assert_eq!(changes.len(), 2);
        assert!(matches!(changes[0], StateChange::SessionChanged { loaded: true }));
        assert!(matches!(changes[1], StateChange::StatusChanged { .. }));
    }

    #[test]
    fn test_no_events_for_identical_state() {
        let manager = StateManager::new();
        manager.set_status("Ready");

        let changes = manager.set_status("Ready");
        assert!(changes.is_empty());
    }

    #[test]
    fn test_session_swap_emits_event() {
        let manager = StateManager::new();
        manager.set_session(Some(sample_session()));

        let mut other = sample_session();
        other.name = "OtherGame".to_string();
        let changes = manager.set_session(Some(other));

        assert_eq!(changes.len(), 1);
        assert!(matches!(changes[0], StateChange::SessionChanged { loaded: true }));
    }

    #[test]
    fn test_session_unload() {
        let manager = StateManager::new();
        manager.set_session(Some(sample_session()));

        let changes = manager.set_session(None);
        assert!(matches!(changes[0], StateChange::SessionChanged { loaded: false }));
        assert!(manager.snapshot().session.is_none());
    }

    #[test]
    fn test_activation_changes() {
        let manager = StateManager::new();

        let changes = manager.set_active(true);
        assert!(matches!(changes[0], StateChange::ActivationChanged { active: true }));

        let changes = manager.set_active(true);
        assert!(changes.is_empty());

        let changes = manager.set_active(false);
        assert!(matches!(changes[0], StateChange::ActivationChanged { active: false }));
    }

    #[test]
    fn test_subscribe_to_changes() {
        let manager = StateManager::new();
        let mut rx = manager.subscribe();

        // Make a change
        manager.set_status("Opening project...");

        // Should receive the event
        let event = rx.try_recv();
        assert!(event.is_ok());
        assert!(matches!(event.unwrap(), StateChange::StatusChanged { .. }));
    }

    #[test]
    fn test_multiple_subscribers() {
        let manager = StateManager::new();
        let mut rx1 = manager.subscribe();
        let mut rx2 = manager.subscribe();

        manager.set_session(Some(sample_session()));

        // Both subscribers should receive the event
        assert!(rx1.try_recv().is_ok());
        assert!(rx2.try_recv().is_ok());
    }

    #[test]
    fn test_read_with_closure() {
        let manager = StateManager::new();
        manager.set_session(Some(sample_session()));

        let name = manager.read(|state| state.session.as_ref().map(|s| s.name.clone()));
        assert_eq!(name, Some("SpaceGame".to_string()));
    }

    #[test]
    fn test_clone_state_manager() {
        let manager1 = StateManager::new();
        let manager2 = manager1.clone();

        // Update through one manager
        manager1.set_status("shared".to_string());

        // Changes should be visible through the clone
        let state = manager2.snapshot();
        assert_eq!(state.status, "shared");
    }

    #[test]
    fn test_state_arc() {
        let manager = StateManager::new();
        let state_arc = manager.state_arc();

        // Modify through the Arc
        {
            let mut state = state_arc.write().unwrap();
            state.active = true;
        }

        // Changes should be visible through manager
        let state = manager.snapshot();
        assert!(state.active);
    }
}
