//! Session resolution state machine.
//!
//! Startup walks a small set of phases: try the initial session if one is
//! known, fall back to the project picker, run whichever operation the
//! picker produced, and either show the editor, exit, or relaunch the
//! process. `advance` is a pure transition function; the driver in the
//! parent module performs the side effects each phase calls for and feeds
//! the result back in as an event.

use camino::Utf8PathBuf;
use tracing::warn;

use crate::models::{NewSessionParams, SessionOutcome};

/// Where the startup sequence currently stands.
#[derive(Debug, Clone, PartialEq)]
pub enum StartupPhase {
    /// No session path is known; the picker is next.
    NoPath,

    /// Opening the session supplied on the command line or restored from
    /// the editor profile.
    TryOpenInitial(Utf8PathBuf),

    /// The project picker is on screen, waiting for a choice.
    ShowPicker,

    /// Instantiating a template the picker chose.
    CreateNew(NewSessionParams),

    /// Opening an existing project the picker chose.
    OpenExisting(Utf8PathBuf),

    /// A partial failure occurred. Waiting for every window to unload
    /// before spawning a replacement process.
    RelaunchPending,

    /// A session is loaded; the editor window can be shown.
    Ready,

    /// Shut down without showing the editor.
    Exit,
}

/// The result of whatever side effect the current phase required.
#[derive(Debug, Clone, PartialEq)]
pub enum StartupEvent {
    /// The phase needed no external input.
    Proceed,

    /// The initial session open finished, successfully or not.
    InitialOpenFinished { loaded: bool },

    /// The picker chose a template to instantiate.
    TemplateChosen(NewSessionParams),

    /// The picker chose an existing project file.
    ExistingChosen(Utf8PathBuf),

    /// The picker was dismissed without a choice.
    PickerCancelled,

    /// A create or open operation ran to an outcome.
    OperationFinished {
        outcome: SessionOutcome,
        session_loaded: bool,
    },

    /// The replacement process has been spawned.
    RelaunchIssued,
}

/// Phase to start from, given the resolved initial session path.
pub fn initial_phase(initial_session: Option<Utf8PathBuf>) -> StartupPhase {
    match initial_session {
        Some(path) => StartupPhase::TryOpenInitial(path),
        None => StartupPhase::NoPath,
    }
}

/// Apply one event to the current phase.
///
/// Total over all phase/event pairs: a pair the table does not expect is
/// logged and resolves to [`StartupPhase::Exit`] so a driver bug can never
/// leave the sequence spinning.
pub fn advance(phase: StartupPhase, event: StartupEvent) -> StartupPhase {
    match (phase, event) {
        (StartupPhase::NoPath, StartupEvent::Proceed) => StartupPhase::ShowPicker,

        // A failed initial open falls back to the picker rather than the
        // relaunch path, whatever the failure was.
        (StartupPhase::TryOpenInitial(_), StartupEvent::InitialOpenFinished { loaded }) => {
            if loaded {
                StartupPhase::Ready
            } else {
                StartupPhase::ShowPicker
            }
        }

        (StartupPhase::ShowPicker, StartupEvent::TemplateChosen(params)) => {
            StartupPhase::CreateNew(params)
        }
        (StartupPhase::ShowPicker, StartupEvent::ExistingChosen(path)) => {
            StartupPhase::OpenExisting(path)
        }
        (StartupPhase::ShowPicker, StartupEvent::PickerCancelled) => StartupPhase::Exit,

        (
            StartupPhase::CreateNew(_) | StartupPhase::OpenExisting(_),
            StartupEvent::OperationFinished {
                outcome,
                session_loaded,
            },
        ) => resolve_operation(outcome, session_loaded),

        (StartupPhase::RelaunchPending, StartupEvent::RelaunchIssued) => StartupPhase::Exit,

        (phase, event) => {
            warn!(
                "Unexpected startup event {:?} in phase {:?}, shutting down",
                event, phase
            );
            StartupPhase::Exit
        }
    }
}

/// Resolve the three-way outcome of a picker-launched operation.
fn resolve_operation(outcome: SessionOutcome, session_loaded: bool) -> StartupPhase {
    match outcome {
        SessionOutcome::Completed if session_loaded => StartupPhase::Ready,
        SessionOutcome::Completed => StartupPhase::Exit,

        // The user backed out mid-operation; offer the picker again.
        SessionOutcome::Cancelled => StartupPhase::ShowPicker,

        // Plugins may be partially initialized in a way that cannot be
        // torn down in-process. Restarting the editor is the only safe
        // recovery.
        SessionOutcome::Faulted => StartupPhase::RelaunchPending,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> NewSessionParams {
        NewSessionParams {
            name: "Shooter".to_string(),
            template_id: "game3d".to_string(),
            output_dir: Utf8PathBuf::from("/projects"),
        }
    }

    #[test]
    fn test_initial_phase_with_path() {
        let phase = initial_phase(Some(Utf8PathBuf::from("game.meridian")));
        assert_eq!(
            phase,
            StartupPhase::TryOpenInitial(Utf8PathBuf::from("game.meridian"))
        );
    }

    #[test]
    fn test_initial_phase_without_path() {
        assert_eq!(initial_phase(None), StartupPhase::NoPath);
    }

    #[test]
    fn test_no_path_proceeds_to_picker() {
        let phase = advance(StartupPhase::NoPath, StartupEvent::Proceed);
        assert_eq!(phase, StartupPhase::ShowPicker);
    }

    #[test]
    fn test_initial_open_success_is_ready() {
        let phase = advance(
            StartupPhase::TryOpenInitial(Utf8PathBuf::from("game.meridian")),
            StartupEvent::InitialOpenFinished { loaded: true },
        );
        assert_eq!(phase, StartupPhase::Ready);
    }

    #[test]
    fn test_initial_open_failure_falls_back_to_picker() {
        let phase = advance(
            StartupPhase::TryOpenInitial(Utf8PathBuf::from("game.meridian")),
            StartupEvent::InitialOpenFinished { loaded: false },
        );
        assert_eq!(phase, StartupPhase::ShowPicker);
    }

    #[test]
    fn test_picker_choices() {
        assert_eq!(
            advance(
                StartupPhase::ShowPicker,
                StartupEvent::TemplateChosen(params())
            ),
            StartupPhase::CreateNew(params())
        );
        assert_eq!(
            advance(
                StartupPhase::ShowPicker,
                StartupEvent::ExistingChosen(Utf8PathBuf::from("other.meridian"))
            ),
            StartupPhase::OpenExisting(Utf8PathBuf::from("other.meridian"))
        );
        assert_eq!(
            advance(StartupPhase::ShowPicker, StartupEvent::PickerCancelled),
            StartupPhase::Exit
        );
    }

    #[test]
    fn test_completed_operation_shows_editor() {
        let phase = advance(
            StartupPhase::CreateNew(params()),
            StartupEvent::OperationFinished {
                outcome: SessionOutcome::Completed,
                session_loaded: true,
            },
        );
        assert_eq!(phase, StartupPhase::Ready);
    }

    #[test]
    fn test_cancelled_operation_reopens_picker() {
        let phase = advance(
            StartupPhase::CreateNew(params()),
            StartupEvent::OperationFinished {
                outcome: SessionOutcome::Cancelled,
                session_loaded: false,
            },
        );
        assert_eq!(phase, StartupPhase::ShowPicker);
    }

    #[test]
    fn test_faulted_operation_requests_relaunch() {
        for phase in [
            StartupPhase::CreateNew(params()),
            StartupPhase::OpenExisting(Utf8PathBuf::from("broken.meridian")),
        ] {
            let next = advance(
                phase,
                StartupEvent::OperationFinished {
                    outcome: SessionOutcome::Faulted,
                    session_loaded: false,
                },
            );
            assert_eq!(next, StartupPhase::RelaunchPending);
        }
    }

    #[test]
    fn test_completed_without_session_exits() {
        let phase = advance(
            StartupPhase::OpenExisting(Utf8PathBuf::from("game.meridian")),
            StartupEvent::OperationFinished {
                outcome: SessionOutcome::Completed,
                session_loaded: false,
            },
        );
        assert_eq!(phase, StartupPhase::Exit);
    }

    #[test]
    fn test_relaunch_issued_exits() {
        let phase = advance(StartupPhase::RelaunchPending, StartupEvent::RelaunchIssued);
        assert_eq!(phase, StartupPhase::Exit);
    }

    #[test]
    fn test_unexpected_pair_exits() {
        let phase = advance(StartupPhase::Ready, StartupEvent::PickerCancelled);
        assert_eq!(phase, StartupPhase::Exit);
    }

    #[test]
    fn test_cancel_retry_loop_stays_on_picker() {
        // Cancelling a creation repeatedly must keep offering the picker.
        let mut phase = StartupPhase::NoPath;
        phase = advance(phase, StartupEvent::Proceed);
        for _ in 0..3 {
            phase = advance(phase, StartupEvent::TemplateChosen(params()));
            phase = advance(
                phase,
                StartupEvent::OperationFinished {
                    outcome: SessionOutcome::Cancelled,
                    session_loaded: false,
                },
            );
            assert_eq!(phase, StartupPhase::ShowPicker);
        }
    }
}
