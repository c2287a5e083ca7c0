//! Integration tests for the startup sequence
//!
//! These tests walk complete launch journeys through argument parsing and
//! the session resolution state machine:
//! - Reopening the previous session, with and without overrides
//! - Falling back to the project picker and retrying from it
//! - The relaunch path for partial failures
//! - Plain exits for cancellation and sessionless completion

use camino::Utf8PathBuf;
use meridian_studio::SessionOutcome;
use meridian_studio::models::NewSessionParams;
use meridian_studio::startup::{StartupEvent, StartupPhase, StudioArgs, advance, initial_phase};

fn launch(args: &[&str], seed: Option<&str>) -> StartupPhase {
    let seed = seed.map(Utf8PathBuf::from);
    let parsed = StudioArgs::parse(args.iter().copied(), seed).unwrap();
    initial_phase(parsed.initial_session)
}

fn picker_params() -> NewSessionParams {
    NewSessionParams {
        name: "Racer".to_string(),
        template_id: "game3d".to_string(),
        output_dir: Utf8PathBuf::from("/projects"),
    }
}

#[test]
fn test_first_launch_creates_through_picker() {
    // Fresh install: no arguments, nothing to restore
    let mut phase = launch(&[], None);
    assert_eq!(phase, StartupPhase::NoPath);

    phase = advance(phase, StartupEvent::Proceed);
    assert_eq!(phase, StartupPhase::ShowPicker);

    phase = advance(phase, StartupEvent::TemplateChosen(picker_params()));
    assert_eq!(phase, StartupPhase::CreateNew(picker_params()));

    phase = advance(
        phase,
        StartupEvent::OperationFinished {
            outcome: SessionOutcome::Completed,
            session_loaded: true,
        },
    );
    assert_eq!(phase, StartupPhase::Ready);
}

#[test]
fn test_restored_session_opens_directly() {
    let phase = launch(&[], Some("/projects/Last/Last.meridian"));
    assert_eq!(
        phase,
        StartupPhase::TryOpenInitial(Utf8PathBuf::from("/projects/Last/Last.meridian"))
    );

    let phase = advance(phase, StartupEvent::InitialOpenFinished { loaded: true });
    assert_eq!(phase, StartupPhase::Ready);
}

#[test]
fn test_command_line_path_overrides_restored_session() {
    let phase = launch(
        &["/projects/Other/Other.meridian"],
        Some("/projects/Last/Last.meridian"),
    );
    assert_eq!(
        phase,
        StartupPhase::TryOpenInitial(Utf8PathBuf::from("/projects/Other/Other.meridian"))
    );
}

#[test]
fn test_new_project_switch_goes_straight_to_picker() {
    // /NewProject discards both the restored session and any path argument
    let mut phase = launch(
        &["/NewProject", "/projects/Other/Other.meridian"],
        Some("/projects/Last/Last.meridian"),
    );
    assert_eq!(phase, StartupPhase::NoPath);

    phase = advance(phase, StartupEvent::Proceed);
    assert_eq!(phase, StartupPhase::ShowPicker);
}

#[test]
fn test_capture_switches_do_not_disturb_the_session_path() {
    let parsed = StudioArgs::parse(
        ["/RenderDoc", "/RecordEffects", "effects.yaml", "game.meridian"],
        None,
    )
    .unwrap();
    assert!(parsed.capture);
    assert_eq!(parsed.effect_log, Some(Utf8PathBuf::from("effects.yaml")));

    let phase = initial_phase(parsed.initial_session);
    assert_eq!(
        phase,
        StartupPhase::TryOpenInitial(Utf8PathBuf::from("game.meridian"))
    );
}

#[test]
fn test_stale_recent_entry_falls_back_and_recovers() {
    // The restored project was deleted on disk; the open fails, the picker
    // appears, and browsing to another project still succeeds
    let mut phase = launch(&[], Some("/projects/Gone/Gone.meridian"));

    phase = advance(phase, StartupEvent::InitialOpenFinished { loaded: false });
    assert_eq!(phase, StartupPhase::ShowPicker);

    phase = advance(
        phase,
        StartupEvent::ExistingChosen(Utf8PathBuf::from("/projects/Here/Here.meridian")),
    );
    assert_eq!(
        phase,
        StartupPhase::OpenExisting(Utf8PathBuf::from("/projects/Here/Here.meridian"))
    );

    phase = advance(
        phase,
        StartupEvent::OperationFinished {
            outcome: SessionOutcome::Completed,
            session_loaded: true,
        },
    );
    assert_eq!(phase, StartupPhase::Ready);
}

#[test]
fn test_failed_initial_open_never_relaunches() {
    // Only picker-launched operations can fault into a relaunch; a broken
    // initial session always lands on the picker
    let phase = launch(&["broken.meridian"], None);
    let phase = advance(phase, StartupEvent::InitialOpenFinished { loaded: false });
    assert_eq!(phase, StartupPhase::ShowPicker);
}

#[test]
fn test_dismissing_the_picker_is_a_plain_exit() {
    let mut phase = launch(&[], None);
    phase = advance(phase, StartupEvent::Proceed);
    phase = advance(phase, StartupEvent::PickerCancelled);
    assert_eq!(phase, StartupPhase::Exit);
}

#[test]
fn test_declined_prompt_returns_to_picker_until_success() {
    let mut phase = launch(&[], None);
    phase = advance(phase, StartupEvent::Proceed);

    // The user picks a template, then declines the replace-folder prompt
    phase = advance(phase, StartupEvent::TemplateChosen(picker_params()));
    phase = advance(
        phase,
        StartupEvent::OperationFinished {
            outcome: SessionOutcome::Cancelled,
            session_loaded: false,
        },
    );
    assert_eq!(phase, StartupPhase::ShowPicker);

    // Second try with a different answer goes through
    phase = advance(phase, StartupEvent::TemplateChosen(picker_params()));
    phase = advance(
        phase,
        StartupEvent::OperationFinished {
            outcome: SessionOutcome::Completed,
            session_loaded: true,
        },
    );
    assert_eq!(phase, StartupPhase::Ready);
}

#[test]
fn test_faulted_create_relaunches_then_exits() {
    let mut phase = launch(&[], None);
    phase = advance(phase, StartupEvent::Proceed);
    phase = advance(phase, StartupEvent::TemplateChosen(picker_params()));

    // Template instantiation died half way through writing the project
    phase = advance(
        phase,
        StartupEvent::OperationFinished {
            outcome: SessionOutcome::Faulted,
            session_loaded: false,
        },
    );
    assert_eq!(phase, StartupPhase::RelaunchPending);

    // Once the replacement process is up, this process leaves
    phase = advance(phase, StartupEvent::RelaunchIssued);
    assert_eq!(phase, StartupPhase::Exit);
}

#[test]
fn test_faulted_open_from_picker_relaunches() {
    let mut phase = launch(&[], None);
    phase = advance(phase, StartupEvent::Proceed);
    phase = advance(
        phase,
        StartupEvent::ExistingChosen(Utf8PathBuf::from("/projects/Bad/Bad.meridian")),
    );
    phase = advance(
        phase,
        StartupEvent::OperationFinished {
            outcome: SessionOutcome::Faulted,
            session_loaded: false,
        },
    );
    assert_eq!(phase, StartupPhase::RelaunchPending);
}

#[test]
fn test_completed_without_a_session_exits_quietly() {
    let mut phase = launch(&[], None);
    phase = advance(phase, StartupEvent::Proceed);
    phase = advance(
        phase,
        StartupEvent::ExistingChosen(Utf8PathBuf::from("/projects/X/X.meridian")),
    );
    phase = advance(
        phase,
        StartupEvent::OperationFinished {
            outcome: SessionOutcome::Completed,
            session_loaded: false,
        },
    );
    assert_eq!(phase, StartupPhase::Exit);
}
