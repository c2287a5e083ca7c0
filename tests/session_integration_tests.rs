//! Integration tests for the project session lifecycle
//!
//! These tests verify:
//! - Template instantiation produces an openable project on disk
//! - The begin/complete open split and its engine version gate
//! - Manifest upgrades rewrite the engine version in place
//! - Plugin initialization against real project directories
//! - Occupied-target handling when creating projects

use camino::{Utf8Path, Utf8PathBuf};
use meridian_studio::models::{NewSessionParams, SessionOutcome, TemplateDescription};
use meridian_studio::services::{
    AssetPackagesPlugin, EditorCachePlugin, EditorPlugin, PluginRegistry,
};
use meridian_studio::session::{
    self, MANIFEST_EXTENSION, OpenAttempt, SessionError, begin_open, complete_open,
    instantiate_template, load_manifest,
};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn create_test_workspace() -> (TempDir, Utf8PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let workspace = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    (temp_dir, workspace)
}

fn builtin_registry() -> PluginRegistry {
    let registry = PluginRegistry::new();
    registry.register(Arc::new(AssetPackagesPlugin));
    registry.register(Arc::new(EditorCachePlugin));
    registry
}

fn builtin_template(id: &str) -> TemplateDescription {
    let templates = AssetPackagesPlugin.session_templates();
    session::find_template(&templates, id).unwrap().clone()
}

fn write_manifest_fixture(path: &Utf8Path, name: &str, engine_version: &str) {
    let yaml = format!(
        "name: {}\nengine_version: \"{}\"\npackages:\n- assets\n",
        name, engine_version
    );
    fs::write(path, yaml).unwrap();
}

#[test]
fn test_instantiate_then_open_full_cycle() {
    let (_temp_dir, workspace) = create_test_workspace();
    let params = NewSessionParams {
        name: "Asteroids".to_string(),
        template_id: "game3d".to_string(),
        output_dir: workspace.clone(),
    };

    // Scaffold the project from the built-in 3D template
    let manifest_path = instantiate_template(&builtin_template("game3d"), &params, false).unwrap();
    assert_eq!(
        manifest_path,
        workspace
            .join("Asteroids")
            .join(format!("Asteroids.{}", MANIFEST_EXTENSION))
    );
    assert!(workspace.join("Asteroids/assets/scenes/main.scene").is_file());
    assert!(workspace.join("Asteroids/code/readme.md").is_file());

    // A freshly scaffolded project matches the running engine
    let attempt = begin_open(&manifest_path).unwrap();
    let manifest = match attempt {
        OpenAttempt::Ready(manifest) => manifest,
        OpenAttempt::NeedsUpgrade(_) => panic!("fresh project should not need an upgrade"),
    };
    assert_eq!(manifest.name, "Asteroids");
    assert_eq!(manifest.engine_version, meridian_studio::VERSION);
    assert_eq!(manifest.packages, vec!["assets", "code"]);

    // Completing the open runs both built-in plugins
    let registry = builtin_registry();
    let session = complete_open(&manifest_path, manifest, false, &registry).unwrap();

    assert_eq!(session.name, "Asteroids");
    assert_eq!(session.manifest_path, manifest_path);
    assert_eq!(session.engine_version, meridian_studio::VERSION);

    // The cache plugin left its stamp inside the project
    let stamp_path = workspace
        .join("Asteroids")
        .join(EditorCachePlugin::CACHE_DIR)
        .join("session.stamp");
    let stamp = fs::read_to_string(stamp_path).unwrap();
    assert!(stamp.starts_with("Asteroids\n"));
    assert!(stamp.contains(meridian_studio::VERSION));
}

#[test]
fn test_older_project_needs_upgrade() {
    let (_temp_dir, workspace) = create_test_workspace();
    let manifest_path = workspace.join("Old.meridian");
    write_manifest_fixture(&manifest_path, "Old", "0.1.0");

    let attempt = begin_open(&manifest_path).unwrap();
    assert!(matches!(attempt, OpenAttempt::NeedsUpgrade(_)));
}

#[test]
fn test_upgrade_rewrites_manifest_version() {
    let (_temp_dir, workspace) = create_test_workspace();
    fs::create_dir_all(workspace.join("assets")).unwrap();
    let manifest_path = workspace.join("Old.meridian");
    write_manifest_fixture(&manifest_path, "Old", "0.1.0");

    let OpenAttempt::NeedsUpgrade(manifest) = begin_open(&manifest_path).unwrap() else {
        panic!("expected an upgrade offer for an older project");
    };

    let registry = builtin_registry();
    let session = complete_open(&manifest_path, manifest, true, &registry).unwrap();
    assert_eq!(session.engine_version, meridian_studio::VERSION);

    // The manifest on disk now carries the current engine version
    let reloaded = load_manifest(&manifest_path).unwrap();
    assert_eq!(reloaded.engine_version, meridian_studio::VERSION);
    assert_eq!(reloaded.name, "Old");
}

#[test]
fn test_complete_open_without_upgrade_keeps_version() {
    let (_temp_dir, workspace) = create_test_workspace();
    fs::create_dir_all(workspace.join("assets")).unwrap();
    let manifest_path = workspace.join("Old.meridian");
    write_manifest_fixture(&manifest_path, "Old", "0.1.0");

    let OpenAttempt::NeedsUpgrade(manifest) = begin_open(&manifest_path).unwrap() else {
        panic!("expected an upgrade offer for an older project");
    };

    // Opening without the upgrade keeps the old version on disk
    let registry = builtin_registry();
    let session = complete_open(&manifest_path, manifest, false, &registry).unwrap();
    assert_eq!(session.engine_version, "0.1.0");

    let reloaded = load_manifest(&manifest_path).unwrap();
    assert_eq!(reloaded.engine_version, "0.1.0");
}

#[test]
fn test_newer_project_is_refused() {
    let (_temp_dir, workspace) = create_test_workspace();
    let manifest_path = workspace.join("Future.meridian");
    write_manifest_fixture(&manifest_path, "Future", "99.0.0");

    let error = begin_open(&manifest_path).unwrap_err();
    match error {
        SessionError::EngineTooNew {
            name,
            found,
            editor,
        } => {
            assert_eq!(name, "Future");
            assert_eq!(found, "99.0.0");
            assert_eq!(editor, meridian_studio::VERSION);
        }
        other => panic!("expected EngineTooNew, got: {:?}", other),
    }
}

#[test]
fn test_unparseable_version_is_rejected() {
    let (_temp_dir, workspace) = create_test_workspace();
    let manifest_path = workspace.join("Garbled.meridian");
    write_manifest_fixture(&manifest_path, "Garbled", "latest");

    let error = begin_open(&manifest_path).unwrap_err();
    assert!(matches!(error, SessionError::InvalidVersion { .. }));
}

#[test]
fn test_malformed_manifest_is_a_parse_error() {
    let (_temp_dir, workspace) = create_test_workspace();
    let manifest_path = workspace.join("Broken.meridian");
    fs::write(&manifest_path, "name: [unclosed").unwrap();

    let error = begin_open(&manifest_path).unwrap_err();
    assert!(matches!(error, SessionError::ManifestParse { .. }));
}

#[test]
fn test_missing_package_faults_the_open() {
    let (_temp_dir, workspace) = create_test_workspace();
    let manifest_path = workspace.join("Hollow.meridian");
    // The manifest names an assets package that does not exist on disk
    write_manifest_fixture(&manifest_path, "Hollow", meridian_studio::VERSION);

    let OpenAttempt::Ready(manifest) = begin_open(&manifest_path).unwrap() else {
        panic!("version matches, open should be ready");
    };

    let registry = builtin_registry();
    let result = complete_open(&manifest_path, manifest, false, &registry);
    assert!(matches!(result, Err(SessionError::Plugin(_))));

    // A failed completion counts as indeterminate, not a clean cancel
    assert_eq!(session::outcome_of(&result), SessionOutcome::Faulted);
}

#[test]
fn test_occupied_target_is_refused_without_replace() {
    let (_temp_dir, workspace) = create_test_workspace();
    let project_dir = workspace.join("Taken");
    fs::create_dir_all(&project_dir).unwrap();
    fs::write(project_dir.join("leftover.txt"), "old files").unwrap();

    let params = NewSessionParams {
        name: "Taken".to_string(),
        template_id: "empty".to_string(),
        output_dir: workspace.clone(),
    };

    let error = instantiate_template(&builtin_template("empty"), &params, false).unwrap_err();
    assert!(matches!(error, SessionError::TargetExists(_)));

    // Confirming the replacement proceeds over the old contents
    let manifest_path = instantiate_template(&builtin_template("empty"), &params, true).unwrap();
    assert!(manifest_path.is_file());
}

#[test]
fn test_empty_existing_target_is_fine() {
    let (_temp_dir, workspace) = create_test_workspace();
    fs::create_dir_all(workspace.join("Fresh")).unwrap();

    let params = NewSessionParams {
        name: "Fresh".to_string(),
        template_id: "empty".to_string(),
        output_dir: workspace.clone(),
    };

    // An empty directory is not an occupied target
    assert!(instantiate_template(&builtin_template("empty"), &params, false).is_ok());
}

#[test]
fn test_invalid_name_rejected_before_any_writes() {
    let (_temp_dir, workspace) = create_test_workspace();
    let params = NewSessionParams {
        name: "../escape".to_string(),
        template_id: "empty".to_string(),
        output_dir: workspace.clone(),
    };

    let error = instantiate_template(&builtin_template("empty"), &params, false).unwrap_err();
    assert!(matches!(error, SessionError::InvalidName(_)));

    // Nothing was created in the output directory
    assert_eq!(fs::read_dir(workspace.as_std_path()).unwrap().count(), 0);
}

#[test]
fn test_scaffolded_manifest_describes_its_template() {
    let (_temp_dir, workspace) = create_test_workspace();
    let params = NewSessionParams {
        name: "Platformer".to_string(),
        template_id: "game2d".to_string(),
        output_dir: workspace.clone(),
    };

    let manifest_path = instantiate_template(&builtin_template("game2d"), &params, false).unwrap();
    let manifest = load_manifest(&manifest_path).unwrap();

    assert_eq!(manifest.name, "Platformer");
    assert_eq!(manifest.packages, vec!["assets", "code"]);
    let description = manifest.description.unwrap();
    assert!(description.contains("2D game"), "got: {}", description);
}
