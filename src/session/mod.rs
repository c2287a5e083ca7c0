//! Project session lifecycle: manifests, templates, and opening.
//!
//! Functions here are framework-agnostic and synchronous; the startup flow
//! offloads them to the tokio runtime through the dispatcher and composes
//! them with dialogs into the interactive open and create operations.
//!
//! Opening is split in two so a prompt can sit between the halves:
//! [`begin_open`] parses the manifest and gates on the engine version, then
//! [`complete_open`] optionally upgrades the manifest and lets every plugin
//! initialize. A plugin failure during the second half leaves the session
//! partially initialized, which the caller must treat as indeterminate.

use crate::models::{
    EditorSession, NewSessionParams, ProjectManifest, SessionOutcome, TemplateDescription,
};
use crate::services::{PluginError, PluginRegistry};
use camino::{Utf8Path, Utf8PathBuf};
use semver::Version;
use std::fs;
use thiserror::Error;

/// File extension of project manifests.
pub const MANIFEST_EXTENSION: &str = "meridian";

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Project manifest not found: {0}")]
    ManifestNotFound(Utf8PathBuf),

    #[error("Failed to read {path}: {source}")]
    ManifestRead {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    ManifestParse {
        path: Utf8PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },

    #[error("Failed to serialize manifest for {path}: {source}")]
    ManifestSerialize {
        path: Utf8PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },

    #[error("Invalid engine version {version:?} in {path}")]
    InvalidVersion { version: String, path: Utf8PathBuf },

    #[error("Project {name} needs engine {found}, newer than this editor ({editor})")]
    EngineTooNew {
        name: String,
        found: String,
        editor: String,
    },

    #[error("Unknown template: {0}")]
    UnknownTemplate(String),

    #[error("Invalid project name: {0:?}")]
    InvalidName(String),

    #[error("Target directory {0} already exists and is not empty")]
    TargetExists(Utf8PathBuf),

    #[error("Plugin initialization failed: {0}")]
    Plugin(#[from] PluginError),

    #[error("Project I/O failure at {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What [`begin_open`] found at the path.
#[derive(Debug, Clone, PartialEq)]
pub enum OpenAttempt {
    /// Manifest matches the running engine; proceed directly.
    Ready(ProjectManifest),

    /// Manifest comes from an older engine. The user decides whether to
    /// upgrade it; declining abandons the open.
    NeedsUpgrade(ProjectManifest),
}

/// Read and parse a project manifest.
pub fn load_manifest(path: &Utf8Path) -> Result<ProjectManifest, SessionError> {
    if !path.is_file() {
        return Err(SessionError::ManifestNotFound(path.to_path_buf()));
    }

    let contents = fs::read_to_string(path).map_err(|e| SessionError::ManifestRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    serde_yaml_ng::from_str(&contents).map_err(|e| SessionError::ManifestParse {
        path: path.to_path_buf(),
        source: e,
    })
}

fn write_manifest(path: &Utf8Path, manifest: &ProjectManifest) -> Result<(), SessionError> {
    let yaml = serde_yaml_ng::to_string(manifest).map_err(|e| SessionError::ManifestSerialize {
        path: path.to_path_buf(),
        source: e,
    })?;
    fs::write(path, yaml).map_err(|e| SessionError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Parse the manifest at `path` and gate on its engine version.
///
/// Projects from a newer engine are refused outright. Projects from an
/// older engine come back as [`OpenAttempt::NeedsUpgrade`] so the caller
/// can ask before anything is rewritten.
pub fn begin_open(path: &Utf8Path) -> Result<OpenAttempt, SessionError> {
    let manifest = load_manifest(path)?;

    let project_version =
        Version::parse(&manifest.engine_version).map_err(|_| SessionError::InvalidVersion {
            version: manifest.engine_version.clone(),
            path: path.to_path_buf(),
        })?;
    let editor_version = editor_version();

    if project_version > editor_version {
        return Err(SessionError::EngineTooNew {
            name: manifest.name.clone(),
            found: manifest.engine_version.clone(),
            editor: crate::VERSION.to_string(),
        });
    }

    if project_version < editor_version {
        tracing::info!(
            "Project {} uses engine {}, editor is {}",
            manifest.name,
            manifest.engine_version,
            crate::VERSION
        );
        return Ok(OpenAttempt::NeedsUpgrade(manifest));
    }

    Ok(OpenAttempt::Ready(manifest))
}

/// Finish opening a session.
///
/// With `upgrade` set the manifest is rewritten to the current engine
/// version first. Every registered plugin then initializes against the
/// project; the first plugin failure aborts and leaves the session
/// partially initialized.
pub fn complete_open(
    path: &Utf8Path,
    mut manifest: ProjectManifest,
    upgrade: bool,
    plugins: &PluginRegistry,
) -> Result<EditorSession, SessionError> {
    let project_dir = path.parent().unwrap_or(Utf8Path::new(".")).to_path_buf();

    if upgrade && manifest.engine_version != crate::VERSION {
        tracing::info!(
            "Upgrading {} from engine {} to {}",
            manifest.name,
            manifest.engine_version,
            crate::VERSION
        );
        manifest.engine_version = crate::VERSION.to_string();
        write_manifest(path, &manifest)?;
    }

    let initialized = plugins.initialize_session(&manifest, &project_dir)?;
    tracing::info!(
        "Session {} opened: {} packages, {} plugins initialized",
        manifest.name,
        manifest.packages.len(),
        initialized
    );

    Ok(EditorSession {
        name: manifest.name.clone(),
        manifest_path: path.to_path_buf(),
        engine_version: manifest.engine_version,
        packages: manifest.packages,
    })
}

/// Scaffold a new project from a template; returns the manifest path.
///
/// The project lands in `<output_dir>/<name>`. A non-empty existing target
/// is refused unless `replace` was confirmed by the caller.
pub fn instantiate_template(
    template: &TemplateDescription,
    params: &NewSessionParams,
    replace: bool,
) -> Result<Utf8PathBuf, SessionError> {
    validate_project_name(&params.name)?;

    let project_dir = params.output_dir.join(&params.name);
    if project_dir.exists() && !replace && !dir_is_empty(&project_dir)? {
        return Err(SessionError::TargetExists(project_dir));
    }

    let io_err = |path: &Utf8Path| {
        let path = path.to_path_buf();
        move |e| SessionError::Io { path, source: e }
    };

    fs::create_dir_all(&project_dir).map_err(io_err(&project_dir))?;

    for package in &template.packages {
        let package_dir = project_dir.join(package);
        fs::create_dir_all(&package_dir).map_err(io_err(&package_dir))?;
    }

    for (rel_path, contents) in &template.starter_files {
        let file_path = project_dir.join(rel_path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).map_err(io_err(parent))?;
        }
        fs::write(&file_path, contents).map_err(io_err(&file_path))?;
    }

    let manifest = ProjectManifest {
        name: params.name.clone(),
        engine_version: crate::VERSION.to_string(),
        packages: template.packages.clone(),
        description: Some(format!("Created from the {} template", template.name)),
    };
    let manifest_path = project_dir.join(format!("{}.{}", params.name, MANIFEST_EXTENSION));
    write_manifest(&manifest_path, &manifest)?;

    tracing::info!("Project {} scaffolded at {}", params.name, project_dir);
    Ok(manifest_path)
}

/// Find a template by id in the offered list.
pub fn find_template<'a>(
    templates: &'a [TemplateDescription],
    id: &str,
) -> Result<&'a TemplateDescription, SessionError> {
    templates
        .iter()
        .find(|t| t.id == id)
        .ok_or_else(|| SessionError::UnknownTemplate(id.to_string()))
}

/// Fold an open/create result into the outcome the relaunch gate reads.
///
/// User-declined prompts never reach this point; the flow maps those to
/// [`SessionOutcome::Cancelled`] directly.
pub fn outcome_of(result: &Result<EditorSession, SessionError>) -> SessionOutcome {
    match result {
        Ok(_) => SessionOutcome::Completed,
        Err(_) => SessionOutcome::Faulted,
    }
}

fn validate_project_name(name: &str) -> Result<(), SessionError> {
    let valid = !name.is_empty()
        && !name.starts_with(['.', ' '])
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == ' ');
    if valid {
        Ok(())
    } else {
        Err(SessionError::InvalidName(name.to_string()))
    }
}

fn dir_is_empty(dir: &Utf8Path) -> Result<bool, SessionError> {
    let mut entries = fs::read_dir(dir.as_std_path()).map_err(|e| SessionError::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;
    Ok(entries.next().is_none())
}

fn editor_version() -> Version {
    Version::parse(crate::VERSION).expect("Invalid crate version")
}
