//! Editor plugin registration and session initialization.
//!
//! Plugins contribute project templates to the picker and take part in
//! opening a session. Initialization runs in registration order and stops at
//! the first failure; whatever the earlier plugins did stays on disk, which
//! is why a failed open counts as indeterminate for the startup flow.

use crate::models::{ProjectManifest, TemplateDescription};
use camino::Utf8Path;
use std::fs;
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Errors raised while plugins initialize a session.
#[derive(Error, Debug)]
pub enum PluginError {
    #[error("Plugin {plugin} failed on package {package}: {reason}")]
    PackageInit {
        plugin: &'static str,
        package: String,
        reason: String,
    },

    #[error("Plugin {plugin} I/O failure: {source}")]
    Io {
        plugin: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// A unit of editor functionality registered at startup.
pub trait EditorPlugin: Send + Sync {
    /// Stable name, used for registration dedup and logging.
    fn name(&self) -> &'static str;

    /// Templates this plugin offers in the new-project picker.
    fn session_templates(&self) -> Vec<TemplateDescription> {
        Vec::new()
    }

    /// Prepare the plugin's view of a freshly opened session.
    ///
    /// May leave partial state behind on failure.
    fn initialize_session(
        &self,
        manifest: &ProjectManifest,
        project_dir: &Utf8Path,
    ) -> Result<(), PluginError>;
}

/// Ordered registry of editor plugins.
pub struct PluginRegistry {
    plugins: RwLock<Vec<Arc<dyn EditorPlugin>>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self {
            plugins: RwLock::new(Vec::new()),
        }
    }

    /// Register a plugin; a repeated name is ignored.
    pub fn register(&self, plugin: Arc<dyn EditorPlugin>) {
        let mut plugins = self.plugins.write().unwrap();
        if plugins.iter().any(|p| p.name() == plugin.name()) {
            tracing::debug!("Plugin {} already registered", plugin.name());
            return;
        }
        tracing::info!("Registered plugin: {}", plugin.name());
        plugins.push(plugin);
    }

    pub fn plugin_count(&self) -> usize {
        self.plugins.read().unwrap().len()
    }

    /// All templates, in plugin registration order.
    pub fn session_templates(&self) -> Vec<TemplateDescription> {
        self.plugins
            .read()
            .unwrap()
            .iter()
            .flat_map(|p| p.session_templates())
            .collect()
    }

    /// Run every plugin against an opened session.
    ///
    /// The first failure aborts and is returned; earlier plugins stay
    /// initialized.
    ///
    /// # Returns
    /// The number of plugins that initialized
    pub fn initialize_session(
        &self,
        manifest: &ProjectManifest,
        project_dir: &Utf8Path,
    ) -> Result<usize, PluginError> {
        let plugins = self.plugins.read().unwrap();
        let mut initialized = 0;

        for plugin in plugins.iter() {
            match plugin.initialize_session(manifest, project_dir) {
                Ok(()) => {
                    tracing::debug!("Plugin {} initialized for {}", plugin.name(), manifest.name);
                    initialized += 1;
                }
                Err(e) => {
                    tracing::error!(
                        "Plugin {} failed with {} of {} plugins initialized: {}",
                        plugin.name(),
                        initialized,
                        plugins.len(),
                        e
                    );
                    return Err(e);
                }
            }
        }

        Ok(initialized)
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Validates the session's asset packages and offers the built-in templates.
pub struct AssetPackagesPlugin;

impl AssetPackagesPlugin {
    const NAME: &'static str = "asset-packages";
}

impl EditorPlugin for AssetPackagesPlugin {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn session_templates(&self) -> Vec<TemplateDescription> {
        vec![
            TemplateDescription {
                id: "empty".to_string(),
                name: "Empty project".to_string(),
                description: "An asset package and nothing else".to_string(),
                packages: vec!["assets".to_string()],
                starter_files: vec![(
                    "assets/readme.md".to_string(),
                    "Drop your assets here.\n".to_string(),
                )],
            },
            TemplateDescription {
                id: "game2d".to_string(),
                name: "2D game".to_string(),
                description: "Orthographic camera, a sprite, and a starter scene".to_string(),
                packages: vec!["assets".to_string(), "code".to_string()],
                starter_files: vec![
                    (
                        "assets/scenes/main.scene".to_string(),
                        "name: MainScene\nentities:\n- camera2d\n- sprite\n".to_string(),
                    ),
                    (
                        "code/readme.md".to_string(),
                        "Game code compiled by the asset pipeline lives here.\n".to_string(),
                    ),
                ],
            },
            TemplateDescription {
                id: "game3d".to_string(),
                name: "3D game".to_string(),
                description: "Perspective camera, a light, and a ground plane".to_string(),
                packages: vec!["assets".to_string(), "code".to_string()],
                starter_files: vec![
                    (
                        "assets/scenes/main.scene".to_string(),
                        "name: MainScene\nentities:\n- camera3d\n- directional_light\n- ground\n"
                            .to_string(),
                    ),
                    (
                        "code/readme.md".to_string(),
                        "Game code compiled by the asset pipeline lives here.\n".to_string(),
                    ),
                ],
            },
        ]
    }

    fn initialize_session(
        &self,
        manifest: &ProjectManifest,
        project_dir: &Utf8Path,
    ) -> Result<(), PluginError> {
        for package in &manifest.packages {
            let package_dir = project_dir.join(package);
            if !package_dir.is_dir() {
                return Err(PluginError::PackageInit {
                    plugin: Self::NAME,
                    package: package.clone(),
                    reason: format!("package directory missing: {}", package_dir),
                });
            }

            let entries = fs::read_dir(package_dir.as_std_path())
                .map_err(|e| PluginError::Io {
                    plugin: Self::NAME,
                    source: e,
                })?
                .count();
            tracing::debug!("Package {} holds {} entries", package, entries);
        }
        Ok(())
    }
}

/// Prepares the editor-side cache directory inside the project.
pub struct EditorCachePlugin;

impl EditorCachePlugin {
    const NAME: &'static str = "editor-cache";

    /// Directory name created at the project root.
    pub const CACHE_DIR: &'static str = ".meridian-cache";
}

impl EditorPlugin for EditorCachePlugin {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn initialize_session(
        &self,
        manifest: &ProjectManifest,
        project_dir: &Utf8Path,
    ) -> Result<(), PluginError> {
        let cache_dir = project_dir.join(Self::CACHE_DIR);
        fs::create_dir_all(&cache_dir).map_err(|e| PluginError::Io {
            plugin: Self::NAME,
            source: e,
        })?;

        let stamp = format!("{}\n{}\n", manifest.name, crate::VERSION);
        fs::write(cache_dir.join("session.stamp"), stamp).map_err(|e| PluginError::Io {
            plugin: Self::NAME,
            source: e,
        })?;

        Ok(())
    }
}
