//! Build toolchain discovery.
//!
//! The editor compiles game code through cargo, and the asset pipeline
//! cannot work without it. Startup refuses to continue past a failed
//! discovery; the caller shows guidance and shuts down instead.

use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;
use semver::Version;
use std::env;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tokio::time::timeout;

/// Minimum cargo version the asset pipeline supports.
pub const MIN_SUPPORTED_VERSION: &str = "1.75.0";

/// How long the version probe may take before being abandoned.
const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum ToolchainError {
    #[error("cargo was not found on PATH or via $CARGO")]
    NotFound,

    #[error("Failed to run {command}: {source}")]
    Probe {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Version probe timed out after {0:?}")]
    Timeout(Duration),

    #[error("Unrecognized cargo version output: {0}")]
    Unrecognized(String),

    #[error("cargo {found} is older than the minimum supported {required}")]
    TooOld { found: Version, required: Version },
}

/// A located, version-checked build toolchain.
#[derive(Debug, Clone)]
pub struct BuildToolchain {
    pub cargo: Utf8PathBuf,
    pub version: Version,
}

/// Locate cargo and verify it meets the minimum supported version.
pub async fn find_toolchain() -> Result<BuildToolchain, ToolchainError> {
    let cargo = locate_cargo().ok_or(ToolchainError::NotFound)?;
    let version = probe_version(&cargo).await?;

    let required =
        Version::parse(MIN_SUPPORTED_VERSION).expect("Invalid minimum toolchain version");
    if version < required {
        return Err(ToolchainError::TooOld {
            found: version,
            required,
        });
    }

    tracing::info!("Build toolchain: cargo {} at {}", version, cargo);
    Ok(BuildToolchain { cargo, version })
}

/// Find the cargo executable: `$CARGO` first, then PATH.
fn locate_cargo() -> Option<Utf8PathBuf> {
    if let Ok(explicit) = env::var("CARGO") {
        let path = Utf8PathBuf::from(explicit);
        if path.is_file() {
            return Some(path);
        }
        tracing::warn!("$CARGO points at {}, which does not exist", path);
    }

    let path_var = env::var_os("PATH")?;
    let dirs = env::split_paths(&path_var).filter_map(|d| Utf8PathBuf::from_path_buf(d).ok());
    find_in_dirs(dirs)
}

/// Scan directories for a cargo executable, in order.
fn find_in_dirs(dirs: impl IntoIterator<Item = Utf8PathBuf>) -> Option<Utf8PathBuf> {
    for dir in dirs {
        for name in cargo_names() {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }
    None
}

fn cargo_names() -> &'static [&'static str] {
    if cfg!(target_os = "windows") {
        &["cargo.exe"]
    } else {
        &["cargo"]
    }
}

/// Run `cargo --version` and parse the semantic version out of it.
async fn probe_version(cargo: &Utf8Path) -> Result<Version, ToolchainError> {
    let probe = Command::new(cargo.as_std_path())
        .arg("--version")
        .kill_on_drop(true)
        .output();

    let output = timeout(PROBE_TIMEOUT, probe)
        .await
        .map_err(|_| ToolchainError::Timeout(PROBE_TIMEOUT))?
        .map_err(|e| ToolchainError::Probe {
            command: format!("{} --version", cargo),
            source: e,
        })?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_cargo_version(&stdout)
}

/// Extract the version from output like `cargo 1.82.0 (8f40fc59f 2024-08-21)`.
pub fn parse_cargo_version(output: &str) -> Result<Version, ToolchainError> {
    let pattern = Regex::new(r"cargo\s+(\d+\.\d+\.\d+)").expect("Invalid version regex");
    let captures = pattern
        .captures(output)
        .ok_or_else(|| ToolchainError::Unrecognized(output.trim().to_string()))?;

    Version::parse(&captures[1])
        .map_err(|_| ToolchainError::Unrecognized(output.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_release_output() {
        let version = parse_cargo_version("cargo 1.82.0 (8f40fc59f 2024-08-21)\n").unwrap();
        assert_eq!(version, Version::new(1, 82, 0));
    }

    #[test]
    fn test_parse_nightly_output() {
        let version = parse_cargo_version("cargo 1.91.0-nightly (840b83a10 2025-07-30)").unwrap();
        assert_eq!(version, Version::new(1, 91, 0));
    }

    #[test]
    fn test_parse_garbage_output() {
        assert!(matches!(
            parse_cargo_version("zsh: command not found"),
            Err(ToolchainError::Unrecognized(_))
        ));
        assert!(parse_cargo_version("").is_err());
    }

    #[test]
    fn test_find_in_dirs_picks_first_match() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        let name = cargo_names()[0];
        std::fs::write(second.path().join(name), "").unwrap();

        let dirs = [
            Utf8PathBuf::try_from(first.path().to_path_buf()).unwrap(),
            Utf8PathBuf::try_from(second.path().to_path_buf()).unwrap(),
        ];
        let found = find_in_dirs(dirs.clone()).unwrap();
        assert_eq!(found.parent().unwrap(), dirs[1].as_path());
    }

    #[test]
    fn test_find_in_dirs_empty() {
        let empty = TempDir::new().unwrap();
        let dirs = [Utf8PathBuf::try_from(empty.path().to_path_buf()).unwrap()];
        assert!(find_in_dirs(dirs).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_probe_unexecutable_file_is_an_error() {
        tokio_test::block_on(async {
            let temp = TempDir::new().unwrap();
            let fake = Utf8PathBuf::try_from(temp.path().join("cargo")).unwrap();
            // Written without the execute bit, so spawning fails.
            std::fs::write(&fake, "#!/bin/sh\n").unwrap();

            let error = probe_version(&fake).await.unwrap_err();
            assert!(matches!(error, ToolchainError::Probe { .. }));
        });
    }

    #[test]
    fn test_find_toolchain_with_real_cargo() {
        // Tests run under cargo, so $CARGO points at a real binary that is
        // at least as new as the minimum the editor asks for.
        tokio_test::block_on(async {
            let toolchain = find_toolchain().await.unwrap();
            assert!(toolchain.cargo.is_file());
            assert!(
                toolchain.version >= Version::parse(MIN_SUPPORTED_VERSION).unwrap(),
                "unexpected cargo version {}",
                toolchain.version
            );
        });
    }
}
