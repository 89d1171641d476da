//! Global context for xnative operations.
//!
//! Provides centralized access to the working directory and the user-wide
//! configuration home.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::manifest::{ManifestError, MANIFEST_NAME};
use crate::util::config::{global_config_dir, load_config, project_config_path, Config};

/// Global context containing paths and output preferences.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Home directory for global xnative data (~/.xnative/)
    home: PathBuf,
}

impl GlobalContext {
    /// Create a new GlobalContext with defaults.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        let home = global_config_dir().unwrap_or_else(|| PathBuf::from(".xnative"));

        Ok(GlobalContext { cwd, home })
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the global configuration file path.
    pub fn config_path(&self) -> PathBuf {
        self.home.join("config.toml")
    }

    /// Load global config overlaid with the config of the project at `root`.
    pub fn load_config(&self, root: &Path) -> Config {
        load_config(&self.config_path(), &project_config_path(root))
    }

    /// Find `XNative.toml` starting from cwd and searching upward.
    pub fn find_manifest(&self) -> Result<PathBuf, ManifestError> {
        let mut current = self.cwd.clone();
        loop {
            let candidate = current.join(MANIFEST_NAME);
            if candidate.is_file() {
                return Ok(candidate);
            }
            if !current.pop() {
                return Err(ManifestError::NotFound {
                    dir: self.cwd.clone(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn context_at(cwd: &Path) -> GlobalContext {
        GlobalContext {
            cwd: cwd.to_path_buf(),
            home: cwd.join(".xnative"),
        }
    }

    #[test]
    fn test_find_manifest_searches_upward() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(MANIFEST_NAME), "").unwrap();
        let nested = tmp.path().join("src").join("cpp");
        std::fs::create_dir_all(&nested).unwrap();

        let ctx = context_at(&nested);
        assert_eq!(ctx.find_manifest().unwrap(), tmp.path().join(MANIFEST_NAME));
    }

    #[test]
    fn test_find_manifest_not_found() {
        let tmp = TempDir::new().unwrap();
        let ctx = context_at(tmp.path());

        // A manifest higher up the real filesystem would be found, which is
        // fine; only assert the error shape when nothing is there.
        if let Err(err) = ctx.find_manifest() {
            assert!(matches!(err, ManifestError::NotFound { .. }));
        }
    }
}
