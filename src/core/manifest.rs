//! `XNative.toml` manifest parsing.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use miette::Diagnostic as MietteDiagnostic;
use serde::Deserialize;
use thiserror::Error;

use crate::core::target::TargetFlags;
use crate::util::fs::read_to_string;

/// File name of the project manifest.
pub const MANIFEST_NAME: &str = "XNative.toml";

/// Default build directory, relative to the project root.
pub const DEFAULT_BUILD_DIR: &str = "build";

/// Errors locating the manifest.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum ManifestError {
    #[error("could not find `XNative.toml` in `{}` or any parent directory", .dir.display())]
    #[diagnostic(
        code(xnative::manifest::not_found),
        help("Create an XNative.toml at the project root")
    )]
    NotFound { dir: PathBuf },
}

/// Parsed project manifest.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Manifest {
    pub project: ProjectSection,

    /// Build target selection flags
    pub target: TargetFlags,

    /// Project properties
    pub properties: BTreeMap<String, String>,

    /// Native build configuration calls
    pub native: NativeSection,

    /// Android plugin inputs
    pub android: AndroidSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ProjectSection {
    pub name: Option<String>,
    pub build_dir: Option<PathBuf>,
}

/// Values for the facade's configuration calls. Absent keys make no call.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct NativeSection {
    pub compiler_flags: Option<Vec<String>>,
    pub linker_flags: Option<Vec<String>>,
    pub extra_arguments: Option<Vec<String>>,
    pub build_target: Option<String>,
    pub working_folder: Option<PathBuf>,
    pub install_prefix: Option<PathBuf>,
    pub source: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct AndroidSection {
    pub ndk_directory: Option<PathBuf>,
    pub abi_filters: Option<Vec<String>>,
    pub variants: Option<Vec<String>>,
}

impl Manifest {
    /// Load a manifest from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = read_to_string(path)?;
        contents
            .parse::<Manifest>()
            .with_context(|| format!("failed to parse manifest: {}", path.display()))
    }

    /// Build directory relative to the project root.
    pub fn build_dir(&self) -> PathBuf {
        self.project
            .build_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BUILD_DIR))
    }
}

impl FromStr for Manifest {
    type Err = toml::de::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        toml::from_str(s)
    }
}
