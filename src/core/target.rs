//! Native build target selection.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::util::diagnostic::TargetSelectionError;

/// Which underlying plugin performs the native build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildTargetKind {
    Android,
    CMake,
}

impl fmt::Display for BuildTargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildTargetKind::Android => write!(f, "android"),
            BuildTargetKind::CMake => write!(f, "cmake"),
        }
    }
}

/// Project-wide build target flags. Exactly one must be set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetFlags {
    pub android: bool,
    pub cmake: bool,
}

impl TargetFlags {
    /// Flags enabling only the given kind.
    pub fn only(kind: BuildTargetKind) -> Self {
        TargetFlags {
            android: kind == BuildTargetKind::Android,
            cmake: kind == BuildTargetKind::CMake,
        }
    }

    /// Select the build target kind.
    pub fn select(&self) -> Result<BuildTargetKind, TargetSelectionError> {
        match (self.android, self.cmake) {
            (true, false) => Ok(BuildTargetKind::Android),
            (false, true) => Ok(BuildTargetKind::CMake),
            (false, false) => Err(TargetSelectionError::NoneEnabled),
            (true, true) => Err(TargetSelectionError::Ambiguous),
        }
    }
}
