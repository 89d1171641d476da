//! Core data structures.
//!
//! This module contains the host-side model the native build plugs into:
//! - The `XNative.toml` manifest
//! - The project and its configuration phase
//! - Named tasks and their dependency graph
//! - Build target selection

pub mod manifest;
pub mod project;
pub mod target;
pub mod task;

pub use manifest::{Manifest, ManifestError, MANIFEST_NAME};
pub use project::{ConfigPhase, Project, CLEAN_TASK};
pub use target::{BuildTargetKind, TargetFlags};
pub use task::{Task, TaskAction, TaskContext, TaskGraph, TaskGraphError};
