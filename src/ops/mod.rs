//! High-level operations.
//!
//! This module contains the implementation of xnative commands.

pub mod native_build;

pub use native_build::{configure, task_report, ConfiguredBuild, NativeBuildOptions, TaskInfo};
