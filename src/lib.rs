//! xnative - external native build driver
//!
//! This crate provides a single configuration surface over two native build
//! plugins (Android and standalone CMake), and the lifecycle tasks that let
//! other build steps run before, after and alongside the native build.

pub mod builder;
pub mod core;
pub mod ops;
pub mod util;

/// Test utilities for xnative unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests.
#[cfg(test)]
pub mod test_support;

pub use crate::builder::{NativeBackend, NativeBuildFacade, TaskDependencySpec};
pub use crate::core::{BuildTargetKind, Manifest, Project};
pub use crate::util::context::GlobalContext;
