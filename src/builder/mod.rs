//! External native build configuration.
//!
//! This module implements the build facade, its backends and the lifecycle
//! tasks it wires into the project's task graph.

pub mod backend;
pub mod deps;
pub mod facade;
pub mod lifecycle;
pub mod plugin;

pub use backend::{backend_for, AndroidBackend, CMakeBackend, NativeBackend};
pub use deps::TaskDependencySpec;
pub use facade::{BuildFacadeState, FacadePhase, NativeBuildFacade};
pub use lifecycle::{
    LifecycleTaskRegistrar, PendingWiring, CLEAN_HOOK_TASK, POST_BUILD_TASK, PRE_BUILD_TASK,
};
