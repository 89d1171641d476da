//! The three lifecycle anchor tasks other build steps can hook into.
//!
//! Registration and wiring are split: [`LifecycleTaskRegistrar::register`]
//! adds the tasks during configuration and hands back a [`PendingWiring`],
//! which can only be spent once the project has finished configuring.

use anyhow::Result;

use crate::builder::deps::TaskDependencySpec;
use crate::core::project::{Project, CLEAN_TASK};
use crate::core::task::TaskGraphError;

pub const PRE_BUILD_TASK: &str = "preExternalNativeBuild";
pub const POST_BUILD_TASK: &str = "postExternalNativeBuild";
pub const CLEAN_HOOK_TASK: &str = "externalNativeBuildClean";

/// Registers the lifecycle tasks.
#[derive(Debug, Clone, Copy, Default)]
pub struct LifecycleTaskRegistrar;

/// Lifecycle tasks that have been registered but not yet wired.
#[derive(Debug)]
#[must_use = "lifecycle tasks stay unwired until `wire` is called"]
pub struct PendingWiring {
    _private: (),
}

impl LifecycleTaskRegistrar {
    /// Register the three lifecycle tasks. They carry no actions.
    pub fn register(project: &mut Project) -> Result<PendingWiring> {
        if project.is_configured() {
            return Err(TaskGraphError::Configured(PRE_BUILD_TASK.to_string()).into());
        }

        let tasks = project.tasks_mut();
        tasks.register(
            PRE_BUILD_TASK,
            Some("Runs before the external native build."),
        )?;
        tasks.register(
            POST_BUILD_TASK,
            Some("Runs after the external native build."),
        )?;
        tasks.register(
            CLEAN_HOOK_TASK,
            Some("Cleans the external native build."),
        )?;

        tracing::debug!("registered external native build lifecycle tasks");
        Ok(PendingWiring { _private: () })
    }
}

impl PendingWiring {
    /// Wire the dependency edges. Returns how many edges were added.
    pub fn wire(self, project: &mut Project, deps: &TaskDependencySpec) -> Result<usize> {
        if !project.is_configured() {
            return Err(TaskGraphError::NotConfigured.into());
        }

        let tasks = project.tasks_mut();
        let mut edges = 0;

        for name in deps.pre_depends().unwrap_or_default() {
            tasks.depends_on(name, PRE_BUILD_TASK)?;
            edges += 1;
        }
        for name in deps.post_depends().unwrap_or_default() {
            tasks.depends_on(POST_BUILD_TASK, name)?;
            edges += 1;
        }
        for name in deps.clean_depends().unwrap_or_default() {
            tasks.depends_on(CLEAN_HOOK_TASK, name)?;
            edges += 1;
        }

        tasks.depends_on(CLEAN_TASK, CLEAN_HOOK_TASK)?;
        edges += 1;

        tracing::debug!("wired {} lifecycle dependency edge(s)", edges);
        Ok(edges)
    }
}
