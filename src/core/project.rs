//! The project being configured and built.
//!
//! A project goes through two phases. While `Configuring`, plugins are
//! applied, tasks are registered and configuration calls land in plugin
//! extensions. [`Project::finish_configuration`] moves it to `Configured`,
//! after which deferred dependency wiring may run and tasks may execute.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::builder::plugin::android::{AndroidExtension, AndroidSettings};
use crate::builder::plugin::cmake::CMakeExtension;
use crate::core::manifest::DEFAULT_BUILD_DIR;
use crate::core::target::TargetFlags;
use crate::core::task::{TaskContext, TaskGraph};
use crate::util::process::CommandRunner;

/// Name of the host's global clean task.
pub const CLEAN_TASK: &str = "clean";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigPhase {
    Configuring,
    Configured,
}

/// A project and its task graph.
#[derive(Debug)]
pub struct Project {
    name: String,
    root: PathBuf,
    build_dir: PathBuf,
    requested_tasks: Vec<String>,
    properties: BTreeMap<String, String>,
    target_flags: TargetFlags,
    android_settings: AndroidSettings,
    android: Option<AndroidExtension>,
    cmake: Option<CMakeExtension>,
    tasks: TaskGraph,
    phase: ConfigPhase,
}

impl Project {
    /// Create a project rooted at `root` with the base `clean` task.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let name = root
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("project")
            .to_string();

        let mut tasks = TaskGraph::new();
        tasks.register(CLEAN_TASK, Some("Deletes the build directory."))?;
        tasks.do_last(
            CLEAN_TASK,
            Box::new(|ctx: &TaskContext<'_>| ctx.runner.remove_dir(ctx.project.build_dir())),
        )?;

        Ok(Project {
            name,
            build_dir: root.join(DEFAULT_BUILD_DIR),
            root,
            requested_tasks: Vec::new(),
            properties: BTreeMap::new(),
            target_flags: TargetFlags::default(),
            android_settings: AndroidSettings::default(),
            android: None,
            cmake: None,
            tasks,
            phase: ConfigPhase::Configuring,
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the build directory. Relative paths resolve against the root.
    pub fn with_build_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.build_dir = self.resolve_path(dir);
        self
    }

    /// Task names the invoking build asked for.
    pub fn with_requested_tasks(mut self, tasks: Vec<String>) -> Self {
        self.requested_tasks = tasks;
        self
    }

    pub fn with_properties(mut self, properties: BTreeMap<String, String>) -> Self {
        self.properties = properties;
        self
    }

    pub fn with_target_flags(mut self, flags: TargetFlags) -> Self {
        self.target_flags = flags;
        self
    }

    pub fn with_android_settings(mut self, settings: AndroidSettings) -> Self {
        self.android_settings = settings;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    pub fn requested_tasks(&self) -> &[String] {
        &self.requested_tasks
    }

    /// Look up a project property.
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn target_flags(&self) -> TargetFlags {
        self.target_flags
    }

    pub fn android_settings(&self) -> &AndroidSettings {
        &self.android_settings
    }

    /// Resolve a path against the project root.
    pub fn resolve_path(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    pub fn android(&self) -> Option<&AndroidExtension> {
        self.android.as_ref()
    }

    pub fn android_mut(&mut self) -> Option<&mut AndroidExtension> {
        self.android.as_mut()
    }

    pub(crate) fn set_android(&mut self, extension: AndroidExtension) {
        self.android = Some(extension);
    }

    pub fn cmake(&self) -> Option<&CMakeExtension> {
        self.cmake.as_ref()
    }

    pub fn cmake_mut(&mut self) -> Option<&mut CMakeExtension> {
        self.cmake.as_mut()
    }

    pub(crate) fn set_cmake(&mut self, extension: CMakeExtension) {
        self.cmake = Some(extension);
    }

    pub fn tasks(&self) -> &TaskGraph {
        &self.tasks
    }

    pub fn tasks_mut(&mut self) -> &mut TaskGraph {
        &mut self.tasks
    }

    pub fn phase(&self) -> ConfigPhase {
        self.phase
    }

    pub fn is_configured(&self) -> bool {
        self.phase == ConfigPhase::Configured
    }

    /// End the configuration phase. Idempotent.
    pub fn finish_configuration(&mut self) {
        if self.phase == ConfigPhase::Configuring {
            tracing::debug!("project `{}` configured with {} task(s)", self.name, self.tasks.len());
            self.phase = ConfigPhase::Configured;
        }
    }

    /// Run the requested tasks and everything they depend on.
    ///
    /// Returns the names of the tasks that ran, in order. The first failing
    /// action stops execution.
    pub fn execute(&self, requested: &[String], runner: &dyn CommandRunner) -> Result<Vec<String>> {
        let plan = self.tasks.execution_plan(requested)?;
        let ctx = TaskContext {
            project: self,
            runner,
        };

        let mut executed = Vec::with_capacity(plan.len());
        for task in plan {
            tracing::info!("> Task :{}", task.name());
            for action in task.actions() {
                action(&ctx).with_context(|| format!("execution failed for task `{}`", task.name()))?;
            }
            executed.push(task.name().to_string());
        }

        Ok(executed)
    }
}
