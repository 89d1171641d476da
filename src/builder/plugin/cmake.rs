//! Standalone CMake plugin.
//!
//! Applying the plugin adds a [`CMakeExtension`] to the project and registers
//! `cmakeConfigure`, `cmakeBuild` and `cmakeClean`. The tasks read the
//! extension when they run, so configuration made after the plugin was
//! applied is honored.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::core::project::Project;
use crate::core::task::TaskContext;
use crate::util::diagnostic::PluginError;
use crate::util::process::{resolve_cmake, ProcessBuilder, CMAKE_EXECUTABLE_PROPERTY};

pub const CONFIGURE_TASK: &str = "cmakeConfigure";
pub const BUILD_TASK: &str = "cmakeBuild";
pub const CLEAN_TASK: &str = "cmakeClean";

/// Project property overriding the build configuration.
pub const BUILD_CONFIG_PROPERTY: &str = "cmake.buildConfig";

pub const DEFAULT_BUILD_CONFIG: &str = "Release";

/// Configuration of the CMake plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CMakeExtension {
    /// Binary directory (`-B`)
    pub working_folder: PathBuf,
    /// `CMAKE_BUILD_TYPE` and `--config` value
    pub build_config: String,
    /// Target passed to `cmake --build --target`
    pub build_target: Option<String>,
    /// Source tree root (`-S`)
    pub source_folder: Option<PathBuf>,
    pub install_prefix: Option<PathBuf>,
    /// Extra configure arguments, in order
    pub arguments: Vec<String>,
    pub c_flags: Vec<String>,
    pub cxx_flags: Vec<String>,
    pub linker_flags: Vec<String>,
}

impl CMakeExtension {
    pub fn new(working_folder: impl Into<PathBuf>) -> Self {
        CMakeExtension {
            working_folder: working_folder.into(),
            build_config: DEFAULT_BUILD_CONFIG.to_string(),
            build_target: None,
            source_folder: None,
            install_prefix: None,
            arguments: Vec::new(),
            c_flags: Vec::new(),
            cxx_flags: Vec::new(),
            linker_flags: Vec::new(),
        }
    }

    /// The `cmake -S .. -B ..` configure command.
    pub fn configure_command(&self, cmake: &Path) -> Result<ProcessBuilder> {
        let source = self
            .source_folder
            .as_ref()
            .ok_or(PluginError::MissingSource("cmake"))?;

        let mut cmd = ProcessBuilder::new(cmake)
            .arg("-S")
            .arg(source)
            .arg("-B")
            .arg(&self.working_folder)
            .arg(format!("-DCMAKE_BUILD_TYPE={}", self.build_config));

        if let Some(ref prefix) = self.install_prefix {
            cmd = cmd.arg(format!("-DCMAKE_INSTALL_PREFIX={}", prefix.display()));
        }

        if !self.c_flags.is_empty() {
            cmd = cmd.arg(format!("-DCMAKE_C_FLAGS={}", self.c_flags.join(" ")));
        }
        if !self.cxx_flags.is_empty() {
            cmd = cmd.arg(format!("-DCMAKE_CXX_FLAGS={}", self.cxx_flags.join(" ")));
        }
        if !self.linker_flags.is_empty() {
            let flags = self.linker_flags.join(" ");
            cmd = cmd
                .arg(format!("-DCMAKE_EXE_LINKER_FLAGS={}", flags))
                .arg(format!("-DCMAKE_SHARED_LINKER_FLAGS={}", flags));
        }

        Ok(cmd.args(&self.arguments))
    }

    /// The `cmake --build` command.
    pub fn build_command(&self, cmake: &Path) -> ProcessBuilder {
        let mut cmd = ProcessBuilder::new(cmake)
            .arg("--build")
            .arg(&self.working_folder)
            .arg("--config")
            .arg(&self.build_config);

        if let Some(ref target) = self.build_target {
            cmd = cmd.arg("--target").arg(target);
        }

        cmd
    }

    /// The `cmake --build .. --target clean` command.
    pub fn clean_command(&self, cmake: &Path) -> ProcessBuilder {
        ProcessBuilder::new(cmake)
            .arg("--build")
            .arg(&self.working_folder)
            .arg("--target")
            .arg("clean")
    }
}

/// Apply the CMake plugin. Applying twice is a no-op.
pub fn apply(project: &mut Project) -> Result<()> {
    if project.cmake().is_some() {
        return Ok(());
    }

    let mut extension = CMakeExtension::new(project.build_dir());
    if let Some(config) = project.property(BUILD_CONFIG_PROPERTY) {
        extension.build_config = config.to_string();
    }

    let tasks = project.tasks_mut();
    tasks.register(CONFIGURE_TASK, Some("Configures the CMake build tree."))?;
    tasks.register(BUILD_TASK, Some("Builds the CMake project."))?;
    tasks.register(CLEAN_TASK, Some("Cleans the CMake build tree."))?;
    tasks.depends_on(BUILD_TASK, CONFIGURE_TASK)?;

    tasks.do_last(CONFIGURE_TASK, Box::new(configure))?;
    tasks.do_last(BUILD_TASK, Box::new(compile))?;
    tasks.do_last(CLEAN_TASK, Box::new(clean))?;

    tracing::debug!(
        "applied cmake plugin (working folder {}, config {})",
        extension.working_folder.display(),
        extension.build_config
    );
    project.set_cmake(extension);
    Ok(())
}

fn extension<'a>(ctx: &TaskContext<'a>) -> Result<&'a CMakeExtension> {
    Ok(ctx.project.cmake().ok_or(PluginError::NotApplied("cmake"))?)
}

fn cmake_program(ctx: &TaskContext<'_>) -> PathBuf {
    resolve_cmake(ctx.project.property(CMAKE_EXECUTABLE_PROPERTY))
}

fn configure(ctx: &TaskContext<'_>) -> Result<()> {
    let ext = extension(ctx)?;
    tracing::info!("Configuring CMake project");
    ctx.runner.run(&ext.configure_command(&cmake_program(ctx))?)
}

fn compile(ctx: &TaskContext<'_>) -> Result<()> {
    let ext = extension(ctx)?;
    tracing::info!("Building CMake project");
    ctx.runner.run(&ext.build_command(&cmake_program(ctx)))
}

fn clean(ctx: &TaskContext<'_>) -> Result<()> {
    let ext = extension(ctx)?;
    if !ext.working_folder.exists() {
        tracing::debug!(
            "nothing to clean, {} does not exist",
            ext.working_folder.display()
        );
        return Ok(());
    }
    ctx.runner.run(&ext.clean_command(&cmake_program(ctx)))
}

/// Check if a directory contains a CMake project.
pub fn is_cmake_project(dir: &Path) -> bool {
    dir.join("CMakeLists.txt").exists()
}
