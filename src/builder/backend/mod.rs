//! Native build backends.
//!
//! A backend adapts the facade's configuration calls to one underlying
//! plugin and names the plugin tasks the lifecycle tasks hook into.

use std::fmt;
use std::path::Path;

use anyhow::Result;

use crate::builder::deps::TaskDependencySpec;
use crate::core::project::Project;
use crate::core::target::BuildTargetKind;

pub mod android;
pub mod cmake;

pub use android::AndroidBackend;
pub use cmake::CMakeBackend;

/// Operations the facade delegates to the active backend.
///
/// Configuration calls are only made after [`initialize_plugin`] has
/// succeeded.
///
/// [`initialize_plugin`]: NativeBackend::initialize_plugin
pub trait NativeBackend: fmt::Debug {
    fn kind(&self) -> BuildTargetKind;

    /// Apply and seed the underlying plugin. Called once.
    fn initialize_plugin(&mut self, project: &mut Project) -> Result<()>;

    /// Tasks that run after `preExternalNativeBuild`.
    fn pre_depends(&self, project: &Project) -> Result<Option<Vec<String>>>;

    /// Tasks `postExternalNativeBuild` runs after.
    fn post_depends(&self, project: &Project) -> Result<Option<Vec<String>>>;

    /// Tasks `externalNativeBuildClean` runs after.
    fn clean_depends(&self, project: &Project) -> Result<Option<Vec<String>>>;

    fn set_compiler_flags(&mut self, project: &mut Project, flags: &[String]) -> Result<()>;

    fn set_linker_flags(&mut self, project: &mut Project, flags: &[String]) -> Result<()>;

    /// Append to the plugin's argument list.
    fn set_extra_arguments(&mut self, project: &mut Project, args: &[String]) -> Result<()>;

    fn set_build_target(&mut self, project: &mut Project, target: &str) -> Result<()>;

    /// `None` clears the source folder.
    fn set_source_path(&mut self, project: &mut Project, path: Option<&Path>) -> Result<()>;

    fn set_working_folder(&mut self, _project: &mut Project, folder: &Path) -> Result<()> {
        tracing::debug!(
            "{} backend has no working folder; ignoring {}",
            self.kind(),
            folder.display()
        );
        Ok(())
    }

    fn set_install_prefix(&mut self, _project: &mut Project, prefix: &Path) -> Result<()> {
        tracing::debug!(
            "{} backend has no install prefix; ignoring {}",
            self.kind(),
            prefix.display()
        );
        Ok(())
    }

    /// Hook run right after the lifecycle edges are wired.
    fn finish_wiring(&self, _project: &mut Project, _deps: &TaskDependencySpec) -> Result<()> {
        Ok(())
    }
}

/// Construct the backend for a build target kind.
pub fn backend_for(kind: BuildTargetKind) -> Box<dyn NativeBackend> {
    match kind {
        BuildTargetKind::Android => Box::new(AndroidBackend::new()),
        BuildTargetKind::CMake => Box::new(CMakeBackend::new()),
    }
}
