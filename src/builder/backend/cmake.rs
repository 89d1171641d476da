//! Backend driving the standalone CMake plugin.

use std::path::Path;

use anyhow::Result;

use crate::builder::backend::NativeBackend;
use crate::builder::plugin::cmake::{
    self as plugin, is_cmake_project, CMakeExtension, BUILD_TASK, CLEAN_TASK, CONFIGURE_TASK,
};
use crate::core::project::Project;
use crate::core::target::BuildTargetKind;
use crate::util::diagnostic::PluginError;
use crate::util::fs::source_folder;

#[derive(Debug, Clone, Default)]
pub struct CMakeBackend;

impl CMakeBackend {
    pub fn new() -> Self {
        CMakeBackend
    }
}

fn extension(project: &mut Project) -> Result<&mut CMakeExtension> {
    Ok(project.cmake_mut().ok_or(PluginError::NotApplied("cmake"))?)
}

impl NativeBackend for CMakeBackend {
    fn kind(&self) -> BuildTargetKind {
        BuildTargetKind::CMake
    }

    fn initialize_plugin(&mut self, project: &mut Project) -> Result<()> {
        plugin::apply(project)
    }

    fn pre_depends(&self, _project: &Project) -> Result<Option<Vec<String>>> {
        Ok(Some(vec![CONFIGURE_TASK.to_string()]))
    }

    fn post_depends(&self, _project: &Project) -> Result<Option<Vec<String>>> {
        Ok(Some(vec![BUILD_TASK.to_string()]))
    }

    fn clean_depends(&self, _project: &Project) -> Result<Option<Vec<String>>> {
        Ok(Some(vec![CLEAN_TASK.to_string()]))
    }

    fn set_compiler_flags(&mut self, project: &mut Project, flags: &[String]) -> Result<()> {
        let ext = extension(project)?;
        ext.c_flags = flags.to_vec();
        ext.cxx_flags = flags.to_vec();
        Ok(())
    }

    fn set_linker_flags(&mut self, project: &mut Project, flags: &[String]) -> Result<()> {
        extension(project)?.linker_flags = flags.to_vec();
        Ok(())
    }

    fn set_extra_arguments(&mut self, project: &mut Project, args: &[String]) -> Result<()> {
        extension(project)?.arguments.extend_from_slice(args);
        Ok(())
    }

    fn set_build_target(&mut self, project: &mut Project, target: &str) -> Result<()> {
        extension(project)?.build_target = Some(target.to_string());
        Ok(())
    }

    fn set_source_path(&mut self, project: &mut Project, path: Option<&Path>) -> Result<()> {
        let folder = path.map(|p| source_folder(p).to_path_buf());
        if let Some(ref dir) = folder {
            if !is_cmake_project(dir) {
                tracing::warn!("no CMakeLists.txt found in {}", dir.display());
            }
        }
        extension(project)?.source_folder = folder;
        Ok(())
    }

    fn set_working_folder(&mut self, project: &mut Project, folder: &Path) -> Result<()> {
        extension(project)?.working_folder = folder.to_path_buf();
        Ok(())
    }

    fn set_install_prefix(&mut self, project: &mut Project, prefix: &Path) -> Result<()> {
        extension(project)?.install_prefix = Some(prefix.to_path_buf());
        Ok(())
    }
}
