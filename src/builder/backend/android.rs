//! Backend driving the Android plugin's `externalNativeBuild` block.
//!
//! The Android plugin cannot build an arbitrary CMake target, so when a
//! build target is requested the backend appends a step to the variant's
//! native build task that runs `cmake --build . --target <target>` in every
//! per-ABI intermediate folder.

use std::path::Path;

use anyhow::Result;

use crate::builder::backend::NativeBackend;
use crate::builder::deps::TaskDependencySpec;
use crate::builder::plugin::android::{
    self as plugin, abi_build_dir, capitalize, AndroidExtension, BUILD_TASK_PREFIX,
    CLEAN_TASK_PREFIX,
};
use crate::core::project::Project;
use crate::core::target::BuildTargetKind;
use crate::util::diagnostic::PluginError;
use crate::util::fs::to_forward_slashes;
use crate::util::process::{resolve_cmake, ProcessBuilder, CMAKE_EXECUTABLE_PROPERTY};

const RELEASE: &str = "release";

/// Pick the variant the invoking build is working on.
///
/// A variant is active when its capitalized name occurs in any requested
/// task name. No active variant, or an active `release`, selects `release`;
/// otherwise the first active variant in declaration order wins.
pub fn derive_active_variant<'a, I>(variants: I, requested: &[String]) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let active: Vec<&str> = variants
        .into_iter()
        .filter(|variant| {
            let capitalized = capitalize(variant);
            requested.iter().any(|task| task.contains(&capitalized))
        })
        .collect();

    match active.first() {
        Some(first) if !active.contains(&RELEASE) => first.to_string(),
        _ => RELEASE.to_string(),
    }
}

#[derive(Debug, Clone, Default)]
pub struct AndroidBackend {
    build_target: Option<String>,
}

impl AndroidBackend {
    pub fn new() -> Self {
        AndroidBackend::default()
    }

    /// The target requested through `set_build_target`, if any.
    pub fn build_target(&self) -> Option<&str> {
        self.build_target.as_deref()
    }

    fn active_variant(&self, project: &Project) -> Result<String> {
        let ext = project
            .android()
            .ok_or(PluginError::NotApplied("android"))?;
        Ok(derive_active_variant(
            ext.variant_names(),
            project.requested_tasks(),
        ))
    }

    fn variant_task(&self, project: &Project, prefix: &str) -> Result<Option<Vec<String>>> {
        let variant = self.active_variant(project)?;
        Ok(Some(vec![format!("{}{}", prefix, capitalize(&variant))]))
    }
}

fn extension(project: &mut Project) -> Result<&mut AndroidExtension> {
    Ok(project
        .android_mut()
        .ok_or(PluginError::NotApplied("android"))?)
}

impl NativeBackend for AndroidBackend {
    fn kind(&self) -> BuildTargetKind {
        BuildTargetKind::Android
    }

    fn initialize_plugin(&mut self, project: &mut Project) -> Result<()> {
        plugin::apply(project)?;
        let ext = extension(project)?;
        let ndk = to_forward_slashes(&ext.ndk_directory);
        ext.arguments.push(format!("-DANDROID_NDK={}", ndk));
        Ok(())
    }

    fn pre_depends(&self, project: &Project) -> Result<Option<Vec<String>>> {
        self.variant_task(project, BUILD_TASK_PREFIX)
    }

    fn post_depends(&self, project: &Project) -> Result<Option<Vec<String>>> {
        self.variant_task(project, BUILD_TASK_PREFIX)
    }

    fn clean_depends(&self, project: &Project) -> Result<Option<Vec<String>>> {
        self.variant_task(project, CLEAN_TASK_PREFIX)
    }

    fn set_compiler_flags(&mut self, project: &mut Project, flags: &[String]) -> Result<()> {
        let ext = extension(project)?;
        ext.c_flags = flags.to_vec();
        ext.cpp_flags = flags.to_vec();
        Ok(())
    }

    fn set_linker_flags(&mut self, project: &mut Project, flags: &[String]) -> Result<()> {
        if flags.is_empty() {
            return Ok(());
        }
        extension(project)?
            .arguments
            .push(format!("-DCMAKE_SHARED_LINKER_FLAGS={}", flags.join(" ")));
        Ok(())
    }

    fn set_extra_arguments(&mut self, project: &mut Project, args: &[String]) -> Result<()> {
        extension(project)?.arguments.extend_from_slice(args);
        Ok(())
    }

    fn set_build_target(&mut self, _project: &mut Project, target: &str) -> Result<()> {
        self.build_target = Some(target.to_string());
        Ok(())
    }

    fn set_source_path(&mut self, project: &mut Project, path: Option<&Path>) -> Result<()> {
        extension(project)?.cmake_path = path.map(Path::to_path_buf);
        Ok(())
    }

    fn finish_wiring(&self, project: &mut Project, deps: &TaskDependencySpec) -> Result<()> {
        let Some(target) = self.build_target.clone() else {
            return Ok(());
        };
        let Some(post) = deps.post_depends() else {
            return Ok(());
        };
        let variant = self.active_variant(project)?;

        for task in post {
            let step_target = target.clone();
            let variant = variant.clone();
            project.tasks_mut().do_last(
                task,
                Box::new(move |ctx| {
                    let ext = ctx
                        .project
                        .android()
                        .ok_or(PluginError::NotApplied("android"))?;
                    let cmake = resolve_cmake(ctx.project.property(CMAKE_EXECUTABLE_PROPERTY));
                    for abi in &ext.abi_filters {
                        let cmd = ProcessBuilder::new(&cmake)
                            .args(["--build", ".", "--target"])
                            .arg(&step_target)
                            .cwd(abi_build_dir(ctx.project.root(), &variant, abi));
                        ctx.runner.run(&cmd)?;
                    }
                    Ok(())
                }),
            )?;
            tracing::debug!("`{}` will also build CMake target `{}`", task, target);
        }

        Ok(())
    }
}
