//! The external native build facade.
//!
//! Every configuration call first makes sure the backend's plugin is
//! initialized. Supplying the source path additionally registers the
//! lifecycle tasks, since wiring them is meaningless without a source tree.
//! Both steps happen at most once per facade:
//!
//! ```text
//! Uninitialized --any call--> PluginReady --set_source_path--> FullyRegistered
//! ```
//!
//! Edges between the lifecycle tasks and the backend's tasks are wired by
//! [`NativeBuildFacade::finalize`], which the driver calls once after all
//! configuration has been applied.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::builder::backend::{backend_for, NativeBackend};
use crate::builder::deps::TaskDependencySpec;
use crate::builder::lifecycle::{LifecycleTaskRegistrar, PendingWiring};
use crate::core::project::Project;
use crate::core::target::BuildTargetKind;

/// One-time initialization flags. Neither ever goes back to `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BuildFacadeState {
    pub plugin_initialized: bool,
    pub tasks_registered: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FacadePhase {
    Uninitialized,
    PluginReady,
    FullyRegistered,
}

impl BuildFacadeState {
    pub fn phase(&self) -> FacadePhase {
        match (self.plugin_initialized, self.tasks_registered) {
            (_, true) => FacadePhase::FullyRegistered,
            (true, false) => FacadePhase::PluginReady,
            (false, false) => FacadePhase::Uninitialized,
        }
    }
}

/// Uniform native build configuration surface over one backend.
#[derive(Debug)]
pub struct NativeBuildFacade {
    backend: Box<dyn NativeBackend>,
    state: BuildFacadeState,
    pending: Option<PendingWiring>,
}

impl NativeBuildFacade {
    pub fn new(backend: Box<dyn NativeBackend>) -> Self {
        NativeBuildFacade {
            backend,
            state: BuildFacadeState::default(),
            pending: None,
        }
    }

    /// Build the facade for the project's selected build target.
    pub fn for_project(project: &Project) -> Result<Self> {
        let kind = project.target_flags().select()?;
        tracing::debug!("using {} native build backend", kind);
        Ok(NativeBuildFacade::new(backend_for(kind)))
    }

    pub fn backend_kind(&self) -> BuildTargetKind {
        self.backend.kind()
    }

    pub fn state(&self) -> BuildFacadeState {
        self.state
    }

    pub fn phase(&self) -> FacadePhase {
        self.state.phase()
    }

    fn ensure_plugin(&mut self, project: &mut Project) -> Result<()> {
        if self.state.plugin_initialized {
            return Ok(());
        }
        self.backend
            .initialize_plugin(project)
            .with_context(|| format!("failed to initialize the {} plugin", self.backend.kind()))?;
        self.state.plugin_initialized = true;
        tracing::debug!("{} plugin initialized", self.backend.kind());
        Ok(())
    }

    fn ensure_registered(&mut self, project: &mut Project) -> Result<()> {
        self.ensure_plugin(project)?;
        if self.state.tasks_registered {
            return Ok(());
        }
        self.pending = Some(LifecycleTaskRegistrar::register(project)?);
        self.state.tasks_registered = true;
        Ok(())
    }

    pub fn set_compiler_flags(&mut self, project: &mut Project, flags: &[String]) -> Result<()> {
        self.ensure_plugin(project)?;
        self.backend.set_compiler_flags(project, flags)
    }

    pub fn set_linker_flags(&mut self, project: &mut Project, flags: &[String]) -> Result<()> {
        self.ensure_plugin(project)?;
        self.backend.set_linker_flags(project, flags)
    }

    /// Append arguments; earlier ones (including plugin seeds) are kept.
    pub fn set_extra_arguments(&mut self, project: &mut Project, args: &[String]) -> Result<()> {
        self.ensure_plugin(project)?;
        self.backend.set_extra_arguments(project, args)
    }

    pub fn set_build_target(&mut self, project: &mut Project, target: &str) -> Result<()> {
        self.ensure_plugin(project)?;
        self.backend.set_build_target(project, target)
    }

    pub fn set_working_folder(&mut self, project: &mut Project, folder: &Path) -> Result<()> {
        self.ensure_plugin(project)?;
        self.backend.set_working_folder(project, folder)
    }

    /// Set the native source path and register the lifecycle tasks.
    pub fn set_source_path(&mut self, project: &mut Project, path: Option<&Path>) -> Result<()> {
        self.ensure_registered(project)?;
        self.backend.set_source_path(project, path)
    }

    pub fn set_install_prefix(&mut self, project: &mut Project, prefix: &Path) -> Result<()> {
        self.ensure_plugin(project)?;
        self.backend.set_install_prefix(project, prefix)
    }

    /// Close the configuration phase and wire the lifecycle tasks.
    ///
    /// Does nothing beyond closing configuration when the source path was
    /// never supplied. Calling it again is a no-op.
    pub fn finalize(&mut self, project: &mut Project) -> Result<()> {
        project.finish_configuration();

        let Some(pending) = self.pending.take() else {
            return Ok(());
        };

        let deps = TaskDependencySpec::resolve(self.backend.as_ref(), project)?;
        pending
            .wire(project, &deps)
            .context("failed to wire external native build tasks")?;
        self.backend.finish_wiring(project, &deps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::path::PathBuf;
    use std::rc::Rc;

    use crate::builder::lifecycle::{CLEAN_HOOK_TASK, POST_BUILD_TASK, PRE_BUILD_TASK};
    use crate::builder::plugin::android::AndroidSettings;
    use crate::core::project::CLEAN_TASK;
    use crate::core::target::TargetFlags;
    use crate::test_support::RecordingRunner;
    use crate::util::process::CMAKE_EXECUTABLE_PROPERTY;

    #[derive(Debug, Default)]
    struct Counters {
        initialized: Cell<usize>,
        sources: Cell<usize>,
    }

    /// Backend that only counts calls and provides a post dependency.
    #[derive(Debug)]
    struct CountingBackend {
        counters: Rc<Counters>,
    }

    impl NativeBackend for CountingBackend {
        fn kind(&self) -> BuildTargetKind {
            BuildTargetKind::CMake
        }

        fn initialize_plugin(&mut self, project: &mut Project) -> Result<()> {
            self.counters.initialized.set(self.counters.initialized.get() + 1);
            project.tasks_mut().register("nativeBuild", None)?;
            Ok(())
        }

        fn pre_depends(&self, _project: &Project) -> Result<Option<Vec<String>>> {
            Ok(None)
        }

        fn post_depends(&self, _project: &Project) -> Result<Option<Vec<String>>> {
            Ok(Some(vec!["nativeBuild".to_string()]))
        }

        fn clean_depends(&self, _project: &Project) -> Result<Option<Vec<String>>> {
            Ok(None)
        }

        fn set_compiler_flags(&mut self, _: &mut Project, _: &[String]) -> Result<()> {
            Ok(())
        }

        fn set_linker_flags(&mut self, _: &mut Project, _: &[String]) -> Result<()> {
            Ok(())
        }

        fn set_extra_arguments(&mut self, _: &mut Project, _: &[String]) -> Result<()> {
            Ok(())
        }

        fn set_build_target(&mut self, _: &mut Project, _: &str) -> Result<()> {
            Ok(())
        }

        fn set_source_path(&mut self, _: &mut Project, _: Option<&Path>) -> Result<()> {
            self.counters.sources.set(self.counters.sources.get() + 1);
            Ok(())
        }
    }

    fn counting() -> (NativeBuildFacade, Rc<Counters>, Project) {
        let counters = Rc::new(Counters::default());
        let facade = NativeBuildFacade::new(Box::new(CountingBackend {
            counters: Rc::clone(&counters),
        }));
        (facade, counters, Project::new("/work/app").unwrap())
    }

    fn flags(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_plugin_initialized_once() {
        let (mut facade, counters, mut project) = counting();
        assert_eq!(facade.phase(), FacadePhase::Uninitialized);

        facade.set_compiler_flags(&mut project, &flags(&["-O2"])).unwrap();
        assert_eq!(facade.phase(), FacadePhase::PluginReady);
        facade.set_linker_flags(&mut project, &[]).unwrap();
        facade.set_extra_arguments(&mut project, &[]).unwrap();
        facade.set_build_target(&mut project, "install").unwrap();
        facade.set_working_folder(&mut project, Path::new("out")).unwrap();
        facade.set_install_prefix(&mut project, Path::new("dist")).unwrap();

        assert_eq!(counters.initialized.get(), 1);
        assert!(!facade.state().tasks_registered);
        assert!(!project.tasks().contains(PRE_BUILD_TASK));
    }

    #[test]
    fn test_tasks_registered_once() {
        let (mut facade, counters, mut project) = counting();

        facade.set_source_path(&mut project, Some(Path::new("a/CMakeLists.txt"))).unwrap();
        assert_eq!(facade.phase(), FacadePhase::FullyRegistered);
        facade.set_source_path(&mut project, Some(Path::new("b/CMakeLists.txt"))).unwrap();
        facade.set_source_path(&mut project, None).unwrap();

        assert_eq!(counters.initialized.get(), 1);
        assert_eq!(counters.sources.get(), 3);
        assert_eq!(facade.phase(), FacadePhase::FullyRegistered);
        for task in [PRE_BUILD_TASK, POST_BUILD_TASK, CLEAN_HOOK_TASK] {
            assert!(project.tasks().contains(task));
        }
    }

    #[test]
    fn test_without_source_path_nothing_is_registered() {
        let (mut facade, _, mut project) = counting();
        facade.set_build_target(&mut project, "install").unwrap();
        facade.finalize(&mut project).unwrap();

        assert!(project.is_configured());
        for task in [PRE_BUILD_TASK, POST_BUILD_TASK, CLEAN_HOOK_TASK] {
            assert!(!project.tasks().contains(task));
        }
        assert!(project.tasks().dependencies(CLEAN_TASK).is_empty());
    }

    #[test]
    fn test_wiring_is_deferred_until_finalize() {
        let (mut facade, _, mut project) = counting();
        facade.set_source_path(&mut project, Some(Path::new("CMakeLists.txt"))).unwrap();
        assert!(project.tasks().dependencies(POST_BUILD_TASK).is_empty());

        facade.finalize(&mut project).unwrap();
        facade.finalize(&mut project).unwrap();

        assert_eq!(project.tasks().dependencies(POST_BUILD_TASK), ["nativeBuild"]);
        assert!(project.tasks().dependents(PRE_BUILD_TASK).is_empty());
        assert!(project.tasks().dependencies(CLEAN_HOOK_TASK).is_empty());
        assert_eq!(project.tasks().dependencies(CLEAN_TASK), [CLEAN_HOOK_TASK]);
    }

    #[test]
    fn test_for_project_requires_one_target() {
        let project = Project::new("/work/app").unwrap();
        let err = NativeBuildFacade::for_project(&project).unwrap_err();
        assert!(err.to_string().contains("no native build target"));

        let project = Project::new("/work/app")
            .unwrap()
            .with_target_flags(TargetFlags::only(BuildTargetKind::CMake));
        let facade = NativeBuildFacade::for_project(&project).unwrap();
        assert_eq!(facade.backend_kind(), BuildTargetKind::CMake);
    }

    #[test]
    fn test_cmake_backend_end_to_end() {
        let mut properties = std::collections::BTreeMap::new();
        properties.insert(CMAKE_EXECUTABLE_PROPERTY.to_string(), "cmake".to_string());
        let mut project = Project::new("/work/lib")
            .unwrap()
            .with_properties(properties)
            .with_target_flags(TargetFlags::only(BuildTargetKind::CMake));
        let mut facade = NativeBuildFacade::for_project(&project).unwrap();

        facade.set_build_target(&mut project, "install").unwrap();
        facade
            .set_source_path(&mut project, Some(Path::new("/work/lib/src/CMakeLists.txt")))
            .unwrap();
        facade.finalize(&mut project).unwrap();

        let tasks = project.tasks();
        assert_eq!(tasks.dependencies("cmakeConfigure"), [PRE_BUILD_TASK]);
        assert_eq!(tasks.dependencies(POST_BUILD_TASK), ["cmakeBuild"]);
        assert_eq!(tasks.dependencies(CLEAN_HOOK_TASK), ["cmakeClean"]);

        let runner = RecordingRunner::new();
        let ran = project
            .execute(&[POST_BUILD_TASK.to_string()], &runner)
            .unwrap();
        assert_eq!(
            ran,
            [PRE_BUILD_TASK, "cmakeConfigure", "cmakeBuild", POST_BUILD_TASK]
        );
        assert_eq!(
            runner.command_lines()[1],
            "cmake --build /work/lib/build --config Release --target install"
        );
    }

    fn android_project(requested: &[&str]) -> Project {
        let mut properties = std::collections::BTreeMap::new();
        properties.insert(CMAKE_EXECUTABLE_PROPERTY.to_string(), "cmake".to_string());
        Project::new("/work/app")
            .unwrap()
            .with_properties(properties)
            .with_requested_tasks(flags(requested))
            .with_target_flags(TargetFlags::only(BuildTargetKind::Android))
            .with_android_settings(AndroidSettings {
                ndk_directory: Some(PathBuf::from("/opt/ndk")),
                abi_filters: flags(&["arm64-v8a", "armeabi-v7a"]),
                variants: flags(&["debug", "release"]),
            })
    }

    #[test]
    fn test_android_install_runs_once_per_abi() {
        let mut project = android_project(&["assembleDebug", POST_BUILD_TASK]);
        let mut facade = NativeBuildFacade::for_project(&project).unwrap();

        facade
            .set_source_path(&mut project, Some(Path::new("/work/app/src/main/cpp/CMakeLists.txt")))
            .unwrap();
        facade.set_build_target(&mut project, "install").unwrap();
        facade.finalize(&mut project).unwrap();

        assert_eq!(
            project.tasks().dependencies(POST_BUILD_TASK),
            ["externalNativeBuildDebug"]
        );

        let runner = RecordingRunner::new();
        project
            .execute(&[POST_BUILD_TASK.to_string()], &runner)
            .unwrap();

        let installs: Vec<_> = runner
            .commands()
            .into_iter()
            .filter(|cmd| cmd.display_command().ends_with("--target install"))
            .collect();
        assert_eq!(installs.len(), 2);
        for cmd in &installs {
            assert_eq!(cmd.display_command(), "cmake --build . --target install");
        }
        assert_eq!(
            installs[0].get_cwd(),
            Some(Path::new("/work/app/.externalNativeBuild/cmake/debug/arm64-v8a"))
        );
        assert_eq!(
            installs[1].get_cwd(),
            Some(Path::new("/work/app/.externalNativeBuild/cmake/debug/armeabi-v7a"))
        );

        // The install step runs after the variant's own configure and build.
        let all = runner.commands();
        assert_eq!(all.len(), 6);
        assert!(all[4].display_command().ends_with("--target install"));
    }

    #[test]
    fn test_android_without_target_has_no_install_step() {
        let mut project = android_project(&[]);
        let mut facade = NativeBuildFacade::for_project(&project).unwrap();
        facade
            .set_source_path(&mut project, Some(Path::new("/work/app/CMakeLists.txt")))
            .unwrap();
        facade.finalize(&mut project).unwrap();

        assert_eq!(
            project.tasks().dependencies(POST_BUILD_TASK),
            ["externalNativeBuildRelease"]
        );
        assert_eq!(
            project.tasks().dependencies(CLEAN_HOOK_TASK),
            ["externalNativeBuildCleanRelease"]
        );
        assert_eq!(
            project.tasks().dependencies("externalNativeBuildRelease"),
            [PRE_BUILD_TASK]
        );

        let runner = RecordingRunner::new();
        project
            .execute(&[POST_BUILD_TASK.to_string()], &runner)
            .unwrap();
        assert_eq!(runner.commands().len(), 4);
    }

    #[test]
    fn test_android_missing_ndk_is_fatal() {
        let mut project = android_project(&[]).with_android_settings(AndroidSettings {
            ndk_directory: None,
            ..AndroidSettings::default()
        });
        let mut facade = NativeBuildFacade::for_project(&project).unwrap();
        let err = facade
            .set_compiler_flags(&mut project, &flags(&["-O2"]))
            .unwrap_err();
        assert!(format!("{:#}", err).contains("NDK location is not configured"));
        assert_eq!(facade.phase(), FacadePhase::Uninitialized);
    }
}
