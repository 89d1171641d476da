//! Configure and run the external native build of a project.
//!
//! The manifest's `[native]` section is replayed through the facade in a
//! fixed order. Source-path last, so every other setting has already landed
//! in the plugin extension when the lifecycle tasks get registered.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::builder::facade::NativeBuildFacade;
use crate::builder::lifecycle::POST_BUILD_TASK;
use crate::builder::plugin::android::{ndk_from_env, AndroidSettings};
use crate::core::manifest::{Manifest, NativeSection};
use crate::core::project::Project;
use crate::util::config::Config;
use crate::util::process::CommandRunner;

/// Options for configuring a native build.
#[derive(Debug, Clone, Default)]
pub struct NativeBuildOptions {
    /// Tasks to run (empty = `postExternalNativeBuild`)
    pub tasks: Vec<String>,

    /// `-P key=value` overrides, applied over every other property source
    pub properties: Vec<(String, String)>,
}

/// A project whose configuration phase has finished.
#[derive(Debug)]
pub struct ConfiguredBuild {
    pub project: Project,
    pub facade: NativeBuildFacade,
}

impl ConfiguredBuild {
    /// Whether a native source path was configured, and with it the
    /// lifecycle tasks.
    pub fn has_native_source(&self) -> bool {
        self.facade.state().tasks_registered
    }

    /// Run the requested tasks. Returns the tasks that ran, in order.
    pub fn execute(&self, runner: &dyn CommandRunner) -> Result<Vec<String>> {
        self.project
            .execute(self.project.requested_tasks(), runner)
    }
}

/// A task as listed by `xnative tasks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskInfo {
    pub name: String,
    pub description: Option<String>,
    pub depends_on: Vec<String>,
    /// Tasks that depend on this one
    pub required_by: Vec<String>,
    /// Number of actions the task runs
    pub actions: usize,
}

/// Load the manifest, build the project and apply its native configuration.
pub fn configure(
    manifest_path: &Path,
    config: &Config,
    opts: &NativeBuildOptions,
) -> Result<ConfiguredBuild> {
    let manifest = Manifest::load(manifest_path)?;
    let root = match manifest_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let mut properties: BTreeMap<String, String> = config.properties.clone();
    properties.extend(manifest.properties.clone());
    properties.extend(opts.properties.iter().cloned());

    let tasks = if opts.tasks.is_empty() {
        vec![POST_BUILD_TASK.to_string()]
    } else {
        opts.tasks.clone()
    };

    let mut project = Project::new(&root)?
        .with_build_dir(manifest.build_dir())
        .with_requested_tasks(tasks)
        .with_properties(properties)
        .with_target_flags(manifest.target);
    if let Some(ref name) = manifest.project.name {
        project = project.with_name(name);
    }

    let defaults = AndroidSettings::default();
    let settings = AndroidSettings {
        ndk_directory: manifest
            .android
            .ndk_directory
            .as_ref()
            .map(|p| project.resolve_path(p))
            .or_else(|| config.android.ndk_directory.clone())
            .or_else(|| ndk_from_env(|key| std::env::var_os(key))),
        abi_filters: manifest.android.abi_filters.clone().unwrap_or(defaults.abi_filters),
        variants: manifest.android.variants.clone().unwrap_or(defaults.variants),
    };
    project = project.with_android_settings(settings);

    let mut facade = NativeBuildFacade::for_project(&project)?;
    apply_native(&mut facade, &mut project, &manifest.native)
        .with_context(|| format!("failed to configure native build of `{}`", project.name()))?;
    facade.finalize(&mut project)?;

    Ok(ConfiguredBuild { project, facade })
}

fn apply_native(
    facade: &mut NativeBuildFacade,
    project: &mut Project,
    native: &NativeSection,
) -> Result<()> {
    if let Some(ref flags) = native.compiler_flags {
        facade.set_compiler_flags(project, flags)?;
    }
    if let Some(ref flags) = native.linker_flags {
        facade.set_linker_flags(project, flags)?;
    }
    if let Some(ref args) = native.extra_arguments {
        facade.set_extra_arguments(project, args)?;
    }
    if let Some(ref target) = native.build_target {
        facade.set_build_target(project, target)?;
    }
    if let Some(ref folder) = native.working_folder {
        let folder = project.resolve_path(folder);
        facade.set_working_folder(project, &folder)?;
    }
    if let Some(ref prefix) = native.install_prefix {
        let prefix = project.resolve_path(prefix);
        facade.set_install_prefix(project, &prefix)?;
    }
    if let Some(ref source) = native.source {
        let source = project.resolve_path(source);
        facade.set_source_path(project, Some(&source))?;
    }
    Ok(())
}

/// Every registered task with its direct neighbors in the task graph.
pub fn task_report(project: &Project) -> Vec<TaskInfo> {
    let tasks = project.tasks();
    let owned = |names: Vec<&str>| -> Vec<String> {
        names.into_iter().map(str::to_string).collect()
    };
    tasks
        .names()
        .map(|name| {
            let task = tasks.get(name);
            TaskInfo {
                name: name.to_string(),
                description: task.and_then(|t| t.description()).map(str::to_string),
                depends_on: owned(tasks.dependencies(name)),
                required_by: owned(tasks.dependents(name)),
                actions: task.map_or(0, |t| t.action_count()),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::lifecycle::{CLEAN_HOOK_TASK, PRE_BUILD_TASK};
    use crate::core::project::CLEAN_TASK;
    use crate::test_support::RecordingRunner;
    use crate::util::diagnostic::TargetSelectionError;
    use tempfile::TempDir;

    fn write_manifest(contents: &str) -> (TempDir, PathBuf) {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("XNative.toml");
        std::fs::write(&path, contents).unwrap();
        (tmp, path)
    }

    fn opts(tasks: &[&str]) -> NativeBuildOptions {
        NativeBuildOptions {
            tasks: tasks.iter().map(|s| s.to_string()).collect(),
            properties: vec![("cmake.executable".into(), "cmake".into())],
        }
    }

    const CMAKE_MANIFEST: &str = r#"
[project]
name = "codec"

[target]
cmake = true

[properties]
"cmake.buildConfig" = "RelWithDebInfo"

[native]
compiler-flags = ["-O2"]
extra-arguments = ["-DWITH_TESTS=OFF"]
build-target = "install"
working-folder = "out/native"
install-prefix = "dist"
source = "src/CMakeLists.txt"
"#;

    #[test]
    fn test_configure_cmake_project() {
        let (tmp, path) = write_manifest(CMAKE_MANIFEST);
        let build = configure(&path, &Config::default(), &opts(&[])).unwrap();

        assert!(build.has_native_source());
        assert!(build.project.is_configured());
        assert_eq!(build.project.name(), "codec");
        assert_eq!(build.project.requested_tasks(), [POST_BUILD_TASK]);

        let ext = build.project.cmake().unwrap();
        assert_eq!(ext.working_folder, tmp.path().join("out/native"));
        assert_eq!(ext.install_prefix, Some(tmp.path().join("dist")));
        assert_eq!(ext.source_folder, Some(tmp.path().join("src")));
        assert_eq!(ext.build_config, "RelWithDebInfo");
        assert_eq!(ext.arguments, ["-DWITH_TESTS=OFF"]);
        assert_eq!(ext.build_target.as_deref(), Some("install"));
    }

    #[test]
    fn test_property_precedence() {
        let (_tmp, path) = write_manifest(CMAKE_MANIFEST);
        let mut config = Config::default();
        config
            .properties
            .insert("cmake.buildConfig".into(), "Debug".into());
        config
            .properties
            .insert("cmake.executable".into(), "/opt/cmake".into());

        let build = configure(&path, &config, &NativeBuildOptions::default()).unwrap();
        assert_eq!(build.project.cmake().unwrap().build_config, "RelWithDebInfo");
        assert_eq!(build.project.property("cmake.executable"), Some("/opt/cmake"));

        let mut options = opts(&[]);
        options
            .properties
            .push(("cmake.buildConfig".into(), "MinSizeRel".into()));
        let build = configure(&path, &config, &options).unwrap();
        assert_eq!(build.project.cmake().unwrap().build_config, "MinSizeRel");
        assert_eq!(build.project.property("cmake.executable"), Some("cmake"));
    }

    #[test]
    fn test_cmake_build_runs_in_order() {
        let (tmp, path) = write_manifest(CMAKE_MANIFEST);
        let build = configure(&path, &Config::default(), &opts(&[])).unwrap();

        let runner = RecordingRunner::new();
        let ran = build.execute(&runner).unwrap();
        assert_eq!(
            ran,
            [PRE_BUILD_TASK, "cmakeConfigure", "cmakeBuild", POST_BUILD_TASK]
        );

        let lines = runner.command_lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with(&format!("cmake -S {}", tmp.path().join("src").display())));
        assert!(lines[1].ends_with("--config RelWithDebInfo --target install"));
    }

    #[test]
    fn test_missing_target_is_fatal() {
        let (_tmp, path) = write_manifest("[native]\nsource = \"CMakeLists.txt\"\n");
        let err = configure(&path, &Config::default(), &opts(&[])).unwrap_err();
        assert_eq!(
            err.downcast_ref::<TargetSelectionError>(),
            Some(&TargetSelectionError::NoneEnabled)
        );
    }

    #[test]
    fn test_without_source_no_lifecycle_tasks() {
        let (_tmp, path) = write_manifest("[target]\ncmake = true\n\n[native]\nbuild-target = \"all\"\n");
        let build = configure(&path, &Config::default(), &opts(&[])).unwrap();

        assert!(!build.has_native_source());
        assert!(build.project.cmake().is_some());
        assert!(!build.project.tasks().contains(PRE_BUILD_TASK));
        assert!(build.execute(&RecordingRunner::new()).is_err());
    }

    #[test]
    fn test_android_install_per_abi() {
        let (tmp, path) = write_manifest(
            r#"
[target]
android = true

[native]
build-target = "install"
source = "src/main/cpp/CMakeLists.txt"

[android]
abi-filters = ["arm64-v8a", "armeabi-v7a"]
"#,
        );
        let mut config = Config::default();
        config.android.ndk_directory = Some(PathBuf::from("/opt/ndk"));

        let build = configure(&path, &config, &opts(&["assembleDebug", POST_BUILD_TASK])).unwrap();
        assert_eq!(
            build.project.android().unwrap().arguments,
            ["-DANDROID_NDK=/opt/ndk"]
        );

        let runner = RecordingRunner::new();
        let ran = build.execute(&runner).unwrap();
        assert_eq!(
            ran,
            [
                PRE_BUILD_TASK,
                "externalNativeBuildDebug",
                "assembleDebug",
                POST_BUILD_TASK
            ]
        );

        let cwds: Vec<PathBuf> = runner
            .commands()
            .iter()
            .filter_map(|cmd| cmd.get_cwd().map(Path::to_path_buf))
            .collect();
        let intermediates = tmp.path().join(".externalNativeBuild/cmake/debug");
        assert_eq!(
            cwds,
            [intermediates.join("arm64-v8a"), intermediates.join("armeabi-v7a")]
        );
    }

    #[test]
    fn test_task_report() {
        let (_tmp, path) = write_manifest(CMAKE_MANIFEST);
        let build = configure(&path, &Config::default(), &opts(&[CLEAN_TASK])).unwrap();
        let report = task_report(&build.project);

        let clean = report.iter().find(|t| t.name == CLEAN_TASK).unwrap();
        assert_eq!(clean.depends_on, [CLEAN_HOOK_TASK]);
        let hook = report.iter().find(|t| t.name == CLEAN_HOOK_TASK).unwrap();
        assert_eq!(hook.depends_on, ["cmakeClean"]);
        assert_eq!(hook.required_by, [CLEAN_TASK]);
        assert_eq!(hook.actions, 0);
        assert!(hook.description.is_some());

        let configure = report.iter().find(|t| t.name == "cmakeConfigure").unwrap();
        assert_eq!(configure.depends_on, [PRE_BUILD_TASK]);
        assert_eq!(configure.required_by, ["cmakeBuild"]);
        assert_eq!(configure.actions, 1);
    }
}
