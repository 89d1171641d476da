//! Android plugin native build model.
//!
//! Mirrors the slice of the Android plugin the facade configures: the
//! `externalNativeBuild.cmake` block, the NDK location, the ABI filters and
//! the library variants. Applying the plugin registers, for every variant
//! `V`, the tasks `externalNativeBuild<V>`, `externalNativeBuildClean<V>`
//! and `assemble<V>`.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::core::project::Project;
use crate::core::task::TaskContext;
use crate::util::diagnostic::PluginError;
use crate::util::fs::{source_folder, to_forward_slashes};
use crate::util::process::{resolve_cmake, ProcessBuilder, CMAKE_EXECUTABLE_PROPERTY};

pub const DEFAULT_VARIANTS: &[&str] = &["debug", "release"];

pub const DEFAULT_ABI_FILTERS: &[&str] = &["arm64-v8a", "armeabi-v7a", "x86", "x86_64"];

/// Prefix of the per-variant native build task.
pub const BUILD_TASK_PREFIX: &str = "externalNativeBuild";

/// Prefix of the per-variant native clean task.
pub const CLEAN_TASK_PREFIX: &str = "externalNativeBuildClean";

pub const ASSEMBLE_TASK_PREFIX: &str = "assemble";

/// Inputs the Android build script gives the plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AndroidSettings {
    pub ndk_directory: Option<PathBuf>,
    pub abi_filters: Vec<String>,
    /// Library variant names, in declaration order
    pub variants: Vec<String>,
}

impl Default for AndroidSettings {
    fn default() -> Self {
        AndroidSettings {
            ndk_directory: None,
            abi_filters: DEFAULT_ABI_FILTERS.iter().map(|s| s.to_string()).collect(),
            variants: DEFAULT_VARIANTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// A library build variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryVariant {
    pub name: String,
}

impl LibraryVariant {
    pub fn new(name: impl Into<String>) -> Self {
        LibraryVariant { name: name.into() }
    }
}

/// Upper-case the first character: `debug` -> `Debug`.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `defaultConfig.externalNativeBuild.cmake` plus the plugin state the facade reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AndroidExtension {
    pub ndk_directory: PathBuf,
    /// CMake arguments
    pub arguments: Vec<String>,
    pub c_flags: Vec<String>,
    pub cpp_flags: Vec<String>,
    /// `externalNativeBuild.cmake.path`, the CMakeLists.txt file
    pub cmake_path: Option<PathBuf>,
    /// `defaultConfig.ndk.abiFilters`
    pub abi_filters: Vec<String>,
    pub library_variants: Vec<LibraryVariant>,
}

impl AndroidExtension {
    pub fn variant_names(&self) -> impl Iterator<Item = &str> {
        self.library_variants.iter().map(|v| v.name.as_str())
    }

    /// `<ndk>/build/cmake/android.toolchain.cmake`, forward slashes only.
    pub fn toolchain_file(&self) -> String {
        format!(
            "{}/build/cmake/android.toolchain.cmake",
            to_forward_slashes(&self.ndk_directory)
        )
    }
}

/// Intermediate CMake folder of one variant.
pub fn variant_build_dir(root: &Path, variant: &str) -> PathBuf {
    root.join(".externalNativeBuild").join("cmake").join(variant)
}

/// Intermediate CMake folder of one variant and ABI.
pub fn abi_build_dir(root: &Path, variant: &str, abi: &str) -> PathBuf {
    variant_build_dir(root, variant).join(abi)
}

/// Environment variables naming the NDK root, in lookup order.
pub const NDK_ENV_VARS: &[&str] = &["ANDROID_NDK_HOME", "ANDROID_NDK_ROOT"];

/// First non-empty NDK root among [`NDK_ENV_VARS`].
///
/// `lookup` is normally `std::env::var_os`.
pub fn ndk_from_env<F>(lookup: F) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<OsString>,
{
    NDK_ENV_VARS
        .iter()
        .filter_map(|&key| lookup(key))
        .find(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Apply the Android plugin. Applying twice is a no-op.
///
/// The NDK location must already be part of the project's
/// [`AndroidSettings`].
pub fn apply(project: &mut Project) -> Result<()> {
    if project.android().is_some() {
        return Ok(());
    }

    let settings = project.android_settings().clone();
    let ndk_directory = settings.ndk_directory.ok_or(PluginError::MissingNdk)?;

    let extension = AndroidExtension {
        ndk_directory,
        arguments: Vec::new(),
        c_flags: Vec::new(),
        cpp_flags: Vec::new(),
        cmake_path: None,
        abi_filters: settings.abi_filters,
        library_variants: settings.variants.iter().map(LibraryVariant::new).collect(),
    };

    let tasks = project.tasks_mut();
    for variant in &extension.library_variants {
        let capitalized = capitalize(&variant.name);
        let build_task = format!("{}{}", BUILD_TASK_PREFIX, capitalized);
        let clean_task = format!("{}{}", CLEAN_TASK_PREFIX, capitalized);
        let assemble_task = format!("{}{}", ASSEMBLE_TASK_PREFIX, capitalized);

        tasks.register(
            &build_task,
            Some(format!("Builds native code for the {} variant.", variant.name).as_str()),
        )?;
        tasks.register(
            &clean_task,
            Some(format!("Cleans native code for the {} variant.", variant.name).as_str()),
        )?;
        tasks.register(
            &assemble_task,
            Some(format!("Assembles the {} variant.", variant.name).as_str()),
        )?;
        tasks.depends_on(&assemble_task, &build_task)?;

        let name = variant.name.clone();
        tasks.do_last(&build_task, Box::new(move |ctx| build_variant(ctx, &name)))?;
        let name = variant.name.clone();
        tasks.do_last(
            &clean_task,
            Box::new(move |ctx| {
                ctx.runner
                    .remove_dir(&variant_build_dir(ctx.project.root(), &name))
            }),
        )?;
    }

    tracing::debug!(
        "applied android plugin (ndk {}, {} variant(s))",
        extension.ndk_directory.display(),
        extension.library_variants.len()
    );
    project.set_android(extension);
    Ok(())
}

fn build_variant(ctx: &TaskContext<'_>, variant: &str) -> Result<()> {
    let ext = ctx
        .project
        .android()
        .ok_or(PluginError::NotApplied("android"))?;
    let cmake_path = ext
        .cmake_path
        .as_ref()
        .ok_or(PluginError::MissingSource("android"))?;
    let source_dir = source_folder(cmake_path);
    let cmake = resolve_cmake(ctx.project.property(CMAKE_EXECUTABLE_PROPERTY));
    let build_type = if variant == "release" { "Release" } else { "Debug" };

    for abi in &ext.abi_filters {
        let dir = abi_build_dir(ctx.project.root(), variant, abi);

        let mut configure = ProcessBuilder::new(&cmake)
            .arg("-S")
            .arg(source_dir)
            .arg("-B")
            .arg(&dir)
            .arg(format!("-DCMAKE_TOOLCHAIN_FILE={}", ext.toolchain_file()))
            .arg(format!("-DANDROID_ABI={}", abi))
            .arg(format!("-DCMAKE_BUILD_TYPE={}", build_type))
            .args(&ext.arguments);
        if !ext.c_flags.is_empty() {
            configure = configure.arg(format!("-DCMAKE_C_FLAGS={}", ext.c_flags.join(" ")));
        }
        if !ext.cpp_flags.is_empty() {
            configure = configure.arg(format!("-DCMAKE_CXX_FLAGS={}", ext.cpp_flags.join(" ")));
        }

        ctx.runner.run(&configure)?;
        ctx.runner
            .run(&ProcessBuilder::new(&cmake).arg("--build").arg(&dir))?;
    }

    Ok(())
}
