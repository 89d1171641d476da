//! Command implementations

pub mod build;
pub mod clean;
pub mod tasks;

use anyhow::Result;

use crate::cli::GlobalArgs;
use xnative::ops::{configure, ConfiguredBuild, NativeBuildOptions};
use xnative::util::config::parse_property;
use xnative::util::GlobalContext;

/// Locate the manifest, load configuration and configure the project.
pub fn load_build(global: &GlobalArgs, tasks: Vec<String>) -> Result<ConfiguredBuild> {
    let ctx = GlobalContext::new()?;

    let manifest_path = match global.manifest_path {
        Some(ref path) => ctx.cwd().join(path),
        None => ctx.find_manifest()?,
    };
    let root = manifest_path.parent().unwrap_or(ctx.cwd()).to_path_buf();

    // Load configuration (global + project)
    let config = ctx.load_config(&root);

    let properties = global
        .properties
        .iter()
        .map(|raw| parse_property(raw))
        .collect::<Result<Vec<_>>>()?;

    let opts = NativeBuildOptions { tasks, properties };
    configure(&manifest_path, &config, &opts)
}
