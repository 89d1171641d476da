//! Dependency names a backend asks the lifecycle tasks to be wired against.

use anyhow::Result;
use serde::Serialize;

use crate::builder::backend::NativeBackend;
use crate::core::project::Project;

/// Upstream/downstream task names for the three lifecycle hooks.
///
/// A `None` field requests no edges. Lists are never empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskDependencySpec {
    pre_depends: Option<Vec<String>>,
    post_depends: Option<Vec<String>>,
    clean_depends: Option<Vec<String>>,
}

fn non_empty(names: Option<Vec<String>>) -> Option<Vec<String>> {
    names.filter(|n| !n.is_empty())
}

impl TaskDependencySpec {
    pub fn new(
        pre_depends: Option<Vec<String>>,
        post_depends: Option<Vec<String>>,
        clean_depends: Option<Vec<String>>,
    ) -> Self {
        TaskDependencySpec {
            pre_depends: non_empty(pre_depends),
            post_depends: non_empty(post_depends),
            clean_depends: non_empty(clean_depends),
        }
    }

    /// Ask the backend's three dependency-name providers.
    pub fn resolve(backend: &dyn NativeBackend, project: &Project) -> Result<Self> {
        Ok(TaskDependencySpec::new(
            backend.pre_depends(project)?,
            backend.post_depends(project)?,
            backend.clean_depends(project)?,
        ))
    }

    /// Tasks that must run after `preExternalNativeBuild`.
    pub fn pre_depends(&self) -> Option<&[String]> {
        self.pre_depends.as_deref()
    }

    /// Tasks `postExternalNativeBuild` runs after.
    pub fn post_depends(&self) -> Option<&[String]> {
        self.post_depends.as_deref()
    }

    /// Tasks `externalNativeBuildClean` runs after.
    pub fn clean_depends(&self) -> Option<&[String]> {
        self.clean_depends.as_deref()
    }
}
