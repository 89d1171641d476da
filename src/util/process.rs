//! Subprocess execution utilities.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use anyhow::{bail, Context, Result};

use crate::util::fs::remove_dir_all_if_exists;

/// Project property naming an explicit `cmake` executable.
pub const CMAKE_EXECUTABLE_PROPERTY: &str = "cmake.executable";

/// Builder for subprocess execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
    cwd: Option<PathBuf>,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            cwd: None,
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(
            args.into_iter()
                .map(|s| s.as_ref().to_string_lossy().into_owned()),
        );
        self
    }

    /// Set the working directory.
    pub fn cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    /// Get the arguments.
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Get the working directory, if one was set.
    pub fn get_cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        cmd
    }

    /// Execute with inherited stdio and return the exit status.
    pub fn status(&self) -> Result<ExitStatus> {
        let mut cmd = self.build_command();
        let status = cmd
            .status()
            .with_context(|| format!("failed to execute `{}`", self.program.display()))?;
        Ok(status)
    }

    /// Execute and require success.
    pub fn exec_and_check(&self) -> Result<()> {
        let status = self.status()?;
        if !status.success() {
            bail!(
                "`{}` failed with exit code {:?}",
                self.display_command(),
                status.code()
            );
        }
        Ok(())
    }

    /// Display the command for error messages.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Side effects a task may perform during execution.
///
/// Task actions never spawn processes or delete directories directly; they go
/// through a runner so that `--dry-run` and tests can intercept them.
pub trait CommandRunner {
    /// Run a command to completion. A non-zero exit is an error.
    fn run(&self, cmd: &ProcessBuilder) -> Result<()>;

    /// Remove a directory tree if it exists.
    fn remove_dir(&self, path: &Path) -> Result<()>;
}

/// Runs commands on the host system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, cmd: &ProcessBuilder) -> Result<()> {
        match cmd.get_cwd() {
            Some(cwd) => tracing::info!("running `{}` in {}", cmd.display_command(), cwd.display()),
            None => tracing::info!("running `{}`", cmd.display_command()),
        }
        cmd.exec_and_check()
    }

    fn remove_dir(&self, path: &Path) -> Result<()> {
        tracing::info!("removing {}", path.display());
        remove_dir_all_if_exists(path)
    }
}

/// Prints what would run without touching the system.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunRunner;

impl CommandRunner for DryRunRunner {
    fn run(&self, cmd: &ProcessBuilder) -> Result<()> {
        match cmd.get_cwd() {
            Some(cwd) => println!("[dry-run] {} (in {})", cmd.display_command(), cwd.display()),
            None => println!("[dry-run] {}", cmd.display_command()),
        }
        Ok(())
    }

    fn remove_dir(&self, path: &Path) -> Result<()> {
        println!("[dry-run] remove {}", path.display());
        Ok(())
    }
}

/// Find an executable in PATH.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}

/// Find CMake.
pub fn find_cmake() -> Option<PathBuf> {
    find_executable("cmake")
}

/// Resolve the `cmake` program, honoring an explicit override.
///
/// Falls back to the bare name when nothing is found on PATH so the failure
/// surfaces from the process launch with the command line attached.
pub fn resolve_cmake(override_path: Option<&str>) -> PathBuf {
    if let Some(path) = override_path {
        return PathBuf::from(path);
    }
    find_cmake().unwrap_or_else(|| PathBuf::from("cmake"))
}
