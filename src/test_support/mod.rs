//! Test utilities for unit tests.
//!
//! [`RecordingRunner`] stands in for the system runner so task execution
//! can be asserted on without spawning processes.

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::util::process::{CommandRunner, ProcessBuilder};

/// Records commands and directory removals instead of performing them.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    commands: RefCell<Vec<ProcessBuilder>>,
    removed: RefCell<Vec<PathBuf>>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        RecordingRunner::default()
    }

    /// Every command run so far, in order.
    pub fn commands(&self) -> Vec<ProcessBuilder> {
        self.commands.borrow().clone()
    }

    /// The recorded commands rendered as shell-like lines.
    pub fn command_lines(&self) -> Vec<String> {
        self.commands
            .borrow()
            .iter()
            .map(ProcessBuilder::display_command)
            .collect()
    }

    /// Every directory removal requested so far, in order.
    pub fn removed(&self) -> Vec<PathBuf> {
        self.removed.borrow().clone()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, cmd: &ProcessBuilder) -> Result<()> {
        self.commands.borrow_mut().push(cmd.clone());
        Ok(())
    }

    fn remove_dir(&self, path: &Path) -> Result<()> {
        self.removed.borrow_mut().push(path.to_path_buf());
        Ok(())
    }
}
