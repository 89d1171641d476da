//! User-friendly diagnostic messages.
//!
//! Every fatal configuration error carries a suggested fix. The structured
//! error types derive [`miette::Diagnostic`] so the help text travels with
//! the error through `anyhow`.

use std::fmt;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::core::manifest::ManifestError;
use crate::core::task::TaskGraphError;

/// Common suggestion messages for consistent error handling.
pub mod suggestions {
    /// Suggestion when a requested task does not exist.
    pub const TASK_NOT_FOUND: &str = "help: Run `xnative tasks` to see available tasks";

    /// Suggestion when an external build step fails.
    pub const BUILD_FAILED: &str = "help: Run `xnative -v build` for more details";
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A diagnostic message with optional suggestions.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Primary message
    pub message: String,
    /// Severity level
    pub severity: Severity,
    /// Suggested fixes
    pub suggestions: Vec<String>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            severity: Severity::Error,
            suggestions: Vec::new(),
        }
    }

    /// Create a new warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            severity: Severity::Warning,
            suggestions: Vec::new(),
        }
    }

    /// Add a suggestion for fixing the issue.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Build an error diagnostic from an error chain, attaching any help
    /// text a structured error in the chain provides.
    pub fn from_error(err: &anyhow::Error) -> Self {
        let mut diag = Diagnostic::error(format!("{:#}", err));
        if let Some(help) = help_for(err) {
            diag = diag.with_suggestion(help);
        }
        diag
    }

    /// Format the diagnostic for terminal output.
    pub fn format(&self, color: bool) -> String {
        let mut output = String::new();

        let severity_str = if color {
            match self.severity {
                Severity::Error => "\x1b[1;31merror\x1b[0m",
                Severity::Warning => "\x1b[1;33mwarning\x1b[0m",
            }
        } else {
            match self.severity {
                Severity::Error => "error",
                Severity::Warning => "warning",
            }
        };

        output.push_str(&format!("{}: {}\n", severity_str, self.message));

        if !self.suggestions.is_empty() {
            output.push('\n');
            let help_prefix = if color {
                "\x1b[1;32mhelp\x1b[0m"
            } else {
                "help"
            };
            output.push_str(&format!("{}: consider:\n", help_prefix));
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, suggestion));
            }
        }

        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(false))
    }
}

/// The project does not enable exactly one native build target.
#[derive(Debug, Error, MietteDiagnostic, PartialEq, Eq)]
pub enum TargetSelectionError {
    #[error("no native build target is enabled")]
    #[diagnostic(
        code(xnative::target::none),
        help("Set `android = true` or `cmake = true` under [target] in XNative.toml")
    )]
    NoneEnabled,

    #[error("both the android and cmake build targets are enabled")]
    #[diagnostic(
        code(xnative::target::ambiguous),
        help("Enable exactly one of `android` or `cmake` under [target]")
    )]
    Ambiguous,
}

/// An underlying build plugin rejected its configuration.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum PluginError {
    #[error("the {0} plugin has not been applied to this project")]
    #[diagnostic(code(xnative::plugin::not_applied))]
    NotApplied(&'static str),

    #[error("Android NDK location is not configured")]
    #[diagnostic(
        code(xnative::android::no_ndk),
        help("Set `ndk-directory` under [android], or export ANDROID_NDK_HOME")
    )]
    MissingNdk,

    #[error("no native source path has been configured for the {0} plugin")]
    #[diagnostic(
        code(xnative::plugin::no_source),
        help("Set `source` under [native] to the project's CMakeLists.txt")
    )]
    MissingSource(&'static str),
}

/// Find help text for the first structured error in the chain.
pub fn help_for(err: &anyhow::Error) -> Option<String> {
    for cause in err.chain() {
        let help = if let Some(e) = cause.downcast_ref::<TargetSelectionError>() {
            e.help().map(|h| h.to_string())
        } else if let Some(e) = cause.downcast_ref::<PluginError>() {
            e.help().map(|h| h.to_string())
        } else if let Some(e) = cause.downcast_ref::<ManifestError>() {
            e.help().map(|h| h.to_string())
        } else if let Some(TaskGraphError::NotFound(_)) = cause.downcast_ref::<TaskGraphError>() {
            Some(suggestions::TASK_NOT_FOUND.trim_start_matches("help: ").to_string())
        } else {
            None
        };
        if help.is_some() {
            return help;
        }
    }
    None
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}
