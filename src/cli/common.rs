//! Shared types for CLI command handlers.

use std::fmt;
use std::process::ExitCode;

/// Result type for CLI command execution.
pub type CliResult<T> = Result<T, CliError>;

/// Error raised by a CLI command, carrying its exit code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliError {
    kind: CliErrorKind,
    message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CliErrorKind {
    /// Bad arguments or unknown identifiers
    Usage,
    /// Invalid input data
    Validation,
    /// Filesystem or serialization failure
    Io,
}

impl CliError {
    /// Bad arguments or unknown identifiers (exit code 2).
    pub fn usage(message: impl Into<String>) -> Self {
        Self {
            kind: CliErrorKind::Usage,
            message: message.into(),
        }
    }

    /// Invalid input data (exit code 1).
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            kind: CliErrorKind::Validation,
            message: message.into(),
        }
    }

    /// Filesystem or serialization failure (exit code 1).
    pub fn io(message: impl Into<String>) -> Self {
        Self {
            kind: CliErrorKind::Io,
            message: message.into(),
        }
    }

    /// Process exit code for this error.
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        match self.kind {
            CliErrorKind::Usage => ExitCode::from(2),
            CliErrorKind::Validation | CliErrorKind::Io => ExitCode::FAILURE,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}
