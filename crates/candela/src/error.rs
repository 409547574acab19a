#![forbid(unsafe_code)]

//! Shell error type.

use std::fmt;
use std::io;

use crate::command::DefinitionError;

/// Errors that stop a shell.
///
/// Per-line problems (unknown command, parse and validation failures) never
/// surface here; they are reported in the output and the loop continues.
#[derive(Debug)]
pub enum ShellError {
    /// The surface failed.
    Io(io::Error),
    /// A malformed command definition.
    Definition(DefinitionError),
    /// The active menu name matches no registered menu.
    UnknownMenu { name: String },
    /// The user pressed the quit key and the shell is configured not to exit
    /// the process.
    Aborted,
}

impl fmt::Display for ShellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "surface I/O error: {e}"),
            Self::Definition(e) => write!(f, "{e}"),
            Self::UnknownMenu { name } => write!(f, "no menu named {name:?}"),
            Self::Aborted => write!(f, "shell aborted by user"),
        }
    }
}

impl std::error::Error for ShellError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Definition(e) => Some(e),
            Self::UnknownMenu { .. } | Self::Aborted => None,
        }
    }
}

impl From<io::Error> for ShellError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<DefinitionError> for ShellError {
    fn from(e: DefinitionError) -> Self {
        Self::Definition(e)
    }
}
