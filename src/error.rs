use serde::Serialize;
use std::fmt;
use ts_rs::TS;

/// Structured error type for every command in the gateway.
///
/// The host only needs the integer `code()` to decide success or failure,
/// but the tagged `kind` is kept alongside so callers can tell an argument
/// error from a precondition or execution failure without string matching.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CommandError {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Error kinds for categorizing command failures
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    // Argument errors (detected during parse, never reach libgit2)
    MissingField,
    TypeMismatch,
    InvalidArgument,

    // Precondition errors (the repository handle is in the wrong state)
    RepositoryNotOpen,
    RepositoryAlreadyOpen,

    // Execution errors (filesystem or libgit2 failures)
    FilesystemResolution,
    GitOperation,

    // Command abandoned before execution began
    Cancelled,
}

/// Coarse error classes; only `Execution` failures are worth retrying
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Argument,
    Precondition,
    Execution,
    Cancelled,
}

impl ErrorKind {
    pub fn class(&self) -> ErrorClass {
        match self {
            ErrorKind::MissingField | ErrorKind::TypeMismatch | ErrorKind::InvalidArgument => {
                ErrorClass::Argument
            }
            ErrorKind::RepositoryNotOpen | ErrorKind::RepositoryAlreadyOpen => {
                ErrorClass::Precondition
            }
            ErrorKind::FilesystemResolution | ErrorKind::GitOperation => ErrorClass::Execution,
            ErrorKind::Cancelled => ErrorClass::Cancelled,
        }
    }

    /// Stable integer code reported as the response status.
    /// 0 is reserved for success; 1x argument, 2x precondition,
    /// 3x execution, 40 cancelled.
    pub fn code(&self) -> i32 {
        match self {
            ErrorKind::MissingField => 10,
            ErrorKind::TypeMismatch => 11,
            ErrorKind::InvalidArgument => 12,
            ErrorKind::RepositoryNotOpen => 20,
            ErrorKind::RepositoryAlreadyOpen => 21,
            ErrorKind::FilesystemResolution => 30,
            ErrorKind::GitOperation => 31,
            ErrorKind::Cancelled => 40,
        }
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(details) = &self.details {
            write!(f, "{:?}: {} - {}", self.kind, self.message, details)
        } else {
            write!(f, "{:?}: {}", self.kind, self.message)
        }
    }
}

impl std::error::Error for CommandError {}

impl From<CommandError> for String {
    fn from(err: CommandError) -> String {
        serde_json::to_string(&err).unwrap_or_else(|_| err.message)
    }
}

// Convenience constructors
impl CommandError {
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::MissingField,
            message: "Missing required field".to_string(),
            details: Some(field.into()),
        }
    }

    pub fn type_mismatch(field: impl Into<String>, expected: &str) -> Self {
        Self {
            kind: ErrorKind::TypeMismatch,
            message: format!("Field '{}' must be a {}", field.into(), expected),
            details: None,
        }
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::InvalidArgument,
            message: msg.into(),
            details: None,
        }
    }

    pub fn repository_not_open() -> Self {
        Self {
            kind: ErrorKind::RepositoryNotOpen,
            message: "No repository is bound to this session".to_string(),
            details: None,
        }
    }

    pub fn repository_already_open() -> Self {
        Self {
            kind: ErrorKind::RepositoryAlreadyOpen,
            message: "A repository is already bound to this session".to_string(),
            details: None,
        }
    }

    pub fn filesystem(msg: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::FilesystemResolution,
            message: msg.into(),
            details: None,
        }
    }

    pub fn git(msg: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::GitOperation,
            message: msg.into(),
            details: None,
        }
    }

    pub fn cancelled() -> Self {
        Self {
            kind: ErrorKind::Cancelled,
            message: "Command was cancelled before execution".to_string(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn code(&self) -> i32 {
        self.kind.code()
    }

    pub fn class(&self) -> ErrorClass {
        self.kind.class()
    }

    /// Whether the caller may reasonably retry the same message as-is
    pub fn is_retryable(&self) -> bool {
        self.class() == ErrorClass::Execution
    }
}

// Conversions from common error types
impl From<git2::Error> for CommandError {
    fn from(err: git2::Error) -> Self {
        Self::git(err.message().to_string())
            .with_details(format!("{:?}/{:?}", err.class(), err.code()))
    }
}

impl From<std::io::Error> for CommandError {
    fn from(err: std::io::Error) -> Self {
        Self::filesystem(err.to_string())
    }
}
