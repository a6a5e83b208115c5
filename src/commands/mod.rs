//! Git command contract and dispatch
//!
//! Every request from the host goes through the same two-phase lifecycle:
//! the dispatcher maps the message's `subject` to a command variant, the
//! variant parses its typed arguments out of the message, and only if
//! parsing succeeded does execution run against the session's repository
//! handle. A parse failure always short-circuits execution.

pub mod branch;
pub mod clone;
pub mod commit;

use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use ts_rs::TS;

use crate::constants::{
    SUBJECTS, SUBJECT_CLONE, SUBJECT_COMMIT, SUBJECT_CURRENT_BRANCH, SUBJECT_GET_BRANCHES,
};
use crate::error::CommandError;
use crate::git::repository::BranchInfo;
use crate::message::Message;
use crate::session::GitSession;

use branch::{GitCurrentBranch, GitGetBranches};
use clone::GitClone;
use commit::GitCommit;

/// Contract implemented by every git command.
///
/// `parse_args` extracts and validates the required fields; the default is
/// a no-op for commands that need nothing beyond the subject. `run` executes
/// against the session's repository handle and is never called when
/// `parse_args` failed.
pub trait GitCommand {
    fn subject(&self) -> &'static str;

    fn parse_args(&mut self, _message: &Message) -> Result<(), CommandError> {
        Ok(())
    }

    fn run(&mut self, session: &GitSession) -> Result<Option<ResponsePayload>, CommandError>;
}

/// Result payload carried back to the host for read commands
#[derive(Debug, Clone, Serialize, PartialEq, Eq, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResponsePayload {
    CurrentBranch { name: String },
    Branches { branches: Vec<BranchInfo> },
}

/// Response returned to the host for every message
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Response {
    pub subject: String,
    /// 0 on success; otherwise the failing error kind's stable code
    pub status: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CommandError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<ResponsePayload>,
}

impl Response {
    pub fn success(subject: &str, payload: Option<ResponsePayload>) -> Self {
        Self {
            subject: subject.to_string(),
            status: 0,
            error: None,
            payload,
        }
    }

    pub fn failure(subject: &str, error: CommandError) -> Self {
        Self {
            subject: subject.to_string(),
            status: error.code(),
            error: Some(error),
            payload: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == 0
    }
}

/// Cooperative cancellation for a pending command.
///
/// Honored only between parse and run: a command that has started executing
/// is never interrupted, since libgit2's consistency under interruption is
/// unspecified.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Map a subject to its command variant.
/// The variant set is closed: unknown subjects are argument errors.
fn command_for_subject(subject: &str) -> Result<Box<dyn GitCommand>, CommandError> {
    match subject {
        SUBJECT_CLONE => Ok(Box::new(GitClone::new())),
        SUBJECT_COMMIT => Ok(Box::new(GitCommit::new())),
        SUBJECT_CURRENT_BRANCH => Ok(Box::new(GitCurrentBranch::new())),
        SUBJECT_GET_BRANCHES => Ok(Box::new(GitGetBranches::new())),
        other => Err(CommandError::invalid_argument(format!(
            "Unknown subject: '{}'",
            other
        ))
        .with_details(format!("known subjects: {}", SUBJECTS.join(", ")))),
    }
}

/// Dispatch a message against a session
pub fn dispatch(session: &GitSession, message: &Message) -> Response {
    dispatch_cancellable(session, message, &CancelToken::new())
}

/// Dispatch with a cancellation token checked before execution begins
pub fn dispatch_cancellable(
    session: &GitSession,
    message: &Message,
    cancel: &CancelToken,
) -> Response {
    let subject = match message.subject() {
        Ok(subject) => subject,
        Err(error) => return Response::failure("", error),
    };

    match execute(&subject, session, message, cancel) {
        Ok(payload) => {
            tracing::debug!(subject = %subject, "command succeeded");
            Response::success(&subject, payload)
        }
        Err(error) => {
            tracing::warn!(subject = %subject, status = error.code(), "command failed: {}", error);
            Response::failure(&subject, error)
        }
    }
}

fn execute(
    subject: &str,
    session: &GitSession,
    message: &Message,
    cancel: &CancelToken,
) -> Result<Option<ResponsePayload>, CommandError> {
    let mut command = command_for_subject(subject)?;

    // Parsing must complete before execution is attempted
    command.parse_args(message)?;

    if cancel.is_cancelled() {
        return Err(CommandError::cancelled());
    }

    command.run(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::BRANCH_ALL;
    use crate::error::ErrorKind;
    use serde_json::json;
    use tempfile::tempdir;

    fn session_in(dir: &std::path::Path) -> GitSession {
        GitSession::with_data_root(dir.to_path_buf(), BRANCH_ALL)
    }

    fn msg(value: serde_json::Value) -> Message {
        Message::from_value(value).unwrap()
    }

    #[test]
    fn test_unknown_subject_is_rejected() {
        let dir = tempdir().unwrap();
        let session = session_in(dir.path());

        let response = dispatch(&session, &msg(json!({"subject": "rebase"})));
        assert_eq!(response.status, ErrorKind::InvalidArgument.code());
        assert_eq!(response.subject, "rebase");
    }

    #[test]
    fn test_missing_subject_is_rejected() {
        let dir = tempdir().unwrap();
        let session = session_in(dir.path());

        let response = dispatch(&session, &msg(json!({})));
        assert_eq!(response.status, ErrorKind::MissingField.code());
    }

    #[test]
    fn test_parse_failure_short_circuits_execution() {
        let dir = tempdir().unwrap();
        let session = session_in(dir.path());

        // Malformed URL fails during parse, so the filesystem resource named
        // in the message must never be mounted
        let response = dispatch(
            &session,
            &msg(json!({
                "subject": "clone",
                "url": "not a url",
                "fullPath": "/repo",
                "resource": "fsX"
            })),
        );
        assert_eq!(response.status, ErrorKind::InvalidArgument.code());
        assert!(!session.mounts_root().join("fsX").exists());
        assert!(!session.is_bound());
    }

    #[test]
    fn test_cancelled_before_execution() {
        let dir = tempdir().unwrap();
        let session = session_in(dir.path());

        let cancel = CancelToken::new();
        cancel.cancel();

        let response = dispatch_cancellable(
            &session,
            &msg(json!({"subject": "current-branch"})),
            &cancel,
        );
        assert_eq!(response.status, ErrorKind::Cancelled.code());
        assert!(!session.is_bound());
    }

    #[test]
    fn test_success_response_shape() {
        let response = Response::success("clone", None);
        assert!(response.is_success());
        assert!(response.error.is_none());

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], 0);
        assert!(json.get("error").is_none());
        assert!(json.get("payload").is_none());
    }
}
