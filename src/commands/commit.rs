//! `commit`: advance the bound repository's history by one commit

use super::{GitCommand, ResponsePayload};
use crate::constants::{FIELD_AUTHOR_EMAIL, FIELD_AUTHOR_NAME, FIELD_MESSAGE, SUBJECT_COMMIT};
use crate::error::CommandError;
use crate::git::repository;
use crate::message::Message;
use crate::session::GitSession;

/// Typed arguments for commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitArgs {
    pub author_name: String,
    pub author_email: String,
    pub message: String,
}

impl CommitArgs {
    pub fn from_message(message: &Message) -> Result<Self, CommandError> {
        Ok(Self {
            author_name: message.get_str(FIELD_AUTHOR_NAME)?,
            author_email: message.get_str(FIELD_AUTHOR_EMAIL)?,
            message: message.get_str(FIELD_MESSAGE)?,
        })
    }
}

pub struct GitCommit {
    args: Option<CommitArgs>,
}

impl GitCommit {
    pub fn new() -> Self {
        Self { args: None }
    }
}

impl Default for GitCommit {
    fn default() -> Self {
        Self::new()
    }
}

impl GitCommand for GitCommit {
    fn subject(&self) -> &'static str {
        SUBJECT_COMMIT
    }

    fn parse_args(&mut self, message: &Message) -> Result<(), CommandError> {
        self.args = Some(CommitArgs::from_message(message)?);
        Ok(())
    }

    fn run(&mut self, session: &GitSession) -> Result<Option<ResponsePayload>, CommandError> {
        let args = self
            .args
            .as_ref()
            .ok_or_else(|| CommandError::invalid_argument("commit executed before parsing"))?;

        let slot = session.repo();
        let repo = slot.as_ref().ok_or_else(CommandError::repository_not_open)?;

        let oid = repository::commit(repo, &args.author_name, &args.author_email, &args.message)?;
        tracing::info!(commit = %oid, "created commit");

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::dispatch;
    use crate::constants::BRANCH_ALL;
    use crate::error::ErrorKind;
    use git2::Repository;
    use serde_json::json;
    use tempfile::{tempdir, TempDir};

    fn msg(value: serde_json::Value) -> Message {
        Message::from_value(value).unwrap()
    }

    fn commit_message() -> serde_json::Value {
        json!({
            "subject": "commit",
            "authorName": "Test User",
            "authorEmail": "test@example.com",
            "message": "update"
        })
    }

    /// A session bound to a freshly initialized repository
    fn bound_session() -> (TempDir, TempDir, GitSession) {
        let data_root = tempdir().unwrap();
        let repo_dir = tempdir().unwrap();
        let repo = Repository::init(repo_dir.path()).unwrap();
        repo.set_head("refs/heads/trunk").unwrap();

        let session = GitSession::with_data_root(data_root.path().to_path_buf(), BRANCH_ALL);
        *session.repo() = Some(repo);
        (data_root, repo_dir, session)
    }

    #[test]
    fn test_commit_args_require_every_field() {
        let full = commit_message();
        for field in ["authorName", "authorEmail", "message"] {
            let mut value = full.clone();
            value.as_object_mut().unwrap().remove(field);
            let err = CommitArgs::from_message(&msg(value)).unwrap_err();
            assert_eq!(err.kind, ErrorKind::MissingField, "field: {}", field);
        }
    }

    #[test]
    fn test_commit_without_message_field_creates_nothing() {
        let (_data, _repo_dir, session) = bound_session();

        let mut value = commit_message();
        value.as_object_mut().unwrap().remove("message");
        let response = dispatch(&session, &msg(value));

        assert_eq!(response.status, ErrorKind::MissingField.code());
        let slot = session.repo();
        let repo = slot.as_ref().unwrap();
        // HEAD is still unborn: parse failed before any git call
        assert!(repo.head().is_err());
    }

    #[test]
    fn test_commit_requires_bound_repository() {
        let data_root = tempdir().unwrap();
        let session = GitSession::with_data_root(data_root.path().to_path_buf(), BRANCH_ALL);

        let response = dispatch(&session, &msg(commit_message()));
        assert_eq!(response.status, ErrorKind::RepositoryNotOpen.code());
    }

    #[test]
    fn test_commit_advances_history() {
        let (_data, _repo_dir, session) = bound_session();

        let first = dispatch(&session, &msg(commit_message()));
        assert_eq!(first.status, 0, "error: {:?}", first.error);

        let second = dispatch(&session, &msg(commit_message()));
        assert_eq!(second.status, 0);

        let slot = session.repo();
        let repo = slot.as_ref().unwrap();
        let head = repo.head().unwrap().peel_to_commit().unwrap();
        assert_eq!(head.parent_count(), 1);
        assert_eq!(head.author().name(), Some("Test User"));
        assert_eq!(head.message(), Some("update"));
    }
}
