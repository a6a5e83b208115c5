//! `clone`: fetch a repository into the sandboxed filesystem and bind it
//! to the session

use super::{GitCommand, ResponsePayload};
use crate::constants::{FIELD_FULL_PATH, FIELD_RESOURCE, FIELD_URL, RE_CLONE_URL, SUBJECT_CLONE};
use crate::error::CommandError;
use crate::fs::resolver;
use crate::git::repository;
use crate::message::Message;
use crate::session::GitSession;

/// Typed arguments for clone, validated out of the raw message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneArgs {
    pub url: String,
    pub full_path: String,
    pub resource: String,
}

impl CloneArgs {
    /// Validating constructor: fails fast on the first missing or mistyped field
    pub fn from_message(message: &Message) -> Result<Self, CommandError> {
        let url = message.get_str(FIELD_URL)?;
        if !RE_CLONE_URL.is_match(&url) {
            return Err(CommandError::invalid_argument(format!(
                "Malformed clone URL: '{}'",
                url
            )));
        }

        let full_path = message.get_str(FIELD_FULL_PATH)?;
        let resource = message.get_str(FIELD_RESOURCE)?;

        Ok(Self {
            url,
            full_path,
            resource,
        })
    }
}

pub struct GitClone {
    args: Option<CloneArgs>,
}

impl GitClone {
    pub fn new() -> Self {
        Self { args: None }
    }
}

impl Default for GitClone {
    fn default() -> Self {
        Self::new()
    }
}

impl GitCommand for GitClone {
    fn subject(&self) -> &'static str {
        SUBJECT_CLONE
    }

    fn parse_args(&mut self, message: &Message) -> Result<(), CommandError> {
        self.args = Some(CloneArgs::from_message(message)?);
        Ok(())
    }

    fn run(&mut self, session: &GitSession) -> Result<Option<ResponsePayload>, CommandError> {
        let args = self
            .args
            .as_ref()
            .ok_or_else(|| CommandError::invalid_argument("clone executed before parsing"))?;

        // The filesystem resource must resolve before any disk I/O
        let mount = resolver::mount(&args.resource, &session.mounts_root())?;
        let target = mount.target_path(&args.full_path)?;

        // Hold the handle for the whole clone so no other command can race
        // the empty-to-bound transition
        let mut slot = session.repo();
        if slot.is_some() {
            return Err(CommandError::repository_already_open());
        }

        tracing::info!(url = %args.url, target = %target.display(), "cloning repository");
        let repo = repository::clone_repository(&args.url, &target)?;
        *slot = Some(repo);

        Ok(None)
    }
}
