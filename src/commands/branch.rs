//! Branch queries: `current-branch` and `get-branches`
//!
//! Both are pure reads against the bound repository handle.

use super::{GitCommand, ResponsePayload};
use crate::constants::{BRANCH_ALL, FIELD_FLAGS, SUBJECT_CURRENT_BRANCH, SUBJECT_GET_BRANCHES};
use crate::error::CommandError;
use crate::git::repository;
use crate::message::Message;
use crate::session::GitSession;

/// `current-branch`: name of the checked-out branch
pub struct GitCurrentBranch;

impl GitCurrentBranch {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GitCurrentBranch {
    fn default() -> Self {
        Self::new()
    }
}

impl GitCommand for GitCurrentBranch {
    fn subject(&self) -> &'static str {
        SUBJECT_CURRENT_BRANCH
    }

    // Inherits the no-op parse_args: nothing beyond the subject is required

    fn run(&mut self, session: &GitSession) -> Result<Option<ResponsePayload>, CommandError> {
        let slot = session.repo();
        let repo = slot.as_ref().ok_or_else(CommandError::repository_not_open)?;

        let name = repository::current_branch(repo)?;
        Ok(Some(ResponsePayload::CurrentBranch { name }))
    }
}

/// Typed arguments for get-branches: the optional category bitmask.
/// `flags: None` means the field was absent and the session default applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BranchesArgs {
    pub flags: Option<u32>,
}

impl BranchesArgs {
    pub fn from_message(message: &Message) -> Result<Self, CommandError> {
        let flags = match message.get_i64_opt(FIELD_FLAGS)? {
            None => None,
            Some(raw) => {
                let bits = u32::try_from(raw).map_err(|_| {
                    CommandError::invalid_argument(format!("Branch flags out of range: {}", raw))
                })?;
                if bits == 0 || bits & !BRANCH_ALL != 0 {
                    return Err(CommandError::invalid_argument(format!(
                        "Unknown branch flags: {:#x}",
                        bits
                    )));
                }
                Some(bits)
            }
        };
        Ok(Self { flags })
    }
}

/// `get-branches`: enumerate branch descriptors matching the category bitmask
pub struct GitGetBranches {
    args: Option<BranchesArgs>,
}

impl GitGetBranches {
    pub fn new() -> Self {
        Self { args: None }
    }
}

impl Default for GitGetBranches {
    fn default() -> Self {
        Self::new()
    }
}

impl GitCommand for GitGetBranches {
    fn subject(&self) -> &'static str {
        SUBJECT_GET_BRANCHES
    }

    fn parse_args(&mut self, message: &Message) -> Result<(), CommandError> {
        self.args = Some(BranchesArgs::from_message(message)?);
        Ok(())
    }

    fn run(&mut self, session: &GitSession) -> Result<Option<ResponsePayload>, CommandError> {
        let args = self
            .args
            .ok_or_else(|| CommandError::invalid_argument("get-branches executed before parsing"))?;

        let slot = session.repo();
        let repo = slot.as_ref().ok_or_else(CommandError::repository_not_open)?;

        let flags = args.flags.unwrap_or_else(|| session.default_branch_flags());
        let branches = repository::list_branches(repo, flags)?;

        Ok(Some(ResponsePayload::Branches { branches }))
    }
}
