use git2::build::RepoBuilder;
use git2::{BranchType, ErrorCode, Oid, Repository, Signature};
use serde::{Deserialize, Serialize};
use std::path::Path;
use ts_rs::TS;

use crate::constants::{BRANCH_ALL, BRANCH_LOCAL, BRANCH_REMOTE};
use crate::error::CommandError;

/// Descriptor for a single branch returned by `get-branches`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export, export_to = "bindings/")]
pub struct BranchInfo {
    pub name: String,
    pub kind: BranchKind,
    pub is_head: bool,
}

/// Branch category
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum BranchKind {
    Local,
    Remote,
}

impl From<BranchType> for BranchKind {
    fn from(branch_type: BranchType) -> Self {
        match branch_type {
            BranchType::Local => BranchKind::Local,
            BranchType::Remote => BranchKind::Remote,
        }
    }
}

/// Clone `url` into `target`, returning the opened repository
pub fn clone_repository(url: &str, target: &Path) -> Result<Repository, CommandError> {
    let repo = RepoBuilder::new().clone(url, target)?;
    Ok(repo)
}

/// Create a commit on HEAD from the current index state.
/// Handles the unborn-HEAD case: the first commit of a repository has no parent.
pub fn commit(
    repo: &Repository,
    author_name: &str,
    author_email: &str,
    message: &str,
) -> Result<Oid, CommandError> {
    let signature = Signature::now(author_name, author_email)?;

    let mut index = repo.index()?;
    let tree_id = index.write_tree()?;
    let tree = repo.find_tree(tree_id)?;

    let parent = match repo.head() {
        Ok(head) => Some(head.peel_to_commit()?),
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => None,
        Err(e) => return Err(e.into()),
    };
    let parents: Vec<&git2::Commit> = parent.iter().collect();

    let oid = repo.commit(
        Some("HEAD"),
        &signature,
        &signature,
        message,
        &tree,
        &parents,
    )?;
    Ok(oid)
}

/// Name of the currently checked-out branch.
/// A detached HEAD reports the abbreviated commit id, matching libgit2's shorthand.
pub fn current_branch(repo: &Repository) -> Result<String, CommandError> {
    let head = repo.head()?;
    head.shorthand()
        .map(|s| s.to_string())
        .ok_or_else(|| CommandError::git("HEAD reference name is not valid UTF-8"))
}

/// Enumerate branches matching the category bitmask.
///
/// libgit2's own enumeration order is not guaranteed stable, so the result
/// is sorted lexicographically by name, local before remote on ties.
pub fn list_branches(repo: &Repository, flags: u32) -> Result<Vec<BranchInfo>, CommandError> {
    let filter = match flags & BRANCH_ALL {
        BRANCH_LOCAL => Some(BranchType::Local),
        BRANCH_REMOTE => Some(BranchType::Remote),
        _ => None,
    };

    let mut branches = Vec::new();
    for entry in repo.branches(filter)? {
        let (branch, branch_type) = entry?;
        // Branches with non-UTF-8 names are skipped rather than failing the listing
        let name = match branch.name()? {
            Some(name) => name.to_string(),
            None => continue,
        };
        branches.push(BranchInfo {
            name,
            kind: branch_type.into(),
            is_head: branch.is_head(),
        });
    }

    branches.sort_by(|a, b| a.name.cmp(&b.name).then(a.kind.cmp(&b.kind)));
    Ok(branches)
}
