//! Native version-control layer
//!
//! Thin typed wrappers over libgit2. Everything above this module treats
//! git as a capability: clone, commit, head lookup, branch enumeration.

pub mod repository;

pub use repository::{BranchInfo, BranchKind};
