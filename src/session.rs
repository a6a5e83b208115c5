//! Session controller owning the repository handle
//!
//! A `GitSession` is the single owner of an opened repository. Commands
//! borrow the handle through `repo()`, which hands out the mutex guard.
//! At most one command can hold it during execution, which is the
//! single-writer rule the underlying libgit2 state requires.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use git2::Repository;
use once_cell::sync::Lazy;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use ts_rs::TS;
use uuid::Uuid;

use crate::config::GatewayConfig;
use crate::utils::paths;

/// Host-facing session summary
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SessionInfo {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub repository_bound: bool,
}

/// A host session: the owner of the repository handle and the sandbox root
pub struct GitSession {
    id: String,
    created_at: DateTime<Utc>,
    data_root: PathBuf,
    default_branch_flags: u32,
    repo: Mutex<Option<Repository>>,
}

impl GitSession {
    /// Create a session from the gateway configuration.
    /// The data root falls back to the environment/home default when the
    /// config does not override it.
    pub fn new(config: &GatewayConfig) -> Result<Self, String> {
        let data_root = match &config.data_root {
            Some(path) => path.clone(),
            None => paths::get_data_root()?,
        };
        Ok(Self::with_data_root(data_root, config.default_branch_flags))
    }

    /// Create a session rooted at an explicit data directory
    pub fn with_data_root(data_root: PathBuf, default_branch_flags: u32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            data_root,
            default_branch_flags,
            repo: Mutex::new(None),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Root directory for this session's filesystem mounts
    pub fn mounts_root(&self) -> PathBuf {
        paths::mounts_dir(&self.data_root)
    }

    pub fn default_branch_flags(&self) -> u32 {
        self.default_branch_flags
    }

    /// Exclusive access to the repository slot.
    /// The guard is the lease: it must be held for the whole execution of a
    /// command that reads or writes the repository.
    pub fn repo(&self) -> MutexGuard<'_, Option<Repository>> {
        self.repo.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn is_bound(&self) -> bool {
        self.repo().is_some()
    }

    pub fn info(&self) -> SessionInfo {
        SessionInfo {
            id: self.id.clone(),
            created_at: self.created_at,
            repository_bound: self.is_bound(),
        }
    }
}

// =============================================================================
// Session Registry
// =============================================================================

static SESSIONS: Lazy<DashMap<String, Arc<GitSession>>> = Lazy::new(DashMap::new);

/// Create a session and register it under its id
pub fn create_session(config: &GatewayConfig) -> Result<Arc<GitSession>, String> {
    let session = Arc::new(GitSession::new(config)?);
    SESSIONS.insert(session.id().to_string(), Arc::clone(&session));
    tracing::info!(session = %session.id(), "session created");
    Ok(session)
}

/// Look up a registered session by id
pub fn get_session(id: &str) -> Option<Arc<GitSession>> {
    SESSIONS.get(id).map(|entry| Arc::clone(entry.value()))
}

/// Summaries of every registered session
pub fn list_sessions() -> Vec<SessionInfo> {
    SESSIONS.iter().map(|entry| entry.value().info()).collect()
}

/// Remove a session from the registry. Returns whether it existed.
/// The session itself (and any bound repository) is dropped with the last Arc.
pub fn remove_session(id: &str) -> bool {
    let removed = SESSIONS.remove(id).is_some();
    if removed {
        tracing::info!(session = %id, "session removed");
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_new_session_is_unbound() {
        let dir = tempdir().unwrap();
        let session = GitSession::with_data_root(dir.path().to_path_buf(), 3);
        assert!(!session.is_bound());
        assert!(session.repo().is_none());
    }

    #[test]
    fn test_binding_a_repository() {
        let dir = tempdir().unwrap();
        let session = GitSession::with_data_root(dir.path().to_path_buf(), 3);

        let repo_dir = tempdir().unwrap();
        let repo = Repository::init(repo_dir.path()).unwrap();
        *session.repo() = Some(repo);

        assert!(session.is_bound());
        assert!(session.info().repository_bound);
    }

    #[test]
    fn test_mounts_root_is_under_data_root() {
        let dir = tempdir().unwrap();
        let session = GitSession::with_data_root(dir.path().to_path_buf(), 3);
        assert_eq!(session.mounts_root(), dir.path().join("mounts"));
    }

    #[test]
    fn test_registry_roundtrip() {
        let dir = tempdir().unwrap();
        let config = GatewayConfig {
            data_root: Some(dir.path().to_path_buf()),
            ..GatewayConfig::default()
        };

        let session = create_session(&config).unwrap();
        let id = session.id().to_string();

        let found = get_session(&id).expect("session should be registered");
        assert_eq!(found.id(), id);
        assert!(list_sessions().iter().any(|info| info.id == id));

        assert!(remove_session(&id));
        assert!(get_session(&id).is_none());
        assert!(!remove_session(&id));
    }
}
