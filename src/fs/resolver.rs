use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::constants::RE_RESOURCE_NAME;
use crate::error::CommandError;
use crate::message::Message;

/// A named sandbox area bound to a local mount point
#[derive(Debug, Clone)]
pub struct MountedFilesystem {
    name: String,
    root: PathBuf,
}

/// Resolve the filesystem resource named by `field` in the message and bind
/// it to a local mount point under `mounts_root`.
///
/// Must succeed before any libgit2 call that performs disk I/O. Resolution
/// failure is terminal for the command; no retry is attempted here.
pub fn resolve(
    message: &Message,
    field: &str,
    mounts_root: &Path,
) -> Result<MountedFilesystem, CommandError> {
    let name = message.get_str(field)?;
    mount(&name, mounts_root)
}

/// Bind a resource name to its mount point, creating the directory lazily
pub fn mount(name: &str, mounts_root: &Path) -> Result<MountedFilesystem, CommandError> {
    if !RE_RESOURCE_NAME.is_match(name) {
        return Err(CommandError::invalid_argument(format!(
            "Invalid filesystem resource name: '{}'",
            name
        )));
    }

    let root = mounts_root.join(name);
    fs::create_dir_all(&root)
        .map_err(|e| CommandError::filesystem(format!("Failed to create mount point: {}", e)))?;

    // Canonicalize so later containment checks compare resolved paths
    let root = root
        .canonicalize()
        .map_err(|e| CommandError::filesystem(format!("Failed to resolve mount point: {}", e)))?;

    tracing::debug!(resource = %name, root = %root.display(), "resolved filesystem resource");

    Ok(MountedFilesystem {
        name: name.to_string(),
        root,
    })
}

impl MountedFilesystem {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a host-supplied path to a location inside the mount.
    ///
    /// The leaf may not exist yet (clone targets must not), so the check is
    /// lexical: leading slashes are treated as mount-relative and any parent
    /// component is rejected outright.
    pub fn target_path(&self, full_path: &str) -> Result<PathBuf, CommandError> {
        let relative = full_path.trim_start_matches('/');
        if relative.is_empty() {
            return Err(CommandError::invalid_argument(
                "Target path inside the mount must not be empty",
            ));
        }

        let relative = Path::new(relative);
        if relative
            .components()
            .any(|c| matches!(c, Component::ParentDir))
        {
            return Err(CommandError::invalid_argument(format!(
                "Security violation: Path traversal detected in '{}'",
                full_path
            )));
        }

        Ok(self.root.join(relative))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_mount_creates_directory_lazily() {
        let dir = tempdir().unwrap();
        let mounts_root = dir.path().join("mounts");
        assert!(!mounts_root.exists());

        let mount = mount("fsA", &mounts_root).unwrap();
        assert!(mount.root().is_dir());
        assert_eq!(mount.name(), "fsA");
        assert!(mount.root().ends_with("mounts/fsA"));
    }

    #[test]
    fn test_mount_rejects_path_like_names() {
        let dir = tempdir().unwrap();
        for bad in ["../escape", "a/b", "", ".hidden"] {
            let err = mount(bad, dir.path()).unwrap_err();
            assert_eq!(err.kind, ErrorKind::InvalidArgument, "name: {:?}", bad);
        }
    }

    #[test]
    fn test_resolve_reads_resource_field() {
        let dir = tempdir().unwrap();
        let msg = Message::from_value(json!({"resource": "fsA"})).unwrap();
        let mount = resolve(&msg, "resource", dir.path()).unwrap();
        assert_eq!(mount.name(), "fsA");
    }

    #[test]
    fn test_resolve_missing_field() {
        let dir = tempdir().unwrap();
        let msg = Message::from_value(json!({})).unwrap();
        let err = resolve(&msg, "resource", dir.path()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingField);
    }

    #[test]
    fn test_target_path_is_mount_relative() {
        let dir = tempdir().unwrap();
        let mount = mount("fsA", dir.path()).unwrap();

        let target = mount.target_path("/repo").unwrap();
        assert_eq!(target, mount.root().join("repo"));

        let nested = mount.target_path("work/repo").unwrap();
        assert_eq!(nested, mount.root().join("work/repo"));
    }

    #[test]
    fn test_target_path_rejects_traversal() {
        let dir = tempdir().unwrap();
        let mount = mount("fsA", dir.path()).unwrap();

        for bad in ["../outside", "/repo/../../outside", "a/../../b"] {
            let err = mount.target_path(bad).unwrap_err();
            assert_eq!(err.kind, ErrorKind::InvalidArgument, "path: {:?}", bad);
        }
    }

    #[test]
    fn test_target_path_rejects_empty() {
        let dir = tempdir().unwrap();
        let mount = mount("fsA", dir.path()).unwrap();
        assert!(mount.target_path("/").is_err());
        assert!(mount.target_path("").is_err());
    }
}
