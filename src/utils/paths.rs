use std::env;
use std::path::{Path, PathBuf};

// =============================================================================
// Core Path Functions
// =============================================================================

/// Get user home directory from $HOME environment variable
/// NEVER use "~" as Rust's std::fs and Command do not expand it
pub fn get_home_dir() -> Result<PathBuf, String> {
    env::var("HOME")
        .map(PathBuf::from)
        .map_err(|_| "HOME environment variable not set".to_string())
}

/// Get gitport data root directory for sandboxed repository storage
/// Priority:
/// 1. GITPORT_DATA_ROOT environment variable
/// 2. Default to ~/.gitport
pub fn get_data_root() -> Result<PathBuf, String> {
    // Priority 1: Check GITPORT_DATA_ROOT environment variable
    if let Ok(data_root) = env::var("GITPORT_DATA_ROOT") {
        let path = PathBuf::from(&data_root);
        if path.exists() {
            return Ok(path);
        }
        // Create if doesn't exist (first run with new var)
        std::fs::create_dir_all(&path)
            .map_err(|e| format!("Failed to create GITPORT_DATA_ROOT: {}", e))?;
        return Ok(path);
    }

    // Priority 2: Default to ~/.gitport
    let default_path = get_home_dir()?.join(".gitport");
    if !default_path.exists() {
        std::fs::create_dir_all(&default_path)
            .map_err(|e| format!("Failed to create ~/.gitport: {}", e))?;
    }
    Ok(default_path)
}

// =============================================================================
// Derived Directories
// =============================================================================

/// Get mounts directory (sandboxed filesystem areas resolved by clone)
/// Returns: <data_root>/mounts
pub fn mounts_dir(data_root: &Path) -> PathBuf {
    data_root.join("mounts")
}

/// Get config directory
/// Returns: <data_root>/config
pub fn config_dir(data_root: &Path) -> PathBuf {
    data_root.join("config")
}

/// Get main config file path
/// Returns: <data_root>/config/gitport.yaml
pub fn config_file_path(data_root: &Path) -> PathBuf {
    config_dir(data_root).join("gitport.yaml")
}

// =============================================================================
// Tests
// =============================================================================
