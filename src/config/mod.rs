use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::BRANCH_ALL;

/// Gateway configuration, loaded from <data_root>/config/gitport.yaml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Override for the sandbox data root (default: resolved from the
    /// GITPORT_DATA_ROOT environment variable or ~/.gitport)
    #[serde(default)]
    pub data_root: Option<PathBuf>,

    /// Branch-category bitmask used when `get-branches` omits `flags`
    #[serde(default = "default_branch_flags")]
    pub default_branch_flags: u32,
}

fn default_branch_flags() -> u32 {
    BRANCH_ALL
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            data_root: None,
            default_branch_flags: BRANCH_ALL,
        }
    }
}

impl GatewayConfig {
    /// Load configuration from a YAML file with DoS protection
    ///
    /// Security measures:
    /// - File size limit: 1MB max
    /// - YAML depth checked implicitly by serde_yaml recursion limits
    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Err(format!("Config not found: {}", path.display()));
        }

        // Check file size (1MB max) - DoS protection
        let metadata =
            fs::metadata(path).map_err(|e| format!("Failed to read file metadata: {}", e))?;

        if metadata.len() > 1_048_576 {
            return Err(format!(
                "Config too large: {} bytes (max 1MB)",
                metadata.len()
            ));
        }

        let contents =
            fs::read_to_string(path).map_err(|e| format!("Failed to read config: {}", e))?;

        let config: GatewayConfig =
            serde_yaml::from_str(&contents).map_err(|e| format!("Failed to parse YAML: {}", e))?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration, falling back to defaults on a missing or
    /// unreadable file. The failure is logged, never fatal.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Validate configuration constraints
    pub fn validate(&self) -> Result<(), String> {
        if self.default_branch_flags == 0 {
            return Err("default_branch_flags must select at least one branch category".to_string());
        }
        if self.default_branch_flags & !BRANCH_ALL != 0 {
            return Err(format!(
                "default_branch_flags has unknown bits: {:#x}",
                self.default_branch_flags
            ));
        }
        Ok(())
    }
}
