pub mod error;

pub use error::*;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable pointing directly at a config file
pub const CONFIG_PATH_ENV: &str = "AKSUP_CONFIG_PATH";

const CANDIDATES: [&str; 3] = ["aksup.local.yaml", "aksup.yaml", ".aksup.yaml"];

/// Parameters of the cluster to provision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProvisionConfig {
    pub resource_group: String,
    pub cluster_name: String,
    pub location: String,

    /// Defaults to the cluster name
    pub dns_prefix: Option<String>,

    pub node_pool: NodePoolConfig,
    pub kubernetes_version: Option<String>,
    pub tags: BTreeMap<String, String>,
    pub poll_interval_secs: u64,
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            resource_group: "akstest".to_string(),
            cluster_name: "akstest".to_string(),
            location: "eastus".to_string(),
            dns_prefix: None,
            node_pool: NodePoolConfig::default(),
            kubernetes_version: None,
            tags: BTreeMap::new(),
            poll_interval_secs: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NodePoolConfig {
    pub name: String,
    pub count: u32,
    pub vm_size: String,

    /// `System` or `User`
    pub mode: String,

    /// Name of a public IP prefix in the cluster's resource group.
    /// When set, every node gets a public IP from it.
    pub public_ip_prefix: Option<String>,
}

impl Default for NodePoolConfig {
    fn default() -> Self {
        Self {
            name: "pool".to_string(),
            count: 1,
            vm_size: "Standard_D2s_v3".to_string(),
            mode: "System".to_string(),
            public_ip_prefix: None,
        }
    }
}

impl ProvisionConfig {
    /// Parse a YAML config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config: ProvisionConfig =
            serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load the discovered config file, or defaults when there is none
    pub fn discover() -> Result<Self> {
        match find_config_file()? {
            Some(path) => Self::load(path),
            None => {
                tracing::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn dns_prefix(&self) -> &str {
        self.dns_prefix.as_deref().unwrap_or(&self.cluster_name)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Check values the control plane would reject anyway
    pub fn validate(&self) -> Result<()> {
        non_empty("resource_group", &self.resource_group)?;
        non_empty("cluster_name", &self.cluster_name)?;
        non_empty("location", &self.location)?;
        non_empty("dns_prefix", self.dns_prefix())?;
        non_empty("node_pool.name", &self.node_pool.name)?;
        non_empty("node_pool.vm_size", &self.node_pool.vm_size)?;

        if self.node_pool.count == 0 {
            return Err(ConfigError::Invalid {
                field: "node_pool.count",
                reason: "must be at least 1".to_string(),
            });
        }

        if !matches!(
            self.node_pool.mode.to_ascii_lowercase().as_str(),
            "system" | "user"
        ) {
            return Err(ConfigError::Invalid {
                field: "node_pool.mode",
                reason: format!("expected System or User, got {}", self.node_pool.mode),
            });
        }

        if let Some(prefix) = &self.node_pool.public_ip_prefix {
            non_empty("node_pool.public_ip_prefix", prefix)?;
        }

        if self.poll_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "poll_interval_secs",
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}

fn non_empty(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ConfigError::Invalid {
            field,
            reason: "must not be empty".to_string(),
        });
    }
    Ok(())
}

/// aksup's config directory (`~/.config/aksup`)
pub fn get_config_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join("aksup"))
}

/// Locate the config file.
///
/// Search order:
/// 1. `AKSUP_CONFIG_PATH` (must exist when set)
/// 2. current directory: aksup.local.yaml, aksup.yaml, .aksup.yaml
/// 3. ~/.config/aksup/aksup.yaml
///
/// Returns `Ok(None)` when nothing is found; callers fall back to defaults.
pub fn find_config_file() -> Result<Option<PathBuf>> {
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(Some(path));
        }
        return Err(ConfigError::ConfigFileNotFound(path));
    }

    let current_dir = std::env::current_dir()?;
    for filename in &CANDIDATES {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(Some(path));
        }
    }

    if let Ok(config_dir) = get_config_dir() {
        let global_config = config_dir.join("aksup.yaml");
        if global_config.exists() {
            return Ok(Some(global_config));
        }
    }

    Ok(None)
}
