use aksup_config::ProvisionConfig;
use clap::Args;
use std::path::PathBuf;

/// Cluster parameters shared by `create` and `plan`.
/// Flags override values from the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct ProvisionArgs {
    /// Config file (default: aksup.yaml discovery)
    #[arg(short = 'c', long = "config", env = "AKSUP_CONFIG_PATH")]
    pub config: Option<PathBuf>,

    /// Resource group to create the cluster in
    #[arg(short = 'g', long, env = "AKSUP_RESOURCE_GROUP")]
    pub resource_group: Option<String>,

    /// Cluster name
    #[arg(short = 'n', long = "name", env = "AKSUP_CLUSTER_NAME")]
    pub cluster_name: Option<String>,

    /// Azure region
    #[arg(short = 'l', long, env = "AKSUP_LOCATION")]
    pub location: Option<String>,

    /// DNS prefix (defaults to the cluster name)
    #[arg(long)]
    pub dns_prefix: Option<String>,

    /// Number of nodes in the pool
    #[arg(long, env = "AKSUP_NODE_COUNT")]
    pub node_count: Option<u32>,

    /// VM size of the nodes
    #[arg(long, env = "AKSUP_VM_SIZE")]
    pub vm_size: Option<String>,

    /// Node pool name
    #[arg(long)]
    pub pool_name: Option<String>,

    /// Public IP prefix name; enables node public IPs
    #[arg(long)]
    pub public_ip_prefix: Option<String>,

    /// Kubernetes version
    #[arg(long)]
    pub kubernetes_version: Option<String>,

    /// Seconds between status polls
    #[arg(long)]
    pub poll_interval: Option<u64>,
}

impl ProvisionArgs {
    /// Load the config file (explicit path or discovery) and apply flags
    pub fn resolve(&self) -> anyhow::Result<ProvisionConfig> {
        let config = match &self.config {
            Some(path) => ProvisionConfig::load(path)?,
            None => ProvisionConfig::discover()?,
        };
        let config = self.apply(config);
        config.validate()?;
        Ok(config)
    }

    pub fn apply(&self, mut config: ProvisionConfig) -> ProvisionConfig {
        if let Some(v) = &self.resource_group {
            config.resource_group = v.clone();
        }
        if let Some(v) = &self.cluster_name {
            config.cluster_name = v.clone();
        }
        if let Some(v) = &self.location {
            config.location = v.clone();
        }
        if let Some(v) = &self.dns_prefix {
            config.dns_prefix = Some(v.clone());
        }
        if let Some(v) = self.node_count {
            config.node_pool.count = v;
        }
        if let Some(v) = &self.vm_size {
            config.node_pool.vm_size = v.clone();
        }
        if let Some(v) = &self.pool_name {
            config.node_pool.name = v.clone();
        }
        if let Some(v) = &self.public_ip_prefix {
            config.node_pool.public_ip_prefix = Some(v.clone());
        }
        if let Some(v) = &self.kubernetes_version {
            config.kubernetes_version = Some(v.clone());
        }
        if let Some(v) = self.poll_interval {
            config.poll_interval_secs = v;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let args = ProvisionArgs {
            cluster_name: Some("prod".to_string()),
            node_count: Some(3),
            public_ip_prefix: Some("prefix".to_string()),
            ..Default::default()
        };

        let config = args.apply(ProvisionConfig::default());
        assert_eq!(config.cluster_name, "prod");
        assert_eq!(config.dns_prefix(), "prod");
        assert_eq!(config.node_pool.count, 3);
        assert_eq!(config.node_pool.public_ip_prefix.as_deref(), Some("prefix"));
        assert_eq!(config.resource_group, "akstest");
        assert_eq!(config.location, "eastus");
    }

    #[test]
    fn test_resolve_explicit_config_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("cluster.yaml");
        std::fs::write(&path, "location: japaneast\nnode_pool:\n  count: 2\n").unwrap();

        let args = ProvisionArgs {
            config: Some(path),
            node_count: Some(4),
            ..Default::default()
        };
        let config = args.resolve().unwrap();
        assert_eq!(config.location, "japaneast");
        assert_eq!(config.node_pool.count, 4);
    }

    #[test]
    fn test_resolve_rejects_invalid_flags() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("cluster.yaml");
        std::fs::write(&path, "{}\n").unwrap();

        let args = ProvisionArgs {
            config: Some(path),
            node_count: Some(0),
            ..Default::default()
        };
        assert!(args.resolve().is_err());
    }
}
