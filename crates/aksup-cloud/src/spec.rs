//! Desired-state description of a managed cluster

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Immutable description of the cluster to provision.
///
/// Built once by the driver and handed to [`ControlPlane::create_or_update`].
/// Fields are private; use [`ResourceSpecBuilder`] to construct one.
///
/// [`ControlPlane::create_or_update`]: crate::ControlPlane::create_or_update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceSpec {
    location: String,
    dns_prefix: String,
    agent_pools: Vec<AgentPoolProfile>,
    service_principal: Option<ServicePrincipal>,
    kubernetes_version: Option<String>,
    tags: BTreeMap<String, String>,
}

impl ResourceSpec {
    pub fn builder(location: impl Into<String>, dns_prefix: impl Into<String>) -> ResourceSpecBuilder {
        ResourceSpecBuilder {
            spec: ResourceSpec {
                location: location.into(),
                dns_prefix: dns_prefix.into(),
                agent_pools: Vec::new(),
                service_principal: None,
                kubernetes_version: None,
                tags: BTreeMap::new(),
            },
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn dns_prefix(&self) -> &str {
        &self.dns_prefix
    }

    pub fn agent_pools(&self) -> &[AgentPoolProfile] {
        &self.agent_pools
    }

    pub fn service_principal(&self) -> Option<&ServicePrincipal> {
        self.service_principal.as_ref()
    }

    pub fn kubernetes_version(&self) -> Option<&str> {
        self.kubernetes_version.as_deref()
    }

    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    /// Total node count across all pools
    pub fn node_count(&self) -> u32 {
        self.agent_pools.iter().map(|p| p.count).sum()
    }
}

/// Builder for [`ResourceSpec`]
#[derive(Debug, Clone)]
pub struct ResourceSpecBuilder {
    spec: ResourceSpec,
}

impl ResourceSpecBuilder {
    pub fn agent_pool(mut self, pool: AgentPoolProfile) -> Self {
        self.spec.agent_pools.push(pool);
        self
    }

    pub fn service_principal(mut self, principal: ServicePrincipal) -> Self {
        self.spec.service_principal = Some(principal);
        self
    }

    pub fn kubernetes_version(mut self, version: impl Into<String>) -> Self {
        self.spec.kubernetes_version = Some(version.into());
        self
    }

    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.spec.tags.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> ResourceSpec {
        self.spec
    }
}

/// Node pool sizing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentPoolProfile {
    pub name: String,
    pub count: u32,
    pub vm_size: String,
    pub mode: AgentPoolMode,

    /// Full resource id of a public IP prefix; enables per-node public IPs
    pub node_public_ip_prefix_id: Option<String>,
}

impl AgentPoolProfile {
    pub fn new(name: impl Into<String>, count: u32, vm_size: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            count,
            vm_size: vm_size.into(),
            mode: AgentPoolMode::System,
            node_public_ip_prefix_id: None,
        }
    }

    pub fn with_mode(mut self, mode: AgentPoolMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_public_ip_prefix(mut self, prefix_id: impl Into<String>) -> Self {
        self.node_public_ip_prefix_id = Some(prefix_id.into());
        self
    }

    pub fn enable_node_public_ip(&self) -> bool {
        self.node_public_ip_prefix_id.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentPoolMode {
    System,
    User,
}

impl std::fmt::Display for AgentPoolMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentPoolMode::System => write!(f, "System"),
            AgentPoolMode::User => write!(f, "User"),
        }
    }
}

impl std::str::FromStr for AgentPoolMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "system" => Ok(AgentPoolMode::System),
            "user" => Ok(AgentPoolMode::User),
            other => Err(format!("unknown agent pool mode: {}", other)),
        }
    }
}

/// Identity the cluster uses to manage Azure resources
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct ServicePrincipal {
    pub client_id: String,
    pub secret: String,
}

impl std::fmt::Debug for ServicePrincipal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServicePrincipal")
            .field("client_id", &self.client_id)
            .field("secret", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_collects_pools_and_tags() {
        let spec = ResourceSpec::builder("eastus", "akstest")
            .agent_pool(AgentPoolProfile::new("pool", 1, "Standard_D2s_v3"))
            .agent_pool(AgentPoolProfile::new("user", 3, "Standard_D4s_v3").with_mode(AgentPoolMode::User))
            .tag("env", "dev")
            .build();

        assert_eq!(spec.location(), "eastus");
        assert_eq!(spec.agent_pools().len(), 2);
        assert_eq!(spec.node_count(), 4);
        assert_eq!(spec.tags().get("env").map(String::as_str), Some("dev"));
        assert!(spec.service_principal().is_none());
    }

    #[test]
    fn test_public_ip_prefix_enables_node_ip() {
        let pool = AgentPoolProfile::new("pool", 1, "Standard_D2s_v3");
        assert!(!pool.enable_node_public_ip());
        let pool = pool.with_public_ip_prefix("subscriptions/x/prefix");
        assert!(pool.enable_node_public_ip());
    }

    #[test]
    fn test_service_principal_debug_redacts_secret() {
        let sp = ServicePrincipal {
            client_id: "client".to_string(),
            secret: "hunter2".to_string(),
        };
        let debug = format!("{:?}", sp);
        assert!(debug.contains("client"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_agent_pool_mode_parse() {
        assert_eq!("system".parse::<AgentPoolMode>().unwrap(), AgentPoolMode::System);
        assert_eq!("User".parse::<AgentPoolMode>().unwrap(), AgentPoolMode::User);
        assert!("spot".parse::<AgentPoolMode>().is_err());
    }
}
