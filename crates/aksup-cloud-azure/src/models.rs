//! ARM wire types for managed clusters (api-version 2022-03-01)

use aksup_cloud::{ResourceSpec, ResourceState, ResourceStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedCluster {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub location: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,

    #[serde(default)]
    pub properties: ManagedClusterProperties,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedClusterProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power_state: Option<PowerState>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubernetes_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns_prefix: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fqdn: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_resource_group: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub agent_pool_profiles: Vec<AgentPoolProfile>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_principal_profile: Option<ServicePrincipalProfile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentPoolProfile {
    pub name: String,
    pub count: u32,
    pub vm_size: String,
    pub mode: String,

    #[serde(
        rename = "enableNodePublicIP",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub enable_node_public_ip: Option<bool>,

    #[serde(
        rename = "nodePublicIPPrefixID",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub node_public_ip_prefix_id: Option<String>,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePrincipalProfile {
    pub client_id: String,

    /// ARM never echoes the secret back
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
}

impl std::fmt::Debug for ServicePrincipalProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServicePrincipalProfile")
            .field("client_id", &self.client_id)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerState {
    pub code: String,
}

impl ManagedCluster {
    /// Request body for a create-or-update call
    pub fn from_spec(spec: &ResourceSpec) -> Self {
        let agent_pool_profiles = spec
            .agent_pools()
            .iter()
            .map(|pool| AgentPoolProfile {
                name: pool.name.clone(),
                count: pool.count,
                vm_size: pool.vm_size.clone(),
                mode: pool.mode.to_string(),
                enable_node_public_ip: pool.enable_node_public_ip().then_some(true),
                node_public_ip_prefix_id: pool.node_public_ip_prefix_id.clone(),
            })
            .collect();

        Self {
            id: None,
            name: None,
            location: spec.location().to_string(),
            tags: spec.tags().clone(),
            properties: ManagedClusterProperties {
                kubernetes_version: spec.kubernetes_version().map(str::to_string),
                dns_prefix: Some(spec.dns_prefix().to_string()),
                agent_pool_profiles,
                service_principal_profile: spec.service_principal().map(|sp| {
                    ServicePrincipalProfile {
                        client_id: sp.client_id.clone(),
                        secret: Some(sp.secret.clone()),
                    }
                }),
                ..Default::default()
            },
        }
    }

    /// Copy with the service principal secret removed, for display
    pub fn redacted(&self) -> Self {
        let mut cluster = self.clone();
        if let Some(sp) = cluster.properties.service_principal_profile.as_mut() {
            sp.secret = sp.secret.as_ref().map(|_| "<redacted>".to_string());
        }
        cluster
    }

    pub fn status(&self) -> ResourceStatus {
        self.properties
            .provisioning_state
            .as_deref()
            .map(ResourceStatus::from_provisioning_state)
            .unwrap_or(ResourceStatus::Unknown)
    }

    pub fn into_resource_state(self, fallback_name: &str) -> ResourceState {
        let status = self.status();
        let props = self.properties;
        let mut state = ResourceState::new(
            self.id.unwrap_or_default(),
            self.name.unwrap_or_else(|| fallback_name.to_string()),
            self.location,
        )
        .with_status(status);

        state.kubernetes_version = props.kubernetes_version;
        if let Some(fqdn) = props.fqdn {
            state = state.with_fqdn(fqdn);
        }
        if let Some(rg) = props.node_resource_group {
            state = state.with_attribute("node_resource_group", serde_json::json!(rg));
        }
        if let Some(power) = props.power_state {
            state = state.with_attribute("power_state", serde_json::json!(power.code));
        }
        let nodes: u32 = props.agent_pool_profiles.iter().map(|p| p.count).sum();
        state.with_attribute("node_count", serde_json::json!(nodes))
    }
}

/// Body of an `Azure-AsyncOperation` status resource
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AsyncOperationStatus {
    #[serde(default)]
    pub name: Option<String>,
    pub status: String,
    #[serde(default)]
    pub error: Option<ArmError>,
}

impl AsyncOperationStatus {
    pub fn is_in_progress(&self) -> bool {
        !matches!(
            self.status.to_ascii_lowercase().as_str(),
            "succeeded" | "failed" | "canceled" | "cancelled"
        )
    }

    pub fn is_succeeded(&self) -> bool {
        self.status.eq_ignore_ascii_case("succeeded")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArmErrorResponse {
    pub error: ArmError,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArmError {
    pub code: String,
    #[serde(default)]
    pub message: String,
}
