//! Realized state of a provisioned resource

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// State of a resource as reported by the control plane after provisioning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceState {
    /// Provider-specific resource ID
    pub id: String,

    /// Resource name
    pub name: String,

    /// Region the resource lives in
    pub location: String,

    /// Current provisioning status
    pub status: ResourceStatus,

    /// Fully qualified API server address, once known
    pub fqdn: Option<String>,

    /// Kubernetes version running on the control plane
    pub kubernetes_version: Option<String>,

    /// Additional attributes (node resource group, power state, etc.)
    pub attributes: HashMap<String, serde_json::Value>,

    /// When this state was observed
    pub observed_at: DateTime<Utc>,
}

impl ResourceState {
    pub fn new(id: impl Into<String>, name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            location: location.into(),
            status: ResourceStatus::Unknown,
            fqdn: None,
            kubernetes_version: None,
            attributes: HashMap::new(),
            observed_at: Utc::now(),
        }
    }

    pub fn with_status(mut self, status: ResourceStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_fqdn(mut self, fqdn: impl Into<String>) -> Self {
        self.fqdn = Some(fqdn.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    pub fn get_attribute<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.attributes
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}

/// Provisioning status of a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceStatus {
    /// Resource is being created
    Creating,
    /// Resource is being updated
    Updating,
    /// Provisioning completed
    Succeeded,
    /// Provisioning failed
    Failed,
    /// Provisioning was canceled server-side
    Canceled,
    /// Resource is being deleted
    Deleting,
    /// Status is unknown
    Unknown,
}

impl ResourceStatus {
    /// Map an ARM `provisioningState` string
    pub fn from_provisioning_state(state: &str) -> Self {
        match state.to_ascii_lowercase().as_str() {
            "creating" => ResourceStatus::Creating,
            "updating" | "upgrading" | "scaling" => ResourceStatus::Updating,
            "succeeded" => ResourceStatus::Succeeded,
            "failed" => ResourceStatus::Failed,
            "canceled" | "cancelled" => ResourceStatus::Canceled,
            "deleting" => ResourceStatus::Deleting,
            _ => ResourceStatus::Unknown,
        }
    }

    /// Whether no further transition is expected
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ResourceStatus::Succeeded | ResourceStatus::Failed | ResourceStatus::Canceled
        )
    }
}

impl std::fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceStatus::Creating => write!(f, "creating"),
            ResourceStatus::Updating => write!(f, "updating"),
            ResourceStatus::Succeeded => write!(f, "succeeded"),
            ResourceStatus::Failed => write!(f, "failed"),
            ResourceStatus::Canceled => write!(f, "canceled"),
            ResourceStatus::Deleting => write!(f, "deleting"),
            ResourceStatus::Unknown => write!(f, "unknown"),
        }
    }
}
