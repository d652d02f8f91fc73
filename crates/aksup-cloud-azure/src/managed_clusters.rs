//! Azure Resource Manager client for managed clusters
//!
//! Direct ARM REST implementation. Each method issues exactly one request;
//! nothing is retried.

use crate::error::{AzureError, Result};
use crate::models::{ArmErrorResponse, AsyncOperationStatus, ManagedCluster};
use aksup_cloud::Credentials;
use reqwest::StatusCode;
use reqwest::header::HeaderMap;

pub const API_VERSION: &str = "2022-03-01";

const HEADER_ASYNC_OPERATION: &str = "Azure-AsyncOperation";
const HEADER_LOCATION: &str = "Location";

/// URLs describing one in-flight create-or-update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingOperation {
    /// The managed cluster resource, including api-version
    pub resource_url: String,

    /// Status monitor from the `Azure-AsyncOperation` header
    pub async_operation_url: Option<String>,

    /// Status monitor from the `Location` header
    pub location_url: Option<String>,

    /// Provisioning state echoed in the initial response body
    pub initial_state: Option<String>,
}

impl PendingOperation {
    /// Stable identifier for logs: the async operation id when present
    pub fn operation_id(&self) -> String {
        self.async_operation_url
            .as_deref()
            .or(self.location_url.as_deref())
            .and_then(|url| url.split('?').next())
            .and_then(|path| path.rsplit('/').next())
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.resource_url.clone())
    }
}

/// Result of reading a `Location` monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationStatus {
    InProgress,
    Done,
}

/// Managed clusters API for one subscription
pub struct ManagedClustersClient {
    client: reqwest::Client,
    endpoint: String,
    subscription_id: String,
    credentials: Credentials,
}

impl ManagedClustersClient {
    pub fn new(
        endpoint: impl Into<String>,
        subscription_id: impl Into<String>,
        credentials: Credentials,
    ) -> Self {
        Self {
            client: crate::http_client(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            subscription_id: subscription_id.into(),
            credentials,
        }
    }

    pub fn subscription_id(&self) -> &str {
        &self.subscription_id
    }

    /// Resource URL of a managed cluster, with api-version
    pub fn cluster_url(&self, resource_group: &str, name: &str) -> String {
        format!(
            "{}/subscriptions/{}/resourceGroups/{}/providers/Microsoft.ContainerService/managedClusters/{}?api-version={}",
            self.endpoint, self.subscription_id, resource_group, name, API_VERSION
        )
    }

    /// Resource id of a public IP prefix in this subscription
    pub fn public_ip_prefix_id(&self, resource_group: &str, prefix: &str) -> String {
        public_ip_prefix_id(&self.subscription_id, resource_group, prefix)
    }

    /// PUT the managed cluster and capture the operation monitors
    pub async fn create_or_update(
        &self,
        resource_group: &str,
        name: &str,
        cluster: &ManagedCluster,
    ) -> Result<PendingOperation> {
        let url = self.cluster_url(resource_group, name);
        tracing::debug!("PUT {}", url);

        let response = self
            .client
            .put(&url)
            .bearer_auth(self.credentials.access_token())
            .json(cluster)
            .send()
            .await?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(api_error(status, &body));
        }

        let initial_state = serde_json::from_str::<ManagedCluster>(&body)
            .ok()
            .and_then(|c| c.properties.provisioning_state);

        let pending = PendingOperation {
            resource_url: url,
            async_operation_url: header_value(&headers, HEADER_ASYNC_OPERATION),
            location_url: header_value(&headers, HEADER_LOCATION),
            initial_state,
        };

        tracing::debug!(
            "create accepted with HTTP {} (operation {})",
            status.as_u16(),
            pending.operation_id()
        );
        Ok(pending)
    }

    /// GET an `Azure-AsyncOperation` monitor
    pub async fn get_async_operation(&self, url: &str) -> Result<AsyncOperationStatus> {
        tracing::debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .bearer_auth(self.credentials.access_token())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(api_error(status, &body));
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// GET a `Location` monitor: 202 means still running
    pub async fn get_location(&self, url: &str) -> Result<LocationStatus> {
        tracing::debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .bearer_auth(self.credentials.access_token())
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::ACCEPTED {
            return Ok(LocationStatus::InProgress);
        }
        if status.is_success() {
            return Ok(LocationStatus::Done);
        }

        let body = response.text().await?;
        Err(api_error(status, &body))
    }

    /// GET the managed cluster resource
    pub async fn get(&self, resource_url: &str) -> Result<ManagedCluster> {
        tracing::debug!("GET {}", resource_url);
        let response = self
            .client
            .get(resource_url)
            .bearer_auth(self.credentials.access_token())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(api_error(status, &body));
        }

        Ok(serde_json::from_str(&body)?)
    }
}

/// `subscriptions/{sub}/resourceGroups/{rg}/providers/Microsoft.Network/publicipprefixes/{prefix}`
pub fn public_ip_prefix_id(subscription_id: &str, resource_group: &str, prefix: &str) -> String {
    format!(
        "subscriptions/{}/resourceGroups/{}/providers/Microsoft.Network/publicipprefixes/{}",
        subscription_id, resource_group, prefix
    )
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .filter(|v| !v.is_empty())
}

fn api_error(status: StatusCode, body: &str) -> AzureError {
    match serde_json::from_str::<ArmErrorResponse>(body) {
        Ok(response) => AzureError::Api {
            status: status.as_u16(),
            code: response.error.code,
            message: response.error.message,
        },
        Err(_) => AzureError::Api {
            status: status.as_u16(),
            code: status
                .canonical_reason()
                .unwrap_or("UnknownError")
                .to_string(),
            message: body.trim().to_string(),
        },
    }
}
