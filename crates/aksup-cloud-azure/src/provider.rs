//! Azure control plane implementation

use crate::error::AzureError;
use crate::managed_clusters::{LocationStatus, ManagedClustersClient, PendingOperation};
use crate::models::ManagedCluster;
use crate::settings::AzureSettings;
use aksup_cloud::{
    ControlPlane, Credentials, OperationFailure, OperationHandle, PollStatus, ResourceSpec,
    ResourceState, ResourceStatus,
};
use async_trait::async_trait;

/// Handle payload for an Azure create-or-update
#[derive(Debug, Clone)]
struct PendingCreate {
    operation: PendingOperation,
    name: String,
}

/// AKS managed clusters behind the [`ControlPlane`] trait
pub struct AzureControlPlane {
    clusters: ManagedClustersClient,
}

impl AzureControlPlane {
    pub fn new(settings: &AzureSettings, credentials: Credentials) -> Self {
        Self {
            clusters: ManagedClustersClient::new(
                settings.resource_manager_endpoint.clone(),
                settings.subscription_id.clone(),
                credentials,
            ),
        }
    }

    pub fn clusters(&self) -> &ManagedClustersClient {
        &self.clusters
    }

    async fn poll_async_operation(&self, url: &str) -> PollStatus {
        match self.clusters.get_async_operation(url).await {
            Ok(op) if op.is_succeeded() => PollStatus::succeeded(),
            Ok(op) if op.is_in_progress() => {
                tracing::debug!("operation status: {}", op.status);
                PollStatus::running()
            }
            Ok(op) => PollStatus::failed(
                op.error
                    .map(|e| OperationFailure::with_code(e.code, e.message))
                    .unwrap_or_else(|| OperationFailure::new(format!("operation {}", op.status))),
            ),
            Err(e) => PollStatus::query_error(failure_from(e)),
        }
    }

    async fn poll_location(&self, url: &str) -> PollStatus {
        match self.clusters.get_location(url).await {
            Ok(LocationStatus::InProgress) => PollStatus::running(),
            Ok(LocationStatus::Done) => PollStatus::succeeded(),
            Err(e) => PollStatus::query_error(failure_from(e)),
        }
    }

    async fn poll_resource(&self, url: &str) -> PollStatus {
        match self.clusters.get(url).await {
            Ok(cluster) => match cluster.status() {
                ResourceStatus::Succeeded => PollStatus::succeeded(),
                status @ (ResourceStatus::Failed | ResourceStatus::Canceled) => {
                    PollStatus::failed(OperationFailure::new(format!(
                        "provisioning state {}",
                        status
                    )))
                }
                _ => PollStatus::running(),
            },
            Err(e) => PollStatus::query_error(failure_from(e)),
        }
    }
}

#[async_trait]
impl ControlPlane for AzureControlPlane {
    fn name(&self) -> &str {
        "azure"
    }

    async fn create_or_update(
        &self,
        resource_group: &str,
        name: &str,
        spec: &ResourceSpec,
    ) -> aksup_cloud::Result<OperationHandle> {
        let body = ManagedCluster::from_spec(spec);
        let operation = self
            .clusters
            .create_or_update(resource_group, name, &body)
            .await
            .map_err(AzureError::into_submission)?;

        Ok(OperationHandle::new(
            operation.operation_id(),
            PendingCreate {
                operation,
                name: name.to_string(),
            },
        ))
    }

    async fn query_status(&self, handle: &OperationHandle) -> PollStatus {
        let Some(pending) = handle.payload::<PendingCreate>() else {
            return PollStatus::query_error(OperationFailure::new(format!(
                "handle {} was not issued by the Azure control plane",
                handle
            )));
        };
        let op = &pending.operation;

        if let Some(url) = &op.async_operation_url {
            self.poll_async_operation(url).await
        } else if let Some(url) = &op.location_url {
            self.poll_location(url).await
        } else if op
            .initial_state
            .as_deref()
            .map(ResourceStatus::from_provisioning_state)
            == Some(ResourceStatus::Succeeded)
        {
            // Completed synchronously; the PUT response already said so
            PollStatus::succeeded()
        } else {
            self.poll_resource(&op.resource_url).await
        }
    }

    async fn fetch_result(&self, handle: &OperationHandle) -> aksup_cloud::Result<ResourceState> {
        let pending = handle.payload::<PendingCreate>().ok_or_else(|| {
            aksup_cloud::CloudError::ResultFetch(format!(
                "handle {} was not issued by the Azure control plane",
                handle
            ))
        })?;

        let cluster = self
            .clusters
            .get(&pending.operation.resource_url)
            .await
            .map_err(AzureError::into_result_fetch)?;

        Ok(cluster.into_resource_state(&pending.name))
    }
}

fn failure_from(err: AzureError) -> OperationFailure {
    match err {
        AzureError::Api { code, message, .. } => OperationFailure::with_code(code, message),
        other => OperationFailure::new(other.to_string()),
    }
}
