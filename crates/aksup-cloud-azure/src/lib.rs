//! Azure provider for aksup
//!
//! Implements the [`ControlPlane`](aksup_cloud::ControlPlane) and
//! [`Authenticator`](aksup_cloud::Authenticator) traits against Azure
//! Resource Manager and the Microsoft identity platform.
//!
//! # Requirements
//!
//! A service principal, provided through `AZURE_SUBSCRIPTION_ID`,
//! `AZURE_TENANT_ID`, `AZURE_CLIENT_ID` and `AZURE_CLIENT_SECRET`.
//!
//! # Example
//!
//! ```ignore
//! use aksup_cloud::{Authenticator, OperationPoller};
//! use aksup_cloud_azure::{AzureControlPlane, AzureSettings, ClientSecretAuthenticator};
//!
//! let settings = AzureSettings::from_env()?;
//! let credentials = ClientSecretAuthenticator::new(settings.clone())
//!     .get_credentials()
//!     .await?;
//! let control_plane = AzureControlPlane::new(&settings, credentials);
//!
//! let cluster = OperationPoller::new(&control_plane)
//!     .provision("akstest", "akstest", &spec)
//!     .await?;
//! ```

pub mod auth;
pub mod error;
pub mod managed_clusters;
pub mod models;
pub mod provider;
pub mod settings;

pub use auth::ClientSecretAuthenticator;
pub use error::{AzureError, Result};
pub use managed_clusters::{
    API_VERSION, LocationStatus, ManagedClustersClient, PendingOperation, public_ip_prefix_id,
};
pub use models::ManagedCluster;
pub use provider::AzureControlPlane;
pub use settings::{AzureSettings, CloudEnvironment};

use std::time::Duration;

/// Upper bound for a single HTTP exchange with ARM or the identity platform
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!("failed to build HTTP client with timeout: {}", e);
            reqwest::Client::new()
        })
}
