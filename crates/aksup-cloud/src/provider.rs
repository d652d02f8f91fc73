//! Control plane and authenticator traits

use crate::error::Result;
use crate::operation::{OperationHandle, PollStatus};
use crate::spec::ResourceSpec;
use crate::state::ResourceState;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Remote API that manages resource lifecycle.
///
/// Implementations are stateless facades: every call is one request against
/// the control plane, and none of them retry.
#[async_trait]
pub trait ControlPlane: Send + Sync {
    /// Returns the provider name (e.g., "azure")
    fn name(&self) -> &str;

    /// Submit a create-or-update request.
    ///
    /// Fails with [`CloudError::Submission`] when the request is rejected
    /// synchronously (validation, authorization).
    ///
    /// [`CloudError::Submission`]: crate::CloudError::Submission
    async fn create_or_update(
        &self,
        resource_group: &str,
        name: &str,
        spec: &ResourceSpec,
    ) -> Result<OperationHandle>;

    /// Observe the operation once. Must not change server-side state.
    async fn query_status(&self, handle: &OperationHandle) -> PollStatus;

    /// Read the realized resource after the operation succeeded
    async fn fetch_result(&self, handle: &OperationHandle) -> Result<ResourceState>;
}

/// Produces credentials for a control plane.
///
/// Implementations receive their configuration at construction instead of
/// reading the environment on each call.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn get_credentials(&self) -> Result<Credentials>;
}

/// Bearer credentials for control-plane calls
#[derive(Clone)]
pub struct Credentials {
    access_token: String,

    /// Token expiry, if the issuer reported one
    pub expires_at: Option<DateTime<Utc>>,

    /// Account the token was issued for (client id, subscription, ...)
    pub account: String,
}

impl Credentials {
    pub fn new(access_token: impl Into<String>, account: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at: None,
            account: account.into(),
        }
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("account", &self.account)
            .field("expires_at", &self.expires_at)
            .field("access_token", &"<redacted>")
            .finish()
    }
}
