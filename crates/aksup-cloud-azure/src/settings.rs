//! Azure settings loaded from the process environment
//!
//! Reads the same variables as the Azure SDKs' environment-based
//! authorizers:
//!
//! - `AZURE_SUBSCRIPTION_ID`
//! - `AZURE_TENANT_ID`
//! - `AZURE_CLIENT_ID`
//! - `AZURE_CLIENT_SECRET`
//! - `AZURE_ENVIRONMENT` (optional, defaults to `AzurePublicCloud`)
//! - `AZURE_AD_RESOURCE` (optional, defaults to the environment's ARM endpoint)

use crate::error::{AzureError, Result};

pub const ENV_SUBSCRIPTION_ID: &str = "AZURE_SUBSCRIPTION_ID";
pub const ENV_TENANT_ID: &str = "AZURE_TENANT_ID";
pub const ENV_CLIENT_ID: &str = "AZURE_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "AZURE_CLIENT_SECRET";
pub const ENV_ENVIRONMENT: &str = "AZURE_ENVIRONMENT";
pub const ENV_AD_RESOURCE: &str = "AZURE_AD_RESOURCE";

/// Sovereign cloud the control plane lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CloudEnvironment {
    #[default]
    AzurePublicCloud,
    AzureChinaCloud,
    AzureUSGovernmentCloud,
}

impl CloudEnvironment {
    pub fn from_name(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "azurepubliccloud" | "azurecloud" | "public" => Ok(CloudEnvironment::AzurePublicCloud),
            "azurechinacloud" | "china" => Ok(CloudEnvironment::AzureChinaCloud),
            "azureusgovernmentcloud" | "azureusgovernment" | "usgov" => {
                Ok(CloudEnvironment::AzureUSGovernmentCloud)
            }
            _ => Err(AzureError::UnknownEnvironment(name.to_string())),
        }
    }

    pub fn authority_host(&self) -> &'static str {
        match self {
            CloudEnvironment::AzurePublicCloud => "https://login.microsoftonline.com",
            CloudEnvironment::AzureChinaCloud => "https://login.chinacloudapi.cn",
            CloudEnvironment::AzureUSGovernmentCloud => "https://login.microsoftonline.us",
        }
    }

    pub fn resource_manager_endpoint(&self) -> &'static str {
        match self {
            CloudEnvironment::AzurePublicCloud => "https://management.azure.com",
            CloudEnvironment::AzureChinaCloud => "https://management.chinacloudapi.cn",
            CloudEnvironment::AzureUSGovernmentCloud => "https://management.usgovcloudapi.net",
        }
    }
}

/// Everything needed to authenticate and address the control plane
#[derive(Clone)]
pub struct AzureSettings {
    pub subscription_id: String,
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
    pub environment: CloudEnvironment,

    /// Token audience; `{resource}/.default` is requested as scope
    pub resource: String,

    /// Base URL of the identity platform
    pub authority_host: String,

    /// Base URL of Azure Resource Manager
    pub resource_manager_endpoint: String,
}

impl AzureSettings {
    pub fn new(
        subscription_id: impl Into<String>,
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        let environment = CloudEnvironment::default();
        Self {
            subscription_id: subscription_id.into(),
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            environment,
            resource: environment.resource_manager_endpoint().to_string(),
            authority_host: environment.authority_host().to_string(),
            resource_manager_endpoint: environment.resource_manager_endpoint().to_string(),
        }
    }

    /// Load settings from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| AzureError::MissingEnvVar(key.to_string()))
        };

        let mut settings = Self::new(
            required(ENV_SUBSCRIPTION_ID)?,
            required(ENV_TENANT_ID)?,
            required(ENV_CLIENT_ID)?,
            required(ENV_CLIENT_SECRET)?,
        );

        if let Some(name) = lookup(ENV_ENVIRONMENT).filter(|v| !v.trim().is_empty()) {
            settings = settings.with_environment(CloudEnvironment::from_name(&name)?);
        }

        if let Some(resource) = lookup(ENV_AD_RESOURCE).filter(|v| !v.trim().is_empty()) {
            settings.resource = resource;
        }

        Ok(settings)
    }

    /// Switch cloud; resets endpoints and audience to that cloud's defaults
    pub fn with_environment(mut self, environment: CloudEnvironment) -> Self {
        self.environment = environment;
        self.resource = environment.resource_manager_endpoint().to_string();
        self.authority_host = environment.authority_host().to_string();
        self.resource_manager_endpoint = environment.resource_manager_endpoint().to_string();
        self
    }

    /// Point at custom endpoints (sovereign stacks, local fakes)
    pub fn with_endpoints(
        mut self,
        authority_host: impl Into<String>,
        resource_manager_endpoint: impl Into<String>,
    ) -> Self {
        self.authority_host = authority_host.into();
        self.resource_manager_endpoint = resource_manager_endpoint.into();
        self
    }

    /// OAuth scope requested from the identity platform
    pub fn scope(&self) -> String {
        format!("{}/.default", self.resource.trim_end_matches('/'))
    }

    pub fn token_url(&self) -> String {
        format!(
            "{}/{}/oauth2/v2.0/token",
            self.authority_host.trim_end_matches('/'),
            self.tenant_id
        )
    }
}

impl std::fmt::Debug for AzureSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureSettings")
            .field("subscription_id", &self.subscription_id)
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("environment", &self.environment)
            .field("resource", &self.resource)
            .field("authority_host", &self.authority_host)
            .field("resource_manager_endpoint", &self.resource_manager_endpoint)
            .finish()
    }
}
