//! Azure provider error types

use aksup_cloud::CloudError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AzureError {
    #[error("Environment variable not set: {0}")]
    MissingEnvVar(String),

    #[error("Unknown Azure environment: {0}")]
    UnknownEnvironment(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Token request failed: {0}")]
    TokenRequestFailed(String),

    #[error("ARM API error ({status}): {code}: {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl AzureError {
    /// Whether the control plane refused our credentials
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, AzureError::Api { status: 401 | 403, .. })
    }

    /// Credential discovery or token failures
    pub fn into_auth(self) -> CloudError {
        CloudError::Authentication(self.to_string())
    }

    pub(crate) fn into_submission(self) -> CloudError {
        if self.is_auth_failure() {
            CloudError::Authentication(self.to_string())
        } else {
            CloudError::Submission(self.to_string())
        }
    }

    pub(crate) fn into_result_fetch(self) -> CloudError {
        CloudError::ResultFetch(self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AzureError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_failures_map_to_authentication() {
        let err = AzureError::Api {
            status: 403,
            code: "AuthorizationFailed".to_string(),
            message: "no access".to_string(),
        };
        assert!(err.is_auth_failure());
        assert!(matches!(err.into_submission(), CloudError::Authentication(_)));

        let err = AzureError::Api {
            status: 400,
            code: "InvalidParameter".to_string(),
            message: "dnsPrefix".to_string(),
        };
        assert!(!err.is_auth_failure());
        assert!(matches!(err.into_submission(), CloudError::Submission(msg) if msg.contains("InvalidParameter")));
    }

    #[test]
    fn test_missing_env_var_is_authentication() {
        let err = AzureError::MissingEnvVar("AZURE_TENANT_ID".to_string()).into_auth();
        assert!(matches!(err, CloudError::Authentication(msg) if msg.contains("AZURE_TENANT_ID")));
        assert_eq!(
            AzureError::MissingEnvVar("X".to_string()).into_auth().kind(),
            "auth"
        );
    }
}
