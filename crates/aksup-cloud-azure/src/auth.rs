//! Client-credentials authenticator for the Microsoft identity platform

use crate::error::{AzureError, Result};
use crate::settings::AzureSettings;
use aksup_cloud::{Authenticator, Credentials};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde::Deserialize;

/// Exchanges a service principal's client secret for an ARM access token
pub struct ClientSecretAuthenticator {
    client: reqwest::Client,
    settings: AzureSettings,
}

impl ClientSecretAuthenticator {
    pub fn new(settings: AzureSettings) -> Self {
        Self {
            client: crate::http_client(),
            settings,
        }
    }

    pub fn settings(&self) -> &AzureSettings {
        &self.settings
    }

    /// Request a token using the client-credentials grant
    pub async fn request_token(&self) -> Result<Credentials> {
        let url = self.settings.token_url();
        let scope = self.settings.scope();

        tracing::debug!("Requesting token from {} for {}", url, scope);

        let response = self
            .client
            .post(&url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.settings.client_id.as_str()),
                ("client_secret", self.settings.client_secret.as_str()),
                ("scope", scope.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<TokenErrorResponse>(&body)
                .map(|e| match e.error_description {
                    Some(description) => format!("{}: {}", e.error, description),
                    None => e.error,
                })
                .unwrap_or_else(|_| format!("HTTP {}", status.as_u16()));
            return Err(AzureError::TokenRequestFailed(message));
        }

        let token: TokenResponse = serde_json::from_str(&body)?;
        if token.access_token.is_empty() {
            return Err(AzureError::TokenRequestFailed(
                "identity platform returned an empty access token".to_string(),
            ));
        }

        let mut credentials = Credentials::new(token.access_token, self.settings.client_id.clone());
        if let Some(expires_in) = token.expires_in {
            credentials = credentials.with_expiry(Utc::now() + Duration::seconds(expires_in));
        }

        tracing::debug!("Acquired token for client {}", self.settings.client_id);
        Ok(credentials)
    }
}

#[async_trait]
impl Authenticator for ClientSecretAuthenticator {
    async fn get_credentials(&self) -> aksup_cloud::Result<Credentials> {
        self.request_token().await.map_err(AzureError::into_auth)
    }
}

// ============ Token endpoint types ============

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_response_parse() {
        let json = r#"{"token_type":"Bearer","expires_in":3599,"ext_expires_in":3599,"access_token":"eyJ0"}"#;
        let token: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(token.access_token, "eyJ0");
        assert_eq!(token.expires_in, Some(3599));
    }

    #[test]
    fn test_token_error_parse() {
        let json = r#"{"error":"invalid_client","error_description":"AADSTS7000215: Invalid client secret provided."}"#;
        let err: TokenErrorResponse = serde_json::from_str(json).unwrap();
        assert_eq!(err.error, "invalid_client");
        assert!(err.error_description.unwrap().starts_with("AADSTS7000215"));
    }
}
