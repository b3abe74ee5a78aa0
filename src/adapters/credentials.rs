use crate::config::env::{AnalyzerConfig, ServicePrincipal};
use crate::utils::error::{InvoiceError, Result};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;

pub const COGNITIVE_SERVICES_SCOPE: &str = "https://cognitiveservices.azure.com/.default";
const COGNITIVE_SERVICES_RESOURCE: &str = "https://cognitiveservices.azure.com";

/// How requests to the analysis service are authorized.
#[derive(Clone)]
pub enum Credential {
    ApiKey(String),
    /// Ambient identity: service principal from the environment, else the
    /// logged-in Azure CLI session.
    Ambient(Option<ServicePrincipal>),
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ApiKey(_) => f.write_str("ApiKey(***)"),
            Self::Ambient(Some(_)) => f.write_str("Ambient(ServicePrincipal)"),
            Self::Ambient(None) => f.write_str("Ambient(AzureCli)"),
        }
    }
}

impl Credential {
    pub fn from_config(config: &AnalyzerConfig) -> Self {
        match &config.api_key {
            Some(key) => Self::ApiKey(key.clone()),
            None => Self::Ambient(config.service_principal.clone()),
        }
    }

    /// Resolves to a header-ready form; tokens are fetched here, once.
    pub async fn authorize(&self, http: &Client) -> Result<AuthHeader> {
        match self {
            Self::ApiKey(key) => Ok(AuthHeader::SubscriptionKey(key.clone())),
            Self::Ambient(Some(principal)) => {
                tracing::debug!("Requesting token for client {}", principal.client_id);
                client_secret_token(http, principal).await.map(AuthHeader::Bearer)
            }
            Self::Ambient(None) => {
                tracing::debug!("Requesting token from Azure CLI");
                azure_cli_token().await.map(AuthHeader::Bearer)
            }
        }
    }
}

#[derive(Clone)]
pub enum AuthHeader {
    SubscriptionKey(String),
    Bearer(String),
}

impl std::fmt::Debug for AuthHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SubscriptionKey(_) => f.write_str("SubscriptionKey(***)"),
            Self::Bearer(_) => f.write_str("Bearer(***)"),
        }
    }
}

impl AuthHeader {
    pub fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Self::SubscriptionKey(key) => request.header("Ocp-Apim-Subscription-Key", key),
            Self::Bearer(token) => request.bearer_auth(token),
        }
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

async fn client_secret_token(http: &Client, principal: &ServicePrincipal) -> Result<String> {
    let url = format!(
        "{}/{}/oauth2/v2.0/token",
        principal.authority_host.trim_end_matches('/'),
        principal.tenant_id
    );

    let response = http
        .post(&url)
        .form(&[
            ("grant_type", "client_credentials"),
            ("client_id", principal.client_id.as_str()),
            ("client_secret", principal.client_secret.as_str()),
            ("scope", COGNITIVE_SERVICES_SCOPE),
        ])
        .send()
        .await
        .map_err(|e| InvoiceError::credential(format!("token request failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(InvoiceError::credential(format!(
            "token request for tenant {} failed ({}): {}",
            principal.tenant_id, status, body
        )));
    }

    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| InvoiceError::credential(format!("unreadable token response: {}", e)))?;
    Ok(token.access_token)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CliTokenResponse {
    access_token: String,
}

async fn azure_cli_token() -> Result<String> {
    let program = if cfg!(windows) { "az.cmd" } else { "az" };

    let output = tokio::process::Command::new(program)
        .args([
            "account",
            "get-access-token",
            "--resource",
            COGNITIVE_SERVICES_RESOURCE,
            "--output",
            "json",
        ])
        .output()
        .await
        .map_err(|e| {
            InvoiceError::credential(format!(
                "no API key configured and Azure CLI is unavailable ({})",
                e
            ))
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(InvoiceError::credential(format!(
            "Azure CLI could not issue a token: {}",
            stderr.trim()
        )));
    }

    let token: CliTokenResponse = serde_json::from_slice(&output.stdout)
        .map_err(|e| InvoiceError::credential(format!("unreadable Azure CLI token: {}", e)))?;
    Ok(token.access_token)
}
