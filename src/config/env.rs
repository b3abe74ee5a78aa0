use crate::utils::error::Result;
use crate::utils::validation::{optional_var, require_vars, validate_url};
use std::collections::HashMap;

pub const DOCUMENTINTELLIGENCE_ENDPOINT: &str = "DOCUMENTINTELLIGENCE_ENDPOINT";
pub const DOCUMENTINTELLIGENCE_API_KEY: &str = "DOCUMENTINTELLIGENCE_API_KEY";
pub const AZURE_TENANT_ID: &str = "AZURE_TENANT_ID";
pub const AZURE_CLIENT_ID: &str = "AZURE_CLIENT_ID";
pub const AZURE_CLIENT_SECRET: &str = "AZURE_CLIENT_SECRET";
pub const AZURE_AUTHORITY_HOST: &str = "AZURE_AUTHORITY_HOST";
pub const COSMOS_ENDPOINT: &str = "COSMOS_ENDPOINT";
pub const COSMOS_KEY: &str = "COSMOS_KEY";
pub const COSMOS_DATABASE: &str = "COSMOS_DATABASE";
pub const COSMOS_CONTAINER: &str = "COSMOS_CONTAINER";

const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

/// Where configuration values come from. Read on every call, never cached.
pub trait VarSource: Send + Sync {
    fn var(&self, name: &str) -> Option<String>;
}

/// The process environment (plus whatever `.env` loaded into it).
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl VarSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl VarSource for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

#[derive(Clone)]
pub struct ServicePrincipal {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
    pub authority_host: String,
}

impl std::fmt::Debug for ServicePrincipal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServicePrincipal")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("authority_host", &self.authority_host)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub struct AnalyzerConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub service_principal: Option<ServicePrincipal>,
}

impl std::fmt::Debug for AnalyzerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyzerConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("service_principal", &self.service_principal)
            .finish()
    }
}

impl AnalyzerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_source(&ProcessEnv)
    }

    pub fn from_source(source: &dyn VarSource) -> Result<Self> {
        let [endpoint] = require_vars(source, [DOCUMENTINTELLIGENCE_ENDPOINT])?;
        validate_url(DOCUMENTINTELLIGENCE_ENDPOINT, &endpoint)?;

        let api_key = optional_var(source, DOCUMENTINTELLIGENCE_API_KEY);

        // 三個變數都設定時才啟用 service principal
        let service_principal = match (
            optional_var(source, AZURE_TENANT_ID),
            optional_var(source, AZURE_CLIENT_ID),
            optional_var(source, AZURE_CLIENT_SECRET),
        ) {
            (Some(tenant_id), Some(client_id), Some(client_secret)) => {
                let authority_host = optional_var(source, AZURE_AUTHORITY_HOST)
                    .unwrap_or_else(|| DEFAULT_AUTHORITY_HOST.to_string());
                validate_url(AZURE_AUTHORITY_HOST, &authority_host)?;
                Some(ServicePrincipal {
                    tenant_id,
                    client_id,
                    client_secret,
                    authority_host,
                })
            }
            _ => None,
        };

        Ok(Self {
            endpoint,
            api_key,
            service_principal,
        })
    }
}

#[derive(Clone)]
pub struct CosmosConfig {
    pub endpoint: String,
    pub key: String,
    pub database: String,
    pub container: String,
}

impl std::fmt::Debug for CosmosConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CosmosConfig")
            .field("endpoint", &self.endpoint)
            .field("database", &self.database)
            .field("container", &self.container)
            .finish_non_exhaustive()
    }
}

impl CosmosConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_source(&ProcessEnv)
    }

    pub fn from_source(source: &dyn VarSource) -> Result<Self> {
        let [endpoint, key, database, container] = require_vars(
            source,
            [COSMOS_ENDPOINT, COSMOS_KEY, COSMOS_DATABASE, COSMOS_CONTAINER],
        )?;
        validate_url(COSMOS_ENDPOINT, &endpoint)?;

        Ok(Self {
            endpoint,
            key,
            database,
            container,
        })
    }
}
