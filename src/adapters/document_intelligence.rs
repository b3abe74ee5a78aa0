use crate::adapters::credentials::{AuthHeader, Credential};
use crate::config::env::{AnalyzerConfig, ProcessEnv, VarSource};
use crate::core::{AnalysisResult, DocumentAnalyzer};
use crate::utils::error::{InvoiceError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, CONTENT_TYPE, RETRY_AFTER};
use reqwest::Client;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const API_VERSION: &str = "2024-11-30";
pub const INVOICE_MODEL_ID: &str = "prebuilt-invoice";
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Poll body of `GET {Operation-Location}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeOperation {
    status: OperationStatus,
    #[serde(default)]
    analyze_result: Option<AnalysisResult>,
    #[serde(default)]
    error: Option<ServiceError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
enum OperationStatus {
    NotStarted,
    Running,
    Succeeded,
    Failed,
    Canceled,
}

#[derive(Debug, Deserialize)]
struct ServiceError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}",
            self.code.as_deref().unwrap_or("UnknownError"),
            self.message.as_deref().unwrap_or("no message")
        )
    }
}

/// REST client for one Document Intelligence resource.
pub struct DocumentIntelligenceClient {
    endpoint: String,
    credential: Credential,
    client: Client,
    poll_interval: Duration,
}

impl DocumentIntelligenceClient {
    pub fn new(endpoint: impl Into<String>, credential: Credential) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            credential,
            client: Client::new(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn from_config(config: &AnalyzerConfig) -> Self {
        Self::new(config.endpoint.clone(), Credential::from_config(config))
    }

    /// Used when the service sends no `Retry-After`.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    fn analyze_url(&self, model_id: &str) -> String {
        format!(
            "{}/documentintelligence/documentModels/{}:analyze?api-version={}",
            self.endpoint, model_id, API_VERSION
        )
    }

    /// Submits `document` to `model_id` and blocks until the operation ends.
    pub async fn analyze_document(&self, model_id: &str, document: Vec<u8>) -> Result<AnalysisResult> {
        let auth = self.credential.authorize(&self.client).await?;

        let operation_url = self.begin_analyze(&auth, model_id, document).await?;
        tracing::debug!("Analysis accepted, polling {}", operation_url);

        self.poll_until_done(&auth, &operation_url).await
    }

    async fn begin_analyze(&self, auth: &AuthHeader, model_id: &str, document: Vec<u8>) -> Result<String> {
        let url = self.analyze_url(model_id);
        tracing::debug!("Submitting {} bytes to {}", document.len(), url);

        let response = auth
            .apply(self.client.post(&url))
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(document)
            .send()
            .await
            .map_err(|e| InvoiceError::analysis(format!("submit request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InvoiceError::analysis(format!(
                "submit rejected ({}): {}",
                status, body
            )));
        }

        response
            .headers()
            .get("Operation-Location")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| InvoiceError::analysis("no Operation-Location in submit response"))
    }

    async fn poll_until_done(&self, auth: &AuthHeader, operation_url: &str) -> Result<AnalysisResult> {
        let mut wait = self.poll_interval;
        let mut attempts: u32 = 0;

        loop {
            tokio::time::sleep(wait).await;
            attempts += 1;

            let response = auth
                .apply(self.client.get(operation_url))
                .send()
                .await
                .map_err(|e| InvoiceError::analysis(format!("polling request failed: {}", e)))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(InvoiceError::analysis(format!(
                    "polling failed ({}): {}",
                    status, body
                )));
            }

            wait = retry_after(response.headers()).unwrap_or(self.poll_interval);
            let operation: AnalyzeOperation = response
                .json()
                .await
                .map_err(|e| InvoiceError::analysis(format!("unreadable operation status: {}", e)))?;

            match operation.status {
                OperationStatus::Succeeded => {
                    tracing::debug!("Analysis succeeded after {} poll(s)", attempts);
                    return operation
                        .analyze_result
                        .ok_or_else(|| InvoiceError::analysis("succeeded without analyzeResult"));
                }
                OperationStatus::Failed | OperationStatus::Canceled => {
                    let detail = operation
                        .error
                        .map(|e| e.to_string())
                        .unwrap_or_else(|| "no error detail".to_string());
                    return Err(InvoiceError::analysis(format!(
                        "operation {:?}: {}",
                        operation.status, detail
                    )));
                }
                OperationStatus::NotStarted | OperationStatus::Running => {
                    tracing::debug!("Analysis {:?}, next poll in {:?}", operation.status, wait);
                }
            }
        }
    }
}

fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

/// The `prebuilt-invoice` analyzer. Configuration and credential are
/// resolved from `source` on every call.
pub struct InvoiceAnalyzer<V: VarSource = ProcessEnv> {
    source: V,
    poll_interval: Option<Duration>,
}

impl InvoiceAnalyzer<ProcessEnv> {
    pub fn from_env() -> Self {
        Self::with_source(ProcessEnv)
    }
}

impl<V: VarSource> InvoiceAnalyzer<V> {
    pub fn with_source(source: V) -> Self {
        Self {
            source,
            poll_interval: None,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = Some(poll_interval);
        self
    }
}

#[async_trait]
impl<V: VarSource> DocumentAnalyzer for InvoiceAnalyzer<V> {
    async fn analyze(&self, file_path: &Path) -> Result<AnalysisResult> {
        let config = AnalyzerConfig::from_source(&self.source)?;

        let mut client = DocumentIntelligenceClient::from_config(&config);
        if let Some(interval) = self.poll_interval {
            client = client.with_poll_interval(interval);
        }

        let document = tokio::fs::read(file_path).await?;
        client.analyze_document(INVOICE_MODEL_ID, document).await
    }
}
