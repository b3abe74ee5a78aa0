use crate::domain::model::{AnalysisResult, ExtractionOutput};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Submits a document to the analysis service and waits for the result.
#[async_trait]
pub trait DocumentAnalyzer: Send + Sync {
    async fn analyze(&self, file_path: &Path) -> Result<AnalysisResult>;
}

/// Writes one extraction to a remote store, returning the stored item id.
#[async_trait]
pub trait InvoicePersister: Send + Sync {
    async fn persist(&self, output: &ExtractionOutput, source_file: &str) -> Result<String>;
}
