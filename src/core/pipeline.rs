use crate::core::extract::extract_fields;
use crate::core::{DocumentAnalyzer, ExtractionOutput, InvoicePersister};
use crate::utils::error::{InvoiceError, Result};
use std::path::Path;

#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub output: ExtractionOutput,
    /// Item id when the persistence stage ran.
    pub saved_id: Option<String>,
}

/// Analyzer -> field extractor -> optional persister, strictly in sequence.
pub struct InvoicePipeline<A: DocumentAnalyzer> {
    analyzer: A,
    persister: Option<Box<dyn InvoicePersister>>,
}

impl<A: DocumentAnalyzer> InvoicePipeline<A> {
    pub fn new(analyzer: A) -> Self {
        Self {
            analyzer,
            persister: None,
        }
    }

    pub fn with_persister(mut self, persister: impl InvoicePersister + 'static) -> Self {
        self.persister = Some(Box::new(persister));
        self
    }

    pub async fn run(&self, file_path: &Path) -> Result<PipelineOutcome> {
        // 任何網路呼叫之前先確認檔案存在
        if !file_path.exists() {
            return Err(InvoiceError::NotFoundError {
                path: file_path.to_path_buf(),
            });
        }

        tracing::info!("Analyzing {}", file_path.display());
        let result = self.analyzer.analyze(file_path).await?;
        tracing::info!("Analysis returned {} document(s)", result.documents.len());

        let output = extract_fields(&result);

        let saved_id = match &self.persister {
            Some(persister) => {
                let source_file = file_path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| file_path.display().to_string());
                let id = persister.persist(&output, &source_file).await?;
                tracing::info!("Persisted extraction as item {}", id);
                Some(id)
            }
            None => None,
        };

        Ok(PipelineOutcome { output, saved_id })
    }
}
