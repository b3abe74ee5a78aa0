use crate::core::pipeline::{InvoicePipeline, PipelineOutcome};
use crate::core::DocumentAnalyzer;
use crate::utils::error::Result;
use std::io::Write;
use std::path::Path;

pub const SAVED_MESSAGE: &str = "Saved extracted invoice data to Cosmos DB item id:";

/// Runs the pipeline for one file and writes the results to `out`.
/// Returns the process exit code.
pub async fn run<A, W>(pipeline: &InvoicePipeline<A>, invoice_file: &Path, out: &mut W) -> i32
where
    A: DocumentAnalyzer,
    W: Write,
{
    let result = match pipeline.run(invoice_file).await {
        Ok(outcome) => print_outcome(&outcome, out),
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => 0,
        Err(e) => {
            tracing::error!("❌ Invoice submission failed: {}", e);
            eprintln!("❌ {}", e);
            eprintln!("💡 {}", e.recovery_suggestion());
            e.exit_code()
        }
    }
}

fn print_outcome<W: Write>(outcome: &PipelineOutcome, out: &mut W) -> Result<()> {
    let json = serde_json::to_string_pretty(&outcome.output)?;
    writeln!(out, "{}", json)?;

    if let Some(id) = &outcome.saved_id {
        writeln!(out, "{} {}", SAVED_MESSAGE, id)?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AnalysisResult, ExtractionOutput, InvoicePersister};
    use crate::utils::error::InvoiceError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct CountingAnalyzer {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl DocumentAnalyzer for CountingAnalyzer {
        async fn analyze(&self, _file_path: &Path) -> Result<AnalysisResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let json = serde_json::json!({
                "documents": [{
                    "confidence": 0.95,
                    "fields": {
                        "VendorName": {"type": "string", "valueString": "Acme Co"},
                        "InvoiceId": {"type": "string", "valueString": "INV-100"},
                        "InvoiceTotal": {"type": "currency", "valueCurrency": {"amount": 150.0, "currencyCode": "USD"}}
                    }
                }]
            });
            Ok(serde_json::from_value(json)?)
        }
    }

    struct FixedPersister;

    #[async_trait]
    impl InvoicePersister for FixedPersister {
        async fn persist(&self, _output: &ExtractionOutput, _source_file: &str) -> Result<String> {
            Ok("0d9c6f3e".to_string())
        }
    }

    struct FailingPersister;

    #[async_trait]
    impl InvoicePersister for FailingPersister {
        async fn persist(&self, _output: &ExtractionOutput, _source_file: &str) -> Result<String> {
            Err(InvoiceError::persistence("409 Conflict"))
        }
    }

    fn invoice_file() -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), b"%PDF").unwrap();
        file
    }

    #[tokio::test]
    async fn test_prints_indented_json() {
        let file = invoice_file();
        let pipeline = InvoicePipeline::new(CountingAnalyzer::default());
        let mut out = Vec::new();

        let code = run(&pipeline, file.path(), &mut out).await;

        assert_eq!(code, 0);
        let text = String::from_utf8(out).unwrap();
        let expected = serde_json::json!({"documents": [{
            "vendorName": "Acme Co",
            "invoiceId": "INV-100",
            "invoiceDate": null,
            "customerName": null,
            "subTotal": null,
            "totalTax": null,
            "invoiceTotal": 150.0,
            "currency": "USD",
            "confidence": 0.95
        }]});
        let printed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(printed, expected);
        assert!(text.starts_with("{\n  \"documents\": ["));
        assert!(!text.contains(SAVED_MESSAGE));
    }

    #[tokio::test]
    async fn test_prints_confirmation_after_json() {
        let file = invoice_file();
        let pipeline = InvoicePipeline::new(CountingAnalyzer::default()).with_persister(FixedPersister);
        let mut out = Vec::new();

        let code = run(&pipeline, file.path(), &mut out).await;

        assert_eq!(code, 0);
        let text = String::from_utf8(out).unwrap();
        let last_line = text.lines().last().unwrap();
        assert_eq!(last_line, format!("{} 0d9c6f3e", SAVED_MESSAGE));
    }

    #[tokio::test]
    async fn test_missing_file_exits_non_zero_without_analysis() {
        let analyzer = CountingAnalyzer::default();
        let calls = analyzer.calls.clone();
        let pipeline = InvoicePipeline::new(analyzer);
        let mut out = Vec::new();

        let code = run(&pipeline, Path::new("no/such/invoice.pdf"), &mut out).await;

        assert_ne!(code, 0);
        assert!(out.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_persistence_failure_exits_non_zero() {
        let file = invoice_file();
        let pipeline = InvoicePipeline::new(CountingAnalyzer::default()).with_persister(FailingPersister);
        let mut out = Vec::new();

        let code = run(&pipeline, file.path(), &mut out).await;

        assert_eq!(code, 3);
        assert!(out.is_empty());
    }
}
