pub mod extract;
pub mod pipeline;

pub use crate::domain::model::{
    AnalysisResult, AnalyzedDocument, CurrencyValue, DocumentField, ExtractedRecord,
    ExtractionOutput, PersistedEnvelope,
};
pub use crate::domain::ports::{DocumentAnalyzer, InvoicePersister};
pub use crate::utils::error::Result;
