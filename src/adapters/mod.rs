// Adapters layer: concrete implementations for external systems (analysis service, credentials, document store).

#[cfg(feature = "cosmos")]
pub mod cosmos;
pub mod credentials;
pub mod document_intelligence;

#[cfg(feature = "cosmos")]
pub use cosmos::{CosmosClient, CosmosPersister};
pub use credentials::Credential;
pub use document_intelligence::{DocumentIntelligenceClient, InvoiceAnalyzer};
