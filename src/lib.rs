pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;

#[cfg(feature = "cosmos")]
pub use adapters::CosmosPersister;

pub use adapters::InvoiceAnalyzer;
pub use crate::core::{extract::extract_fields, pipeline::InvoicePipeline};
pub use utils::error::{InvoiceError, Result};
