use chrono::{NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// `analyzeResult` as returned by the Document Intelligence service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    #[serde(default)]
    pub model_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub documents: Vec<AnalyzedDocument>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzedDocument {
    #[serde(default)]
    pub doc_type: Option<String>,
    pub confidence: f64,
    /// A `null` entry and a missing key both mean "not detected".
    /// `"fields": null` reads as an empty map.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub fields: HashMap<String, Option<DocumentField>>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// A detected field, tagged by its `type`. Only the value kinds this tool
/// reads are modelled; everything else collapses into `Other`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DocumentField {
    #[serde(rename = "string")]
    String {
        #[serde(rename = "valueString", default)]
        value_string: Option<String>,
    },
    #[serde(rename = "date")]
    Date {
        #[serde(rename = "valueDate", default)]
        value_date: Option<NaiveDate>,
    },
    #[serde(rename = "currency")]
    Currency {
        #[serde(rename = "valueCurrency", default)]
        value_currency: Option<CurrencyValue>,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyValue {
    pub amount: f64,
    #[serde(default)]
    pub currency_code: Option<String>,
    #[serde(default)]
    pub currency_symbol: Option<String>,
}

/// One flattened invoice. Every slot is always serialized, `null` when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedRecord {
    pub vendor_name: Option<String>,
    pub invoice_id: Option<String>,
    pub invoice_date: Option<String>,
    pub customer_name: Option<String>,
    pub sub_total: Option<f64>,
    pub total_tax: Option<f64>,
    pub invoice_total: Option<f64>,
    pub currency: Option<String>,
    pub confidence: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionOutput {
    pub documents: Vec<ExtractedRecord>,
}

impl ExtractionOutput {
    pub fn first_invoice_id(&self) -> Option<&str> {
        self.documents.first()?.invoice_id.as_deref()
    }
}

/// The item written to the document store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedEnvelope {
    pub id: String,
    pub invoice_id: String,
    pub source_file: String,
    pub processed_at_utc: String,
    pub extract: ExtractionOutput,
}

impl PersistedEnvelope {
    pub fn new(extract: ExtractionOutput, source_file: impl Into<String>) -> Self {
        let invoice_id = match extract.first_invoice_id() {
            Some(id) => id.to_string(),
            None => {
                let generated = Uuid::new_v4().to_string();
                tracing::warn!(
                    "No InvoiceId detected, using generated identifier {}",
                    generated
                );
                generated
            }
        };

        Self {
            id: Uuid::new_v4().to_string(),
            invoice_id,
            source_file: source_file.into(),
            processed_at_utc: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false),
            extract,
        }
    }
}
