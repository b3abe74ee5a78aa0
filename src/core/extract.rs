use crate::domain::model::{
    AnalysisResult, AnalyzedDocument, CurrencyValue, DocumentField, ExtractedRecord,
    ExtractionOutput,
};
use std::collections::HashMap;

type Fields = HashMap<String, Option<DocumentField>>;

/// Flattens every analyzed document into an [`ExtractedRecord`], keeping
/// the service's document order. Pure: no I/O, same input, same output.
pub fn extract_fields(result: &AnalysisResult) -> ExtractionOutput {
    ExtractionOutput {
        documents: result.documents.iter().map(extract_document).collect(),
    }
}

fn extract_document(doc: &AnalyzedDocument) -> ExtractedRecord {
    let fields = &doc.fields;
    let invoice_total = currency_field(fields, "InvoiceTotal");

    ExtractedRecord {
        vendor_name: string_field(fields, "VendorName"),
        invoice_id: string_field(fields, "InvoiceId"),
        invoice_date: date_field(fields, "InvoiceDate"),
        customer_name: string_field(fields, "CustomerName"),
        sub_total: currency_field(fields, "SubTotal").map(|c| c.amount),
        total_tax: currency_field(fields, "TotalTax").map(|c| c.amount),
        invoice_total: invoice_total.map(|c| c.amount),
        currency: invoice_total.and_then(|c| c.currency_code.clone()),
        confidence: doc.confidence,
    }
}

fn field<'a>(fields: &'a Fields, name: &str) -> Option<&'a DocumentField> {
    fields.get(name).and_then(Option::as_ref)
}

pub fn string_field(fields: &Fields, name: &str) -> Option<String> {
    match field(fields, name)? {
        DocumentField::String { value_string } => value_string.clone(),
        _ => None,
    }
}

/// `YYYY-MM-DD`
pub fn date_field(fields: &Fields, name: &str) -> Option<String> {
    match field(fields, name)? {
        DocumentField::Date { value_date } => value_date.map(|d| d.to_string()),
        _ => None,
    }
}

/// Both levels must be present: the field itself and its currency sub-value.
pub fn currency_field<'a>(fields: &'a Fields, name: &str) -> Option<&'a CurrencyValue> {
    match field(fields, name)? {
        DocumentField::Currency { value_currency } => value_currency.as_ref(),
        _ => None,
    }
}
