use submit_invoice::core::AnalysisResult;
use submit_invoice::extract_fields;

/// 兩張發票、欄位齊全與欄位缺漏混合的 analyzeResult
fn two_invoice_result() -> AnalysisResult {
    serde_json::from_value(serde_json::json!({
        "apiVersion": "2024-11-30",
        "modelId": "prebuilt-invoice",
        "documents": [
            {
                "docType": "invoice",
                "confidence": 0.982,
                "fields": {
                    "VendorName": {"type": "string", "valueString": "Contoso Ltd.", "confidence": 0.95},
                    "InvoiceId": {"type": "string", "valueString": "CON-2024-0042"},
                    "InvoiceDate": {"type": "date", "valueDate": "2024-11-15", "content": "15 Nov 2024"},
                    "CustomerName": {"type": "string", "valueString": "Fabrikam Inc."},
                    "SubTotal": {"type": "currency", "valueCurrency": {"amount": 1000.0, "currencyCode": "EUR"}},
                    "TotalTax": {"type": "currency", "valueCurrency": {"amount": 210.0, "currencyCode": "EUR"}},
                    "InvoiceTotal": {"type": "currency", "valueCurrency": {"amount": 1210.0, "currencySymbol": "€", "currencyCode": "EUR"}},
                    "DueDate": {"type": "date", "valueDate": "2024-12-15"},
                    "VendorAddress": {"type": "address", "valueAddress": {"streetAddress": "1 Main St"}}
                }
            },
            {
                "docType": "invoice",
                "confidence": 0.41,
                "fields": {
                    "VendorName": {"type": "string", "content": "Illegible"},
                    "InvoiceDate": {"type": "date", "content": "??/??/2024"},
                    "SubTotal": {"type": "currency", "content": "---"},
                    "InvoiceTotal": {"type": "currency", "valueCurrency": {"amount": 99.5}}
                }
            }
        ]
    }))
    .unwrap()
}

#[test]
fn test_every_document_has_all_nine_slots() {
    let output = extract_fields(&two_invoice_result());
    let json = serde_json::to_value(&output).unwrap();
    let documents = json["documents"].as_array().unwrap();

    assert_eq!(documents.len(), 2);
    let slots = [
        "vendorName",
        "invoiceId",
        "invoiceDate",
        "customerName",
        "subTotal",
        "totalTax",
        "invoiceTotal",
        "currency",
        "confidence",
    ];
    for document in documents {
        let obj = document.as_object().unwrap();
        assert_eq!(obj.len(), slots.len());
        for slot in slots {
            assert!(obj.contains_key(slot), "missing slot {slot}");
        }
    }
}

#[test]
fn test_complete_invoice() {
    let output = extract_fields(&two_invoice_result());
    let first = &output.documents[0];

    assert_eq!(first.vendor_name.as_deref(), Some("Contoso Ltd."));
    assert_eq!(first.invoice_id.as_deref(), Some("CON-2024-0042"));
    assert_eq!(first.invoice_date.as_deref(), Some("2024-11-15"));
    assert_eq!(first.customer_name.as_deref(), Some("Fabrikam Inc."));
    assert_eq!(first.sub_total, Some(1000.0));
    assert_eq!(first.total_tax, Some(210.0));
    assert_eq!(first.invoice_total, Some(1210.0));
    assert_eq!(first.currency.as_deref(), Some("EUR"));
    assert_eq!(first.confidence, 0.982);
}

#[test]
fn test_fields_without_typed_values_are_null() {
    let output = extract_fields(&two_invoice_result());
    let second = &output.documents[1];

    assert_eq!(second.vendor_name, None);
    assert_eq!(second.invoice_id, None);
    assert_eq!(second.invoice_date, None);
    assert_eq!(second.sub_total, None);
    assert_eq!(second.total_tax, None);
    assert_eq!(second.invoice_total, Some(99.5));
    assert_eq!(second.currency, None);
    assert_eq!(second.confidence, 0.41);
}

#[test]
fn test_pretty_output_is_stable() {
    let result = two_invoice_result();
    let first = serde_json::to_string_pretty(&extract_fields(&result)).unwrap();
    let second = serde_json::to_string_pretty(&extract_fields(&result)).unwrap();

    assert_eq!(first, second);
    assert!(first.contains("\"vendorName\": \"Contoso Ltd.\""));
    assert!(first.contains("\"customerName\": null"));
}

/// `"fields": null` 仍產生九欄皆為 null 的紀錄
#[test]
fn test_null_fields_yield_all_null_record() {
    let result: AnalysisResult = serde_json::from_value(serde_json::json!({
        "documents": [{"confidence": 0.5, "fields": null}]
    }))
    .unwrap();

    let output = extract_fields(&result);

    assert_eq!(output.documents.len(), 1);
    let record = &output.documents[0];
    assert_eq!(record.vendor_name, None);
    assert_eq!(record.invoice_id, None);
    assert_eq!(record.invoice_date, None);
    assert_eq!(record.customer_name, None);
    assert_eq!(record.sub_total, None);
    assert_eq!(record.total_tax, None);
    assert_eq!(record.invoice_total, None);
    assert_eq!(record.currency, None);
    assert_eq!(record.confidence, 0.5);
}

#[test]
fn test_null_documents_yield_empty_output() {
    let result: AnalysisResult =
        serde_json::from_value(serde_json::json!({"modelId": "prebuilt-invoice", "documents": null}))
            .unwrap();

    assert!(extract_fields(&result).documents.is_empty());
}
