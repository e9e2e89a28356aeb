//! Tests for the pattern and structured extractors.

use std::fs;
use std::sync::Mutex;

use medlabs_ingest::{
    ExtractError, Extractor, JsonOutputClient, LlmClient, REGEX_CONFIDENCE, RegexExtractor,
    StructuredExtractor, StructuredRequest, TextIngestor, fields_from_output,
};
use serde_json::{Value, json};

#[test]
fn regex_extractor_records_page_and_line() {
    let text = "Complete Blood Count\nWBC 5.4 10*9/L (4.0-10.0)\n\u{000C}Results:\nHemoglobin 118 g/L (120-160)";
    let document = TextIngestor::new().ingest(text);

    let report = RegexExtractor::new().extract(&document).unwrap();

    let names: Vec<_> = report.fields.iter().map(|field| field.name_raw.as_str()).collect();
    assert_eq!(names, vec!["Complete Blood", "WBC", "Hemoglobin"]);

    let wbc = &report.fields[1];
    assert_eq!(wbc.value_raw, "5.4");
    assert_eq!(wbc.unit_raw, "10*9/L");
    assert_eq!(wbc.ref_raw, "4.0-10.0");
    assert_eq!(wbc.confidence, REGEX_CONFIDENCE);
    assert_eq!(wbc.evidence["raw_text"], "WBC 5.4 10*9/L (4.0-10.0)");
    assert_eq!(wbc.evidence["line"], 2);
    assert_eq!(wbc.evidence["page"], 1);

    let hemoglobin = &report.fields[2];
    assert_eq!(hemoglobin.evidence["line"], 2);
    assert_eq!(hemoglobin.evidence["page"], 2);
    assert!(report.warnings.is_empty());
}

#[test]
fn regex_extractor_warns_when_nothing_matches() {
    let document = TextIngestor::new().ingest("12345\n\n---");
    let report = RegexExtractor::new().extract(&document).unwrap();

    assert!(report.fields.is_empty());
    insta::assert_debug_snapshot!(report.warnings, @r###"
    [
        "Regex extractor could not parse any fields",
    ]
    "###);
}

/// Records every request and answers with a fixed output.
struct RecordingClient {
    output: Value,
    requests: Mutex<Vec<StructuredRequest>>,
}

impl RecordingClient {
    fn new(output: Value) -> Self {
        Self {
            output,
            requests: Mutex::new(Vec::new()),
        }
    }
}

impl LlmClient for RecordingClient {
    fn extract_structured(&self, request: &StructuredRequest) -> Result<Value, ExtractError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(self.output.clone())
    }
}

struct FailingClient;

impl LlmClient for FailingClient {
    fn extract_structured(&self, _request: &StructuredRequest) -> Result<Value, ExtractError> {
        Err(ExtractError::client("connection refused"))
    }
}

#[test]
fn structured_extractor_sends_request_and_records_prompt() {
    let client = RecordingClient::new(json!({
        "fields": [
            {
                "name_raw": " WBC ",
                "value_raw": 5.4,
                "unit_raw": "10^9/L",
                "ref_raw": "4.0-10.0",
                "confidence": 0.92,
                "evidence": {"page": 1, "line": 4}
            }
        ]
    }));
    let extractor = StructuredExtractor::new(client).with_prompt("cbc_extraction", "v3");
    let document = TextIngestor::new().ingest("WBC 5.4");

    let report = extractor.extract(&document).unwrap();

    let requests = extractor.client().requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].prompt_name, "cbc_extraction");
    assert_eq!(requests[0].prompt_version, "v3");
    assert_eq!(requests[0].input_text, "WBC 5.4");
    assert_eq!(requests[0].temperature, 0.0);
    assert_eq!(requests[0].output_schema["required"], json!(["fields"]));

    assert_eq!(report.meta["prompt_name"], "cbc_extraction");
    assert_eq!(report.meta["prompt_version"], "v3");
    assert_eq!(report.fields.len(), 1);
    let field = &report.fields[0];
    assert_eq!(field.name_raw, "WBC");
    assert_eq!(field.value_raw, "5.4");
    assert_eq!(field.unit_raw, "10^9/L");
    assert_eq!(field.flags_raw, "");
    assert_eq!(field.confidence, 0.92);
    assert_eq!(field.evidence["line"], 4);
}

#[test]
fn invalid_items_become_warnings() {
    let output = json!({
        "fields": [
            "WBC 5.4",
            {"name_raw": "Hemoglobin", "value_raw": "  "},
            {"name_raw": "Glucose", "value_raw": "5.1", "evidence": "page 1", "confidence": 3},
            {"value_raw": "22"}
        ]
    });

    let (fields, warnings) = fields_from_output(&output);

    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].name_raw, "Glucose");
    assert!(fields[0].evidence.is_empty());
    assert_eq!(fields[0].confidence, 1.0);
    insta::assert_debug_snapshot!(warnings, @r###"
    [
        "fields[0] is not an object",
        "fields[1] is missing name_raw or value_raw",
        "fields[3] is missing name_raw or value_raw",
    ]
    "###);
}

#[test]
fn non_array_fields_is_a_warning() {
    let (fields, warnings) = fields_from_output(&json!({"fields": {"name_raw": "WBC"}}));
    assert!(fields.is_empty());
    assert_eq!(warnings, vec!["Extractor output has invalid fields format".to_string()]);

    let (fields, warnings) = fields_from_output(&json!({}));
    assert!(fields.is_empty());
    assert!(warnings.is_empty());
}

#[test]
fn non_object_output_is_an_error() {
    let extractor = StructuredExtractor::new(JsonOutputClient::new(json!([1, 2])));
    let error = extractor
        .extract(&TextIngestor::new().ingest("WBC 5.4"))
        .unwrap_err();
    assert!(matches!(error, ExtractError::InvalidOutput { kind: "array" }));
}

#[test]
fn client_failure_propagates() {
    let extractor = StructuredExtractor::new(FailingClient);
    let error = extractor
        .extract(&TextIngestor::new().ingest("WBC 5.4"))
        .unwrap_err();
    assert_eq!(
        error.to_string(),
        "structured extraction client failed: connection refused"
    );
}

#[test]
fn json_output_client_reads_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("output.json");
    fs::write(&path, r#"{"fields": [{"name_raw": "ALT", "value_raw": "22", "unit_raw": "U/L"}]}"#)
        .unwrap();

    let extractor = StructuredExtractor::new(JsonOutputClient::from_path(&path).unwrap());
    let report = extractor.extract(&TextIngestor::new().ingest("")).unwrap();

    assert_eq!(report.fields.len(), 1);
    assert_eq!(report.fields[0].unit_raw, "U/L");
    assert_eq!(report.meta["prompt_name"], "lab_extraction");
}

#[test]
fn json_output_client_rejects_invalid_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("output.json");
    fs::write(&path, "{ fields: ").unwrap();

    let error = JsonOutputClient::from_path(&path).unwrap_err();
    assert!(matches!(error, ExtractError::OutputParse { .. }));
}
