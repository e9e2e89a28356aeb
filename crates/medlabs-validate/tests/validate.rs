//! Tests for payload validation.

use std::fs;
use std::path::{Path, PathBuf};

use medlabs_model::IssueSeverity;
use medlabs_validate::{PayloadValidator, SchemaReference, SchemaStore, validate_payload};
use serde_json::{Value, json};

fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn golden() -> Value {
    let text = fs::read_to_string(fixture_path("cbc-example-1.json")).unwrap();
    serde_json::from_str(&text).unwrap()
}

fn schema_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("schema/v0.1")
}

#[test]
fn golden_fixture_is_valid() {
    let result = validate_payload(&golden(), &SchemaReference::panel("CBC"));
    assert!(result.is_valid, "{:?}", result.issues);
    assert!(result.issues.is_empty());
}

#[test]
fn missing_observations_is_reported_at_root_and_by_rules() {
    let mut payload = golden();
    payload.as_object_mut().unwrap().remove("observations");

    let result = validate_payload(&payload, &SchemaReference::panel("cbc"));

    assert!(!result.is_valid);
    let paths: Vec<_> = result.errors().map(|issue| issue.path.as_str()).collect();
    assert_eq!(paths, vec!["/", "/observations"]);
    insta::assert_snapshot!(result.issues[0].description, @r###""observations" is a required property"###);
    assert_eq!(result.issues[1].description, "observations must be an array");
}

#[test]
fn mismatched_bound_unit_is_an_error() {
    let mut payload = golden();
    payload["observations"][0]["reference_range"]["low"]["unit_code"] = json!("mg/dL");

    let result = validate_payload(&payload, &SchemaReference::panel("CBC"));

    assert!(!result.is_valid);
    assert_eq!(result.error_count(), 1);
    let issue = result.errors().next().unwrap();
    assert_eq!(issue.path, "/observations/0/reference_range/low/unit_code");
    assert_eq!(issue.description, "must match value.unit_code");
}

#[test]
fn non_ucum_unit_system_is_a_warning_and_mismatch_an_error() {
    let mut payload = golden();
    payload["observations"][1]["value"]["unit_system"] = json!("LOCAL");

    let result = validate_payload(&payload, &SchemaReference::panel("CBC"));

    let rule_issues: Vec<_> = result
        .issues
        .iter()
        .map(|issue| (issue.severity, issue.path.as_str()))
        .collect();
    assert_eq!(
        rule_issues,
        vec![
            (IssueSeverity::Warning, "/observations/1/value/unit_system"),
            (IssueSeverity::Error, "/observations/1/reference_range/low/unit_system"),
            (IssueSeverity::Error, "/observations/1/reference_range/high/unit_system"),
        ]
    );
}

#[test]
fn missing_unit_code_fails_schema_and_rules() {
    let mut payload = golden();
    payload["observations"][0]["value"]
        .as_object_mut()
        .unwrap()
        .remove("unit_code");

    let result = validate_payload(&payload, &SchemaReference::panel("CBC"));

    let paths: Vec<_> = result.errors().map(|issue| issue.path.as_str()).collect();
    assert_eq!(
        paths,
        vec!["/observations/0/value", "/observations/0/value/unit_code"]
    );
}

#[test]
fn text_value_with_numeric_range_is_a_warning() {
    let mut payload = golden();
    payload["observations"][0]["value"] = json!("negative");
    payload["observations"][0]["interpretation"] = json!("unknown");

    let result = validate_payload(&payload, &SchemaReference::panel("CBC"));

    assert!(result.is_valid);
    assert_eq!(result.warning_count(), 1);
    assert_eq!(result.issues[0].path, "/observations/0/reference_range");
}

#[test]
fn inverted_range_is_a_warning() {
    let mut payload = golden();
    payload["observations"][0]["reference_range"]["low"]["value"] = json!(12.0);

    let result = validate_payload(&payload, &SchemaReference::panel("CBC"));

    assert!(result.is_valid);
    insta::assert_debug_snapshot!(result.issues, @r###"
    [
        ValidationIssue {
            path: "/observations/0/reference_range",
            description: "reference_range low (12) is greater than high (10)",
            severity: Warning,
        },
    ]
    "###);
}

#[test]
fn wrong_panel_schema_reports_the_code() {
    let result = validate_payload(&golden(), &SchemaReference::panel("BIOCHEM"));
    assert!(!result.is_valid);
    assert_eq!(result.issues[0].path, "/panel_code/code");
}

#[test]
fn unsupported_panel_yields_single_root_error() {
    let result = validate_payload(&golden(), &SchemaReference::panel("LIPIDS"));

    assert!(!result.is_valid);
    assert_eq!(result.error_count(), 1);
    assert_eq!(result.issues[0].path, "/");
    assert_eq!(
        result.issues[0].description,
        "Schema validation failed to run: Unsupported panel code: LIPIDS"
    );
}

#[test]
fn missing_schema_file_yields_root_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.json");

    let result = validate_payload(&golden(), &SchemaReference::path(&missing));

    assert_eq!(result.error_count(), 1);
    assert_eq!(result.issues[0].path, "/");
    assert!(
        result.issues[0]
            .description
            .starts_with("Schema validation failed to run: failed to read schema")
    );
}

#[test]
fn invalid_schema_json_yields_root_error() {
    let dir = tempfile::tempdir().unwrap();
    let broken = dir.path().join("cbc.json");
    fs::write(&broken, "{ not json").unwrap();

    let result = validate_payload(&golden(), &SchemaReference::path(&broken));

    assert_eq!(result.error_count(), 1);
    assert!(result.issues[0].description.contains("failed to parse schema"));
}

#[test]
fn explicit_schema_path_resolves_sibling_refs() {
    let result = validate_payload(&golden(), &SchemaReference::path(schema_dir().join("cbc.json")));
    assert!(result.is_valid, "{:?}", result.issues);
}

#[test]
fn schema_directory_replaces_embedded_documents() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["common.json", "cbc.json"] {
        fs::copy(schema_dir().join(name), dir.path().join(name)).unwrap();
    }
    let validator = PayloadValidator::new(SchemaStore::from_dir(dir.path()));

    assert!(validator.validate(&golden(), &SchemaReference::panel("CBC")).is_valid);

    let result = validator.validate(&golden(), &SchemaReference::panel("URINALYSIS"));
    assert_eq!(result.issues[0].path, "/");
    assert!(result.issues[0].description.contains("urinalysis.json"));
}
