//! Integration tests for the CLI commands, configuration and summaries.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use medlabs_cli::cli::{ExtractorArg, ParseArgs, ValidateArgs};
use medlabs_cli::commands::{run_panels, run_parse, run_validate};
use medlabs_cli::config::{
    CONFIG_ENV, DEFAULT_PANEL, ExtractorKind, MedlabsConfig, PANEL_ENV, SCHEMA_DIR_ENV,
};
use medlabs_cli::summary::{parse_headline, parse_summary, step_table, validation_summary};
use medlabs_core::{LabPipeline, StageFailure};
use medlabs_model::Metadata;
use serde_json::{Value, json};

const CBC_REPORT: &str = "WBC 5.4 10*9/L (4.0-10.0)\nHemoglobin 131 g/L (120-160)\n";

fn fixture_payload() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../medlabs-validate/tests/fixtures/cbc-example-1.json")
}

fn parse_args(input: PathBuf) -> ParseArgs {
    ParseArgs {
        input,
        panel: None,
        meta: Vec::new(),
        extractor: None,
        extractor_output: None,
        schema: None,
        schema_dir: None,
        standard_version: None,
        output: None,
    }
}

fn validate_args(payload: PathBuf) -> ValidateArgs {
    ValidateArgs {
        payload,
        panel: None,
        schema: None,
        schema_dir: None,
    }
}

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn config_defaults_without_files_or_env() {
    let dir = tempfile::tempdir().unwrap();
    let config =
        MedlabsConfig::load_with(None, env_from(&[]), &dir.path().join("medlabs.toml")).unwrap();
    assert_eq!(config, MedlabsConfig::default());
    assert_eq!(config.panel, DEFAULT_PANEL);
}

#[test]
fn config_env_overrides_implicit_file() {
    let dir = tempfile::tempdir().unwrap();
    let implicit = dir.path().join("medlabs.toml");
    fs::write(
        &implicit,
        "panel = \"BIOCHEM\"\nstandard_version = \"0.2\"\nextractor = \"structured-json\"\n",
    )
    .unwrap();

    let config = MedlabsConfig::load_with(
        None,
        env_from(&[(PANEL_ENV, "urinalysis"), (SCHEMA_DIR_ENV, "/opt/schemas")]),
        &implicit,
    )
    .unwrap();

    assert_eq!(config.panel, "urinalysis");
    assert_eq!(config.standard_version, "0.2");
    assert_eq!(config.extractor, ExtractorKind::StructuredJson);
    assert_eq!(config.schema_dir, Some(PathBuf::from("/opt/schemas")));
}

#[test]
fn config_explicit_file_beats_env_file() {
    let dir = tempfile::tempdir().unwrap();
    let explicit = dir.path().join("explicit.toml");
    let from_env = dir.path().join("env.toml");
    fs::write(&explicit, "panel = \"CBC\"\n").unwrap();
    fs::write(&from_env, "panel = \"BIOCHEM\"\n").unwrap();
    let env_path = from_env.display().to_string();

    let config = MedlabsConfig::load_with(
        Some(explicit.as_path()),
        env_from(&[(CONFIG_ENV, env_path.as_str())]),
        &dir.path().join("medlabs.toml"),
    )
    .unwrap();
    assert_eq!(config.panel, "CBC");

    let config = MedlabsConfig::load_with(
        None,
        env_from(&[(CONFIG_ENV, env_path.as_str())]),
        &dir.path().join("medlabs.toml"),
    )
    .unwrap();
    assert_eq!(config.panel, "BIOCHEM");
}

#[test]
fn config_named_file_must_exist() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.toml");
    let error = MedlabsConfig::load_with(Some(missing.as_path()), env_from(&[]), &missing).unwrap_err();
    assert!(error.to_string().starts_with("read config "));
}

#[test]
fn config_rejects_unknown_keys() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("medlabs.toml");
    fs::write(&path, "panle = \"CBC\"\n").unwrap();
    let error = MedlabsConfig::load_with(None, env_from(&[]), &path).unwrap_err();
    assert!(error.to_string().starts_with("parse config "));
}

#[test]
fn parse_writes_payload_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("report.txt");
    let output = dir.path().join("payload.json");
    fs::write(&input, CBC_REPORT).unwrap();

    let mut args = parse_args(input);
    args.output = Some(output.clone());
    args.meta = vec![
        ("document_id".to_string(), "doc-9".to_string()),
        ("lab_name".to_string(), "City Lab".to_string()),
    ];

    let result = run_parse(&args, &MedlabsConfig::default()).unwrap();
    assert!(result.is_valid(), "{:?}", result.validation.issues);

    let written: Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(written["panel_code"]["code"], "CBC");
    assert_eq!(written["source"]["document_id"], "doc-9");
    assert_eq!(written["observations"].as_array().unwrap().len(), 2);
    assert_eq!(written["observations"][1]["code"]["code"], "718-7");
}

#[test]
fn parse_panel_flag_beats_config() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("report.txt");
    fs::write(&input, "Glucose 5.1 mmol/L (3.9-6.1)\n").unwrap();

    let mut args = parse_args(input);
    args.panel = Some("biochem".to_string());
    args.output = Some(dir.path().join("payload.json"));
    let config = MedlabsConfig {
        panel: "URINALYSIS".to_string(),
        ..MedlabsConfig::default()
    };

    let result = run_parse(&args, &config).unwrap();
    assert_eq!(result.mapped.data.panel_code.code, "BIOCHEM");
    assert_eq!(result.mapped.data.observations.len(), 1);
}

#[test]
fn parse_structured_json_replays_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("report.txt");
    let replay = dir.path().join("extraction.json");
    fs::write(&input, "scanned report").unwrap();
    fs::write(
        &replay,
        json!({
            "fields": [
                {"name_raw": "WBC", "value_raw": "11.2", "unit_raw": "x10^9/L", "ref_raw": "4.0-10.0"}
            ]
        })
        .to_string(),
    )
    .unwrap();

    let mut args = parse_args(input);
    args.extractor = Some(ExtractorArg::StructuredJson);
    args.extractor_output = Some(replay);
    args.output = Some(dir.path().join("payload.json"));

    let result = run_parse(&args, &MedlabsConfig::default()).unwrap();
    assert_eq!(result.extracted.meta["prompt_name"], "lab_extraction");
    assert_eq!(result.mapped.data.observations[0].interpretation.as_str(), "high");
}

#[test]
fn parse_structured_json_requires_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("report.txt");
    fs::write(&input, CBC_REPORT).unwrap();
    let config = MedlabsConfig {
        extractor: ExtractorKind::StructuredJson,
        ..MedlabsConfig::default()
    };

    let error = run_parse(&parse_args(input), &config).unwrap_err();
    assert_eq!(
        error.to_string(),
        "the structured-json extractor needs --extractor-output"
    );
}

#[test]
fn parse_missing_input_fails() {
    let dir = tempfile::tempdir().unwrap();
    let error = run_parse(
        &parse_args(dir.path().join("absent.txt")),
        &MedlabsConfig::default(),
    )
    .unwrap_err();
    assert!(error.to_string().starts_with("ingest "));

    let failure = error.downcast_ref::<StageFailure>().unwrap();
    let mut table = step_table(&failure.steps);
    table.force_no_tty();
    let rendered = table.to_string();
    assert!(rendered.contains("ingest"), "{rendered}");
    assert!(rendered.contains("error"), "{rendered}");
}

#[test]
fn validate_reads_panel_from_payload() {
    let result = run_validate(&validate_args(fixture_payload()), &MedlabsConfig::default()).unwrap();
    assert!(result.is_valid, "{:?}", result.issues);
    assert!(validation_summary(&result).starts_with("Validation: valid (0 errors, 0 warnings)"));
}

#[test]
fn validate_panel_flag_selects_schema() {
    let mut args = validate_args(fixture_payload());
    args.panel = Some("BIOCHEM".to_string());

    let result = run_validate(&args, &MedlabsConfig::default()).unwrap();
    assert!(!result.is_valid);
    assert!(
        result
            .issues
            .iter()
            .any(|issue| issue.path == "/panel_code/code")
    );
    let summary = validation_summary(&result);
    assert!(summary.starts_with("Validation: invalid"));
    assert!(summary.contains("/panel_code/code"));
}

#[test]
fn validate_without_panel_code_needs_a_hint() {
    let dir = tempfile::tempdir().unwrap();
    let payload = dir.path().join("payload.json");
    fs::write(&payload, r#"{"observations": []}"#).unwrap();

    let error = run_validate(&validate_args(payload), &MedlabsConfig::default()).unwrap_err();
    assert!(error.to_string().ends_with("has no panel_code.code; pass --panel or --schema"));
}

#[test]
fn validate_rejects_malformed_payload() {
    let dir = tempfile::tempdir().unwrap();
    let payload = dir.path().join("payload.json");
    fs::write(&payload, "{not json").unwrap();

    let error = run_validate(&validate_args(payload), &MedlabsConfig::default()).unwrap_err();
    assert!(error.to_string().starts_with("parse payload "));
}

#[test]
fn panels_table_lists_every_panel() {
    let mut table = run_panels();
    table.force_no_tty();
    let rendered = table.to_string();
    for needle in ["CBC", "BIOCHEM", "URINALYSIS", "urinalysis.json", "Schema (v0.1)"] {
        assert!(rendered.contains(needle), "missing {needle} in\n{rendered}");
    }
}

#[test]
fn parse_headline_describes_run() {
    let result = LabPipeline::default()
        .run_text(CBC_REPORT, "CBC", Metadata::new())
        .unwrap();

    insta::assert_snapshot!(parse_headline(&result), @r###"
    Panel: CBC (Complete Blood Count)
    Source: inline-text
    Observations: 2 of 2 extracted fields
    Validation: valid (0 errors, 0 warnings)
    "###);

    let summary = parse_summary(&result);
    for needle in ["6690-2", "718-7", "4-10", "normal", "validate"] {
        assert!(summary.contains(needle), "missing {needle} in\n{summary}");
    }
}
