use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use comfy_table::Table;
use medlabs_core::{LabPipeline, PipelineResult};
use medlabs_ingest::{Extractor, JsonOutputClient, RegexExtractor, StructuredExtractor};
use medlabs_map::PANELS;
use medlabs_model::{Metadata, PayloadValue, ValidationResult};
use medlabs_validate::{
    PayloadValidator, SCHEMA_VERSION, SchemaReference, SchemaStore, schema_file_for_panel,
};
use serde_json::Value;
use tracing::{info, info_span, trace};

use crate::cli::{ParseArgs, ValidateArgs};
use crate::config::{ExtractorKind, MedlabsConfig};
use crate::logging::redact_value;
use crate::summary::{apply_table_style, header_cell};

/// Runs the pipeline on one report and writes the payload JSON.
///
/// The payload goes to `--output` when given, otherwise to stdout.
pub fn run_parse(args: &ParseArgs, config: &MedlabsConfig) -> Result<PipelineResult> {
    let panel = args.panel.as_deref().unwrap_or(&config.panel);
    let parse_span = info_span!(
        "parse",
        input = %args.input.display(),
        panel = %panel
    );
    let _parse_guard = parse_span.enter();

    let kind = args.extractor.map_or(config.extractor, ExtractorKind::from);
    let mut builder = LabPipeline::builder()
        .boxed_extractor(build_extractor(kind, args.extractor_output.as_deref())?)
        .validator(payload_validator(args.schema_dir.as_deref(), config))
        .standard_version(
            args.standard_version
                .clone()
                .unwrap_or_else(|| config.standard_version.clone()),
        );
    if let Some(schema) = &args.schema {
        builder = builder.schema_path(schema);
    }
    let pipeline = builder.build();

    let result = pipeline.run_file(&args.input, panel, meta_from_pairs(&args.meta))?;
    for observation in &result.mapped.data.observations {
        trace!(
            code = %observation.code.code,
            value = %redact_value(&render_value(&observation.value)),
            "mapped observation"
        );
    }

    let json = serde_json::to_string_pretty(&result.mapped.data).context("serialize payload")?;
    match &args.output {
        Some(path) => {
            fs::write(path, format!("{json}\n"))
                .with_context(|| format!("write payload {}", path.display()))?;
            info!(output = %path.display(), "payload written");
        }
        None => println!("{json}"),
    }
    Ok(result)
}

/// Validates a stored payload file.
pub fn run_validate(args: &ValidateArgs, config: &MedlabsConfig) -> Result<ValidationResult> {
    let text = fs::read_to_string(&args.payload)
        .with_context(|| format!("read payload {}", args.payload.display()))?;
    let payload: Value = serde_json::from_str(&text)
        .with_context(|| format!("parse payload {}", args.payload.display()))?;

    let reference = match (&args.schema, &args.panel) {
        (Some(schema), _) => SchemaReference::path(schema),
        (None, Some(panel)) => SchemaReference::panel(panel),
        (None, None) => match payload_panel_code(&payload) {
            Some(code) => SchemaReference::panel(code),
            None => bail!(
                "payload {} has no panel_code.code; pass --panel or --schema",
                args.payload.display()
            ),
        },
    };

    let validator = payload_validator(args.schema_dir.as_deref(), config);
    let result = info_span!("validate", payload = %args.payload.display())
        .in_scope(|| validator.validate(&payload, &reference));
    info!(
        errors = result.error_count(),
        warnings = result.warning_count(),
        "validation complete"
    );
    Ok(result)
}

/// Table of known panels and their schema files.
pub fn run_panels() -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Code"),
        header_cell("Name"),
        header_cell("Observations"),
        header_cell(&format!("Schema ({SCHEMA_VERSION})")),
    ]);
    apply_table_style(&mut table);
    for panel in PANELS {
        let schema = schema_file_for_panel(panel.code).unwrap_or("-");
        table.add_row(vec![
            panel.code.to_string(),
            panel.display.to_string(),
            panel.allowed.len().to_string(),
            schema.to_string(),
        ]);
    }
    table
}

fn build_extractor(kind: ExtractorKind, output: Option<&Path>) -> Result<Box<dyn Extractor>> {
    match kind {
        ExtractorKind::Regex => Ok(Box::new(RegexExtractor::new())),
        ExtractorKind::StructuredJson => {
            let path = output
                .context("the structured-json extractor needs --extractor-output")?;
            let client = JsonOutputClient::from_path(path)?;
            Ok(Box::new(StructuredExtractor::new(client)))
        }
    }
}

fn payload_validator(schema_dir: Option<&Path>, config: &MedlabsConfig) -> PayloadValidator {
    let dir: Option<PathBuf> = schema_dir
        .map(Path::to_path_buf)
        .or_else(|| config.schema_dir.clone());
    match dir {
        Some(dir) => PayloadValidator::new(SchemaStore::from_dir(dir)),
        None => PayloadValidator::default(),
    }
}

/// Document metadata from `--meta key=value` pairs; later keys win.
pub fn meta_from_pairs(pairs: &[(String, String)]) -> Metadata {
    pairs
        .iter()
        .map(|(key, value)| (key.clone(), Value::from(value.as_str())))
        .collect()
}

fn payload_panel_code(payload: &Value) -> Option<&str> {
    payload
        .pointer("/panel_code/code")
        .and_then(Value::as_str)
        .filter(|code| !code.trim().is_empty())
}

/// Human-readable rendering of an observation value.
pub fn render_value(value: &PayloadValue) -> String {
    match value {
        PayloadValue::Quantity(quantity) => quantity.value.to_string(),
        PayloadValue::Boolean(flag) => flag.to_string(),
        PayloadValue::Text(text) => text.clone(),
        PayloadValue::Missing => "-".to_string(),
    }
}
