use std::path::Path;

use medlabs_model::{Evidence, ExtractedField, ExtractedReport, RawDocument};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

use super::Extractor;
use crate::error::ExtractError;

pub const DEFAULT_PROMPT_NAME: &str = "lab_extraction";
pub const DEFAULT_PROMPT_VERSION: &str = "v1";

/// One structured-output call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructuredRequest {
    pub prompt_name: String,
    pub prompt_version: String,
    pub input_text: String,
    pub output_schema: Value,
    pub temperature: f64,
}

/// A model client that answers with JSON matching a requested schema.
pub trait LlmClient: Send + Sync {
    /// # Errors
    ///
    /// Returns [`ExtractError::Client`] when the call fails.
    fn extract_structured(&self, request: &StructuredRequest) -> Result<Value, ExtractError>;
}

/// Shape every structured extraction is asked to produce.
pub fn extraction_output_schema() -> Value {
    json!({
        "type": "object",
        "required": ["fields"],
        "properties": {
            "fields": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["name_raw", "value_raw"],
                    "properties": {
                        "name_raw": {"type": "string"},
                        "value_raw": {"type": "string"},
                        "unit_raw": {"type": "string"},
                        "ref_raw": {"type": "string"},
                        "flags_raw": {"type": "string"},
                        "confidence": {"type": "number", "minimum": 0.0, "maximum": 1.0},
                        "evidence": {"type": "object"}
                    },
                    "additionalProperties": true
                }
            }
        },
        "additionalProperties": true
    })
}

/// Extractor backed by an [`LlmClient`].
#[derive(Debug, Clone)]
pub struct StructuredExtractor<C> {
    client: C,
    prompt_name: String,
    prompt_version: String,
    temperature: f64,
}

impl<C: LlmClient> StructuredExtractor<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            prompt_name: DEFAULT_PROMPT_NAME.to_string(),
            prompt_version: DEFAULT_PROMPT_VERSION.to_string(),
            temperature: 0.0,
        }
    }

    #[must_use]
    pub fn with_prompt(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.prompt_name = name.into();
        self.prompt_version = version.into();
        self
    }

    pub fn prompt_name(&self) -> &str {
        &self.prompt_name
    }

    pub fn prompt_version(&self) -> &str {
        &self.prompt_version
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    fn request(&self, document: &RawDocument) -> StructuredRequest {
        StructuredRequest {
            prompt_name: self.prompt_name.clone(),
            prompt_version: self.prompt_version.clone(),
            input_text: document.text.clone(),
            output_schema: extraction_output_schema(),
            temperature: self.temperature,
        }
    }
}

impl<C: LlmClient> Extractor for StructuredExtractor<C> {
    fn name(&self) -> &'static str {
        "structured"
    }

    fn extract(&self, document: &RawDocument) -> Result<ExtractedReport, ExtractError> {
        let output = self.client.extract_structured(&self.request(document))?;
        if !output.is_object() {
            return Err(ExtractError::InvalidOutput {
                kind: json_kind(&output),
            });
        }

        let (fields, warnings) = fields_from_output(&output);
        debug!(
            prompt_name = %self.prompt_name,
            prompt_version = %self.prompt_version,
            fields = fields.len(),
            warnings = warnings.len(),
            "structured extraction finished"
        );

        let mut report = ExtractedReport::new(document.clone(), fields);
        report.warnings = warnings;
        report
            .meta
            .insert("prompt_name".to_string(), Value::from(self.prompt_name.as_str()));
        report.meta.insert(
            "prompt_version".to_string(),
            Value::from(self.prompt_version.as_str()),
        );
        Ok(report)
    }
}

/// Reads the `fields` array of a structured output.
///
/// Invalid items are skipped with a warning naming their index; a missing
/// `fields` key yields no fields and no warning.
pub fn fields_from_output(output: &Value) -> (Vec<ExtractedField>, Vec<String>) {
    let mut warnings = Vec::new();
    let items: &[Value] = match output.get("fields") {
        None => &[],
        Some(Value::Array(items)) => items.as_slice(),
        Some(_) => {
            warnings.push("Extractor output has invalid fields format".to_string());
            &[]
        }
    };

    let mut fields = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let Some(item) = item.as_object() else {
            warnings.push(format!("fields[{index}] is not an object"));
            continue;
        };

        let text = |key: &str| item.get(key).map(scalar_text).unwrap_or_default();
        let name_raw = text("name_raw");
        let value_raw = text("value_raw");
        if name_raw.is_empty() || value_raw.is_empty() {
            warnings.push(format!("fields[{index}] is missing name_raw or value_raw"));
            continue;
        }

        let evidence = item
            .get("evidence")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_else(Evidence::new);

        fields.push(ExtractedField {
            unit_raw: text("unit_raw"),
            ref_raw: text("ref_raw"),
            flags_raw: text("flags_raw"),
            evidence,
            confidence: unit_interval(item.get("confidence")),
            ..ExtractedField::new(name_raw, value_raw)
        });
    }

    if !warnings.is_empty() {
        warn!(count = warnings.len(), "structured output had invalid fields");
    }
    (fields, warnings)
}

/// Replays a stored structured output instead of calling a model.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonOutputClient {
    output: Value,
}

impl JsonOutputClient {
    pub fn new(output: Value) -> Self {
        Self { output }
    }

    pub fn from_path(path: &Path) -> Result<Self, ExtractError> {
        let text = std::fs::read_to_string(path).map_err(|source| ExtractError::OutputRead {
            path: path.to_path_buf(),
            source,
        })?;
        let output = serde_json::from_str(&text).map_err(|source| ExtractError::OutputParse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(output))
    }
}

impl LlmClient for JsonOutputClient {
    fn extract_structured(&self, request: &StructuredRequest) -> Result<Value, ExtractError> {
        debug!(prompt_name = %request.prompt_name, "replaying stored extractor output");
        Ok(self.output.clone())
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.trim().to_string(),
        other => other.to_string().trim().to_string(),
    }
}

/// Coerces to a number in `[0, 1]`; anything unparseable becomes 0.
fn unit_interval(value: Option<&Value>) -> f64 {
    let number = match value {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text.trim().parse::<f64>().ok(),
        Some(Value::Bool(flag)) => Some(if *flag { 1.0 } else { 0.0 }),
        _ => None,
    };
    match number {
        Some(number) if !number.is_nan() => number.clamp(0.0, 1.0),
        _ => 0.0,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
