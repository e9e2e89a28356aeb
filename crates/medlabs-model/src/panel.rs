//! Canonical panel payload: the schema-validated output artifact.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Unit system written into every quantity.
pub const UCUM: &str = "UCUM";

/// Status written into panels and observations.
pub const STATUS_FINAL: &str = "final";

/// A `{system, code, display}` triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coding {
    pub system: String,
    pub code: String,
    pub display: String,
}

impl Coding {
    pub fn new(
        system: impl Into<String>,
        code: impl Into<String>,
        display: impl Into<String>,
    ) -> Self {
        Self {
            system: system.into(),
            code: code.into(),
            display: display.into(),
        }
    }
}

/// A numeric value with its unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    pub value: f64,
    pub unit_code: String,
    pub unit_system: String,
    pub unit_display: String,
}

/// Observation value as it appears in the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PayloadValue {
    Quantity(Quantity),
    Boolean(bool),
    Text(String),
    Missing,
}

impl PayloadValue {
    pub fn as_quantity(&self) -> Option<&Quantity> {
        match self {
            Self::Quantity(quantity) => Some(quantity),
            _ => None,
        }
    }
}

/// Reference range mirrored with the same quantity shape as the value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low: Option<Quantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<Quantity>,
}

/// Low/normal/high reading of a numeric value against its range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpretation {
    Low,
    Normal,
    High,
    Unknown,
}

impl Interpretation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
            Self::Unknown => "unknown",
        }
    }
}

/// Provenance block shared by panels and observations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceTrace {
    pub document_id: String,
    pub lab_name: String,
    /// `YYYY-MM-DD`.
    pub report_date: String,
    pub raw_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationPayload {
    pub id: String,
    pub resource_type: String,
    pub code: Coding,
    pub value: PayloadValue,
    pub interpretation: Interpretation,
    pub status: String,
    pub source: SourceTrace,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_range: Option<ReferenceRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelPayload {
    pub id: String,
    pub resource_type: String,
    pub standard_version: String,
    pub panel_code: Coding,
    pub panel_name: String,
    pub status: String,
    pub observations: Vec<ObservationPayload>,
    pub source: SourceTrace,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collected_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reported_at: Option<String>,
}

/// Mapper output: the payload plus accumulated warnings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardPanel {
    pub data: PanelPayload,
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl StandardPanel {
    pub fn panel_code(&self) -> &str {
        &self.data.panel_code.code
    }

    /// Renders the payload as a JSON document for validation or transport.
    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(&self.data)
    }
}
