use serde::{Deserialize, Serialize};

use crate::document::{Metadata, RawDocument};
use crate::extraction::Evidence;

/// Value of a normalized observation.
///
/// Numeric results are parsed; textual results ("negative", "не обнаружен")
/// are kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ObservationValue {
    Number(f64),
    Boolean(bool),
    Text(String),
    #[default]
    Missing,
}

impl ObservationValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Self::Number(_))
    }
}

impl From<f64> for ObservationValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for ObservationValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<bool> for ObservationValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

/// A typed observation with canonical code and unit.
///
/// `ref_low <= ref_high` is expected but not enforced here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedObservation {
    /// Canonical snake_case analyte code.
    pub code: String,
    pub value: ObservationValue,
    /// Canonical unit code; empty when the source had no unit.
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub ref_low: Option<f64>,
    #[serde(default)]
    pub ref_high: Option<f64>,
    /// Original raw label.
    #[serde(default)]
    pub source_name: String,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub evidence: Evidence,
    #[serde(default)]
    pub flags_raw: String,
}

impl NormalizedObservation {
    pub fn new(code: impl Into<String>, value: impl Into<ObservationValue>) -> Self {
        Self {
            code: code.into(),
            value: value.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    #[must_use]
    pub fn with_range(mut self, low: Option<f64>, high: Option<f64>) -> Self {
        self.ref_low = low;
        self.ref_high = high;
        self
    }

    #[must_use]
    pub fn with_source_name(mut self, source_name: impl Into<String>) -> Self {
        self.source_name = source_name.into();
        self
    }
}

/// Output of one normalization run; observation order mirrors field order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedReport {
    pub document: RawDocument,
    #[serde(default)]
    pub observations: Vec<NormalizedObservation>,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub meta: Metadata,
}
