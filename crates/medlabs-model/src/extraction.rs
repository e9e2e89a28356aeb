use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::{Metadata, RawDocument};

/// Provenance bag tying a value back to its source (page, line, raw text).
pub type Evidence = serde_json::Map<String, Value>;

/// One raw field guess produced by an extractor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedField {
    pub name_raw: String,
    pub value_raw: String,
    #[serde(default)]
    pub unit_raw: String,
    #[serde(default)]
    pub ref_raw: String,
    #[serde(default)]
    pub flags_raw: String,
    #[serde(default)]
    pub evidence: Evidence,
    /// Extractor confidence in `[0, 1]`.
    #[serde(default)]
    pub confidence: f64,
}

impl ExtractedField {
    pub fn new(name_raw: impl Into<String>, value_raw: impl Into<String>) -> Self {
        Self {
            name_raw: name_raw.into(),
            value_raw: value_raw.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_unit(mut self, unit_raw: impl Into<String>) -> Self {
        self.unit_raw = unit_raw.into();
        self
    }

    #[must_use]
    pub fn with_reference(mut self, ref_raw: impl Into<String>) -> Self {
        self.ref_raw = ref_raw.into();
        self
    }

    #[must_use]
    pub fn with_flags(mut self, flags_raw: impl Into<String>) -> Self {
        self.flags_raw = flags_raw.into();
        self
    }

    #[must_use]
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    #[must_use]
    pub fn with_evidence(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.evidence.insert(key.into(), value.into());
        self
    }
}

/// Output of one extraction run over a document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedReport {
    pub document: RawDocument,
    #[serde(default)]
    pub fields: Vec<ExtractedField>,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub meta: Metadata,
}

impl ExtractedReport {
    pub fn new(document: RawDocument, fields: Vec<ExtractedField>) -> Self {
        Self {
            document,
            fields,
            warnings: Vec::new(),
            meta: Metadata::new(),
        }
    }
}
