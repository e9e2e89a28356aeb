use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Open key/value bag carried alongside documents and reports.
pub type Metadata = serde_json::Map<String, Value>;

/// A source document after ingestion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDocument {
    /// Full document text.
    pub text: String,
    /// Per-page text, when the source has page boundaries.
    #[serde(default)]
    pub pages: Vec<String>,
    /// Where the document came from (file path, URL, or empty).
    #[serde(default)]
    pub source: String,
    /// Document metadata such as `document_id`, `lab_name`, `report_date`.
    #[serde(default)]
    pub meta: Metadata,
}

impl RawDocument {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            pages: vec![text.clone()],
            text,
            source: String::new(),
            meta: Metadata::new(),
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    #[must_use]
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }
}
