//! Plain-text document ingestion.

use std::path::Path;

use medlabs_model::RawDocument;
use tracing::debug;

use crate::error::IngestError;

/// Page separator in text exports of paginated reports.
pub const PAGE_BREAK: char = '\u{000C}';

/// Source label for documents ingested from memory.
pub const INLINE_SOURCE: &str = "inline-text";

/// Turns plain text into a [`RawDocument`], one page per form-feed segment.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextIngestor;

impl TextIngestor {
    pub fn new() -> Self {
        Self
    }

    pub fn ingest(&self, text: &str) -> RawDocument {
        let mut document = RawDocument::new(text).with_source(INLINE_SOURCE);
        document.pages = split_pages(text);
        debug!(pages = document.pages.len(), text_size = text.len(), "ingested text");
        document
    }

    /// Reads a UTF-8 text file and records its path as the document source.
    pub fn ingest_file(&self, path: &Path) -> Result<RawDocument, IngestError> {
        let text = std::fs::read_to_string(path).map_err(|source| IngestError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let mut document = self.ingest(&text);
        document.source = path.display().to_string();
        Ok(document)
    }
}

/// Splits on form feeds. A trailing form feed does not open an empty page.
fn split_pages(text: &str) -> Vec<String> {
    let body = text.strip_suffix(PAGE_BREAK).unwrap_or(text);
    body.split(PAGE_BREAK).map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_without_form_feed_is_one_page() {
        assert_eq!(split_pages("WBC 5.4"), vec!["WBC 5.4"]);
        assert_eq!(split_pages(""), vec![""]);
    }

    #[test]
    fn trailing_form_feed_is_ignored() {
        assert_eq!(split_pages("a\u{000C}b\u{000C}"), vec!["a", "b"]);
    }
}
