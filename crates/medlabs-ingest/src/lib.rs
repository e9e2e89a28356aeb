//! Document ingestion and raw field extraction for lab reports.

pub mod error;
pub mod extract;
pub mod text;

pub use error::{ExtractError, IngestError};
pub use extract::{
    DEFAULT_PROMPT_NAME, DEFAULT_PROMPT_VERSION, Extractor, JsonOutputClient, LlmClient,
    REGEX_CONFIDENCE, RegexExtractor, StructuredExtractor, StructuredRequest,
    extraction_output_schema, fields_from_output,
};
pub use text::{INLINE_SOURCE, PAGE_BREAK, TextIngestor};
