//! Field extraction from ingested documents.
//!
//! An [`Extractor`] turns a [`RawDocument`] into raw field guesses. Two
//! implementations ship with the crate:
//!
//! - [`RegexExtractor`]: line-oriented pattern matching, no external calls
//! - [`StructuredExtractor`]: delegates to an [`LlmClient`] and checks the
//!   structured output field by field
//!
//! Field-level problems never fail an extraction; they are recorded as
//! report warnings and the offending field is skipped.

mod pattern;
mod structured;

pub use pattern::{REGEX_CONFIDENCE, RegexExtractor};
pub use structured::{
    DEFAULT_PROMPT_NAME, DEFAULT_PROMPT_VERSION, JsonOutputClient, LlmClient, StructuredExtractor,
    StructuredRequest, extraction_output_schema, fields_from_output,
};

use medlabs_model::{ExtractedReport, RawDocument};

use crate::error::ExtractError;

/// Produces raw field guesses from a document.
pub trait Extractor: Send + Sync {
    /// Short identifier used in logs (e.g. "regex").
    fn name(&self) -> &'static str;

    /// Extracts fields from `document`.
    ///
    /// # Errors
    ///
    /// Returns an error only when the extraction as a whole cannot run,
    /// such as a failing client or output that is not a JSON object.
    fn extract(&self, document: &RawDocument) -> Result<ExtractedReport, ExtractError>;
}

impl<E: Extractor + ?Sized> Extractor for Box<E> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn extract(&self, document: &RawDocument) -> Result<ExtractedReport, ExtractError> {
        (**self).extract(document)
    }
}
