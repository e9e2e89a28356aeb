//! Panel payload validation.
//!
//! Two independent checks feed one verdict: the JSON-Schema structural check
//! (`checks::structural`) and the cross-field rule check (`checks::rules`).
//! Schema infrastructure failures never escape; they become a single
//! root-level error issue.

pub mod checks;
pub mod error;
pub mod schema;

pub use error::SchemaError;
pub use schema::{SCHEMA_VERSION, SchemaReference, SchemaStore, schema_file_for_panel};

use medlabs_model::{ValidationIssue, ValidationResult};
use serde_json::Value;
use tracing::{debug, warn};

/// Validates payloads against schemas from one [`SchemaStore`].
#[derive(Debug, Clone, Default)]
pub struct PayloadValidator {
    store: SchemaStore,
}

impl PayloadValidator {
    pub fn new(store: SchemaStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &SchemaStore {
        &self.store
    }

    /// Runs the structural and rule checks and merges their issues.
    ///
    /// Structural issues come first, sorted by location; rule issues follow
    /// in observation order.
    pub fn validate(&self, payload: &Value, reference: &SchemaReference) -> ValidationResult {
        let mut issues = match self.store.compile(reference) {
            Ok(validator) => checks::structural::check(&validator, payload),
            Err(error) => {
                warn!(error = %error, "schema validation could not run");
                vec![ValidationIssue::error(
                    "/",
                    format!("Schema validation failed to run: {error}"),
                )]
            }
        };
        let structural = issues.len();
        issues.extend(checks::rules::check(payload));

        let result = ValidationResult::from_issues(issues);
        debug!(
            structural,
            rules = result.issues.len() - structural,
            errors = result.error_count(),
            warnings = result.warning_count(),
            "validated payload"
        );
        result
    }
}

/// Validates against the embedded schemas.
pub fn validate_payload(payload: &Value, reference: &SchemaReference) -> ValidationResult {
    PayloadValidator::default().validate(payload, reference)
}
