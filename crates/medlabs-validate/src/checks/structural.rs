//! JSON-Schema structural check.

use jsonschema::Validator;
use jsonschema::paths::LocationSegment;
use medlabs_model::ValidationIssue;
use serde_json::Value;

/// Orders instance locations segment by segment, array indices numerically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum PathKey {
    Index(usize),
    Property(String),
}

/// Reports every schema violation as an error, sorted by instance location.
///
/// The document root is reported as `/`.
pub fn check(validator: &Validator, payload: &Value) -> Vec<ValidationIssue> {
    let mut found: Vec<(Vec<PathKey>, ValidationIssue)> = validator
        .iter_errors(payload)
        .map(|error| {
            let location = error.instance_path();
            let key = location
                .iter()
                .map(|segment| match segment {
                    LocationSegment::Index(index) => PathKey::Index(index),
                    LocationSegment::Property(name) => PathKey::Property(name.into_owned()),
                })
                .collect();
            let pointer = location.as_str();
            let path = if pointer.is_empty() { "/" } else { pointer };
            (key, ValidationIssue::error(path, error.to_string()))
        })
        .collect();

    found.sort_by(|(left, _), (right, _)| left.cmp(right));
    found.into_iter().map(|(_, issue)| issue).collect()
}
