//! Cross-field rules the schema cannot express.
//!
//! Works on raw JSON so that payloads failing the structural check still get
//! rule findings.

use medlabs_model::{UCUM, ValidationIssue};
use serde_json::{Map, Value};

const BOUNDS: [&str; 2] = ["low", "high"];

/// Checks unit agreement between each quantity value and its range bounds.
pub fn check(payload: &Value) -> Vec<ValidationIssue> {
    let Some(observations) = payload.get("observations").and_then(Value::as_array) else {
        return vec![ValidationIssue::error(
            "/observations",
            "observations must be an array",
        )];
    };

    let mut issues = Vec::new();
    for (index, observation) in observations.iter().enumerate() {
        let prefix = format!("/observations/{index}");
        match observation.as_object() {
            Some(observation) => check_observation(observation, &prefix, &mut issues),
            None => issues.push(ValidationIssue::error(prefix, "observation must be an object")),
        }
    }
    issues
}

fn check_observation(observation: &Map<String, Value>, prefix: &str, issues: &mut Vec<ValidationIssue>) {
    let range = observation.get("reference_range").and_then(Value::as_object);

    let Some(value) = observation.get("value").and_then(Value::as_object) else {
        let has_quantity_bound = range.is_some_and(|range| {
            BOUNDS
                .iter()
                .any(|bound| range.get(*bound).is_some_and(Value::is_object))
        });
        if has_quantity_bound {
            issues.push(ValidationIssue::warning(
                format!("{prefix}/reference_range"),
                "reference_range with numeric bounds is ignored for non-quantity values",
            ));
        }
        return;
    };

    let unit_code = specified(value.get("unit_code"));
    let unit_system = specified(value.get("unit_system"));

    if unit_code.is_none() {
        issues.push(ValidationIssue::error(
            format!("{prefix}/value/unit_code"),
            "unit_code is required for quantity values",
        ));
    }
    if unit_system.is_some_and(|system| system.as_str() != Some(UCUM)) {
        issues.push(ValidationIssue::warning(
            format!("{prefix}/value/unit_system"),
            "unit_system should be UCUM",
        ));
    }

    let Some(range) = range else {
        return;
    };

    for bound_key in BOUNDS {
        let Some(bound) = range.get(bound_key).and_then(Value::as_object) else {
            continue;
        };
        if let (Some(expected), Some(actual)) = (unit_code, specified(bound.get("unit_code")))
            && expected != actual
        {
            issues.push(ValidationIssue::error(
                format!("{prefix}/reference_range/{bound_key}/unit_code"),
                "must match value.unit_code",
            ));
        }
        if let (Some(expected), Some(actual)) = (unit_system, specified(bound.get("unit_system")))
            && expected != actual
        {
            issues.push(ValidationIssue::error(
                format!("{prefix}/reference_range/{bound_key}/unit_system"),
                "must match value.unit_system",
            ));
        }
    }

    let bound_value = |key: &str| {
        range
            .get(key)
            .and_then(|bound| bound.get("value"))
            .and_then(Value::as_f64)
    };
    if let (Some(low), Some(high)) = (bound_value("low"), bound_value("high"))
        && low > high
    {
        issues.push(ValidationIssue::warning(
            format!("{prefix}/reference_range"),
            format!("reference_range low ({low}) is greater than high ({high})"),
        ));
    }
}

/// A field counts as specified unless it is absent, null or an empty string.
fn specified(value: Option<&Value>) -> Option<&Value> {
    value.filter(|value| match value {
        Value::Null => false,
        Value::String(text) => !text.is_empty(),
        _ => true,
    })
}
