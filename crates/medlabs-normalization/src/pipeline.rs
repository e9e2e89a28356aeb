//! Field-by-field normalization of an extracted report.

use medlabs_model::{
    ExtractedField, ExtractedReport, NormalizedObservation, NormalizedReport, ObservationValue,
};
use tracing::{debug, warn};

use crate::names::canonicalize_name;
use crate::numeric::{parse_number, parse_range};
use crate::units::normalize_unit;

/// Normalizes every extracted field into a typed observation.
///
/// No field failure is fatal. Fields without a usable name are skipped with
/// a warning; unparseable values are kept as trimmed text; unparseable
/// reference ranges leave both bounds empty and add a warning. Input
/// warnings are carried forward ahead of the new ones.
pub fn normalize(report: &ExtractedReport) -> NormalizedReport {
    let mut warnings = report.warnings.clone();
    let mut observations = Vec::with_capacity(report.fields.len());

    for (index, field) in report.fields.iter().enumerate() {
        match normalize_field(field) {
            Some((observation, range_parsed)) => {
                if !range_parsed {
                    warn!(field_index = index, code = %observation.code, "unparsed reference range");
                    warnings.push(format!(
                        "Field '{}' has unparsed reference range",
                        field.name_raw
                    ));
                }
                debug!(
                    field_index = index,
                    code = %observation.code,
                    unit = %observation.unit,
                    numeric = observation.value.is_number(),
                    "normalized field"
                );
                observations.push(observation);
            }
            None => {
                warn!(field_index = index, "field has empty name");
                warnings.push(format!("Field {index} has empty name"));
            }
        }
    }

    NormalizedReport {
        document: report.document.clone(),
        observations,
        warnings,
        meta: report.meta.clone(),
    }
}

/// Returns the observation and whether a non-empty reference text parsed.
fn normalize_field(field: &ExtractedField) -> Option<(NormalizedObservation, bool)> {
    let code = canonicalize_name(&field.name_raw);
    if code.is_empty() {
        return None;
    }

    let value = match parse_number(&field.value_raw) {
        Some(number) => ObservationValue::Number(number),
        None => ObservationValue::Text(field.value_raw.trim().to_string()),
    };

    let (ref_low, ref_high) = parse_range(&field.ref_raw);
    let range_parsed =
        field.ref_raw.trim().is_empty() || ref_low.is_some() || ref_high.is_some();

    let observation = NormalizedObservation {
        code,
        value,
        unit: normalize_unit(&field.unit_raw),
        ref_low,
        ref_high,
        source_name: field.name_raw.clone(),
        confidence: field.confidence,
        evidence: field.evidence.clone(),
        flags_raw: field.flags_raw.clone(),
    };
    Some((observation, range_parsed))
}
