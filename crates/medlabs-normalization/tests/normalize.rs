//! Tests for report normalization.

use medlabs_model::{ExtractedField, ExtractedReport, ObservationValue, RawDocument};
use medlabs_normalization::normalize;

fn report(fields: Vec<ExtractedField>) -> ExtractedReport {
    ExtractedReport::new(RawDocument::new("lab text"), fields)
}

#[test]
fn normalize_cbc_field() {
    let field = ExtractedField::new("WBC", "5,4")
        .with_unit("x10^9/L")
        .with_reference("4,0-10,0")
        .with_confidence(0.9)
        .with_evidence("line", 3)
        .with_flags("N");
    let normalized = normalize(&report(vec![field]));

    assert!(normalized.warnings.is_empty());
    assert_eq!(normalized.observations.len(), 1);
    let observation = &normalized.observations[0];
    assert_eq!(observation.code, "wbc");
    assert_eq!(observation.value, ObservationValue::Number(5.4));
    assert_eq!(observation.unit, "10*9/L");
    assert_eq!(observation.ref_low, Some(4.0));
    assert_eq!(observation.ref_high, Some(10.0));
    assert_eq!(observation.source_name, "WBC");
    assert_eq!(observation.confidence, 0.9);
    assert_eq!(observation.evidence["line"], 3);
    assert_eq!(observation.flags_raw, "N");
}

#[test]
fn normalize_keeps_text_values() {
    let normalized = normalize(&report(vec![
        ExtractedField::new("Nitrite", " negative "),
        ExtractedField::new("Белок", "не обнаружен"),
    ]));

    let values: Vec<_> = normalized
        .observations
        .iter()
        .map(|observation| observation.value.clone())
        .collect();
    assert_eq!(
        values,
        vec![
            ObservationValue::Text("negative".to_string()),
            ObservationValue::Text("не обнаружен".to_string()),
        ]
    );
}

#[test]
fn normalize_range_shaped_value_stays_text() {
    let normalized = normalize(&report(vec![ExtractedField::new("Epithelium", "2-4")]));
    assert_eq!(
        normalized.observations[0].value,
        ObservationValue::Text("2-4".to_string())
    );
}

#[test]
fn normalize_skips_empty_names_and_flags_bad_ranges() {
    let mut input = report(vec![
        ExtractedField::new("Hemoglobin", "140").with_reference("see note"),
        ExtractedField::new("  ", "12"),
        ExtractedField::new("Glucose", "5.1").with_unit("mmol/l"),
    ]);
    input.warnings.push("Extractor output truncated".to_string());

    let normalized = normalize(&input);

    let codes: Vec<_> = normalized
        .observations
        .iter()
        .map(|observation| observation.code.as_str())
        .collect();
    assert_eq!(codes, vec!["hemoglobin", "glucose"]);
    assert_eq!(normalized.observations[0].ref_low, None);
    assert_eq!(normalized.observations[0].ref_high, None);
    insta::assert_debug_snapshot!(normalized.warnings, @r###"
    [
        "Extractor output truncated",
        "Field 'Hemoglobin' has unparsed reference range",
        "Field 1 has empty name",
    ]
    "###);
}

#[test]
fn normalize_preserves_document_and_meta() {
    let mut input = report(vec![ExtractedField::new("ALT", "31")]);
    input.meta.insert("extractor".to_string(), "regex".into());

    let normalized = normalize(&input);

    assert_eq!(normalized.document.text, "lab text");
    assert_eq!(normalized.meta["extractor"], "regex");
}

#[test]
fn normalize_overflowing_value_stays_text() {
    let digits = "9".repeat(400);
    let field = ExtractedField::new("WBC", digits.as_str()).with_unit("10^9/L");
    let normalized = normalize(&report(vec![field]));

    assert_eq!(
        normalized.observations[0].value,
        ObservationValue::Text(digits)
    );
}
