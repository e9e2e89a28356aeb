//! Resolution of canonical codes that mean different analytes per specimen.
//!
//! A generic `leukocytes` may be a blood count or a urine sediment count.
//! The unit decides first; the target panel decides when the unit is silent.

/// `(code, unit) -> resolved` decision row.
#[derive(Debug, Clone, Copy)]
struct UnitRule {
    code: &'static str,
    units: &'static [&'static str],
    resolved: &'static str,
}

const BLOOD_COUNT_UNITS: &[&str] = &["10*9/L"];
const RED_COUNT_UNITS: &[&str] = &["10*12/L"];
const SEDIMENT_UNITS: &[&str] = &["{cells}/uL", "{cells}/[HPF]"];

/// Checked in order; the first matching row wins.
const UNIT_RULES: &[UnitRule] = &[
    UnitRule {
        code: "leukocytes",
        units: BLOOD_COUNT_UNITS,
        resolved: "wbc",
    },
    UnitRule {
        code: "leukocytes",
        units: SEDIMENT_UNITS,
        resolved: "urine_leukocytes",
    },
    UnitRule {
        code: "erythrocytes",
        units: RED_COUNT_UNITS,
        resolved: "rbc",
    },
    UnitRule {
        code: "erythrocytes",
        units: SEDIMENT_UNITS,
        resolved: "urine_erythrocytes",
    },
];

/// `(panel, code) -> resolved` for generic codes with no telling unit.
const PANEL_ALIASES: &[(&str, &str, &str)] = &[
    ("CBC", "leukocytes", "wbc"),
    ("CBC", "erythrocytes", "rbc"),
    ("BIOCHEM", "protein", "total_protein"),
    ("BIOCHEM", "bilirubin", "total_bilirubin"),
    ("URINALYSIS", "leukocytes", "urine_leukocytes"),
    ("URINALYSIS", "erythrocytes", "urine_erythrocytes"),
    ("URINALYSIS", "protein", "urine_protein"),
    ("URINALYSIS", "glucose", "urine_glucose"),
    ("URINALYSIS", "bilirubin", "urine_bilirubin"),
];

/// Resolves `code` using its canonical `unit`, then the target panel.
///
/// Codes that no rule covers come back unchanged.
pub fn resolve_code<'a>(code: &'a str, unit: &str, panel_code: &str) -> &'a str {
    let by_unit = UNIT_RULES
        .iter()
        .find(|rule| rule.code == code && rule.units.iter().any(|candidate| *candidate == unit))
        .map(|rule| rule.resolved);
    if let Some(resolved) = by_unit {
        return resolved;
    }

    PANEL_ALIASES
        .iter()
        .find(|(panel, generic, _)| *panel == panel_code && *generic == code)
        .map_or(code, |(_, _, resolved)| *resolved)
}
