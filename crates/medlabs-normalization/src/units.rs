//! Unit spelling normalization and display rendering.
//!
//! Canonical codes follow UCUM spelling (`10*9/L`, `umol/L`, `{cells}/uL`).
//! Normalization only rewrites spellings of the same unit; it never converts
//! between units of different magnitude.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Lookup key -> canonical unit code.
///
/// Every canonical code also appears as its own key, so normalizing twice
/// yields the same code.
static UNIT_ALIASES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    for alias in [
        "10*9/l", "10^9/l", "x10^9/l", "x10*9/l", "10e9/l", "x10e9/l", "10⁹/l", "x10⁹/l",
        "x10^9/л", "10^9/л", "10⁹/л", "x10⁹/л", "гига/л", "10^3/ul", "10*3/ul", "x10^3/ul",
        "k/ul", "тыс/мкл", "тыс/ul",
    ] {
        map.insert(alias, "10*9/L");
    }
    for alias in [
        "10*12/l", "10^12/l", "x10^12/l", "x10*12/l", "10e12/l", "x10e12/l", "10¹²/l",
        "x10¹²/l", "x10^12/л", "10^12/л", "10¹²/л", "x10¹²/л", "тера/л", "10^6/ul",
        "10*6/ul", "x10^6/ul", "m/ul", "млн/мкл", "млн/ul",
    ] {
        map.insert(alias, "10*12/L");
    }

    for (alias, code) in [
        ("g/l", "g/L"),
        ("г/л", "g/L"),
        ("g/dl", "g/dL"),
        ("г/дл", "g/dL"),
        ("mg/dl", "mg/dL"),
        ("мг/дл", "mg/dL"),
        ("mg/l", "mg/L"),
        ("мг/л", "mg/L"),
        ("mmol/l", "mmol/L"),
        ("ммоль/л", "mmol/L"),
        ("umol/l", "umol/L"),
        ("mcmol/l", "umol/L"),
        ("мкмоль/л", "umol/L"),
        ("u/l", "U/L"),
        ("iu/l", "U/L"),
        ("ед/л", "U/L"),
        ("ме/л", "U/L"),
        ("fl", "fL"),
        ("фл", "fL"),
        ("um3", "fL"),
        ("pg", "pg"),
        ("пг", "pg"),
        ("%", "%"),
        ("percent", "%"),
        ("pct", "%"),
        ("1", "1"),
        ("unitless", "1"),
        ("mm/h", "mm/h"),
        ("mm/hr", "mm/h"),
        ("mm/hour", "mm/h"),
        ("мм/ч", "mm/h"),
        ("мм/час", "mm/h"),
    ] {
        map.insert(alias, code);
    }

    for alias in [
        "{cells}/ul", "cells/ul", "cell/ul", "/ul", "кл/мкл", "/мкл", "вмкл", "клеток/мкл",
    ] {
        map.insert(alias, "{cells}/uL");
    }
    for alias in [
        "{cells}/[hpf]", "cells/hpf", "/hpf", "hpf", "вп/зр", "п/зр", "вполезрения",
    ] {
        map.insert(alias, "{cells}/[HPF]");
    }

    map
});

/// Human-facing rendering for codes whose UCUM spelling reads poorly.
static UNIT_DISPLAY: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("10*9/L", "10^9/L"),
        ("10*12/L", "10^12/L"),
        ("umol/L", "µmol/L"),
        ("{cells}/uL", "cells/µL"),
        ("{cells}/[HPF]", "cells/HPF"),
    ])
});

/// Maps a raw unit spelling to its canonical code.
///
/// Unknown units are returned trimmed but otherwise unchanged.
pub fn normalize_unit(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    UNIT_ALIASES
        .get(unit_key(trimmed).as_str())
        .map_or_else(|| trimmed.to_string(), |code| (*code).to_string())
}

/// Renders a canonical unit code for display.
pub fn unit_display(code: &str) -> String {
    UNIT_DISPLAY
        .get(code)
        .map_or_else(|| code.to_string(), |display| (*display).to_string())
}

/// Lowercases, drops whitespace, and maps micro and multiplication sign
/// variants to ASCII.
fn unit_key(raw: &str) -> String {
    raw.chars()
        .filter(|ch| !ch.is_whitespace())
        .flat_map(char::to_lowercase)
        .map(|ch| match ch {
            'µ' | 'μ' => 'u',
            '×' | 'х' => 'x',
            other => other,
        })
        .collect()
}
