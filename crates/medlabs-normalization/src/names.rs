//! Observation label canonicalization.
//!
//! Labels arrive in English or Russian, in any case, sometimes with a
//! Cyrillic letter typed inside a Latin abbreviation (or the reverse). The
//! label is folded to a lookup key, resolved through [`NAME_ALIASES`], and
//! otherwise tokenized into a locally-scoped snake_case code.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Alias table: folded label -> canonical code.
///
/// Keys are stored in folded form (see [`fold_label`]). Generic codes such
/// as `leukocytes`, `erythrocytes`, `protein` and `glucose` are resolved to a
/// specimen-specific code later, during panel mapping.
static NAME_ALIASES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    // Complete blood count
    for alias in ["wbc", "white blood cells", "white blood cell count", "leukocyte count"] {
        map.insert(alias, "wbc");
    }
    for alias in ["leukocytes", "leucocytes", "лейкоциты"] {
        map.insert(alias, "leukocytes");
    }
    for alias in ["rbc", "red blood cells", "red blood cell count", "erythrocyte count"] {
        map.insert(alias, "rbc");
    }
    for alias in ["erythrocytes", "эритроциты"] {
        map.insert(alias, "erythrocytes");
    }
    for alias in ["hemoglobin", "haemoglobin", "hgb", "hb", "гемоглобин"] {
        map.insert(alias, "hemoglobin");
    }
    for alias in ["hematocrit", "haematocrit", "hct", "гематокрит"] {
        map.insert(alias, "hematocrit");
    }
    for alias in ["platelets", "platelet count", "plt", "тромбоциты"] {
        map.insert(alias, "platelets");
    }
    for alias in ["mcv", "mean corpuscular volume", "средний объем эритроцита"] {
        map.insert(alias, "mcv");
    }
    for alias in [
        "mch",
        "mean corpuscular hemoglobin",
        "среднее содержание гемоглобина в эритроците",
    ] {
        map.insert(alias, "mch");
    }
    for alias in [
        "mchc",
        "mean corpuscular hemoglobin concentration",
        "средняя концентрация гемоглобина в эритроците",
    ] {
        map.insert(alias, "mchc");
    }
    for alias in ["rdw", "rdw cv", "red cell distribution width"] {
        map.insert(alias, "rdw");
    }
    for alias in [
        "esr",
        "erythrocyte sedimentation rate",
        "соэ",
        "скорость оседания эритроцитов",
    ] {
        map.insert(alias, "esr");
    }

    // Leukocyte differential, absolute counts and percentages
    let differential: [(&str, &[&str]); 5] = [
        ("neutrophils", &["neutrophils", "neu", "neut", "нейтрофилы"]),
        ("lymphocytes", &["lymphocytes", "lym", "lymph", "лимфоциты"]),
        ("monocytes", &["monocytes", "mon", "mono", "моноциты"]),
        ("eosinophils", &["eosinophils", "eos", "эозинофилы"]),
        ("basophils", &["basophils", "bas", "baso", "базофилы"]),
    ];
    for (code, aliases) in differential {
        for alias in aliases {
            map.insert(*alias, code);
        }
    }
    for (alias, code) in [
        ("neutrophils pct", "neutrophils_pct"),
        ("neu pct", "neutrophils_pct"),
        ("neut pct", "neutrophils_pct"),
        ("нейтрофилы pct", "neutrophils_pct"),
        ("lymphocytes pct", "lymphocytes_pct"),
        ("lym pct", "lymphocytes_pct"),
        ("лимфоциты pct", "lymphocytes_pct"),
        ("monocytes pct", "monocytes_pct"),
        ("mon pct", "monocytes_pct"),
        ("моноциты pct", "monocytes_pct"),
        ("eosinophils pct", "eosinophils_pct"),
        ("eos pct", "eosinophils_pct"),
        ("эозинофилы pct", "eosinophils_pct"),
        ("basophils pct", "basophils_pct"),
        ("bas pct", "basophils_pct"),
        ("базофилы pct", "basophils_pct"),
    ] {
        map.insert(alias, code);
    }

    // Biochemistry
    for alias in ["glucose", "glu", "blood glucose", "глюкоза"] {
        map.insert(alias, "glucose");
    }
    for alias in ["creatinine", "crea", "cre", "креатинин"] {
        map.insert(alias, "creatinine");
    }
    for alias in ["urea", "bun", "мочевина"] {
        map.insert(alias, "urea");
    }
    for alias in ["alt", "alat", "alanine aminotransferase", "алт", "аланинаминотрансфераза"] {
        map.insert(alias, "alt");
    }
    for alias in [
        "ast",
        "asat",
        "aspartate aminotransferase",
        "аст",
        "аспартатаминотрансфераза",
    ] {
        map.insert(alias, "ast");
    }
    for alias in ["protein", "белок"] {
        map.insert(alias, "protein");
    }
    for alias in ["total protein", "общий белок", "белок общий"] {
        map.insert(alias, "total_protein");
    }
    for alias in ["albumin", "alb", "альбумин"] {
        map.insert(alias, "albumin");
    }
    for alias in ["bilirubin", "билирубин"] {
        map.insert(alias, "bilirubin");
    }
    for alias in ["total bilirubin", "tbil", "общий билирубин", "билирубин общий"] {
        map.insert(alias, "total_bilirubin");
    }
    for alias in ["direct bilirubin", "dbil", "прямой билирубин", "билирубин прямой"] {
        map.insert(alias, "direct_bilirubin");
    }
    for alias in ["cholesterol", "chol", "total cholesterol", "холестерин", "холестерин общий"] {
        map.insert(alias, "cholesterol");
    }
    for alias in ["triglycerides", "tg", "trig", "триглицериды"] {
        map.insert(alias, "triglycerides");
    }
    for alias in ["alp", "alkaline phosphatase", "щелочная фосфатаза"] {
        map.insert(alias, "alp");
    }
    for alias in ["ggt", "gamma gt", "gamma glutamyl transferase", "ггт"] {
        map.insert(alias, "ggt");
    }
    for alias in ["crp", "c reactive protein", "срб", "с реактивный белок"] {
        map.insert(alias, "crp");
    }
    for alias in ["uric acid", "мочевая кислота"] {
        map.insert(alias, "uric_acid");
    }
    for alias in ["sodium", "na", "натрий"] {
        map.insert(alias, "sodium");
    }
    for alias in ["potassium", "k", "калий"] {
        map.insert(alias, "potassium");
    }

    // Urinalysis
    for alias in ["color", "colour", "цвет"] {
        map.insert(alias, "color");
    }
    for alias in ["appearance", "clarity", "прозрачность"] {
        map.insert(alias, "appearance");
    }
    for alias in [
        "specific gravity",
        "sg",
        "удельный вес",
        "относительная плотность",
    ] {
        map.insert(alias, "specific_gravity");
    }
    for alias in ["ph", "рн", "реакция"] {
        map.insert(alias, "ph");
    }
    for alias in ["ketones", "ket", "кетоны", "кетоновые тела"] {
        map.insert(alias, "ketones");
    }
    for alias in ["nitrite", "nitrites", "nit", "нитриты"] {
        map.insert(alias, "nitrite");
    }
    for alias in ["leukocyte esterase", "leu", "лейкоцитарная эстераза"] {
        map.insert(alias, "leukocyte_esterase");
    }
    for alias in ["urobilinogen", "ubg", "уробилиноген"] {
        map.insert(alias, "urobilinogen");
    }
    for alias in ["epithelial cells", "epithelium", "эпителий", "эпителий плоский"] {
        map.insert(alias, "epithelial_cells");
    }
    for alias in ["bacteria", "бактерии"] {
        map.insert(alias, "bacteria");
    }
    for alias in ["urine leukocytes", "лейкоциты в моче"] {
        map.insert(alias, "urine_leukocytes");
    }
    for alias in ["urine erythrocytes", "эритроциты в моче"] {
        map.insert(alias, "urine_erythrocytes");
    }
    for alias in ["urine protein", "белок в моче"] {
        map.insert(alias, "urine_protein");
    }
    for alias in ["urine glucose", "глюкоза в моче"] {
        map.insert(alias, "urine_glucose");
    }

    map
});

/// Cyrillic letters whose capital form is indistinguishable from a Latin one.
const HOMOGLYPHS: &[(char, char)] = &[
    ('а', 'a'),
    ('в', 'b'),
    ('е', 'e'),
    ('к', 'k'),
    ('м', 'm'),
    ('н', 'h'),
    ('о', 'o'),
    ('р', 'p'),
    ('с', 'c'),
    ('т', 't'),
    ('у', 'y'),
    ('х', 'x'),
];

/// Maps a raw observation label to its canonical snake_case code.
///
/// Returns an empty string when the label carries no letters or digits.
pub fn canonicalize_name(raw: &str) -> String {
    let key = fold_label(raw);
    if key.is_empty() {
        return String::new();
    }
    if let Some(code) = lookup(&key) {
        return code.to_string();
    }
    if let Some(code) = lookup_parenthesized(&key) {
        return code.to_string();
    }

    let code = synthesize_code(&key);
    lookup(&code.replace('_', " ")).map_or(code, str::to_string)
}

/// Folds a label into its alias-table key form.
///
/// Collapses whitespace, lowercases, unifies `ё` with `е`, and rewrites
/// homoglyphs inside each mixed-script alphabetic run toward the script of
/// that run's other letters (ties go to Latin).
pub fn fold_label(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let lowered: String = collapsed
        .chars()
        .flat_map(char::to_lowercase)
        .map(|ch| if ch == 'ё' { 'е' } else { ch })
        .collect();

    let mut folded = String::with_capacity(lowered.len());
    let mut run = String::new();
    for ch in lowered.chars() {
        if ch.is_alphabetic() {
            run.push(ch);
        } else {
            fold_run(&run, &mut folded);
            run.clear();
            folded.push(ch);
        }
    }
    fold_run(&run, &mut folded);
    folded
}

fn fold_run(run: &str, out: &mut String) {
    let mixed = run.chars().any(|ch| ch.is_ascii_alphabetic()) && run.chars().any(is_cyrillic);
    if !mixed {
        out.push_str(run);
        return;
    }

    // Homoglyphs are ambiguous, so only the remaining letters vote.
    let distinct = run.chars().filter(|ch| !is_homoglyph(*ch));
    let (latin, cyrillic) = distinct.fold((0usize, 0usize), |(latin, cyrillic), ch| {
        (
            latin + usize::from(ch.is_ascii_alphabetic()),
            cyrillic + usize::from(is_cyrillic(ch)),
        )
    });
    let toward_latin = latin >= cyrillic;

    for ch in run.chars() {
        let replacement = HOMOGLYPHS.iter().find_map(|&(cyr, lat)| {
            if toward_latin && ch == cyr {
                Some(lat)
            } else if !toward_latin && ch == lat {
                Some(cyr)
            } else {
                None
            }
        });
        out.push(replacement.unwrap_or(ch));
    }
}

fn is_homoglyph(ch: char) -> bool {
    HOMOGLYPHS.iter().any(|&(cyr, lat)| ch == cyr || ch == lat)
}

fn is_cyrillic(ch: char) -> bool {
    ('\u{0400}'..='\u{04FF}').contains(&ch)
}

fn lookup(key: &str) -> Option<&'static str> {
    NAME_ALIASES.get(key).copied()
}

/// Resolves labels like `гемоглобин (hgb)`: the abbreviation inside the
/// parentheses first, then the text before them.
fn lookup_parenthesized(key: &str) -> Option<&'static str> {
    let (head, rest) = key.split_once('(')?;
    let (inner, _) = rest.split_once(')')?;
    lookup(inner.trim()).or_else(|| lookup(head.trim()))
}

/// Builds a code from the label's alphanumeric runs joined by underscores.
///
/// A percent sign becomes its own `pct` token.
fn synthesize_code(label: &str) -> String {
    let mut code = String::with_capacity(label.len());
    let mut pending_separator = false;
    for ch in label.replace('%', " pct ").chars() {
        if ch.is_alphanumeric() {
            if pending_separator && !code.is_empty() {
                code.push('_');
            }
            pending_separator = false;
            code.push(ch);
        } else {
            pending_separator = true;
        }
    }
    code
}
