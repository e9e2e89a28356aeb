//! Panel catalog, panel identifier resolution and the per-panel allow-sets.

/// Coding system for panels in the catalog.
pub const PANEL_SYSTEM: &str = "MEDLABS-PANEL";

/// Coding system for panels and observations outside any curated table.
pub const LOCAL_SYSTEM: &str = "LOCAL";

/// A known panel and the resolved observation codes it may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelDefinition {
    pub code: &'static str,
    pub display: &'static str,
    /// Uppercased display-name and localized aliases.
    pub aliases: &'static [&'static str],
    /// Resolved codes allowed in the panel. Empty means unfiltered.
    pub allowed: &'static [&'static str],
}

impl PanelDefinition {
    pub fn allows(&self, code: &str) -> bool {
        self.allowed.iter().any(|allowed| *allowed == code)
    }

    pub fn is_filtered(&self) -> bool {
        !self.allowed.is_empty()
    }
}

pub static PANELS: &[PanelDefinition] = &[
    PanelDefinition {
        code: "CBC",
        display: "Complete Blood Count",
        aliases: &[
            "COMPLETE BLOOD COUNT",
            "FULL BLOOD COUNT",
            "HEMOGRAM",
            "ОБЩИЙ АНАЛИЗ КРОВИ",
            "КЛИНИЧЕСКИЙ АНАЛИЗ КРОВИ",
            "ОАК",
        ],
        allowed: &[
            "wbc",
            "rbc",
            "hemoglobin",
            "hematocrit",
            "platelets",
            "mcv",
            "mch",
            "mchc",
            "rdw",
            "esr",
            "neutrophils",
            "lymphocytes",
            "monocytes",
            "eosinophils",
            "basophils",
            "neutrophils_pct",
            "lymphocytes_pct",
            "monocytes_pct",
            "eosinophils_pct",
            "basophils_pct",
        ],
    },
    PanelDefinition {
        code: "BIOCHEM",
        display: "Biochemistry Panel",
        aliases: &[
            "BIOCHEMISTRY PANEL",
            "BIOCHEMISTRY",
            "BLOOD CHEMISTRY",
            "БИОХИМИЧЕСКИЙ АНАЛИЗ КРОВИ",
            "БИОХИМИЯ КРОВИ",
            "БИОХИМИЯ",
        ],
        allowed: &[
            "glucose",
            "creatinine",
            "urea",
            "alt",
            "ast",
            "total_protein",
            "albumin",
            "total_bilirubin",
            "direct_bilirubin",
            "cholesterol",
            "triglycerides",
            "alp",
            "ggt",
            "crp",
            "uric_acid",
            "sodium",
            "potassium",
        ],
    },
    PanelDefinition {
        code: "URINALYSIS",
        display: "Urinalysis Panel",
        aliases: &[
            "URINALYSIS PANEL",
            "URINE ANALYSIS",
            "UA",
            "ОБЩИЙ АНАЛИЗ МОЧИ",
            "ОАМ",
        ],
        allowed: &[
            "color",
            "appearance",
            "specific_gravity",
            "ph",
            "urine_protein",
            "urine_glucose",
            "urine_bilirubin",
            "ketones",
            "nitrite",
            "leukocyte_esterase",
            "urobilinogen",
            "urine_leukocytes",
            "urine_erythrocytes",
            "epithelial_cells",
            "bacteria",
        ],
    },
];

/// Outcome of resolving a requested panel identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPanel {
    pub code: String,
    pub display: String,
    /// `None` for identifiers outside the catalog.
    pub definition: Option<&'static PanelDefinition>,
}

impl ResolvedPanel {
    pub fn is_known(&self) -> bool {
        self.definition.is_some()
    }

    pub fn system(&self) -> &'static str {
        if self.is_known() {
            PANEL_SYSTEM
        } else {
            LOCAL_SYSTEM
        }
    }
}

/// Looks up a panel by code; `code` must already be uppercased.
pub fn panel_definition(code: &str) -> Option<&'static PanelDefinition> {
    PANELS.iter().find(|panel| panel.code == code)
}

/// Resolves a panel identifier by code, then by alias.
///
/// Whitespace runs are collapsed for the catalog lookup only. Unknown
/// identifiers keep their trimmed, uppercased form as the code and get a
/// title-cased display name.
pub fn resolve_panel(raw: &str) -> ResolvedPanel {
    let lookup = raw
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase();

    let definition = panel_definition(&lookup).or_else(|| {
        PANELS
            .iter()
            .find(|panel| panel.aliases.iter().any(|alias| *alias == lookup))
    });

    match definition {
        Some(panel) => ResolvedPanel {
            code: panel.code.to_string(),
            display: panel.display.to_string(),
            definition: Some(panel),
        },
        None => {
            let code = raw.trim().to_uppercase();
            ResolvedPanel {
                display: title_case(&code),
                code,
                definition: None,
            }
        }
    }
}

/// Uppercases the first letter of each alphanumeric run and lowercases the
/// rest: `LIPID_PANEL` becomes `Lipid_Panel`.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for ch in text.chars() {
        if ch.is_alphanumeric() {
            if at_word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(ch);
            at_word_start = true;
        }
    }
    out
}
