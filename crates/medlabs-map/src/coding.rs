//! Resolved code to external coding.

use std::collections::HashMap;
use std::sync::LazyLock;

use medlabs_model::Coding;

use crate::panels::LOCAL_SYSTEM;

pub const LOINC_SYSTEM: &str = "LOINC";

/// Curated codings: resolved code -> (system, code, display).
static OBSERVATION_CODINGS: LazyLock<HashMap<&'static str, (&'static str, &'static str, &'static str)>> =
    LazyLock::new(|| {
        HashMap::from([
            // Complete blood count
            ("wbc", (LOINC_SYSTEM, "6690-2", "Leukocytes [#/volume] in Blood")),
            ("rbc", (LOINC_SYSTEM, "789-8", "Erythrocytes [#/volume] in Blood")),
            ("hemoglobin", (LOINC_SYSTEM, "718-7", "Hemoglobin [Mass/volume] in Blood")),
            ("hematocrit", (LOINC_SYSTEM, "4544-3", "Hematocrit [Volume Fraction] of Blood")),
            ("platelets", (LOINC_SYSTEM, "777-3", "Platelets [#/volume] in Blood")),
            ("mcv", (LOINC_SYSTEM, "787-2", "MCV [Entitic volume]")),
            ("mch", (LOINC_SYSTEM, "785-6", "MCH [Entitic mass]")),
            ("mchc", (LOINC_SYSTEM, "786-4", "MCHC [Mass/volume]")),
            ("rdw", (LOINC_SYSTEM, "788-0", "Erythrocyte distribution width [Ratio]")),
            ("esr", (LOINC_SYSTEM, "4537-7", "Erythrocyte sedimentation rate")),
            ("neutrophils", (LOINC_SYSTEM, "751-8", "Neutrophils [#/volume] in Blood")),
            ("lymphocytes", (LOINC_SYSTEM, "731-0", "Lymphocytes [#/volume] in Blood")),
            ("monocytes", (LOINC_SYSTEM, "742-7", "Monocytes [#/volume] in Blood")),
            ("eosinophils", (LOINC_SYSTEM, "711-2", "Eosinophils [#/volume] in Blood")),
            ("basophils", (LOINC_SYSTEM, "704-7", "Basophils [#/volume] in Blood")),
            ("neutrophils_pct", (LOINC_SYSTEM, "770-8", "Neutrophils/100 leukocytes in Blood")),
            ("lymphocytes_pct", (LOINC_SYSTEM, "736-9", "Lymphocytes/100 leukocytes in Blood")),
            ("monocytes_pct", (LOINC_SYSTEM, "5905-5", "Monocytes/100 leukocytes in Blood")),
            ("eosinophils_pct", (LOINC_SYSTEM, "713-8", "Eosinophils/100 leukocytes in Blood")),
            ("basophils_pct", (LOINC_SYSTEM, "706-2", "Basophils/100 leukocytes in Blood")),
            // Biochemistry
            ("glucose", (LOINC_SYSTEM, "2345-7", "Glucose [Moles/volume] in Blood")),
            ("creatinine", (LOINC_SYSTEM, "2160-0", "Creatinine [Moles/volume] in Serum or Plasma")),
            ("urea", (LOINC_SYSTEM, "3094-0", "Urea nitrogen [Moles/volume] in Serum or Plasma")),
            (
                "alt",
                (
                    LOINC_SYSTEM,
                    "1742-6",
                    "Alanine aminotransferase [Enzymatic activity/volume] in Serum or Plasma",
                ),
            ),
            (
                "ast",
                (
                    LOINC_SYSTEM,
                    "1920-8",
                    "Aspartate aminotransferase [Enzymatic activity/volume] in Serum or Plasma",
                ),
            ),
            ("total_protein", (LOINC_SYSTEM, "2885-2", "Protein [Mass/volume] in Serum or Plasma")),
            ("albumin", (LOINC_SYSTEM, "1751-7", "Albumin [Mass/volume] in Serum or Plasma")),
            ("total_bilirubin", (LOINC_SYSTEM, "1975-2", "Bilirubin.total [Mass/volume] in Serum or Plasma")),
            ("direct_bilirubin", (LOINC_SYSTEM, "1968-7", "Bilirubin.direct [Mass/volume] in Serum or Plasma")),
            ("cholesterol", (LOINC_SYSTEM, "2093-3", "Cholesterol [Mass/volume] in Serum or Plasma")),
            ("triglycerides", (LOINC_SYSTEM, "2571-8", "Triglyceride [Mass/volume] in Serum or Plasma")),
            ("alp", (LOINC_SYSTEM, "6768-6", "Alkaline phosphatase [Enzymatic activity/volume] in Serum or Plasma")),
            ("ggt", (LOINC_SYSTEM, "2324-2", "Gamma glutamyl transferase [Enzymatic activity/volume] in Serum or Plasma")),
            ("crp", (LOINC_SYSTEM, "1988-5", "C reactive protein [Mass/volume] in Serum or Plasma")),
            ("uric_acid", (LOINC_SYSTEM, "3084-1", "Urate [Mass/volume] in Serum or Plasma")),
            ("sodium", (LOINC_SYSTEM, "2951-2", "Sodium [Moles/volume] in Serum or Plasma")),
            ("potassium", (LOINC_SYSTEM, "2823-3", "Potassium [Moles/volume] in Serum or Plasma")),
            // Urinalysis
            ("color", (LOCAL_SYSTEM, "COLOR", "Color")),
            ("appearance", (LOCAL_SYSTEM, "APPEARANCE", "Appearance")),
            ("specific_gravity", (LOCAL_SYSTEM, "SPEC_GRAV", "Specific gravity")),
            ("ph", (LOCAL_SYSTEM, "PH", "pH")),
            ("urine_protein", (LOCAL_SYSTEM, "PROTEIN", "Protein")),
            ("urine_glucose", (LOCAL_SYSTEM, "GLUCOSE_UR", "Glucose")),
            ("urine_bilirubin", (LOCAL_SYSTEM, "BILIRUBIN_UR", "Bilirubin")),
            ("ketones", (LOCAL_SYSTEM, "KETONES", "Ketones")),
            ("nitrite", (LOCAL_SYSTEM, "NITRITE", "Nitrite")),
            ("leukocyte_esterase", (LOCAL_SYSTEM, "LEUK_ESTERASE", "Leukocyte esterase")),
            ("urobilinogen", (LOCAL_SYSTEM, "UROBILINOGEN", "Urobilinogen")),
            ("urine_leukocytes", (LOCAL_SYSTEM, "WBC_UR", "Leukocytes in urine sediment")),
            ("urine_erythrocytes", (LOCAL_SYSTEM, "RBC_UR", "Erythrocytes in urine sediment")),
            ("epithelial_cells", (LOCAL_SYSTEM, "EPITHELIAL", "Epithelial cells")),
            ("bacteria", (LOCAL_SYSTEM, "BACTERIA", "Bacteria")),
        ])
    });

/// Codes a resolved observation code.
///
/// Codes outside the curated table get a `LOCAL` coding with the uppercased
/// code and the source label (or the title-cased code) as display.
pub fn observation_coding(code: &str, source_name: &str) -> Coding {
    if let Some((system, external, display)) = OBSERVATION_CODINGS.get(code) {
        return Coding::new(*system, *external, *display);
    }

    let display = if source_name.trim().is_empty() {
        humanize(code)
    } else {
        source_name.trim().to_string()
    };
    Coding::new(LOCAL_SYSTEM, code.to_uppercase(), display)
}

/// `vitamin_d` becomes `Vitamin D`.
fn humanize(code: &str) -> String {
    code.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curated_codes_use_loinc() {
        let coding = observation_coding("wbc", "WBC");
        assert_eq!(coding.system, "LOINC");
        assert_eq!(coding.code, "6690-2");
    }

    #[test]
    fn local_fallback_prefers_source_label() {
        let coding = observation_coding("ferritin", "Ферритин");
        assert_eq!(coding.system, "LOCAL");
        assert_eq!(coding.code, "FERRITIN");
        assert_eq!(coding.display, "Ферритин");

        assert_eq!(observation_coding("vitamin_d", "").display, "Vitamin D");
    }
}
