//! Assembly of the canonical panel payload.

use medlabs_model::{
    Coding, Metadata, NormalizedObservation, NormalizedReport, ObservationPayload,
    ObservationValue, PanelPayload, PayloadValue, Quantity, ReferenceRange, STATUS_FINAL,
    StandardPanel, UCUM,
};
use medlabs_normalization::unit_display;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::coding::observation_coding;
use crate::disambiguation::resolve_code;
use crate::interpretation::interpret;
use crate::panels::{ResolvedPanel, resolve_panel};
use crate::provenance::{effective_time, meta_string, source_trace};

pub const DEFAULT_STANDARD_VERSION: &str = "0.1";

/// Unit code written for numeric values that carry no unit.
const DIMENSIONLESS: &str = "1";

/// How many dropped labels the filter warning names.
const DROPPED_LABEL_LIMIT: usize = 3;

/// Maps a normalized report onto the requested panel.
///
/// Stages: panel resolution, code disambiguation, panel filtering, then
/// payload assembly. Never fails; unknown panels and filter fallbacks are
/// reported through `StandardPanel::warnings` after the report's own
/// warnings.
pub fn to_standard_panel(
    report: &NormalizedReport,
    panel: &str,
    standard_version: &str,
) -> StandardPanel {
    let resolved = resolve_panel(panel);
    let mut warnings = report.warnings.clone();
    if !resolved.is_known() {
        warn!(panel = %panel, "unknown panel");
        warnings.push(format!("Unknown panel '{panel}', using LOCAL metadata"));
    }

    let disambiguated: Vec<NormalizedObservation> = report
        .observations
        .iter()
        .map(|observation| {
            let code = resolve_code(&observation.code, &observation.unit, &resolved.code);
            if code != observation.code {
                debug!(from = %observation.code, to = %code, "disambiguated observation code");
            }
            NormalizedObservation {
                code: code.to_string(),
                ..observation.clone()
            }
        })
        .collect();

    let kept = filter_to_panel(disambiguated, &resolved, &mut warnings);

    let meta = &report.document.meta;
    let slug = slug(&resolved.code);
    let observations = kept
        .iter()
        .enumerate()
        .map(|(index, observation)| observation_payload(observation, &slug, index + 1, meta))
        .collect::<Vec<_>>();

    let fallback_raw_text =
        meta_string(meta, "panel_raw_text").unwrap_or_else(|| resolved.display.clone());

    info!(
        panel = %resolved.code,
        observations = observations.len(),
        warnings = warnings.len(),
        "mapped report to panel"
    );

    let data = PanelPayload {
        id: format!("panel-{slug}-{}", random_suffix(8)),
        resource_type: "panel".to_string(),
        standard_version: standard_version.to_string(),
        panel_code: Coding::new(
            resolved.system(),
            resolved.code.clone(),
            resolved.display.clone(),
        ),
        panel_name: resolved.display.clone(),
        status: STATUS_FINAL.to_string(),
        observations,
        source: source_trace(meta, None, &fallback_raw_text),
        collected_at: meta_string(meta, "collected_at"),
        reported_at: meta_string(meta, "reported_at"),
    };

    StandardPanel { data, warnings }
}

/// Drops observations outside the panel's allow-set.
///
/// When every observation would be dropped, nothing is dropped and a
/// fallback warning is recorded instead.
fn filter_to_panel(
    observations: Vec<NormalizedObservation>,
    panel: &ResolvedPanel,
    warnings: &mut Vec<String>,
) -> Vec<NormalizedObservation> {
    let Some(definition) = panel.definition.filter(|definition| definition.is_filtered()) else {
        return observations;
    };
    if observations.is_empty() {
        return observations;
    }

    let (kept, dropped): (Vec<_>, Vec<_>) = observations
        .into_iter()
        .partition(|observation| definition.allows(&observation.code));

    if dropped.is_empty() {
        return kept;
    }

    if kept.is_empty() {
        warn!(panel = %panel.code, count = dropped.len(), "panel filter would drop every observation");
        warnings.push(format!(
            "All {} observations fall outside panel '{}'; keeping them unfiltered (possible code disambiguation failure)",
            dropped.len(),
            panel.code
        ));
        return dropped;
    }

    let mut labels: Vec<&str> = dropped
        .iter()
        .take(DROPPED_LABEL_LIMIT)
        .map(|observation| {
            if observation.source_name.trim().is_empty() {
                observation.code.as_str()
            } else {
                observation.source_name.trim()
            }
        })
        .collect();
    if dropped.len() > DROPPED_LABEL_LIMIT {
        labels.push("...");
    }
    warn!(panel = %panel.code, dropped = dropped.len(), "filtered observations outside panel");
    warnings.push(format!(
        "Filtered {} observations outside panel '{}': {}",
        dropped.len(),
        panel.code,
        labels.join(", ")
    ));

    kept
}

fn observation_payload(
    observation: &NormalizedObservation,
    slug: &str,
    index: usize,
    meta: &Metadata,
) -> ObservationPayload {
    ObservationPayload {
        id: format!("obs-{slug}-{index:03}-{}", random_suffix(6)),
        resource_type: "observation".to_string(),
        code: observation_coding(&observation.code, &observation.source_name),
        value: payload_value(observation),
        interpretation: interpret(observation),
        status: STATUS_FINAL.to_string(),
        source: source_trace(meta, Some(&observation.evidence), &observation.source_name),
        reference_range: reference_range(observation),
        effective_time: effective_time(meta),
    }
}

fn payload_value(observation: &NormalizedObservation) -> PayloadValue {
    match &observation.value {
        ObservationValue::Number(value) => {
            PayloadValue::Quantity(quantity(*value, &observation.unit))
        }
        ObservationValue::Boolean(value) => PayloadValue::Boolean(*value),
        ObservationValue::Text(text) => PayloadValue::Text(text.clone()),
        ObservationValue::Missing => PayloadValue::Missing,
    }
}

fn reference_range(observation: &NormalizedObservation) -> Option<ReferenceRange> {
    if observation.ref_low.is_none() && observation.ref_high.is_none() {
        return None;
    }
    Some(ReferenceRange {
        low: observation
            .ref_low
            .map(|value| quantity(value, &observation.unit)),
        high: observation
            .ref_high
            .map(|value| quantity(value, &observation.unit)),
    })
}

fn quantity(value: f64, unit: &str) -> Quantity {
    let unit_code = if unit.is_empty() { DIMENSIONLESS } else { unit };
    Quantity {
        value,
        unit_code: unit_code.to_string(),
        unit_system: UCUM.to_string(),
        unit_display: unit_display(unit_code),
    }
}

/// Lowercased code with every non-alphanumeric character replaced by `-`.
fn slug(code: &str) -> String {
    code.chars()
        .flat_map(char::to_lowercase)
        .map(|ch| if ch.is_alphanumeric() { ch } else { '-' })
        .collect()
}

fn random_suffix(len: usize) -> String {
    let mut hex = Uuid::new_v4().simple().to_string();
    hex.truncate(len);
    hex
}
