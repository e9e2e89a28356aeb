//! Provenance blocks built from document metadata and field evidence.

use chrono::{NaiveDate, Utc};
use medlabs_model::{Evidence, Metadata, SourceTrace};
use serde_json::Value;

pub const UNKNOWN_DOCUMENT: &str = "unknown-document";
pub const UNKNOWN_LAB: &str = "Unknown Lab";

/// Builds a source trace from document metadata.
///
/// Evidence, when given, contributes a positive `page`/`line` and a
/// non-blank `raw_text` that replaces `fallback_raw_text`.
pub fn source_trace(meta: &Metadata, evidence: Option<&Evidence>, fallback_raw_text: &str) -> SourceTrace {
    let mut trace = SourceTrace {
        document_id: meta_text(meta, "document_id").unwrap_or_else(|| UNKNOWN_DOCUMENT.to_string()),
        lab_name: meta_text(meta, "lab_name").unwrap_or_else(|| UNKNOWN_LAB.to_string()),
        report_date: report_date(meta),
        raw_text: fallback_raw_text.to_string(),
        page: None,
        line: None,
    };

    if let Some(evidence) = evidence {
        trace.page = positive_int(evidence.get("page"));
        trace.line = positive_int(evidence.get("line"));
        if let Some(raw_text) = evidence
            .get("raw_text")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|text| !text.is_empty())
        {
            trace.raw_text = raw_text.to_string();
        }
    }

    trace
}

/// `report_date` from metadata when it is a valid `YYYY-MM-DD`, else today (UTC).
pub fn report_date(meta: &Metadata) -> String {
    meta.get("report_date")
        .and_then(Value::as_str)
        .filter(|text| text.len() == 10)
        .and_then(|text| NaiveDate::parse_from_str(text, "%Y-%m-%d").ok())
        .unwrap_or_else(|| Utc::now().date_naive())
        .format("%Y-%m-%d")
        .to_string()
}

/// A non-empty string entry from metadata.
pub fn meta_string(meta: &Metadata, key: &str) -> Option<String> {
    meta.get(key)
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

/// Observation time: `effective_time`, else `collected_at`.
pub fn effective_time(meta: &Metadata) -> Option<String> {
    meta_string(meta, "effective_time").or_else(|| meta_string(meta, "collected_at"))
}

/// Strings and numbers rendered as text; anything else is absent.
fn meta_text(meta: &Metadata, key: &str) -> Option<String> {
    match meta.get(key)? {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn positive_int(value: Option<&Value>) -> Option<u64> {
    value.and_then(Value::as_u64).filter(|number| *number > 0)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn meta(value: Value) -> Metadata {
        match value {
            Value::Object(map) => map,
            _ => Metadata::new(),
        }
    }

    #[test]
    fn defaults_when_metadata_is_missing() {
        let trace = source_trace(&Metadata::new(), None, "WBC");
        assert_eq!(trace.document_id, UNKNOWN_DOCUMENT);
        assert_eq!(trace.lab_name, UNKNOWN_LAB);
        assert_eq!(trace.raw_text, "WBC");
        assert_eq!(trace.report_date.len(), 10);
    }

    #[test]
    fn malformed_report_date_falls_back_to_today() {
        let today = Utc::now().date_naive().format("%Y-%m-%d").to_string();
        assert_eq!(report_date(&meta(json!({"report_date": "2026-13-01"}))), today);
        assert_eq!(report_date(&meta(json!({"report_date": "2026-2-7"}))), today);
        assert_eq!(report_date(&meta(json!({"report_date": "2026-02-07"}))), "2026-02-07");
    }

    #[test]
    fn evidence_fills_page_line_and_raw_text() {
        let evidence = meta(json!({"page": 2, "line": 0, "raw_text": "  WBC 5.4  "}));
        let trace = source_trace(&Metadata::new(), Some(&evidence), "WBC");
        assert_eq!(trace.page, Some(2));
        assert_eq!(trace.line, None);
        assert_eq!(trace.raw_text, "WBC 5.4");
    }

    #[test]
    fn effective_time_prefers_explicit_value() {
        let both = meta(json!({"effective_time": "2026-02-07T08:00:00Z", "collected_at": "2026-02-06"}));
        assert_eq!(effective_time(&both).as_deref(), Some("2026-02-07T08:00:00Z"));
        let collected = meta(json!({"effective_time": "", "collected_at": "2026-02-06"}));
        assert_eq!(effective_time(&collected).as_deref(), Some("2026-02-06"));
    }
}
