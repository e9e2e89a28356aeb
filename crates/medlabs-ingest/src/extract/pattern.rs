use std::sync::LazyLock;

use medlabs_model::{ExtractedField, ExtractedReport, RawDocument};
use regex::Regex;
use tracing::{debug, warn};

use super::Extractor;
use crate::error::ExtractError;

/// Confidence assigned to every pattern match.
pub const REGEX_CONFIDENCE: f64 = 0.3;

const NO_FIELDS_WARNING: &str = "Regex extractor could not parse any fields";

/// `<name>[: ]<value> [<unit>] [(<reference>)]` on a single line.
static LINE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(?P<name>\p{L}[\p{L}0-9_\-/ ]{1,60})[:\s]+(?P<value>-?[0-9]+(?:[.,][0-9]+)?|\p{L}+)(?:\s+(?P<unit>[%\p{L}0-9*^/×µ]+))?(?:\s*\((?P<ref>[^)]{1,40})\))?\s*$",
    )
    .expect("Invalid line regex")
});

/// Line-oriented extractor for simple `name value unit (range)` layouts.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexExtractor;

impl RegexExtractor {
    pub fn new() -> Self {
        Self
    }

    fn fields(document: &RawDocument) -> Vec<ExtractedField> {
        let whole = [document.text.clone()];
        let pages: &[String] = if document.pages.is_empty() {
            &whole
        } else {
            &document.pages
        };

        let mut fields = Vec::new();
        for (page_index, page) in pages.iter().enumerate() {
            for (line_index, line) in page.lines().enumerate() {
                let Some(captures) = LINE_PATTERN.captures(line) else {
                    continue;
                };
                let group = |name: &str| {
                    captures
                        .name(name)
                        .map_or("", |matched| matched.as_str().trim())
                };
                fields.push(
                    ExtractedField::new(group("name"), group("value"))
                        .with_unit(group("unit"))
                        .with_reference(group("ref"))
                        .with_confidence(REGEX_CONFIDENCE)
                        .with_evidence("raw_text", line.trim())
                        .with_evidence("line", line_index + 1)
                        .with_evidence("page", page_index + 1),
                );
            }
        }
        fields
    }
}

impl Extractor for RegexExtractor {
    fn name(&self) -> &'static str {
        "regex"
    }

    fn extract(&self, document: &RawDocument) -> Result<ExtractedReport, ExtractError> {
        let fields = Self::fields(document);
        debug!(fields = fields.len(), "regex extraction finished");

        let mut report = ExtractedReport::new(document.clone(), fields);
        if report.fields.is_empty() {
            warn!("regex extractor matched no lines");
            report.warnings.push(NO_FIELDS_WARNING.to_string());
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Option<(String, String, String, String)> {
        LINE_PATTERN.captures(line).map(|captures| {
            let group = |name: &str| {
                captures
                    .name(name)
                    .map_or(String::new(), |matched| matched.as_str().trim().to_string())
            };
            (group("name"), group("value"), group("unit"), group("ref"))
        })
    }

    #[test]
    fn matches_full_line() {
        assert_eq!(
            parse("WBC: 5.4 10*9/L (4.0-10.0)"),
            Some((
                "WBC".to_string(),
                "5.4".to_string(),
                "10*9/L".to_string(),
                "4.0-10.0".to_string()
            ))
        );
    }

    #[test]
    fn matches_cyrillic_line_with_comma_decimal() {
        let (name, value, unit, reference) = parse("Гемоглобин 131 г/л (120-160)").unwrap();
        assert_eq!(name, "Гемоглобин");
        assert_eq!(value, "131");
        assert_eq!(unit, "г/л");
        assert_eq!(reference, "120-160");

        let (_, value, unit, _) = parse("Лейкоциты 5,4 ×10^9/л").unwrap();
        assert_eq!(value, "5,4");
        assert_eq!(unit, "×10^9/л");
    }

    #[test]
    fn word_values_match() {
        let (name, value, unit, reference) = parse("Nitrite negative").unwrap();
        assert_eq!((name.as_str(), value.as_str()), ("Nitrite", "negative"));
        assert!(unit.is_empty());
        assert!(reference.is_empty());
    }

    #[test]
    fn rejects_headers_and_blank_lines() {
        assert!(parse("").is_none());
        assert!(parse("   ").is_none());
        assert!(parse("123 456").is_none());
        assert!(parse("Results:").is_none());
        assert!(parse("WBC 5.4 10*9/L (see note").is_none());
    }
}
