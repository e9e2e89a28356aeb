use std::fmt::Write as _;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use medlabs_core::{PipelineResult, StepRecord, StepStatus};
use medlabs_model::{
    Interpretation, IssueSeverity, ObservationPayload, ReferenceRange, ValidationIssue,
    ValidationResult,
};

use crate::commands::render_value;

/// Plain-text headline of a pipeline run.
pub fn parse_headline(result: &PipelineResult) -> String {
    let payload = &result.mapped.data;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Panel: {} ({})",
        payload.panel_code.code, payload.panel_name
    );
    let _ = writeln!(out, "Source: {}", result.document.source);
    let _ = writeln!(
        out,
        "Observations: {} of {} extracted fields",
        payload.observations.len(),
        result.extracted.fields.len()
    );
    let _ = write!(out, "{}", validation_headline(&result.validation));
    out
}

pub fn validation_headline(result: &ValidationResult) -> String {
    format!(
        "Validation: {} ({} errors, {} warnings)",
        if result.is_valid { "valid" } else { "invalid" },
        result.error_count(),
        result.warning_count()
    )
}

/// Full parse summary: headline, observation, step and issue tables, warnings.
pub fn parse_summary(result: &PipelineResult) -> String {
    let mut out = parse_headline(result);
    out.push('\n');
    if !result.mapped.data.observations.is_empty() {
        let _ = writeln!(out, "{}", observation_table(&result.mapped.data.observations));
    }
    let _ = writeln!(out, "{}", step_table(&result.steps));
    if !result.validation.issues.is_empty() {
        let _ = writeln!(out, "Issues:");
        let _ = writeln!(out, "{}", issue_table(&result.validation.issues));
    }
    if !result.mapped.warnings.is_empty() {
        let _ = writeln!(out, "Warnings:");
        for warning in &result.mapped.warnings {
            let _ = writeln!(out, "- {warning}");
        }
    }
    out
}

pub fn validation_summary(result: &ValidationResult) -> String {
    let mut out = validation_headline(result);
    out.push('\n');
    if !result.issues.is_empty() {
        let _ = writeln!(out, "{}", issue_table(&result.issues));
    }
    out
}

pub fn observation_table(observations: &[ObservationPayload]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Code"),
        header_cell("Name"),
        header_cell("Value"),
        header_cell("Unit"),
        header_cell("Reference"),
        header_cell("Flag"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 5, CellAlignment::Center);
    for observation in observations {
        let unit = observation
            .value
            .as_quantity()
            .map_or("-", |quantity| quantity.unit_display.as_str());
        table.add_row(vec![
            Cell::new(&observation.code.code)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(&observation.code.display),
            Cell::new(render_value(&observation.value)),
            Cell::new(unit),
            reference_cell(observation.reference_range.as_ref()),
            interpretation_cell(observation.interpretation),
        ]);
    }
    table
}

pub fn step_table(steps: &[StepRecord]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Step"),
        header_cell("Status"),
        header_cell("Time (ms)"),
        header_cell("Warnings"),
        header_cell("Errors"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);
    for step in steps {
        let status = match step.status {
            StepStatus::Ok => Cell::new("ok").fg(Color::Green),
            StepStatus::Error => Cell::new("error")
                .fg(Color::Red)
                .add_attribute(Attribute::Bold),
        };
        table.add_row(vec![
            Cell::new(step.step),
            status,
            Cell::new(step.duration_ms),
            count_cell(step.warning_count, Color::Yellow),
            count_cell(step.error_count, Color::Red),
        ]);
    }
    table
}

pub fn issue_table(issues: &[ValidationIssue]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Severity"),
        header_cell("Path"),
        header_cell("Message"),
    ]);
    apply_issue_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Center);
    let mut ordered: Vec<&ValidationIssue> = issues.iter().collect();
    ordered.sort_by_key(|issue| std::cmp::Reverse(severity_rank(issue.severity)));
    for issue in ordered {
        table.add_row(vec![
            severity_cell(issue.severity),
            Cell::new(&issue.path),
            Cell::new(&issue.description),
        ]);
    }
    table
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(140);
}

fn apply_issue_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(160);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

pub fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn reference_cell(range: Option<&ReferenceRange>) -> Cell {
    let low = range.and_then(|range| range.low.as_ref());
    let high = range.and_then(|range| range.high.as_ref());
    match (low, high) {
        (Some(low), Some(high)) => Cell::new(format!("{}-{}", low.value, high.value)),
        (Some(low), None) => Cell::new(format!(">= {}", low.value)),
        (None, Some(high)) => Cell::new(format!("<= {}", high.value)),
        (None, None) => dim_cell("-"),
    }
}

fn interpretation_cell(interpretation: Interpretation) -> Cell {
    match interpretation {
        Interpretation::Low | Interpretation::High => Cell::new(interpretation.as_str())
            .fg(Color::Yellow)
            .add_attribute(Attribute::Bold),
        Interpretation::Normal => Cell::new(interpretation.as_str()).fg(Color::Green),
        Interpretation::Unknown => dim_cell(interpretation.as_str()),
    }
}

fn severity_cell(severity: IssueSeverity) -> Cell {
    match severity {
        IssueSeverity::Error => Cell::new("ERROR")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
        IssueSeverity::Warning => Cell::new("WARN").fg(Color::Yellow),
    }
}

fn severity_rank(severity: IssueSeverity) -> u8 {
    match severity {
        IssueSeverity::Error => 2,
        IssueSeverity::Warning => 1,
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
