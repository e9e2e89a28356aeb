//! Normalization of extracted lab fields.
//!
//! - **names**: observation label to canonical code
//! - **numeric**: value and reference range parsing
//! - **units**: unit spelling normalization and display
//! - **pipeline**: the per-field orchestrator, [`normalize`]

pub mod names;
pub mod numeric;
pub mod pipeline;
pub mod units;

pub use names::{canonicalize_name, fold_label};
pub use numeric::{parse_number, parse_range};
pub use pipeline::normalize;
pub use units::{normalize_unit, unit_display};
