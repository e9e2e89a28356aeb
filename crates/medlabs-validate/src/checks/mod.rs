//! Validation check modules.
//!
//! Each module produces a list of issues; the validator merges them.

pub mod rules;
pub mod structural;
