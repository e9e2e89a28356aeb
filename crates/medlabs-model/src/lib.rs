pub mod document;
pub mod extraction;
pub mod observation;
pub mod panel;
pub mod validation;

pub use document::{Metadata, RawDocument};
pub use extraction::{Evidence, ExtractedField, ExtractedReport};
pub use observation::{NormalizedObservation, NormalizedReport, ObservationValue};
pub use panel::{
    Coding, Interpretation, ObservationPayload, PanelPayload, PayloadValue, Quantity,
    ReferenceRange, STATUS_FINAL, SourceTrace, StandardPanel, UCUM,
};
pub use validation::{IssueSeverity, ValidationIssue, ValidationResult};
