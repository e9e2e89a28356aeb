//! Mapping of normalized lab reports onto canonical panel payloads.
//!
//! - **panels**: panel catalog, identifier resolution, allow-sets
//! - **disambiguation**: specimen-dependent code resolution
//! - **coding**: curated LOINC and LOCAL codings
//! - **interpretation**: low/normal/high reading against reference bounds
//! - **provenance**: source traces from document metadata and evidence
//! - **standard**: payload assembly, [`to_standard_panel`]

pub mod coding;
pub mod disambiguation;
pub mod interpretation;
pub mod panels;
pub mod provenance;
pub mod standard;

pub use coding::observation_coding;
pub use disambiguation::resolve_code;
pub use interpretation::interpret;
pub use panels::{
    LOCAL_SYSTEM, PANEL_SYSTEM, PANELS, PanelDefinition, ResolvedPanel, panel_definition,
    resolve_panel,
};
pub use standard::{DEFAULT_STANDARD_VERSION, to_standard_panel};
