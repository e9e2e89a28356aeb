//! Lab report pipeline with explicit stages.
//!
//! The stages run strictly in order, each consuming the previous output:
//! 1. **Ingest**: wrap input text or a text file as a document
//! 2. **Extract**: raw field guesses from the configured [`Extractor`]
//! 3. **Normalize**: canonical codes, numbers, units and ranges
//! 4. **Map**: panel payload for the requested panel
//! 5. **Validate**: schema and rule checks on the payload
//!
//! Every stage appends a [`StepRecord`] and logs a `pipeline.step` event.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use medlabs_ingest::{Extractor, RegexExtractor, TextIngestor};
use medlabs_map::{DEFAULT_STANDARD_VERSION, to_standard_panel};
use medlabs_model::{
    ExtractedReport, Metadata, NormalizedReport, RawDocument, StandardPanel, ValidationResult,
};
use medlabs_normalization::normalize;
use medlabs_validate::{PayloadValidator, SchemaReference};
use serde::Serialize;
use tracing::{debug, info_span, warn};

use crate::steps::{PipelineStep, StageFailure, StepRecord, StepStatus};

/// Everything one run produced, stage by stage.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    pub document: RawDocument,
    pub extracted: ExtractedReport,
    pub normalized: NormalizedReport,
    pub mapped: StandardPanel,
    pub validation: ValidationResult,
    pub steps: Vec<StepRecord>,
}

impl PipelineResult {
    pub fn is_valid(&self) -> bool {
        self.validation.is_valid
    }
}

/// Configured pipeline. Build with [`LabPipeline::builder`].
pub struct LabPipeline {
    extractor: Box<dyn Extractor>,
    ingestor: TextIngestor,
    validator: PayloadValidator,
    standard_version: String,
    schema_path: Option<PathBuf>,
}

impl std::fmt::Debug for LabPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabPipeline")
            .field("extractor", &self.extractor.name())
            .field("validator", &self.validator)
            .field("standard_version", &self.standard_version)
            .field("schema_path", &self.schema_path)
            .finish()
    }
}

impl Default for LabPipeline {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl LabPipeline {
    pub fn builder() -> LabPipelineBuilder {
        LabPipelineBuilder::default()
    }

    pub fn standard_version(&self) -> &str {
        &self.standard_version
    }

    /// Ingests `text`, attaches `meta` to the document and runs all stages.
    pub fn run_text(&self, text: &str, panel: &str, meta: Metadata) -> Result<PipelineResult> {
        let start = Instant::now();
        let document = info_span!("ingest").in_scope(|| self.ingestor.ingest(text));
        self.run_ingested(document, start, panel, meta)
    }

    /// Reads a text report from `path` and runs all stages.
    pub fn run_file(&self, path: &Path, panel: &str, meta: Metadata) -> Result<PipelineResult> {
        let start = Instant::now();
        let document = match info_span!("ingest").in_scope(|| self.ingestor.ingest_file(path)) {
            Ok(document) => document,
            Err(error) => {
                warn!(error = %error, "ingestion failed");
                let ingest = StepRecord::finish(PipelineStep::Ingest, start, StepStatus::Error, 0, 1);
                let message = format!("ingest {}", path.display());
                return Err(error).context(StageFailure::new(message, vec![ingest]));
            }
        };
        self.run_ingested(document, start, panel, meta)
    }

    /// Runs extract through validate on an already ingested document.
    pub fn run_document(&self, document: RawDocument, panel: &str) -> Result<PipelineResult> {
        self.run_stages(document, panel, Vec::new())
    }

    fn run_ingested(
        &self,
        mut document: RawDocument,
        start: Instant,
        panel: &str,
        meta: Metadata,
    ) -> Result<PipelineResult> {
        document.meta.extend(meta);
        debug!(
            source = %document.source,
            pages = document.pages.len(),
            text_size = document.text.len(),
            "document ingested"
        );
        let ingest = StepRecord::finish(PipelineStep::Ingest, start, StepStatus::Ok, 0, 0);
        self.run_stages(document, panel, vec![ingest])
    }

    fn run_stages(
        &self,
        document: RawDocument,
        panel: &str,
        mut steps: Vec<StepRecord>,
    ) -> Result<PipelineResult> {
        let pipeline_span = info_span!(
            "pipeline",
            panel = %panel,
            extractor = self.extractor.name()
        );
        let _pipeline_guard = pipeline_span.enter();

        // Extract
        let start = Instant::now();
        let extracted = match info_span!("extract").in_scope(|| self.extractor.extract(&document)) {
            Ok(report) => report,
            Err(error) => {
                warn!(error = %error, "extraction failed");
                steps.push(StepRecord::finish(
                    PipelineStep::Extract,
                    start,
                    StepStatus::Error,
                    0,
                    1,
                ));
                return Err(error).context(StageFailure::new("extract fields", steps));
            }
        };
        steps.push(StepRecord::finish(
            PipelineStep::Extract,
            start,
            StepStatus::Ok,
            extracted.warnings.len(),
            0,
        ));

        // Normalize
        let start = Instant::now();
        let normalized = info_span!("normalize").in_scope(|| normalize(&extracted));
        steps.push(StepRecord::finish(
            PipelineStep::Normalize,
            start,
            StepStatus::Ok,
            normalized.warnings.len(),
            0,
        ));

        // Map
        let start = Instant::now();
        let mapped = info_span!("map")
            .in_scope(|| to_standard_panel(&normalized, panel, &self.standard_version));
        steps.push(StepRecord::finish(
            PipelineStep::Map,
            start,
            StepStatus::Ok,
            mapped.warnings.len(),
            0,
        ));

        // Validate
        let start = Instant::now();
        let payload = mapped.to_value().context("serialize panel payload")?;
        let reference = match &self.schema_path {
            Some(path) => SchemaReference::path(path),
            None => SchemaReference::panel(mapped.panel_code()),
        };
        let validation = info_span!("validate").in_scope(|| self.validator.validate(&payload, &reference));
        let status = if validation.is_valid {
            StepStatus::Ok
        } else {
            StepStatus::Error
        };
        steps.push(StepRecord::finish(
            PipelineStep::Validate,
            start,
            status,
            validation.warning_count(),
            validation.error_count(),
        ));

        Ok(PipelineResult {
            document,
            extracted,
            normalized,
            mapped,
            validation,
            steps,
        })
    }
}

/// Builder for [`LabPipeline`].
///
/// Defaults: [`RegexExtractor`], embedded schemas, standard version
/// [`DEFAULT_STANDARD_VERSION`], schema chosen by panel code.
#[derive(Default)]
pub struct LabPipelineBuilder {
    extractor: Option<Box<dyn Extractor>>,
    validator: Option<PayloadValidator>,
    standard_version: Option<String>,
    schema_path: Option<PathBuf>,
}

impl LabPipelineBuilder {
    #[must_use]
    pub fn extractor(mut self, extractor: impl Extractor + 'static) -> Self {
        self.extractor = Some(Box::new(extractor));
        self
    }

    #[must_use]
    pub fn boxed_extractor(mut self, extractor: Box<dyn Extractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    #[must_use]
    pub fn validator(mut self, validator: PayloadValidator) -> Self {
        self.validator = Some(validator);
        self
    }

    #[must_use]
    pub fn standard_version(mut self, version: impl Into<String>) -> Self {
        self.standard_version = Some(version.into());
        self
    }

    /// Validates against this schema file instead of the panel's schema.
    #[must_use]
    pub fn schema_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.schema_path = Some(path.into());
        self
    }

    pub fn build(self) -> LabPipeline {
        LabPipeline {
            extractor: self
                .extractor
                .unwrap_or_else(|| Box::new(RegexExtractor::new())),
            ingestor: TextIngestor::new(),
            validator: self.validator.unwrap_or_default(),
            standard_version: self
                .standard_version
                .unwrap_or_else(|| DEFAULT_STANDARD_VERSION.to_string()),
            schema_path: self.schema_path,
        }
    }
}
