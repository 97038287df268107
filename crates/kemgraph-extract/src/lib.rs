//! Mention/annotation graph construction for kemgraph
//!
//! Turns one pre-annotated document (tokens, dependencies, entities, timexes,
//! predicates with roles, coreference chains, entity links) into a flat set of RDF
//! statements:
//! - text fragments anchoring every mention (`nif:RFC5147String` / `kem:CompositeFragment`),
//! - mentions (`kem:Mention`) that never partially overlap each other,
//! - semantic annotations hanging off mentions (entities, timexes, predicates,
//!   coordinations, coreferences, participations),
//! - optionally, instance-level facts projected from the annotations.
//!
//! Every document gets its own [`DocumentContext`]; nothing is shared across
//! documents, so callers may process documents in parallel and concatenate the
//! outputs before a single group merge.

use kemgraph_rdf::{merge, normalize_facts, GroupMergeConfig, RdfStatement};
use serde::{Deserialize, Serialize};

pub mod annotation;
pub mod config;
pub mod context;
pub mod document;
pub mod error;
pub mod fragment;
pub mod mention;
pub mod minter;
pub mod report;
pub mod span_index;
pub mod steps;
pub mod text;
pub mod tokens;

pub use config::ExtractorConfig;
pub use context::DocumentContext;
pub use document::Document;
pub use error::ExtractError;
pub use report::{ExtractionReport, Step, StepFailure};

// ============================================================================
// Pipeline
// ============================================================================

/// Statements produced for one document, with what went wrong along the way.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionOutput {
    pub statements: Vec<RdfStatement>,
    pub report: ExtractionReport,
}

#[derive(Debug, Clone, Default)]
pub struct Extractor {
    config: ExtractorConfig,
}

impl Extractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Run every step over `doc`. Item failures are collected in the report; they
    /// never abort the document.
    pub fn extract(&self, doc: &Document) -> ExtractionOutput {
        let mut ctx = DocumentContext::new(doc, &self.config);
        steps::run_all(&mut ctx);
        if self.config.instances {
            steps::instances::run(&mut ctx);
        }

        let mut report = std::mem::take(&mut ctx.report);
        report.mentions = ctx.mentions.len();
        report.annotations = ctx.annotations.len();

        let mut statements = ctx.sink.into_statements();
        if self.config.merging {
            let merge_config = GroupMergeConfig {
                base_iri: Some(doc.uri.clone()),
                named_namespace: self.config.known_named_namespace.clone(),
            };
            statements = merge(statements, &merge_config);
        }
        if self.config.normalization {
            statements = normalize_facts(statements, &self.config.fact_namespace);
        }
        report.statements = statements.len();

        tracing::info!(
            document = %doc.uri,
            mentions = report.mentions,
            annotations = report.annotations,
            statements = report.statements,
            failures = report.failures.len(),
            "document extracted"
        );
        ExtractionOutput { statements, report }
    }
}
