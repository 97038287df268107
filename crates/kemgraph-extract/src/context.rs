//! Per-document extraction state.
//!
//! One [`DocumentContext`] exists per document and owns everything the steps share:
//! the token view, the rebuilt text, the minter, the fragment memo, the span index,
//! the annotation registry and the statement sink. Nothing here outlives the
//! document, so documents can be processed independently.

use ahash::{AHashMap, AHashSet};
use kemgraph_rdf::vocab::{nif, rdf};
use kemgraph_rdf::{RdfNode, RdfObject, StatementSink};

use crate::annotation::AnnotationRegistry;
use crate::config::ExtractorConfig;
use crate::document::Document;
use crate::fragment::Fragments;
use crate::minter::Minter;
use crate::report::{ExtractionReport, Step};
use crate::span_index::{MentionHandle, SpanIndex};
use crate::text::DocumentText;
use crate::tokens::{TokenIdx, TokenIndex};
use crate::ExtractError;

/// A resolved coordination: the group mention and its conjunct mentions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinationGroup {
    pub group: MentionHandle,
    pub conjuncts: Vec<MentionHandle>,
}

/// A predicate-argument link with the role properties that typed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participation {
    pub predicate: MentionHandle,
    pub argument: MentionHandle,
    pub roles: Vec<RdfNode>,
}

#[derive(Debug)]
pub struct DocumentContext<'d> {
    pub doc: &'d Document,
    pub config: &'d ExtractorConfig,
    pub index: TokenIndex<'d>,
    pub text: DocumentText,
    pub document_iri: RdfNode,
    pub context_iri: RdfNode,
    pub minter: Minter,
    pub fragments: Fragments,
    pub mentions: SpanIndex,
    pub annotations: AnnotationRegistry,
    /// Predicate id → predicate mention, for the role step.
    pub predicate_mentions: AHashMap<String, MentionHandle>,
    /// Predicates deliberately left out (filtered or rejected spans).
    pub skipped_predicates: AHashSet<String>,
    pub coordinations: Vec<CoordinationGroup>,
    pub coreferences: Vec<Vec<MentionHandle>>,
    pub participations: Vec<Participation>,
    pub sink: StatementSink,
    pub report: ExtractionReport,
}

impl<'d> DocumentContext<'d> {
    /// Set up the context and emit the `nif:Context` node holding the document text.
    pub fn new(doc: &'d Document, config: &'d ExtractorConfig) -> Self {
        let document_iri = RdfNode::iri(doc.uri.clone());
        let context_iri = RdfNode::iri(format!("{}#ctx", doc.uri));
        let text = DocumentText::reconstruct(&doc.tokens);

        let mut sink = StatementSink::new();
        sink.emit(&context_iri, nif::SOURCE_URL, &document_iri);
        sink.emit(&context_iri, rdf::TYPE, RdfObject::iri(nif::CONTEXT));
        sink.emit(&context_iri, nif::IS_STRING, text.to_text());

        Self {
            doc,
            config,
            index: TokenIndex::new(doc),
            text,
            minter: Minter::new(doc.uri.clone()),
            fragments: Fragments::new(document_iri.clone()),
            document_iri,
            context_iri,
            mentions: SpanIndex::new(),
            annotations: AnnotationRegistry::default(),
            predicate_mentions: AHashMap::new(),
            skipped_predicates: AHashSet::new(),
            coordinations: Vec::new(),
            coreferences: Vec::new(),
            participations: Vec::new(),
            sink,
            report: ExtractionReport::new(doc.uri.clone()),
        }
    }

    /// Fragment for a token set (see [`Fragments`]).
    pub fn fragment(&mut self, tokens: &[TokenIdx]) -> Option<RdfNode> {
        self.fragments.fragment(&self.index, &self.text, &mut self.sink, tokens)
    }

    pub fn span(&self, ids: &[String], item: &str) -> Result<Vec<TokenIdx>, ExtractError> {
        self.index.resolve_span(ids, item)
    }

    /// Whether the span's first token lies in a selected sentence.
    pub fn in_scope(&self, span: &[TokenIdx]) -> bool {
        match self.index.sentence_of(span) {
            Some(sentence) => self.config.includes_sentence(sentence),
            None => false,
        }
    }

    /// Same as [`Self::in_scope`] for unresolved ids; unknown ids count as in scope so
    /// the step reports them.
    pub fn ids_in_scope(&self, ids: &[String]) -> bool {
        match ids.first().and_then(|id| self.index.lookup(id)) {
            Some(first) => self.config.includes_sentence(self.index.token(first).sentence),
            None => true,
        }
    }

    /// Run one item of a step, recording its failure instead of propagating it.
    pub fn run_item<F>(&mut self, step: Step, item: &str, f: F)
    where
        F: FnOnce(&mut Self) -> Result<(), ExtractError>,
    {
        if let Err(err) = f(self) {
            tracing::warn!(step = %step, item = %item, error = %err, "extraction item failed");
            self.report.record_failure(step, item, &err);
        }
    }
}
