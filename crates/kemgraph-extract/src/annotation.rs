//! Semantic annotations attached to mentions.
//!
//! An annotation's IRI is its mention's IRI with the annotation id appended, so the
//! same id on the same mention always denotes the same annotation.

use ahash::AHashMap;
use kemgraph_rdf::vocab::{itsrdf, kem, rdf};
use kemgraph_rdf::{clean_iri, RdfNode, RdfObject};

use crate::config::{resource, BBN_NAMESPACE, WN_SST_NAMESPACE, WN_SYNSET_NAMESPACE};
use crate::context::DocumentContext;
use crate::span_index::MentionHandle;
use crate::tokens::TokenIdx;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub iri: RdfNode,
    /// Annotation class IRI (`kemt:EntityAnnotation`, `kemt:Timex`, …).
    pub kind: &'static str,
}

/// Annotations per registered mention, in creation order.
#[derive(Debug, Default)]
pub struct AnnotationRegistry {
    by_mention: AHashMap<MentionHandle, Vec<Annotation>>,
    count: usize,
}

impl AnnotationRegistry {
    pub fn register(&mut self, mention: MentionHandle, annotation: Annotation) {
        let list = self.by_mention.entry(mention).or_default();
        if !list.contains(&annotation) {
            list.push(annotation);
            self.count += 1;
        }
    }

    pub fn of(&self, mention: MentionHandle) -> &[Annotation] {
        self.by_mention.get(&mention).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_kind(&self, mention: MentionHandle, kind: &str) -> bool {
        self.of(mention).iter().any(|a| a.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

impl DocumentContext<'_> {
    /// Annotation `{mention}{id}` of class `kind` on an arbitrary mention node.
    ///
    /// Used directly for mentions that are not registered in the span index
    /// (coreference and participation mentions).
    pub fn annotate_node(&mut self, mention: &RdfNode, id: &str, kind: &'static str) -> RdfNode {
        let iri = RdfNode::iri(clean_iri(&format!("{}{id}", mention.value())));
        self.sink.emit(&iri, rdf::TYPE, RdfObject::iri(kind));
        self.sink.emit(mention, kem::HAS_ANNOTATION, &iri);
        iri
    }

    /// Annotation on a registered mention; it is recorded in the registry.
    pub fn annotate(&mut self, mention: MentionHandle, id: &str, kind: &'static str) -> Option<RdfNode> {
        let mention_iri = self.mentions.get(mention)?.iri.clone();
        let iri = self.annotate_node(&mention_iri, id, kind);
        self.annotations.register(
            mention,
            Annotation {
                iri: iri.clone(),
                kind,
            },
        );
        Some(iri)
    }

    /// Whether any of `tokens` is covered by a mention carrying an annotation of `kind`.
    pub fn overlaps_annotation(&self, tokens: &[TokenIdx], kind: &str) -> bool {
        self.mentions
            .covering_any(tokens)
            .iter()
            .any(|handle| self.annotations.has_kind(handle, kind))
    }

    /// `rdf:type` classes configured in the type map under `key`.
    pub fn emit_mapped_types(&mut self, subject: &RdfNode, key: &str) {
        let config = self.config;
        for class in config.types_for(key) {
            self.sink.emit(subject, rdf::TYPE, RdfObject::iri(class.clone()));
        }
    }

    /// Lexical sense information of `head` (supersense, synset, BBN type) as
    /// `itsrdf:termInfoRef` links.
    pub fn emit_common_attributes(&mut self, annotation: &RdfNode, head: TokenIdx) {
        let token = self.index.token(head);
        if let Some(sst) = token.external_ref(resource::WN_SST) {
            let local = sst.reference.rsplit('-').next().unwrap_or(&sst.reference);
            let iri = RdfObject::iri(format!("{WN_SST_NAMESPACE}{local}"));
            self.sink.emit(annotation, itsrdf::TERM_INFO_REF, iri);
        }
        if let Some(synset) = token.external_ref(resource::WN_SYNSET) {
            let iri = RdfObject::iri(format!("{WN_SYNSET_NAMESPACE}{}", synset.reference));
            self.sink.emit(annotation, itsrdf::TERM_INFO_REF, iri);
        }
        if let Some(bbn) = token.external_ref(resource::BBN) {
            let iri = RdfObject::iri(format!("{BBN_NAMESPACE}{}", bbn.reference));
            self.sink.emit(annotation, itsrdf::TERM_INFO_REF, iri);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractorConfig;
    use crate::document::{Document, ExternalRef, Token};
    use kemgraph_rdf::vocab::kemt;

    fn doc() -> Document {
        Document {
            uri: "http://x.org/d".into(),
            tokens: vec![Token {
                id: "t1".into(),
                offset: 0,
                length: 5,
                form: "Paris".into(),
                upos: "PROPN".into(),
                external_refs: vec![
                    ExternalRef {
                        resource: "wn30-sst".into(),
                        reference: "B-noun.location".into(),
                        confidence: None,
                    },
                    ExternalRef {
                        resource: "BBN".into(),
                        reference: "GPE".into(),
                        confidence: None,
                    },
                ],
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn annotations_hang_off_their_mention() {
        let d = doc();
        let cfg = ExtractorConfig::default();
        let mut ctx = DocumentContext::new(&d, &cfg);
        let m = ctx.resolve(&[0], true, true).unwrap();
        let ann = ctx.annotate(m, "e1", kemt::ENTITY_ANNOTATION).unwrap();
        assert_eq!(ann, RdfNode::iri("http://x.org/d#char=0,5e1"));
        let mention = ctx.mentions.get(m).unwrap().iri.clone();
        assert!(ctx.sink.contains_triple(&mention, kem::HAS_ANNOTATION, &RdfObject::from(&ann)));
        assert!(ctx.overlaps_annotation(&[0], kemt::ENTITY_ANNOTATION));
        assert!(!ctx.overlaps_annotation(&[0], kemt::TIMEX));
        assert_eq!(ctx.annotations.len(), 1);
    }

    #[test]
    fn common_attributes_use_sense_namespaces() {
        let d = doc();
        let cfg = ExtractorConfig::default();
        let mut ctx = DocumentContext::new(&d, &cfg);
        let ann = RdfNode::iri("http://x.org/d#a");
        ctx.emit_common_attributes(&ann, 0);
        let refs: Vec<_> = ctx
            .sink
            .objects(&ann, itsrdf::TERM_INFO_REF)
            .filter_map(RdfObject::as_iri)
            .map(str::to_string)
            .collect();
        assert_eq!(
            refs,
            vec![
                "http://pikes.fbk.eu/wn/sst/noun.location".to_string(),
                "http://pikes.fbk.eu/bbn/GPE".to_string(),
            ]
        );
    }
}
