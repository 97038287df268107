//! Text-anchored fragments for token sets.
//!
//! Tokens are sorted by offset and split into maximal runs whose gaps contain only
//! whitespace. A single run is a plain `nif:RFC5147String`; several runs make a
//! `kem:CompositeFragment` whose components are the runs' own fragments.
//!
//! Identifiers follow the run boundaries:
//! `{doc}#char={begin},{gapStart};{gapEnd},{gapStart};{gapEnd},…,{end}`.

use ahash::AHashMap;
use kemgraph_rdf::vocab::{kem, nif, rdf};
use kemgraph_rdf::{RdfLiteral, RdfNode, RdfObject, StatementSink};
use std::fmt::Write as _;

use crate::text::DocumentText;
use crate::tokens::{TokenIdx, TokenIndex};

/// Anchor separator between the runs of a composite fragment.
pub const GAP_MARKER: &str = " [...] ";

/// Fragment builder memoized by (sorted) token set.
#[derive(Debug, Clone)]
pub struct Fragments {
    document_iri: RdfNode,
    memo: AHashMap<Vec<TokenIdx>, RdfNode>,
}

impl Fragments {
    pub fn new(document_iri: RdfNode) -> Self {
        Self {
            document_iri,
            memo: AHashMap::new(),
        }
    }

    /// Fragment for `tokens`, emitting its statements on first use.
    ///
    /// `None` for an empty token set.
    pub fn fragment(
        &mut self,
        index: &TokenIndex<'_>,
        text: &DocumentText,
        sink: &mut StatementSink,
        tokens: &[TokenIdx],
    ) -> Option<RdfNode> {
        let sorted = index.sorted(tokens.iter().copied());
        self.build(index, text, sink, &sorted)
    }

    fn build(
        &mut self,
        index: &TokenIndex<'_>,
        text: &DocumentText,
        sink: &mut StatementSink,
        sorted: &[TokenIdx],
    ) -> Option<RdfNode> {
        let first = *sorted.first()?;
        if let Some(iri) = self.memo.get(sorted) {
            return Some(iri.clone());
        }

        let begin = index.token(first).offset;
        let mut offset = begin;
        let mut run_start = 0usize;
        let mut anchor = String::new();
        let mut id = format!("{}#char={begin},", self.document_iri.value());
        let mut components = Vec::new();

        for (i, &t) in sorted.iter().enumerate() {
            let token = index.token(t);
            if token.offset > offset && !text.slice(offset, token.offset).trim().is_empty() {
                let start = index.token(sorted[run_start]).offset;
                anchor.push_str(&text.slice(start, offset));
                anchor.push_str(GAP_MARKER);
                let _ = write!(id, "{offset};{},", token.offset);
                if let Some(component) = self.build(index, text, sink, &sorted[run_start..i]) {
                    components.push(component);
                }
                run_start = i;
            }
            offset = token.end();
        }
        if run_start > 0 {
            if let Some(component) = self.build(index, text, sink, &sorted[run_start..]) {
                components.push(component);
            }
        }
        anchor.push_str(&text.slice(index.token(sorted[run_start]).offset, offset));
        let _ = write!(id, "{offset}");

        let iri = RdfNode::iri(id);
        sink.emit(&iri, kem::FRAGMENT_OF, &self.document_iri);
        if components.is_empty() {
            sink.emit(&iri, rdf::TYPE, RdfObject::iri(nif::RFC5147_STRING));
        } else {
            sink.emit(&iri, rdf::TYPE, RdfObject::iri(kem::COMPOSITE_FRAGMENT));
            for component in &components {
                sink.emit(&iri, kem::HAS_COMPONENT, component);
            }
        }
        sink.emit(&iri, nif::BEGIN_INDEX, RdfLiteral::integer(begin as i64));
        sink.emit(&iri, nif::END_INDEX, RdfLiteral::integer(offset as i64));
        sink.emit(&iri, nif::ANCHOR_OF, anchor);

        self.memo.insert(sorted.to_vec(), iri.clone());
        Some(iri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Document, Token};

    fn doc(forms: &[(&str, usize)]) -> Document {
        Document {
            uri: "http://x.org/d".into(),
            tokens: forms
                .iter()
                .enumerate()
                .map(|(i, (form, offset))| Token {
                    id: format!("t{i}"),
                    offset: *offset,
                    length: form.chars().count(),
                    form: form.to_string(),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn whitespace_gaps_keep_a_simple_fragment() {
        // "New York"
        let d = doc(&[("New", 0), ("York", 4)]);
        let index = TokenIndex::new(&d);
        let text = DocumentText::reconstruct(&d.tokens);
        let mut frags = Fragments::new(RdfNode::iri(&d.uri));
        let mut sink = StatementSink::new();
        let iri = frags.fragment(&index, &text, &mut sink, &[1, 0]).unwrap();
        assert_eq!(iri, RdfNode::iri("http://x.org/d#char=0,8"));
        assert!(sink.contains_triple(&iri, rdf::TYPE, &RdfObject::iri(nif::RFC5147_STRING)));
        assert!(sink.contains_triple(&iri, nif::ANCHOR_OF, &RdfObject::from("New York")));
    }

    #[test]
    fn non_whitespace_gaps_make_composites() {
        // "John , Mary and Bob"
        let d = doc(&[("John", 0), (",", 5), ("Mary", 7), ("and", 12), ("Bob", 16)]);
        let index = TokenIndex::new(&d);
        let text = DocumentText::reconstruct(&d.tokens);
        let mut frags = Fragments::new(RdfNode::iri(&d.uri));
        let mut sink = StatementSink::new();
        let iri = frags.fragment(&index, &text, &mut sink, &[0, 2, 4]).unwrap();
        assert_eq!(iri, RdfNode::iri("http://x.org/d#char=0,4;7,11;16,19"));
        assert!(sink.contains_triple(&iri, rdf::TYPE, &RdfObject::iri(kem::COMPOSITE_FRAGMENT)));
        assert!(sink.contains_triple(
            &iri,
            nif::ANCHOR_OF,
            &RdfObject::from("John [...] Mary [...] Bob")
        ));
        let components: Vec<_> = sink.objects(&iri, kem::HAS_COMPONENT).cloned().collect();
        assert_eq!(
            components,
            vec![
                RdfObject::iri("http://x.org/d#char=0,4"),
                RdfObject::iri("http://x.org/d#char=7,11"),
                RdfObject::iri("http://x.org/d#char=16,19"),
            ]
        );
    }

    #[test]
    fn fragments_are_memoized() {
        let d = doc(&[("a", 0), ("b", 2)]);
        let index = TokenIndex::new(&d);
        let text = DocumentText::reconstruct(&d.tokens);
        let mut frags = Fragments::new(RdfNode::iri(&d.uri));
        let mut sink = StatementSink::new();
        let a = frags.fragment(&index, &text, &mut sink, &[0, 1]).unwrap();
        let n = sink.len();
        let b = frags.fragment(&index, &text, &mut sink, &[1, 0, 1]).unwrap();
        assert_eq!(a, b);
        assert_eq!(sink.len(), n);
        assert!(frags.fragment(&index, &text, &mut sink, &[]).is_none());
    }
}
