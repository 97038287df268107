//! Mention resolution.
//!
//! Every registered mention is either disjoint from, contained in, or contains every
//! other registered mention. A candidate that partially overlaps an existing mention
//! is rejected before anything is emitted or registered.

use kemgraph_rdf::vocab::{kem, kemt, nif, rdf};
use kemgraph_rdf::{RdfNode, RdfObject};

use crate::context::DocumentContext;
use crate::span_index::{Mention, MentionHandle};
use crate::tokens::TokenIdx;

/// How an existing mention relates to a candidate extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlap {
    /// The existing mention lies strictly inside the candidate.
    Containing,
    /// The candidate lies strictly inside the existing mention.
    ContainedIn,
    Same,
    Conflict,
}

/// Classify `existing` against `candidate`; both sorted.
pub fn classify(candidate: &[TokenIdx], existing: &[TokenIdx]) -> Overlap {
    let candidate_has_all = existing.iter().all(|t| candidate.contains(t));
    let existing_has_all = candidate.iter().all(|t| existing.contains(t));
    match (candidate_has_all, existing_has_all) {
        (true, true) => Overlap::Same,
        (true, false) => Overlap::Containing,
        (false, true) => Overlap::ContainedIn,
        (false, false) => Overlap::Conflict,
    }
}

impl DocumentContext<'_> {
    /// Emit the fragment of `tokens` typed as `kem:Mention`, without registering it.
    pub fn emit_mention(&mut self, tokens: &[TokenIdx]) -> Option<RdfNode> {
        let iri = self.fragment(tokens)?;
        self.sink.emit(&iri, rdf::TYPE, RdfObject::iri(kem::MENTION));
        Some(iri)
    }

    /// Accept, reuse or reject a candidate mention.
    ///
    /// Returns `None` when the candidate is empty or partially overlaps a registered
    /// mention. Otherwise the mention is registered (or the one with the same extent is
    /// returned) and, on request, containment (`nif:subString`, container to contained)
    /// and same-head (`kemt:hasSameHeadAs`, contained to container) edges are emitted
    /// towards every nested mention.
    pub fn resolve(
        &mut self,
        candidate: &[TokenIdx],
        emit_containment: bool,
        emit_same_head: bool,
    ) -> Option<MentionHandle> {
        let extent = self.index.sorted(candidate.iter().copied());
        if extent.is_empty() {
            return None;
        }

        let mut containing = Vec::new();
        let mut contained_in = Vec::new();
        for handle in self.mentions.covering_any(&extent).iter() {
            let existing = self.mentions.get(handle)?;
            match classify(&extent, &existing.extent) {
                Overlap::Conflict => {
                    tracing::debug!(
                        candidate = %self.index.label(&extent),
                        existing = %existing.iri.value(),
                        "rejecting mention crossing an existing one"
                    );
                    return None;
                }
                Overlap::Containing => containing.push(handle),
                Overlap::ContainedIn => contained_in.push(handle),
                Overlap::Same => {}
            }
        }

        let iri = self.emit_mention(&extent)?;
        let head = self.index.head(&extent);
        let handle = self.mentions.insert(Mention {
            iri: iri.clone(),
            head,
            extent,
        });

        for inner in containing {
            self.link_nested(handle, inner, emit_containment, emit_same_head);
        }
        for outer in contained_in {
            self.link_nested(outer, handle, emit_containment, emit_same_head);
        }
        Some(handle)
    }

    fn link_nested(&mut self, outer: MentionHandle, inner: MentionHandle, containment: bool, same_head: bool) {
        let (Some(o), Some(i)) = (self.mentions.get(outer), self.mentions.get(inner)) else {
            return;
        };
        let (outer_iri, outer_head) = (o.iri.clone(), o.head);
        let (inner_iri, inner_head) = (i.iri.clone(), i.head);
        if containment {
            self.sink.emit(&outer_iri, nif::SUB_STRING, &inner_iri);
        }
        if same_head && outer_head.is_some() && outer_head == inner_head {
            self.sink.emit(&inner_iri, kemt::HAS_SAME_HEAD_AS, &outer_iri);
        }
    }

    /// Largest registered mention covering `token`.
    pub fn best_mention(&self, token: TokenIdx) -> Option<MentionHandle> {
        self.mentions.best(token)
    }

    /// Registered mention with exactly this extent.
    pub fn exact_mention(&self, tokens: &[TokenIdx]) -> Option<MentionHandle> {
        let extent = self.index.sorted(tokens.iter().copied());
        self.mentions.find_exact(&extent)
    }

    pub fn mention_iri(&self, handle: MentionHandle) -> Option<RdfNode> {
        self.mentions.get(handle).map(|m| m.iri.clone())
    }
}
