//! De-duplicating, order-preserving statement accumulator.

use ahash::AHashSet;

use crate::digest::fact_iri;
use crate::vocab::{ks, nif};
use crate::{RdfLiteral, RdfNode, RdfObject, RdfStatement};

/// Append-only statement set.
///
/// Statements keep their first-emission order; emitting a statement that is already
/// present is a no-op, so idempotent re-emission (fragments, mention types) is free.
#[derive(Debug, Clone, Default)]
pub struct StatementSink {
    statements: Vec<RdfStatement>,
    seen: AHashSet<RdfStatement>,
}

impl StatementSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a statement; returns `false` if it was already present.
    pub fn push(&mut self, statement: RdfStatement) -> bool {
        if self.seen.contains(&statement) {
            return false;
        }
        self.seen.insert(statement.clone());
        self.statements.push(statement);
        true
    }

    pub fn emit(&mut self, subject: &RdfNode, predicate_iri: &str, object: impl Into<RdfObject>) -> bool {
        self.push(RdfStatement::new(subject.clone(), predicate_iri, object.into()))
    }

    pub fn emit_in(
        &mut self,
        subject: &RdfNode,
        predicate_iri: &str,
        object: impl Into<RdfObject>,
        graph_name: &RdfNode,
    ) -> bool {
        self.push(
            RdfStatement::new(subject.clone(), predicate_iri, object.into())
                .in_graph(Some(graph_name.clone())),
        )
    }

    /// Emit a reified fact: the triple goes into the named graph identified by its
    /// content hash, and provenance/confidence are attached to that identifier.
    ///
    /// Confidence is only asserted when it is finite and non-zero.
    pub fn emit_fact(
        &mut self,
        fact_namespace: &str,
        subject: &RdfNode,
        predicate_iri: &str,
        object: impl Into<RdfObject>,
        expressed_by: Option<&RdfNode>,
        confidence: Option<f64>,
    ) -> RdfNode {
        let object = object.into();
        let fact = fact_iri(fact_namespace, subject, predicate_iri, &object);
        self.emit_in(subject, predicate_iri, object, &fact);
        if let Some(mention) = expressed_by {
            self.emit(&fact, ks::EXPRESSED_BY, mention);
        }
        if let Some(c) = confidence.filter(|c| c.is_finite() && *c != 0.0) {
            self.emit(&fact, nif::CONFIDENCE, RdfLiteral::double(c));
        }
        fact
    }

    pub fn contains(&self, statement: &RdfStatement) -> bool {
        self.seen.contains(statement)
    }

    /// Whether `(subject, predicate, object)` is present in the default graph.
    pub fn contains_triple(&self, subject: &RdfNode, predicate_iri: &str, object: &RdfObject) -> bool {
        self.contains(&RdfStatement::new(subject.clone(), predicate_iri, object.clone()))
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RdfStatement> {
        self.statements.iter()
    }

    /// Objects of all default-graph statements with the given subject and predicate.
    pub fn objects<'a>(
        &'a self,
        subject: &'a RdfNode,
        predicate_iri: &'a str,
    ) -> impl Iterator<Item = &'a RdfObject> + 'a {
        self.statements.iter().filter_map(move |s| {
            (s.graph_name.is_none() && &s.subject == subject && s.predicate_iri == predicate_iri)
                .then_some(&s.object)
        })
    }

    pub fn extend(&mut self, statements: impl IntoIterator<Item = RdfStatement>) {
        for s in statements {
            self.push(s);
        }
    }

    pub fn statements(&self) -> &[RdfStatement] {
        &self.statements
    }

    pub fn into_statements(self) -> Vec<RdfStatement> {
        self.statements
    }
}

impl FromIterator<RdfStatement> for StatementSink {
    fn from_iter<T: IntoIterator<Item = RdfStatement>>(iter: T) -> Self {
        let mut sink = StatementSink::new();
        sink.extend(iter);
        sink
    }
}
