//! `owl:sameAs` smushing.
//!
//! Identity links partition resources into equivalence classes. Each class gets one
//! canonical representative and every statement is rewritten onto it; the aliases
//! stay reachable through `canonical owl:sameAs alias` statements.
//!
//! Representative choice, in order:
//! - IRIs in an earlier ranked namespace win (e.g. `http://dbpedia.org/resource/`),
//! - IRIs beat blank nodes,
//! - shorter identifiers win, then the lexicographically smallest.

use ahash::AHashMap;
use std::collections::BTreeMap;

use crate::union_find::UnionFind;
use crate::vocab::owl;
use crate::{RdfNode, RdfObject, RdfStatement, StatementSink};

#[derive(Debug, Clone, Default)]
pub struct Smusher {
    ranked_namespaces: Vec<String>,
    equivalences: Vec<(RdfNode, RdfNode)>,
}

#[derive(Debug, Default)]
struct NodeTable {
    ids: AHashMap<RdfNode, usize>,
    nodes: Vec<RdfNode>,
}

impl NodeTable {
    fn intern(&mut self, node: &RdfNode) -> usize {
        if let Some(&id) = self.ids.get(node) {
            return id;
        }
        let id = self.nodes.len();
        self.ids.insert(node.clone(), id);
        self.nodes.push(node.clone());
        id
    }
}

impl Smusher {
    pub fn new<I, S>(ranked_namespaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ranked_namespaces: ranked_namespaces.into_iter().map(Into::into).collect(),
            equivalences: Vec::new(),
        }
    }

    /// Add an equivalence computed outside the statement set.
    pub fn with_equivalence(mut self, a: RdfNode, b: RdfNode) -> Self {
        self.equivalences.push((a, b));
        self
    }

    fn rank_key<'a>(&self, node: &'a RdfNode) -> (usize, bool, usize, &'a str) {
        let rank = match node {
            RdfNode::Iri(iri) => self
                .ranked_namespaces
                .iter()
                .position(|ns| iri.starts_with(ns.as_str()))
                .unwrap_or(self.ranked_namespaces.len()),
            RdfNode::BlankNode(_) => self.ranked_namespaces.len(),
        };
        let is_blank = matches!(node, RdfNode::BlankNode(_));
        (rank, is_blank, node.value().len(), node.value())
    }

    /// Map from every non-canonical member to its class representative.
    pub fn canonical_map(&self, statements: &[RdfStatement]) -> BTreeMap<RdfNode, RdfNode> {
        let mut table = NodeTable::default();
        let mut pairs: Vec<(usize, usize)> = Vec::new();
        for stmt in statements {
            if stmt.predicate_iri != owl::SAME_AS {
                continue;
            }
            if let RdfObject::Node(object) = &stmt.object {
                pairs.push((table.intern(&stmt.subject), table.intern(object)));
            }
        }
        for (a, b) in &self.equivalences {
            pairs.push((table.intern(a), table.intern(b)));
        }

        let mut uf = UnionFind::new(table.nodes.len());
        for (a, b) in pairs {
            uf.union(a, b);
        }

        let mut out = BTreeMap::new();
        for class in uf.classes() {
            if class.len() < 2 {
                continue;
            }
            let Some(&canonical) = class
                .iter()
                .min_by(|&&a, &&b| self.rank_key(&table.nodes[a]).cmp(&self.rank_key(&table.nodes[b])))
            else {
                continue;
            };
            for &member in &class {
                if member != canonical {
                    out.insert(table.nodes[member].clone(), table.nodes[canonical].clone());
                }
            }
        }
        out
    }

    pub fn smush(&self, statements: Vec<RdfStatement>) -> Vec<RdfStatement> {
        let canonical = self.canonical_map(&statements);
        if canonical.is_empty() {
            return statements;
        }
        tracing::debug!(aliases = canonical.len(), "smushing owl:sameAs classes");

        let rewrite = |node: RdfNode| -> RdfNode { canonical.get(&node).cloned().unwrap_or(node) };

        let mut sink = StatementSink::new();
        for stmt in statements {
            let subject = rewrite(stmt.subject);
            let object = match stmt.object {
                RdfObject::Node(node) => RdfObject::Node(rewrite(node)),
                lit => lit,
            };
            if stmt.predicate_iri == owl::SAME_AS && object.as_node() == Some(&subject) {
                continue;
            }
            sink.push(RdfStatement {
                subject,
                predicate_iri: stmt.predicate_iri,
                object,
                graph_name: stmt.graph_name,
            });
        }
        for (alias, representative) in &canonical {
            sink.emit(representative, owl::SAME_AS, alias);
        }
        sink.into_statements()
    }
}
