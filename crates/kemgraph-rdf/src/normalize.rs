//! Fact identifier normalization.
//!
//! After merging, a fact graph may hold a triple that no longer matches the hash in
//! its identifier (fan-out rewrites subjects and objects), or two graphs may carry
//! the same triple. Normalization runs two passes:
//!
//! 1. every fact graph is split into its fact statements and the metadata attached to
//!    the identifier; each fact statement gets a fresh content-hash identifier and the
//!    metadata is copied onto it,
//! 2. identifiers are re-derived once more from the sorted metadata, so two facts with
//!    the same triple but different provenance stay distinct while identical ones
//!    collapse.
//!
//! Statements that mention no fact identifier pass through untouched.

use ahash::AHashMap;

use crate::digest::{fact_iri, Fnv1a64};
use crate::{RdfNode, RdfObject, RdfStatement, StatementSink};

pub fn normalize_facts(statements: Vec<RdfStatement>, fact_namespace: &str) -> Vec<RdfStatement> {
    let (bypass, groups) = group_by_fact(statements, fact_namespace);

    let mut first_pass: Vec<RdfStatement> = Vec::new();
    for (id, group) in groups {
        let (facts, meta): (Vec<_>, Vec<_>) = group
            .into_iter()
            .partition(|s| s.graph_name.as_ref() == Some(&id));
        for fact in facts {
            let new_id = fact_iri(fact_namespace, &fact.subject, &fact.predicate_iri, &fact.object);
            first_pass.push(fact.clone().in_graph(Some(new_id.clone())));
            for m in &meta {
                first_pass.push(replace_node(m, &id, &new_id));
            }
        }
    }

    let (_, groups) = group_by_fact(first_pass, fact_namespace);

    let mut out = StatementSink::new();
    out.extend(bypass);
    let mut renamed = 0usize;
    for (id, mut group) in groups {
        group.sort();
        group.dedup();
        let (facts, mut meta): (Vec<_>, Vec<_>) = group
            .into_iter()
            .partition(|s| s.graph_name.as_ref() == Some(&id));
        meta.sort();

        let new_id = if meta.is_empty() {
            id.clone()
        } else {
            let mut h = Fnv1a64::new();
            h.add_node(&id);
            for m in &meta {
                h.add_node_relative(Some(&m.subject), &id);
                h.add(&m.predicate_iri);
                h.add_object_relative(&m.object, &id);
                h.add_node_relative(m.graph_name.as_ref(), &id);
            }
            RdfNode::Iri(format!("{fact_namespace}{}", h.hex()))
        };
        if new_id != id {
            renamed += 1;
        }
        for s in facts.iter().chain(meta.iter()) {
            out.push(replace_node(s, &id, &new_id));
        }
    }
    tracing::debug!(renamed, "normalized fact identifiers");
    out.into_statements()
}

type FactGroups = Vec<(RdfNode, Vec<RdfStatement>)>;

/// Partition statements by the fact identifier they mention (subject, then graph,
/// then object); statements with none are returned separately.
fn group_by_fact(statements: Vec<RdfStatement>, fact_namespace: &str) -> (Vec<RdfStatement>, FactGroups) {
    let is_fact = |node: &RdfNode| node.as_iri().is_some_and(|iri| iri.starts_with(fact_namespace));

    let mut bypass = Vec::new();
    let mut index: AHashMap<RdfNode, usize> = AHashMap::new();
    let mut groups: FactGroups = Vec::new();
    for stmt in statements {
        let key = if is_fact(&stmt.subject) {
            Some(stmt.subject.clone())
        } else if let Some(g) = stmt.graph_name.as_ref().filter(|g| is_fact(g)) {
            Some(g.clone())
        } else {
            stmt.object.as_node().filter(|o| is_fact(o)).cloned()
        };
        match key {
            None => bypass.push(stmt),
            Some(key) => {
                let slot = *index.entry(key.clone()).or_insert_with(|| {
                    groups.push((key, Vec::new()));
                    groups.len() - 1
                });
                groups[slot].1.push(stmt);
            }
        }
    }
    (bypass, groups)
}

fn replace_node(stmt: &RdfStatement, from: &RdfNode, to: &RdfNode) -> RdfStatement {
    let swap = |n: &RdfNode| if n == from { to.clone() } else { n.clone() };
    RdfStatement {
        subject: swap(&stmt.subject),
        predicate_iri: stmt.predicate_iri.clone(),
        object: match &stmt.object {
            RdfObject::Node(n) => RdfObject::Node(swap(n)),
            lit => lit.clone(),
        },
        graph_name: stmt.graph_name.as_ref().map(swap),
    }
}
