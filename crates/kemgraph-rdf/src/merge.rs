//! Composite group merging.
//!
//! A *group* is a resource with `ks:include` members (a coordination such as
//! "John and Mary"). Statements attached to a group are either kept on the group
//! (when it is a named resource in its own right) or fanned out to every member.
//!
//! Statement classes:
//! - both ends are distinct groups: a group relation, resolved by the first group
//!   processed and handed to the other end as a group property,
//! - one end is a group: a group property of that group,
//! - anything else passes through unchanged.
//!
//! A group is *named* if it lives in the ranked named namespace (DBpedia by default)
//! or carries a `foaf:name`.

use ahash::{AHashMap, AHashSet};

use crate::smush::Smusher;
use crate::vocab::{foaf, ks, owl, rdfs, DBPEDIA_RESOURCE_NS};
use crate::{RdfNode, RdfObject, RdfStatement, StatementSink};

#[derive(Debug, Clone)]
pub struct GroupMergeConfig {
    /// `owl:sameAs` links whose object starts with this prefix are dropped.
    pub base_iri: Option<String>,
    /// Resources in this namespace are always named.
    pub named_namespace: String,
}

impl Default for GroupMergeConfig {
    fn default() -> Self {
        Self {
            base_iri: None,
            named_namespace: DBPEDIA_RESOURCE_NS.to_string(),
        }
    }
}

/// Ordered multimap keyed by node; per-key values keep insertion order.
#[derive(Debug, Default)]
struct NodeMultimap {
    entries: AHashMap<RdfNode, Vec<RdfStatement>>,
}

impl NodeMultimap {
    fn put(&mut self, key: &RdfNode, stmt: RdfStatement) {
        let values = self.entries.entry(key.clone()).or_default();
        if !values.contains(&stmt) {
            values.push(stmt);
        }
    }

    fn remove(&mut self, key: &RdfNode, stmt: &RdfStatement) {
        if let Some(values) = self.entries.get_mut(key) {
            values.retain(|s| s != stmt);
        }
    }

    fn take(&mut self, key: &RdfNode) -> Vec<RdfStatement> {
        self.entries.remove(key).unwrap_or_default()
    }
}

/// Smush `owl:sameAs` classes and then merge composite groups.
pub fn merge(statements: Vec<RdfStatement>, config: &GroupMergeConfig) -> Vec<RdfStatement> {
    let smushed = Smusher::new([config.named_namespace.clone()]).smush(statements);
    merge_groups(smushed, config)
}

pub fn merge_groups(statements: Vec<RdfStatement>, config: &GroupMergeConfig) -> Vec<RdfStatement> {
    // composite -> members, in first-seen order
    let mut group_order: Vec<RdfNode> = Vec::new();
    let mut groups: AHashMap<RdfNode, Vec<RdfNode>> = AHashMap::new();
    let mut named: AHashSet<RdfNode> = AHashSet::new();

    for stmt in &statements {
        if stmt.predicate_iri == ks::INCLUDE {
            if let RdfObject::Node(member) = &stmt.object {
                let members = groups.entry(stmt.subject.clone()).or_insert_with(|| {
                    group_order.push(stmt.subject.clone());
                    Vec::new()
                });
                if !members.contains(member) {
                    members.push(member.clone());
                }
            }
        } else if stmt.predicate_iri == foaf::NAME {
            named.insert(stmt.subject.clone());
        }
    }

    if groups.is_empty() {
        return statements;
    }

    let mut output = StatementSink::new();
    let mut group_props = NodeMultimap::default();
    let mut group_rels = NodeMultimap::default();

    for stmt in statements {
        if stmt.predicate_iri == owl::SAME_AS {
            if let RdfObject::Node(object) = &stmt.object {
                let self_link = match (object, &config.base_iri) {
                    (RdfNode::BlankNode(_), _) => true,
                    (RdfNode::Iri(iri), Some(base)) => iri.starts_with(base.as_str()),
                    _ => false,
                };
                if self_link {
                    continue;
                }
            }
        }

        let subject_group = groups.contains_key(&stmt.subject);
        let object_group = stmt
            .object
            .as_node()
            .filter(|o| groups.contains_key(*o))
            .cloned();

        match object_group {
            Some(object) if subject_group && object != stmt.subject => {
                group_rels.put(&stmt.subject, stmt.clone());
                group_rels.put(&object, stmt);
            }
            _ if subject_group => {
                let subject = stmt.subject.clone();
                group_props.put(&subject, stmt);
            }
            Some(object) => group_props.put(&object, stmt),
            None => {
                output.push(stmt);
            }
        }
    }

    let is_named = |node: &RdfNode| {
        named.contains(node)
            || node
                .as_iri()
                .is_some_and(|iri| iri.starts_with(config.named_namespace.as_str()))
    };

    // Resolve relations between groups into properties of the other end.
    for composite in &group_order {
        let members = &groups[composite];
        let composite_named = is_named(composite);
        for stmt in group_rels.take(composite) {
            if &stmt.subject == composite {
                let Some(other) = stmt.object.as_node().cloned() else {
                    continue;
                };
                group_rels.remove(&other, &stmt);
                if composite_named {
                    group_props.put(&other, stmt);
                } else {
                    for member in members {
                        let mut fanned = stmt.clone();
                        fanned.subject = member.clone();
                        group_props.put(&other, fanned);
                    }
                }
            } else {
                let other = stmt.subject.clone();
                group_rels.remove(&other, &stmt);
                if composite_named {
                    group_props.put(&other, stmt);
                } else {
                    for member in members {
                        let mut fanned = stmt.clone();
                        fanned.object = RdfObject::Node(member.clone());
                        group_props.put(&other, fanned);
                    }
                }
            }
        }
    }

    for composite in &group_order {
        let props = group_props.take(composite);
        if is_named(composite) {
            output.extend(props);
            continue;
        }
        let members = &groups[composite];
        tracing::trace!(group = %composite, members = members.len(), "fanning out anonymous group");
        for stmt in props {
            let subjects: Vec<RdfNode> = if &stmt.subject == composite {
                if stmt.predicate_iri == ks::INCLUDE || stmt.predicate_iri == rdfs::LABEL {
                    continue;
                }
                members.clone()
            } else {
                vec![stmt.subject.clone()]
            };
            let objects: Vec<RdfObject> = if stmt.object.as_node() == Some(composite) {
                members.iter().map(RdfObject::from).collect()
            } else {
                vec![stmt.object.clone()]
            };
            for subject in &subjects {
                for object in &objects {
                    output.push(RdfStatement {
                        subject: subject.clone(),
                        predicate_iri: stmt.predicate_iri.clone(),
                        object: object.clone(),
                        graph_name: stmt.graph_name.clone(),
                    });
                }
            }
        }
    }

    output.into_statements()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(s: &str) -> RdfNode {
        RdfNode::iri(s)
    }

    fn st(s: &str, p: &str, o: RdfObject) -> RdfStatement {
        RdfStatement::new(n(s), p, o)
    }

    const P: &str = "http://x.org/p";

    fn coordination(composite: &str) -> Vec<RdfStatement> {
        vec![
            st(composite, ks::INCLUDE, RdfObject::iri("http://x.org/m1")),
            st(composite, ks::INCLUDE, RdfObject::iri("http://x.org/m2")),
        ]
    }

    #[test]
    fn anonymous_group_properties_fan_out_to_members() {
        let mut stmts = coordination("http://x.org/g");
        stmts.push(st("http://x.org/g", P, RdfObject::iri("http://x.org/x")));
        stmts.push(st("http://x.org/g", rdfs::LABEL, RdfObject::from("John and Mary")));
        let merged = merge_groups(stmts, &GroupMergeConfig::default());
        assert!(merged.contains(&st("http://x.org/m1", P, RdfObject::iri("http://x.org/x"))));
        assert!(merged.contains(&st("http://x.org/m2", P, RdfObject::iri("http://x.org/x"))));
        assert!(!merged.iter().any(|s| s.subject == n("http://x.org/g")));
    }

    #[test]
    fn named_group_keeps_its_properties() {
        let mut stmts = coordination("http://x.org/g");
        stmts.push(st("http://x.org/g", foaf::NAME, RdfObject::from("The Beatles")));
        stmts.push(st("http://x.org/g", P, RdfObject::iri("http://x.org/x")));
        let merged = merge_groups(stmts, &GroupMergeConfig::default());
        assert!(merged.contains(&st("http://x.org/g", P, RdfObject::iri("http://x.org/x"))));
        assert!(merged.contains(&st("http://x.org/g", ks::INCLUDE, RdfObject::iri("http://x.org/m1"))));
    }

    #[test]
    fn incoming_edges_fan_out_to_members() {
        let mut stmts = coordination("http://x.org/g");
        stmts.push(st("http://x.org/e", P, RdfObject::iri("http://x.org/g")));
        let merged = merge_groups(stmts, &GroupMergeConfig::default());
        assert!(merged.contains(&st("http://x.org/e", P, RdfObject::iri("http://x.org/m1"))));
        assert!(merged.contains(&st("http://x.org/e", P, RdfObject::iri("http://x.org/m2"))));
    }

    #[test]
    fn relations_between_anonymous_groups_become_cross_product() {
        let mut stmts = coordination("http://x.org/g");
        stmts.push(st("http://x.org/h", ks::INCLUDE, RdfObject::iri("http://x.org/a")));
        stmts.push(st("http://x.org/h", ks::INCLUDE, RdfObject::iri("http://x.org/b")));
        stmts.push(st("http://x.org/g", P, RdfObject::iri("http://x.org/h")));
        let merged = merge_groups(stmts, &GroupMergeConfig::default());
        for s in ["http://x.org/m1", "http://x.org/m2"] {
            for o in ["http://x.org/a", "http://x.org/b"] {
                assert!(merged.contains(&st(s, P, RdfObject::iri(o))), "{s} -> {o}");
            }
        }
    }

    #[test]
    fn self_identity_links_are_dropped() {
        let mut stmts = coordination("http://x.org/g");
        stmts.push(st("http://x.org/e", owl::SAME_AS, RdfObject::iri("http://base.org/e2")));
        stmts.push(st("http://x.org/e", owl::SAME_AS, RdfObject::Node(RdfNode::blank("b"))));
        stmts.push(st("http://x.org/e", owl::SAME_AS, RdfObject::iri("http://dbpedia.org/resource/E")));
        let config = GroupMergeConfig {
            base_iri: Some("http://base.org/".to_string()),
            ..GroupMergeConfig::default()
        };
        let merged = merge_groups(stmts, &config);
        let same_as: Vec<_> = merged.iter().filter(|s| s.predicate_iri == owl::SAME_AS).collect();
        assert_eq!(same_as.len(), 1);
    }
}
