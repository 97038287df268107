//! RDF statement layer for kemgraph.
//!
//! Everything the extraction engine produces ends up as a flat, append-only set of
//! RDF statements. This crate owns:
//!
//! - the term model (`RdfNode`, `RdfLiteral`, `RdfObject`, `RdfStatement`),
//! - the vocabularies used by the mention graph (`vocab`),
//! - stable content digests and reified fact identifiers (`digest`),
//! - the de-duplicating statement sink used during extraction (`sink`),
//! - reading statements back from N-Triples / N-Quads / Turtle via Sophia (`parse`),
//! - the post-hoc canonicalization passes: `owl:sameAs` smushing (`smush`),
//!   composite group merging (`merge`) and fact-id normalization (`normalize`).
//!
//! Statements render as N-Quads through `Display`, which is the only serialization
//! the engine itself needs.

pub mod digest;
pub mod merge;
pub mod normalize;
pub mod parse;
pub mod sink;
pub mod smush;
pub mod union_find;
pub mod vocab;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use digest::{fact_iri, fnv1a64_digest_bytes, text_hash};
pub use merge::{merge, merge_groups, GroupMergeConfig};
pub use normalize::normalize_facts;
pub use parse::{parse_statements, parse_statements_file, RdfFormat};
pub use sink::StatementSink;
pub use smush::Smusher;
pub use union_find::UnionFind;

// ============================================================================
// RDF term model
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RdfNode {
    Iri(String),
    BlankNode(String),
}

impl RdfNode {
    pub fn iri(iri: impl Into<String>) -> Self {
        RdfNode::Iri(iri.into())
    }

    pub fn blank(id: impl Into<String>) -> Self {
        RdfNode::BlankNode(id.into())
    }

    pub fn as_iri(&self) -> Option<&str> {
        match self {
            RdfNode::Iri(iri) => Some(iri),
            RdfNode::BlankNode(_) => None,
        }
    }

    /// IRI string or blank node label.
    pub fn value(&self) -> &str {
        match self {
            RdfNode::Iri(iri) => iri,
            RdfNode::BlankNode(bn) => bn,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RdfLiteral {
    pub lexical: String,
    /// `None` means `xsd:string` (or `rdf:langString` when `language` is set).
    pub datatype: Option<String>,
    pub language: Option<String>,
}

impl RdfLiteral {
    pub fn string(lexical: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: None,
            language: None,
        }
    }

    pub fn typed(lexical: impl Into<String>, datatype: impl Into<String>) -> Self {
        let datatype = datatype.into();
        Self {
            lexical: lexical.into(),
            datatype: (datatype != vocab::xsd::STRING).then_some(datatype),
            language: None,
        }
    }

    pub fn lang(lexical: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: None,
            language: Some(language.into().to_ascii_lowercase()),
        }
    }

    pub fn integer(value: i64) -> Self {
        Self::typed(value.to_string(), vocab::xsd::INT)
    }

    pub fn double(value: f64) -> Self {
        Self::typed(format_double(value), vocab::xsd::DOUBLE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RdfObject {
    Node(RdfNode),
    Literal(RdfLiteral),
}

impl RdfObject {
    pub fn iri(iri: impl Into<String>) -> Self {
        RdfObject::Node(RdfNode::Iri(iri.into()))
    }

    pub fn as_node(&self) -> Option<&RdfNode> {
        match self {
            RdfObject::Node(node) => Some(node),
            RdfObject::Literal(_) => None,
        }
    }

    pub fn as_iri(&self) -> Option<&str> {
        self.as_node().and_then(RdfNode::as_iri)
    }
}

impl From<RdfNode> for RdfObject {
    fn from(value: RdfNode) -> Self {
        RdfObject::Node(value)
    }
}

impl From<&RdfNode> for RdfObject {
    fn from(value: &RdfNode) -> Self {
        RdfObject::Node(value.clone())
    }
}

impl From<RdfLiteral> for RdfObject {
    fn from(value: RdfLiteral) -> Self {
        RdfObject::Literal(value)
    }
}

impl From<&str> for RdfObject {
    fn from(value: &str) -> Self {
        RdfObject::Literal(RdfLiteral::string(value))
    }
}

impl From<String> for RdfObject {
    fn from(value: String) -> Self {
        RdfObject::Literal(RdfLiteral::string(value))
    }
}

impl From<i64> for RdfObject {
    fn from(value: i64) -> Self {
        RdfObject::Literal(RdfLiteral::integer(value))
    }
}

impl From<usize> for RdfObject {
    fn from(value: usize) -> Self {
        RdfObject::Literal(RdfLiteral::integer(value as i64))
    }
}

impl From<f64> for RdfObject {
    fn from(value: f64) -> Self {
        RdfObject::Literal(RdfLiteral::double(value))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RdfStatement {
    pub subject: RdfNode,
    pub predicate_iri: String,
    pub object: RdfObject,
    pub graph_name: Option<RdfNode>,
}

impl RdfStatement {
    pub fn new(subject: RdfNode, predicate_iri: impl Into<String>, object: RdfObject) -> Self {
        Self {
            subject,
            predicate_iri: predicate_iri.into(),
            object,
            graph_name: None,
        }
    }

    pub fn in_graph(mut self, graph_name: Option<RdfNode>) -> Self {
        self.graph_name = graph_name;
        self
    }
}

// ============================================================================
// IRI helpers
// ============================================================================

/// Local part of an IRI: after the last `#`, else the last `/`, else the last `:`.
pub fn local_name(iri: &str) -> &str {
    let split = iri
        .rfind('#')
        .or_else(|| iri.rfind('/'))
        .or_else(|| iri.rfind(':'));
    match split {
        Some(i) => &iri[i + 1..],
        None => iri,
    }
}

/// Percent-encode characters that may not appear in an IRI.
pub fn clean_iri(iri: &str) -> String {
    let mut out = String::with_capacity(iri.len());
    for c in iri.chars() {
        match c {
            ' ' | '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\' => {
                out.push_str(&format!("%{:02X}", c as u32));
            }
            c if c.is_control() => {
                let mut buf = [0u8; 4];
                for b in c.encode_utf8(&mut buf).bytes() {
                    out.push_str(&format!("%{b:02X}"));
                }
            }
            c => out.push(c),
        }
    }
    out
}

fn format_double(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

// ============================================================================
// N-Quads rendering
// ============================================================================

fn escape_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}

impl fmt::Display for RdfNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RdfNode::Iri(iri) => write!(f, "<{iri}>"),
            RdfNode::BlankNode(bn) => write!(f, "_:{bn}"),
        }
    }
}

impl fmt::Display for RdfLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", escape_literal(&self.lexical))?;
        if let Some(lang) = &self.language {
            write!(f, "@{lang}")
        } else if let Some(dt) = &self.datatype {
            write!(f, "^^<{dt}>")
        } else {
            Ok(())
        }
    }
}

impl fmt::Display for RdfObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RdfObject::Node(node) => node.fmt(f),
            RdfObject::Literal(lit) => lit.fmt(f),
        }
    }
}

impl fmt::Display for RdfStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}> {}", self.subject, self.predicate_iri, self.object)?;
        if let Some(graph) = &self.graph_name {
            write!(f, " {graph}")?;
        }
        write!(f, " .")
    }
}

/// Render statements as an N-Quads document (one statement per line).
pub fn to_nquads<'a>(statements: impl IntoIterator<Item = &'a RdfStatement>) -> String {
    let mut out = String::new();
    for stmt in statements {
        out.push_str(&stmt.to_string());
        out.push('\n');
    }
    out
}
