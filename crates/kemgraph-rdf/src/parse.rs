//! Reading statements back from RDF serializations (Sophia-backed).
//!
//! The extraction engine only ever *writes* N-Quads, but the merge pass runs over the
//! concatenated output of many documents, so it needs to read them back. Sophia
//! handles the syntax; terms are converted into our own model through their display
//! form, which keeps the rest of the crate independent of Sophia's term types.

use anyhow::{anyhow, Result};
use sophia::api::prelude::*;
use std::path::Path;

use crate::vocab::{rdf, xsd};
use crate::{RdfLiteral, RdfNode, RdfObject, RdfStatement};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RdfFormat {
    NTriples,
    Turtle,
    NQuads,
    TriG,
    RdfXml,
}

impl RdfFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_lowercase();
        match ext.as_str() {
            "nt" | "ntriples" => Ok(RdfFormat::NTriples),
            "ttl" | "turtle" => Ok(RdfFormat::Turtle),
            "nq" | "nquads" => Ok(RdfFormat::NQuads),
            "trig" => Ok(RdfFormat::TriG),
            "rdf" | "owl" | "xml" => Ok(RdfFormat::RdfXml),
            other => Err(anyhow!("unsupported RDF format: .{other}")),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RdfParseError {
    #[error("invalid literal term (missing closing quote): {0}")]
    UnterminatedLiteral(String),
    #[error("unsupported RDF term form: {0}")]
    UnsupportedTerm(String),
    #[error("expected IRI/blank node, got literal: {0}")]
    UnexpectedLiteral(String),
}

fn unescape_rdf_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Parse a term in N-Triples-like display form.
pub fn parse_term_display(term: &str) -> std::result::Result<RdfObject, RdfParseError> {
    let s = term.trim();

    if let Some(rest) = s.strip_prefix('<').and_then(|t| t.strip_suffix('>')) {
        return Ok(RdfObject::Node(RdfNode::Iri(rest.to_string())));
    }

    if let Some(rest) = s.strip_prefix("_:") {
        return Ok(RdfObject::Node(RdfNode::BlankNode(rest.to_string())));
    }

    if s.starts_with('"') {
        let mut end_quote = None;
        let mut escaped = false;
        for (i, ch) in s.char_indices().skip(1) {
            if escaped {
                escaped = false;
                continue;
            }
            if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                end_quote = Some(i);
                break;
            }
        }
        let Some(end) = end_quote else {
            return Err(RdfParseError::UnterminatedLiteral(s.to_string()));
        };

        let lexical = unescape_rdf_string(&s[1..end]);
        let rest = s[end + 1..].trim();

        let mut literal = RdfLiteral::string(lexical);
        if let Some(lang) = rest.strip_prefix('@') {
            literal.language = Some(lang.to_ascii_lowercase());
        } else if let Some(dt) = rest.strip_prefix("^^") {
            let dt = dt.trim();
            let dt = dt
                .strip_prefix('<')
                .and_then(|t| t.strip_suffix('>'))
                .unwrap_or(dt);
            // xsd:string and rdf:langString are implicit in our model.
            if !dt.is_empty() && dt != xsd::STRING && dt != rdf::LANG_STRING {
                literal.datatype = Some(dt.to_string());
            }
        }
        return Ok(RdfObject::Literal(literal));
    }

    Err(RdfParseError::UnsupportedTerm(s.to_string()))
}

fn parse_node_term_display(term: &str) -> std::result::Result<RdfNode, RdfParseError> {
    match parse_term_display(term)? {
        RdfObject::Node(node) => Ok(node),
        RdfObject::Literal(_) => Err(RdfParseError::UnexpectedLiteral(term.to_string())),
    }
}

fn push_statement(
    out: &mut Vec<RdfStatement>,
    subject: &str,
    predicate: &str,
    object: &str,
    graph_name: Option<String>,
) -> std::result::Result<(), RdfParseError> {
    let subject = parse_node_term_display(subject)?;
    let RdfNode::Iri(predicate_iri) = parse_node_term_display(predicate)? else {
        return Ok(());
    };
    let object = parse_term_display(object)?;
    let graph_name = graph_name
        .map(|g| parse_node_term_display(&g))
        .transpose()?;
    out.push(RdfStatement {
        subject,
        predicate_iri,
        object,
        graph_name,
    });
    Ok(())
}

/// Feed every triple (or quad) of a Sophia source into `out`, keeping document order.
macro_rules! drain {
    (triples, $source:expr, $out:expr, $label:literal) => {
        $source
            .try_for_each_triple(|t| -> std::result::Result<(), RdfParseError> {
                let (s, p, o) = (t.s().to_string(), t.p().to_string(), t.o().to_string());
                push_statement($out, &s, &p, &o, None)
            })
            .map_err(|e| anyhow!(concat!("failed to parse ", $label, ": {}"), e))?
    };
    (quads, $source:expr, $out:expr, $label:literal) => {
        $source
            .try_for_each_quad(|q| -> std::result::Result<(), RdfParseError> {
                let (s, p, o) = (q.s().to_string(), q.p().to_string(), q.o().to_string());
                push_statement($out, &s, &p, &o, q.g().map(|g| g.to_string()))
            })
            .map_err(|e| anyhow!(concat!("failed to parse ", $label, ": {}"), e))?
    };
}

/// Parse all statements of a serialized RDF document, in document order.
pub fn parse_statements(bytes: &[u8], format: RdfFormat) -> Result<Vec<RdfStatement>> {
    use sophia::turtle::parser::{nq, nt, trig, turtle};

    let reader = std::io::BufReader::new(bytes);
    let mut out: Vec<RdfStatement> = Vec::new();
    match format {
        RdfFormat::NTriples => drain!(triples, nt::parse_bufread(reader), &mut out, "N-Triples"),
        RdfFormat::Turtle => drain!(triples, turtle::parse_bufread(reader), &mut out, "Turtle"),
        RdfFormat::RdfXml => drain!(triples, sophia::xml::parser::parse_bufread(reader), &mut out, "RDF/XML"),
        RdfFormat::NQuads => drain!(quads, nq::parse_bufread(reader), &mut out, "N-Quads"),
        RdfFormat::TriG => drain!(quads, trig::parse_bufread(reader), &mut out, "TriG"),
    }
    tracing::debug!(?format, statements = out.len(), "parsed RDF");
    Ok(out)
}

pub fn parse_statements_file(path: &Path) -> Result<Vec<RdfStatement>> {
    let bytes = std::fs::read(path)?;
    let format = RdfFormat::from_path(path)?;
    parse_statements(&bytes, format)
}
