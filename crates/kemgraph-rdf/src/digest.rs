//! Stable content digests.
//!
//! We use a **simple, deterministic, non-cryptographic** hash throughout:
//!
//! - algorithm: **FNV-1a 64-bit**
//! - output: `"fnv1a64:<16 lowercase hex digits>"` for text digests, and bare
//!   16-digit hex local names for fact identifiers.
//!
//! Fact identifiers hash a kind-tagged serialization of `(subject, predicate, object)`:
//!
//! - IRI: `\u{1}` then the IRI
//! - blank node: `\u{2}` then the label
//! - literal: `\u{3}` then the lexical form, then the datatype when it is not
//!   `xsd:string`, otherwise the language tag when present
//!
//! Every token is terminated with `\u{0}` so adjacent tokens cannot run together.
//! The result depends only on the triple, never on emission order or process state.
//!
//! Notes:
//! - These digests are **not** a security primitive; they are identity tools for
//!   idempotent re-runs.

use crate::{RdfNode, RdfObject};

/// Prefix used in serialized text digests.
pub const FNV1A64_PREFIX: &str = "fnv1a64:";

const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x00000100000001b3;

const TAG_IRI: &str = "\u{1}";
const TAG_BNODE: &str = "\u{2}";
const TAG_LITERAL: &str = "\u{3}";
const TAG_ABSENT: &str = "\u{4}";
const TAG_SELF: &str = "\u{5}";

/// Incremental FNV-1a 64-bit hasher over a sequence of string tokens.
#[derive(Debug, Clone, Copy)]
pub struct Fnv1a64 {
    hash: u64,
}

impl Default for Fnv1a64 {
    fn default() -> Self {
        Self {
            hash: FNV_OFFSET_BASIS,
        }
    }
}

impl Fnv1a64 {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_bytes(&mut self, bytes: &[u8]) {
        for b in bytes {
            self.hash ^= (*b) as u64;
            self.hash = self.hash.wrapping_mul(FNV_PRIME);
        }
    }

    /// Add one token followed by its terminator.
    pub fn add(&mut self, token: &str) {
        self.add_bytes(token.as_bytes());
        self.add_bytes(&[0]);
    }

    pub fn add_node(&mut self, node: &RdfNode) {
        match node {
            RdfNode::Iri(iri) => {
                self.add(TAG_IRI);
                self.add(iri);
            }
            RdfNode::BlankNode(bn) => {
                self.add(TAG_BNODE);
                self.add(bn);
            }
        }
    }

    pub fn add_object(&mut self, object: &RdfObject) {
        match object {
            RdfObject::Node(node) => self.add_node(node),
            RdfObject::Literal(lit) => {
                self.add(TAG_LITERAL);
                self.add(&lit.lexical);
                if let Some(dt) = &lit.datatype {
                    self.add(dt);
                } else if let Some(lang) = &lit.language {
                    self.add(lang);
                }
            }
        }
    }

    /// Add an optional node, using `self_id` as a placeholder marker when the node is the
    /// identifier being computed.
    pub fn add_node_relative(&mut self, node: Option<&RdfNode>, self_id: &RdfNode) {
        match node {
            None => self.add(TAG_ABSENT),
            Some(n) if n == self_id => self.add(TAG_SELF),
            Some(n) => self.add_node(n),
        }
    }

    pub fn add_object_relative(&mut self, object: &RdfObject, self_id: &RdfNode) {
        match object {
            RdfObject::Node(n) if n == self_id => self.add(TAG_SELF),
            other => self.add_object(other),
        }
    }

    pub fn finish(&self) -> u64 {
        self.hash
    }

    pub fn hex(&self) -> String {
        format!("{:016x}", self.hash)
    }
}

/// Compute a text digest (FNV-1a 64-bit) over arbitrary bytes.
pub fn fnv1a64_digest_bytes(bytes: &[u8]) -> String {
    let mut h = Fnv1a64::new();
    h.add_bytes(bytes);
    format!("{FNV1A64_PREFIX}{}", h.hex())
}

/// Digest of whitespace-normalized text: runs of whitespace collapse to one space and
/// leading/trailing whitespace is dropped.
pub fn text_hash(raw_text: &str) -> String {
    let normalized = raw_text.split_whitespace().collect::<Vec<_>>().join(" ");
    fnv1a64_digest_bytes(normalized.as_bytes())
}

/// Hex content hash of a triple.
pub fn fact_hash(subject: &RdfNode, predicate_iri: &str, object: &RdfObject) -> String {
    let mut h = Fnv1a64::new();
    h.add_node(subject);
    h.add(TAG_IRI);
    h.add(predicate_iri);
    h.add_object(object);
    h.hex()
}

/// Fact identifier: `namespace` followed by the triple's content hash.
pub fn fact_iri(namespace: &str, subject: &RdfNode, predicate_iri: &str, object: &RdfObject) -> RdfNode {
    RdfNode::Iri(format!(
        "{namespace}{}",
        fact_hash(subject, predicate_iri, object)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RdfLiteral;

    fn s() -> RdfNode {
        RdfNode::iri("http://x.org/s")
    }

    #[test]
    fn digest_has_expected_prefix_and_width() {
        let d = fnv1a64_digest_bytes(b"hello");
        assert!(d.starts_with(FNV1A64_PREFIX));
        assert_eq!(d.len(), FNV1A64_PREFIX.len() + 16);
    }

    #[test]
    fn fnv_matches_reference_vectors() {
        let mut h = Fnv1a64::new();
        h.add_bytes(b"");
        assert_eq!(h.finish(), 0xcbf29ce484222325);
        let mut h = Fnv1a64::new();
        h.add_bytes(b"a");
        assert_eq!(h.finish(), 0xaf63dc4c8601ec8c);
    }

    #[test]
    fn text_hash_ignores_whitespace_layout() {
        assert_eq!(text_hash("  a  b\n\tc "), text_hash("a b c"));
        assert_ne!(text_hash("a b c"), text_hash("a bc"));
    }

    #[test]
    fn fact_id_is_deterministic() {
        let o = RdfObject::from("x");
        assert_eq!(fact_hash(&s(), "http://x.org/p", &o), fact_hash(&s(), "http://x.org/p", &o));
        assert_eq!(fact_hash(&s(), "http://x.org/p", &o).len(), 16);
    }

    #[test]
    fn fact_id_distinguishes_term_kinds() {
        let as_iri = RdfObject::iri("http://x.org/o");
        let as_literal = RdfObject::from("http://x.org/o");
        let as_blank = RdfObject::Node(RdfNode::blank("http://x.org/o"));
        let a = fact_hash(&s(), "http://x.org/p", &as_iri);
        let b = fact_hash(&s(), "http://x.org/p", &as_literal);
        let c = fact_hash(&s(), "http://x.org/p", &as_blank);
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(b, c);
    }

    #[test]
    fn fact_id_changes_with_language_tag() {
        let en = RdfObject::Literal(RdfLiteral::lang("Rome", "en"));
        let it = RdfObject::Literal(RdfLiteral::lang("Rome", "it"));
        assert_ne!(
            fact_hash(&s(), "http://x.org/p", &en),
            fact_hash(&s(), "http://x.org/p", &it)
        );
    }

    #[test]
    fn fact_iri_uses_namespace() {
        let id = fact_iri("fact:", &s(), "http://x.org/p", &RdfObject::from(3i64));
        assert!(id.value().starts_with("fact:"));
        assert_eq!(id.value().len(), "fact:".len() + 16);
    }
}
