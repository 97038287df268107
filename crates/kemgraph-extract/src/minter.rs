//! Collision-free local names under the document IRI.

use ahash::AHashMap;
use kemgraph_rdf::{clean_iri, RdfNode};

pub use kemgraph_rdf::digest::fact_iri as fact_identifier;

/// Bijective table between source ids and minted local names.
///
/// The first mint for an id fixes its local name; later mints for the same id return
/// it unchanged, whatever label they suggest.
#[derive(Debug, Clone)]
pub struct Minter {
    document_iri: String,
    by_id: AHashMap<String, String>,
    by_name: AHashMap<String, String>,
}

impl Minter {
    pub fn new(document_iri: impl Into<String>) -> Self {
        Self {
            document_iri: document_iri.into(),
            by_id: AHashMap::new(),
            by_name: AHashMap::new(),
        }
    }

    /// `{doc}#{label}`, where the label is `suggested` (or `id`) with whitespace
    /// replaced by `_` and `_2`, `_3`, … appended until it is free.
    pub fn mint(&mut self, id: &str, suggested: Option<&str>) -> RdfNode {
        let local = match self.by_id.get(id) {
            Some(local) => local.clone(),
            None => {
                let base: String = suggested
                    .unwrap_or(id)
                    .chars()
                    .map(|c| if c.is_whitespace() { '_' } else { c })
                    .collect();
                let mut counter = 1usize;
                let local = loop {
                    let candidate = if counter == 1 {
                        base.clone()
                    } else {
                        format!("{base}_{counter}")
                    };
                    if !self.by_name.contains_key(&candidate) {
                        break candidate;
                    }
                    counter += 1;
                };
                self.by_id.insert(id.to_string(), local.clone());
                self.by_name.insert(local.clone(), id.to_string());
                local
            }
        };
        RdfNode::iri(clean_iri(&format!("{}#{local}", self.document_iri)))
    }

    pub fn local_name(&self, id: &str) -> Option<&str> {
        self.by_id.get(id).map(String::as_str)
    }

    /// The id a local name was minted for.
    pub fn id_of(&self, local_name: &str) -> Option<&str> {
        self.by_name.get(local_name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
