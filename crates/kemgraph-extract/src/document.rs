//! Input document model.
//!
//! This is the contract with the upstream annotation pipeline: one JSON object per
//! document carrying tokens (word form and term merged), dependency edges and the
//! annotation layers. Spans reference tokens by id. Every layer is optional.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Document {
    /// Document IRI; all minted identifiers live under it.
    pub uri: String,
    pub public_id: Option<String>,
    pub version: Option<String>,
    pub language: Option<String>,
    pub raw_text: Option<String>,
    pub file_desc: Option<FileDesc>,
    pub linguistic_processors: Vec<ProcessorLayer>,
    pub tokens: Vec<Token>,
    pub deps: Vec<Dependency>,
    pub entities: Vec<Entity>,
    pub timexes: Vec<Timex>,
    pub linked_entities: Vec<LinkedEntity>,
    pub predicates: Vec<Predicate>,
    pub corefs: Vec<Coreference>,
}

impl Document {
    pub fn from_json(text: &str) -> Result<Self> {
        let doc: Document = serde_json::from_str(text).context("invalid document JSON")?;
        Ok(doc)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("failed to parse {}", path.display()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Token {
    pub id: String,
    pub sentence: usize,
    /// Character offset into the document text.
    pub offset: usize,
    pub length: usize,
    pub form: String,
    pub lemma: String,
    /// Universal (coarse) part of speech.
    pub upos: String,
    pub pos: String,
    pub external_refs: Vec<ExternalRef>,
}

impl Token {
    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    /// The first reference from `resource`, if any.
    pub fn external_ref(&self, resource: &str) -> Option<&ExternalRef> {
        self.external_refs.iter().find(|r| r.resource == resource)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalRef {
    pub resource: String,
    pub reference: String,
    pub confidence: Option<f64>,
}

/// Governor `from` → dependent `to`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dependency {
    pub from: String,
    pub to: String,
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Entity {
    pub id: String,
    #[serde(rename = "type")]
    pub entity_type: Option<String>,
    pub named: bool,
    pub span: Vec<String>,
    pub external_refs: Vec<ExternalRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timex {
    pub id: String,
    #[serde(rename = "type")]
    pub timex_type: String,
    pub value: Option<String>,
    /// Empty for timexes without textual anchor (e.g. the document creation time).
    pub span: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkedEntity {
    pub id: String,
    pub resource: String,
    pub reference: String,
    pub confidence: Option<f64>,
    pub span: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Predicate {
    pub id: String,
    pub span: Vec<String>,
    pub external_refs: Vec<ExternalRef>,
    pub roles: Vec<Role>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Role {
    pub id: String,
    pub semrole: Option<String>,
    pub span: Vec<String>,
    pub external_refs: Vec<ExternalRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Coreference {
    pub id: String,
    #[serde(rename = "type")]
    pub coref_type: Option<String>,
    pub spans: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDesc {
    pub title: Option<String>,
    pub author: Option<String>,
    pub creation_time: Option<String>,
    pub filename: Option<String>,
    pub filetype: Option<String>,
    pub pages: Option<u32>,
}

/// Processors that contributed one annotation layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorLayer {
    pub layer: String,
    pub processors: Vec<Processor>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Processor {
    pub name: String,
    pub version: String,
    pub begin_timestamp: Option<String>,
    pub end_timestamp: Option<String>,
}
