//! Extraction options and lexical mapping tables.

use anyhow::{anyhow, bail, Result};
use kemgraph_rdf::vocab::{gr, kem, kemt, nwr, owltime, DBPEDIA_RESOURCE_NS};
use kemgraph_rdf::{clean_iri, RdfNode};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

pub const DEFAULT_OWLTIME_NAMESPACE: &str = "http://pikes.fbk.eu/time/";
pub const NER_NAMESPACE: &str = "http://pikes.fbk.eu/ner/";
pub const WN_SST_NAMESPACE: &str = "http://pikes.fbk.eu/wn/sst/";
pub const WN_SYNSET_NAMESPACE: &str = "http://wordnet-rdf.princeton.edu/wn30/";
pub const BBN_NAMESPACE: &str = "http://pikes.fbk.eu/bbn/";
pub const OLIA_UD_POS_NAMESPACE: &str = "http://fginter.github.io/docs/u/pos/all.html#";
pub const DEFAULT_FACT_NAMESPACE: &str = "fact:";

/// External-reference resource names on tokens and entities.
pub mod resource {
    pub const BBN: &str = "BBN";
    pub const WN_SYNSET: &str = "wn30-ukb";
    pub const WN_SST: &str = "wn30-sst";
    pub const VALUE: &str = "value";
    pub const VALUE_CONFIDENCE: &str = "value-confidence";
    pub const NERC_PROBMODEL: &str = "nerc-probmodel";
}

/// WordNet supersense → coarse entity type.
pub const SST_TO_TYPE: &[(&str, &str)] = &[
    ("person", "PER"),
    ("group", "ORG"),
    ("location", "LOC"),
    ("quantity", "QUANTITY"),
    ("artifact", "PRODUCT"),
    ("act", "EVENT"),
    ("event", "EVENT"),
    ("phenomenon", "EVENT"),
    ("process", "EVENT"),
    ("state", "EVENT"),
    ("animal", "MISC"),
    ("plant", "MISC"),
    ("body", "MISC"),
    ("shape", "MISC"),
    ("motive", "MISC"),
    ("object", "MISC"),
    ("substance", "MISC"),
];

pub fn sst_type(supersense: &str) -> Option<&'static str> {
    SST_TO_TYPE
        .iter()
        .find(|(sst, _)| *sst == supersense)
        .map(|(_, ty)| *ty)
}

/// Options for one extraction run. Evaluated once per document and never mutated
/// while a document is processed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// `entity.{type}` / `timex.{type}` → extra `rdf:type` classes.
    pub type_map: BTreeMap<String, Vec<String>>,
    /// Lower-cased resource name → namespace for external references.
    pub namespace_map: BTreeMap<String, String>,
    /// WordNet synset → BBN type, consumed as an opaque table.
    pub synset_to_bbn: BTreeMap<String, String>,
    pub owltime_namespace: String,
    /// Smush and group-merge the document graph.
    pub merging: bool,
    /// Re-identify facts by content and metadata.
    pub normalization: bool,
    /// Restrict extraction to these sentence indices.
    pub sentences: Option<BTreeSet<usize>>,
    /// Project annotations into instance-level facts.
    pub instances: bool,
    pub fact_namespace: String,
    pub known_named_namespace: String,
}

fn default_type_map() -> BTreeMap<String, Vec<String>> {
    let entries = [
        ("entity.person", nwr::PERSON),
        ("entity.organization", nwr::ORGANIZATION),
        ("entity.location", nwr::LOCATION),
        ("entity.misc", nwr::MISC),
        ("entity.money", gr::PRICE_SPECIFICATION),
        ("entity.date", owltime::DATE_TIME_INTERVAL),
        ("entity.time", owltime::DATE_TIME_INTERVAL),
        ("timex.date", owltime::DATE_TIME_INTERVAL),
        ("timex.duration", owltime::PROPER_INTERVAL),
    ];
    let mut map: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (key, class) in entries {
        map.entry(key.to_string()).or_default().push(class.to_string());
    }
    map
}

fn default_namespace_map() -> BTreeMap<String, String> {
    const PREMON: &str = "http://premon.fbk.eu/resource/";
    let entries = [
        ("propbank", "http://www.newsreader-project.eu/ontologies/propbank/"),
        ("nombank", "http://www.newsreader-project.eu/ontologies/nombank/"),
        ("framenet", "http://www.newsreader-project.eu/ontologies/framenet/"),
        ("verbnet", "http://www.newsreader-project.eu/ontologies/verbnet/"),
        ("premon+propbank", PREMON),
        ("premon+nombank", PREMON),
        ("premon+framenet", PREMON),
        ("premon+verbnet", PREMON),
        ("premon+propbank+co", PREMON),
        ("premon+nombank+co", PREMON),
        ("premon+framenet+co", PREMON),
        ("premon+verbnet+co", PREMON),
        ("eso", "http://www.newsreader-project.eu/domain-ontology#"),
        ("framebase", "http://framebase.org/ns/"),
        ("wordnet", "http://sli.uvigo.gal/rdf_galnet/"),
        ("wn30-ukb", WN_SYNSET_NAMESPACE),
        ("wn30-sst", WN_SST_NAMESPACE),
        ("wn30", WN_SYNSET_NAMESPACE),
        ("bbn", BBN_NAMESPACE),
        ("kem", kem::NS),
        ("kemt", kemt::NS),
        ("attribute", "attr:"),
        ("syn", WN_SYNSET_NAMESPACE),
        ("sumo", "http://www.ontologyportal.org/SUMO.owl#"),
        ("yago", "http://dbpedia.org/class/yago/"),
    ];
    entries
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            type_map: default_type_map(),
            namespace_map: default_namespace_map(),
            synset_to_bbn: BTreeMap::new(),
            owltime_namespace: DEFAULT_OWLTIME_NAMESPACE.to_string(),
            merging: false,
            normalization: false,
            sentences: None,
            instances: false,
            fact_namespace: DEFAULT_FACT_NAMESPACE.to_string(),
            known_named_namespace: DBPEDIA_RESOURCE_NS.to_string(),
        }
    }
}

fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" | "" => Ok(false),
        other => bail!("invalid boolean for `{name}`: `{other}`"),
    }
}

/// Parse a sentence list such as `0, 2;5 7`.
pub fn parse_sentences(value: &str) -> Result<BTreeSet<usize>> {
    value
        .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<usize>()
                .map_err(|e| anyhow!("invalid sentence index `{s}`: {e}"))
        })
        .collect()
}

impl ExtractorConfig {
    pub fn with_type_map(mut self, type_map: BTreeMap<String, Vec<String>>) -> Self {
        self.type_map = type_map;
        self
    }

    pub fn with_namespace_map(mut self, namespace_map: BTreeMap<String, String>) -> Self {
        self.namespace_map = namespace_map;
        self
    }

    pub fn with_synset_to_bbn(mut self, table: BTreeMap<String, String>) -> Self {
        self.synset_to_bbn = table;
        self
    }

    pub fn with_owltime_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.owltime_namespace = namespace.into();
        self
    }

    pub fn with_merging(mut self, merging: bool) -> Self {
        self.merging = merging;
        self
    }

    pub fn with_normalization(mut self, normalization: bool) -> Self {
        self.normalization = normalization;
        self
    }

    pub fn with_sentences(mut self, sentences: Option<BTreeSet<usize>>) -> Self {
        self.sentences = sentences;
        self
    }

    pub fn with_instances(mut self, instances: bool) -> Self {
        self.instances = instances;
        self
    }

    /// Apply `{prefix}fusion`, `{prefix}normalization`, `{prefix}owltime`,
    /// `{prefix}sentences` and `{prefix}instances` from a property map. A non-empty
    /// prefix is normalized to end with `.`; unrelated keys are ignored.
    pub fn with_properties(mut self, properties: &HashMap<String, String>, prefix: Option<&str>) -> Result<Self> {
        let prefix = match prefix {
            None | Some("") => String::new(),
            Some(p) if p.ends_with('.') => p.to_string(),
            Some(p) => format!("{p}."),
        };
        for (key, value) in properties {
            let Some(name) = key.strip_prefix(prefix.as_str()) else {
                continue;
            };
            match name {
                "fusion" => self.merging = parse_flag(key, value)?,
                "normalization" => self.normalization = parse_flag(key, value)?,
                "instances" => self.instances = parse_flag(key, value)?,
                "owltime" if !value.trim().is_empty() => self.owltime_namespace = value.trim().to_string(),
                "sentences" => {
                    let set = parse_sentences(value)?;
                    self.sentences = (!set.is_empty()).then_some(set);
                }
                _ => {}
            }
        }
        Ok(self)
    }

    /// Classes configured for `key` (e.g. `entity.person`).
    pub fn types_for(&self, key: &str) -> &[String] {
        self.type_map.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// IRI for an external reference, through the namespace of its resource.
    ///
    /// `#` in the reference becomes `.`. `None` for empty values or unmapped resources.
    pub fn ref_iri(&self, resource: &str, reference: &str) -> Option<RdfNode> {
        if resource.is_empty() || reference.is_empty() {
            return None;
        }
        let namespace = self.namespace_map.get(&resource.to_lowercase())?;
        Some(RdfNode::iri(clean_iri(&format!(
            "{namespace}{}",
            reference.replace('#', ".")
        ))))
    }

    pub fn includes_sentence(&self, sentence: usize) -> bool {
        self.sentences.as_ref().map_or(true, |s| s.contains(&sentence))
    }
}
