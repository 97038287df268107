//! Entity mentions, in four sub-passes: flat/compound groups, NER entities, linked
//! entities and single-term nouns left without an annotation.

use kemgraph_rdf::vocab::{itsrdf, kemt, nif, rdf};
use kemgraph_rdf::{clean_iri, local_name, RdfLiteral, RdfNode, RdfObject, UnionFind};

use crate::config::{resource, sst_type, NER_NAMESPACE};
use crate::context::DocumentContext;
use crate::document::{Entity, LinkedEntity};
use crate::report::Step;
use crate::tokens::TokenIdx;
use crate::ExtractError;

/// NER classes whose mentions denote attribute values rather than things.
const PROPERTY_TYPES: [&str; 7] = ["money", "cardinal", "ordinal", "percent", "language", "norp", "quantity"];

pub fn run(ctx: &mut DocumentContext<'_>) {
    compounds(ctx);
    ner_entities(ctx);
    linked_entities(ctx);
    additional_terms(ctx);
}

// ============================================================================
// Flat / compound groups
// ============================================================================

/// Token classes connected by `flat*` / `compound*` edges, with at least two members.
fn compound_classes(ctx: &DocumentContext<'_>) -> Vec<Vec<TokenIdx>> {
    let mut uf = UnionFind::new(ctx.index.len());
    for (from, to, label) in ctx.index.edges(ctx.doc) {
        let label = label.to_ascii_lowercase();
        if label.starts_with("flat") || label.starts_with("compound") {
            uf.union(from, to);
        }
    }
    uf.classes()
        .into_iter()
        .filter(|class| class.len() >= 2)
        .map(|class| ctx.index.sorted(class))
        .collect()
}

pub fn compounds(ctx: &mut DocumentContext<'_>) {
    for span in compound_classes(ctx) {
        let text = ctx.index.label(&span);
        if !ctx.in_scope(&span) {
            continue;
        }
        if span.iter().any(|&t| ctx.index.token(t).upos.eq_ignore_ascii_case("VERB")) {
            tracing::debug!(compound = %text, "skipping compound containing a verb");
            continue;
        }
        if ctx.overlaps_annotation(&span, kemt::TIMEX) {
            tracing::debug!(compound = %text, "skipping compound overlapping a timex");
            continue;
        }
        if !ctx.index.is_consecutive(&span) {
            tracing::debug!(compound = %text, "skipping compound with non-consecutive terms");
            continue;
        }
        let Some(mention) = ctx.resolve(&span, true, true) else {
            continue;
        };
        let id = format!("compound{}", ctx.index.token(span[0]).form);
        let Some(annotation) = ctx.annotate(mention, &id, kemt::ENTITY_ANNOTATION) else {
            continue;
        };
        if let Some(raw) = ctx.fragment(&span) {
            ctx.sink.emit(&annotation, kemt::RAW_STRING, raw);
        }
        if let Some(head) = ctx.index.head(&span) {
            ctx.emit_common_attributes(&annotation, head);
        }
        tracing::debug!(compound = %text, "compound annotated");
    }
}

// ============================================================================
// NER entities
// ============================================================================

pub fn ner_entities(ctx: &mut DocumentContext<'_>) {
    let doc = ctx.doc;
    for entity in &doc.entities {
        if !ctx.ids_in_scope(&entity.span) {
            continue;
        }
        ctx.run_item(Step::Ner, &entity.id, |ctx| ner_entity(ctx, entity));
    }
}

fn ner_entity(ctx: &mut DocumentContext<'_>, entity: &Entity) -> Result<(), ExtractError> {
    let span = ctx.span(&entity.span, &entity.id)?;
    let terms = ctx.index.filter_terms(&span);
    if terms.is_empty() {
        tracing::debug!(id = %entity.id, "entity span empty after trimming");
        return Ok(());
    }
    if ctx.overlaps_annotation(&terms, kemt::TIMEX) {
        tracing::debug!(id = %entity.id, "skipping entity overlapping a timex");
        return Ok(());
    }

    let label = ctx.index.label(&terms);
    let entity_type = entity.entity_type.as_deref().map(str::to_lowercase);
    let is_property = entity_type
        .as_deref()
        .is_some_and(|t| PROPERTY_TYPES.contains(&t));
    let head = ctx.index.head(&terms);

    let Some(mention) = ctx.resolve(&terms, true, true) else {
        return Ok(());
    };

    let mut typed_by_refs = false;
    for ext in &entity.external_refs {
        if ext.resource != resource::VALUE_CONFIDENCE && ext.resource != resource::NERC_PROBMODEL {
            continue;
        }
        typed_by_refs = true;
        let id = format!("{}{}", entity.id, ext.reference);
        let Some(annotation) = ctx.annotate(mention, &id, kemt::ENTITY_ANNOTATION) else {
            continue;
        };
        let class = RdfObject::iri(format!("{NER_NAMESPACE}{}", ext.reference));
        ctx.sink.emit(&annotation, itsrdf::TA_CLASS_REF, class);
        if let Some(confidence) = ext.confidence {
            ctx.sink.emit(&annotation, nif::CONFIDENCE, confidence);
        }
        finish_entity_annotation(ctx, &annotation, &terms, head, entity.named.then_some(label.as_str()));
    }

    if !typed_by_refs {
        if let Some(entity_type) = entity_type.as_deref() {
            let id = format!("{}{entity_type}", entity.id);
            if let Some(annotation) = ctx.annotate(mention, &id, kemt::ENTITY_ANNOTATION) {
                let class = RdfObject::iri(format!("{NER_NAMESPACE}{entity_type}"));
                ctx.sink.emit(&annotation, itsrdf::TA_CLASS_REF, class);
                ctx.emit_mapped_types(&annotation, &format!("entity.{entity_type}"));
                if is_property {
                    emit_entity_value(ctx, entity, entity_type, &annotation);
                }
                finish_entity_annotation(ctx, &annotation, &terms, head, entity.named.then_some(label.as_str()));
            }
        }
    }
    Ok(())
}

/// Statements shared by every entity annotation: proper name, raw string and the
/// head's sense references.
fn finish_entity_annotation(
    ctx: &mut DocumentContext<'_>,
    annotation: &RdfNode,
    terms: &[TokenIdx],
    head: Option<TokenIdx>,
    proper_name: Option<&str>,
) {
    if let Some(name) = proper_name {
        ctx.sink.emit(annotation, rdf::TYPE, RdfObject::iri(kemt::NAMED_ENTITY));
        ctx.sink.emit(annotation, kemt::PROPER_NAME, name);
    }
    if let Some(raw) = ctx.fragment(terms) {
        ctx.sink.emit(annotation, kemt::RAW_STRING, raw);
    }
    if let Some(head) = head {
        ctx.emit_common_attributes(annotation, head);
    }
}

/// Normalized value of a numeric entity, read from its `value` reference.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityValue {
    pub value: f64,
    pub units: Vec<&'static str>,
}

/// Parse the normalized value of a property entity (`€1200`, `%12.5`, `3.0`).
pub fn parse_entity_value(entity_type: &str, normalized: &str) -> Option<EntityValue> {
    let s = normalized.trim();
    if s.is_empty() {
        return None;
    }
    let (units, number) = match entity_type {
        "cardinal" | "quantity" | "ordinal" => (Vec::new(), s),
        "percent" => (Vec::new(), s.find('%').map_or(s, |i| &s[i + 1..])),
        "money" => {
            let start = s.find(|c: char| c.is_ascii_digit()).unwrap_or(s.len());
            let units = s[..start]
                .chars()
                .filter_map(|c| match c {
                    '€' => Some("EUR"),
                    '$' => Some("USD"),
                    '¥' => Some("YEN"),
                    _ => None,
                })
                .collect();
            (units, &s[start..])
        }
        _ => return None,
    };
    let value = number.trim().parse::<f64>().ok()?;
    Some(EntityValue { value, units })
}

fn emit_entity_value(ctx: &mut DocumentContext<'_>, entity: &Entity, entity_type: &str, annotation: &RdfNode) {
    let Some(normalized) = entity.external_refs.iter().find(|r| r.resource == resource::VALUE) else {
        return;
    };
    match parse_entity_value(entity_type, &normalized.reference) {
        Some(parsed) => {
            for unit in parsed.units {
                ctx.sink.emit(annotation, kemt::UNIT, unit);
            }
            ctx.sink.emit(annotation, kemt::OBJECT_VALUE, RdfLiteral::double(parsed.value));
        }
        None => tracing::debug!(
            id = %entity.id,
            value = %normalized.reference,
            "could not process normalized value"
        ),
    }
}

// ============================================================================
// Linked entities
// ============================================================================

pub fn linked_entities(ctx: &mut DocumentContext<'_>) {
    let doc = ctx.doc;
    for linked in &doc.linked_entities {
        if !ctx.ids_in_scope(&linked.span) {
            continue;
        }
        ctx.run_item(Step::LinkedEntity, &linked.id, |ctx| linked_entity(ctx, linked));
    }
}

fn linked_entity(ctx: &mut DocumentContext<'_>, linked: &LinkedEntity) -> Result<(), ExtractError> {
    let span = ctx.span(&linked.span, &linked.id)?;
    let terms = ctx.index.filter_terms(&span);
    if terms.is_empty() {
        return Ok(());
    }
    if ctx.overlaps_annotation(&terms, kemt::TIMEX) {
        tracing::debug!(id = %linked.id, "skipping linked entity overlapping a timex");
        return Ok(());
    }
    if !linked.resource.starts_with("dbpedia-") {
        tracing::debug!(id = %linked.id, resource = %linked.resource, "ignoring non-dbpedia link");
        return Ok(());
    }
    let Some(mention) = ctx.resolve(&terms, true, true) else {
        return Ok(());
    };
    let reference = RdfNode::iri(clean_iri(&linked.reference));
    let id = format!("{}_{}", linked.id, local_name(reference.value()));
    let Some(annotation) = ctx.annotate(mention, &id, kemt::ENTITY_ANNOTATION) else {
        return Ok(());
    };
    ctx.sink.emit(&annotation, itsrdf::TA_IDENT_REF, &reference);
    if let Some(confidence) = linked.confidence {
        ctx.sink.emit(&annotation, nif::CONFIDENCE, confidence);
    }
    let head = ctx.index.head(&terms);
    finish_entity_annotation(ctx, &annotation, &terms, head, None);
    Ok(())
}

// ============================================================================
// Additional terms
// ============================================================================

/// Coarse type of a term from its BBN tag, its synset or its supersense, in that
/// order of preference.
fn additional_type(ctx: &DocumentContext<'_>, term: TokenIdx) -> Option<String> {
    let token = ctx.index.token(term);
    if let Some(bbn) = token.external_ref(resource::BBN) {
        return Some(bbn.reference.clone());
    }
    if let Some(synset) = token.external_ref(resource::WN_SYNSET) {
        return ctx.config.synset_to_bbn.get(&synset.reference).cloned();
    }
    let sst = token.external_ref(resource::WN_SST)?;
    let supersense = sst.reference.rsplit('.').next().unwrap_or(&sst.reference);
    sst_type(supersense).map(str::to_string)
}

pub fn additional_terms(ctx: &mut DocumentContext<'_>) {
    for term in 0..ctx.index.len() {
        if !ctx.config.includes_sentence(ctx.index.token(term).sentence) {
            continue;
        }
        let id = ctx.index.token(term).id.clone();
        ctx.run_item(Step::AdditionalTerm, &id, |ctx| additional_term(ctx, term));
    }
}

fn additional_term(ctx: &mut DocumentContext<'_>, term: TokenIdx) -> Result<(), ExtractError> {
    if ctx.overlaps_annotation(&[term], kemt::TIMEX) {
        return Ok(());
    }
    let token = ctx.index.token(term);
    let upos = token.upos.to_ascii_uppercase();
    let named = upos == "PROPN" && ctx.best_mention(term).is_none();
    if upos != "NOUN" && upos != "PRON" && !named {
        return Ok(());
    }

    let entity_type = additional_type(ctx, term);
    let Some(mention) = ctx.resolve(&[term], true, true) else {
        return Ok(());
    };
    let id = match &entity_type {
        Some(t) => format!("{}_{t}", token.id),
        None => token.id.clone(),
    };
    let Some(annotation) = ctx.annotate(mention, &id, kemt::ENTITY_ANNOTATION) else {
        return Ok(());
    };
    if let Some(t) = &entity_type {
        ctx.sink.emit(&annotation, itsrdf::TA_CLASS_REF, RdfObject::iri(format!("{NER_NAMESPACE}{t}")));
    }
    finish_entity_annotation(ctx, &annotation, &[term], Some(term), named.then_some(token.form.as_str()));
    tracing::debug!(term = %token.id, entity_type = ?entity_type, "additional term annotated");
    Ok(())
}
