//! Predicate mentions with lemma, part of speech and frame-typed annotations.

use kemgraph_rdf::vocab::{itsrdf, kemt, nif};
use kemgraph_rdf::{local_name, RdfObject};

use crate::config::OLIA_UD_POS_NAMESPACE;
use crate::context::DocumentContext;
use crate::document::Predicate;
use crate::report::Step;
use crate::ExtractError;

pub fn run(ctx: &mut DocumentContext<'_>) {
    let doc = ctx.doc;
    for predicate in &doc.predicates {
        if !ctx.ids_in_scope(&predicate.span) {
            ctx.skipped_predicates.insert(predicate.id.clone());
            continue;
        }
        ctx.run_item(Step::Predicate, &predicate.id, |ctx| process(ctx, predicate));
    }
}

fn process(ctx: &mut DocumentContext<'_>, predicate: &Predicate) -> Result<(), ExtractError> {
    let span = ctx.span(&predicate.span, &predicate.id)?;
    let head = ctx.index.head(&span).ok_or_else(|| ExtractError::MissingHead {
        item: predicate.id.clone(),
    })?;

    if ctx.overlaps_annotation(&span, kemt::TIMEX) {
        tracing::debug!(id = %predicate.id, "skipping predicate overlapping a timex");
        ctx.skipped_predicates.insert(predicate.id.clone());
        return Ok(());
    }

    let lemma = span
        .iter()
        .map(|&t| ctx.index.token(t).lemma.to_lowercase())
        .collect::<Vec<_>>()
        .join("_");
    let pos = ctx.index.token(head).upos.clone();

    let Some(mention) = ctx.resolve(&span, true, true) else {
        ctx.skipped_predicates.insert(predicate.id.clone());
        return Ok(());
    };
    ctx.predicate_mentions.insert(predicate.id.clone(), mention);
    let Some(mention_iri) = ctx.mention_iri(mention) else {
        return Ok(());
    };
    ctx.sink.emit(&mention_iri, nif::LEMMA, lemma);
    ctx.sink.emit(&mention_iri, nif::OLIA_LINK, RdfObject::iri(format!("{OLIA_UD_POS_NAMESPACE}{pos}")));

    let mut last = None;
    for ext in &predicate.external_refs {
        if ext.resource.starts_with("dbpedia") || ext.reference.is_empty() {
            continue;
        }
        let Some(class) = ctx.config.ref_iri(&ext.resource, &ext.reference) else {
            tracing::debug!(id = %predicate.id, resource = %ext.resource, "no namespace for predicate reference");
            continue;
        };
        let id = format!("{}_{}", predicate.id, local_name(class.value()));
        let Some(annotation) = ctx.annotate(mention, &id, kemt::PREDICATE_C) else {
            continue;
        };
        ctx.sink.emit(&annotation, itsrdf::TA_CLASS_REF, &class);
        ctx.sink.emit(&annotation, kemt::RAW_STRING, &mention_iri);
        last = Some(annotation);
    }
    if let Some(annotation) = last {
        ctx.emit_common_attributes(&annotation, head);
    }
    Ok(())
}
