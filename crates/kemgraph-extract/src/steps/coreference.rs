//! Coreference chains over already-resolved entity mentions.

use kemgraph_rdf::vocab::kemt;

use crate::context::DocumentContext;
use crate::document::Coreference;
use crate::report::Step;
use crate::span_index::MentionHandle;
use crate::tokens::TokenIdx;
use crate::ExtractError;

pub fn run(ctx: &mut DocumentContext<'_>) {
    let doc = ctx.doc;
    for coref in &doc.corefs {
        if coref.coref_type.as_deref().is_some_and(|t| t.eq_ignore_ascii_case("event")) {
            continue;
        }
        ctx.run_item(Step::Coreference, &coref.id, |ctx| process(ctx, coref));
    }
}

struct Member {
    mention: MentionHandle,
    span: Vec<TokenIdx>,
}

fn process(ctx: &mut DocumentContext<'_>, coref: &Coreference) -> Result<(), ExtractError> {
    let mut members = Vec::new();
    for ids in coref.spans.iter().filter(|ids| ctx.ids_in_scope(ids)) {
        let span = ctx.span(ids, &coref.id)?;
        let Some(head) = ctx.index.head(&span) else {
            tracing::debug!(id = %coref.id, "coreferring span without head");
            continue;
        };
        match ctx.best_mention(head) {
            Some(mention) => members.push(Member { mention, span }),
            None => tracing::debug!(id = %coref.id, head = %ctx.index.token(head).id, "no mention for coreferring span"),
        }
    }
    if members.len() < 2 {
        tracing::debug!(id = %coref.id, members = members.len(), "coreference chain too short");
        return Ok(());
    }

    let mut extent = Vec::new();
    let mut raw_terms = Vec::new();
    for member in &members {
        if let Some(mention) = ctx.mentions.get(member.mention) {
            extent.extend_from_slice(&mention.extent);
        }
        raw_terms.extend_from_slice(&member.span);
    }

    let Some(chain_mention) = ctx.emit_mention(&extent) else {
        return Ok(());
    };
    let coreference = ctx.annotate_node(&chain_mention, &coref.id, kemt::COREFERENCE);

    for member in &members {
        let Some(coreferring) = ctx.annotate(member.mention, &coref.id, kemt::ENTITY_ANNOTATION) else {
            continue;
        };
        ctx.sink.emit(&coreference, kemt::COREFERRING, &coreferring);
        if let Some(raw) = ctx.fragment(&member.span) {
            ctx.sink.emit(&coreferring, kemt::RAW_STRING, raw);
        }
    }
    if let Some(raw) = ctx.fragment(&raw_terms) {
        ctx.sink.emit(&coreference, kemt::RAW_STRING, raw);
    }

    let mut chain: Vec<MentionHandle> = members.iter().map(|m| m.mention).collect();
    chain.dedup();
    tracing::debug!(id = %coref.id, members = chain.len(), "coreference created");
    ctx.coreferences.push(chain);
    Ok(())
}
