//! Participations between predicate mentions and their argument mentions.

use kemgraph_rdf::vocab::{itsrdf, kemt};
use kemgraph_rdf::local_name;

use crate::context::{DocumentContext, Participation};
use crate::document::{Predicate, Role};
use crate::report::Step;
use crate::span_index::MentionHandle;
use crate::ExtractError;

pub fn run(ctx: &mut DocumentContext<'_>) {
    let doc = ctx.doc;
    for predicate in &doc.predicates {
        for role in &predicate.roles {
            if !ctx.ids_in_scope(&role.span) {
                continue;
            }
            let item = format!("{}/{}", predicate.id, role.id);
            ctx.run_item(Step::Role, &item, |ctx| process(ctx, predicate, role));
        }
    }
}

/// Mention standing for the role filler: the best mention on the span head, or a
/// mention with exactly the span's extent when the span has no head.
fn argument_mention(ctx: &DocumentContext<'_>, span: &[usize]) -> Option<MentionHandle> {
    match ctx.index.head(span) {
        Some(head) => ctx.best_mention(head),
        None => ctx.exact_mention(span),
    }
}

fn process(ctx: &mut DocumentContext<'_>, predicate: &Predicate, role: &Role) -> Result<(), ExtractError> {
    let Some(&predicate_mention) = ctx.predicate_mentions.get(&predicate.id) else {
        if ctx.skipped_predicates.contains(&predicate.id) {
            tracing::debug!(predicate = %predicate.id, role = %role.id, "role of a skipped predicate");
            return Ok(());
        }
        return Err(ExtractError::UnknownPredicate(predicate.id.clone()));
    };
    let role_span = ctx.span(&role.span, &role.id)?;
    let predicate_span = ctx.span(&predicate.span, &predicate.id)?;

    let Some(argument) = argument_mention(ctx, &role_span) else {
        tracing::debug!(predicate = %predicate.id, role = %role.id, "no mention for role filler");
        return Ok(());
    };

    let Some(predicate_shadow) = ctx.annotate(predicate_mention, &predicate.id, kemt::PREDICATE_C) else {
        return Ok(());
    };
    let Some(argument_shadow) = ctx.annotate(argument, &role.id, kemt::ARGUMENT_C) else {
        return Ok(());
    };
    if let Some(raw) = ctx.fragment(&predicate_span) {
        ctx.sink.emit(&predicate_shadow, kemt::RAW_STRING, raw);
    }
    let role_raw = ctx.fragment(&role_span);
    if let Some(raw) = &role_raw {
        ctx.sink.emit(&argument_shadow, kemt::RAW_STRING, raw);
    }

    let mut extent = Vec::new();
    for handle in [predicate_mention, argument] {
        if let Some(mention) = ctx.mentions.get(handle) {
            extent.extend_from_slice(&mention.extent);
        }
    }
    let Some(participation_mention) = ctx.emit_mention(&extent) else {
        return Ok(());
    };
    let raw_tokens: Vec<usize> = predicate_span.iter().chain(&role_span).copied().collect();
    let participation_raw = ctx.emit_mention(&raw_tokens);

    let id = format!("{}_{}", predicate.id, role.id);
    let participation = ctx.annotate_node(&participation_mention, &id, kemt::PARTICIPATION);
    ctx.sink.emit(&participation, kemt::PREDICATE_P, &predicate_shadow);
    ctx.sink.emit(&participation, kemt::ARGUMENT_P, &argument_shadow);
    if let Some(raw) = participation_raw {
        ctx.sink.emit(&participation, kemt::RAW_STRING, raw);
    }

    let mut roles = Vec::new();
    for ext in &role.external_refs {
        if ext.reference.is_empty() {
            continue;
        }
        let Some(property) = ctx.config.ref_iri(&ext.resource, &ext.reference) else {
            tracing::debug!(role = %role.id, resource = %ext.resource, "no namespace for role reference");
            continue;
        };
        let typed_id = format!("{}_{}", role.id, local_name(property.value()));
        let Some(typed) = ctx.annotate(argument, &typed_id, kemt::ARGUMENT_C) else {
            continue;
        };
        ctx.sink.emit(&typed, itsrdf::TA_PROP_REF, &property);
        if let Some(raw) = &role_raw {
            ctx.sink.emit(&typed, kemt::RAW_STRING, raw);
        }
        roles.push(property);
    }

    tracing::debug!(participation = %participation.value(), roles = roles.len(), "participation created");
    ctx.participations.push(Participation {
        predicate: predicate_mention,
        argument,
        roles,
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractorConfig;
    use crate::document::{Dependency, Document, ExternalRef, Token};
    use kemgraph_rdf::{RdfNode, RdfObject};

    // "John sold the car"
    fn doc() -> Document {
        let forms = [("John", "PROPN"), ("sold", "VERB"), ("the", "DET"), ("car", "NOUN")];
        let mut offset = 0;
        let tokens = forms
            .iter()
            .enumerate()
            .map(|(i, (form, upos))| {
                let t = Token {
                    id: format!("t{i}"),
                    offset,
                    length: form.len(),
                    form: form.to_string(),
                    lemma: form.to_lowercase(),
                    upos: upos.to_string(),
                    ..Default::default()
                };
                offset += form.len() + 1;
                t
            })
            .collect();
        let dep = |from: usize, to: usize, label: &str| Dependency {
            from: format!("t{from}"),
            to: format!("t{to}"),
            label: label.into(),
        };
        Document {
            uri: "http://x.org/d".into(),
            tokens,
            deps: vec![dep(1, 0, "nsubj"), dep(1, 3, "obj"), dep(3, 2, "det")],
            predicates: vec![Predicate {
                id: "pr1".into(),
                span: vec!["t1".into()],
                external_refs: vec![],
                roles: vec![Role {
                    id: "rl1".into(),
                    semrole: Some("A1".into()),
                    span: vec!["t2".into(), "t3".into()],
                    external_refs: vec![
                        ExternalRef {
                            resource: "PropBank".into(),
                            reference: "sell.01@1".into(),
                            confidence: None,
                        },
                        ExternalRef {
                            resource: "unknown-bank".into(),
                            reference: "x".into(),
                            confidence: None,
                        },
                    ],
                }],
            }],
            ..Default::default()
        }
    }

    #[test]
    fn participation_links_predicate_and_argument() {
        let d = doc();
        let cfg = ExtractorConfig::default();
        let mut ctx = DocumentContext::new(&d, &cfg);
        let predicate = ctx.resolve(&[1], true, true).unwrap();
        ctx.predicate_mentions.insert("pr1".into(), predicate);
        let car = ctx.resolve(&[3], true, true).unwrap();
        run(&mut ctx);
        assert!(ctx.report.is_clean());

        // "sold" 5..9, "car" 14..17, raw "sold the car" 5..17.
        let participation = RdfNode::iri("http://x.org/d#char=5,9;14,17pr1_rl1");
        assert!(ctx.sink.contains_triple(
            &participation,
            kemt::PREDICATE_P,
            &RdfObject::iri("http://x.org/d#char=5,9pr1")
        ));
        assert!(ctx.sink.contains_triple(
            &participation,
            kemt::ARGUMENT_P,
            &RdfObject::iri("http://x.org/d#char=14,17rl1")
        ));
        assert!(ctx.sink.contains_triple(
            &participation,
            kemt::RAW_STRING,
            &RdfObject::iri("http://x.org/d#char=5,17")
        ));
        let typed = RdfNode::iri("http://x.org/d#char=14,17rl1_sell.01@1");
        assert!(ctx.sink.contains_triple(
            &typed,
            itsrdf::TA_PROP_REF,
            &RdfObject::iri("http://www.newsreader-project.eu/ontologies/propbank/sell.01@1")
        ));
        assert!(ctx.sink.contains_triple(&typed, kemt::RAW_STRING, &RdfObject::iri("http://x.org/d#char=10,17")));

        assert_eq!(ctx.participations.len(), 1);
        assert_eq!(ctx.participations[0].argument, car);
        assert_eq!(ctx.participations[0].roles.len(), 1);
    }

    #[test]
    fn missing_predicate_mention_is_an_error_unless_skipped() {
        let d = doc();
        let cfg = ExtractorConfig::default();
        let mut ctx = DocumentContext::new(&d, &cfg);
        ctx.resolve(&[3], true, true).unwrap();
        run(&mut ctx);
        assert_eq!(ctx.report.failures.len(), 1);
        assert_eq!(ctx.report.failures[0].step, Step::Role);

        let mut ctx = DocumentContext::new(&d, &cfg);
        ctx.skipped_predicates.insert("pr1".into());
        run(&mut ctx);
        assert!(ctx.report.is_clean());
        assert!(ctx.participations.is_empty());
    }

    #[test]
    fn unresolved_argument_aborts_silently() {
        let d = doc();
        let cfg = ExtractorConfig::default();
        let mut ctx = DocumentContext::new(&d, &cfg);
        let predicate = ctx.resolve(&[1], true, true).unwrap();
        ctx.predicate_mentions.insert("pr1".into(), predicate);
        let before = ctx.sink.len();
        run(&mut ctx);
        assert!(ctx.report.is_clean());
        assert_eq!(ctx.sink.len(), before);
    }
}
