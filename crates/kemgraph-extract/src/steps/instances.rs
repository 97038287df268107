//! Instance projection.
//!
//! Every annotated mention denotes an instance. Instances receive minted IRIs and
//! their properties are asserted as reified facts: each triple lives in the named
//! graph of its content hash, and that fact is `ks:expressedBy` the mention it was
//! read from. Timex mentions denote their temporal value directly.
//!
//! The projected graph is what the group merge rewrites: coordination groups carry
//! `ks:include` links to their members, coreferring instances are `owl:sameAs`.

use ahash::{AHashMap, AHashSet};
use kemgraph_rdf::vocab::{foaf, gaf, itsrdf, kemt, ks, nif, owl, rdf};
use kemgraph_rdf::{RdfNode, RdfObject};

use crate::context::DocumentContext;
use crate::span_index::MentionHandle;

const ANNOTATION_ATTRIBUTES: [&str; 5] = [
    itsrdf::TA_CLASS_REF,
    itsrdf::TA_IDENT_REF,
    kemt::PROPER_NAME,
    kemt::OBJECT_VALUE,
    nif::CONFIDENCE,
];

/// Attribute statements of the annotations, read in one pass over the sink.
fn annotation_attributes(ctx: &DocumentContext<'_>) -> AttributeMap {
    let annotations: AHashSet<&RdfNode> = ctx
        .mentions
        .iter()
        .flat_map(|(handle, _)| ctx.annotations.of(handle))
        .map(|a| &a.iri)
        .collect();
    let mut out = AttributeMap::new();
    for s in ctx.sink.iter() {
        if s.graph_name.is_some() || !annotations.contains(&s.subject) {
            continue;
        }
        if let Some(p) = ANNOTATION_ATTRIBUTES.iter().find(|p| **p == s.predicate_iri) {
            out.entry(s.subject.clone()).or_default().push((*p, s.object.clone()));
        }
    }
    out
}

type AttributeMap = AHashMap<RdfNode, Vec<(&'static str, RdfObject)>>;

fn attributes_of<'a>(attributes: &'a AttributeMap, annotation: &RdfNode) -> &'a [(&'static str, RdfObject)] {
    attributes.get(annotation).map(Vec::as_slice).unwrap_or(&[])
}

fn literal_f64(object: &RdfObject) -> Option<f64> {
    match object {
        RdfObject::Literal(lit) => lit.lexical.parse().ok(),
        RdfObject::Node(_) => None,
    }
}

pub fn run(ctx: &mut DocumentContext<'_>) {
    let attributes = annotation_attributes(ctx);
    let namespace = ctx.config.fact_namespace.clone();
    let handles: Vec<MentionHandle> = ctx.mentions.iter().map(|(h, _)| h).collect();

    let mut instances: AHashMap<MentionHandle, RdfNode> = AHashMap::new();
    for handle in handles {
        if let Some(instance) = project_mention(ctx, handle, &attributes, &namespace) {
            instances.insert(handle, instance);
        }
    }

    let coordinations = std::mem::take(&mut ctx.coordinations);
    for coordination in &coordinations {
        let (Some(group), Some(group_mention)) = (
            instances.get(&coordination.group),
            ctx.mention_iri(coordination.group),
        ) else {
            continue;
        };
        for member in &coordination.conjuncts {
            if let Some(member) = instances.get(member) {
                ctx.sink
                    .emit_fact(&namespace, group, ks::INCLUDE, member, Some(&group_mention), None);
            }
        }
    }
    ctx.coordinations = coordinations;

    let coreferences = std::mem::take(&mut ctx.coreferences);
    for chain in &coreferences {
        let members: Vec<(RdfNode, RdfNode)> = chain
            .iter()
            .filter_map(|m| Some((instances.get(m)?.clone(), ctx.mention_iri(*m)?)))
            .collect();
        let Some((first, _)) = members.first() else {
            continue;
        };
        for (other, mention) in &members[1..] {
            if other != first {
                ctx.sink
                    .emit_fact(&namespace, other, owl::SAME_AS, first, Some(mention), None);
            }
        }
    }
    ctx.coreferences = coreferences;

    let participations = std::mem::take(&mut ctx.participations);
    for participation in &participations {
        let (Some(predicate), Some(argument), Some(mention)) = (
            instances.get(&participation.predicate),
            instances.get(&participation.argument),
            ctx.mention_iri(participation.predicate),
        ) else {
            continue;
        };
        for role in &participation.roles {
            let Some(property) = role.as_iri() else {
                continue;
            };
            ctx.sink
                .emit_fact(&namespace, predicate, property, argument, Some(&mention), None);
        }
    }
    ctx.participations = participations;

    tracing::debug!(instances = instances.len(), "instances projected");
}

fn project_mention(
    ctx: &mut DocumentContext<'_>,
    handle: MentionHandle,
    attributes: &AttributeMap,
    namespace: &str,
) -> Option<RdfNode> {
    let annotations = ctx.annotations.of(handle).to_vec();
    if annotations.is_empty() {
        return None;
    }
    let mention = ctx.mentions.get(handle)?;
    let (mention_iri, extent) = (mention.iri.clone(), mention.extent.clone());

    if let Some(timex) = annotations.iter().find(|a| a.kind == kemt::TIMEX) {
        let value = attributes_of(attributes, &timex.iri)
            .iter()
            .find(|(p, _)| *p == kemt::OBJECT_VALUE)
            .and_then(|(_, o)| o.as_node().cloned())?;
        ctx.sink.emit(&value, gaf::DENOTED_BY, &mention_iri);
        return Some(value);
    }

    let label = ctx.index.label(&ctx.index.filter_terms(&extent));
    let suggested = (!label.is_empty()).then_some(label.as_str());
    let instance = ctx.minter.mint(mention_iri.value(), suggested);
    ctx.sink.emit(&instance, gaf::DENOTED_BY, &mention_iri);

    if annotations.iter().any(|a| a.kind == kemt::ENTITY_ANNOTATION) {
        ctx.sink.emit_fact(
            namespace,
            &instance,
            rdf::TYPE,
            RdfObject::iri(ks::ENTITY),
            Some(&mention_iri),
            None,
        );
    }

    for annotation in &annotations {
        let attrs = attributes_of(attributes, &annotation.iri);
        let confidence = attrs
            .iter()
            .find(|(p, _)| *p == nif::CONFIDENCE)
            .and_then(|(_, o)| literal_f64(o));
        for (property, object) in attrs {
            let (predicate, confidence) = match *property {
                itsrdf::TA_CLASS_REF => (rdf::TYPE, confidence),
                itsrdf::TA_IDENT_REF => (owl::SAME_AS, confidence),
                kemt::PROPER_NAME => (foaf::NAME, None),
                _ => continue,
            };
            ctx.sink
                .emit_fact(namespace, &instance, predicate, object.clone(), Some(&mention_iri), confidence);
        }
    }
    Some(instance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractorConfig;
    use crate::context::{CoordinationGroup, Participation};
    use crate::document::{Document, Token};
    use kemgraph_rdf::{fact_iri, RdfLiteral};

    fn doc() -> Document {
        let forms = [("Rome", "PROPN"), ("and", "CCONJ"), ("Paris", "PROPN"), ("grew", "VERB")];
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
                    upos: upos.to_string(),
                    ..Default::default()
                };
                offset += form.len() + 1;
                t
            })
            .collect();
        Document {
            uri: "http://x.org/d".into(),
            tokens,
            ..Default::default()
        }
    }

    #[test]
    fn entity_annotations_become_reified_facts() {
        let d = doc();
        let cfg = ExtractorConfig::default();
        let mut ctx = DocumentContext::new(&d, &cfg);
        let rome = ctx.resolve(&[0], true, true).unwrap();
        let ann = ctx.annotate(rome, "le1", kemt::ENTITY_ANNOTATION).unwrap();
        let dbpedia = RdfObject::iri("http://dbpedia.org/resource/Rome");
        ctx.sink.emit(&ann, itsrdf::TA_IDENT_REF, dbpedia.clone());
        ctx.sink.emit(&ann, nif::CONFIDENCE, 0.5);
        ctx.sink.emit(&ann, kemt::PROPER_NAME, "Rome");
        run(&mut ctx);

        let instance = RdfNode::iri("http://x.org/d#Rome");
        let mention = ctx.mention_iri(rome).unwrap();
        assert!(ctx.sink.contains_triple(&instance, gaf::DENOTED_BY, &RdfObject::from(&mention)));

        let same_as = fact_iri(&cfg.fact_namespace, &instance, owl::SAME_AS, &dbpedia);
        assert!(ctx.sink.iter().any(|s| s.subject == instance
            && s.predicate_iri == owl::SAME_AS
            && s.graph_name.as_ref() == Some(&same_as)));
        assert!(ctx.sink.contains_triple(&same_as, ks::EXPRESSED_BY, &RdfObject::from(&mention)));
        assert!(ctx.sink.contains_triple(
            &same_as,
            nif::CONFIDENCE,
            &RdfObject::from(RdfLiteral::double(0.5))
        ));

        let name = fact_iri(&cfg.fact_namespace, &instance, foaf::NAME, &RdfObject::from("Rome"));
        assert!(ctx.sink.contains_triple(&name, ks::EXPRESSED_BY, &RdfObject::from(&mention)));
    }

    #[test]
    fn groups_and_participations_link_instances() {
        let d = doc();
        let cfg = ExtractorConfig::default();
        let mut ctx = DocumentContext::new(&d, &cfg);
        let rome = ctx.resolve(&[0], true, true).unwrap();
        let paris = ctx.resolve(&[2], true, true).unwrap();
        let group = ctx.resolve(&[0, 2], false, false).unwrap();
        let grew = ctx.resolve(&[3], true, true).unwrap();
        for m in [rome, paris, group] {
            ctx.annotate(m, "e", kemt::ENTITY_ANNOTATION).unwrap();
        }
        ctx.annotate(grew, "p", kemt::PREDICATE_C).unwrap();
        ctx.coordinations.push(CoordinationGroup {
            group,
            conjuncts: vec![rome, paris],
        });
        let role = RdfNode::iri("http://example.org/roles/A1");
        ctx.participations.push(Participation {
            predicate: grew,
            argument: group,
            roles: vec![role.clone()],
        });
        run(&mut ctx);

        let group_instance = RdfNode::iri("http://x.org/d#Rome_Paris");
        let include_triples: Vec<_> = ctx
            .sink
            .iter()
            .filter(|s| s.subject == group_instance && s.predicate_iri == ks::INCLUDE)
            .map(|s| s.object.clone())
            .collect();
        assert_eq!(
            include_triples,
            vec![
                RdfObject::iri("http://x.org/d#Rome"),
                RdfObject::iri("http://x.org/d#Paris")
            ]
        );
        assert!(ctx.sink.iter().any(|s| s.subject == RdfNode::iri("http://x.org/d#grew")
            && s.predicate_iri == role.value()
            && s.object == RdfObject::from(&group_instance)));
        // The predicate is not an entity.
        assert!(!ctx.sink.iter().any(|s| s.subject == RdfNode::iri("http://x.org/d#grew")
            && s.object == RdfObject::iri(ks::ENTITY)));
    }
}
