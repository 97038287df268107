//! Coordinations: conjunct mentions grouped under one group mention.

use kemgraph_rdf::vocab::kemt;
use kemgraph_rdf::{RdfNode, UnionFind};

use crate::context::{CoordinationGroup, DocumentContext};
use crate::span_index::MentionHandle;
use crate::tokens::TokenIdx;

/// Token classes linked by `conj*` edges whose governor lies in a selected sentence.
fn conjunct_classes(ctx: &DocumentContext<'_>) -> Vec<Vec<TokenIdx>> {
    let mut uf = UnionFind::new(ctx.index.len());
    for (from, to, label) in ctx.index.edges(ctx.doc) {
        if !label.to_ascii_lowercase().starts_with("conj") {
            continue;
        }
        if !ctx.config.includes_sentence(ctx.index.token(from).sentence) {
            continue;
        }
        uf.union(from, to);
    }
    uf.classes().into_iter().filter(|class| class.len() >= 2).collect()
}

/// Distinct best mentions of the class tokens, ordered by position.
fn conjunct_mentions(ctx: &DocumentContext<'_>, class: &[TokenIdx]) -> Vec<MentionHandle> {
    let mut mentions: Vec<MentionHandle> = Vec::new();
    for &t in class {
        match ctx.best_mention(t) {
            Some(m) if !mentions.contains(&m) => mentions.push(m),
            Some(_) => {}
            None => tracing::debug!(token = %ctx.index.token(t).id, "conjunct without mention"),
        }
    }
    mentions.sort_by_key(|&m| ctx.mentions.get(m).map(|mention| mention.extent[0]));
    mentions
}

pub fn run(ctx: &mut DocumentContext<'_>) {
    for class in conjunct_classes(ctx) {
        let conjuncts = conjunct_mentions(ctx, &class);
        if conjuncts.len() < 2 {
            continue;
        }
        materialize(ctx, conjuncts);
    }
}

fn materialize(ctx: &mut DocumentContext<'_>, conjuncts: Vec<MentionHandle>) {
    let mut conjunct_iris: Vec<RdfNode> = Vec::with_capacity(conjuncts.len());
    let mut terms: Vec<TokenIdx> = Vec::new();
    for &m in &conjuncts {
        if let Some(mention) = ctx.mentions.get(m) {
            conjunct_iris.push(mention.iri.clone());
            terms.extend_from_slice(&mention.extent);
        }
    }

    let Some(group) = ctx.resolve(&terms, false, false) else {
        tracing::debug!(conjuncts = conjuncts.len(), "group mention rejected");
        return;
    };
    let Some(group_iri) = ctx.mention_iri(group) else {
        return;
    };

    let mut items = Vec::with_capacity(conjuncts.len());
    for (&m, iri) in conjuncts.iter().zip(&conjunct_iris) {
        if let Some(item) = ctx.annotate(m, "coordItem", kemt::ENTITY_ANNOTATION) {
            ctx.sink.emit(&item, kemt::RAW_STRING, iri);
            items.push(item);
        }
    }

    let Some(group_annotation) = ctx.annotate(group, "group", kemt::ENTITY_ANNOTATION) else {
        return;
    };
    ctx.sink.emit(&group_annotation, kemt::RAW_STRING, &group_iri);

    let Some(coordination) = ctx.annotate(group, "coord", kemt::COORDINATION) else {
        return;
    };
    ctx.sink.emit(&coordination, kemt::RAW_STRING, &group_iri);
    ctx.sink.emit(&coordination, kemt::GROUP, &group_annotation);
    for item in &items {
        ctx.sink.emit(&coordination, kemt::CONJUNCT, item);
    }
    for iri in &conjunct_iris {
        ctx.sink.emit(&coordination, kemt::CONJUNCT_STRING, iri);
    }

    tracing::debug!(group = %group_iri.value(), conjuncts = conjuncts.len(), "coordination created");
    ctx.coordinations.push(CoordinationGroup { group, conjuncts });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractorConfig;
    use crate::document::{Dependency, Document, Token};
    use kemgraph_rdf::RdfObject;

    // "A , B and C saw D or E"
    fn doc() -> Document {
        let forms = [
            ("A", "PROPN"),
            (",", "PUNCT"),
            ("B", "PROPN"),
            ("and", "CCONJ"),
            ("C", "PROPN"),
            ("saw", "VERB"),
            ("D", "PROPN"),
            ("or", "CCONJ"),
            ("E", "PROPN"),
        ];
        let tokens = forms
            .iter()
            .enumerate()
            .map(|(i, (form, upos))| Token {
                id: format!("t{i}"),
                offset: i * 4,
                length: form.len(),
                form: form.to_string(),
                upos: upos.to_string(),
                ..Default::default()
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
            deps: vec![
                dep(5, 0, "nsubj"),
                dep(0, 2, "conj"),
                dep(0, 4, "conj"),
                dep(5, 6, "obj"),
                dep(6, 8, "conj:or"),
            ],
            ..Default::default()
        }
    }

    fn with_single_mentions(ctx: &mut DocumentContext<'_>) {
        for t in [0, 2, 4, 6, 8] {
            ctx.resolve(&[t], true, true).unwrap();
        }
    }

    #[test]
    fn conjuncts_cluster_into_groups() {
        let d = doc();
        let cfg = ExtractorConfig::default();
        let mut ctx = DocumentContext::new(&d, &cfg);
        with_single_mentions(&mut ctx);
        run(&mut ctx);

        assert_eq!(ctx.coordinations.len(), 2);
        let extents: Vec<Vec<TokenIdx>> = ctx
            .coordinations
            .iter()
            .map(|c| {
                c.conjuncts
                    .iter()
                    .map(|&m| ctx.mentions.get(m).unwrap().extent[0])
                    .collect()
            })
            .collect();
        assert_eq!(extents, vec![vec![0, 2, 4], vec![6, 8]]);

        let group = ctx.coordinations[1].group;
        let group_iri = ctx.mention_iri(group).unwrap();
        assert_eq!(group_iri, RdfNode::iri("http://x.org/d#char=24,25;32,33"));
        let coordination = RdfNode::iri("http://x.org/d#char=24,25;32,33coord");
        let conjuncts: Vec<_> = ctx.sink.objects(&coordination, kemt::CONJUNCT).cloned().collect();
        assert_eq!(
            conjuncts,
            vec![
                RdfObject::iri("http://x.org/d#char=24,25coordItem"),
                RdfObject::iri("http://x.org/d#char=32,33coordItem"),
            ]
        );
        assert!(ctx.sink.contains_triple(
            &coordination,
            kemt::GROUP,
            &RdfObject::iri("http://x.org/d#char=24,25;32,33group")
        ));
        // No containment edges for group mentions.
        assert!(ctx
            .sink
            .objects(&group_iri, kemgraph_rdf::vocab::nif::SUB_STRING)
            .next()
            .is_none());
    }

    #[test]
    fn groups_with_a_single_resolved_conjunct_are_dropped() {
        let d = doc();
        let cfg = ExtractorConfig::default();
        let mut ctx = DocumentContext::new(&d, &cfg);
        ctx.resolve(&[6], true, true).unwrap();
        run(&mut ctx);
        assert!(ctx.coordinations.is_empty());
        assert_eq!(ctx.mentions.len(), 1);
    }
}
