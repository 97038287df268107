//! TIMEX3 expressions: mention, `kemt:Timex` annotation and OWL-Time value.

use kemgraph_rdf::vocab::{kemt, owltime};
use kemgraph_rdf::{RdfNode, RdfObject};
use kemgraph_temporal::{Duration, Interval, TemporalValue};

use crate::context::DocumentContext;
use crate::document::Timex;
use crate::report::Step;
use crate::ExtractError;

pub fn run(ctx: &mut DocumentContext<'_>) {
    let doc = ctx.doc;
    for timex in &doc.timexes {
        if !ctx.ids_in_scope(&timex.span) {
            continue;
        }
        ctx.run_item(Step::Timex, &timex.id, |ctx| process(ctx, timex));
    }
}

/// `kemt:type` value and the parsed temporal value, checked before anything is emitted.
fn classify(timex: &Timex) -> Result<(&'static str, Option<TemporalValue>), ExtractError> {
    let kind = timex.timex_type.trim().to_lowercase();
    let tt = match kind.as_str() {
        "date" => kemt::TT_DATE,
        "time" => kemt::TT_TIME,
        "duration" => kemt::TT_DURATION,
        _ => {
            return Err(ExtractError::UnsupportedTimexType {
                item: timex.id.clone(),
                timex_type: kind,
            })
        }
    };
    let value = match timex.value.as_deref() {
        None => None,
        Some(code) if tt == kemt::TT_DURATION => Duration::parse(code)?.map(TemporalValue::Duration),
        Some(code) => Interval::parse(code)?.map(TemporalValue::Interval),
    };
    if value.is_none() {
        tracing::debug!(id = %timex.id, value = ?timex.value, "temporal value not representable");
    }
    Ok((tt, value))
}

fn process(ctx: &mut DocumentContext<'_>, timex: &Timex) -> Result<(), ExtractError> {
    let span = ctx.span(&timex.span, &timex.id)?;
    let terms = ctx.index.filter_terms(&span);
    if terms.is_empty() {
        tracing::debug!(id = %timex.id, "timex span empty after trimming");
        return Ok(());
    }
    let (tt, value) = classify(timex)?;

    let Some(mention) = ctx.resolve(&terms, true, true) else {
        return Ok(());
    };
    let Some(annotation) = ctx.annotate(mention, &timex.id, kemt::TIMEX) else {
        return Ok(());
    };
    ctx.sink.emit(&annotation, kemt::TYPE_P, RdfObject::iri(tt));

    let namespace = ctx.config.owltime_namespace.clone();
    let value_iri = match value {
        Some(TemporalValue::Interval(interval)) => interval.to_rdf(&mut ctx.sink, &namespace, None),
        Some(TemporalValue::Duration(duration)) => {
            let description = duration.to_rdf(&mut ctx.sink, &namespace, None);
            let value_iri = duration.value_iri(&namespace);
            ctx.sink.emit(&value_iri, owltime::HAS_DURATION_DESCRIPTION, description);
            value_iri
        }
        None => {
            let suggested = match &timex.value {
                Some(v) => v.clone(),
                None => ctx.index.label(&span),
            };
            ctx.minter.mint(&timex.id, Some(suggested.as_str()))
        }
    };

    ctx.sink.emit(&annotation, kemt::OBJECT_VALUE, &value_iri);
    let type_key = format!("timex.{}", timex.timex_type.trim().to_lowercase());
    ctx.emit_mapped_types(&value_iri, &type_key);

    let raw: Option<RdfNode> = ctx.fragment(&terms);
    if let Some(raw) = raw {
        ctx.sink.emit(&annotation, kemt::RAW_STRING, raw);
    }
    tracing::debug!(id = %timex.id, annotation = %annotation.value(), "timex annotated");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractorConfig;
    use crate::document::{Document, Token};
    use kemgraph_rdf::vocab::rdf;

    fn doc(timex_type: &str, value: Option<&str>) -> Document {
        let forms = [("in", "ADP"), ("the", "DET"), ("winter", "NOUN"), ("2003", "NUM")];
        let mut offset = 0;
        let tokens = forms
            .iter()
            .enumerate()
            .map(|(i, (form, upos))| {
                let t = Token {
                    id: format!("w{i}"),
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
            timexes: vec![Timex {
                id: "tmx1".into(),
                timex_type: timex_type.into(),
                value: value.map(str::to_string),
                span: vec!["w1".into(), "w2".into(), "w3".into()],
            }],
            ..Default::default()
        }
    }

    #[test]
    fn season_becomes_an_interval_value() {
        let d = doc("DATE", Some("2003-WI"));
        let cfg = ExtractorConfig::default();
        let mut ctx = DocumentContext::new(&d, &cfg);
        run(&mut ctx);
        assert!(ctx.report.is_clean());

        // The leading determiner is trimmed away.
        let mention = ctx.exact_mention(&[2, 3]).unwrap();
        let mention_iri = ctx.mention_iri(mention).unwrap();
        assert_eq!(mention_iri, RdfNode::iri("http://x.org/d#char=7,18"));

        let annotation = RdfNode::iri("http://x.org/d#char=7,18tmx1");
        let expected = Interval::parse("2003-WI").unwrap().unwrap().iri(&cfg.owltime_namespace);
        assert!(ctx.sink.contains_triple(&annotation, kemt::TYPE_P, &RdfObject::iri(kemt::TT_DATE)));
        assert!(ctx.sink.contains_triple(&annotation, kemt::OBJECT_VALUE, &RdfObject::from(&expected)));
        assert!(ctx.sink.contains_triple(&annotation, kemt::RAW_STRING, &RdfObject::from(&mention_iri)));
        assert!(ctx.sink.contains_triple(
            &expected,
            rdf::TYPE,
            &RdfObject::iri(owltime::DATE_TIME_INTERVAL)
        ));
        assert!(ctx.overlaps_annotation(&[3], kemt::TIMEX));
    }

    #[test]
    fn duration_points_to_its_description() {
        let d = doc("duration", Some("P3Y"));
        let cfg = ExtractorConfig::default();
        let mut ctx = DocumentContext::new(&d, &cfg);
        run(&mut ctx);
        let duration = Duration::parse("P3Y").unwrap().unwrap();
        let value = duration.value_iri(&cfg.owltime_namespace);
        let description = duration.iri(&cfg.owltime_namespace);
        assert!(ctx.sink.contains_triple(
            &value,
            owltime::HAS_DURATION_DESCRIPTION,
            &RdfObject::from(&description)
        ));
    }

    #[test]
    fn unrepresentable_value_falls_back_to_a_minted_iri() {
        let d = doc("date", Some("PRESENT_REF"));
        let cfg = ExtractorConfig::default();
        let mut ctx = DocumentContext::new(&d, &cfg);
        run(&mut ctx);
        let annotation = RdfNode::iri("http://x.org/d#char=7,18tmx1");
        assert!(ctx.sink.contains_triple(
            &annotation,
            kemt::OBJECT_VALUE,
            &RdfObject::iri("http://x.org/d#PRESENT_REF")
        ));
    }

    #[test]
    fn malformed_and_unsupported_timexes_are_reported_without_a_mention() {
        for (kind, value) in [("date", Some("20X3-W")), ("set", Some("P1W"))] {
            let d = doc(kind, value);
            let cfg = ExtractorConfig::default();
            let mut ctx = DocumentContext::new(&d, &cfg);
            run(&mut ctx);
            assert_eq!(ctx.report.failures.len(), 1, "{kind}");
            assert!(ctx.mentions.is_empty());
        }
    }
}
