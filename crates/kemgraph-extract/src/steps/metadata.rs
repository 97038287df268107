//! Document and annotation-resource metadata.

use kemgraph_rdf::vocab::{dct, ks, kemt, rdf};
use kemgraph_rdf::{clean_iri, text_hash, RdfLiteral, RdfNode, RdfObject};

use crate::context::DocumentContext;
use crate::report::Step;
use crate::text::language_iri;

pub fn run(ctx: &mut DocumentContext<'_>) {
    let doc = ctx.doc;
    let doc_iri = ctx.document_iri.clone();
    let naf_iri = RdfNode::iri(format!("{}.naf", doc.uri));

    for class in [kemt::TEXT_RESOURCE, ks::RESOURCE, ks::TEXT] {
        ctx.sink.emit(&doc_iri, rdf::TYPE, RdfObject::iri(class));
    }

    if let Some(fd) = &doc.file_desc {
        let fields = [
            (dct::TITLE, &fd.title),
            (dct::CREATOR, &fd.author),
            (dct::CREATED, &fd.creation_time),
            (ks::NAF_FILE_NAME, &fd.filename),
            (ks::NAF_FILE_TYPE, &fd.filetype),
        ];
        for (property, value) in fields {
            if let Some(value) = value {
                ctx.sink.emit(&doc_iri, property, value.as_str());
            }
        }
        if let Some(pages) = fd.pages {
            ctx.sink.emit(&doc_iri, ks::NAF_PAGES, RdfLiteral::integer(pages as i64));
        }
    }

    if let Some(code) = &doc.language {
        ctx.run_item(Step::Metadata, "language", |ctx| {
            let iri = language_iri(code)?;
            ctx.sink.emit(&doc_iri, dct::LANGUAGE, RdfObject::iri(iri));
            Ok(())
        });
    }

    if let Some(raw) = &doc.raw_text {
        ctx.sink.emit(&doc_iri, ks::TEXT_HASH, text_hash(raw));
    }

    ctx.sink.emit(&doc_iri, ks::ANNOTATED_WITH, &naf_iri);
    ctx.sink.emit(&naf_iri, ks::ANNOTATION_OF, &doc_iri);

    for class in [kemt::TEXT_RESOURCE, ks::RESOURCE, ks::NAF] {
        ctx.sink.emit(&naf_iri, rdf::TYPE, RdfObject::iri(class));
    }
    if let Some(version) = &doc.version {
        ctx.sink.emit(&naf_iri, ks::VERSION, version.as_str());
    }
    if let Some(public_id) = &doc.public_id {
        ctx.sink.emit(&naf_iri, dct::IDENTIFIER, public_id.as_str());
    }

    let mut timestamp: Option<&str> = None;
    for layer in &doc.linguistic_processors {
        ctx.sink.emit(&naf_iri, ks::LAYER, RdfObject::iri(format!("{}layer_{}", ks::NS, layer.layer)));
        for lp in &layer.processors {
            if timestamp.is_none() {
                timestamp = [&lp.begin_timestamp, &lp.end_timestamp]
                    .into_iter()
                    .flatten()
                    .map(String::as_str)
                    .find(|ts| !ts.is_empty());
            }
            let lp_iri = RdfNode::iri(clean_iri(&format!("{}{}.{}", ks::NS, lp.name, lp.version)));
            ctx.sink.emit(&naf_iri, dct::CREATOR, &lp_iri);
            ctx.sink.emit(&lp_iri, dct::TITLE, lp.name.as_str());
            ctx.sink.emit(&lp_iri, ks::VERSION, lp.version.as_str());
        }
    }
    if let Some(ts) = timestamp {
        ctx.sink.emit(&naf_iri, dct::CREATED, ts);
    }
}
