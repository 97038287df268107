//! Vocabulary IRIs used by the mention graph.
//!
//! Each module exposes its namespace as `NS` plus one constant per term.

macro_rules! vocabulary {
    ($ns:literal; $($name:ident => $local:literal),* $(,)?) => {
        pub const NS: &str = $ns;
        $(pub const $name: &str = concat!($ns, $local);)*
    };
}

pub mod rdf {
    vocabulary!("http://www.w3.org/1999/02/22-rdf-syntax-ns#";
        TYPE => "type",
        LANG_STRING => "langString",
    );
}

pub mod rdfs {
    vocabulary!("http://www.w3.org/2000/01/rdf-schema#";
        LABEL => "label",
    );
}

pub mod owl {
    vocabulary!("http://www.w3.org/2002/07/owl#";
        SAME_AS => "sameAs",
    );
}

pub mod xsd {
    vocabulary!("http://www.w3.org/2001/XMLSchema#";
        STRING => "string",
        INT => "int",
        INTEGER => "integer",
        DOUBLE => "double",
        BOOLEAN => "boolean",
        DATE_TIME => "dateTime",
    );
}

pub mod dct {
    vocabulary!("http://purl.org/dc/terms/";
        TITLE => "title",
        CREATOR => "creator",
        CREATED => "created",
        LANGUAGE => "language",
        IDENTIFIER => "identifier",
    );
}

pub mod foaf {
    vocabulary!("http://xmlns.com/foaf/0.1/";
        NAME => "name",
    );
}

pub mod gaf {
    vocabulary!("http://groundedannotationframework.org/gaf#";
        DENOTED_BY => "denotedBy",
    );
}

pub mod gr {
    vocabulary!("http://purl.org/goodrelations/v1#";
        PRICE_SPECIFICATION => "PriceSpecification",
    );
}

pub mod nwr {
    vocabulary!("http://www.newsreader-project.eu/ontologies/";
        PERSON => "PERSON",
        ORGANIZATION => "ORGANIZATION",
        LOCATION => "LOCATION",
        MISC => "MISC",
    );
}

/// KnowledgeStore resource-layer vocabulary.
pub mod ks {
    vocabulary!("http://dkm.fbk.eu/ontologies/knowledgestore#";
        RESOURCE => "Resource",
        TEXT => "Text",
        NAF => "NAF",
        ENTITY => "Entity",
        TEXT_HASH => "textHash",
        ANNOTATED_WITH => "annotatedWith",
        ANNOTATION_OF => "annotationOf",
        VERSION => "version",
        LAYER => "layer",
        NAF_FILE_NAME => "nafFileName",
        NAF_FILE_TYPE => "nafFileType",
        NAF_PAGES => "nafPages",
        INCLUDE => "include",
        EXPRESSED_BY => "expressedBy",
    );
}

/// Knowledge extraction model, core part (mentions and fragments).
pub mod kem {
    vocabulary!("http://knowledgestore.fbk.eu/ontologies/kem/core#";
        MENTION => "Mention",
        COMPOSITE_FRAGMENT => "CompositeFragment",
        HAS_COMPONENT => "hasComponent",
        FRAGMENT_OF => "fragmentOf",
        HAS_ANNOTATION => "hasAnnotation",
    );
}

/// Knowledge extraction model, text part (semantic annotation kinds).
pub mod kemt {
    vocabulary!("http://knowledgestore.fbk.eu/ontologies/kem/text#";
        TEXT_RESOURCE => "TextResource",
        ARGUMENT_C => "Argument",
        COORDINATION => "Coordination",
        COREFERENCE => "Coreference",
        ENTITY_ANNOTATION => "EntityAnnotation",
        NAMED_ENTITY => "NamedEntity",
        PARTICIPATION => "Participation",
        PREDICATE_C => "Predicate",
        TIMEX => "Timex",
        ARGUMENT_P => "argument",
        CONJUNCT => "conjunct",
        CONJUNCT_STRING => "conjunctString",
        COREFERRING => "coreferring",
        GROUP => "group",
        OBJECT_VALUE => "objectValue",
        PREDICATE_P => "predicate",
        RAW_STRING => "rawString",
        PROPER_NAME => "properName",
        TYPE_P => "type",
        UNIT => "unit",
        TT_DATE => "tt_date",
        TT_TIME => "tt_time",
        TT_DURATION => "tt_duration",
        HAS_SAME_HEAD_AS => "hasSameHeadAs",
    );
}

pub mod nif {
    vocabulary!("http://persistence.uni-leipzig.org/nlp2rdf/ontologies/nif-core#";
        CONTEXT => "Context",
        RFC5147_STRING => "RFC5147String",
        CONFIDENCE => "confidence",
        ANCHOR_OF => "anchorOf",
        BEGIN_INDEX => "beginIndex",
        END_INDEX => "endIndex",
        IS_STRING => "isString",
        LEMMA => "lemma",
        OLIA_LINK => "oliaLink",
        SOURCE_URL => "sourceUrl",
        SUB_STRING => "subString",
    );
}

pub mod itsrdf {
    vocabulary!("http://www.w3.org/2005/11/its/rdf#";
        TA_IDENT_REF => "taIdentRef",
        TERM_INFO_REF => "termInfoRef",
        TA_CLASS_REF => "taClassRef",
        TA_PROP_REF => "taPropRef",
    );
}

pub mod owltime {
    vocabulary!("http://www.w3.org/TR/owl-time#";
        DATE_TIME_DESCRIPTION => "DateTimeDescription",
        DATE_TIME_INTERVAL => "DateTimeInterval",
        DURATION_DESCRIPTION => "DurationDescription",
        PROPER_INTERVAL => "ProperInterval",
        YEAR => "year",
        MONTH => "month",
        WEEK => "week",
        DAY => "day",
        DAY_OF_WEEK => "dayOfWeek",
        HOUR => "hour",
        MINUTE => "minute",
        SECOND => "second",
        YEARS => "years",
        MONTHS => "months",
        WEEKS => "weeks",
        DAYS => "days",
        HOURS => "hours",
        MINUTES => "minutes",
        SECONDS => "seconds",
        HAS_DATE_TIME_DESCRIPTION => "hasDateTimeDescription",
        HAS_DURATION_DESCRIPTION => "hasDurationDescription",
        INTERVAL_STARTED_BY => "intervalStartedBy",
        INTERVAL_FINISHED_BY => "intervalFinishedBy",
        UNIT_TYPE => "unitType",
        UNIT_YEAR => "unitYear",
        UNIT_MONTH => "unitMonth",
        UNIT_WEEK => "unitWeek",
        UNIT_DAY => "unitDay",
        UNIT_HOUR => "unitHour",
        UNIT_MINUTE => "unitMinute",
        UNIT_SECOND => "unitSecond",
        MONDAY => "Monday",
        TUESDAY => "Tuesday",
        WEDNESDAY => "Wednesday",
        THURSDAY => "Thursday",
        FRIDAY => "Friday",
        SATURDAY => "Saturday",
        SUNDAY => "Sunday",
    );
}

/// Known-named namespace used when picking group representatives.
pub const DBPEDIA_RESOURCE_NS: &str = "http://dbpedia.org/resource/";
