//! TIMEX3 temporal values.
//!
//! Normalized TIMEX3 codes come in two shapes:
//!
//! - interval-like codes (`2003`, `2003-09-22T10:30`, `2003-W05-WE`, `199X`, `2003-WI`)
//!   parse into an [`Interval`] of two [`DateTime`]s,
//! - duration codes (`P3Y6M4DT12H30M5S`) parse into a [`Duration`].
//!
//! Parsing distinguishes three outcomes:
//! - `Ok(Some(value))`: a structured value,
//! - `Ok(None)`: well-formed but not representable (unknown `X` quantities, reference
//!   codes such as `PRESENT_REF`); callers fall back to an opaque identifier,
//! - `Err(TemporalError)`: the code violates the lexical grammar or combines fields in
//!   an unexpected way.
//!
//! Every value renders back to a code with `Display`, and `parse(to_string(v)) == v`.
//! Values emit themselves as OWL-Time descriptions into a [`StatementSink`].

pub mod calendar;
pub mod datetime;
pub mod duration;
pub mod error;
pub mod interval;

use kemgraph_rdf::{RdfNode, RdfObject, StatementSink};
use std::fmt;

pub use datetime::DateTime;
pub use duration::Duration;
pub use error::TemporalError;
pub use interval::Interval;

/// Either kind of temporal value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemporalValue {
    Interval(Interval),
    Duration(Duration),
}

impl TemporalValue {
    /// Parse a code, dispatching on its shape (`P…` is a duration, except `PAST_REF`
    /// and `PRESENT_REF`).
    pub fn parse(code: &str) -> Result<Option<Self>, TemporalError> {
        let norm = code.trim().to_ascii_uppercase();
        if norm.starts_with('P') && !norm.ends_with("_REF") {
            Ok(Duration::parse(&norm)?.map(TemporalValue::Duration))
        } else {
            Ok(Interval::parse(&norm)?.map(TemporalValue::Interval))
        }
    }

    pub fn to_rdf(&self, sink: &mut StatementSink, namespace: &str, ctx: Option<&RdfNode>) -> RdfNode {
        match self {
            TemporalValue::Interval(i) => i.to_rdf(sink, namespace, ctx),
            TemporalValue::Duration(d) => d.to_rdf(sink, namespace, ctx),
        }
    }
}

impl fmt::Display for TemporalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemporalValue::Interval(i) => i.fmt(f),
            TemporalValue::Duration(d) => d.fmt(f),
        }
    }
}

/// Emit one statement, in `ctx` when given.
pub(crate) fn emit(
    sink: &mut StatementSink,
    subject: &RdfNode,
    predicate_iri: &str,
    object: impl Into<RdfObject>,
    ctx: Option<&RdfNode>,
) {
    match ctx {
        Some(graph) => sink.emit_in(subject, predicate_iri, object, graph),
        None => sink.emit(subject, predicate_iri, object),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_on_code_shape() {
        assert!(matches!(
            TemporalValue::parse("P2D").unwrap(),
            Some(TemporalValue::Duration(_))
        ));
        assert!(matches!(
            TemporalValue::parse("2003-10").unwrap(),
            Some(TemporalValue::Interval(_))
        ));
        assert_eq!(TemporalValue::parse("PAST_REF").unwrap(), None);
        assert_eq!(TemporalValue::parse("present_ref").unwrap(), None);
    }
}
