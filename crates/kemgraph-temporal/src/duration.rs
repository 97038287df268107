//! ISO-8601 style durations (`P3Y6M4DT12H30M5S`).

use kemgraph_rdf::vocab::{owltime, rdf, rdfs};
use kemgraph_rdf::{RdfNode, RdfObject, StatementSink};
use nom::{
    bytes::complete::take_while1,
    character::complete::{char, one_of},
    combinator::{all_consuming, opt},
    multi::many0,
    sequence::{pair, preceded},
    IResult,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{emit, TemporalError};

/// Non-negative amounts per unit; zero means the unit is absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Duration {
    pub years: u32,
    pub months: u32,
    pub weeks: u32,
    pub days: u32,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

type Component<'a> = (&'a str, char);

fn component<'a>(units: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, Component<'a>> {
    pair(take_while1(|c: char| c.is_ascii_digit() || c == 'X'), one_of(units))
}

/// `P` date components, then optionally `T` time components.
fn duration_code(input: &str) -> IResult<&str, (Vec<Component<'_>>, Option<Vec<Component<'_>>>)> {
    all_consuming(preceded(
        char('P'),
        pair(
            many0(component("YMWD")),
            opt(preceded(char('T'), many0(component("HMS")))),
        ),
    ))(input)
}

/// Date units must appear in `Y M W D` order and time units in `H M S` order.
fn in_order(components: &[Component<'_>], order: &str) -> bool {
    let positions: Vec<Option<usize>> = components.iter().map(|(_, unit)| order.find(*unit)).collect();
    positions.windows(2).all(|w| matches!((w[0], w[1]), (Some(a), Some(b)) if a < b))
        && positions.iter().all(Option::is_some)
}

impl Duration {
    /// Parse a duration code.
    ///
    /// Codes with an unknown (`X`) quantity, and the bare designators `P` / `PT`, are
    /// well-formed but carry no usable amount: they return `Ok(None)`.
    pub fn parse(code: &str) -> Result<Option<Self>, TemporalError> {
        let norm = code.trim().to_ascii_uppercase();
        let malformed = || TemporalError::Malformed { code: norm.clone() };

        let (_, (date, time)) = duration_code(&norm).map_err(|_| malformed())?;
        let time = time.unwrap_or_default();
        if !in_order(&date, "YMWD") || !in_order(&time, "HMS") {
            return Err(malformed());
        }
        if date.is_empty() && time.is_empty() {
            return Ok(None);
        }
        if date.iter().chain(time.iter()).any(|(amount, _)| amount.contains('X')) {
            tracing::debug!(code = %norm, "duration with unknown quantity");
            return Ok(None);
        }

        let mut out = Duration::default();
        for (amount, unit) in &date {
            let v: u32 = amount.parse().map_err(|_| malformed())?;
            match unit {
                'Y' => out.years = v,
                'M' => out.months = v,
                'W' => out.weeks = v,
                _ => out.days = v,
            }
        }
        for (amount, unit) in &time {
            let v: u32 = amount.parse().map_err(|_| malformed())?;
            match unit {
                'H' => out.hours = v,
                'M' => out.minutes = v,
                _ => out.seconds = v,
            }
        }
        Ok(Some(out))
    }

    pub fn is_zero(&self) -> bool {
        *self == Duration::default()
    }

    /// IRI of the duration value itself (`{ns}P…`).
    pub fn value_iri(&self, namespace: &str) -> RdfNode {
        RdfNode::iri(format!("{namespace}{self}"))
    }

    pub fn iri(&self, namespace: &str) -> RdfNode {
        RdfNode::iri(format!("{namespace}{self}_desc"))
    }

    /// Emit an `owltime:DurationDescription` with one property per non-zero unit.
    pub fn to_rdf(&self, sink: &mut StatementSink, namespace: &str, ctx: Option<&RdfNode>) -> RdfNode {
        let iri = self.iri(namespace);
        emit(sink, &iri, rdf::TYPE, RdfObject::iri(owltime::DURATION_DESCRIPTION), ctx);
        let units = [
            (self.years, owltime::YEARS),
            (self.months, owltime::MONTHS),
            (self.weeks, owltime::WEEKS),
            (self.days, owltime::DAYS),
            (self.hours, owltime::HOURS),
            (self.minutes, owltime::MINUTES),
            (self.seconds, owltime::SECONDS),
        ];
        for (amount, property) in units {
            if amount > 0 {
                emit(sink, &iri, property, amount as i64, ctx);
            }
        }
        emit(sink, &iri, rdfs::LABEL, self.to_string(), ctx);
        iri
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("P0D");
        }
        f.write_str("P")?;
        for (amount, unit) in [(self.years, 'Y'), (self.months, 'M'), (self.weeks, 'W'), (self.days, 'D')] {
            if amount > 0 {
                write!(f, "{amount}{unit}")?;
            }
        }
        if self.hours > 0 || self.minutes > 0 || self.seconds > 0 {
            f.write_str("T")?;
            for (amount, unit) in [(self.hours, 'H'), (self.minutes, 'M'), (self.seconds, 'S')] {
                if amount > 0 {
                    write!(f, "{amount}{unit}")?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_code_parses_every_unit() {
        let d = Duration::parse("P3Y6M4DT12H30M5S").unwrap().unwrap();
        assert_eq!(
            d,
            Duration {
                years: 3,
                months: 6,
                weeks: 0,
                days: 4,
                hours: 12,
                minutes: 30,
                seconds: 5
            }
        );
        assert_eq!(d.to_string(), "P3Y6M4DT12H30M5S");
    }

    #[test]
    fn minutes_and_months_are_told_apart() {
        let d = Duration::parse("p2mt2m").unwrap().unwrap();
        assert_eq!((d.months, d.minutes), (2, 2));
    }

    #[test]
    fn unknown_quantities_are_not_zero() {
        assert_eq!(Duration::parse("PXD").unwrap(), None);
        assert_eq!(Duration::parse("P1YXM").unwrap(), None);
        assert_eq!(Duration::parse("P").unwrap(), None);
        let zero = Duration::parse("P0D").unwrap().unwrap();
        assert!(zero.is_zero());
        assert_eq!(zero.to_string(), "P0D");
    }

    #[test]
    fn grammar_violations_are_errors() {
        assert!(Duration::parse("3 days").is_err());
        assert!(Duration::parse("P1D2Y").is_err());
        assert!(Duration::parse("P1H").is_err());
    }

    #[test]
    fn days_are_emitted_as_days() {
        let d = Duration::parse("P4D").unwrap().unwrap();
        let mut sink = StatementSink::new();
        let iri = d.to_rdf(&mut sink, "http://t/", None);
        assert_eq!(iri, RdfNode::iri("http://t/P4D_desc"));
        assert!(sink.contains_triple(&iri, owltime::DAYS, &RdfObject::from(4i64)));
        assert!(!sink.iter().any(|s| s.predicate_iri == owltime::YEARS));
    }
}
