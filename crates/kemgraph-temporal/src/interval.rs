//! Time intervals from TIMEX3 date/time codes.

use chrono::Weekday;
use kemgraph_rdf::vocab::{owltime, rdf, rdfs};
use kemgraph_rdf::{RdfNode, RdfObject, StatementSink};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use crate::calendar::date_of_week;
use crate::{emit, DateTime, TemporalError};

const INTERVAL_GRAMMAR: &str = concat!(
    r"^(?:PRESENT_REF|PAST_REF|FUTURE_REF|[0-9X]{4}",
    r"(?:-(?:[0-9X]{2}|W[0-9X]{2}|SP|SU|FA|WI)(?:-(?:[0-9X]{2}|WE))?)?)?",
    r"T?(?:MO|MI|AF|EV|NI|PM|DT|[0-9X]{2}(?::[0-9X]{2}(?::[0-9X]{2})?)?)?$",
);

const REFERENCE_CODES: [&str; 3] = ["PRESENT_REF", "PAST_REF", "FUTURE_REF"];
const DAY_PERIODS: [&str; 7] = ["MO", "MI", "AF", "EV", "NI", "PM", "DT"];

fn matches_grammar(code: &str) -> bool {
    static GRAMMAR: OnceLock<Option<Regex>> = OnceLock::new();
    GRAMMAR
        .get_or_init(|| Regex::new(INTERVAL_GRAMMAR).ok())
        .as_ref()
        .is_some_and(|re| re.is_match(code))
}

/// `[begin, end]`, both inclusive. Degenerate when `begin == end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    begin: DateTime,
    end: DateTime,
}

/// Raw fields of a code before they are turned into an interval.
#[derive(Debug, Default)]
struct Fields<'a> {
    century: Option<i32>,
    decade: Option<i32>,
    year: Option<i32>,
    season: Option<&'a str>,
    month: Option<u32>,
    week: Option<u32>,
    weekend: bool,
    day: Option<u32>,
    hour: Option<u32>,
    minute: Option<u32>,
    second: Option<u32>,
}

impl Fields<'_> {
    fn has_time(&self) -> bool {
        self.hour.is_some() || self.minute.is_some() || self.second.is_some()
    }

    fn has_sub_year(&self) -> bool {
        self.season.is_some() || self.month.is_some() || self.week.is_some() || self.weekend || self.day.is_some()
    }
}

/// `X` anywhere makes the number unknown.
fn opt_num<T: std::str::FromStr>(token: &str, code: &str) -> Result<Option<T>, TemporalError> {
    if token.contains('X') {
        return Ok(None);
    }
    token
        .parse()
        .map(Some)
        .map_err(|_| TemporalError::Malformed { code: code.to_string() })
}

impl Interval {
    pub fn new(begin: DateTime, end: DateTime) -> Self {
        Self { begin, end }
    }

    pub fn instant(date_time: DateTime) -> Self {
        Self::new(date_time, date_time)
    }

    pub fn begin(&self) -> &DateTime {
        &self.begin
    }

    pub fn end(&self) -> &DateTime {
        &self.end
    }

    /// Whether the interval is a single date-time.
    pub fn is_date_time_interval(&self) -> bool {
        self.begin == self.end
    }

    /// Parse a TIMEX3 date/time code, or a `begin - end` pair of codes as produced by
    /// `Display`.
    pub fn parse(code: &str) -> Result<Option<Self>, TemporalError> {
        let norm = code.trim().to_ascii_uppercase();
        if let Some((begin, end)) = norm.split_once(" - ") {
            let begin = Self::parse(begin)?;
            let end = Self::parse(end)?;
            return Ok(match (begin, end) {
                (Some(b), Some(e)) => Some(Self::new(b.begin, e.end)),
                _ => None,
            });
        }
        if norm.is_empty() || !matches_grammar(&norm) {
            return Err(TemporalError::Malformed { code: norm });
        }

        let fields = match Self::split_fields(&norm)? {
            Some(fields) => fields,
            None => return Ok(None),
        };
        Self::from_fields(&norm, fields)
    }

    fn split_fields(norm: &str) -> Result<Option<Fields<'_>>, TemporalError> {
        let mut f = Fields::default();

        // Reference words contain a `T` of their own; the time part follows them.
        let (date_part, time_part) = match REFERENCE_CODES.iter().find(|r| norm.starts_with(**r)) {
            Some(reference) => (None, norm[reference.len()..].strip_prefix('T')),
            None => match norm.find('T') {
                Some(i) => (Some(&norm[..i]), Some(&norm[i + 1..])),
                None if norm.contains(':') => (None, None),
                None => (Some(norm), None),
            },
        };

        if let Some(date) = date_part.filter(|d| !d.is_empty()) {
            let tokens: Vec<&str> = date.split('-').collect();
            let first = tokens[0];
            let starts_digit = first.starts_with(|c: char| c.is_ascii_digit());
            let ends_digit = first.ends_with(|c: char| c.is_ascii_digit());
            if starts_digit && !ends_digit {
                // Decade (`199X`) or century (`19XX`).
                let bytes = first.as_bytes();
                if bytes.len() != 4 || !bytes[1].is_ascii_digit() {
                    return Ok(None);
                }
                if bytes[2].is_ascii_digit() {
                    f.decade = opt_num::<i32>(&first[..3], norm)?.map(|d| d * 10);
                } else {
                    f.century = opt_num::<i32>(&first[..2], norm)?.map(|c| c * 100);
                }
            } else {
                f.year = opt_num(first, norm)?;
                if let Some(second) = tokens.get(1) {
                    if !second.ends_with(|c: char| c.is_ascii_digit() || c == 'X') {
                        f.season = Some(*second);
                    } else if let Some(week) = second.strip_prefix('W') {
                        f.week = opt_num(week, norm)?;
                        f.weekend = tokens.get(2) == Some(&"WE");
                    } else {
                        f.month = opt_num(second, norm)?;
                        f.day = match tokens.get(2) {
                            Some(day) => opt_num(day, norm)?,
                            None => None,
                        };
                    }
                }
            }
        }

        if let Some(time) = time_part.filter(|t| !t.is_empty() && !DAY_PERIODS.contains(t)) {
            let mut tokens = time.split(':');
            if let Some(h) = tokens.next() {
                f.hour = opt_num(h, norm)?;
            }
            if let Some(m) = tokens.next() {
                f.minute = opt_num(m, norm)?;
            }
            if let Some(s) = tokens.next() {
                f.second = opt_num(s, norm)?;
            }
        }

        Ok(Some(f))
    }

    fn from_fields(code: &str, f: Fields<'_>) -> Result<Option<Self>, TemporalError> {
        let unexpected = || TemporalError::UnexpectedFields { code: code.to_string() };
        let date = |y: Option<i32>, m: u32, d: u32| DateTime::create(y, Some(m), None, Some(d), None, None, None);

        if let Some(century) = f.century {
            if f.decade.is_some() || f.year.is_some() || f.has_sub_year() || f.has_time() {
                return Err(unexpected());
            }
            let begin = date(Some(century), 1, 1)?;
            let end = date(Some(century + 99), 12, 31)?;
            return Ok(Some(Self::new(begin, end)));
        }

        if let Some(decade) = f.decade {
            if f.year.is_some() || f.has_sub_year() || f.has_time() {
                return Err(unexpected());
            }
            let begin = date(Some(decade), 1, 1)?;
            let end = date(Some(decade + 9), 12, 31)?;
            return Ok(Some(Self::new(begin, end)));
        }

        if let Some(season) = f.season {
            if f.month.is_some() || f.week.is_some() || f.weekend || f.day.is_some() || f.has_time() {
                return Err(unexpected());
            }
            let y = f.year;
            let (begin, end) = match season {
                "SP" => (date(y.map(|y| y - 1), 12, 21)?, date(y, 3, 19)?),
                "SU" => (date(y, 3, 20)?, date(y, 6, 20)?),
                "FA" => (date(y, 6, 21)?, date(y, 9, 21)?),
                "WI" => (date(y, 9, 22)?, date(y, 12, 29)?),
                other => {
                    return Err(TemporalError::UnknownSeason {
                        season: other.to_string(),
                    })
                }
            };
            return Ok(Some(Self::new(begin, end)));
        }

        if f.weekend {
            let (Some(year), Some(week)) = (f.year, f.week) else {
                return Err(unexpected());
            };
            if f.month.is_some() || f.day.is_some() || f.has_time() {
                return Err(unexpected());
            }
            let (Some(saturday), Some(sunday)) = (
                date_of_week(year, week, Weekday::Sat),
                date_of_week(year, week, Weekday::Sun),
            ) else {
                return Err(unexpected());
            };
            return Ok(Some(Self::new(
                DateTime::from_date(saturday),
                DateTime::from_date(sunday),
            )));
        }

        let dt = DateTime::create(f.year, f.month, f.week, f.day, f.hour, f.minute, f.second)?;
        if dt.is_unknown() {
            tracing::debug!(code, "temporal code carries no known field");
            return Ok(None);
        }
        Ok(Some(Self::instant(dt)))
    }

    pub fn iri(&self, namespace: &str) -> RdfNode {
        let local = self.to_string().replace(" - ", "_").replace(':', ".");
        RdfNode::iri(format!("{namespace}{local}"))
    }

    /// Emit the interval as an `owltime:ProperInterval`. A degenerate interval points to
    /// its date-time description; a proper one to its two degenerate end points.
    pub fn to_rdf(&self, sink: &mut StatementSink, namespace: &str, ctx: Option<&RdfNode>) -> RdfNode {
        let iri = self.iri(namespace);
        if self.is_date_time_interval() {
            let desc = self.begin.to_rdf(sink, namespace, ctx);
            emit(sink, &iri, owltime::HAS_DATE_TIME_DESCRIPTION, desc, ctx);
            emit(sink, &iri, rdf::TYPE, RdfObject::iri(owltime::DATE_TIME_INTERVAL), ctx);
        } else {
            let begin = Self::instant(self.begin).to_rdf(sink, namespace, ctx);
            let end = Self::instant(self.end).to_rdf(sink, namespace, ctx);
            emit(sink, &iri, owltime::INTERVAL_STARTED_BY, begin, ctx);
            emit(sink, &iri, owltime::INTERVAL_FINISHED_BY, end, ctx);
        }
        emit(sink, &iri, rdf::TYPE, RdfObject::iri(owltime::PROPER_INTERVAL), ctx);
        emit(sink, &iri, rdfs::LABEL, self.to_string(), ctx);
        iri
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_date_time_interval() {
            self.begin.fmt(f)
        } else {
            write!(f, "{} - {}", self.begin, self.end)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(code: &str) -> Interval {
        Interval::parse(code).unwrap().unwrap()
    }

    #[test]
    fn year_is_degenerate() {
        let i = parse("2003");
        assert!(i.is_date_time_interval());
        assert_eq!(i.begin().year(), Some(2003));
        assert_eq!(i.to_string(), "2003");
    }

    #[test]
    fn seasons_use_fixed_boundaries() {
        assert_eq!(parse("2003-WI").to_string(), "2003-09-22 - 2003-12-29");
        assert_eq!(parse("2003-SP").to_string(), "2002-12-21 - 2003-03-19");
        assert_eq!(parse("2003-SU").to_string(), "2003-03-20 - 2003-06-20");
        assert_eq!(parse("2003-FA").to_string(), "2003-06-21 - 2003-09-21");
    }

    #[test]
    fn decades_and_centuries() {
        assert_eq!(parse("199X").to_string(), "1990-01-01 - 1999-12-31");
        assert_eq!(parse("19XX").to_string(), "1900-01-01 - 1999-12-31");
        assert_eq!(Interval::parse("1X9X").unwrap(), None);
    }

    #[test]
    fn weekend_spans_saturday_and_sunday() {
        let i = parse("2003-W05-WE");
        assert_eq!(i.to_string(), "2003-02-01 - 2003-02-02");
        assert_eq!(i.begin().day_of_week(), Some(Weekday::Sat));
    }

    #[test]
    fn times_and_day_periods() {
        assert_eq!(parse("2003-09-22T10:30").to_string(), "2003-09-22T10:30");
        // Day periods are recognised but not represented.
        assert_eq!(parse("2003-09-22TMO").to_string(), "2003-09-22");
        assert_eq!(parse("T10").to_string(), "T10");
    }

    #[test]
    fn references_and_unknowns_are_not_values() {
        assert_eq!(Interval::parse("PRESENT_REF").unwrap(), None);
        assert_eq!(Interval::parse("XXXX-XX-XX").unwrap(), None);
        assert!(Interval::parse("PRESENT_REFT10:00").unwrap().is_some());
    }

    #[test]
    fn grammar_violations_are_errors() {
        assert!(matches!(Interval::parse("yesterday"), Err(TemporalError::Malformed { .. })));
        assert!(matches!(Interval::parse(""), Err(TemporalError::Malformed { .. })));
        assert!(matches!(
            Interval::parse("2003-02-30"),
            Err(TemporalError::InvalidDate { .. })
        ));
    }

    #[test]
    fn range_form_round_trips() {
        let wi = parse("2003-WI");
        assert_eq!(parse(&wi.to_string()), wi);
    }

    #[test]
    fn rdf_links_endpoints() {
        let mut sink = StatementSink::new();
        let iri = parse("2003-WI").to_rdf(&mut sink, "http://t/", None);
        assert_eq!(iri, RdfNode::iri("http://t/2003-09-22_2003-12-29"));
        assert!(sink.contains_triple(
            &iri,
            owltime::INTERVAL_STARTED_BY,
            &RdfObject::iri("http://t/2003-09-22")
        ));
        assert!(sink.contains_triple(
            &RdfNode::iri("http://t/2003-09-22"),
            owltime::HAS_DATE_TIME_DESCRIPTION,
            &RdfObject::iri("http://t/2003-09-22_desc")
        ));
        assert!(sink.contains_triple(&iri, rdfs::LABEL, &RdfObject::from("2003-09-22 - 2003-12-29")));
    }
}
