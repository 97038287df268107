//! Partially specified calendar date-times.

use chrono::{Datelike, NaiveDate, Weekday};
use kemgraph_rdf::vocab::{owltime, rdf};
use kemgraph_rdf::{RdfNode, RdfObject, StatementSink};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::calendar::{date_of_week, week_of_year};
use crate::{emit, TemporalError};

/// A date-time whose fields may each be unknown (`None`).
///
/// Construction through [`DateTime::create`] derives the fields implied by the
/// known ones: the week from month and day, the month from a week, and the day of
/// week whenever the calendar day is pinned down. The day of week takes no part in
/// equality or hashing.
#[derive(Debug, Clone, Copy, Eq, Serialize, Deserialize)]
pub struct DateTime {
    year: Option<i32>,
    month: Option<u32>,
    week: Option<u32>,
    day: Option<u32>,
    day_of_week: Option<Weekday>,
    hour: Option<u32>,
    minute: Option<u32>,
    second: Option<u32>,
}

fn check_range(field: &'static str, value: Option<u32>, lo: u32, hi: u32) -> Result<(), TemporalError> {
    match value {
        Some(v) if v < lo || v > hi => Err(TemporalError::OutOfRange { field, value: v }),
        _ => Ok(()),
    }
}

impl DateTime {
    pub fn create(
        year: Option<i32>,
        month: Option<u32>,
        week: Option<u32>,
        day: Option<u32>,
        hour: Option<u32>,
        minute: Option<u32>,
        second: Option<u32>,
    ) -> Result<Self, TemporalError> {
        check_range("month", month, 1, 12)?;
        check_range("week", week, 1, 53)?;
        check_range("day", day, 1, 31)?;
        check_range("hour", hour, 0, 24)?;
        check_range("minute", minute, 0, 59)?;
        check_range("second", second, 0, 60)?;

        let mut month = month;
        let mut week = week;
        let mut day_of_week = None;

        if let Some(y) = year {
            match (month, week, day) {
                (Some(m), _, Some(d)) => {
                    let date = NaiveDate::from_ymd_opt(y, m, d).ok_or(TemporalError::InvalidDate {
                        year: y,
                        month: m,
                        day: d,
                    })?;
                    day_of_week = Some(date.weekday());
                    if week.is_none() {
                        week = Some(week_of_year(date));
                    }
                }
                (_, Some(w), Some(d)) => {
                    // First month in which this day of the month falls in week `w`.
                    let found = (1..=12)
                        .filter_map(|m| NaiveDate::from_ymd_opt(y, m, d))
                        .find(|date| week_of_year(*date) == w);
                    if let Some(date) = found {
                        month = Some(date.month());
                        day_of_week = Some(date.weekday());
                    }
                }
                (_, Some(1), None) => month = Some(1),
                (_, Some(w), None) => {
                    month = date_of_week(y, w, Weekday::Mon).map(|monday| monday.month());
                }
                _ => {}
            }
        }

        Ok(Self {
            year,
            month,
            week,
            day,
            day_of_week,
            hour,
            minute,
            second,
        })
    }

    /// Calendar day at midnight-less precision.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: Some(date.year()),
            month: Some(date.month()),
            week: Some(week_of_year(date)),
            day: Some(date.day()),
            day_of_week: Some(date.weekday()),
            hour: None,
            minute: None,
            second: None,
        }
    }

    pub fn year(&self) -> Option<i32> {
        self.year
    }

    pub fn month(&self) -> Option<u32> {
        self.month
    }

    pub fn week(&self) -> Option<u32> {
        self.week
    }

    pub fn day(&self) -> Option<u32> {
        self.day
    }

    pub fn day_of_week(&self) -> Option<Weekday> {
        self.day_of_week
    }

    pub fn hour(&self) -> Option<u32> {
        self.hour
    }

    pub fn minute(&self) -> Option<u32> {
        self.minute
    }

    pub fn second(&self) -> Option<u32> {
        self.second
    }

    fn has_date(&self) -> bool {
        self.year.is_some() || self.month.is_some() || self.week.is_some() || self.day.is_some()
    }

    fn has_time(&self) -> bool {
        self.hour.is_some() || self.minute.is_some() || self.second.is_some()
    }

    /// No field is known.
    pub fn is_unknown(&self) -> bool {
        !self.has_date() && !self.has_time()
    }

    pub fn iri(&self, namespace: &str) -> RdfNode {
        RdfNode::iri(format!("{namespace}{}_desc", self.to_string().replace(':', ".")))
    }

    /// Emit an `owltime:DateTimeDescription` with one property per known field and the
    /// finest known unit as `owltime:unitType`.
    pub fn to_rdf(&self, sink: &mut StatementSink, namespace: &str, ctx: Option<&RdfNode>) -> RdfNode {
        let iri = self.iri(namespace);
        let mut unit_type = None;
        emit(sink, &iri, rdf::TYPE, RdfObject::iri(owltime::DATE_TIME_DESCRIPTION), ctx);
        if let Some(y) = self.year {
            emit(sink, &iri, owltime::YEAR, y as i64, ctx);
            unit_type = Some(owltime::UNIT_YEAR);
        }
        if let Some(m) = self.month {
            emit(sink, &iri, owltime::MONTH, m as i64, ctx);
            unit_type = Some(owltime::UNIT_MONTH);
        }
        if let Some(w) = self.week {
            emit(sink, &iri, owltime::WEEK, w as i64, ctx);
            unit_type = Some(owltime::UNIT_WEEK);
        }
        if let Some(d) = self.day {
            emit(sink, &iri, owltime::DAY, d as i64, ctx);
            unit_type = Some(owltime::UNIT_DAY);
        }
        if let Some(dow) = self.day_of_week {
            emit(sink, &iri, owltime::DAY_OF_WEEK, RdfObject::iri(weekday_iri(dow)), ctx);
        }
        if let Some(h) = self.hour {
            emit(sink, &iri, owltime::HOUR, h as i64, ctx);
            unit_type = Some(owltime::UNIT_HOUR);
        }
        if let Some(m) = self.minute {
            emit(sink, &iri, owltime::MINUTE, m as i64, ctx);
            unit_type = Some(owltime::UNIT_MINUTE);
        }
        if let Some(s) = self.second {
            emit(sink, &iri, owltime::SECOND, s as i64, ctx);
            unit_type = Some(owltime::UNIT_SECOND);
        }
        if let Some(unit) = unit_type {
            emit(sink, &iri, owltime::UNIT_TYPE, RdfObject::iri(unit), ctx);
        }
        iri
    }
}

fn weekday_iri(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => owltime::MONDAY,
        Weekday::Tue => owltime::TUESDAY,
        Weekday::Wed => owltime::WEDNESDAY,
        Weekday::Thu => owltime::THURSDAY,
        Weekday::Fri => owltime::FRIDAY,
        Weekday::Sat => owltime::SATURDAY,
        Weekday::Sun => owltime::SUNDAY,
    }
}

impl PartialEq for DateTime {
    fn eq(&self, other: &Self) -> bool {
        self.year == other.year
            && self.month == other.month
            && self.week == other.week
            && self.day == other.day
            && self.hour == other.hour
            && self.minute == other.minute
            && self.second == other.second
    }
}

impl Hash for DateTime {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (self.year, self.month, self.week, self.day, self.hour, self.minute, self.second).hash(state);
    }
}

struct Opt2(Option<u32>);

impl fmt::Display for Opt2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(v) => write!(f, "{v:02}"),
            None => f.write_str("XX"),
        }
    }
}

impl fmt::Display for DateTime {
    /// TIMEX3 form: `YYYY`, `YYYY-Www`, `YYYY-MM`, `YYYY-MM-DD`, then `THH[:MM[:SS]]`.
    /// Unknown fields render as `X`s. Time-only values keep their `T` prefix.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let has_time = self.has_time();
        if self.has_date() {
            match self.year {
                Some(y) => write!(f, "{y:04}")?,
                None => f.write_str("XXXX")?,
            }
            if self.week.is_some() && self.day.is_none() {
                write!(f, "-W{}", Opt2(self.week))?;
            } else if has_time || self.month.is_some() || self.day.is_some() {
                write!(f, "-{}", Opt2(self.month))?;
                if has_time || self.day.is_some() {
                    write!(f, "-{}", Opt2(self.day))?;
                }
            }
        }
        if has_time {
            write!(f, "T{}", Opt2(self.hour))?;
            if self.minute.is_some() || self.second.is_some() {
                write!(f, ":{}", Opt2(self.minute))?;
                if self.second.is_some() {
                    write!(f, ":{}", Opt2(self.second))?;
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
    fn full_date_derives_week_and_weekday() {
        let dt = DateTime::create(Some(2003), Some(9), None, Some(22), None, None, None).unwrap();
        assert_eq!(dt.week(), Some(39));
        assert_eq!(dt.day_of_week(), Some(Weekday::Mon));
        assert_eq!(dt.to_string(), "2003-09-22");
    }

    #[test]
    fn week_derives_month() {
        let w1 = DateTime::create(Some(2003), None, Some(1), None, None, None, None).unwrap();
        assert_eq!(w1.month(), Some(1));
        let w10 = DateTime::create(Some(2003), None, Some(10), None, None, None, None).unwrap();
        assert_eq!(w10.month(), Some(3));
        assert_eq!(w10.to_string(), "2003-W10");
    }

    #[test]
    fn week_and_day_find_month() {
        // Day 3 in week 10 of 2003 is March 3rd (a Monday).
        let dt = DateTime::create(Some(2003), None, Some(10), Some(3), None, None, None).unwrap();
        assert_eq!(dt.month(), Some(3));
        assert_eq!(dt.day_of_week(), Some(Weekday::Mon));
    }

    #[test]
    fn impossible_dates_are_rejected() {
        assert_eq!(
            DateTime::create(Some(2003), Some(2), None, Some(30), None, None, None),
            Err(TemporalError::InvalidDate {
                year: 2003,
                month: 2,
                day: 30
            })
        );
        assert!(DateTime::create(None, Some(13), None, None, None, None, None).is_err());
    }

    #[test]
    fn rendering_of_partial_values() {
        let t = DateTime::create(None, None, None, None, Some(10), Some(30), None).unwrap();
        assert_eq!(t.to_string(), "T10:30");
        let dt = DateTime::create(Some(2003), None, None, None, Some(9), None, Some(5)).unwrap();
        assert_eq!(dt.to_string(), "2003-XX-XXT09:XX:05");
        let unknown_year = DateTime::create(None, Some(3), None, None, None, None, None).unwrap();
        assert_eq!(unknown_year.to_string(), "XXXX-03");
    }

    #[test]
    fn rdf_description_uses_finest_unit() {
        let dt = DateTime::create(Some(2003), Some(9), None, Some(22), Some(10), None, None).unwrap();
        let mut sink = StatementSink::new();
        let iri = dt.to_rdf(&mut sink, "http://t/", None);
        assert_eq!(iri, RdfNode::iri("http://t/2003-09-22T10_desc"));
        assert!(sink.contains_triple(&iri, owltime::UNIT_TYPE, &RdfObject::iri(owltime::UNIT_HOUR)));
        assert!(sink.contains_triple(&iri, owltime::DAY_OF_WEEK, &RdfObject::iri(owltime::MONDAY)));
        assert!(sink.contains_triple(&iri, owltime::WEEK, &RdfObject::from(39i64)));
    }
}
