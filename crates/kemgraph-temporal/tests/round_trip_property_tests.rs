use kemgraph_rdf::StatementSink;
use kemgraph_temporal::{DateTime, Duration, Interval, TemporalError, TemporalValue};
use proptest::prelude::*;

fn date_code_strategy() -> impl Strategy<Value = String> {
    let year = 1900i32..2100;
    prop_oneof![
        year.clone().prop_map(|y| format!("{y:04}")),
        (year.clone(), 1u32..=12).prop_map(|(y, m)| format!("{y:04}-{m:02}")),
        (year.clone(), 1u32..=12, 1u32..=28).prop_map(|(y, m, d)| format!("{y:04}-{m:02}-{d:02}")),
        (year.clone(), 1u32..=52).prop_map(|(y, w)| format!("{y:04}-W{w:02}")),
        (year.clone(), 1u32..=52).prop_map(|(y, w)| format!("{y:04}-W{w:02}-WE")),
        (year.clone(), prop::sample::select(vec!["SP", "SU", "FA", "WI"]))
            .prop_map(|(y, s)| format!("{y:04}-{s}")),
        (190i32..210).prop_map(|d| format!("{d:03}X")),
        (year, 1u32..=12, 1u32..=28, 0u32..24, 0u32..60)
            .prop_map(|(y, m, d, h, mi)| format!("{y:04}-{m:02}-{d:02}T{h:02}:{mi:02}")),
    ]
}

fn duration_strategy() -> impl Strategy<Value = Duration> {
    (0u32..50, 0u32..12, 0u32..5, 0u32..31, 0u32..24, 0u32..60, 0u32..60).prop_map(
        |(years, months, weeks, days, hours, minutes, seconds)| Duration {
            years,
            months,
            weeks,
            days,
            hours,
            minutes,
            seconds,
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn interval_round_trips_through_display(code in date_code_strategy()) {
        let parsed = Interval::parse(&code).unwrap().unwrap();
        let again = Interval::parse(&parsed.to_string()).unwrap().unwrap();
        prop_assert_eq!(again, parsed);
    }

    #[test]
    fn interval_begin_never_after_end(code in date_code_strategy()) {
        let i = Interval::parse(&code).unwrap().unwrap();
        let key = |dt: &DateTime| (dt.year(), dt.month(), dt.day());
        prop_assert!(key(i.begin()) <= key(i.end()));
    }

    #[test]
    fn duration_round_trips_through_display(d in duration_strategy()) {
        let again = Duration::parse(&d.to_string()).unwrap().unwrap();
        prop_assert_eq!(again, d);
    }

    #[test]
    fn rdf_emission_is_deterministic(code in date_code_strategy()) {
        let value = TemporalValue::parse(&code).unwrap().unwrap();
        let mut a = StatementSink::new();
        let mut b = StatementSink::new();
        let ia = value.to_rdf(&mut a, "http://pikes.fbk.eu/time/", None);
        let ib = value.to_rdf(&mut b, "http://pikes.fbk.eu/time/", None);
        prop_assert_eq!(ia, ib);
        prop_assert_eq!(a.statements(), b.statements());
    }
}

#[test]
fn winter_2003_matches_fixed_boundaries() {
    let wi = Interval::parse("2003-WI").unwrap().unwrap();
    assert_eq!(wi.begin().to_string(), "2003-09-22");
    assert_eq!(wi.end().to_string(), "2003-12-29");
}

#[test]
fn unexpected_field_combinations_are_reported() {
    assert_eq!(
        Interval::parse("XXXX-W05-WE"),
        Err(TemporalError::UnexpectedFields {
            code: "XXXX-W05-WE".to_string()
        })
    );
    assert!(matches!(
        Interval::parse("199XT10"),
        Err(TemporalError::UnexpectedFields { .. })
    ));
}
