//! Property tests for the temporal text syntax and value rendering.

use callkit_core::types::temporal::{format_duration, format_instant, parse_duration, parse_instant};
use chrono::{DateTime, FixedOffset, TimeDelta, TimeZone};
use proptest::prelude::*;

fn arb_instant() -> impl Strategy<Value = DateTime<FixedOffset>> {
    (
        -253_402_300_000i64..253_402_300_000i64,
        0u32..1_000_000_000,
        -(23 * 3600i32)..(23 * 3600i32),
    )
        .prop_filter_map("representable instant", |(secs, nanos, offset)| {
            let offset = FixedOffset::east_opt(offset - offset % 60)?;
            offset.timestamp_opt(secs, nanos).single()
        })
        .prop_filter("four digit year", |t| {
            let year = chrono::Datelike::year(t);
            (0..=9999).contains(&year)
        })
}

proptest! {
    #[test]
    fn duration_text_round_trips(nanos in any::<i64>()) {
        prop_assume!(nanos != i64::MIN);
        let d = TimeDelta::nanoseconds(nanos);
        prop_assert_eq!(parse_duration(&format_duration(&d)).unwrap(), d);
    }

    #[test]
    fn instant_text_round_trips(t in arb_instant()) {
        prop_assert_eq!(parse_instant(&format_instant(&t)).unwrap(), t);
    }

    #[test]
    fn duration_parser_never_panics(s in "[-+]?[0-9.]{0,6}(ns|us|ms|s|m|h|d)?[0-9]{0,3}") {
        let _ = parse_duration(&s);
    }
}
