use callkit_engine::scan::standard_registry;
use callkit_engine::scan::text::{is_nil_literal, split_sequence};
use callkit_engine::{exported_field_name, PrimitiveKind, ScanError, TypeDescriptor, Value};
use chrono::{DateTime, FixedOffset, TimeDelta, TimeZone};
use proptest::prelude::*;

fn text_of(kind: PrimitiveKind) -> TypeDescriptor {
    TypeDescriptor::primitive(kind)
}

fn coerce(text: &str, ty: &TypeDescriptor) -> Result<Value, ScanError> {
    standard_registry().coerce(text, ty)
}

fn instant() -> impl Strategy<Value = DateTime<FixedOffset>> {
    (
        -2_000_000_000i64..4_000_000_000,
        0u32..1_000_000_000,
        -12i32..=14,
    )
        .prop_filter_map("valid instant", |(secs, nanos, hours)| {
            let offset = FixedOffset::east_opt(hours * 3600)?;
            offset.timestamp_opt(secs, nanos).single()
        })
}

proptest! {
    #[test]
    fn int_text_round_trips(n in any::<i64>()) {
        let v = Value::Int(n);
        prop_assert_eq!(coerce(&v.to_text(), &text_of(PrimitiveKind::I64)).unwrap(), v);
    }

    #[test]
    fn uint_text_round_trips(n in any::<u64>()) {
        let v = Value::Uint(n);
        prop_assert_eq!(coerce(&v.to_text(), &text_of(PrimitiveKind::U64)).unwrap(), v);
    }

    #[test]
    fn float_text_round_trips(f in proptest::num::f64::NORMAL | proptest::num::f64::ZERO) {
        let v = Value::Float(f);
        prop_assert_eq!(coerce(&v.to_text(), &text_of(PrimitiveKind::F64)).unwrap(), v);
    }

    #[test]
    fn narrow_ints_reject_out_of_range(n in 128i64..100_000) {
        prop_assert!(coerce(&n.to_string(), &text_of(PrimitiveKind::I8)).is_err());
    }

    #[test]
    fn bool_text_round_trips(b in any::<bool>()) {
        let v = Value::Bool(b);
        prop_assert_eq!(coerce(&v.to_text(), &text_of(PrimitiveKind::Bool)).unwrap(), v);
    }

    #[test]
    fn text_is_taken_verbatim(s in ".{0,64}") {
        let v = Value::from(s.as_str());
        prop_assert_eq!(coerce(&s, &text_of(PrimitiveKind::Text)).unwrap(), v);
    }

    #[test]
    fn optional_text_round_trips(s in ".{0,16}") {
        let ty = TypeDescriptor::optional(text_of(PrimitiveKind::Text));
        let v = Value::some(Value::from(s.as_str()));
        let expected = if is_nil_literal(&s) { Value::none() } else { v.clone() };
        prop_assert_eq!(coerce(&v.to_text(), &ty).unwrap(), expected);
    }

    #[test]
    fn instant_text_round_trips(t in instant()) {
        let v = Value::Instant(t);
        prop_assert_eq!(coerce(&v.to_text(), &text_of(PrimitiveKind::Instant)).unwrap(), v);
    }

    #[test]
    fn duration_text_round_trips(nanos in -1_000_000_000_000_000i64..1_000_000_000_000_000) {
        let v = Value::Duration(TimeDelta::nanoseconds(nanos));
        prop_assert_eq!(coerce(&v.to_text(), &text_of(PrimitiveKind::Duration)).unwrap(), v);
    }

    #[test]
    fn string_sequence_round_trips(items in prop::collection::vec("[a-z ,\\[\\]{}\"\\\\]{0,8}", 0..6)) {
        let v = Value::Sequence(items.iter().map(|s| Value::from(s.as_str())).collect());
        let ty = TypeDescriptor::sequence(text_of(PrimitiveKind::Text));
        prop_assert_eq!(coerce(&v.to_text(), &ty).unwrap(), v);
    }

    #[test]
    fn nested_int_sequence_round_trips(rows in prop::collection::vec(prop::collection::vec(any::<i32>(), 0..4), 0..4)) {
        let v = Value::Sequence(
            rows.iter()
                .map(|row| Value::Sequence(row.iter().map(|n| Value::Int(i64::from(*n))).collect()))
                .collect(),
        );
        let ty = TypeDescriptor::sequence(TypeDescriptor::sequence(text_of(PrimitiveKind::I32)));
        prop_assert_eq!(coerce(&v.to_text(), &ty).unwrap(), v);
    }

    #[test]
    fn split_count_matches_top_level_elements(items in prop::collection::vec(any::<u16>(), 1..10)) {
        let literal = format!(
            "[{}]",
            items.iter().map(|n| format!("[{n},{n}]")).collect::<Vec<_>>().join(",")
        );
        prop_assert_eq!(split_sequence(&literal).unwrap().len(), items.len());
    }

    #[test]
    fn fixed_length_mismatch_is_reported(items in prop::collection::vec(any::<u8>(), 0..8)) {
        prop_assume!(items.len() != 3);
        let literal = format!(
            "[{}]",
            items.iter().map(u8::to_string).collect::<Vec<_>>().join(",")
        );
        let ty = TypeDescriptor::array(text_of(PrimitiveKind::U8), 3);
        let err = coerce(&literal, &ty).unwrap_err();
        prop_assert!(
            matches!(err, ScanError::LengthMismatch { expected: 3, .. }),
            "unexpected {:?}",
            err
        );
    }

    #[test]
    fn exported_name_keeps_tail(name in "[a-z][a-zA-Z0-9_]{0,12}") {
        let exported = exported_field_name(&name);
        prop_assert!(exported.to_lowercase().ends_with(&name[1..].to_lowercase()));
        prop_assert!(exported.chars().next().is_some_and(|c| !c.is_lowercase()));
    }
}
