//! Round-trip properties of the serial array codec.
//!
//! Every finite integer sequence must decode back to itself, and dirty rows
//! built from a clean sequence by dropping elements without reindexing must
//! be rejected strictly but fully recovered leniently.

use proptest::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serial_array::{
    from_str, from_str_with_config, to_string, ErrorKind, ParserConfig, SerialArray,
};

/// Re-create the legacy writer's output after `unset()` without reindexing:
/// surviving elements keep their original indices and the header keeps the
/// original length.
fn dirty_text(values: &[i64], removed: &[bool]) -> String {
    let body: String = values
        .iter()
        .zip(removed)
        .enumerate()
        .filter(|(_, (_, &gone))| !gone)
        .map(|(i, (v, _))| format!("i:{};i:{};", i, v))
        .collect();
    format!("a:{}:{{{}}}", values.len(), body)
}

#[test]
fn large_random_sequence_round_trip() {
    let mut rng = StdRng::seed_from_u64(42);
    let values: Vec<i64> = (0..1000).map(|_| rng.gen_range(0..1000)).collect();

    let text = to_string(&values).unwrap();
    let decoded = from_str(&text).unwrap();

    assert_eq!(decoded.len(), values.len());
    assert_eq!(decoded.into_vec(), values);
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 256, .. ProptestConfig::default() })]

    #[test]
    fn any_sequence_round_trips(values in prop::collection::vec(any::<i64>(), 0..64)) {
        let text = to_string(&values).unwrap();
        prop_assert_eq!(from_str(&text).unwrap().into_vec(), values);
    }

    #[test]
    fn serial_array_text_round_trips(values in prop::collection::vec(-100_000i64..100_000, 0..32)) {
        let list: SerialArray = values.into_iter().collect();
        let text = list.to_serial_string();
        prop_assert!(text.starts_with(&format!("a:{}:{{", list.len())), "text has wrong prefix: {}", text);
        prop_assert!(text.ends_with('}'), "text has wrong suffix: {}", text);
        prop_assert!(!text.contains(char::is_whitespace));
        prop_assert_eq!(text.parse::<SerialArray>().unwrap(), list);
    }

    #[test]
    fn trailing_bytes_never_change_result(
        values in prop::collection::vec(any::<i64>(), 0..16),
        tail in "[ -~]{0,16}",
    ) {
        let text = format!("{}{}", to_string(&values).unwrap(), tail);
        prop_assert_eq!(from_str(&text).unwrap().into_vec(), values);
    }

    #[test]
    fn dirty_rows_strict_reject_lenient_keep(
        (values, removed) in prop::collection::vec(any::<i64>(), 2..32)
            .prop_flat_map(|v| {
                let n = v.len();
                (Just(v), prop::collection::vec(any::<bool>(), n))
            })
            .prop_filter("at least one removal", |(_, r)| r.iter().any(|&g| g)),
    ) {
        let text = dirty_text(&values, &removed);
        let kept: Vec<i64> = values
            .iter()
            .zip(&removed)
            .filter(|(_, &gone)| !gone)
            .map(|(&v, _)| v)
            .collect();

        let err = from_str(&text).unwrap_err();
        prop_assert_eq!(
            err.kind,
            ErrorKind::DirtyArray { declared: values.len(), actual: kept.len() }
        );

        let decoded = from_str_with_config(&text, ParserConfig::lenient()).unwrap();
        prop_assert_eq!(decoded.into_vec(), kept);
    }

    #[test]
    fn garbage_never_panics(input in "\\PC{0,64}") {
        let _ = from_str(&input);
        let _ = from_str_with_config(&input, ParserConfig::lenient());
    }

    #[test]
    fn non_array_prefix_is_malformed(input in "[^a].{0,32}") {
        let err = from_str(&input).unwrap_err();
        prop_assert!(err.kind.is_malformed());
        prop_assert_eq!(err.position, 0);
    }
}
