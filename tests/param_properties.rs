//! Property-based tests for the parameter string parser.

use proptest::prelude::*;
use rest_harness::parse_param_string;
use std::collections::BTreeMap;

/// Values that are never the literal `null` and carry no separators.
fn arb_value() -> impl Strategy<Value = String> {
    "[0-9A-Z@._-][a-zA-Z0-9@._-]{0,11}"
}

fn arb_params() -> impl Strategy<Value = BTreeMap<String, Vec<String>>> {
    prop::collection::btree_map("[a-z][a-z0-9_]{0,7}", prop::collection::vec(arb_value(), 1..4), 1..6)
}

fn join(params: &BTreeMap<String, Vec<String>>) -> String {
    params
        .iter()
        .flat_map(|(key, values)| values.iter().map(move |value| format!("{key}={value}")))
        .collect::<Vec<_>>()
        .join(",")
}

proptest! {
    #[test]
    fn parse_then_join_reproduces_pairs(params in arb_params()) {
        let input = join(&params);
        let parsed = parse_param_string(&input);

        prop_assert_eq!(parsed.len(), params.len());
        for (key, values) in &params {
            let expected: Vec<Option<String>> = values.iter().cloned().map(Some).collect();
            prop_assert_eq!(parsed.get(key), Some(expected.as_slice()));
        }

        let rejoined = parsed
            .pairs()
            .map(|(key, value)| format!("{key}={}", value.unwrap_or("null")))
            .collect::<Vec<_>>()
            .join(",");
        prop_assert_eq!(rejoined, input);
    }

    #[test]
    fn null_is_distinct_from_missing_value(
        key in "[a-z]{1,8}",
        pad in "[ ]{0,3}",
    ) {
        let input = format!("{key}={pad}null{pad},{key}{pad},{key}={pad}");
        let parsed = parse_param_string(&input);

        prop_assert_eq!(
            parsed.get(&key),
            Some(&[None, Some(String::new()), Some(String::new())][..])
        );
    }

    #[test]
    fn surrounding_whitespace_is_ignored(params in arb_params()) {
        let spaced = params
            .iter()
            .flat_map(|(key, values)| values.iter().map(move |value| format!("  {key} = {value}  ")))
            .collect::<Vec<_>>()
            .join(",");

        prop_assert_eq!(parse_param_string(&spaced), parse_param_string(&join(&params)));
    }
}
