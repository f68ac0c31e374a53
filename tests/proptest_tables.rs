//! Property-based tests for table borders, sorting and stack discipline.

use std::collections::BTreeSet;

use moonlet::lang::table::{Key, Table};
use moonlet::lang::value::Value;
use moonlet::run_source;
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

/// Positive integer keys, dense enough that borders above zero are common.
fn arb_keys() -> impl Strategy<Value = BTreeSet<i64>> {
    prop::collection::btree_set(1i64..24, 0..20)
}

fn arb_word() -> impl Strategy<Value = String> {
    "[a-z]{1,4}"
}

/// A straight-line statement over a handful of variables.
fn arb_statement() -> impl Strategy<Value = String> {
    let var = prop::sample::select(vec!["a", "b", "c"]);
    let atom = prop_oneof![
        (0i64..100).prop_map(|n| n.to_string()),
        arb_word().prop_map(|s| format!("\"{}\"", s)),
        Just("true".to_string()),
        Just("false".to_string()),
        Just("{}".to_string()),
        prop::sample::select(vec!["a", "b", "c"]).prop_map(|v| v.to_string()),
    ]
    .boxed();
    let expr = prop_oneof![
        atom.clone(),
        (atom.clone(), atom).prop_map(|(l, r)| format!("{} ~= {}", l, r)),
    ];
    (0u8..4, var, expr).prop_map(|(kind, var, expr)| match kind {
        0 => format!("{} = {}", var, expr),
        1 => format!("local {} = {}", var, expr),
        2 => format!("print({})", expr),
        _ => expr,
    })
}

/// Smallest border by definition: first missing positive key, minus one.
fn expected_border(keys: &BTreeSet<i64>) -> i64 {
    let mut n = 0;
    while keys.contains(&(n + 1)) {
        n += 1;
    }
    n
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn border_is_first_gap(keys in arb_keys()) {
        let mut t = Table::new();
        for k in &keys {
            t.set(Key::Number(*k), Value::Number(*k * 10));
        }
        prop_assert_eq!(t.border(), expected_border(&keys));
    }

    #[test]
    fn string_keys_do_not_change_border(keys in arb_keys(), names in prop::collection::vec(arb_word(), 0..5)) {
        let mut t = Table::new();
        for k in &keys {
            t.set(Key::Number(*k), Value::Bool(true));
        }
        let before = t.border();
        for name in &names {
            t.set(Key::from(name.as_str()), Value::Bool(true));
        }
        prop_assert_eq!(t.border(), before);
    }

    #[test]
    fn sort_orders_sequence_and_keeps_the_rest(
        values in prop::collection::vec(-50i64..50, 0..12),
        extra in prop::collection::vec((2i64..40, -50i64..50), 0..6),
    ) {
        let mut t = Table::new();
        for (i, v) in values.iter().enumerate() {
            t.set(Key::Number(i as i64 + 1), Value::Number(*v));
        }
        // keys past a gap stay outside the sequence
        let gap = values.len() as i64 + 1;
        let extra: Vec<(i64, i64)> = extra.into_iter().map(|(k, v)| (gap + k, v)).collect();
        for (k, v) in &extra {
            t.set(Key::Number(*k), Value::Number(*v));
        }
        let outside: Vec<(i64, Value)> = extra
            .iter()
            .map(|(k, _)| (*k, t.get(&Key::Number(*k))))
            .collect();

        t.sort_sequence().unwrap();

        let mut expected = values.clone();
        expected.sort();
        let sorted: Vec<Value> = (1..=values.len() as i64).map(|i| t.get(&Key::Number(i))).collect();
        prop_assert_eq!(sorted, expected.into_iter().map(Value::Number).collect::<Vec<_>>());
        for (k, v) in outside {
            prop_assert_eq!(t.get(&Key::Number(k)), v);
        }
    }

    #[test]
    fn straight_line_programs_leave_empty_stack(
        statements in prop::collection::vec(arb_statement(), 1..12)
    ) {
        let source = statements.join("\n");
        let vm = run_source(&source, std::io::sink())
            .map_err(|e| TestCaseError::fail(format!("{}: {}", source, e)))?;
        prop_assert!(vm.stack().is_empty(), "{}: {:?}", source, vm.stack());
    }
}
