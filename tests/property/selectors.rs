// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for the Selector Algebra

use proptest::prelude::*;

use cim_inventory::query::{Operator, Query, SelectorError};

fn token() -> impl Strategy<Value = String> {
    "[a-z0-9][a-z0-9-]{0,7}"
}

fn values() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(token(), 0..5)
}

fn operator() -> impl Strategy<Value = Operator> {
    prop_oneof![
        Just(Operator::MatchEqual),
        Just(Operator::MatchIn),
        Just(Operator::MatchNotEqual),
        Just(Operator::MatchNotIn),
    ]
}

proptest! {
    /// Property: single-valued operators accept exactly one value
    #[test]
    fn prop_arity(op in operator(), values in values()) {
        let count = values.len();
        let result = Query::new(op, "key", values).validate();

        if op.is_single_valued() && count != 1 {
            prop_assert_eq!(result, Err(SelectorError::WrongArity { op, count }));
        } else {
            prop_assert!(result.is_ok());
        }
    }

    /// Property: only codes 0-3 name an operator
    #[test]
    fn prop_operator_codes(code in any::<u8>()) {
        match Operator::try_from(code) {
            Ok(op) => prop_assert_eq!(op.code(), code),
            Err(err) => {
                prop_assert!(code > 3);
                prop_assert_eq!(err, SelectorError::InvalidOperator(code));
            }
        }
    }

    /// Property: `in` and `notin` split every value, present or missing
    #[test]
    fn prop_set_operators_complement(values in values(), value in proptest::option::of(token())) {
        let is_in = Query::is_in("key", values.clone());
        let not_in = Query::not_in("key", values);
        prop_assert_ne!(is_in.matches(value.as_deref()), not_in.matches(value.as_deref()));
    }

    /// Property: `=` and `!=` split every value, present or missing
    #[test]
    fn prop_equality_complement(expected in token(), value in proptest::option::of(token())) {
        let equal = Query::equal("key", expected.clone());
        let not_equal = Query::not_equal("key", expected);
        prop_assert_ne!(equal.matches(value.as_deref()), not_equal.matches(value.as_deref()));
    }

    /// Property: rendered selectors parse back to the same query
    #[test]
    fn prop_display_parses_back(op in operator(), key in token(), values in values()) {
        let values = if op.is_single_valued() {
            vec![values.into_iter().next().unwrap_or_else(|| "v".to_string())]
        } else {
            values
        };
        let query = Query::new(op, key, values);

        let parsed = Query::parse(&query.to_string()).unwrap();
        prop_assert_eq!(parsed, query);
    }
}
