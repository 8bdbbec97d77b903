//! Property-based tests for the round-trip guarantee.
//!
//! Documents are generated as `Value` trees mixing objects, plain arrays and
//! tabular arrays, with keys and strings drawn from printable ASCII, wider
//! Unicode and delimiter-heavy alphabets so the quoting rules get exercised
//! for values, keys, column ids and legend aliases alike.

use proptest::prelude::*;
use serde::{Deserialize, Serialize};
use toon_legend::legend::build_legend;
use toon_legend::{decode, encode, encode_with_options, from_str, to_string, ToonOptions, Value};

fn key() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => "[a-zA-Z_][a-zA-Z0-9_]{0,6}",
        2 => "\\PC{0,6}",
        1 => "[ ,:\"\\\\\\[\\]{}a]{1,4}",
        1 => Just("legend".to_string()),
    ]
}

fn text() -> impl Strategy<Value = String> {
    prop_oneof![
        "[A-Za-z0-9 ()&]{0,16}",
        "[ -~]{0,12}",
        "\\PC{0,8}",
        Just("Null".to_string()),
        Just("DateTime (ISO 8601)".to_string()),
    ]
}

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        (-1e12f64..1e12f64).prop_map(Value::from),
        text().prop_map(Value::String),
    ]
}

fn table() -> impl Strategy<Value = Value> {
    prop::collection::btree_set(key(), 1..5).prop_flat_map(|keys| {
        let keys: Vec<String> = keys.into_iter().collect();
        let width = keys.len();
        prop::collection::vec(prop::collection::vec(scalar(), width), 1..6).prop_map(
            move |rows| {
                Value::Array(
                    rows.into_iter()
                        .map(|cells| Value::Object(keys.iter().cloned().zip(cells).collect()))
                        .collect(),
                )
            },
        )
    })
}

fn document() -> impl Strategy<Value = Value> {
    scalar().prop_recursive(4, 64, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::vec((key(), inner), 0..6)
                .prop_map(|entries| Value::Object(entries.into_iter().collect())),
            table(),
        ]
    })
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Airport {
    icao: String,
    city: String,
    iata: Option<String>,
}

fn airport() -> impl Strategy<Value = Airport> {
    ("[A-Z]{4}", text(), proptest::option::of("[A-Z]{3}")).prop_map(|(icao, city, iata)| Airport {
        icao,
        city,
        iata,
    })
}

proptest! {
    #[test]
    fn prop_document_round_trip(doc in document()) {
        let text = encode(&doc).unwrap();
        let back = decode(&text);
        prop_assert_eq!(back.as_ref().ok(), Some(&doc), "text was:\n{}", text);
    }

    #[test]
    fn prop_round_trip_at_any_indent(doc in document(), indent in 1usize..5) {
        let text = encode_with_options(&doc, ToonOptions::new().with_indent(indent)).unwrap();
        prop_assert_eq!(decode(&text).ok(), Some(doc));
    }

    #[test]
    fn prop_round_trip_without_legend(doc in document()) {
        let text = encode_with_options(&doc, ToonOptions::new().with_legend(false)).unwrap();
        prop_assert!(
            !text.starts_with("legend:{") || text.starts_with("legend:{}"),
            "unexpected legend header in:\n{}",
            text
        );
        prop_assert_eq!(decode(&text).ok(), Some(doc));
    }

    #[test]
    fn prop_table_has_one_header(rows in table()) {
        let count = rows.as_array().map_or(0, Vec::len);
        let text = encode(&rows).unwrap();
        let header = format!("[{}]{{", count);
        let headers = text
            .lines()
            .filter(|line| line.starts_with(&header) && line.ends_with("}:"))
            .count();
        prop_assert_eq!(headers, 1);
        prop_assert_eq!(decode(&text).ok(), Some(rows));
    }

    #[test]
    fn prop_aliases_are_unique(doc in document()) {
        let legend = build_legend(&doc);
        let mut seen = std::collections::HashSet::new();
        for (alias, key) in legend.iter() {
            prop_assert!(seen.insert(alias.to_string()));
            prop_assert!(key.starts_with(alias));
            let resolved = legend.resolve(alias, 1).ok();
            prop_assert_eq!(resolved.as_deref(), Some(key));
        }
    }

    #[test]
    fn prop_airports_round_trip(airports in prop::collection::vec(airport(), 0..20)) {
        let text = to_string(&airports).unwrap();
        let back: Vec<Airport> = from_str(&text).unwrap();
        prop_assert_eq!(back, airports);
    }

    #[test]
    fn prop_decode_never_panics(input in "[ -~\n]{0,64}") {
        let _ = decode(&input);
    }

    #[test]
    fn prop_i64(n in any::<i64>()) {
        let text = to_string(&n).unwrap();
        prop_assert_eq!(from_str::<i64>(&text).ok(), Some(n));
    }

    #[test]
    fn prop_vec_f64(v in prop::collection::vec(-1e9f64..1e9f64, 0..20)) {
        let text = to_string(&v).unwrap();
        prop_assert_eq!(from_str::<Vec<f64>>(&text).ok(), Some(v));
    }
}
