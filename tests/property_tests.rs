//! Property-based tests for the frontmatter codec and field edits.
//!
//! These tests use proptest to check that parsing and re-serializing a
//! document reproduces it byte for byte, that editing one field never
//! changes the bytes of any other field, and that TOML keys written across
//! several sections or dotted keys are rewritten into a readable document.

use proptest::prelude::*;
use serde_json::{json, Value};

use pagewright::content::frontmatter::{Entry, Field};
use pagewright::content::{apply_edits, ContentDocument, FieldEdits};

// =============================================================================
// Strategies
// =============================================================================

fn word() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,8}"
}

fn trailing_comment() -> impl Strategy<Value = String> {
    prop_oneof![Just(String::new()), "[a-z ]{0,10}".prop_map(|c| format!("  # {}", c))]
}

fn yaml_value() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::collection::vec(word(), 1..4).prop_map(|words| words.join(" ")),
        "[a-zA-Z0-9 ,:#]{0,12}".prop_map(|s| format!("\"{}\"", s)),
        "[a-zA-Z0-9 ]{0,12}".prop_map(|s| format!("'{}'", s)),
        any::<i32>().prop_map(|n| n.to_string()),
        any::<bool>().prop_map(|b| b.to_string()),
        prop::collection::vec(word(), 0..4).prop_map(|items| format!("[{}]", items.join(", "))),
    ]
}

fn toml_value() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9 ,:#]{0,12}".prop_map(|s| format!("\"{}\"", s)),
        "[a-zA-Z0-9 ]{0,12}".prop_map(|s| format!("'{}'", s)),
        any::<i32>().prop_map(|n| n.to_string()),
        any::<bool>().prop_map(|b| b.to_string()),
        prop::collection::vec(any::<i16>(), 0..4).prop_map(|items| {
            let items: Vec<String> = items.iter().map(|n| n.to_string()).collect();
            format!("[{}]", items.join(", "))
        }),
    ]
}

fn trivia() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        3 => Just(None),
        1 => Just(Some(String::new())),
        1 => "[a-z ]{0,12}".prop_map(|c| Some(format!("# {}", c))),
    ]
}

fn body() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        prop::collection::vec("[a-zA-Z0-9 .,]{0,30}", 1..4)
            .prop_map(|lines| format!("{}\n", lines.join("\n"))),
    ]
}

/// Documents as (raw text, field keys in order).
fn document(
    fence: &'static str,
    line: fn(&str, &str, &str) -> String,
    value: BoxedStrategy<String>,
) -> impl Strategy<Value = (String, Vec<String>)> {
    let fields = prop::collection::vec((value, trailing_comment(), trivia()), 1..6);
    (fields, body(), any::<bool>(), any::<bool>()).prop_map(
        move |(fields, body, crlf, blank_separator)| {
            let mut lines = vec![fence.to_string()];
            let mut keys = Vec::new();
            for (i, (value, comment, extra)) in fields.into_iter().enumerate() {
                let key = format!("key{}", i);
                lines.push(line(&key, &value, &comment));
                keys.push(key);
                if let Some(extra) = extra {
                    lines.push(extra);
                }
            }
            lines.push(fence.to_string());
            if blank_separator && !body.is_empty() {
                lines.push(String::new());
            }

            let eol = if crlf { "\r\n" } else { "\n" };
            let mut raw = lines.join(eol);
            raw.push_str(eol);
            raw.push_str(&body.replace('\n', eol));
            (raw, keys)
        },
    )
}

fn yaml_line(key: &str, value: &str, comment: &str) -> String {
    format!("{}: {}{}", key, value, comment)
}

fn toml_line(key: &str, value: &str, comment: &str) -> String {
    format!("{} = {}{}", key, value, comment)
}

fn any_document() -> impl Strategy<Value = (String, Vec<String>)> {
    prop_oneof![
        document("---", yaml_line, yaml_value().boxed()),
        document("+++", toml_line, toml_value().boxed()),
    ]
}

/// TOML documents whose `site` key is written as dotted keys and whose
/// `params` table may be split by a `[params.sub]` section.
fn toml_spread_document() -> impl Strategy<Value = String> {
    let root = prop::collection::vec((toml_value(), trailing_comment()), 0..4);
    let dotted = prop::collection::vec(toml_value(), 0..3);
    let table = prop::collection::vec(toml_value(), 1..3);
    let sub = prop::collection::vec(toml_value(), 0..3);
    (root, dotted, table, sub, body()).prop_map(|(root, dotted, table, sub, body)| {
        let mut raw = String::from("+++\n");
        for (i, (value, comment)) in root.iter().enumerate() {
            raw.push_str(&format!("key{} = {}{}\n", i, value, comment));
        }
        for (i, value) in dotted.iter().enumerate() {
            raw.push_str(&format!("site.k{} = {}\n", i, value));
        }
        raw.push_str("[params]\n");
        for (i, value) in table.iter().enumerate() {
            raw.push_str(&format!("p{} = {}\n", i, value));
        }
        if !sub.is_empty() {
            raw.push_str("[params.sub]\n");
            for (i, value) in sub.iter().enumerate() {
                raw.push_str(&format!("s{} = {}\n", i, value));
            }
        }
        raw.push_str("+++\n");
        raw.push_str(&body);
        raw
    })
}

fn new_table() -> impl Strategy<Value = Value> {
    let scalar = prop_oneof![
        "[a-zA-Z ]{0,10}".prop_map(Value::String),
        any::<i32>().prop_map(|n| json!(n)),
        any::<bool>().prop_map(Value::Bool),
    ];
    prop::collection::btree_map(word(), scalar, 1..4)
        .prop_map(|map| Value::Object(map.into_iter().collect()))
}

fn new_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        "[a-zA-Z ]{0,10}".prop_map(Value::String),
        any::<i32>().prop_map(|n| json!(n)),
        any::<bool>().prop_map(Value::Bool),
        prop::collection::vec(word(), 0..3).prop_map(|items| json!(items)),
    ]
}

fn field_raws(doc: &ContentDocument) -> Vec<(String, String)> {
    doc.frontmatter()
        .map(|fm| {
            fm.entries()
                .iter()
                .filter_map(|entry| match entry {
                    Entry::Field(field) => Some(field),
                    Entry::Trivia(_) => None,
                })
                .map(|field: &Field| (field.key().to_string(), field.raw().to_string()))
                .collect()
        })
        .unwrap_or_default()
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn round_trip_is_byte_identical((raw, _) in any_document()) {
        let doc = ContentDocument::parse(&raw).unwrap();
        prop_assert_eq!(doc.to_text(), raw);
    }

    #[test]
    fn bare_documents_round_trip(body in "[a-zA-Z0-9 .\n]{0,80}") {
        let doc = ContentDocument::parse(&body).unwrap();
        prop_assert!(doc.frontmatter().is_none());
        prop_assert_eq!(doc.to_text(), body);
    }

    #[test]
    fn single_edit_leaves_other_fields_intact(
        (raw, keys) in any_document(),
        pick in any::<prop::sample::Index>(),
        value in new_value(),
    ) {
        let doc = ContentDocument::parse(&raw).unwrap();
        let target = pick.get(&keys).clone();

        let mut edits = FieldEdits::new();
        edits.insert(target.clone(), value.clone());
        let updated = apply_edits(&doc, &edits, None).unwrap();

        let before = field_raws(&doc);
        let after = field_raws(&updated);
        prop_assert_eq!(before.len(), after.len());
        for ((key_a, raw_a), (key_b, raw_b)) in before.iter().zip(after.iter()) {
            prop_assert_eq!(key_a, key_b);
            if key_a != &target {
                prop_assert_eq!(raw_a, raw_b);
            }
        }

        prop_assert_eq!(updated.get(&target), Some(&value));
        prop_assert_eq!(updated.body(), doc.body());

        let reparsed = ContentDocument::parse(&updated.to_text()).unwrap();
        prop_assert_eq!(reparsed.get(&target), Some(&value));
    }

    #[test]
    fn spread_toml_documents_round_trip(raw in toml_spread_document()) {
        let doc = ContentDocument::parse(&raw).unwrap();
        prop_assert_eq!(doc.to_text(), raw);
    }

    #[test]
    fn spread_toml_keys_rewrite_to_readable_documents(
        raw in toml_spread_document(),
        target in prop::sample::select(vec!["site", "params"]),
        value in new_table(),
    ) {
        let doc = ContentDocument::parse(&raw).unwrap();
        prop_assume!(doc.get(target).is_some());

        let mut edits = FieldEdits::new();
        edits.insert(target.to_string(), value.clone());
        let updated = apply_edits(&doc, &edits, None).unwrap();

        let reparsed = ContentDocument::parse(&updated.to_text()).unwrap();
        prop_assert_eq!(reparsed.get(target), Some(&value));
        for (key, original) in doc.fields() {
            if key != target {
                prop_assert_eq!(reparsed.get(&key), Some(&original));
            }
        }
        prop_assert_eq!(reparsed.body(), doc.body());
    }
}
