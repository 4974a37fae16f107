//! content::mutator
//!
//! Field-level edits on parsed documents.
//!
//! # Invariants
//!
//! - Fields not named in the edits keep their exact source text
//! - An edited string keeps its key spacing, quote style, and trailing
//!   comment
//! - Every edited field reads back as the value written
//! - New fields are appended after the last existing field
//! - Pure: no I/O
//!
//! # Example
//!
//! ```
//! use pagewright::content::frontmatter::parse;
//! use pagewright::content::mutator::{apply_edits, FieldEdits};
//! use serde_json::json;
//!
//! let doc = parse("---\ntitle: 'Draft'\ndate: 2024-01-05\n---\nOld body\n").unwrap();
//! let mut edits = FieldEdits::new();
//! edits.insert("title".into(), json!("Final"));
//!
//! let updated = apply_edits(&doc, &edits, Some("New body\n")).unwrap();
//! assert_eq!(
//!     updated.to_text(),
//!     "---\ntitle: 'Final'\ndate: 2024-01-05\n---\nNew body\n"
//! );
//! ```

use serde_json::{Map, Value};
use thiserror::Error;

use super::frontmatter::ContentDocument;
use crate::core::types::ContentPath;

/// Ordered field name → new value.
pub type FieldEdits = Map<String, Value>;

/// The field every created document must carry.
pub const TITLE_FIELD: &str = "title";

/// Errors from applying edits.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EditError {
    /// The field name cannot be written as a top-level key.
    #[error("invalid field name '{0}': use letters, digits, '_', '-' or '.'")]
    InvalidKey(String),

    /// The value cannot be represented in the document's format.
    #[error("cannot set '{key}': {reason}")]
    Unrepresentable { key: String, reason: String },

    /// The edited text would not parse back.
    #[error("edit would leave the document unreadable: {0}")]
    Unreadable(String),
}

/// Whether `key` can be written unquoted in both YAML and TOML.
fn valid_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with(['-', '.'])
        && key
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

/// Apply field edits and an optional new body to a document.
///
/// Returns a new document; the input is left untouched.
///
/// # Errors
///
/// Fails without partial effect when a key is invalid, a value cannot
/// be represented (e.g. `null` in TOML frontmatter), or the result would
/// not read back as written.
pub fn apply_edits(
    doc: &ContentDocument,
    edits: &FieldEdits,
    new_body: Option<&str>,
) -> Result<ContentDocument, EditError> {
    let mut updated = doc.clone();

    for (key, value) in edits {
        if doc.get(key).is_none() && !valid_key(key) {
            return Err(EditError::InvalidKey(key.clone()));
        }
        updated
            .set_field(key, value.clone())
            .map_err(|reason| EditError::Unrepresentable {
                key: key.clone(),
                reason,
            })?;
    }

    if let Some(body) = new_body {
        updated.set_body(body);
    }

    if !edits.is_empty() {
        verify_read_back(&updated, edits)?;
    }
    Ok(updated)
}

fn verify_read_back(doc: &ContentDocument, edits: &FieldEdits) -> Result<(), EditError> {
    let reparsed =
        ContentDocument::parse(&doc.to_text()).map_err(|e| EditError::Unreadable(e.to_string()))?;
    for (key, value) in edits {
        if reparsed.get(key) != Some(value) {
            return Err(EditError::Unrepresentable {
                key: key.clone(),
                reason: "the written value does not read back unchanged".to_string(),
            });
        }
    }
    Ok(())
}

/// Build a new document for `path`.
///
/// New documents use YAML frontmatter, LF line endings, and a blank line
/// between the frontmatter and a non-empty body. A `title` derived from the
/// path is placed first unless the edits supply one.
pub fn new_document(
    path: &ContentPath,
    edits: &FieldEdits,
    body: &str,
) -> Result<ContentDocument, EditError> {
    let mut fields = FieldEdits::new();
    let supplied_title = edits.contains_key(TITLE_FIELD);
    if !supplied_title {
        fields.insert(TITLE_FIELD.to_string(), Value::String(path.derived_title()));
    }
    for (key, value) in edits {
        fields.insert(key.clone(), value.clone());
    }

    let mut doc = apply_edits(&ContentDocument::bare(""), &fields, None)?;
    if !supplied_title {
        doc.move_field_first(TITLE_FIELD);
    }
    doc.set_body(body);
    doc.separate_body();
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::frontmatter::parse;
    use serde_json::json;

    fn edits(pairs: &[(&str, Value)]) -> FieldEdits {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    mod apply {
        use super::*;

        #[test]
        fn untouched_fields_are_byte_identical() {
            let raw = "---\ntitle: Old\ntags: [a,   b]   # spaced\nweight:    3\n---\nbody\n";
            let doc = parse(raw).unwrap();
            let updated = apply_edits(&doc, &edits(&[("title", json!("New"))]), None).unwrap();
            assert_eq!(
                updated.to_text(),
                "---\ntitle: New\ntags: [a,   b]   # spaced\nweight:    3\n---\nbody\n"
            );
        }

        #[test]
        fn keeps_double_quotes_and_spacing() {
            let doc = parse("---\ntitle:    \"Old\"\n---\n").unwrap();
            let updated = apply_edits(&doc, &edits(&[("title", json!("New"))]), None).unwrap();
            assert_eq!(updated.to_text(), "---\ntitle:    \"New\"\n---\n");
        }

        #[test]
        fn plain_string_quoted_when_needed() {
            let doc = parse("---\ntitle: Old\n---\n").unwrap();
            let updated =
                apply_edits(&doc, &edits(&[("title", json!("Part 1: Intro"))]), None).unwrap();
            assert_eq!(updated.to_text(), "---\ntitle: \"Part 1: Intro\"\n---\n");
            assert_eq!(updated.get("title").unwrap(), "Part 1: Intro");
        }

        #[test]
        fn new_fields_appended_in_edit_order() {
            let doc = parse("---\ntitle: x\n---\n").unwrap();
            let updated = apply_edits(
                &doc,
                &edits(&[("draft", json!(true)), ("tags", json!(["a", "b"]))]),
                None,
            )
            .unwrap();
            assert_eq!(
                updated.to_text(),
                "---\ntitle: x\ndraft: true\ntags: [a, b]\n---\n"
            );
        }

        #[test]
        fn block_value_replaced_whole() {
            let doc = parse("---\ntags:\n  - a\n  - b\ntitle: x\n---\n").unwrap();
            let updated = apply_edits(&doc, &edits(&[("tags", json!(["c"]))]), None).unwrap();
            assert_eq!(updated.to_text(), "---\ntags: [c]\ntitle: x\n---\n");
        }

        #[test]
        fn toml_literal_strings_kept() {
            let doc = parse("+++\ntitle = 'Old'\n+++\n").unwrap();
            let updated = apply_edits(&doc, &edits(&[("title", json!("New"))]), None).unwrap();
            assert_eq!(updated.to_text(), "+++\ntitle = 'New'\n+++\n");
        }

        #[test]
        fn toml_table_replaced_by_table() {
            let doc = parse("+++\ntitle = 'x'\n[params]\na = 1\n+++\n").unwrap();
            let updated =
                apply_edits(&doc, &edits(&[("params", json!({"a": 2}))]), None).unwrap();
            assert_eq!(updated.get("params").unwrap(), &json!({"a": 2}));
            assert!(updated.to_text().contains("[params]\na = 2\n"));

            let err = apply_edits(&doc, &edits(&[("params", json!("flat"))]), None).unwrap_err();
            assert!(matches!(err, EditError::Unrepresentable { .. }));
        }

        #[test]
        fn split_toml_table_rewritten_once() {
            let raw = "+++\ntitle = 'x'\n[params]\nauthor = 'Jo'\n[params.social]\ntw = 'jo'\n+++\nBody\n";
            let doc = parse(raw).unwrap();
            let value = json!({"author": "Al", "social": {"tw": "al"}});
            let updated = apply_edits(&doc, &edits(&[("params", value.clone())]), None).unwrap();

            let text = updated.to_text();
            assert_eq!(text.matches("[params]").count(), 1);
            assert!(text.starts_with("+++\ntitle = 'x'\n[params]\n"));
            assert!(text.ends_with("+++\nBody\n"));
            let reparsed = parse(&text).unwrap();
            assert_eq!(reparsed.get("params").unwrap(), &value);
            assert_eq!(reparsed.get("title").unwrap(), &json!("x"));
        }

        #[test]
        fn dotted_toml_keys_become_one_inline_table() {
            let doc =
                parse("+++\nparams.author = 'Jo'\nparams.toc = true\ntitle = 'x'\n+++\n").unwrap();
            let value = json!({"author": "Al", "toc": false});
            let updated = apply_edits(&doc, &edits(&[("params", value.clone())]), None).unwrap();

            let text = updated.to_text();
            assert!(text.starts_with("+++\nparams = {"), "{}", text);
            assert!(text.contains("\ntitle = 'x'\n"));
            assert_eq!(text.matches("params").count(), 1);
            assert_eq!(parse(&text).unwrap().get("params").unwrap(), &value);
        }

        #[test]
        fn split_toml_table_only_replaced_by_table() {
            let doc = parse("+++\n[params]\na = 1\n[params.sub]\nb = 2\n+++\n").unwrap();
            let err = apply_edits(&doc, &edits(&[("params", json!("flat"))]), None).unwrap_err();
            assert!(matches!(err, EditError::Unrepresentable { .. }));
        }

        #[test]
        fn trailing_comments_survive_edits() {
            let doc = parse("---\ntitle: \"Hello\"   # greeting\n---\n").unwrap();
            let updated = apply_edits(&doc, &edits(&[("title", json!("Bye"))]), None).unwrap();
            assert_eq!(updated.to_text(), "---\ntitle: \"Bye\"   # greeting\n---\n");

            let doc = parse("+++\nweight = 3 # order\n+++\n").unwrap();
            let updated = apply_edits(&doc, &edits(&[("weight", json!(4))]), None).unwrap();
            assert_eq!(updated.to_text(), "+++\nweight = 4 # order\n+++\n");
        }

        #[test]
        fn dotted_new_key_rejected_in_toml() {
            let doc = parse("+++\ntitle = 'x'\n+++\n").unwrap();
            let err = apply_edits(&doc, &edits(&[("a.b", json!(1))]), None).unwrap_err();
            assert!(matches!(err, EditError::Unrepresentable { .. }));
        }

        #[test]
        fn body_only_edit() {
            let raw = "---\ntitle: x\n---\n\nold\n";
            let doc = parse(raw).unwrap();
            let updated = apply_edits(&doc, &FieldEdits::new(), Some("new\n")).unwrap();
            assert_eq!(updated.to_text(), "---\ntitle: x\n---\n\nnew\n");
        }

        #[test]
        fn no_edits_is_identity() {
            let raw = "+++\ntitle = \"x\"  # c\n+++\nbody";
            let doc = parse(raw).unwrap();
            let updated = apply_edits(&doc, &FieldEdits::new(), None).unwrap();
            assert_eq!(updated.to_text(), raw);
        }

        #[test]
        fn invalid_new_key_rejected() {
            let doc = parse("---\ntitle: x\n---\n").unwrap();
            for key in ["", "a b", "x:y", "-lead", "#c"] {
                let err = apply_edits(&doc, &edits(&[(key, json!(1))]), None).unwrap_err();
                assert_eq!(err, EditError::InvalidKey(key.to_string()));
            }
        }

        #[test]
        fn input_left_untouched_on_error() {
            let doc = parse("+++\ntitle = 'x'\n+++\n").unwrap();
            let before = doc.to_text();
            let result = apply_edits(
                &doc,
                &edits(&[("draft", json!(true)), ("title", Value::Null)]),
                None,
            );
            assert!(result.is_err());
            assert_eq!(doc.to_text(), before);
        }
    }

    mod create {
        use super::*;

        #[test]
        fn derives_title_first() {
            let path = ContentPath::new("news/launch-day").unwrap();
            let doc = new_document(&path, &edits(&[("draft", json!(true))]), "Hello\n").unwrap();
            assert_eq!(
                doc.to_text(),
                "---\ntitle: Launch Day\ndraft: true\n---\n\nHello\n"
            );
        }

        #[test]
        fn supplied_title_kept_in_order() {
            let path = ContentPath::new("news/launch").unwrap();
            let doc = new_document(
                &path,
                &edits(&[("date", json!("2024-01-05")), ("title", json!("Launch!"))]),
                "",
            )
            .unwrap();
            assert_eq!(
                doc.to_text(),
                "---\ndate: 2024-01-05\ntitle: Launch!\n---\n"
            );
        }

        #[test]
        fn exactly_title_when_no_edits() {
            let path = ContentPath::new("about").unwrap();
            let doc = new_document(&path, &FieldEdits::new(), "").unwrap();
            assert_eq!(doc.fields().len(), 1);
            assert_eq!(doc.to_text(), "---\ntitle: About\n---\n");
        }

        #[test]
        fn crlf_body_normalized_to_lf() {
            let path = ContentPath::new("about").unwrap();
            let doc = new_document(&path, &FieldEdits::new(), "a\r\nb\r\n").unwrap();
            assert_eq!(doc.body(), "a\nb\n");
        }
    }
}
