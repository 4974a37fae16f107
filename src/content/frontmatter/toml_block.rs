//! content::frontmatter::toml_block
//!
//! Segmentation and encoding for `+++` TOML frontmatter.
//!
//! Decoding is delegated to the `toml` crate: the whole block is parsed once
//! and each field's value is looked up by its top-level key. This module
//! only decides which source lines belong to which field so unedited
//! fields can be re-emitted verbatim.

use serde_json::{Map, Number, Value};

/// What one top-level TOML line starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LineKind {
    Blank,
    Comment,
    /// `[table]` or `[[array]]`; carries the first key segment
    Header(String),
    /// `key = value`; carries the first key segment and the byte offset
    /// where the value starts
    KeyValue { key: String, value_start: usize },
}

/// Classify a line that is not inside a multi-line value.
pub(crate) fn classify(text: &str) -> Option<LineKind> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Some(LineKind::Blank);
    }
    if trimmed.starts_with('#') {
        return Some(LineKind::Comment);
    }
    if trimmed.starts_with('[') {
        let inner = trimmed
            .trim_start_matches('[')
            .split(']')
            .next()
            .unwrap_or_default();
        return first_segment(inner).map(LineKind::Header);
    }

    let eq = find_unquoted(text, '=')?;
    let key = first_segment(&text[..eq])?;
    let after = &text[eq + 1..];
    let value_start = eq + 1 + (after.len() - after.trim_start_matches([' ', '\t']).len());
    Some(LineKind::KeyValue { key, value_start })
}

/// First segment of a (possibly dotted, possibly quoted) key.
fn first_segment(key: &str) -> Option<String> {
    let key = key.trim();
    let segment = match key.chars().next()? {
        q @ ('"' | '\'') => {
            let close = key[1..].find(q)?;
            key[1..1 + close].to_string()
        }
        _ => key.split('.').next().unwrap_or_default().trim().to_string(),
    };
    (!segment.is_empty()).then_some(segment)
}

/// Whether the key before `=` has more than one segment.
pub(crate) fn key_is_dotted(key_text: &str) -> bool {
    let key = key_text.trim_end().trim_end_matches('=');
    find_unquoted(key, '.').is_some()
}

/// Whether a `[a.b]` or `[[a.b]]` header names a sub-table.
pub(crate) fn header_is_dotted(text: &str) -> bool {
    let inner = text.trim().trim_start_matches('[');
    let name = find_unquoted(inner, ']').map_or(inner, |end| &inner[..end]);
    find_unquoted(name, '.').is_some()
}

/// Whether a value can be written as a `[key]` or `[[key]]` section.
pub(crate) fn is_table_like(value: &Value) -> bool {
    match value {
        Value::Object(_) => true,
        Value::Array(items) => !items.is_empty() && items.iter().all(Value::is_object),
        _ => false,
    }
}

/// The `# comment` after a one-line value, with the whitespace before it.
pub(crate) fn trailing_comment(value_text: &str) -> Option<&str> {
    let mut rest = value_text;
    while let Some(c) = rest.chars().next() {
        match c {
            '#' => {
                let value_len = value_text.len() - rest.len();
                let start = value_text[..value_len].trim_end().len();
                return Some(value_text[start..].trim_end());
            }
            '"' | '\'' => rest = skip_string(rest),
            _ => rest = &rest[c.len_utf8()..],
        }
    }
    None
}

fn find_unquoted(text: &str, needle: char) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in text.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == needle => return Some(i),
            None => {}
        }
    }
    None
}

/// Tracks whether a value spanning several lines is complete.
#[derive(Debug, Default)]
pub(crate) struct ValueScanner {
    depth: usize,
    multiline: Option<&'static str>,
}

impl ValueScanner {
    /// Feed one line of value text; returns true once the value is complete.
    pub fn feed(&mut self, text: &str) -> bool {
        let mut rest = text;
        while !rest.is_empty() {
            if let Some(delim) = self.multiline {
                match rest.find(delim) {
                    Some(end) => {
                        rest = &rest[end + delim.len()..];
                        self.multiline = None;
                    }
                    None => return false,
                }
                continue;
            }

            if let Some(after) = rest.strip_prefix("\"\"\"") {
                self.multiline = Some("\"\"\"");
                rest = after;
            } else if let Some(after) = rest.strip_prefix("'''") {
                self.multiline = Some("'''");
                rest = after;
            } else if rest.starts_with('"') || rest.starts_with('\'') {
                rest = skip_string(rest);
            } else if rest.starts_with('#') {
                break;
            } else {
                let mut chars = rest.chars();
                match chars.next() {
                    Some('[' | '{') => self.depth += 1,
                    Some(']' | '}') => self.depth = self.depth.saturating_sub(1),
                    _ => {}
                }
                rest = chars.as_str();
            }
        }
        self.depth == 0 && self.multiline.is_none()
    }
}

/// Skip past a single-line basic or literal string.
fn skip_string(text: &str) -> &str {
    let quote = if text.starts_with('"') { '"' } else { '\'' };
    let mut escaped = false;
    for (i, c) in text.char_indices().skip(1) {
        if quote == '"' && c == '\\' && !escaped {
            escaped = true;
            continue;
        }
        if c == quote && !escaped {
            return &text[i + 1..];
        }
        escaped = false;
    }
    ""
}

/// Convert a decoded TOML value into JSON.
pub(crate) fn to_json(value: &toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s.clone()),
        toml::Value::Integer(i) => Value::Number(Number::from(*i)),
        toml::Value::Float(f) => Number::from_f64(*f)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(f.to_string())),
        toml::Value::Boolean(b) => Value::Bool(*b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.iter().map(to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .iter()
                .map(|(k, v)| (k.clone(), to_json(v)))
                .collect::<Map<String, Value>>(),
        ),
    }
}

// =============================================================================
// Encoding
// =============================================================================

/// Encode a value for `key = <value>`.
///
/// Strings keep literal (`'...'`) quoting when the original used it and
/// the text allows it; everything else goes through the `toml` crate.
pub(crate) fn encode(value: &Value, literal: bool) -> Result<String, String> {
    match value {
        Value::Null => Err("TOML has no null value".to_string()),
        Value::String(s) if literal && !s.contains('\'') && !s.chars().any(char::is_control) => {
            Ok(format!("'{}'", s))
        }
        Value::String(s) => Ok(basic_string(s)),
        other => {
            let converted = toml::Value::try_from(other).map_err(|e| e.to_string())?;
            Ok(converted.to_string())
        }
    }
}

/// Encode an object as a `[key]` section, or an array of objects as
/// `[[key]]` sections.
pub(crate) fn encode_table(key: &str, value: &Value) -> Result<String, String> {
    if !is_table_like(value) {
        return Err(format!("'{}' is a table and can only be replaced by a table", key));
    }
    let mut wrapper = Map::new();
    wrapper.insert(key.to_string(), value.clone());
    toml::to_string(&Value::Object(wrapper)).map_err(|e| e.to_string())
}

fn basic_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c.is_control() => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
