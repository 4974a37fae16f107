//! content::frontmatter
//!
//! Lossless frontmatter codec.
//!
//! # Architecture
//!
//! A document is split into an optional frontmatter block, the separator
//! lines after its closing fence, and the body. The frontmatter block is an
//! ordered list of [`Entry`] values: fields (decoded value plus the exact
//! source lines) and trivia (comments, blank lines). Serialization walks
//! the entries and emits each one's raw text, so nothing the editor did not
//! touch changes by a single byte.
//!
//! # Invariants
//!
//! - `serialize(&parse(x)?) == x` for every well-formed `x`
//! - Replacing one field's value changes only that field's raw text
//! - Line endings are kept per line; new text uses the document's dominant
//!   line ending
//!
//! # Example
//!
//! ```
//! use pagewright::content::frontmatter::{parse, serialize};
//!
//! let raw = "---\ntitle:   \"Hello\"   # greeting\ndraft: false\n---\n\nBody\n";
//! let doc = parse(raw).unwrap();
//! assert_eq!(doc.get("title").unwrap(), "Hello");
//! assert_eq!(serialize(&doc), raw);
//! ```

mod toml_block;
mod yaml;

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors from parsing a document.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The opening fence has no matching closing fence.
    #[error("frontmatter opened with '{fence}' is never closed")]
    Unterminated { fence: &'static str },

    /// A frontmatter line could not be understood.
    #[error("malformed frontmatter at line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}

/// Frontmatter syntax, chosen by the opening fence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FrontmatterFormat {
    /// `---` fenced YAML
    Yaml,
    /// `+++` fenced TOML
    Toml,
}

impl FrontmatterFormat {
    /// The fence line for this format.
    pub fn fence(&self) -> &'static str {
        match self {
            FrontmatterFormat::Yaml => "---",
            FrontmatterFormat::Toml => "+++",
        }
    }

    fn from_fence(line: &str) -> Option<Self> {
        match line {
            "---" => Some(FrontmatterFormat::Yaml),
            "+++" => Some(FrontmatterFormat::Toml),
            _ => None,
        }
    }
}

/// Line terminator style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }

    /// The ending used by most lines of `text` (LF on a tie).
    pub fn dominant(text: &str) -> Self {
        let crlf = text.matches("\r\n").count();
        let lf = text.matches('\n').count() - crlf;
        if crlf > lf {
            LineEnding::CrLf
        } else {
            LineEnding::Lf
        }
    }

    fn of_line(line: &str) -> Self {
        if line.ends_with("\r\n") {
            LineEnding::CrLf
        } else {
            LineEnding::Lf
        }
    }

    /// Rewrite every line break in `text` to this ending.
    pub fn normalize(&self, text: &str) -> String {
        let lf = text.replace("\r\n", "\n");
        match self {
            LineEnding::Lf => lf,
            LineEnding::CrLf => lf.replace('\n', "\r\n"),
        }
    }
}

/// How a field's value is written in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValueStyle {
    Plain,
    SingleQuoted,
    DoubleQuoted,
    /// Flow collection, block node, or anything else re-encoded canonically
    Structured,
    /// A TOML `[table]` / `[[array]]` section
    TomlTable,
}

impl ValueStyle {
    fn detect(value_text: &str) -> Self {
        match value_text.trim_start().chars().next() {
            Some('"') => ValueStyle::DoubleQuoted,
            Some('\'') => ValueStyle::SingleQuoted,
            Some('[' | '{' | '|' | '>') | None => ValueStyle::Structured,
            Some(_) => ValueStyle::Plain,
        }
    }
}

/// One top-level frontmatter field.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    key: String,
    value: Value,
    raw: String,
    prefix: String,
    style: ValueStyle,
    ending: LineEnding,
    /// TOML only: this entry writes part of the key's value (a dotted key
    /// or a sub-table header), not all of it.
    fragment: bool,
}

impl Field {
    /// The field name.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The decoded value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// The exact source text, line endings included.
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

/// A frontmatter entry in source order.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Field(Field),
    /// Comment or blank line, kept verbatim
    Trivia(String),
}

impl Entry {
    fn raw(&self) -> &str {
        match self {
            Entry::Field(field) => &field.raw,
            Entry::Trivia(raw) => raw,
        }
    }
}

/// The fenced metadata block of a document.
#[derive(Debug, Clone, PartialEq)]
pub struct Frontmatter {
    format: FrontmatterFormat,
    opening: String,
    closing: String,
    entries: Vec<Entry>,
}

impl Frontmatter {
    fn empty(format: FrontmatterFormat, ending: LineEnding) -> Self {
        Self {
            format,
            opening: format!("{}{}", format.fence(), ending.as_str()),
            closing: format!("{}{}", format.fence(), ending.as_str()),
            entries: Vec::new(),
        }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Replace a TOML key written in several places (split sub-tables,
    /// dotted keys) with one definition of the whole value.
    ///
    /// The definition goes where the first table section for the key was,
    /// or where the first dotted key was when there is no section.
    /// `positions` must be non-empty and ascending.
    fn replace_spread(
        &mut self,
        key: &str,
        value: Value,
        positions: &[usize],
        ending: LineEnding,
    ) -> Result<(), String> {
        let first_table = positions.iter().copied().find(|&i| {
            matches!(&self.entries[i], Entry::Field(f) if f.style == ValueStyle::TomlTable)
        });

        let (field, anchor) = match first_table {
            Some(at) if toml_block::is_table_like(&value) => {
                let raw = ending.normalize(&toml_block::encode_table(key, &value)?);
                let field = Field {
                    key: key.to_string(),
                    value,
                    raw,
                    prefix: String::new(),
                    style: ValueStyle::TomlTable,
                    ending,
                    fragment: false,
                };
                (field, at)
            }
            Some(_) => {
                return Err(format!(
                    "'{}' is a table and can only be replaced by a table",
                    key
                ))
            }
            None => (
                render_new(FrontmatterFormat::Toml, key, value, ending)?,
                positions[0],
            ),
        };

        for &index in positions.iter().rev() {
            self.entries.remove(index);
        }
        let index = anchor - positions.iter().filter(|&&p| p < anchor).count();
        self.entries.insert(index, Entry::Field(field));
        Ok(())
    }

    fn fields(&self) -> impl Iterator<Item = &Field> {
        self.entries.iter().filter_map(|e| match e {
            Entry::Field(f) => Some(f),
            Entry::Trivia(_) => None,
        })
    }
}

/// A parsed content document.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentDocument {
    frontmatter: Option<Frontmatter>,
    separator: String,
    body: String,
    ending: LineEnding,
}

impl ContentDocument {
    /// A document with no frontmatter at all.
    pub fn bare(body: impl Into<String>) -> Self {
        let body = body.into();
        Self {
            ending: LineEnding::dominant(&body),
            frontmatter: None,
            separator: String::new(),
            body,
        }
    }

    /// Parse raw document text.
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        parse(raw)
    }

    /// Reproduce the document text.
    pub fn to_text(&self) -> String {
        serialize(self)
    }

    pub fn format(&self) -> Option<FrontmatterFormat> {
        self.frontmatter.as_ref().map(|fm| fm.format)
    }

    pub fn frontmatter(&self) -> Option<&Frontmatter> {
        self.frontmatter.as_ref()
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn line_ending(&self) -> LineEnding {
        self.ending
    }

    /// Decoded value of a field. Later duplicates win.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.frontmatter
            .as_ref()?
            .fields()
            .filter(|f| f.key == key)
            .last()
            .map(|f| &f.value)
    }

    /// All fields as an ordered map.
    pub fn fields(&self) -> Map<String, Value> {
        let mut map = Map::new();
        if let Some(fm) = &self.frontmatter {
            for field in fm.fields() {
                map.insert(field.key.clone(), field.value.clone());
            }
        }
        map
    }

    // =========================================================================
    // Edit primitives (used by the mutator)
    // =========================================================================

    /// Set a field's value, re-encoding only that field.
    ///
    /// Returns an error message when the value cannot be written in the
    /// document's frontmatter format.
    pub(crate) fn set_field(&mut self, key: &str, value: Value) -> Result<(), String> {
        let ending = self.ending;
        if self.frontmatter.is_none() {
            self.frontmatter = Some(Frontmatter::empty(FrontmatterFormat::Yaml, ending));
            if !self.body.is_empty() && self.separator.is_empty() {
                self.separator = ending.as_str().to_string();
            }
        }
        let Some(fm) = self.frontmatter.as_mut() else {
            return Err("document has no frontmatter".to_string());
        };
        let format = fm.format;

        let positions: Vec<usize> = fm
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| matches!(e, Entry::Field(f) if f.key == key))
            .map(|(i, _)| i)
            .collect();

        let spread = format == FrontmatterFormat::Toml
            && (positions.len() > 1
                || positions
                    .iter()
                    .any(|&i| matches!(&fm.entries[i], Entry::Field(f) if f.fragment)));
        if spread {
            if fm.entries.get(positions[0]).is_some_and(
                |e| matches!(e, Entry::Field(f) if f.value == value),
            ) {
                return Ok(());
            }
            return fm.replace_spread(key, value, &positions, ending);
        }

        match positions.last().copied() {
            Some(index) => {
                if let Entry::Field(field) = &mut fm.entries[index] {
                    if field.value == value {
                        return Ok(());
                    }
                    let (raw, style) = render_existing(format, field, &value)?;
                    field.raw = raw;
                    field.style = style;
                    field.value = value;
                }
            }
            None => {
                let field = render_new(format, key, value, ending)?;
                let index = insertion_index(format, &fm.entries);
                fm.entries.insert(index, Entry::Field(field));
            }
        }
        Ok(())
    }

    /// Move an existing field to the first entry position.
    pub(crate) fn move_field_first(&mut self, key: &str) {
        if let Some(fm) = self.frontmatter.as_mut() {
            if let Some(index) = fm
                .entries
                .iter()
                .position(|e| matches!(e, Entry::Field(f) if f.key == key))
            {
                let entry = fm.entries.remove(index);
                fm.entries.insert(0, entry);
            }
        }
    }

    /// Replace the body, normalizing it to the document's line ending.
    pub(crate) fn set_body(&mut self, body: &str) {
        self.body = self.ending.normalize(body);
    }

    /// Put a blank line between the frontmatter and a non-empty body.
    pub(crate) fn separate_body(&mut self) {
        if self.frontmatter.is_some() && self.separator.is_empty() && !self.body.is_empty() {
            self.separator = self.ending.as_str().to_string();
        }
    }
}

/// Where a new field goes: after the last field, and for TOML before the
/// first table section.
fn insertion_index(format: FrontmatterFormat, entries: &[Entry]) -> usize {
    let is_table = |e: &Entry| matches!(e, Entry::Field(f) if f.style == ValueStyle::TomlTable);
    let plain_field = |e: &Entry| matches!(e, Entry::Field(f) if f.style != ValueStyle::TomlTable);

    if format == FrontmatterFormat::Toml {
        if let Some(last) = entries.iter().rposition(plain_field) {
            return last + 1;
        }
        return entries.iter().position(is_table).unwrap_or(entries.len());
    }

    entries
        .iter()
        .rposition(|e| matches!(e, Entry::Field(_)))
        .map(|i| i + 1)
        .unwrap_or(entries.len())
}

fn render_existing(
    format: FrontmatterFormat,
    field: &Field,
    value: &Value,
) -> Result<(String, ValueStyle), String> {
    let eol = field.ending.as_str();

    match format {
        FrontmatterFormat::Yaml => {
            let encoded = match (value, field.style) {
                (Value::String(s), ValueStyle::DoubleQuoted) => {
                    yaml::encode_string(s, yaml::Quote::Double)
                }
                (Value::String(s), ValueStyle::SingleQuoted) => {
                    yaml::encode_string(s, yaml::Quote::Single)
                }
                (Value::String(s), _) => yaml::encode_string(s, yaml::Quote::Plain),
                (other, _) => yaml::encode(other),
            };
            let mut prefix = field.prefix.clone();
            if prefix.ends_with(':') {
                prefix.push(' ');
            }
            let comment = single_line_value(field)
                .and_then(yaml::trailing_comment)
                .filter(|_| !encoded.contains('\n'))
                .unwrap_or_default();
            let style = ValueStyle::detect(&encoded);
            Ok((format!("{}{}{}{}", prefix, encoded, comment, eol), style))
        }
        FrontmatterFormat::Toml if field.style == ValueStyle::TomlTable => {
            let table = toml_block::encode_table(&field.key, value)?;
            let ending = field.ending;
            Ok((ending.normalize(&table), ValueStyle::TomlTable))
        }
        FrontmatterFormat::Toml => {
            let literal = field.style == ValueStyle::SingleQuoted;
            let encoded = toml_block::encode(value, literal)?;
            let comment = single_line_value(field)
                .and_then(toml_block::trailing_comment)
                .unwrap_or_default();
            let style = ValueStyle::detect(&encoded);
            Ok((format!("{}{}{}{}", field.prefix, encoded, comment, eol), style))
        }
    }
}

/// Value text of a field written on exactly one line.
fn single_line_value(field: &Field) -> Option<&str> {
    let line = strip_eol(&field.raw);
    if line.contains('\n') {
        return None;
    }
    line.get(field.prefix.len()..)
}

fn render_new(
    format: FrontmatterFormat,
    key: &str,
    value: Value,
    ending: LineEnding,
) -> Result<Field, String> {
    let (prefix, encoded) = match format {
        FrontmatterFormat::Yaml => (format!("{}: ", key), yaml::encode(&value)),
        FrontmatterFormat::Toml => (format!("{} = ", key), toml_block::encode(&value, false)?),
    };
    Ok(Field {
        key: key.to_string(),
        raw: format!("{}{}{}", prefix, encoded, ending.as_str()),
        style: ValueStyle::detect(&encoded),
        prefix,
        value,
        ending,
        fragment: false,
    })
}

/// Strip one trailing `\n` or `\r\n`.
fn strip_eol(line: &str) -> &str {
    line.strip_suffix('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .unwrap_or(line)
}

/// Parse raw document text.
///
/// # Errors
///
/// - [`ParseError::Unterminated`] when an opening fence is never closed
/// - [`ParseError::Malformed`] when a frontmatter line cannot be decoded
pub fn parse(raw: &str) -> Result<ContentDocument, ParseError> {
    let lines: Vec<&str> = raw.split_inclusive('\n').collect();

    let Some(format) = lines
        .first()
        .and_then(|first| FrontmatterFormat::from_fence(strip_eol(first)))
    else {
        return Ok(ContentDocument::bare(raw));
    };

    let fence = format.fence();
    let close = lines
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, line)| strip_eol(line) == fence)
        .map(|(i, _)| i)
        .ok_or(ParseError::Unterminated { fence })?;

    let inner = &lines[1..close];
    let entries = match format {
        FrontmatterFormat::Yaml => yaml_entries(inner, 2)?,
        FrontmatterFormat::Toml => toml_entries(inner, 2)?,
    };

    let mut index = close + 1;
    let mut separator = String::new();
    while let Some(line) = lines.get(index) {
        if !line.ends_with('\n') || !strip_eol(line).trim().is_empty() {
            break;
        }
        separator.push_str(line);
        index += 1;
    }

    Ok(ContentDocument {
        frontmatter: Some(Frontmatter {
            format,
            opening: lines[0].to_string(),
            closing: lines[close].to_string(),
            entries,
        }),
        separator,
        body: lines[index..].concat(),
        ending: LineEnding::dominant(raw),
    })
}

/// Reproduce a document's text.
pub fn serialize(doc: &ContentDocument) -> String {
    let mut out = String::new();
    if let Some(fm) = &doc.frontmatter {
        out.push_str(&fm.opening);
        for entry in &fm.entries {
            out.push_str(entry.raw());
        }
        out.push_str(&fm.closing);
    }
    out.push_str(&doc.separator);
    out.push_str(&doc.body);
    out
}

/// Group YAML lines into fields and trivia.
fn yaml_entries(lines: &[&str], first_number: usize) -> Result<Vec<Entry>, ParseError> {
    let parsed: Vec<yaml::Line> = lines
        .iter()
        .enumerate()
        .map(|(i, raw)| yaml::Line::new(first_number + i, strip_eol(raw)))
        .collect();

    let is_continuation = |line: &yaml::Line| line.indent > 0 || line.is_seq_item();

    let mut entries = Vec::new();
    let mut current: Option<(usize, usize)> = None;

    let flush = |range: Option<(usize, usize)>, entries: &mut Vec<Entry>| -> Result<(), ParseError> {
        let Some((start, end)) = range else {
            return Ok(());
        };
        let (key, value) = yaml::decode_field(parsed[start..end].to_vec()).map_err(|e| {
            ParseError::Malformed {
                line: e.line,
                reason: e.reason,
            }
        })?;
        let header = parsed[start].text;
        let rest = yaml::split_key(header).map(|(_, rest)| rest).unwrap_or_default();
        let value_text = rest.trim_start_matches([' ', '\t']);
        let prefix_len = header.len() - value_text.len();
        let first_raw = lines[start];

        entries.push(Entry::Field(Field {
            key,
            value,
            raw: lines[start..end].concat(),
            prefix: header[..prefix_len].to_string(),
            style: if end - start > 1 && value_text.trim().is_empty() {
                ValueStyle::Structured
            } else {
                ValueStyle::detect(value_text)
            },
            ending: LineEnding::of_line(first_raw),
            fragment: false,
        }));
        Ok(())
    };

    let mut i = 0;
    while i < parsed.len() {
        let line = parsed[i];

        if line.is_blank() || line.is_comment() && (line.indent == 0 || current.is_none()) {
            let next_continues = parsed[i + 1..]
                .iter()
                .find(|l| !l.is_trivia())
                .is_some_and(is_continuation);
            match current.as_mut() {
                Some((_, end)) if next_continues => *end = i + 1,
                _ => {
                    flush(current.take(), &mut entries)?;
                    entries.push(Entry::Trivia(lines[i].to_string()));
                }
            }
        } else if is_continuation(&line) {
            match current.as_mut() {
                Some((_, end)) => *end = i + 1,
                None => {
                    return Err(ParseError::Malformed {
                        line: line.number,
                        reason: "indented line outside any field".to_string(),
                    })
                }
            }
        } else if yaml::split_key(line.text).is_some() {
            flush(current.take(), &mut entries)?;
            current = Some((i, i + 1));
        } else {
            return Err(ParseError::Malformed {
                line: line.number,
                reason: "expected 'key: value'".to_string(),
            });
        }
        i += 1;
    }
    flush(current.take(), &mut entries)?;

    Ok(entries)
}

/// Group TOML lines into fields and trivia, decoding values with `toml`.
fn toml_entries(lines: &[&str], first_number: usize) -> Result<Vec<Entry>, ParseError> {
    use toml_block::{classify, LineKind, ValueScanner};

    let source = lines.concat();
    let table: toml::Table = toml::from_str(&source).map_err(|e: toml::de::Error| {
        let line = e
            .span()
            .map(|span| source[..span.start].matches('\n').count())
            .unwrap_or(0);
        ParseError::Malformed {
            line: first_number + line,
            reason: e.message().to_string(),
        }
    })?;

    let lookup = |key: &str| table.get(key).map(toml_block::to_json).unwrap_or(Value::Null);

    let mut entries = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        let text = strip_eol(lines[i]);
        let number = first_number + i;
        let kind = classify(text).ok_or_else(|| ParseError::Malformed {
            line: number,
            reason: "expected 'key = value' or a table header".to_string(),
        })?;

        match kind {
            LineKind::Blank | LineKind::Comment => {
                entries.push(Entry::Trivia(lines[i].to_string()));
                i += 1;
            }
            LineKind::KeyValue { key, value_start } => {
                let start = i;
                let mut scanner = ValueScanner::default();
                let mut complete = scanner.feed(&text[value_start..]);
                i += 1;
                while !complete && i < lines.len() {
                    complete = scanner.feed(strip_eol(lines[i]));
                    i += 1;
                }
                entries.push(Entry::Field(Field {
                    value: lookup(&key),
                    key,
                    raw: lines[start..i].concat(),
                    prefix: text[..value_start].to_string(),
                    style: ValueStyle::detect(&text[value_start..]),
                    ending: LineEnding::of_line(lines[start]),
                    fragment: toml_block::key_is_dotted(&text[..value_start]),
                }));
            }
            LineKind::Header(key) => {
                let start = i;
                let fragment = toml_block::header_is_dotted(text);
                i += 1;
                let mut scanner = ValueScanner::default();
                let mut in_value = false;
                while i < lines.len() {
                    let text = strip_eol(lines[i]);
                    if in_value {
                        in_value = !scanner.feed(text);
                    } else {
                        match classify(text) {
                            Some(LineKind::Header(_)) => break,
                            Some(LineKind::KeyValue { value_start, .. }) => {
                                scanner = ValueScanner::default();
                                in_value = !scanner.feed(&text[value_start..]);
                            }
                            _ => {}
                        }
                    }
                    i += 1;
                }
                entries.push(Entry::Field(Field {
                    value: lookup(&key),
                    key,
                    raw: lines[start..i].concat(),
                    prefix: String::new(),
                    style: ValueStyle::TomlTable,
                    ending: LineEnding::of_line(lines[start]),
                    fragment,
                }));
            }
        }
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn round_trip(raw: &str) {
        let doc = parse(raw).unwrap();
        assert_eq!(serialize(&doc), raw);
    }

    mod detection {
        use super::*;

        #[test]
        fn no_frontmatter_is_all_body() {
            let doc = parse("# Heading\n\ntext\n").unwrap();
            assert_eq!(doc.format(), None);
            assert_eq!(doc.body(), "# Heading\n\ntext\n");
            assert!(doc.fields().is_empty());
        }

        #[test]
        fn empty_document() {
            let doc = parse("").unwrap();
            assert_eq!(serialize(&doc), "");
        }

        #[test]
        fn fence_must_be_exact() {
            let doc = parse("--- \ntitle: x\n---\n").unwrap();
            assert_eq!(doc.format(), None);
        }

        #[test]
        fn unterminated_yaml() {
            assert_eq!(
                parse("---\ntitle: x\n").unwrap_err(),
                ParseError::Unterminated { fence: "---" }
            );
        }

        #[test]
        fn unterminated_toml() {
            assert_eq!(
                parse("+++\ntitle = 'x'\n---\n").unwrap_err(),
                ParseError::Unterminated { fence: "+++" }
            );
        }

        #[test]
        fn separator_and_body() {
            let doc = parse("---\na: 1\n---\n\n\nBody\n").unwrap();
            assert_eq!(doc.separator, "\n\n");
            assert_eq!(doc.body(), "Body\n");
        }
    }

    mod yaml_documents {
        use super::*;

        const SAMPLE: &str = "---\n\
# page settings\n\
title:   \"Hello, World\"   # shown in <title>\n\
date: 2024-01-05\n\
draft: false\n\
\n\
tags:\n  - rust\n  - cms\n\
params:\n  author: 'Jo'\n  toc: true\n\
summary: |\n  First line.\n\n  Second paragraph.\n\
---\n\nBody text.\n";

        #[test]
        fn decodes_fields() {
            let doc = parse(SAMPLE).unwrap();
            assert_eq!(doc.format(), Some(FrontmatterFormat::Yaml));
            let fields = doc.fields();
            assert_eq!(fields["title"], json!("Hello, World"));
            assert_eq!(fields["date"], json!("2024-01-05"));
            assert_eq!(fields["draft"], json!(false));
            assert_eq!(fields["tags"], json!(["rust", "cms"]));
            assert_eq!(fields["params"], json!({"author": "Jo", "toc": true}));
            assert_eq!(fields["summary"], json!("First line.\n\nSecond paragraph.\n"));
            let order: Vec<&String> = fields.keys().collect();
            assert_eq!(
                order,
                ["title", "date", "draft", "tags", "params", "summary"]
            );
        }

        #[test]
        fn round_trips_exactly() {
            round_trip(SAMPLE);
        }

        #[test]
        fn round_trips_crlf() {
            round_trip("---\r\ntitle: x\r\ntags:\r\n- a\r\n---\r\n\r\nBody\r\n");
        }

        #[test]
        fn round_trips_without_trailing_newline() {
            round_trip("---\ntitle: x\n---");
            round_trip("---\ntitle: x\n---\nBody");
        }

        #[test]
        fn comment_between_block_lines_stays_inside_field() {
            let raw = "---\ntags:\n# first\n  - a\n---\n";
            let doc = parse(raw).unwrap();
            assert_eq!(doc.get("tags").unwrap(), &json!(["a"]));
            assert_eq!(doc.frontmatter().unwrap().entries().len(), 1);
            round_trip(raw);
        }

        #[test]
        fn malformed_line_reports_position() {
            let err = parse("---\ntitle: x\nnot a field\n---\n").unwrap_err();
            assert_eq!(
                err,
                ParseError::Malformed {
                    line: 3,
                    reason: "expected 'key: value'".to_string()
                }
            );
        }

        #[test]
        fn indented_first_line_rejected() {
            let err = parse("---\n  title: x\n---\n").unwrap_err();
            assert!(matches!(err, ParseError::Malformed { line: 2, .. }));
        }

        #[test]
        fn bad_value_rejected() {
            let err = parse("---\ntitle: \"open\n---\n").unwrap_err();
            assert!(matches!(err, ParseError::Malformed { line: 2, .. }));
        }
    }

    mod toml_documents {
        use super::*;

        const SAMPLE: &str = "+++\n\
title = 'Hello'\n\
weight = 10\n\
tags = [\n  \"a\",\n  \"b\",\n]\n\
# comment\n\
\n\
[params]\n\
author = \"Jo\"\n\
\n\
[[menu.main]]\n\
name = \"Home\"\n\
+++\nBody\n";

        #[test]
        fn decodes_fields() {
            let doc = parse(SAMPLE).unwrap();
            assert_eq!(doc.format(), Some(FrontmatterFormat::Toml));
            let fields = doc.fields();
            assert_eq!(fields["title"], json!("Hello"));
            assert_eq!(fields["weight"], json!(10));
            assert_eq!(fields["tags"], json!(["a", "b"]));
            assert_eq!(fields["params"], json!({"author": "Jo"}));
            assert_eq!(fields["menu"], json!({"main": [{"name": "Home"}]}));
        }

        #[test]
        fn round_trips_exactly() {
            round_trip(SAMPLE);
        }

        #[test]
        fn groups_entries() {
            let doc = parse(SAMPLE).unwrap();
            let entries = doc.frontmatter().unwrap().entries();
            let kinds: Vec<&str> = entries
                .iter()
                .map(|e| match e {
                    Entry::Field(f) => f.key(),
                    Entry::Trivia(_) => "~",
                })
                .collect();
            assert_eq!(kinds, ["title", "weight", "tags", "~", "~", "params", "menu"]);
        }

        #[test]
        fn invalid_toml_reports_line() {
            let err = parse("+++\ntitle = 'x'\nbroken = \n+++\n").unwrap_err();
            assert!(matches!(err, ParseError::Malformed { .. }));
        }
    }

    mod edits {
        use super::*;

        #[test]
        fn set_field_keeps_other_bytes() {
            let raw = "---\ntitle:  'Old'\ndraft: true  # keep me\n---\nBody\n";
            let mut doc = parse(raw).unwrap();
            doc.set_field("title", json!("New")).unwrap();
            assert_eq!(
                serialize(&doc),
                "---\ntitle:  'New'\ndraft: true  # keep me\n---\nBody\n"
            );
        }

        #[test]
        fn equal_value_is_untouched() {
            let raw = "---\ntitle: \"Same\"   # c\n---\n";
            let mut doc = parse(raw).unwrap();
            doc.set_field("title", json!("Same")).unwrap();
            assert_eq!(serialize(&doc), raw);
        }

        #[test]
        fn new_yaml_field_follows_last_field() {
            let mut doc = parse("---\ntitle: x\n# trailing\n---\n").unwrap();
            doc.set_field("draft", json!(true)).unwrap();
            assert_eq!(serialize(&doc), "---\ntitle: x\ndraft: true\n# trailing\n---\n");
        }

        #[test]
        fn new_toml_field_precedes_tables() {
            let mut doc = parse("+++\ntitle = 'x'\n[params]\na = 1\n+++\n").unwrap();
            doc.set_field("draft", json!(false)).unwrap();
            assert_eq!(
                serialize(&doc),
                "+++\ntitle = 'x'\ndraft = false\n[params]\na = 1\n+++\n"
            );
        }

        #[test]
        fn toml_null_rejected() {
            let mut doc = parse("+++\ntitle = 'x'\n+++\n").unwrap();
            assert!(doc.set_field("title", Value::Null).is_err());
        }

        #[test]
        fn crlf_documents_get_crlf_fields() {
            let mut doc = parse("---\r\ntitle: x\r\n---\r\n").unwrap();
            doc.set_field("draft", json!(true)).unwrap();
            assert_eq!(serialize(&doc), "---\r\ntitle: x\r\ndraft: true\r\n---\r\n");
        }

        #[test]
        fn bare_document_gains_frontmatter() {
            let mut doc = parse("Body\n").unwrap();
            doc.set_field("title", json!("T")).unwrap();
            assert_eq!(serialize(&doc), "---\ntitle: T\n---\n\nBody\n");
        }

        #[test]
        fn body_is_normalized() {
            let mut doc = parse("---\r\ntitle: x\r\n---\r\nold\r\n").unwrap();
            doc.set_body("new\nlines\n");
            assert_eq!(doc.body(), "new\r\nlines\r\n");
        }
    }
}
