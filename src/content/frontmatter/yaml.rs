//! content::frontmatter::yaml
//!
//! The YAML subset found in site frontmatter.
//!
//! Decoding covers plain, single-quoted and double-quoted scalars, flow
//! collections, block sequences, nested block maps and block scalars
//! (`|`, `>` with chomping and indentation indicators). Anchors, aliases,
//! tags and multi-document streams are read as plain text.
//!
//! Encoding is the canonical single-line form used for edited and new
//! fields: plain scalars when unambiguous, double quotes otherwise, and
//! flow collections for arrays and objects.

use serde_json::{Map, Number, Value};

/// Characters that may not start a plain scalar.
const INDICATORS: &[char] = &[
    '-', '?', ':', ',', '[', ']', '{', '}', '#', '&', '*', '!', '|', '>', '\'', '"', '%', '@',
    '`',
];

/// Decoding failure with the 1-based document line it occurred on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct YamlError {
    pub line: usize,
    pub reason: String,
}

impl YamlError {
    fn new(line: usize, reason: impl Into<String>) -> Self {
        Self {
            line,
            reason: reason.into(),
        }
    }
}

/// One source line split into indentation and text.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Line<'a> {
    /// 1-based line number in the document
    pub number: usize,
    /// Columns of leading whitespace
    pub indent: usize,
    /// Text after the indentation, without the line ending
    pub text: &'a str,
}

impl<'a> Line<'a> {
    pub fn new(number: usize, content: &'a str) -> Self {
        let text = content.trim_start_matches([' ', '\t']);
        Self {
            number,
            indent: content.len() - text.len(),
            text,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn is_comment(&self) -> bool {
        self.text.starts_with('#')
    }

    /// Blank or comment-only.
    pub fn is_trivia(&self) -> bool {
        self.is_blank() || self.is_comment()
    }

    /// A block sequence entry (`- item` or a bare `-`).
    pub fn is_seq_item(&self) -> bool {
        self.text == "-" || self.text.starts_with("- ") || self.text.starts_with("-\t")
    }
}

/// Split `key: rest` into the decoded key and the text after the colon.
///
/// Returns `None` when the line is not a mapping entry.
pub(crate) fn split_key(text: &str) -> Option<(String, &str)> {
    if let Some(quote) = text.chars().next().filter(|c| *c == '"' || *c == '\'') {
        let (key, consumed) = scan_quoted(text, quote).ok()?;
        let rest = text[consumed..].trim_start_matches([' ', '\t']);
        let rest = rest.strip_prefix(':')?;
        if !(rest.is_empty() || rest.starts_with([' ', '\t'])) {
            return None;
        }
        return Some((key, rest));
    }

    if text.is_empty() || text.starts_with(INDICATORS) && !text.starts_with('-') {
        return None;
    }
    if text == "-" || text.starts_with("- ") {
        return None;
    }

    let mut prev_space = false;
    for (i, c) in text.char_indices() {
        match c {
            ':' => {
                let after = &text[i + 1..];
                if after.is_empty() || after.starts_with([' ', '\t']) {
                    let key = text[..i].trim_end();
                    if key.is_empty() {
                        return None;
                    }
                    return Some((key.to_string(), after));
                }
            }
            '#' if prev_space => return None,
            _ => {}
        }
        prev_space = c == ' ' || c == '\t';
    }
    None
}

/// Decode a quoted scalar at the start of `text`.
///
/// Returns the decoded string and the number of bytes consumed, closing
/// quote included.
pub(crate) fn scan_quoted(text: &str, quote: char) -> Result<(String, usize), String> {
    let mut out = String::new();
    let mut chars = text.char_indices().skip(1).peekable();

    while let Some((i, c)) = chars.next() {
        if quote == '\'' {
            if c == '\'' {
                if matches!(chars.peek(), Some((_, '\''))) {
                    chars.next();
                    out.push('\'');
                    continue;
                }
                return Ok((out, i + 1));
            }
            out.push(c);
            continue;
        }

        match c {
            '"' => return Ok((out, i + 1)),
            '\\' => {
                let (_, esc) = chars
                    .next()
                    .ok_or_else(|| "unfinished escape sequence".to_string())?;
                let simple = match esc {
                    '0' => Some('\0'),
                    'a' => Some('\x07'),
                    'b' => Some('\x08'),
                    't' | '\t' => Some('\t'),
                    'n' => Some('\n'),
                    'v' => Some('\x0b'),
                    'f' => Some('\x0c'),
                    'r' => Some('\r'),
                    'e' => Some('\x1b'),
                    ' ' => Some(' '),
                    '"' => Some('"'),
                    '/' => Some('/'),
                    '\\' => Some('\\'),
                    'N' => Some('\u{85}'),
                    '_' => Some('\u{a0}'),
                    'L' => Some('\u{2028}'),
                    'P' => Some('\u{2029}'),
                    _ => None,
                };
                if let Some(ch) = simple {
                    out.push(ch);
                    continue;
                }
                let width = match esc {
                    'x' => 2,
                    'u' => 4,
                    'U' => 8,
                    other => return Err(format!("unknown escape '\\{}'", other)),
                };
                let mut hex = String::with_capacity(width);
                for _ in 0..width {
                    match chars.next() {
                        Some((_, h)) if h.is_ascii_hexdigit() => hex.push(h),
                        _ => return Err(format!("invalid '\\{}' escape", esc)),
                    }
                }
                let code = u32::from_str_radix(&hex, 16).map_err(|e| e.to_string())?;
                let ch = char::from_u32(code)
                    .ok_or_else(|| format!("escape '\\{}{}' is not a character", esc, hex))?;
                out.push(ch);
            }
            _ => out.push(c),
        }
    }

    let style = if quote == '\'' {
        "single-quoted"
    } else {
        "double-quoted"
    };
    Err(format!("unterminated {} string", style))
}

/// Interpret an unquoted scalar (YAML 1.2 core schema).
pub(crate) fn plain_scalar(text: &str) -> Value {
    match text {
        "" | "~" | "null" | "Null" | "NULL" => return Value::Null,
        "true" | "True" | "TRUE" => return Value::Bool(true),
        "false" | "False" | "FALSE" => return Value::Bool(false),
        _ => {}
    }

    if let Some(n) = parse_int(text) {
        return Value::Number(n);
    }

    let float_chars = text
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'));
    if float_chars && text.chars().any(|c| c.is_ascii_digit()) {
        if let Some(n) = text.parse::<f64>().ok().and_then(Number::from_f64) {
            return Value::Number(n);
        }
    }

    Value::String(text.to_string())
}

fn parse_int(text: &str) -> Option<Number> {
    let (negative, digits) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };
    if digits.is_empty() {
        return None;
    }

    let (radix, digits) = if let Some(hex) = digits.strip_prefix("0x") {
        (16, hex)
    } else if let Some(oct) = digits.strip_prefix("0o") {
        (8, oct)
    } else {
        (10, digits)
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }

    let magnitude = u64::from_str_radix(digits, radix).ok()?;
    if negative {
        let value = i64::try_from(magnitude).ok()?;
        Some(Number::from(-value))
    } else {
        Some(Number::from(magnitude))
    }
}

/// Decode a value written on one line (possibly joined from several).
pub(crate) fn inline_value(text: &str) -> Result<Value, String> {
    let text = text.trim();
    let Some(first) = text.chars().next() else {
        return Ok(Value::Null);
    };

    let (value, rest) = match first {
        '[' | '{' => {
            let mut flow = Flow::new(text);
            let value = flow.value()?;
            (value, flow.remaining())
        }
        '"' | '\'' => {
            let (s, consumed) = scan_quoted(text, first)?;
            (Value::String(s), &text[consumed..])
        }
        _ => {
            let plain = strip_comment(text).trim_end();
            if plain.contains(": ") || plain.ends_with(':') {
                return Err("mapping values are not allowed in a plain scalar".to_string());
            }
            return Ok(plain_scalar(plain));
        }
    };

    let rest = rest.trim();
    if rest.is_empty() || rest.starts_with('#') {
        Ok(value)
    } else {
        Err(format!("unexpected text after value: '{}'", rest))
    }
}

/// The ` # comment` after a one-line value, with the whitespace before it.
pub(crate) fn trailing_comment(text: &str) -> Option<&str> {
    let text = text.trim();
    let rest = match text.chars().next()? {
        '[' | '{' => {
            let mut flow = Flow::new(text);
            flow.value().ok()?;
            flow.remaining()
        }
        q @ ('"' | '\'') => {
            let (_, consumed) = scan_quoted(text, q).ok()?;
            &text[consumed..]
        }
        _ => &text[strip_comment(text).trim_end().len()..],
    };
    rest.trim_start().starts_with('#').then_some(rest)
}

/// Cut a trailing ` # comment` from plain text.
fn strip_comment(text: &str) -> &str {
    let mut prev_space = false;
    for (i, c) in text.char_indices() {
        if c == '#' && prev_space {
            return &text[..i];
        }
        prev_space = c == ' ' || c == '\t';
    }
    text
}

/// Cursor over a flow collection.
struct Flow<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Flow<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn remaining(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(' ' | '\t' | '\n' | '\r')) {
            self.bump();
        }
    }

    fn value(&mut self) -> Result<Value, String> {
        self.skip_ws();
        match self.peek() {
            Some('[') => self.sequence(),
            Some('{') => self.mapping(),
            Some(q @ ('"' | '\'')) => {
                let (s, consumed) = scan_quoted(self.remaining(), q)?;
                self.pos += consumed;
                Ok(Value::String(s))
            }
            Some(_) => Ok(plain_scalar(self.plain())),
            None => Err("unexpected end of flow collection".to_string()),
        }
    }

    /// Read a plain scalar up to the next flow indicator.
    fn plain(&mut self) -> &'a str {
        let rest = self.remaining();
        let mut end = rest.len();
        let mut iter = rest.char_indices().peekable();
        while let Some((i, c)) = iter.next() {
            let next = iter.peek().map(|(_, n)| *n);
            let stop = match c {
                ',' | ']' | '}' => true,
                ':' => matches!(next, None | Some(' ' | '\t' | ',' | ']' | '}')),
                '#' => i > 0 && rest[..i].ends_with([' ', '\t']),
                _ => false,
            };
            if stop {
                end = i;
                break;
            }
        }
        self.pos += end;
        rest[..end].trim()
    }

    fn expect_separator(&mut self, close: char) -> Result<bool, String> {
        self.skip_ws();
        match self.peek() {
            Some(',') => {
                self.bump();
                Ok(false)
            }
            Some(c) if c == close => {
                self.bump();
                Ok(true)
            }
            Some(c) => Err(format!("expected ',' or '{}', found '{}'", close, c)),
            None => Err(format!("missing closing '{}'", close)),
        }
    }

    fn sequence(&mut self) -> Result<Value, String> {
        self.bump();
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            if self.peek() == Some(']') {
                self.bump();
                break;
            }
            let item = self.value()?;
            self.skip_ws();
            let item = if self.peek() == Some(':') {
                self.bump();
                let value = self.value()?;
                let mut pair = Map::new();
                pair.insert(key_string(item), value);
                Value::Object(pair)
            } else {
                item
            };
            items.push(item);
            if self.expect_separator(']')? {
                break;
            }
        }
        Ok(Value::Array(items))
    }

    fn mapping(&mut self) -> Result<Value, String> {
        self.bump();
        let mut map = Map::new();
        loop {
            self.skip_ws();
            if self.peek() == Some('}') {
                self.bump();
                break;
            }
            let key = key_string(self.value()?);
            self.skip_ws();
            let value = if self.peek() == Some(':') {
                self.bump();
                self.skip_ws();
                if matches!(self.peek(), Some(',' | '}')) {
                    Value::Null
                } else {
                    self.value()?
                }
            } else {
                Value::Null
            };
            map.insert(key, value);
            if self.expect_separator('}')? {
                break;
            }
        }
        Ok(Value::Object(map))
    }
}

fn key_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// Recursive reader over the lines of one top-level field.
struct Block<'a> {
    lines: Vec<Line<'a>>,
    pos: usize,
}

impl<'a> Block<'a> {
    fn skip_trivia(&mut self) {
        while self.lines.get(self.pos).is_some_and(|l| l.is_trivia()) {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<Line<'a>> {
        self.lines.get(self.pos).copied()
    }

    fn node(&mut self, min_indent: usize) -> Result<Value, YamlError> {
        self.skip_trivia();
        let Some(first) = self.peek() else {
            return Ok(Value::Null);
        };
        if first.indent < min_indent {
            return Ok(Value::Null);
        }

        if first.is_seq_item() {
            self.sequence(first.indent)
        } else if split_key(first.text).is_some() {
            self.mapping(first.indent)
        } else {
            self.pos += 1;
            let joined = self.continuation(first.text, min_indent);
            inline_value(&joined).map_err(|r| YamlError::new(first.number, r))
        }
    }

    /// Join `head` with the following lines indented at least `min_indent`.
    fn continuation(&mut self, head: &str, min_indent: usize) -> String {
        let mut joined = head.trim().to_string();
        while let Some(line) = self.peek() {
            if line.is_trivia() {
                self.pos += 1;
                continue;
            }
            if line.indent < min_indent {
                break;
            }
            joined.push(' ');
            joined.push_str(line.text.trim());
            self.pos += 1;
        }
        joined
    }

    fn sequence(&mut self, indent: usize) -> Result<Value, YamlError> {
        let mut items = Vec::new();
        loop {
            self.skip_trivia();
            let Some(line) = self.peek() else { break };
            if line.indent < indent {
                break;
            }
            if line.indent > indent || !line.is_seq_item() {
                return Err(YamlError::new(line.number, "expected a '- ' sequence entry"));
            }

            let rest = &line.text[1..];
            let item = rest.trim_start_matches([' ', '\t']);
            if item.is_empty() || item.starts_with('#') {
                self.pos += 1;
            } else {
                // Re-read the entry's content as a line at its own column.
                self.lines[self.pos] = Line {
                    number: line.number,
                    indent: line.indent + 1 + (rest.len() - item.len()),
                    text: item,
                };
            }
            items.push(self.node(indent + 1)?);
        }
        Ok(Value::Array(items))
    }

    fn mapping(&mut self, indent: usize) -> Result<Value, YamlError> {
        let mut map = Map::new();
        loop {
            self.skip_trivia();
            let Some(line) = self.peek() else { break };
            if line.indent < indent {
                break;
            }
            if line.indent > indent {
                return Err(YamlError::new(line.number, "unexpected indentation"));
            }
            let (key, rest) = split_key(line.text)
                .ok_or_else(|| YamlError::new(line.number, "expected 'key: value'"))?;
            self.pos += 1;
            let value = self.value_after_key(line, rest, indent)?;
            map.insert(key, value);
        }
        Ok(Value::Object(map))
    }

    fn value_after_key(
        &mut self,
        line: Line<'a>,
        rest: &'a str,
        indent: usize,
    ) -> Result<Value, YamlError> {
        let trimmed = rest.trim();

        if trimmed.starts_with('|') || trimmed.starts_with('>') {
            return self.block_scalar(trimmed, indent, line.number);
        }

        if trimmed.is_empty() || trimmed.starts_with('#') {
            self.skip_trivia();
            return match self.peek() {
                Some(next) if next.indent > indent => self.node(indent + 1),
                Some(next) if next.indent == indent && next.is_seq_item() => {
                    self.sequence(indent)
                }
                _ => Ok(Value::Null),
            };
        }

        let joined = self.continuation(trimmed, indent + 1);
        inline_value(&joined).map_err(|r| YamlError::new(line.number, r))
    }

    fn block_scalar(
        &mut self,
        header: &str,
        parent_indent: usize,
        number: usize,
    ) -> Result<Value, YamlError> {
        let folded = header.starts_with('>');
        let mut chomp = Chomp::Clip;
        let mut explicit_indent = None;
        for c in strip_comment(&header[1..]).trim().chars() {
            match c {
                '-' => chomp = Chomp::Strip,
                '+' => chomp = Chomp::Keep,
                d @ '1'..='9' => explicit_indent = d.to_digit(10).map(|n| n as usize),
                other => {
                    return Err(YamlError::new(
                        number,
                        format!("invalid block scalar indicator '{}'", other),
                    ))
                }
            }
        }

        let start = self.pos;
        while let Some(line) = self.peek() {
            if !line.is_blank() && line.indent <= parent_indent {
                break;
            }
            self.pos += 1;
        }
        let body = &self.lines[start..self.pos];

        let content_indent = match explicit_indent {
            Some(n) => parent_indent + n,
            None => body
                .iter()
                .find(|l| !l.is_blank())
                .map(|l| l.indent)
                .unwrap_or(parent_indent + 1),
        };

        let mut texts = Vec::with_capacity(body.len());
        for line in body {
            if line.is_blank() {
                texts.push(String::new());
            } else if line.indent < content_indent {
                return Err(YamlError::new(
                    line.number,
                    "block scalar line is less indented than its first line",
                ));
            } else {
                texts.push(format!("{}{}", " ".repeat(line.indent - content_indent), line.text));
            }
        }

        let trailing = texts.iter().rev().take_while(|t| t.is_empty()).count();
        let content = &texts[..texts.len() - trailing];
        if content.is_empty() {
            return Ok(Value::String(String::new()));
        }

        let mut out = if folded {
            fold_lines(content)
        } else {
            content.join("\n")
        };
        match chomp {
            Chomp::Strip => {}
            Chomp::Clip => out.push('\n'),
            Chomp::Keep => out.push_str(&"\n".repeat(trailing + 1)),
        }
        Ok(Value::String(out))
    }
}

#[derive(Debug, Clone, Copy)]
enum Chomp {
    Strip,
    Clip,
    Keep,
}

/// Apply `>` folding: single breaks between normal lines become spaces.
fn fold_lines(lines: &[String]) -> String {
    let mut out = String::new();
    let mut pending_breaks = 0;
    let mut prev_more_indented = false;
    let mut first = true;

    for line in lines {
        if line.is_empty() {
            pending_breaks += 1;
            continue;
        }
        let more_indented = line.starts_with([' ', '\t']);
        if first {
            out.push_str(&"\n".repeat(pending_breaks));
        } else if more_indented || prev_more_indented {
            out.push_str(&"\n".repeat(pending_breaks + 1));
        } else if pending_breaks == 0 {
            out.push(' ');
        } else {
            out.push_str(&"\n".repeat(pending_breaks));
        }
        out.push_str(line);
        pending_breaks = 0;
        prev_more_indented = more_indented;
        first = false;
    }
    out
}

/// Decode one top-level field from its header line and continuation lines.
pub(crate) fn decode_field(lines: Vec<Line<'_>>) -> Result<(String, Value), YamlError> {
    let first = lines
        .first()
        .copied()
        .ok_or_else(|| YamlError::new(0, "empty field"))?;
    let (key, rest) = split_key(first.text)
        .ok_or_else(|| YamlError::new(first.number, "expected 'key: value'"))?;

    let mut block = Block { lines, pos: 1 };
    let value = block.value_after_key(first, rest, first.indent)?;

    block.skip_trivia();
    if let Some(extra) = block.peek() {
        return Err(YamlError::new(extra.number, "unexpected content after value"));
    }
    Ok((key, value))
}

// =============================================================================
// Encoding
// =============================================================================

/// How a string scalar was quoted in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Quote {
    Plain,
    Single,
    Double,
}

/// Canonical single-line encoding of any value.
pub(crate) fn encode(value: &Value) -> String {
    encode_in(value, false)
}

/// Encode a string, keeping the requested quote style when it can hold
/// the text unambiguously.
pub(crate) fn encode_string(text: &str, quote: Quote) -> String {
    match quote {
        Quote::Plain if plain_safe(text, false) => text.to_string(),
        Quote::Single if !text.chars().any(char::is_control) => {
            format!("'{}'", text.replace('\'', "''"))
        }
        _ => double_quoted(text),
    }
}

fn encode_in(value: &Value, flow: bool) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) if plain_safe(s, flow) => s.clone(),
        Value::String(s) => double_quoted(s),
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(|v| encode_in(v, true)).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Object(map) => {
            let pairs: Vec<String> = map
                .iter()
                .map(|(k, v)| {
                    let key = if plain_safe(k, true) {
                        k.clone()
                    } else {
                        double_quoted(k)
                    };
                    format!("{}: {}", key, encode_in(v, true))
                })
                .collect();
            format!("{{{}}}", pairs.join(", "))
        }
    }
}

/// Whether `text` can be written unquoted and read back as the same string.
fn plain_safe(text: &str, flow: bool) -> bool {
    if text.is_empty() || text.trim() != text {
        return false;
    }
    if text.starts_with(INDICATORS) || text.chars().any(char::is_control) {
        return false;
    }
    if text.contains(": ") || text.contains(" #") || text.ends_with(':') {
        return false;
    }
    if flow && text.contains([',', '[', ']', '{', '}']) {
        return false;
    }
    plain_scalar(text) == Value::String(text.to_string())
}

fn double_quoted(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lines(text: &str) -> Vec<Line<'_>> {
        text.lines()
            .enumerate()
            .map(|(i, l)| Line::new(i + 1, l))
            .collect()
    }

    fn field(text: &str) -> Value {
        decode_field(lines(text)).unwrap().1
    }

    mod scalars {
        use super::*;

        #[test]
        fn plain_types() {
            assert_eq!(plain_scalar("~"), Value::Null);
            assert_eq!(plain_scalar("True"), json!(true));
            assert_eq!(plain_scalar("42"), json!(42));
            assert_eq!(plain_scalar("-7"), json!(-7));
            assert_eq!(plain_scalar("0x1F"), json!(31));
            assert_eq!(plain_scalar("1.5"), json!(1.5));
            assert_eq!(plain_scalar("2024-01-05"), json!("2024-01-05"));
            assert_eq!(plain_scalar("hello world"), json!("hello world"));
        }

        #[test]
        fn quoted_strings() {
            assert_eq!(inline_value("'it''s'").unwrap(), json!("it's"));
            assert_eq!(inline_value(r#""a\"b\né""#).unwrap(), json!("a\"b\né"));
            assert_eq!(inline_value("\"123\"").unwrap(), json!("123"));
            assert!(inline_value("\"open").is_err());
            assert!(inline_value(r#""bad \q""#).is_err());
        }

        #[test]
        fn comments_are_stripped() {
            assert_eq!(inline_value("hello # note").unwrap(), json!("hello"));
            assert_eq!(inline_value("a#b").unwrap(), json!("a#b"));
            assert_eq!(inline_value("\"x\" # note").unwrap(), json!("x"));
        }

        #[test]
        fn mapping_in_plain_rejected() {
            assert!(inline_value("a: b").is_err());
        }
    }

    mod flow {
        use super::*;

        #[test]
        fn sequences_and_maps() {
            assert_eq!(
                inline_value("[a, 'b c', 3, [x]]").unwrap(),
                json!(["a", "b c", 3, ["x"]])
            );
            assert_eq!(
                inline_value("{a: 1, b: [x, y], c: }").unwrap(),
                json!({"a": 1, "b": ["x", "y"], "c": null})
            );
            assert_eq!(inline_value("[]").unwrap(), json!([]));
            assert_eq!(
                inline_value("[http://example.com/a, b]").unwrap(),
                json!(["http://example.com/a", "b"])
            );
        }

        #[test]
        fn unclosed_rejected() {
            assert!(inline_value("[a, b").is_err());
            assert!(inline_value("{a: 1").is_err());
            assert!(inline_value("[a] trailing").is_err());
        }
    }

    mod blocks {
        use super::*;

        #[test]
        fn block_sequence() {
            assert_eq!(field("tags:\n  - a\n  - b"), json!(["a", "b"]));
            assert_eq!(field("tags:\n- a\n- b"), json!(["a", "b"]));
        }

        #[test]
        fn nested_map() {
            assert_eq!(
                field("params:\n  author: Jo\n  social:\n    x: '@jo'\n  count: 2"),
                json!({"author": "Jo", "social": {"x": "@jo"}, "count": 2})
            );
        }

        #[test]
        fn sequence_of_maps() {
            assert_eq!(
                field("menu:\n  - name: Home\n    weight: 1\n  - name: About\n    weight: 2"),
                json!([{"name": "Home", "weight": 1}, {"name": "About", "weight": 2}])
            );
        }

        #[test]
        fn literal_block_scalar() {
            assert_eq!(field("text: |\n  one\n  two"), json!("one\ntwo\n"));
            assert_eq!(field("text: |-\n  one\n   two"), json!("one\n two"));
            assert_eq!(field("text: |+\n  one\n\n"), json!("one\n\n"));
        }

        #[test]
        fn folded_block_scalar() {
            assert_eq!(field("text: >\n  one\n  two\n\n  three"), json!("one two\nthree\n"));
        }

        #[test]
        fn empty_value_is_null() {
            assert_eq!(field("draft:"), Value::Null);
        }

        #[test]
        fn bad_indentation_reports_line() {
            let err = decode_field(lines("params:\n    a: 1\n  b: 2")).unwrap_err();
            assert_eq!(err.line, 3);
        }
    }

    mod keys {
        use super::*;

        #[test]
        fn split_key_forms() {
            assert_eq!(split_key("title: x"), Some(("title".into(), " x")));
            assert_eq!(split_key("title:"), Some(("title".into(), "")));
            assert_eq!(split_key("\"odd key\": 1"), Some(("odd key".into(), " 1")));
            assert_eq!(split_key("url: http://x"), Some(("url".into(), " http://x")));
            assert_eq!(split_key("- item"), None);
            assert_eq!(split_key("no colon"), None);
            assert_eq!(split_key("http://x"), None);
        }
    }

    mod encoding {
        use super::*;

        #[test]
        fn canonical_forms() {
            assert_eq!(encode(&json!("Hello")), "Hello");
            assert_eq!(encode(&json!("true")), "\"true\"");
            assert_eq!(encode(&json!("42")), "\"42\"");
            assert_eq!(encode(&json!("a: b")), "\"a: b\"");
            assert_eq!(encode(&json!("line\nbreak")), "\"line\\nbreak\"");
            assert_eq!(encode(&json!(["a", "b, c"])), "[a, \"b, c\"]");
            assert_eq!(encode(&json!({"k": 1})), "{k: 1}");
            assert_eq!(encode(&Value::Null), "null");
        }

        #[test]
        fn quote_styles() {
            assert_eq!(encode_string("Hi", Quote::Double), "\"Hi\"");
            assert_eq!(encode_string("it's", Quote::Single), "'it''s'");
            assert_eq!(encode_string("Hi", Quote::Plain), "Hi");
            assert_eq!(encode_string("#tag", Quote::Plain), "\"#tag\"");
        }

        #[test]
        fn encodings_decode_back() {
            for value in [
                json!("plain"),
                json!("needs: quotes"),
                json!("'quoted'"),
                json!(" padded "),
                json!(["x", 1, true, null]),
                json!({"nested": {"list": ["a, b"]}}),
                json!(-3.25),
            ] {
                assert_eq!(inline_value(&encode(&value)).unwrap(), value);
            }
        }
    }
}
