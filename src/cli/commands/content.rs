//! content commands - get, save, create, resolve

use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context as _, Result};
use serde_json::{json, Number, Value};

use super::Context;
use crate::cli::args::EditArgs;
use crate::content::FieldEdits;
use crate::engine::BuildOutcome;
use crate::ui::output::format_list;

/// Show a document.
pub fn get(ctx: &Context, path: &str) -> Result<bool> {
    let repo = ctx.repository()?;
    let view = repo.get_content(path)?;

    let mut text = format!("{} ({})\n", view.path, view.url);
    for (key, value) in &view.frontmatter {
        text.push_str(&format!("  {}: {}\n", key, value));
    }
    text.push('\n');
    text.push_str(&view.body);

    ctx.out.report(&view, text.trim_end())?;
    Ok(true)
}

/// Edit an existing document.
pub fn save(ctx: &Context, path: &str, args: &EditArgs) -> Result<bool> {
    let edits = collect_fields(&args.fields)?;
    let body = read_body(args)?;
    if edits.is_empty() && body.is_none() {
        bail!("Nothing to save. Pass --field, --body, or --body-file.");
    }

    let repo = ctx.repository()?;
    let outcome = repo.save_content(path, &edits, body.as_deref())?;

    let text = with_build(&outcome.message, outcome.build.as_ref());
    ctx.out.report(&outcome, text)?;
    Ok(outcome.build.as_ref().map_or(true, |b| b.success))
}

/// Create a new document.
pub fn create(ctx: &Context, path: &str, args: &EditArgs) -> Result<bool> {
    let edits = collect_fields(&args.fields)?;
    let body = read_body(args)?.unwrap_or_default();

    let repo = ctx.repository()?;
    let outcome = repo.create_content(path, &edits, &body)?;

    let text = with_build(
        &format!("{} ({})", outcome.message, outcome.url),
        outcome.build.as_ref(),
    );
    ctx.out.report(&outcome, text)?;
    Ok(outcome.build.as_ref().map_or(true, |b| b.success))
}

/// Map a site URL to its source document.
pub fn resolve(ctx: &Context, url: &str) -> Result<bool> {
    let repo = ctx.repository()?;
    let found = repo.resolve_url(url)?;

    let report = json!({ "url": url, "path": found });
    match &found {
        Some(path) => ctx.out.report(&report, path)?,
        None => ctx.out.report(&report, format!("No document found for {}", url))?,
    }
    Ok(found.is_some())
}

fn with_build(message: &str, build: Option<&BuildOutcome>) -> String {
    match build {
        None => message.to_string(),
        Some(b) if b.success => format!("{}\n{}", message, b.message),
        Some(b) => format!(
            "{}\n{}\n{}",
            message,
            b.message,
            format_list(&b.diagnostics, "  ")
        ),
    }
}

fn collect_fields(raw: &[String]) -> Result<FieldEdits> {
    let mut edits = FieldEdits::new();
    for item in raw {
        let (key, value) = parse_field(item)?;
        edits.insert(key, value);
    }
    Ok(edits)
}

fn read_body(args: &EditArgs) -> Result<Option<String>> {
    if let Some(body) = &args.body {
        return Ok(Some(body.clone()));
    }
    match args.body_file.as_deref() {
        None => Ok(None),
        Some(path) if path == Path::new("-") => {
            let mut body = String::new();
            std::io::stdin()
                .read_to_string(&mut body)
                .context("Failed to read body from stdin")?;
            Ok(Some(body))
        }
        Some(path) => fs::read_to_string(path)
            .map(Some)
            .with_context(|| format!("Failed to read {}", path.display())),
    }
}

/// Parse `key=value` with value inference.
///
/// `true`/`false` are booleans, `null` is null, integers and finite floats
/// are numbers, `[a, b]` is a list of strings, anything else is a string.
pub fn parse_field(raw: &str) -> Result<(String, Value)> {
    let Some((key, value)) = raw.split_once('=') else {
        bail!("Invalid field '{}': expected KEY=VALUE", raw);
    };
    let key = key.trim();
    if key.is_empty() {
        bail!("Invalid field '{}': empty key", raw);
    }
    Ok((key.to_string(), infer_value(value)))
}

fn infer_value(raw: &str) -> Value {
    let trimmed = raw.trim();
    match trimmed {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        "null" => return Value::Null,
        _ => {}
    }

    if let Ok(n) = trimmed.parse::<i64>() {
        return Value::Number(n.into());
    }
    if trimmed.contains(['.', 'e', 'E']) {
        if let Some(n) = trimmed.parse::<f64>().ok().and_then(Number::from_f64) {
            return Value::Number(n);
        }
    }

    if let Some(inner) = trimmed.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
        let items = inner
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| Value::String(unquote(s).to_string()))
            .collect();
        return Value::Array(items);
    }

    Value::String(raw.to_string())
}

fn unquote(s: &str) -> &str {
    for q in ['"', '\''] {
        if let Some(inner) = s.strip_prefix(q).and_then(|s| s.strip_suffix(q)) {
            return inner;
        }
    }
    s
}
