//! workspace::site
//!
//! Site layout checks and URL-to-source resolution.

use std::path::Path;

use crate::core::types::ContentPath;

/// Config file names a Hugo site root may carry, in lookup order.
pub const SITE_CONFIG_FILES: &[&str] = &[
    "hugo.toml",
    "hugo.yaml",
    "hugo.yml",
    "hugo.json",
    "config.toml",
    "config.yaml",
    "config.yml",
    "config.json",
];

/// Section directories searched when a URL names a bare slug.
const SECTION_FALLBACKS: &[&str] = &["posts", "blog"];

/// Check that `root` looks like a site checkout.
///
/// Returns the reason when it does not.
pub fn check_layout(root: &Path, content_dir: &str) -> Result<(), String> {
    if !root.is_dir() {
        return Err(format!("{} does not exist", root.display()));
    }
    if !SITE_CONFIG_FILES
        .iter()
        .any(|name| root.join(name).is_file())
    {
        return Err(format!(
            "no site configuration found (expected one of {})",
            SITE_CONFIG_FILES.join(", ")
        ));
    }
    if !root.join(content_dir).is_dir() {
        return Err(format!("no '{}' directory found", content_dir));
    }
    Ok(())
}

/// Candidate source paths for a site URL, most specific first.
///
/// Query strings and fragments are ignored. The site root also tries the
/// home page bundle `_index.md`.
pub fn url_candidates(url_path: &str) -> Vec<ContentPath> {
    let path = url_path
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim()
        .trim_matches('/');
    let path = path.strip_suffix(".html").unwrap_or(path);
    let path = path.strip_suffix("/index").unwrap_or(path);

    let mut candidates = Vec::new();
    let stem = if path.is_empty() || path == "index" {
        candidates.push("_index".to_string());
        "index"
    } else {
        path
    };

    candidates.push(stem.to_string());
    candidates.push(format!("{stem}/index"));
    candidates.push(format!("{stem}/_index"));
    for section in SECTION_FALLBACKS {
        candidates.push(format!("{section}/{stem}"));
    }

    candidates
        .into_iter()
        .filter_map(|c| ContentPath::new(c).ok())
        .collect()
}
