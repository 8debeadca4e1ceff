//! Local asset references in rendered HTML.

use regex::Regex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use crate::utils::normalize_path;

static ASSET_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(?:src|href)\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
        .expect("asset attribute pattern is valid")
});

/// Extensions that name pages rather than assets
const PAGE_EXTENSIONS: &[&str] = &["html", "htm", "md", "markdown"];

/// Absolute paths of the local, non-page files referenced by `src` and
/// `href` attributes, first-seen order, no duplicates.
///
/// `/`-prefixed references resolve against `source_root`, everything else
/// against `document`'s directory. Nothing is checked for existence.
pub fn collect_assets(html: &str, document: &Path, source_root: &Path) -> Vec<PathBuf> {
    let base = document.parent().unwrap_or(source_root);
    let mut seen = HashSet::new();
    let mut assets = Vec::new();

    for caps in ASSET_ATTR.captures_iter(html) {
        let Some(value) = caps.get(1).or_else(|| caps.get(2)) else {
            continue;
        };
        let Some(reference) = local_reference(value.as_str()) else {
            continue;
        };

        let path = match reference.strip_prefix('/') {
            Some(rooted) => normalize_path(&source_root.join(rooted)),
            None => normalize_path(&base.join(reference)),
        };
        if seen.insert(path.clone()) {
            assets.push(path);
        }
    }

    assets
}

/// The path part of `value` when it names a local non-page file.
fn local_reference(value: &str) -> Option<&str> {
    let value = value.trim();
    if value.is_empty() || value.starts_with('#') || value.starts_with("//") || value.contains(':') {
        return None;
    }
    let path = &value[..value.find(['?', '#']).unwrap_or(value.len())];
    if path.ends_with('/') {
        return None;
    }
    let extension = Path::new(path).extension()?.to_str()?;
    if PAGE_EXTENSIONS.iter().any(|page| extension.eq_ignore_ascii_case(page)) {
        return None;
    }
    Some(path)
}
