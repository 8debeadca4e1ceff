//! Layout and slot markup.
//!
//! A child document names its layout and fills slots:
//!
//! ```html
//! <template extends="layouts/base.html"></template>
//! <template slot="title">About us</template>
//! <p>Everything else is the default slot.</p>
//! ```
//!
//! A layout declares where fills go, with optional fallback content:
//!
//! ```html
//! <title><slot name="title">Untitled</slot></title>
//! <main><slot></slot></main>
//! <aside><slot name="sidebar" required></slot></aside>
//! ```

use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

use crate::core::{LineIndex, SourceRange};

/// Name of the slot that receives unlabelled content
pub const DEFAULT_SLOT: &str = "default";

static EXTENDS_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<template\s+extends\s*=\s*"([^"]+)"\s*(?:/>|>\s*</template\s*>)"#)
        .expect("extends pattern is valid")
});

static SLOT_FILL_OPEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<template\s+slot\s*=\s*"([^"]*)"\s*>"#).expect("slot fill pattern is valid")
});

static TEMPLATE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)</?template\b[^>]*>").expect("template tag pattern is valid")
});

static SLOT_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<slot\b([^>]*?)(?:/>|>(.*?)</slot\s*>)").expect("slot pattern is valid")
});

static NAME_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bname\s*=\s*"([^"]*)""#).expect("name attribute pattern is valid")
});

static REQUIRED_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|\s)required(?:\s|=|$)").expect("required attribute pattern is valid")
});

/// Where a document says its layout lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutReference {
    pub path: String,
    pub range: SourceRange,
    /// Came from markdown front matter rather than an `extends` tag
    pub from_front_matter: bool,
}

impl LayoutReference {
    pub fn front_matter(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            range: SourceRange::file_start(),
            from_front_matter: true,
        }
    }
}

/// One slot fill supplied by a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotInfo {
    pub name: String,
    pub content: String,
    pub range: SourceRange,
}

/// A document's layout relationship and slot fills.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateInfo {
    pub extends: Option<LayoutReference>,
    /// Unique by name, in first-seen order. Includes the `default` slot
    /// when the document has content outside fill blocks.
    pub slots: Vec<SlotInfo>,
    /// Content outside fill blocks and the extends tag, trimmed
    pub default_content: String,
    /// Fills overwritten by a later fill of the same name
    pub duplicates: Vec<SlotInfo>,
}

impl TemplateInfo {
    pub fn parse(text: &str) -> Self {
        let index = LineIndex::new(text);
        let mut info = Self::default();
        let mut removed: Vec<Range<usize>> = Vec::new();

        for caps in EXTENDS_TAG.captures_iter(text) {
            let (Some(whole), Some(path)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if info.extends.is_none() {
                info.extends = Some(LayoutReference {
                    path: path.as_str().trim().to_string(),
                    range: index.range(whole.range()),
                    from_front_matter: false,
                });
            }
            removed.push(whole.range());
        }

        let mut fills = Vec::new();
        for fill in slot_fill_spans(text) {
            fills.push(SlotInfo {
                name: slot_name(&text[fill.name]),
                content: text[fill.content].trim().to_string(),
                range: index.range(fill.whole.clone()),
            });
            removed.push(fill.whole);
        }

        removed.sort_by_key(|range| range.start);
        let mut default_content = String::new();
        let mut last = 0;
        for range in removed {
            if range.start >= last {
                default_content.push_str(&text[last..range.start]);
                last = range.end;
            }
        }
        default_content.push_str(&text[last..]);
        info.default_content = default_content.trim().to_string();

        if !info.default_content.is_empty() {
            info.insert(SlotInfo {
                name: DEFAULT_SLOT.to_string(),
                content: info.default_content.clone(),
                range: SourceRange::file_start(),
            });
        }
        for fill in fills {
            info.insert(fill);
        }
        info
    }

    /// Last writer wins; the overwritten fill is kept in `duplicates`.
    fn insert(&mut self, fill: SlotInfo) {
        if let Some(existing) = self.slots.iter_mut().find(|slot| slot.name == fill.name) {
            let previous = std::mem::replace(existing, fill);
            self.duplicates.push(previous);
        } else {
            self.slots.push(fill);
        }
    }

    pub fn slot(&self, name: &str) -> Option<&SlotInfo> {
        self.slots.iter().find(|slot| slot.name == name)
    }

    /// The document's content with all template markup removed: the
    /// default content followed by each named fill.
    pub fn flattened(&self) -> String {
        self.slots.iter().map(|slot| slot.content.as_str()).collect::<Vec<_>>().join("\n")
    }
}

/// A `<slot>` element in a layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotPlaceholder {
    pub name: String,
    pub required: bool,
    pub fallback: String,
    pub span: Range<usize>,
    pub range: SourceRange,
}

/// All slot placeholders in `text`, in document order.
pub fn parse_placeholders(text: &str) -> Vec<SlotPlaceholder> {
    let index = LineIndex::new(text);
    SLOT_PLACEHOLDER
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let attrs = caps.get(1).map_or("", |m| m.as_str());
            let name = NAME_ATTR.captures(attrs).map_or_else(|| DEFAULT_SLOT.to_string(), |c| slot_name(&c[1]));
            Some(SlotPlaceholder {
                name,
                required: REQUIRED_ATTR.is_match(attrs),
                fallback: caps.get(2).map_or("", |m| m.as_str()).to_string(),
                span: whole.range(),
                range: index.range(whole.range()),
            })
        })
        .collect()
}

/// Byte ranges of one `<template slot>` block.
struct FillSpan {
    whole: Range<usize>,
    name: Range<usize>,
    content: Range<usize>,
}

/// Slot fill blocks in document order. Nested `<template>` elements inside
/// a fill are part of its content; an unclosed fill is not a fill.
fn slot_fill_spans(text: &str) -> Vec<FillSpan> {
    let mut spans = Vec::new();
    let mut cursor = 0;

    while let Some(caps) = SLOT_FILL_OPEN.captures_at(text, cursor) {
        let (Some(open), Some(name)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        match closing_template(text, open.end()) {
            Some(close) => {
                spans.push(FillSpan {
                    whole: open.start()..close.end,
                    name: name.range(),
                    content: open.end()..close.start,
                });
                cursor = close.end;
            }
            None => cursor = open.end(),
        }
    }

    spans
}

/// The `</template>` that closes a block whose body starts at `from`.
fn closing_template(text: &str, from: usize) -> Option<Range<usize>> {
    let mut depth = 1usize;
    for tag in TEMPLATE_TAG.find_iter(&text[from..]) {
        let raw = tag.as_str();
        if raw.starts_with("</") {
            depth -= 1;
            if depth == 0 {
                return Some(from + tag.start()..from + tag.end());
            }
        } else if !raw.ends_with("/>") {
            depth += 1;
        }
    }
    None
}

fn slot_name(raw: &str) -> String {
    let name = raw.trim();
    if name.is_empty() {
        DEFAULT_SLOT.to_string()
    } else {
        name.to_string()
    }
}
