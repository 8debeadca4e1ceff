//! Markdown to HTML.
//!
//! The pipeline talks to markdown through [`MarkdownProcessor`] and picks an
//! implementation once, when it is built:
//!
//! - [`CommonMarkProcessor`] renders CommonMark (plus tables, footnotes,
//!   strikethrough and task lists) with `pulldown-cmark`. Needs the default
//!   `markdown` feature.
//! - [`PlainTextProcessor`] turns headings and paragraphs into HTML and
//!   escapes everything else. Used when the feature is off or the project
//!   asks for `markdown = "minimal"`.
//!
//! Both read `title` and `layout` from YAML front matter.

pub mod frontmatter;

use std::path::Path;
use std::sync::Arc;

use crate::config::MarkdownMode;
use crate::utils::escape_html;

pub use frontmatter::{FrontMatter, ParsedPage, parse_front_matter};

/// Options for one transform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarkdownOptions {
    /// Rewrite links to `page.md` as `page/` instead of `page.html`
    pub pretty_urls: bool,
}

/// Result of transforming one markdown page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkdownOutput {
    pub html: String,
    /// Layout named in front matter, as written
    pub layout: Option<String>,
    pub title: Option<String>,
}

pub trait MarkdownProcessor: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    fn is_markdown_file(&self, path: &Path) -> bool {
        is_markdown_file(path)
    }

    fn transform(
        &self,
        text: &str,
        path: &Path,
        source_root: &Path,
        options: &MarkdownOptions,
    ) -> MarkdownOutput;
}

/// `.md` and `.markdown`, any case.
pub fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md") || ext.eq_ignore_ascii_case("markdown"))
}

/// The processor for `mode` given the compiled-in features.
pub fn processor_for(mode: MarkdownMode) -> Arc<dyn MarkdownProcessor> {
    match mode {
        #[cfg(feature = "markdown")]
        MarkdownMode::Auto => Arc::new(CommonMarkProcessor::new()),
        #[cfg(not(feature = "markdown"))]
        MarkdownMode::Auto => Arc::new(PlainTextProcessor),
        MarkdownMode::Minimal => Arc::new(PlainTextProcessor),
    }
}

/// Rewrite a relative link to a markdown page into a link to its HTML.
///
/// Returns `None` for links that are left alone: absolute URLs, fragments,
/// root-relative paths and anything not ending in `.md`.
pub fn rewrite_markdown_link(dest: &str, pretty_urls: bool) -> Option<String> {
    if dest.is_empty() || dest.starts_with('#') || dest.starts_with('/') || dest.contains(':') {
        return None;
    }

    let split = dest.find(['#', '?']).unwrap_or(dest.len());
    let (path, suffix) = dest.split_at(split);
    let lower = path.to_ascii_lowercase();
    if !lower.ends_with(".md") {
        return None;
    }
    let stem = &path[..path.len() - ".md".len()];

    let rewritten = if pretty_urls {
        match stem.rsplit_once('/') {
            Some((dir, "index")) => format!("{dir}/"),
            None if stem == "index" => "./".to_string(),
            _ => format!("{stem}/"),
        }
    } else {
        format!("{stem}.html")
    };
    Some(format!("{rewritten}{suffix}"))
}

/// CommonMark rendering through `pulldown-cmark`.
#[cfg(feature = "markdown")]
#[derive(Debug, Clone, Copy)]
pub struct CommonMarkProcessor {
    options: pulldown_cmark::Options,
}

#[cfg(feature = "markdown")]
impl CommonMarkProcessor {
    pub fn new() -> Self {
        use pulldown_cmark::Options;
        Self {
            options: Options::ENABLE_TABLES
                | Options::ENABLE_FOOTNOTES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS,
        }
    }
}

#[cfg(feature = "markdown")]
impl Default for CommonMarkProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "markdown")]
impl MarkdownProcessor for CommonMarkProcessor {
    fn name(&self) -> &'static str {
        "commonmark"
    }

    fn transform(
        &self,
        text: &str,
        path: &Path,
        _source_root: &Path,
        options: &MarkdownOptions,
    ) -> MarkdownOutput {
        use pulldown_cmark::{CowStr, Event, HeadingLevel, Parser, Tag, TagEnd, html};

        let page = parse_front_matter(text);
        let mut heading_title: Option<String> = None;
        let mut in_first_h1 = false;

        let events = Parser::new_ext(&page.content, self.options).map(|event| match event {
            Event::Start(Tag::Link {
                link_type,
                dest_url,
                title,
                id,
            }) => {
                let dest_url = match rewrite_markdown_link(&dest_url, options.pretty_urls) {
                    Some(rewritten) => CowStr::from(rewritten),
                    None => dest_url,
                };
                Event::Start(Tag::Link {
                    link_type,
                    dest_url,
                    title,
                    id,
                })
            }
            Event::Start(Tag::Heading {
                level: HeadingLevel::H1,
                ..
            }) if heading_title.is_none() => {
                in_first_h1 = true;
                heading_title = Some(String::new());
                event
            }
            Event::End(TagEnd::Heading(HeadingLevel::H1)) => {
                in_first_h1 = false;
                event
            }
            Event::Text(ref text) | Event::Code(ref text) if in_first_h1 => {
                if let Some(title) = heading_title.as_mut() {
                    title.push_str(text);
                }
                event
            }
            other => other,
        });

        let mut html_out = String::with_capacity(page.content.len() * 3 / 2);
        html::push_html(&mut html_out, events);

        tracing::debug!("Rendered markdown {} with {}", path.display(), self.name());
        MarkdownOutput {
            html: html_out,
            layout: page.front_matter.layout,
            title: page.front_matter.title.or(heading_title.filter(|t| !t.is_empty())),
        }
    }
}

/// Headings and paragraphs only. Blocks that start with `<` are raw HTML
/// and pass through untouched, so directives and template markup survive;
/// everything else is escaped text.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextProcessor;

impl MarkdownProcessor for PlainTextProcessor {
    fn name(&self) -> &'static str {
        "plain"
    }

    fn transform(
        &self,
        text: &str,
        path: &Path,
        _source_root: &Path,
        _options: &MarkdownOptions,
    ) -> MarkdownOutput {
        let page = parse_front_matter(text);
        let mut html = String::new();
        let mut heading_title = None;

        for block in page.content.split("\n\n").map(str::trim).filter(|b| !b.is_empty()) {
            let hashes = block.chars().take_while(|c| *c == '#').count();
            let is_heading = (1..=6).contains(&hashes)
                && block[hashes..].starts_with(' ')
                && !block.contains('\n');
            if block.starts_with('<') {
                html.push_str(block);
                html.push('\n');
            } else if is_heading {
                let heading = block[hashes..].trim();
                if hashes == 1 && heading_title.is_none() {
                    heading_title = Some(heading.to_string());
                }
                html.push_str(&format!("<h{hashes}>{}</h{hashes}>\n", escape_html(heading)));
            } else {
                html.push_str(&format!("<p>{}</p>\n", escape_html(block)));
            }
        }

        tracing::debug!("Rendered markdown {} with {}", path.display(), self.name());
        MarkdownOutput {
            html,
            layout: page.front_matter.layout,
            title: page.front_matter.title.or(heading_title),
        }
    }
}
