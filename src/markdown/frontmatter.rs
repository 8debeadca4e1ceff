//! YAML front matter on markdown pages.
//!
//! ```markdown
//! ---
//! title: Hello
//! layout: post
//! ---
//! # Hello
//! ```
//!
//! Only `title` and `layout` mean anything to the renderer; other keys are
//! accepted and ignored. Front matter that is not valid YAML is logged and
//! the page renders as if it had none.

use gray_matter::{Matter, engine::YAML};
use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub layout: Option<String>,
}

/// Front matter plus the text that follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPage {
    pub front_matter: FrontMatter,
    pub content: String,
}

/// Split `text` into front matter and body.
pub fn parse_front_matter(text: &str) -> ParsedPage {
    let matter = Matter::<YAML>::new();
    let parsed = match matter.parse(text) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!("Ignoring unparseable front matter: {}", e);
            return ParsedPage {
                front_matter: FrontMatter::default(),
                content: text.to_string(),
            };
        }
    };

    let front_matter = parsed
        .data
        .map(|data: serde_yaml::Value| match serde_yaml::from_value::<FrontMatter>(data) {
            Ok(front_matter) => front_matter,
            Err(e) => {
                tracing::warn!("Ignoring front matter with unexpected shape: {}", e);
                FrontMatter::default()
            }
        })
        .unwrap_or_default();

    ParsedPage {
        front_matter,
        content: parsed.content,
    }
}
