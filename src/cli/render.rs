//! Render documents and print the result.
//!
//! With the default `html` format a single document's HTML goes to stdout;
//! several documents are separated by a `<!-- dompile: PATH -->` banner.
//! Diagnostics are printed to stderr either way.
//!
//! ```bash
//! dompile render src/index.html > out.html
//! dompile render src/index.html src/about.md --format json
//! ```
//!
//! The exit status is zero even when diagnostics were reported, since the
//! HTML still carries inline error markers. Use `dompile check` to gate on
//! errors.

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};

use super::common::{Project, RenderedDocument};
use crate::pipeline::RenderResult;

#[derive(Args, Debug)]
pub struct RenderCommand {
    /// Documents to render, relative to the project directory
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = RenderFormat::Html)]
    pub format: RenderFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum RenderFormat {
    /// Rendered HTML on stdout
    Html,
    /// One JSON object per document with HTML, dependencies and diagnostics
    Json,
}

#[derive(Serialize)]
struct JsonEntry<'a> {
    file: &'a Path,
    #[serde(flatten)]
    result: &'a RenderResult,
}

impl RenderCommand {
    pub async fn execute(self, project: &Project) -> Result<()> {
        let paths: Vec<PathBuf> = self.files.iter().map(|f| project.document_path(f)).collect();
        let rendered = project.render_all(paths).await?;

        for document in &rendered {
            tracing::debug!(
                "Rendered {} with {} dependencies",
                project.display(&document.path),
                document.result.dependencies.len()
            );
            project.print_diagnostics(&document.result.diagnostics);
        }

        match self.format {
            RenderFormat::Html => print!("{}", html_output(project, &rendered)),
            RenderFormat::Json => println!("{}", json_output(&rendered)?),
        }
        Ok(())
    }
}

fn html_output(project: &Project, rendered: &[RenderedDocument]) -> String {
    if let [single] = rendered {
        return single.result.html.clone();
    }

    let mut out = String::new();
    for document in rendered {
        out.push_str(&format!("<!-- dompile: {} -->\n", project.display(&document.path)));
        out.push_str(&document.result.html);
        if !document.result.html.ends_with('\n') {
            out.push('\n');
        }
    }
    out
}

fn json_output(rendered: &[RenderedDocument]) -> Result<String> {
    let entries: Vec<JsonEntry<'_>> = rendered
        .iter()
        .map(|document| JsonEntry {
            file: &document.path,
            result: &document.result,
        })
        .collect();
    serde_json::to_string_pretty(&entries).context("Failed to serialize render results")
}
