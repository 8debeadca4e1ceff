//! Render every document and report diagnostics.
//!
//! Walks the source root (skipping the includes directory), renders each
//! `.html`, `.htm`, `.md` and `.markdown` file and prints its diagnostics.
//! Files that other documents use as layouts are not pages of their own;
//! their problems surface through the pages that extend them.
//! Fails when any document has an error-level diagnostic, so it can gate a
//! CI build:
//!
//! ```bash
//! dompile check && ./deploy.sh
//! ```

use anyhow::{Result, bail};
use clap::Args;
use colored::Colorize;
use std::collections::HashSet;
use std::path::PathBuf;

use super::common::{Project, RenderedDocument};
use crate::resolver::DependencyKind;

#[derive(Args, Debug)]
pub struct CheckCommand {
    /// Treat warnings as errors
    #[arg(long)]
    pub strict: bool,
}

/// Totals over a set of rendered documents.
#[derive(Debug, Default, PartialEq, Eq)]
struct Summary {
    documents: usize,
    errors: usize,
    warnings: usize,
}

impl Summary {
    fn of(rendered: &[RenderedDocument]) -> Self {
        rendered.iter().fold(Summary::default(), |mut summary, document| {
            summary.documents += 1;
            summary.errors += document.result.error_count();
            summary.warnings += document.result.warning_count();
            summary
        })
    }
}

impl CheckCommand {
    pub async fn execute(self, project: &Project) -> Result<()> {
        let documents = project.documents()?;
        if documents.is_empty() {
            println!("{}", "No documents found".yellow());
            return Ok(());
        }

        let rendered = pages(project.render_all(documents).await?);
        for document in &rendered {
            project.print_diagnostics(&document.result.diagnostics);
        }

        let summary = Summary::of(&rendered);
        let failed = summary.errors > 0 || (self.strict && summary.warnings > 0);
        let line = format!(
            "Checked {} document(s): {} error(s), {} warning(s)",
            summary.documents, summary.errors, summary.warnings
        );
        if failed {
            println!("{} {}", "✗".red(), line);
            bail!("{} document(s) failed the check", failing(&rendered, self.strict));
        }

        println!("{} {}", "✓".green(), line);
        Ok(())
    }
}

/// Drop documents that some rendered document extends as a layout.
fn pages(rendered: Vec<RenderedDocument>) -> Vec<RenderedDocument> {
    let layouts: HashSet<PathBuf> = rendered
        .iter()
        .flat_map(|document| document.tracker.targets_of_kind(DependencyKind::Layout))
        .collect();
    if !layouts.is_empty() {
        tracing::debug!("Skipping {} layout file(s)", layouts.len());
    }
    rendered.into_iter().filter(|document| !layouts.contains(&document.path)).collect()
}

fn failing(rendered: &[RenderedDocument], strict: bool) -> usize {
    rendered
        .iter()
        .filter(|d| d.result.has_errors() || (strict && d.result.warning_count() > 0))
        .count()
}
