//! Show the dependency graph of a document.
//!
//! By default prints everything `FILE` pulls in when rendered: includes,
//! layouts and the head snippet, as a tree. With `--dependents` the
//! direction flips and the command lists every document under the source
//! root whose render reads `FILE`, which is what a watcher needs to know
//! after a partial changes.
//!
//! ```text
//! src/index.html
//! ├── src/layouts/base.html (layout)
//! │   └── src/includes/nav.html
//! ├── src/includes/footer.html
//! └── src/includes/head.html (head)
//! ```

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use serde_json::json;
use std::path::{Path, PathBuf};

use super::common::Project;
use crate::resolver::DependencyTracker;

#[derive(Args, Debug)]
pub struct DepsCommand {
    /// Document (or, with --dependents, any file) to inspect
    pub file: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = DepsFormat::Tree)]
    pub format: DepsFormat,

    /// List the documents that depend on FILE instead
    #[arg(long)]
    pub dependents: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum DepsFormat {
    Tree,
    List,
    Json,
}

impl DepsCommand {
    pub async fn execute(self, project: &Project) -> Result<()> {
        let file = project.document_path(&self.file);
        if self.dependents {
            let dependents = dependents_of(project, &file).await?;
            println!("{}", self.format_dependents(project, &file, &dependents)?);
            return Ok(());
        }

        let mut rendered = project.render_all(vec![file.clone()]).await?;
        let Some(document) = rendered.pop() else {
            return Ok(());
        };
        project.print_diagnostics(&document.result.diagnostics);

        let output = match self.format {
            DepsFormat::Tree => document.tracker.to_tree_string(&file, project.dir()),
            DepsFormat::List => list(project, &document.result.dependencies),
            DepsFormat::Json => serde_json::to_string_pretty(&json!({
                "file": file,
                "dependencies": document.result.dependencies,
            }))
            .context("Failed to serialize dependencies")?,
        };
        println!("{}", output.trim_end());
        Ok(())
    }

    fn format_dependents(
        &self,
        project: &Project,
        file: &Path,
        dependents: &[PathBuf],
    ) -> Result<String> {
        let output = match self.format {
            DepsFormat::Tree => {
                let mut out = project.display(file);
                for (i, dependent) in dependents.iter().enumerate() {
                    let connector = if i + 1 == dependents.len() { "└── " } else { "├── " };
                    out.push('\n');
                    out.push_str(connector);
                    out.push_str(&project.display(dependent));
                }
                out
            }
            DepsFormat::List => list(project, dependents),
            DepsFormat::Json => serde_json::to_string_pretty(&json!({
                "file": file,
                "dependents": dependents,
            }))
            .context("Failed to serialize dependents")?,
        };
        Ok(output.trim_end().to_string())
    }
}

/// Documents whose render reads `file`, directly or transitively.
async fn dependents_of(project: &Project, file: &Path) -> Result<Vec<PathBuf>> {
    let documents = project.documents()?;
    let rendered = project.render_all(documents.clone()).await?;

    let mut combined = DependencyTracker::new();
    for document in &rendered {
        combined.merge(&document.tracker);
    }
    tracing::debug!(
        "Dependency graph of {} documents: {} files, {} edges",
        documents.len(),
        combined.node_count(),
        combined.edge_count()
    );

    Ok(combined
        .dependents(file)
        .into_iter()
        .filter(|path| documents.contains(path))
        .collect())
}

fn list(project: &Project, paths: &[PathBuf]) -> String {
    paths.iter().map(|p| project.display(p)).collect::<Vec<_>>().join("\n")
}
