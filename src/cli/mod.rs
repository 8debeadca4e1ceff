//! Command-line interface for dompile.
//!
//! # Available Commands
//!
//! - `render` - Render documents and print the HTML (or JSON results)
//! - `deps` - Show what a document depends on, or what depends on a file
//! - `check` - Render every document under the source root and report
//!   diagnostics; exits non-zero when any error is found
//!
//! # Global Options
//!
//! - `--project <DIR>` - Project directory containing `dompile.toml`
//!   (default: current directory)
//! - `--verbose` / `--quiet` - Log level for diagnostics on stderr
//!
//! # Examples
//!
//! ```bash
//! dompile render src/index.html
//! dompile render src/index.html src/about.md --format json
//! dompile deps src/index.html --format tree
//! dompile deps src/includes/nav.html --dependents
//! dompile --project site check
//! ```
//!
//! The CLI never writes output files; results go to stdout, diagnostics and
//! logs to stderr.

mod check;
mod common;
mod deps;
mod render;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

pub use check::CheckCommand;
pub use common::Project;
pub use deps::{DepsCommand, DepsFormat};
pub use render::{RenderCommand, RenderFormat};

#[derive(Parser, Debug)]
#[command(
    name = "dompile",
    about = "Resolve includes, layouts and head snippets for static sites",
    version,
    long_about = "dompile expands server-side include directives, composes layouts with slots, \
                  converts markdown and injects a shared head snippet, reporting every problem \
                  as a diagnostic and tracking which files each page depends on."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Project directory containing dompile.toml
    #[arg(short, long, global = true, default_value = ".")]
    project: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render one or more documents
    Render(RenderCommand),

    /// Show a document's dependencies
    Deps(DepsCommand),

    /// Render every document under the source root and report problems
    Check(CheckCommand),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        self.init_logging();
        let project = Project::load(&self.project)?;

        match self.command {
            Commands::Render(cmd) => cmd.execute(&project).await,
            Commands::Deps(cmd) => cmd.execute(&project).await,
            Commands::Check(cmd) => cmd.execute(&project).await,
        }
    }

    /// Log filter for the chosen verbosity. `RUST_LOG` applies when neither
    /// flag is given.
    fn log_filter(&self) -> EnvFilter {
        if self.verbose {
            EnvFilter::new("dompile=debug")
        } else if self.quiet {
            EnvFilter::new("error")
        } else {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
        }
    }

    fn init_logging(&self) {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(self.log_filter())
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}
