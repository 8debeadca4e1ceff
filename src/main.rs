//! dompile CLI entry point
//!
//! Parses arguments, runs the command and turns errors into a readable
//! message with a suggestion where one exists.
//!
//! - `render` - Render documents to stdout
//! - `deps` - Show dependencies or dependents of a file
//! - `check` - Render the whole site and fail on errors

use anyhow::Result;
use clap::Parser;
use dompile::cli;
use dompile::core::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            user_friendly_error(e).display();
            std::process::exit(1);
        }
    }
}
