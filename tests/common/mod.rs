//! Common test utilities for the dompile test suites
//!
//! Site construction lives in `dompile::test_utils::SiteFixture`; this module
//! adds running the built binary against a fixture.

// Not every suite uses every helper
#![allow(dead_code)]

use anyhow::{Context, Result};
use assert_cmd::Command;
use std::path::Path;

pub use dompile::test_utils::{SiteFixture, init_test_logging};

/// Output of a `dompile` run
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    pub code: Option<i32>,
}

impl CommandOutput {
    /// Assert the command succeeded
    pub fn assert_success(&self) -> &Self {
        assert!(
            self.success,
            "Command failed with code {:?}\nStderr: {}",
            self.code, self.stderr
        );
        self
    }

    /// Assert the command failed
    pub fn assert_failure(&self) -> &Self {
        assert!(!self.success, "Command unexpectedly succeeded\nStdout: {}", self.stdout);
        self
    }

    /// Assert stdout contains the given text
    pub fn assert_stdout_contains(&self, text: &str) -> &Self {
        assert!(
            self.stdout.contains(text),
            "Expected stdout to contain '{}'\nActual stdout: {}",
            text,
            self.stdout
        );
        self
    }

    /// Assert stderr contains the given text
    pub fn assert_stderr_contains(&self, text: &str) -> &Self {
        assert!(
            self.stderr.contains(text),
            "Expected stderr to contain '{}'\nActual stderr: {}",
            text,
            self.stderr
        );
        self
    }
}

/// Run `dompile --project <dir> ARGS` with color and `RUST_LOG` turned off.
pub fn run_dompile(project: &Path, args: &[&str]) -> Result<CommandOutput> {
    let output = Command::cargo_bin("dompile")
        .context("Failed to locate dompile binary")?
        .arg("--project")
        .arg(project)
        .args(args)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .output()
        .context("Failed to run dompile")?;

    Ok(CommandOutput {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        success: output.status.success(),
        code: output.status.code(),
    })
}

/// A small site: a layout, a nav include, a head snippet and two pages.
pub fn sample_site() -> Result<SiteFixture> {
    let site = SiteFixture::new()?;
    site.write(
        "src/layouts/base.html",
        "<html><head><title><slot name=\"title\">Untitled</slot></title></head>\
         <body><!--#include virtual=\"/includes/nav.html\" --><main><slot></slot></main></body></html>",
    )?;
    site.write("src/includes/nav.html", "<nav>Home</nav>")?;
    site.write("src/includes/head.html", "<meta charset=\"utf-8\">")?;
    site.write(
        "src/index.html",
        "<template extends=\"/layouts/base.html\"></template>\
         <template slot=\"title\">Welcome</template>\
         <p>Hello</p>",
    )?;
    site.write("src/about.md", "---\ntitle: About\nlayout: /layouts/base.html\n---\n# About\n\nText.\n")?;
    Ok(site)
}
